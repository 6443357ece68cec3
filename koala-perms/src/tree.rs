// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tree view over the reference graph of a group, for printing and debugging.
//!
//! The tree is a snapshot taken at build time and plays no role in evaluation.
use std::fmt::{Display, Write};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::group::{Group, enter};
use crate::permission::Permission;
use crate::traits::GroupStore;

/// Content of a node in a [`TreeBranch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchNode {
    /// The group the tree was built for.
    Root(Group),

    /// A reference which was resolved, its group is expanded below this node.
    Embedded { link: Permission, group: Group },

    /// A reference to a group which does not exist.
    Unresolved(Permission),

    /// A literal capability.
    Leaf(Permission),
}

impl Display for BranchNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchNode::Root(group) => write!(f, "{} ({})", group.name(), group.priority()),
            BranchNode::Embedded { link, group } => {
                write!(f, "{} ({})", link, group.priority())
            }
            BranchNode::Unresolved(link) => write!(f, "{} (unresolved)", link),
            BranchNode::Leaf(permission) => write!(f, "{}", permission),
        }
    }
}

/// Node of the materialised reference graph of a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeBranch {
    node: BranchNode,
    depth: usize,
    children: Vec<TreeBranch>,
}

impl TreeBranch {
    /// Build the tree for a group, resolving all references through the engine.
    ///
    /// Fails with `CycleDetected` when a group is reached again through its own references.
    pub async fn build<S>(
        engine: &Engine<S>,
        group: &Group,
    ) -> Result<Self, EngineError<S::Error>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        let mut path = Vec::new();
        expand(
            engine.store(),
            BranchNode::Root(group.clone()),
            group,
            0,
            &mut path,
        )
        .await
    }

    pub fn node(&self) -> &BranchNode {
        &self.node
    }

    /// Distance to the root, which has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &[TreeBranch] {
        &self.children
    }

    /// Render the tree in graphviz dot format.
    pub fn to_dot(&self) -> String {
        let mut graph = DiGraph::new();
        self.add_nodes(&mut graph);

        let dot = Dot::with_attr_getters(
            &graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (_, label)| format!("label = \"{}\"", label.replace('"', "\\\"")),
        );

        format!("{:?}", dot)
    }

    fn add_nodes(&self, graph: &mut DiGraph<String, ()>) -> NodeIndex {
        let index = graph.add_node(self.node.to_string());
        for child in &self.children {
            let child_index = child.add_nodes(graph);
            graph.add_edge(index, child_index, ());
        }
        index
    }

    fn write_indented(&self, f: &mut impl Write) -> std::fmt::Result {
        writeln!(f, "{}{}", "  ".repeat(self.depth), self.node)?;
        for child in &self.children {
            child.write_indented(f)?;
        }
        Ok(())
    }
}

impl Display for TreeBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_indented(f)
    }
}

fn expand<'a, S>(
    store: &'a S,
    node: BranchNode,
    group: &'a Group,
    depth: usize,
    path: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<TreeBranch, EngineError<S::Error>>>
where
    S: GroupStore + Sync,
    S::Error: Send,
{
    async move {
        enter(path, group.name())?;

        let mut children = Vec::with_capacity(group.len());
        for permission in group.permissions() {
            let Some(name) = permission.group_name() else {
                children.push(TreeBranch {
                    node: BranchNode::Leaf(permission.clone()),
                    depth: depth + 1,
                    children: Vec::new(),
                });
                continue;
            };

            match store.get(name).await.map_err(EngineError::Store)? {
                Some(embedded) => {
                    let node = BranchNode::Embedded {
                        link: permission.clone(),
                        group: embedded.clone(),
                    };
                    children.push(expand(store, node, &embedded, depth + 1, path).await?);
                }
                None => children.push(TreeBranch {
                    node: BranchNode::Unresolved(permission.clone()),
                    depth: depth + 1,
                    children: Vec::new(),
                }),
            }
        }

        path.pop();
        Ok(TreeBranch {
            node,
            depth,
            children,
        })
    }
    .boxed()
}
