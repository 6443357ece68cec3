// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permission resolution across a group and the groups it embeds.
//!
//! Resolution happens in two stages. First the group's own permissions are matched against the
//! capability and all of its ancestors (`a.b.c`, then `a.b`, then `a`). Only when none of these
//! yield an opinion are the embedded groups consulted, highest priority first, each of them with
//! the full capability again.
//!
//! Every followed reference is one store lookup. Nothing is cached between lookups, so the same
//! group may be fetched several times during one query.
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Display};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use regex::Regex;
use tracing::{debug, trace};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::group::Group;
use crate::permission::{Permission, State};
use crate::traits::GroupStore;

/// Scan mode of the prefix walk over a group's own permissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    /// First scan with the full capability, group references are set aside for later.
    Collect,

    /// Scans with truncated capabilities, only exact names are compared.
    Rescan,
}

impl Group {
    /// Resolve the state of a capability for this group.
    ///
    /// Exact or ancestor matches on this group take precedence over anything inherited through
    /// embedded groups. A `Deny` on an embedding reference turns any opinion of the embedded
    /// group into `Deny`.
    ///
    /// Returns `Unset` when no rule applies. Fails with `CycleDetected` when a group reference
    /// cycle is followed.
    pub async fn evaluate<S>(
        &self,
        engine: &Engine<S>,
        capability: &str,
    ) -> Result<State, EngineError<S::Error>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        let capability = capability.to_lowercase();
        let mut path = Vec::new();
        self.evaluate_inner(engine.store(), &capability, &mut path).await
    }

    /// Collect all permissions whose name matches the given regular expression, from this group
    /// and all groups it embeds transitively.
    ///
    /// The first determinate (not `Unset`) permission found for a name wins. Embedded groups are
    /// visited depth-first, highest priority first, after the group's own permissions. Group
    /// references are followed whether or not their own name matches.
    pub async fn evaluate_pattern<S>(
        &self,
        engine: &Engine<S>,
        pattern: &str,
    ) -> Result<BTreeSet<Permission>, EngineError<S::Error>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        let regex = Regex::new(pattern)?;
        self.evaluate_pattern_regex(engine, &regex).await
    }

    /// Same as [`Group::evaluate_pattern`] with an already compiled expression.
    pub async fn evaluate_pattern_regex<S>(
        &self,
        engine: &Engine<S>,
        regex: &Regex,
    ) -> Result<BTreeSet<Permission>, EngineError<S::Error>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        let mut found = HashMap::new();
        let mut path = Vec::new();
        self.collect_matching(engine.store(), regex, &mut found, &mut path).await?;
        Ok(found.into_values().collect())
    }

    fn evaluate_inner<'a, S>(
        &'a self,
        store: &'a S,
        capability: &'a str,
        path: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<State, EngineError<S::Error>>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        async move {
            enter(path, self.name())?;

            let (state, deferred) = self.match_own(capability);
            if state.is_set() {
                trace!(group = %self.name(), capability, %state, "matched own permission");
                path.pop();
                return Ok(state);
            }

            for (link, group) in resolve_refs(store, deferred).await? {
                let inner = group.evaluate_inner(store, capability, path).await?;
                let combined = match (link.state(), inner) {
                    (_, State::Unset) => State::Unset,
                    (State::Deny, State::Allow | State::Deny) => State::Deny,
                    (State::Allow | State::Unset, inner) => inner,
                };

                if combined.is_set() {
                    trace!(
                        group = %self.name(),
                        via = %group.name(),
                        capability,
                        state = %combined,
                        "matched embedded group"
                    );
                    path.pop();
                    return Ok(combined);
                }
            }

            path.pop();
            Ok(State::Unset)
        }
        .boxed()
    }

    /// Walk the capability and its ancestors over this group's own permissions.
    ///
    /// Returns the first opinion found, and all group references seen during the first pass.
    /// The list of references is complete only if the first pass did not end on a match.
    fn match_own(&self, capability: &str) -> (State, Vec<&Permission>) {
        let mut node = capability;
        let mut pass = Pass::Collect;
        let mut state = State::Unset;
        let mut deferred = Vec::new();

        while !node.is_empty() && !state.is_set() {
            for permission in &self.permissions {
                if permission.is_group() {
                    if permission.name() == node {
                        state = permission.state();
                        break;
                    }

                    if pass == Pass::Collect {
                        deferred.push(permission);
                    }
                    continue;
                }

                if permission.name() == node {
                    state = permission.state();
                    break;
                }
            }

            pass = Pass::Rescan;
            if !state.is_set() {
                node = match node.rfind('.') {
                    Some(index) => &node[..index],
                    None => "",
                };
            }
        }

        (state, deferred)
    }

    fn collect_matching<'a, S>(
        &'a self,
        store: &'a S,
        regex: &'a Regex,
        found: &'a mut HashMap<String, Permission>,
        path: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<(), EngineError<S::Error>>>
    where
        S: GroupStore + Sync,
        S::Error: Send,
    {
        async move {
            enter(path, self.name())?;

            for permission in self.permissions.iter() {
                if !regex.is_match(permission.name()) {
                    continue;
                }

                match found.get(permission.name()) {
                    Some(existing) if existing.state().is_set() => (),
                    _ => {
                        trace!(group = %self.name(), %permission, "collected permission");
                        found.insert(permission.name().to_string(), permission.clone());
                    }
                }
            }

            for (_, group) in resolve_refs(store, self.group_refs().collect()).await? {
                group.collect_matching(store, regex, found, path).await?;
            }

            path.pop();
            Ok(())
        }
        .boxed()
    }
}

/// Look up the groups behind the given references, ordered by priority, highest first.
///
/// References to groups which do not exist are dropped. References with equal priority keep
/// their order.
async fn resolve_refs<'a, S>(
    store: &S,
    refs: Vec<&'a Permission>,
) -> Result<Vec<(&'a Permission, Group)>, EngineError<S::Error>>
where
    S: GroupStore + Sync,
{
    let mut resolved = Vec::with_capacity(refs.len());
    for link in refs {
        let Some(name) = link.group_name() else {
            continue;
        };

        match store.get(name).await.map_err(EngineError::Store)? {
            Some(group) => resolved.push((link, group)),
            None => debug!(group = name, "ignoring reference to unknown group"),
        }
    }

    resolved.sort_by(|(_, a), (_, b)| b.priority().cmp(&a.priority()));
    Ok(resolved)
}

/// Push a group onto the path of groups currently being resolved.
///
/// Fails with `CycleDetected` if the group is already on the path.
pub(crate) fn enter<E>(path: &mut Vec<String>, name: &str) -> Result<(), EngineError<E>>
where
    E: Display + Debug,
{
    if path.iter().any(|visited| visited == name) {
        let mut cycle = path.clone();
        cycle.push(name.to_string());
        debug!(cycle = ?cycle, "detected cyclic group reference");
        return Err(EngineError::CycleDetected(cycle));
    }

    path.push(name.to_string());
    Ok(())
}
