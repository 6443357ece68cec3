// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::debug;

use crate::dsl;
use crate::error::EngineError;
use crate::group::Group;
use crate::permission::{Permission, State, clean_name};
use crate::traits::GroupStore;

/// Registry of groups backed by a group store.
///
/// The engine holds no permission data itself. Groups are fetched from the store as owned
/// values: changes to a fetched group need to be written back with [`Engine::save_group`] before
/// they become visible to evaluation.
///
/// Changes to groups are not synchronised by the engine. Callers modifying the same group
/// concurrently need to serialise these changes themselves.
#[derive(Clone, Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S> Engine<S>
where
    S: GroupStore + Sync,
    S::Error: Send,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The store backing this engine.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a group, replacing any group with the same name.
    pub async fn add_group(&mut self, group: &Group) -> Result<(), EngineError<S::Error>> {
        self.store.add(group).await.map_err(EngineError::Store)
    }

    /// Get a group by name, `None` if it does not exist.
    ///
    /// The name is normalised the same way group names are on creation.
    pub async fn get_group(&self, name: &str) -> Result<Option<Group>, EngineError<S::Error>> {
        self.store
            .get(&clean_name(name))
            .await
            .map_err(EngineError::Store)
    }

    /// Get the group referenced by a permission.
    ///
    /// Fails with `InvalidArgument` if the permission is not a group reference.
    pub async fn get_group_by_permission(
        &self,
        permission: &Permission,
    ) -> Result<Option<Group>, EngineError<S::Error>> {
        let Some(name) = permission.group_name() else {
            return Err(EngineError::InvalidArgument(format!(
                "permission \"{}\" does not reference a group",
                permission.name()
            )));
        };

        self.get_group(name).await
    }

    /// Delete a group. References to it in other groups are kept and ignored from now on.
    ///
    /// Returns `false` if the group did not exist.
    pub async fn delete_group(&mut self, name: &str) -> Result<bool, EngineError<S::Error>> {
        self.store
            .delete(&clean_name(name))
            .await
            .map_err(EngineError::Store)
    }

    /// Write back a changed group.
    ///
    /// Returns `false` if the group was never added.
    pub async fn save_group(&mut self, group: &Group) -> Result<bool, EngineError<S::Error>> {
        self.store.save(group).await.map_err(EngineError::Store)
    }

    /// All groups in store order.
    pub async fn groups(&self) -> Result<Vec<Group>, EngineError<S::Error>> {
        self.store.list_all().await.map_err(EngineError::Store)
    }

    pub async fn clear_cache(&mut self) -> Result<(), EngineError<S::Error>> {
        self.store.clear_cache().await.map_err(EngineError::Store)
    }

    /// Resolve a capability for the group with the given name.
    ///
    /// An unknown group has no opinion on anything and resolves to `Unset`.
    pub async fn evaluate(
        &self,
        group_name: &str,
        capability: &str,
    ) -> Result<State, EngineError<S::Error>> {
        match self.get_group(group_name).await? {
            Some(group) => group.evaluate(self, capability).await,
            None => Ok(State::Unset),
        }
    }

    /// Parse groups in the text format and add them to the store.
    ///
    /// Groups are added one by one. A failing store leaves the groups added before it in place.
    /// Nothing is added when the text does not parse.
    pub async fn import(&mut self, text: &str) -> Result<Vec<Group>, EngineError<S::Error>> {
        let groups = dsl::parse(text)?;
        for group in &groups {
            debug!(group = %group.name(), permissions = group.len(), "importing group");
            self.add_group(group).await?;
        }
        Ok(groups)
    }

    /// Write all groups in the text format, in store order.
    pub async fn export(&self) -> Result<String, EngineError<S::Error>> {
        let groups = self.groups().await?;
        Ok(dsl::write(&groups))
    }
}
