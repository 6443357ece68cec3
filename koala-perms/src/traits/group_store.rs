// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Debug, Display};

use crate::group::Group;

/// Persistence interface for groups, keyed by group name.
///
/// Lookups are the only suspension points of permission evaluation: every group reference which
/// needs to be followed results in one `get` call. Timeouts or cancellation should therefore be
/// implemented by the store.
///
/// Two variants of the trait are provided: one which is thread-safe (implementing `Send`) and one
/// which is purely intended for single-threaded execution contexts.
#[trait_variant::make(GroupStore: Send)]
pub trait LocalGroupStore: Clone {
    type Error: Display + Debug;

    /// Insert a group, replacing any group with the same name.
    async fn add(&mut self, group: &Group) -> Result<(), Self::Error>;

    /// Get a group by its name.
    ///
    /// Returns `None` when no group with that name exists.
    async fn get(&self, name: &str) -> Result<Option<Group>, Self::Error>;

    /// Delete a group by its name.
    ///
    /// Returns `true` when the removal occurred and `false` when the group was not found in the
    /// store.
    async fn delete(&mut self, name: &str) -> Result<bool, Self::Error>;

    /// Write back the current state of a group which was added before.
    ///
    /// Returns `true` when the group was persisted and `false` when no group with that name was
    /// added to the store.
    async fn save(&mut self, group: &Group) -> Result<bool, Self::Error>;

    /// Get all groups in the store.
    async fn list_all(&self) -> Result<Vec<Group>, Self::Error>;

    /// Drop any cached state, the next lookups go to the backing storage.
    async fn clear_cache(&mut self) -> Result<(), Self::Error>;
}
