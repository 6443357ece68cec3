// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence for groups.
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::group::Group;
use crate::traits::GroupStore;

/// Groups by name, plus the order in which the names were first added.
#[derive(Clone, Debug, Default)]
pub struct InnerMemoryStore {
    groups: HashMap<String, Group>,
    order: Vec<String>,
}

/// An in-memory store for groups.
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts by wrapping an
/// `InnerMemoryStore` with an `RwLock` and `Arc`. Clones share the same underlying groups.
///
/// Groups are listed in the order they were first added.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<InnerMemoryStore>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }
}

impl GroupStore for MemoryStore {
    type Error = Infallible;

    async fn add(&mut self, group: &Group) -> Result<(), Self::Error> {
        let mut store = self.write_store();
        let previous = store
            .groups
            .insert(group.name().to_string(), group.clone());
        if previous.is_none() {
            store.order.push(group.name().to_string());
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Group>, Self::Error> {
        Ok(self.read_store().groups.get(name).cloned())
    }

    async fn delete(&mut self, name: &str) -> Result<bool, Self::Error> {
        let mut store = self.write_store();
        if store.groups.remove(name).is_none() {
            return Ok(false);
        }
        store.order.retain(|existing| existing != name);
        Ok(true)
    }

    async fn save(&mut self, group: &Group) -> Result<bool, Self::Error> {
        let mut store = self.write_store();
        let Some(existing) = store.groups.get_mut(group.name()) else {
            return Ok(false);
        };
        *existing = group.clone();
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<Group>, Self::Error> {
        let store = self.read_store();
        let groups = store
            .order
            .iter()
            .filter_map(|name| store.groups.get(name).cloned())
            .collect();
        Ok(groups)
    }

    async fn clear_cache(&mut self) -> Result<(), Self::Error> {
        // Nothing is cached, the map is the storage.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::group::Group;
    use crate::traits::GroupStore;

    use super::MemoryStore;

    #[tokio::test]
    async fn insert_get_and_delete() {
        let mut store = MemoryStore::new();

        let mut admin = Group::with_priority("Admin", 20);
        admin.add("+koala.execute");
        store.add(&admin).await.unwrap();

        let fetched = store.get("admin").await.unwrap().unwrap();
        assert_eq!(fetched, admin);
        assert_eq!(fetched.priority(), 20);
        assert!(store.get("nobody").await.unwrap().is_none());

        assert!(store.delete("admin").await.unwrap());
        assert!(!store.delete("admin").await.unwrap());
        assert!(store.get("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_requires_added_group() {
        let mut store = MemoryStore::new();
        let mut group = Group::new("mods");

        assert!(!store.save(&group).await.unwrap());
        assert!(store.get("mods").await.unwrap().is_none());

        store.add(&group).await.unwrap();
        group.add("-koala.execute.adminchat");
        assert!(store.save(&group).await.unwrap());

        let fetched = store.get("mods").await.unwrap().unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn list_in_insertion_order() {
        let mut store = MemoryStore::new();
        for name in ["zebra", "alpaca", "koala"] {
            store.add(&Group::new(name)).await.unwrap();
        }

        // Re-adding keeps the original position.
        store.add(&Group::with_priority("zebra", 1)).await.unwrap();
        store.delete("alpaca").await.unwrap();

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|group| group.name().to_string())
            .collect();
        assert_eq!(names, vec!["zebra", "koala"]);

        // Clones share state.
        let clone = store.clone();
        assert_eq!(clone.list_all().await.unwrap().len(), 2);
    }
}
