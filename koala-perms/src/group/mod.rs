// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named and prioritised collections of permissions.
mod evaluate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::permission::{Permission, State, clean_name};

pub(crate) use evaluate::enter;

/// Priority assigned to groups which were not given one explicitly.
pub const DEFAULT_PRIORITY: i64 = 10;

/// A named bag of permissions, some of which may embed other groups.
///
/// The priority only matters when this group is embedded next to other groups: embedded groups
/// with a higher priority are consulted first.
///
/// Permissions are kept in insertion order. Adding a permission with a name which is already
/// present replaces the old entry in place. Deserialized groups follow the same rules.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "RawGroup")
)]
pub struct Group {
    name: String,
    priority: i64,
    permissions: Vec<Permission>,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawGroup {
    name: String,
    priority: i64,
    permissions: Vec<Permission>,
}

#[cfg(feature = "serde")]
impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        let mut group = Group::with_priority(&raw.name, raw.priority);
        for permission in raw.permissions {
            group.insert(permission);
        }
        group
    }
}

impl Group {
    /// Create an empty group with the default priority.
    pub fn new(name: &str) -> Self {
        Self::with_priority(name, DEFAULT_PRIORITY)
    }

    /// Create an empty group with the given priority.
    pub fn with_priority(name: &str, priority: i64) -> Self {
        Self {
            name: clean_name(name),
            priority,
            permissions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }

    /// All permissions of this group in insertion order.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Permissions of this group which reference other groups.
    pub fn group_refs(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter().filter(|p| p.is_group())
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Insert a permission, replacing any permission with the same name.
    ///
    /// Returns the replaced permission.
    pub fn insert(&mut self, permission: Permission) -> Option<Permission> {
        match self
            .permissions
            .iter_mut()
            .find(|p| p.name() == permission.name())
        {
            Some(existing) => Some(std::mem::replace(existing, permission)),
            None => {
                self.permissions.push(permission);
                None
            }
        }
    }

    /// Parse a permission in its signed form and insert it.
    ///
    /// Unsigned names are inserted as `Allow`. Note that the text import treats them as `Unset`
    /// instead.
    pub fn add(&mut self, raw: &str) -> Option<Permission> {
        self.insert(Permission::parse(raw, State::Allow))
    }

    /// Embed another group with the given state on the reference.
    pub fn embed(&mut self, group: &Group, state: State) -> Option<Permission> {
        self.insert(Permission::from_group(group, state))
    }

    /// Remove a permission by name. Removing an unknown name does nothing.
    pub fn remove(&mut self, name: &str) -> Option<Permission> {
        let name = clean_name(name);
        let index = self.permissions.iter().position(|p| p.name() == name)?;
        Some(self.permissions.remove(index))
    }

    /// Exact lookup of a permission, without any prefix matching.
    ///
    /// Returns an `Unset` permission when nothing is stored under that name.
    pub fn get(&self, name: &str) -> Permission {
        let name = clean_name(name);
        self.permissions
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .unwrap_or_else(|| Permission::new(&name, State::Unset))
    }

    /// Return `true` if a permission with exactly this name is stored.
    pub fn contains(&self, name: &str) -> bool {
        let name = clean_name(name);
        self.permissions.iter().any(|p| p.name() == name)
    }
}
