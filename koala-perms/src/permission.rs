// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permissions are the atomic rule unit: a capability name paired with a three-valued state.
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::group::Group;

/// Name prefix which turns a permission into a reference to another group.
pub const GROUP_PREFIX: &str = "group.";

/// Characters which are reserved as control syntax and never part of a permission name.
const RESERVED: [char; 4] = ['+', '-', ':', '|'];

/// Result of a permission query.
///
/// `Unset` means "no applicable rule" and is never the same thing as `Deny`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum State {
    Allow,
    Deny,
    #[default]
    Unset,
}

impl State {
    /// Sign used for this state in the textual form of a permission.
    pub fn prefix(&self) -> char {
        match self {
            State::Allow => '+',
            State::Deny => '-',
            State::Unset => '?',
        }
    }

    /// Returns the state belonging to a sign character, if it is one.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '+' => Some(State::Allow),
            '-' => Some(State::Deny),
            '?' => Some(State::Unset),
            _ => None,
        }
    }

    /// Return `true` if this state holds an opinion, that is it is not `Unset`.
    pub fn is_set(&self) -> bool {
        !matches!(self, State::Unset)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            State::Allow => "allow",
            State::Deny => "deny",
            State::Unset => "unset",
        };

        write!(f, "{}", s)
    }
}

/// Normalise a raw permission or group name.
///
/// The result is lower-cased and contains none of the reserved characters `+ - : |` or any
/// whitespace. Every input is accepted, callers need to check for empty names themselves.
pub fn clean_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !RESERVED.contains(c))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

/// A capability name with the state assigned to it.
///
/// Permissions whose name starts with [`GROUP_PREFIX`] are references to another group: the
/// state then applies to the embedding of that group instead of a literal capability.
///
/// Deserialized names are normalised with [`clean_name`] as well.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "RawPermission")
)]
pub struct Permission {
    name: String,
    state: State,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawPermission {
    name: String,
    state: State,
}

#[cfg(feature = "serde")]
impl From<RawPermission> for Permission {
    fn from(raw: RawPermission) -> Self {
        Self::new(&raw.name, raw.state)
    }
}

impl Permission {
    /// Create a permission, the name gets normalised with [`clean_name`].
    pub fn new(name: &str, state: State) -> Self {
        Self {
            name: clean_name(name),
            state,
        }
    }

    /// Parse the signed textual form (`+name`, `-name`, `?name`).
    ///
    /// A name without a leading sign is assigned the given default state.
    pub fn parse(raw: &str, default: State) -> Self {
        let raw = raw.trim_start();
        let mut chars = raw.chars();
        match chars.next().and_then(State::from_prefix) {
            Some(state) => Self::new(chars.as_str(), state),
            None => Self::new(raw, default),
        }
    }

    /// Create a reference to the given group.
    pub fn from_group(group: &Group, state: State) -> Self {
        Self::new(&format!("{}{}", GROUP_PREFIX, group.name()), state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Return `true` if this permission references another group.
    pub fn is_group(&self) -> bool {
        self.name.starts_with(GROUP_PREFIX)
    }

    /// Name of the referenced group, `None` if this is a literal capability.
    pub fn group_name(&self) -> Option<&str> {
        self.name.strip_prefix(GROUP_PREFIX)
    }
}

impl FromStr for Permission {
    type Err = Infallible;

    /// Parses the signed form, unsigned names are `Unset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, State::Unset))
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.state.prefix(), self.name)
    }
}

impl PartialOrd for Permission {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Permission {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.state.cmp(&other.state))
    }
}

#[cfg(test)]
mod tests {
    use super::{Permission, State, clean_name};

    #[test]
    fn clean_names() {
        assert_eq!(clean_name("Koala.Execute"), "koala.execute");
        assert_eq!(clean_name(" koala.ex-ec:ute | x "), "koala.executex");
        assert_eq!(clean_name("+-+"), "");

        for raw in ["A b\tC", "::group|12", "+Koala-Bot.Ping\n", "??x"] {
            let cleaned = clean_name(raw);
            assert!(!cleaned.contains(['+', '-', ':', '|']));
            assert!(!cleaned.chars().any(char::is_whitespace));
            assert_eq!(cleaned, cleaned.to_lowercase());
        }
    }

    #[test]
    fn parse_signed_form() {
        assert_eq!(
            Permission::parse("+koala.execute", State::Unset),
            Permission::new("koala.execute", State::Allow)
        );
        assert_eq!(
            Permission::parse("-Koala.Execute", State::Allow).state(),
            State::Deny
        );
        assert_eq!(
            Permission::parse("?koala.execute", State::Allow).state(),
            State::Unset
        );

        // Unsigned names pick up the given default.
        assert_eq!(
            Permission::parse("koala.execute", State::Allow).state(),
            State::Allow
        );
        assert_eq!(
            "koala.execute".parse::<Permission>().unwrap().state(),
            State::Unset
        );
    }

    #[test]
    fn display_parses_back() {
        let permissions = [
            Permission::new("koala.execute", State::Allow),
            Permission::new("koala.execute.tastylobby", State::Deny),
            Permission::new("group.role.admin", State::Unset),
            Permission::new("?odd", State::Allow),
            Permission::new("", State::Deny),
        ];

        for permission in permissions {
            let parsed: Permission = permission.to_string().parse().unwrap();
            assert_eq!(parsed, permission);
        }
    }

    #[test]
    fn group_references() {
        let reference = Permission::new("Group.Role.Admin", State::Deny);
        assert!(reference.is_group());
        assert_eq!(reference.group_name(), Some("role.admin"));

        let literal = Permission::new("koala.group.x", State::Allow);
        assert!(!literal.is_group());
        assert_eq!(literal.group_name(), None);
    }

    #[test]
    fn ordering_by_name_then_state() {
        let mut permissions = vec![
            Permission::new("b", State::Allow),
            Permission::new("a", State::Unset),
            Permission::new("a", State::Allow),
        ];
        permissions.sort();

        assert_eq!(
            permissions,
            vec![
                Permission::new("a", State::Allow),
                Permission::new("a", State::Unset),
                Permission::new("b", State::Allow),
            ]
        );
    }
}
