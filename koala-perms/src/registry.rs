// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use regex::Regex;

use crate::permission::clean_name;

/// Capability names known to an application.
///
/// Applications record the capabilities they check, for example when registering commands, to
/// offer them for discovery and listing. The registry is owned by the application and plays no
/// role in evaluation.
#[derive(Clone, Debug, Default)]
pub struct CapabilityRegistry {
    names: BTreeSet<String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a capability name.
    ///
    /// Returns `true` if the name was not known before. Names which are empty after
    /// normalisation are ignored.
    pub fn record(&mut self, name: &str) -> bool {
        let name = clean_name(name);
        if name.is_empty() {
            return false;
        }
        self.names.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&clean_name(name))
    }

    /// All recorded names in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Recorded names matching the given expression.
    pub fn matching<'a>(&'a self, regex: &'a Regex) -> impl Iterator<Item = &'a str> {
        self.iter().filter(|name| regex.is_match(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::CapabilityRegistry;

    #[test]
    fn record_and_match() {
        let mut registry = CapabilityRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.record("Koala.Execute.Ping"));
        assert!(registry.record("koala.execute.tag"));
        assert!(registry.record("koala.moderate.nick"));
        assert!(!registry.record("koala.execute.ping"));
        assert!(!registry.record(" +- "));

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("KOALA.EXECUTE.TAG"));

        let regex = Regex::new(r"^koala\.execute\.").unwrap();
        let names: Vec<&str> = registry.matching(&regex).collect();
        assert_eq!(names, vec!["koala.execute.ping", "koala.execute.tag"]);
    }
}
