// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-based text format for importing and exporting groups.
//!
//! ```text
//! # Comments run until the end of the line.
//! ::moderators|20
//! +koala.execute
//! -koala.execute.adminchat
//! +group.everyone
//!
//! ::everyone
//! +koala.execute.ping
//! ```
//!
//! A line starting with `::` opens a group block, optionally followed by `|<priority>`. All
//! following lines until the next header are permissions in their signed form. Unsigned
//! permission lines are read as `Unset`.
use thiserror::Error;
use tracing::debug;

use crate::group::{DEFAULT_PRIORITY, Group};
use crate::permission::{Permission, State, clean_name};

const HEADER: &str = "::";
const PRIORITY_SEPARATOR: char = '|';
const COMMENT: char = '#';

/// Malformed line in the text format.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {reason} in \"{content}\"")]
pub struct ParseError {
    /// Line number, starting at 1.
    pub line: usize,

    /// The line with comments and surrounding whitespace removed.
    pub content: String,

    pub reason: ParseErrorReason,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseErrorReason {
    #[error("permission outside of a group block")]
    MissingHeader,

    #[error("empty group name")]
    EmptyGroupName,

    #[error("empty permission name")]
    EmptyPermissionName,

    #[error("invalid priority \"{0}\"")]
    InvalidPriority(String),
}

/// Parse groups from their text form.
///
/// Headers repeating the name of an earlier block continue that block. A repeated header which
/// carries a priority overrides the earlier one.
pub fn parse(text: &str) -> Result<Vec<Group>, ParseError> {
    let mut groups: Vec<Group> = Vec::new();
    let mut current: Option<usize> = None;

    for (index, raw) in text.lines().enumerate() {
        let content = match raw.split_once(COMMENT) {
            Some((content, _)) => content,
            None => raw,
        }
        .trim();

        if content.is_empty() {
            continue;
        }

        let error = |reason| ParseError {
            line: index + 1,
            content: content.to_string(),
            reason,
        };

        if let Some(header) = content.strip_prefix(HEADER) {
            let (name, priority) = match header.split_once(PRIORITY_SEPARATOR) {
                Some((name, priority)) => {
                    let priority = priority.trim();
                    let priority = priority.parse::<i64>().map_err(|_| {
                        error(ParseErrorReason::InvalidPriority(priority.to_string()))
                    })?;
                    (name, Some(priority))
                }
                None => (header, None),
            };

            let name = clean_name(name);
            if name.is_empty() {
                return Err(error(ParseErrorReason::EmptyGroupName));
            }

            let position = match groups.iter().position(|group| group.name() == name) {
                Some(position) => {
                    if let Some(priority) = priority {
                        groups[position].set_priority(priority);
                    }
                    position
                }
                None => {
                    groups.push(Group::with_priority(
                        &name,
                        priority.unwrap_or(DEFAULT_PRIORITY),
                    ));
                    groups.len() - 1
                }
            };

            debug!(group = %name, line = index + 1, "parsing group block");
            current = Some(position);
            continue;
        }

        let Some(position) = current else {
            return Err(error(ParseErrorReason::MissingHeader));
        };

        let permission = Permission::parse(content, State::Unset);
        if permission.name().is_empty() {
            return Err(error(ParseErrorReason::EmptyPermissionName));
        }

        groups[position].insert(permission);
    }

    Ok(groups)
}

/// Write groups in their text form.
///
/// The priority is only written when it differs from the default.
pub fn write<'a>(groups: impl IntoIterator<Item = &'a Group>) -> String {
    let mut text = String::new();

    for group in groups {
        text.push_str(HEADER);
        text.push_str(group.name());
        if group.priority() != DEFAULT_PRIORITY {
            text.push(PRIORITY_SEPARATOR);
            text.push_str(&group.priority().to_string());
        }
        text.push('\n');

        for permission in group.permissions() {
            text.push_str(&permission.to_string());
            text.push('\n');
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use crate::group::Group;
    use crate::permission::{Permission, State};

    use super::{ParseError, ParseErrorReason, parse, write};

    #[test]
    fn parse_blocks() {
        let text = "
            # moderators can do everything except the admin chat
            ::Moderators|20
            +koala.execute
            -koala.execute.adminchat   # trailing comment
            +group.everyone

            ::everyone
            ?koala.execute.ping
        ";

        let groups = parse(text).unwrap();
        assert_eq!(groups.len(), 2);

        let moderators = &groups[0];
        assert_eq!(moderators.name(), "moderators");
        assert_eq!(moderators.priority(), 20);
        assert_eq!(
            moderators.permissions(),
            &[
                Permission::new("koala.execute", State::Allow),
                Permission::new("koala.execute.adminchat", State::Deny),
                Permission::new("group.everyone", State::Allow),
            ]
        );

        let everyone = &groups[1];
        assert_eq!(everyone.priority(), 10);
        assert_eq!(everyone.get("koala.execute.ping").state(), State::Unset);
    }

    #[test]
    fn unsigned_lines_are_unset() {
        // The programmatic `Group::add` defaults to `Allow`, the text format does not.
        let groups = parse("::a\nkoala.execute\n").unwrap();
        assert_eq!(groups[0].get("koala.execute").state(), State::Unset);
        assert!(groups[0].contains("koala.execute"));

        let mut group = Group::new("a");
        group.add("koala.execute");
        assert_eq!(group.get("koala.execute").state(), State::Allow);
    }

    #[test]
    fn permission_before_header() {
        let error = parse("# header is missing\n\n+koala.execute\n::a\n").unwrap_err();
        assert_eq!(
            error,
            ParseError {
                line: 3,
                content: "+koala.execute".to_string(),
                reason: ParseErrorReason::MissingHeader,
            }
        );
    }

    #[test]
    fn invalid_headers() {
        let error = parse("::a|high\n").unwrap_err();
        assert_eq!(
            error.reason,
            ParseErrorReason::InvalidPriority("high".to_string())
        );

        let error = parse("::a\n+x\n::  |5\n").unwrap_err();
        assert_eq!(error.line, 3);
        assert_eq!(error.reason, ParseErrorReason::EmptyGroupName);
    }

    #[test]
    fn empty_permission_names() {
        for line in ["+", "- ", "?|:"] {
            let error = parse(&format!("::a\n+x\n{}\n", line)).unwrap_err();
            assert_eq!(error.line, 3);
            assert_eq!(error.reason, ParseErrorReason::EmptyPermissionName);
        }
    }

    #[test]
    fn repeated_headers_extend_block() {
        let groups = parse("::a\n+x\n::b\n+y\n::a|3\n-x\n+z\n").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].priority(), 3);
        assert_eq!(
            groups[0].permissions(),
            &[
                Permission::new("x", State::Deny),
                Permission::new("z", State::Allow),
            ]
        );
    }

    #[test]
    fn write_omits_default_priority() {
        let mut admin = Group::with_priority("admin", -5);
        admin.add("+koala.execute");
        admin.add("?koala.fruit");
        let everyone = Group::new("everyone");

        assert_eq!(
            write([&admin, &everyone]),
            "::admin|-5\n+koala.execute\n?koala.fruit\n::everyone\n"
        );
    }
}
