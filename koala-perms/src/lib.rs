// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group-based permission evaluation.
//!
//! Answers the question "is capability `P` allowed, denied or unset for group `G`?". Capabilities
//! are dotted hierarchical names like `koala.execute.tag`, a rule on `koala.execute` also applies
//! to everything below it unless a more specific rule exists.
//!
//! Groups can embed other groups by holding a permission named `group.<name>`. The state on that
//! reference applies to the embedding itself: an `Allow` embedding inherits the embedded group's
//! rules as they are, a `Deny` embedding turns all of them into `Deny`. When several embedded
//! groups have an opinion, the one with the highest priority wins.
//!
//! Groups are kept in a [`GroupStore`]. The [`Engine`] ties a store to the text format used to
//! import and export whole sets of groups:
//!
//! ```text
//! ::everyone
//! +koala.execute.ping
//!
//! ::moderators|20
//! +koala.execute
//! -koala.execute.adminchat
//! +group.everyone
//! ```
//!
//! ```rust
//! # use koala_perms::{Engine, MemoryStore, State};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::new(MemoryStore::new());
//! engine
//!     .import("::moderators\n+koala.execute\n-koala.execute.adminchat\n")
//!     .await?;
//!
//! let state = engine.evaluate("moderators", "koala.execute.tag").await?;
//! assert_eq!(state, State::Allow);
//!
//! let state = engine.evaluate("moderators", "koala.execute.adminchat").await?;
//! assert_eq!(state, State::Deny);
//! # Ok(())
//! # }
//! ```
//!
//! Evaluation fetches every embedded group from the store when it is needed, there is no caching
//! of resolved groups. Reference cycles are detected and reported as
//! [`EngineError::CycleDetected`].
pub mod dsl;
mod engine;
mod error;
pub mod group;
#[cfg(feature = "memory")]
pub mod memory;
mod permission;
mod registry;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;
pub mod tree;

pub use dsl::{ParseError, ParseErrorReason};
pub use engine::Engine;
pub use error::EngineError;
pub use group::{DEFAULT_PRIORITY, Group};
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use permission::{GROUP_PREFIX, Permission, State, clean_name};
pub use registry::CapabilityRegistry;
pub use traits::{GroupStore, LocalGroupStore};
pub use tree::{BranchNode, TreeBranch};
