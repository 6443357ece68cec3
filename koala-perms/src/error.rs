// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Debug, Display};

use thiserror::Error;

use crate::dsl::ParseError;

/// Errors which can occur when resolving groups through an engine.
///
/// Generic parameter `E` is the error type of the underlying group store.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: Display + Debug,
{
    #[error("group store error: {0}")]
    Store(E),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cyclic group reference: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    #[error("invalid permission pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
