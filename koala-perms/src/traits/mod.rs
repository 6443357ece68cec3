// SPDX-License-Identifier: MIT OR Apache-2.0

mod group_store;

pub use group_store::{GroupStore, LocalGroupStore};
