// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use crate::engine::Engine;
use crate::group::Group;
use crate::memory::MemoryStore;

pub type TestEngine = Engine<MemoryStore>;

/// Install a log subscriber when `RUST_LOG` is set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Engine backed by an empty in-memory store.
pub fn test_engine() -> TestEngine {
    Engine::new(MemoryStore::new())
}

/// Group with the given priority and permissions in their signed form.
pub fn group(name: &str, priority: i64, permissions: &[&str]) -> Group {
    let mut group = Group::with_priority(name, priority);
    for permission in permissions {
        group.add(permission);
    }
    group
}

/// Add all groups to the engine's store.
pub async fn add_all(engine: &mut TestEngine, groups: &[&Group]) {
    for group in groups {
        engine.add_group(group).await.unwrap();
    }
}
