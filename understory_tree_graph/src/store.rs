// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistence backend contract.

use alloc::string::String;
use core::fmt;
use hashbrown::HashMap;

use crate::error::GraphError;

/// Stable key under which one widget instance persists its tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Uses `key` verbatim.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives the key for the widget instance named `id`: `TreeGraph_<id>`.
    pub fn for_instance(id: &str) -> Self {
        let mut key = String::from("TreeGraph_");
        key.push_str(id);
        Self(key)
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key/value storage for serialized tree snapshots.
///
/// Implementations are typically thin wrappers over browser local storage, a settings file,
/// or a database row. Reads are infallible: a backend that cannot read reports `None`.
pub trait SnapshotStore {
    /// Returns the snapshot stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous snapshot.
    fn set(&mut self, key: &str, value: String) -> Result<(), GraphError>;
}

/// In-memory [`SnapshotStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Removes the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), GraphError> {
        self.entries.insert(String::from(key), value);
        self.writes += 1;
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), GraphError> {
        (**self).set(key, value)
    }
}
