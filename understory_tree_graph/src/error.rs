// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for the tree graph.

use alloc::string::String;

/// Errors reported by [`TreeGraph`](crate::TreeGraph) and its persistence layer.
///
/// Interactive entry points never return these: a failed write after a toggle or drag is
/// logged and the widget keeps running. Only [`TreeGraph::load`](crate::TreeGraph::load) and
/// the configuration and snapshot helpers surface them directly.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A layout or animation cycle is in flight; the request was not applied.
    #[error("a layout/animation cycle is already in flight")]
    Busy,

    /// The tree could not be encoded for persistence.
    #[error("failed to serialize tree snapshot: {0}")]
    Serialize(serde_json::Error),

    /// A stored snapshot could not be decoded.
    #[error("malformed tree snapshot: {0}")]
    MalformedSnapshot(serde_json::Error),

    /// The persistence backend refused a write.
    #[error("snapshot store rejected write for '{key}': {reason}")]
    Store {
        /// Storage key of the rejected write.
        key: String,
        /// Backend-specific reason.
        reason: String,
    },

    /// A configuration document could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(serde_json::Error),
}

impl GraphError {
    /// Creates a store error.
    pub fn store(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
