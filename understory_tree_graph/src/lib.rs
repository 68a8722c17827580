// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tree_graph --heading-base-level=0

//! Understory Tree Graph: an interactive, collapsible tree diagram.
//!
//! This crate builds the interactive layer on top of [`understory_tree_layout`]:
//!
//! - [`TreeGraph`] is the widget. It loads a tree, lays it out, animates every layout change,
//!   pans on drag, toggles branches on click, and persists what the user did.
//! - [`AnimationController`] runs at most one fixed-duration interpolation at a time and drops
//!   requests that arrive while it is busy.
//! - [`reconcile`] decides whether a freshly loaded tree is the same tree as the stored
//!   [`PersistedNode`] snapshot (same labels and child counts everywhere) and, if so,
//!   carries its fold state over.
//! - [`PanGesture`] turns pointer events into pan deltas and swallows the click that ends a drag.
//! - [`Renderer`] is the drawing contract; [`DisplayList`] records commands for replay.
//! - [`SnapshotStore`] is the persistence contract; [`MemoryStore`] keeps snapshots in memory.
//!
//! ## Driving the widget
//!
//! Nothing here owns a clock or a thread. The host forwards pointer events, calls
//! [`TreeGraph::frame`] with a millisecond timestamp while [`TreeGraph::needs_frame`] is true,
//! and presents whatever the renderer drew. Entry points that can be dropped by the busy guard
//! report whether they were accepted rather than failing.
//!
//! ## Observability
//!
//! Diagnostics go through [`tracing`]: image load failures and unreadable snapshots are
//! warnings, failed snapshot writes are errors, and animation, drag, and reconciliation
//! progress is logged at debug level.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animation;
mod config;
mod error;
mod graph;
mod input;
mod paint;
mod snapshot;
mod store;

pub use animation::{AnimationController, Begin, has_motion, interpolate};
pub use config::GraphConfig;
pub use error::GraphError;
pub use graph::{ClickCallback, ClickOutcome, LoadOutcome, PointerFeedback, TreeGraph};
pub use input::{Modifiers, PanGesture};
pub use paint::{DisplayList, DrawCommand, PaintStyle, Renderer, paint};
pub use snapshot::{
    NodeSnapshot, PersistedNode, PersistedPoint, Reconciliation, persist, reconcile,
};
pub use store::{MemoryStore, SnapshotStore, StorageKey};
