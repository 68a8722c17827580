// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tree_layout --heading-base-level=0

//! Understory Tree Layout: column layout for foldable tree diagrams.
//!
//! This crate turns a hierarchy of labelled boxes, each with an "expanded" flag, into
//! non-overlapping 2D coordinates. Depth maps to columns, left to right; siblings stack
//! top to bottom; every open parent is vertically centered on its children.
//!
//! - [`TreeModel`] owns the nodes of one loaded tree, assigns stable depth-first
//!   [`NodeId`]s, measures intrinsic box sizes once per load, and derives the
//!   [`VisibleMatrix`] (visible nodes grouped by depth) from the fold state.
//! - [`LayoutEngine`] runs the layout passes over a visible matrix and writes each visible
//!   node's `scheduled` position, then anchors the root inside a viewport.
//! - [`node_at_point`] maps a pointer position to the visible node under it.
//!
//! ## Committed and scheduled positions
//!
//! Every [`Node`] carries a committed `position` (what is on screen) and an optional
//! `scheduled` position (where layout wants it to go). The engine only ever writes the
//! schedule; [`TreeModel::commit`] promotes it. An animation driver can interpolate between
//! the two in the meantime, and [`LayoutEngine::pin`] can translate a fresh layout so that a
//! chosen node stays where it currently is.
//!
//! ## Not a renderer
//!
//! Nothing here draws. Text measurement and image resolution are supplied by the host
//! through [`TextMetrics`] and [`ImageSource`]; [`MonospaceMetrics`] and [`NoImages`] cover
//! headless use and tests.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_tree_layout::{
//!     LayoutEngine, MonospaceMetrics, NoImages, NodeSpec, TreeModel, node_at_point,
//! };
//!
//! let spec: NodeSpec = NodeSpec::new("animals")
//!     .child(NodeSpec::new("cats").expanded(true).child(NodeSpec::new("lion")))
//!     .child(NodeSpec::new("dogs"));
//!
//! let mut model = TreeModel::default();
//! model.load(spec, &MonospaceMetrics::default(), &mut NoImages);
//!
//! let matrix = model.visible_matrix();
//! let mut engine = LayoutEngine::default();
//! engine.layout(&mut model, &matrix, Size::new(640.0, 480.0));
//! model.commit(&matrix);
//!
//! let lion = model.node(matrix.row(2)[0]).unwrap();
//! let inside = lion.rect().center();
//! assert_eq!(node_at_point(&model, &matrix, inside, 4.0), Some(lion.id()));
//! assert_eq!(node_at_point(&model, &matrix, Point::new(-1.0, -1.0), 4.0), None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod hit;
mod layout;
mod measure;
mod model;
mod types;

pub use hit::node_at_point;
pub use layout::{LayoutConfig, LayoutEngine};
pub use measure::{ImageSource, MonospaceMetrics, NoImages, SizingConfig, TextMetrics};
pub use model::{TreeModel, VisibleMatrix};
pub use types::{DEFAULT_LABEL, Node, NodeId, NodeSpec};
