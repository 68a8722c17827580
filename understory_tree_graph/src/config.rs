// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget configuration.

use alloc::string::String;
use serde::{Deserialize, Serialize};
use understory_tree_layout::{LayoutConfig, SizingConfig};

use crate::error::GraphError;
use crate::input::Modifiers;
use crate::paint::PaintStyle;

/// Everything a [`TreeGraph`](crate::TreeGraph) can be tuned with.
///
/// Every field has a default, so a host may supply a partial JSON document:
///
/// ```rust
/// use understory_tree_graph::GraphConfig;
///
/// let config = GraphConfig::from_json(r#"{ "animation_ms": 250, "layout": { "y_branch_gap": 20 } }"#)
///     .unwrap();
/// assert_eq!(config.animation_ms, 250);
/// assert_eq!(config.layout.y_branch_gap, 20.0);
/// assert_eq!(config.layout.x_min_padding, 30.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Node box sizing.
    pub sizing: SizingConfig,
    /// Layout spacing.
    pub layout: LayoutConfig,
    /// Colors and glyph geometry.
    pub paint: PaintStyle,
    /// Duration of every layout animation, in milliseconds.
    pub animation_ms: u64,
    /// Extra pixels below each box that still count as a hit.
    pub hit_overscan: f64,
    /// Delay after a drag ends before clicks are accepted again and the pan is persisted.
    pub drag_debounce_ms: u64,
    /// Modifier that turns a click into a secondary click.
    pub secondary_modifier: Modifiers,
    /// Notice reported when a childless node is clicked and no click callback is set.
    pub leaf_notice: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sizing: SizingConfig::default(),
            layout: LayoutConfig::default(),
            paint: PaintStyle::default(),
            animation_ms: 100,
            hit_overscan: 4.0,
            drag_debounce_ms: 40,
            secondary_modifier: Modifiers::CTRL,
            leaf_notice: String::from("node has no children"),
        }
    }
}

impl GraphConfig {
    /// Decodes a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        serde_json::from_str(json).map_err(GraphError::Config)
    }

    /// Encodes the configuration as JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(self).map_err(GraphError::Serialize)
    }
}
