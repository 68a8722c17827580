// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point queries against committed node boxes.

use kurbo::Point;

use crate::model::{TreeModel, VisibleMatrix};
use crate::types::NodeId;

/// Finds the visible node under `point`.
///
/// A node matches when `point` lies in the half-open box `[x, x + width) × [y, y + height + overscan)`
/// of its committed position, so a few pixels below each box still count as a hit. Nodes are
/// scanned column by column in matrix order and the first match wins.
pub fn node_at_point<D>(
    model: &TreeModel<D>,
    matrix: &VisibleMatrix,
    point: Point,
    overscan: f64,
) -> Option<NodeId> {
    matrix.iter().find(|&id| {
        let Some(node) = model.node(id) else {
            return false;
        };
        let origin = node.position;
        let size = node.size();
        point.x >= origin.x
            && point.x < origin.x + size.width
            && point.y >= origin.y
            && point.y < origin.y + size.height + overscan
    })
}
