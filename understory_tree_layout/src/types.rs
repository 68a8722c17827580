// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the tree model: node identifiers, input specs, and node records.

use alloc::{string::String, vec::Vec};
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

/// Identifier for a node in a loaded tree.
///
/// Identifiers are assigned in depth-first (pre-order) traversal order starting at zero
/// every time a tree is loaded, so two loads of structurally identical trees produce the
/// same identifiers for corresponding nodes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The identifier always given to the root of a loaded tree.
    pub const ROOT: Self = Self(0);

    /// Creates an identifier from a raw depth-first index.
    ///
    /// Only meaningful for a tree that has at least `idx + 1` nodes.
    pub const fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw traversal index.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Label used when a spec does not provide one.
pub const DEFAULT_LABEL: &str = "(NO TEXT)";

#[cfg(feature = "serde")]
fn default_label() -> String {
    String::from(DEFAULT_LABEL)
}

/// Caller-supplied description of a tree, consumed by [`TreeModel::load`](crate::TreeModel::load).
///
/// `D` is an opaque user payload carried through to click callbacks unchanged.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpec<D = ()> {
    /// Text drawn inside the node box.
    #[cfg_attr(feature = "serde", serde(default = "default_label"))]
    pub label: String,
    /// Opaque user payload.
    #[cfg_attr(feature = "serde", serde(default))]
    pub data: D,
    /// Fill color; `None` uses the renderer's default fill.
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<String>,
    /// Optional image reference drawn at the left of the label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    /// Initial fold state. `None` means expanded for the root and collapsed elsewhere.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expanded: Option<bool>,
    /// Ordered children. Order drives sibling stacking.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<NodeSpec<D>>,
}

impl<D: Default> NodeSpec<D> {
    /// Creates a childless spec with the given label and a default payload.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: D::default(),
            color: None,
            image: None,
            expanded: None,
            children: Vec::new(),
        }
    }
}

impl<D> NodeSpec<D> {
    /// Sets the user payload.
    #[must_use]
    pub fn with_data(mut self, data: D) -> Self {
        self.data = data;
        self
    }

    /// Sets the fill color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the initial fold state.
    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Appends children in order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// A node of a loaded tree.
///
/// Structural fields (identity, links, depth, intrinsic size) are fixed at load time and only
/// readable. Fold state and coordinates are public because they mutate over the widget's
/// lifetime in response to toggles, drags, and animation commits.
#[derive(Clone, Debug)]
pub struct Node<D = ()> {
    pub(crate) id: NodeId,
    pub(crate) label: String,
    pub(crate) data: D,
    pub(crate) color: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) image_size: Option<Size>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) depth: u32,
    pub(crate) size: Size,
    /// Whether the node's children are shown.
    pub expanded: bool,
    /// Committed (on-screen) top-left corner.
    pub position: Point,
    /// Target top-left corner set by layout and consumed by the animation commit.
    pub scheduled: Option<Point>,
}

impl<D> Node<D> {
    /// Identifier of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// User payload.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Fill color, if one was supplied.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Image reference, if one was supplied.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Drawn image size, present only if the image resolved at load time.
    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    /// Parent link; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns true if the node has any children, visible or not.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if the node is expanded and has children to show.
    ///
    /// These are the nodes that own a span of the next column.
    pub fn is_open(&self) -> bool {
        self.expanded && !self.children.is_empty()
    }

    /// Depth below the root (root is 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Intrinsic box size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Where the node is heading: the scheduled position if any, else the committed one.
    pub fn target(&self) -> Point {
        self.scheduled.unwrap_or(self.position)
    }

    /// Committed box.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Returns true if the node has a scheduled position different from its committed one.
    pub fn is_moving(&self) -> bool {
        self.scheduled.is_some_and(|s| s != self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_keeps_child_order() {
        let spec: NodeSpec = NodeSpec::new("root")
            .child(NodeSpec::new("a"))
            .with_children([NodeSpec::new("b"), NodeSpec::new("c")]);
        let labels: Vec<&str> = spec.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"], "children must stay in insertion order");
        assert_eq!(spec.expanded, None);
    }

    #[test]
    fn root_id_is_zero() {
        assert_eq!(NodeId::ROOT.get(), 0);
        assert!(NodeId::new(1) > NodeId::ROOT);
    }
}
