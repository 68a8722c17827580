// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree model: node storage, load-time preparation, and the visible matrix.

use alloc::vec::Vec;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::measure::{ImageSource, MeasureCache, SizingConfig, TextMetrics};
use crate::types::{Node, NodeId, NodeSpec};

/// Visible nodes grouped by depth.
///
/// Row `d` holds, in depth-first order, every node at depth `d` reachable from the root by
/// following expanded nodes only. Row 0 holds the root alone. A matrix is a snapshot: it is
/// recomputed with [`TreeModel::visible_matrix`] after every fold change and never edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleMatrix {
    rows: Vec<Vec<NodeId>>,
}

impl VisibleMatrix {
    /// Rows indexed by depth.
    pub fn rows(&self) -> &[Vec<NodeId>] {
        &self.rows
    }

    /// Nodes visible at `depth`; empty past the deepest visible column.
    pub fn row(&self, depth: usize) -> &[NodeId] {
        self.rows.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of visible columns.
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    /// Total number of visible nodes.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Returns true if nothing is visible (no tree loaded).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The root, if a tree is loaded.
    pub fn root(&self) -> Option<NodeId> {
        self.rows.first().and_then(|row| row.first()).copied()
    }

    /// Iterates visible nodes column by column, top to bottom within a column.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.rows.iter().flatten().copied()
    }

    /// Returns true if `id` is visible.
    pub fn contains(&self, id: NodeId) -> bool {
        self.iter().any(|v| v == id)
    }
}

/// Owns the node hierarchy of one loaded tree.
///
/// Nodes live in a flat vector indexed by [`NodeId`]; parents own their children through
/// ordered child lists and the parent link is a plain lookup. Recursive walks are bounded by
/// tree depth; the model does not guard against pathological depth or cyclic input.
///
/// ## Example
///
/// ```rust
/// use understory_tree_layout::{MonospaceMetrics, NoImages, NodeSpec, TreeModel};
///
/// let spec: NodeSpec = NodeSpec::new("root")
///     .child(NodeSpec::new("a").child(NodeSpec::new("a.1")))
///     .child(NodeSpec::new("b"));
///
/// let mut model = TreeModel::default();
/// model.load(spec, &MonospaceMetrics::default(), &mut NoImages);
///
/// // The root starts expanded, so its children are visible but "a.1" is not.
/// let matrix = model.visible_matrix();
/// assert_eq!(matrix.depth(), 2);
/// assert_eq!(matrix.len(), 3);
/// assert_eq!(model.count_nodes(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct TreeModel<D = ()> {
    nodes: Vec<Node<D>>,
    sizing: SizingConfig,
    measure: MeasureCache,
}

impl<D> Default for TreeModel<D> {
    fn default() -> Self {
        Self::new(SizingConfig::default())
    }
}

impl<D> TreeModel<D> {
    /// Creates an empty model that sizes node boxes with `sizing`.
    pub fn new(sizing: SizingConfig) -> Self {
        Self {
            nodes: Vec::new(),
            sizing,
            measure: MeasureCache::default(),
        }
    }

    /// Replaces the current tree with `spec`.
    ///
    /// Identifiers restart at zero and are assigned depth-first, so equivalent specs always
    /// produce equal identifiers. Depths and intrinsic sizes are computed here once; the
    /// measurement cache is reset first. Images that fail to resolve are reported through
    /// `tracing` and otherwise ignored.
    pub fn load(
        &mut self,
        spec: NodeSpec<D>,
        metrics: &dyn TextMetrics,
        images: &mut dyn ImageSource,
    ) {
        self.nodes.clear();
        self.measure.reset();
        self.build(spec, None, 0, metrics, images);
        tracing::debug!(nodes = self.nodes.len(), "loaded tree");
    }

    fn build(
        &mut self,
        spec: NodeSpec<D>,
        parent: Option<NodeId>,
        depth: u32,
        metrics: &dyn TextMetrics,
        images: &mut dyn ImageSource,
    ) -> NodeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(self.nodes.len() as u32);
        let NodeSpec {
            label,
            data,
            color,
            image,
            expanded,
            children,
        } = spec;

        let mut size = self.measure.label_box(&label, metrics, &self.sizing);
        let mut image_size = None;
        if let Some(image_ref) = image.as_deref() {
            match images.image_size(image_ref) {
                Some(natural) => {
                    let drawn = self.sizing.drawn_image_size(natural);
                    size = self.sizing.with_image(size, drawn);
                    image_size = Some(drawn);
                }
                None => {
                    tracing::warn!(image = image_ref, node = id.get(), "failed to load image");
                }
            }
        }

        self.nodes.push(Node {
            id,
            label,
            data,
            color,
            image,
            image_size,
            parent,
            children: SmallVec::new(),
            depth,
            size,
            expanded: expanded.unwrap_or(parent.is_none()),
            position: Point::ZERO,
            scheduled: None,
        });

        for child in children {
            let child_id = self.build(child, Some(id), depth + 1, metrics, images);
            self.nodes[id.idx()].children.push(child_id);
        }
        id
    }

    /// Sizing configuration used at load time.
    pub fn sizing(&self) -> &SizingConfig {
        &self.sizing
    }

    /// Root identifier, or `None` if no tree is loaded.
    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId::ROOT)
    }

    /// Returns true if no tree is loaded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes, visible or not.
    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node<D>> {
        self.nodes.get(id.idx())
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<D>> {
        self.nodes.get_mut(id.idx())
    }

    /// Looks up a node by identifier; same as [`TreeModel::node`].
    pub fn find_by_id(&self, id: NodeId) -> Option<&Node<D>> {
        self.node(id)
    }

    /// Access a node; panics if `id` does not belong to this tree.
    pub(crate) fn at(&self, id: NodeId) -> &Node<D> {
        &self.nodes[id.idx()]
    }

    /// Access a node mutably; panics if `id` does not belong to this tree.
    pub(crate) fn at_mut(&mut self, id: NodeId) -> &mut Node<D> {
        &mut self.nodes[id.idx()]
    }

    /// All nodes in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<D>> + '_ {
        self.nodes.iter()
    }

    /// Derives the visible matrix from the current fold state.
    pub fn visible_matrix(&self) -> VisibleMatrix {
        fn walk<D>(model: &TreeModel<D>, id: NodeId, rows: &mut Vec<Vec<NodeId>>) {
            let node = model.at(id);
            let depth = node.depth as usize;
            if rows.len() <= depth {
                rows.resize_with(depth + 1, Vec::new);
            }
            rows[depth].push(id);
            if node.expanded {
                for &child in &node.children {
                    walk(model, child, rows);
                }
            }
        }

        let mut rows = Vec::new();
        if let Some(root) = self.root() {
            walk(self, root, &mut rows);
        }
        VisibleMatrix { rows }
    }

    /// Every node below `id`, depth-first, regardless of fold state.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        fn walk<D>(model: &TreeModel<D>, id: NodeId, out: &mut Vec<NodeId>) {
            for &child in &model.at(id).children {
                out.push(child);
                walk(model, child, out);
            }
        }

        let mut out = Vec::new();
        if self.node(id).is_some() {
            walk(self, id, &mut out);
        }
        out
    }

    /// Collapses every node, the root included.
    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = false;
        }
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = node.has_children();
        }
    }

    /// Translates the committed position of every node in `matrix` by `delta`.
    pub fn translate(&mut self, matrix: &VisibleMatrix, delta: Vec2) {
        for id in matrix.iter() {
            self.at_mut(id).position += delta;
        }
    }

    /// Commits scheduled positions of the nodes in `matrix` and clears every schedule.
    pub fn commit(&mut self, matrix: &VisibleMatrix) {
        for id in matrix.iter() {
            let node = self.at_mut(id);
            if let Some(target) = node.scheduled {
                node.position = target;
            }
        }
        for node in &mut self.nodes {
            node.scheduled = None;
        }
    }
}
