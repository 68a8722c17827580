// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column layout: turns a visible matrix into scheduled node positions.

use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size};

use crate::model::{TreeModel, VisibleMatrix};
use crate::types::NodeId;

/// Spacing parameters for the layout passes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Vertical padding above and below every node box.
    pub y_node_padding: f64,
    /// Minimum horizontal distance between a column and the widest box of the previous one.
    pub x_min_padding: f64,
    /// Extra vertical gap inserted before each branching sibling after the first.
    pub y_branch_gap: f64,
    /// Column pitch used by the preliminary pass, before widths are known.
    pub column_unit: f64,
    /// Horizontal root anchor as a fraction of the viewport width.
    pub anchor_x_fraction: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            y_node_padding: 5.0,
            x_min_padding: 30.0,
            y_branch_gap: 10.0,
            column_unit: 80.0,
            anchor_x_fraction: 0.1,
        }
    }
}

/// Computes scheduled positions for visible nodes.
///
/// [`LayoutEngine::arrange`] runs four ordered passes over the visible matrix:
///
/// 1. Preliminary column stacking.
/// 2. Bottom-up adjustment of internal nodes: every open node is centered on its children,
///    and the leaves of each column are fitted around those parents.
/// 3. Branch gaps: open siblings after the first branching one are pushed down by a fixed
///    gap, and parents are re-centered.
/// 4. Horizontal spacing so that no column overlaps the widest box of the previous one.
///
/// The result lands in each visible node's `scheduled` slot; committed positions are left
/// alone so that an animation can interpolate between the two. The engine owns a scratch
/// buffer that is reused between runs.
///
/// ## Example
///
/// ```rust
/// use kurbo::Size;
/// use understory_tree_layout::{LayoutEngine, MonospaceMetrics, NoImages, NodeSpec, TreeModel};
///
/// let spec: NodeSpec = NodeSpec::new("root")
///     .child(NodeSpec::new("a"))
///     .child(NodeSpec::new("b"));
/// let mut model = TreeModel::default();
/// model.load(spec, &MonospaceMetrics::default(), &mut NoImages);
///
/// let matrix = model.visible_matrix();
/// let mut engine = LayoutEngine::default();
/// engine.layout(&mut model, &matrix, Size::new(800.0, 600.0));
///
/// let root = model.node(matrix.root().unwrap()).unwrap();
/// assert_eq!(root.scheduled.unwrap(), engine.anchor_point(root.size(), Size::new(800.0, 600.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    scratch: Vec<Point>,
}

impl LayoutEngine {
    /// Creates an engine with the given spacing.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            scratch: Vec::new(),
        }
    }

    /// Spacing in use.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs the four layout passes and schedules every visible node.
    ///
    /// Nodes outside `matrix` are not touched. The matrix must come from `model`.
    pub fn arrange<D>(&mut self, model: &mut TreeModel<D>, matrix: &VisibleMatrix) {
        let Some(root) = matrix.root() else {
            return;
        };
        self.scratch.clear();
        self.scratch.resize(model.count_nodes(), Point::ZERO);

        let mut passes = Passes {
            model: &*model,
            pos: &mut self.scratch,
            config: &self.config,
        };
        passes.preliminary(matrix);
        passes.adjust_internal_nodes(matrix);
        passes.increase_branch_gap(root);
        passes.adjust_horizontally(matrix);

        for id in matrix.iter() {
            model.at_mut(id).scheduled = Some(self.scratch[id.idx()]);
        }
        tracing::trace!(
            columns = matrix.depth(),
            nodes = matrix.len(),
            "arranged visible nodes"
        );
    }

    /// Where the root's top-left corner is anchored inside `viewport`.
    ///
    /// Horizontally a fixed fraction of the width from the left edge; vertically centered.
    pub fn anchor_point(&self, root_size: Size, viewport: Size) -> Point {
        Point::new(
            (viewport.width * self.config.anchor_x_fraction).round(),
            (viewport.height / 2.0 - root_size.height / 2.0).round(),
        )
    }

    /// Translates every scheduled position so the root lands on the anchor point.
    pub fn anchor_root<D>(&self, model: &mut TreeModel<D>, matrix: &VisibleMatrix, viewport: Size) {
        let Some(root) = matrix.root() else {
            return;
        };
        let root = model.at(root);
        let delta = self.anchor_point(root.size(), viewport) - root.target();
        for id in matrix.iter() {
            let node = model.at_mut(id);
            node.scheduled = Some(node.target() + delta);
        }
    }

    /// Arranges and anchors in one go.
    pub fn layout<D>(&mut self, model: &mut TreeModel<D>, matrix: &VisibleMatrix, viewport: Size) {
        self.arrange(model, matrix);
        self.anchor_root(model, matrix, viewport);
    }

    /// Translates the layout so that `pinned` keeps its committed position.
    ///
    /// Scheduled positions move; nodes without a schedule have their committed position
    /// moved instead. Used after a toggle so the clicked box stays under the pointer.
    pub fn pin<D>(&self, model: &mut TreeModel<D>, matrix: &VisibleMatrix, pinned: NodeId) {
        let Some(node) = model.node(pinned) else {
            return;
        };
        let offset = node.position - node.target();
        for id in matrix.iter() {
            let node = model.at_mut(id);
            match node.scheduled.as_mut() {
                Some(target) => *target += offset,
                None => node.position += offset,
            }
        }
    }
}

/// Working state shared by the layout passes.
///
/// Positions are kept in a dense buffer indexed by [`NodeId`] while the model stays
/// read-only, then copied into the model's schedule at the end.
struct Passes<'a, D> {
    model: &'a TreeModel<D>,
    pos: &'a mut [Point],
    config: &'a LayoutConfig,
}

impl<D> Passes<'_, D> {
    fn height(&self, id: NodeId) -> f64 {
        self.model.at(id).size().height
    }

    /// Height plus padding above and below.
    fn slot(&self, id: NodeId) -> f64 {
        self.height(id) + 2.0 * self.config.y_node_padding
    }

    fn preliminary(&mut self, matrix: &VisibleMatrix) {
        let pad = self.config.y_node_padding;
        for (depth, row) in matrix.rows().iter().enumerate() {
            let x = depth as f64 * self.config.column_unit;
            let mut y = 0.0;
            for &id in row {
                self.pos[id.idx()] = Point::new(x, y + pad);
                y += self.slot(id);
            }
        }
    }

    fn align_to_children(&mut self, id: NodeId) {
        let node = self.model.at(id);
        if !node.expanded {
            return;
        }
        let (Some(&first), Some(&last)) = (node.children().first(), node.children().last()) else {
            return;
        };
        let pad = self.config.y_node_padding;
        let top = self.pos[first.idx()].y - pad;
        let bottom = self.pos[last.idx()].y + self.height(last) + pad;
        self.pos[id.idx()].y = (top + (bottom - top) / 2.0 - node.size().height / 2.0).round();
    }

    /// Moves `id` and its visible descendants down by `dy`.
    fn move_down(&mut self, id: NodeId, dy: f64) {
        let model = self.model;
        self.pos[id.idx()].y += dy;
        let node = model.at(id);
        if node.expanded {
            for &child in node.children() {
                self.move_down(child, dy);
            }
        }
    }

    fn adjust_internal_nodes(&mut self, matrix: &VisibleMatrix) {
        let rows = matrix.rows();
        if rows.len() < 2 {
            return;
        }
        // The deepest column has no parents; start one above it.
        for column in rows[..rows.len() - 1].iter().rev() {
            let mut last_parent: Option<usize> = None;
            for (i, &id) in column.iter().enumerate() {
                if !self.model.at(id).is_open() {
                    continue;
                }
                self.align_to_children(id);
                match last_parent {
                    None => self.stack_above(column, i),
                    Some(prev) => self.fit_between(column, prev, i),
                }
                last_parent = Some(i);
            }
            if let Some(prev) = last_parent {
                self.stack_below(column, prev);
            }
        }
    }

    /// Stacks the leaves above the first parent of a column upward from it.
    fn stack_above(&mut self, column: &[NodeId], parent: usize) {
        let pad = self.config.y_node_padding;
        let mut y = self.pos[column[parent].idx()].y - pad;
        for &leaf in column[..parent].iter().rev() {
            y -= self.slot(leaf);
            self.pos[leaf.idx()].y = y + pad;
        }
    }

    /// Makes room between two consecutive parents and spreads the leaves between them.
    fn fit_between(&mut self, column: &[NodeId], prev: usize, parent: usize) {
        let pad = self.config.y_node_padding;
        let above = column[prev];
        let top = self.pos[above.idx()].y + self.height(above) + pad;
        let bottom = self.pos[column[parent].idx()].y - pad;
        let leaves = &column[prev + 1..parent];
        let min_room: f64 = leaves.iter().map(|&leaf| self.slot(leaf)).sum();
        let available = bottom - top;

        if min_room > available {
            let shortfall = min_room - available;
            for &later in &column[parent..] {
                self.move_down(later, shortfall);
            }
        }
        if min_room <= 0.0 {
            return;
        }

        // Each leaf gets a share of the room proportional to its own slot and is centered in it.
        let room = min_room.max(available);
        let mut y = top;
        for &leaf in leaves {
            let share = self.slot(leaf) / min_room * room;
            self.pos[leaf.idx()].y = (y + share / 2.0 - self.height(leaf) / 2.0).round();
            y += share;
        }
    }

    /// Stacks the leaves below the last parent of a column downward from it.
    fn stack_below(&mut self, column: &[NodeId], parent: usize) {
        let pad = self.config.y_node_padding;
        let last = column[parent];
        let mut y = self.pos[last.idx()].y + self.height(last) + pad;
        for &leaf in &column[parent + 1..] {
            self.pos[leaf.idx()].y = y + pad;
            y += self.slot(leaf);
        }
    }

    /// Separates branching sibling subtrees; returns how far the children of `id` moved down.
    fn increase_branch_gap(&mut self, id: NodeId) -> f64 {
        let model = self.model;
        let node = model.at(id);
        if !node.expanded {
            return 0.0;
        }
        let children = node.children();
        let gap = self.config.y_branch_gap;
        let mut moved = 0.0;
        let mut first_branch = true;
        for (i, &child) in children.iter().enumerate() {
            if !model.at(child).is_open() {
                continue;
            }
            if first_branch {
                first_branch = false;
            } else {
                for &later in &children[i..] {
                    self.move_down(later, gap);
                }
                moved += gap;
            }
            let grown = self.increase_branch_gap(child);
            for &later in &children[i + 1..] {
                self.move_down(later, grown);
            }
            moved += grown;
        }
        self.align_to_children(id);
        moved
    }

    fn adjust_horizontally(&mut self, matrix: &VisibleMatrix) {
        let rows = matrix.rows();
        for depth in 1..rows.len() {
            let x = rows[depth - 1]
                .iter()
                .map(|&id| {
                    self.pos[id.idx()].x + self.model.at(id).size().width + self.config.x_min_padding
                })
                .fold(0.0, f64::max);
            for &id in &rows[depth] {
                self.pos[id.idx()].x = x;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{MonospaceMetrics, NoImages};
    use crate::types::NodeSpec;

    const VIEWPORT: Size = Size::new(1000.0, 600.0);

    fn loaded(spec: NodeSpec) -> TreeModel {
        let mut model = TreeModel::default();
        model.load(spec, &MonospaceMetrics::default(), &mut NoImages);
        model
    }

    fn arranged(model: &mut TreeModel) -> VisibleMatrix {
        let matrix = model.visible_matrix();
        LayoutEngine::default().arrange(model, &matrix);
        matrix
    }

    fn sched(model: &TreeModel, id: u32) -> Point {
        model.at(NodeId(id)).scheduled.unwrap()
    }

    fn center_y(model: &TreeModel, id: u32) -> f64 {
        sched(model, id).y + model.at(NodeId(id)).size().height / 2.0
    }

    #[test]
    fn collapsed_root_stays_at_origin_column() {
        let mut model = loaded(NodeSpec::new("root").expanded(false).child(NodeSpec::new("a")));
        arranged(&mut model);
        assert_eq!(sched(&model, 0), Point::new(0.0, 5.0));
        assert!(model.at(NodeId(1)).scheduled.is_none(), "hidden nodes stay unscheduled");
    }

    #[test]
    fn leaf_column_is_stacked_with_padding() {
        let mut model = loaded(
            NodeSpec::new("root")
                .child(NodeSpec::new("a"))
                .child(NodeSpec::new("b"))
                .child(NodeSpec::new("c")),
        );
        arranged(&mut model);
        // Line height 18 and padding 5 give a 28px pitch.
        assert_eq!(sched(&model, 1).y, 5.0);
        assert_eq!(sched(&model, 2).y, 33.0);
        assert_eq!(sched(&model, 3).y, 61.0);
        // Root is centered on the span 0..84.
        assert_eq!(sched(&model, 0).y, 33.0);
    }

    #[test]
    fn columns_clear_the_widest_previous_box() {
        let mut model = loaded(
            NodeSpec::new("r")
                .child(NodeSpec::new("short"))
                .child(NodeSpec::new("a much longer label").child(NodeSpec::new("x")))
                .expanded(true),
        );
        model.at_mut(NodeId(2)).expanded = true;
        arranged(&mut model);
        let root_right = sched(&model, 0).x + model.at(NodeId(0)).size().width;
        assert_eq!(sched(&model, 1).x, root_right + 30.0);
        assert_eq!(sched(&model, 2).x, sched(&model, 1).x, "a column shares one x");
        let widest = model.at(NodeId(2)).size().width;
        assert_eq!(sched(&model, 3).x, sched(&model, 2).x + widest + 30.0);
    }

    #[test]
    fn leaves_above_first_parent_hug_it() {
        // root -> [a, b, p -> [p1, p2, p3]]
        let mut model = loaded(
            NodeSpec::new("root")
                .child(NodeSpec::new("a"))
                .child(NodeSpec::new("b"))
                .child(NodeSpec::new("p").with_children([
                    NodeSpec::new("p1"),
                    NodeSpec::new("p2"),
                    NodeSpec::new("p3"),
                ])),
        );
        model.at_mut(NodeId(3)).expanded = true;
        arranged(&mut model);
        // p is centered on its three children (5..89 span -> y = 33).
        assert_eq!(sched(&model, 3).y, 33.0);
        assert_eq!(sched(&model, 2).y, 5.0, "b sits one pitch above p");
        assert_eq!(sched(&model, 1).y, -23.0, "a sits one pitch above b");
    }

    #[test]
    fn parents_are_pushed_apart_to_fit_leaves() {
        // root -> [p -> [p1], leaf, q -> [q1]]
        let mut model = loaded(
            NodeSpec::new("root")
                .child(NodeSpec::new("p").child(NodeSpec::new("p1")))
                .child(NodeSpec::new("leaf"))
                .child(NodeSpec::new("q").child(NodeSpec::new("q1"))),
        );
        model.at_mut(NodeId(1)).expanded = true;
        model.at_mut(NodeId(4)).expanded = true;
        arranged(&mut model);

        let p = sched(&model, 1).y;
        let leaf = sched(&model, 3).y;
        let q = sched(&model, 4).y;
        assert!(leaf >= p + 18.0 + 10.0, "leaf must clear p with padding: {p} {leaf}");
        assert!(q >= leaf + 18.0 + 10.0, "q must clear the leaf with padding: {leaf} {q}");
        // Children follow their parents.
        assert_eq!(center_y(&model, 2), center_y(&model, 1));
        assert_eq!(center_y(&model, 5), center_y(&model, 4));
    }

    #[test]
    fn branch_gap_separates_branching_siblings() {
        let spec = || {
            NodeSpec::new("root")
                .child(NodeSpec::new("p").child(NodeSpec::new("p1")))
                .child(NodeSpec::new("q").child(NodeSpec::new("q1")))
        };
        let mut model = loaded(spec());
        model.at_mut(NodeId(1)).expanded = true;
        model.at_mut(NodeId(3)).expanded = true;
        let matrix = model.visible_matrix();
        LayoutEngine::new(LayoutConfig {
            y_branch_gap: 0.0,
            ..LayoutConfig::default()
        })
        .arrange(&mut model, &matrix);
        let tight = sched(&model, 3).y - sched(&model, 1).y;

        arranged(&mut model);
        let spaced = sched(&model, 3).y - sched(&model, 1).y;
        assert_eq!(spaced - tight, 10.0, "one gap between two branching siblings");
    }

    #[test]
    fn leaf_siblings_get_no_branch_gap() {
        let mut model = loaded(
            NodeSpec::new("root")
                .child(NodeSpec::new("a"))
                .child(NodeSpec::new("b").child(NodeSpec::new("hidden"))),
        );
        arranged(&mut model);
        // b is collapsed, so it stacks like a leaf.
        assert_eq!(sched(&model, 2).y - sched(&model, 1).y, 28.0);
    }

    #[test]
    fn anchoring_puts_root_at_anchor_point() {
        let mut model = loaded(NodeSpec::new("root").child(NodeSpec::new("a")));
        let matrix = model.visible_matrix();
        let mut engine = LayoutEngine::default();
        engine.layout(&mut model, &matrix, VIEWPORT);
        assert_eq!(sched(&model, 0), Point::new(100.0, 291.0));
        // Relative layout is preserved.
        assert_eq!(sched(&model, 1).y, sched(&model, 0).y);
    }

    #[test]
    fn arrange_is_deterministic() {
        let spec = || {
            NodeSpec::new("root")
                .child(NodeSpec::new("a").with_children([NodeSpec::new("a1"), NodeSpec::new("a2")]))
                .child(NodeSpec::new("b"))
                .child(NodeSpec::new("c").with_children([NodeSpec::new("c1")]))
        };
        let run = || {
            let mut model = loaded(spec());
            model.expand_all();
            let matrix = model.visible_matrix();
            LayoutEngine::default().layout(&mut model, &matrix, VIEWPORT);
            model.iter().map(|n| n.scheduled).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn pin_keeps_node_in_place() {
        let mut model = loaded(NodeSpec::new("root").child(NodeSpec::new("a")));
        model.at_mut(NodeId(0)).position = Point::new(300.0, 200.0);
        let matrix = arranged(&mut model);
        let before = sched(&model, 1) - sched(&model, 0);
        LayoutEngine::default().pin(&mut model, &matrix, NodeId(0));
        assert_eq!(sched(&model, 0), Point::new(300.0, 200.0));
        assert_eq!(sched(&model, 1) - sched(&model, 0), before);
    }

    #[test]
    fn pin_moves_committed_positions_without_schedule() {
        let mut model = loaded(NodeSpec::new("root").child(NodeSpec::new("a")));
        let matrix = model.visible_matrix();
        model.at_mut(NodeId(0)).scheduled = Some(Point::new(10.0, 10.0));
        LayoutEngine::default().pin(&mut model, &matrix, NodeId(0));
        assert_eq!(model.at(NodeId(1)).position, Point::new(-10.0, -10.0));
        assert_eq!(sched(&model, 0), Point::ZERO);
    }

    #[test]
    fn empty_matrix_is_a_no_op() {
        let mut model: TreeModel = TreeModel::default();
        let matrix = model.visible_matrix();
        let mut engine = LayoutEngine::default();
        engine.layout(&mut model, &matrix, VIEWPORT);
        assert!(model.is_empty());
    }
}
