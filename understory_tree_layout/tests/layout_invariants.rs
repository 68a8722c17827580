// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariants for the column layout over random trees.
//!
//! 1. Two layout runs over the same tree produce identical coordinates.
//! 2. Boxes in the same column never overlap vertically.
//! 3. Every open parent is centered on the span of its children.
//! 4. The root always lands on the anchor point.
//! 5. Hit testing finds each box from its center and nothing left of the diagram.

use kurbo::{Point, Size};
use proptest::prelude::*;
use proptest::sample::Index;
use understory_tree_layout::{
    ImageSource, LayoutEngine, MonospaceMetrics, NodeId, NodeSpec, TreeModel, VisibleMatrix,
    node_at_point,
};

/// Resolves every image, so nodes with an image get the forced image height.
struct AllImages;

impl ImageSource for AllImages {
    fn image_size(&mut self, _image_ref: &str) -> Option<Size> {
        Some(Size::new(16.0, 16.0))
    }
}

#[derive(Clone, Debug)]
struct Shape {
    parent: Index,
    label_len: usize,
    expanded: bool,
    image: bool,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (any::<Index>(), 1_usize..12, any::<bool>(), any::<bool>()).prop_map(
        |(parent, label_len, expanded, image)| Shape {
            parent,
            label_len,
            expanded,
            image,
        },
    )
}

/// Builds a spec from a flat list where entry `k` describes node `k + 1` and picks its parent
/// among nodes `0..=k`.
fn build_spec(shapes: &[Shape]) -> NodeSpec {
    let count = shapes.len() + 1;
    let mut children = vec![Vec::new(); count];
    for (k, shape) in shapes.iter().enumerate() {
        children[shape.parent.index(k + 1)].push(k + 1);
    }

    fn make(i: usize, shapes: &[Shape], children: &[Vec<usize>]) -> NodeSpec {
        let mut spec = match i.checked_sub(1).map(|k| &shapes[k]) {
            None => NodeSpec::new("root"),
            Some(shape) => {
                let spec = NodeSpec::new("w".repeat(shape.label_len)).expanded(shape.expanded);
                if shape.image { spec.with_image("icon.png") } else { spec }
            }
        };
        for &child in &children[i] {
            spec = spec.child(make(child, shapes, children));
        }
        spec
    }

    make(0, shapes, &children)
}

fn tree_strategy() -> impl Strategy<Value = NodeSpec> {
    prop::collection::vec(shape_strategy(), 0..40).prop_map(|shapes| build_spec(&shapes))
}

fn viewport_strategy() -> impl Strategy<Value = Size> {
    (100_u32..2000, 100_u32..2000).prop_map(|(w, h)| Size::new(f64::from(w), f64::from(h)))
}

fn laid_out(spec: NodeSpec, viewport: Size) -> (TreeModel, VisibleMatrix, LayoutEngine) {
    let mut model = TreeModel::default();
    model.load(spec, &MonospaceMetrics::default(), &mut AllImages);
    let matrix = model.visible_matrix();
    let mut engine = LayoutEngine::default();
    engine.layout(&mut model, &matrix, viewport);
    (model, matrix, engine)
}

fn scheduled(model: &TreeModel, id: NodeId) -> Point {
    model.node(id).unwrap().scheduled.expect("visible nodes are scheduled")
}

proptest! {
    #[test]
    fn layout_is_deterministic(spec in tree_strategy(), viewport in viewport_strategy()) {
        let (first, matrix, _) = laid_out(spec.clone(), viewport);
        let (second, _, _) = laid_out(spec, viewport);
        for id in matrix.iter() {
            prop_assert_eq!(scheduled(&first, id), scheduled(&second, id), "node {:?}", id);
        }
    }
}

proptest! {
    #[test]
    fn same_column_boxes_do_not_overlap(spec in tree_strategy()) {
        let (model, matrix, _) = laid_out(spec, Size::new(800.0, 600.0));
        for row in matrix.rows() {
            for (i, &a) in row.iter().enumerate() {
                for &b in &row[i + 1..] {
                    let (ya, ha) = (scheduled(&model, a).y, model.node(a).unwrap().size().height);
                    let (yb, hb) = (scheduled(&model, b).y, model.node(b).unwrap().size().height);
                    prop_assert!(
                        ya + ha <= yb || yb + hb <= ya,
                        "{:?} at {}+{} overlaps {:?} at {}+{}",
                        a, ya, ha, b, yb, hb
                    );
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn open_parents_are_centered_on_children(spec in tree_strategy()) {
        let (model, matrix, _) = laid_out(spec, Size::new(800.0, 600.0));
        for id in matrix.iter() {
            let node = model.node(id).unwrap();
            if !node.is_open() {
                continue;
            }
            let first = *node.children().first().unwrap();
            let last = *node.children().last().unwrap();
            let span_mid = (scheduled(&model, first).y
                + scheduled(&model, last).y
                + model.node(last).unwrap().size().height)
                / 2.0;
            let center = scheduled(&model, id).y + node.size().height / 2.0;
            prop_assert!(
                (center - span_mid).abs() <= 0.5,
                "{:?} center {} vs children mid {}",
                id, center, span_mid
            );
        }
    }
}

proptest! {
    #[test]
    fn root_lands_on_anchor(spec in tree_strategy(), viewport in viewport_strategy()) {
        let (model, _, engine) = laid_out(spec, viewport);
        let root = model.node(NodeId::ROOT).unwrap();
        prop_assert_eq!(
            root.scheduled,
            Some(engine.anchor_point(root.size(), viewport)),
            "root must sit on the anchor regardless of tree size"
        );
    }
}

proptest! {
    #[test]
    fn hit_test_finds_each_box(spec in tree_strategy()) {
        let (mut model, matrix, _) = laid_out(spec, Size::new(800.0, 600.0));
        model.commit(&matrix);
        let mut leftmost = f64::INFINITY;
        for id in matrix.iter() {
            let rect = model.node(id).unwrap().rect();
            leftmost = leftmost.min(rect.x0);
            prop_assert_eq!(node_at_point(&model, &matrix, rect.center(), 4.0), Some(id));
        }
        prop_assert_eq!(
            node_at_point(&model, &matrix, Point::new(leftmost - 1.0, 300.0), 4.0),
            None,
            "nothing lies left of the diagram"
        );
    }
}
