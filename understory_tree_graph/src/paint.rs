// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing contract and the per-frame painter.

use alloc::{string::String, vec::Vec};
use core::f64::consts::{FRAC_PI_2, PI};
use kurbo::{Arc, CubicBez, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use understory_tree_layout::{MonospaceMetrics, SizingConfig, TextMetrics, TreeModel, VisibleMatrix};

use crate::animation::interpolate;

/// Drawing backend.
///
/// The backend also measures label text, since box sizes depend on the font it draws with.
/// Colors are CSS color strings, passed through from node specs and [`PaintStyle`].
pub trait Renderer: TextMetrics {
    /// Clears the whole drawing surface.
    fn clear(&mut self);

    /// Draws a filled box with a border.
    fn draw_box(&mut self, rect: Rect, border: &str, fill: &str);

    /// Strokes a parent-to-child link.
    fn draw_link(&mut self, curve: CubicBez, color: &str);

    /// Strokes the glyph marking a node whose children are hidden.
    fn draw_collapsed_marker(&mut self, arc: Arc, color: &str);

    /// Draws a label. `anchor` is the left end of the text's vertical middle.
    fn draw_text(&mut self, text: &str, anchor: Point, color: &str);

    /// Draws an image scaled into `rect`.
    fn draw_image(&mut self, image_ref: &str, rect: Rect);
}

/// Colors and glyph geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintStyle {
    /// Horizontal offset of the link curve's control points.
    pub bezier_radius: f64,
    /// Radius of the collapsed-children marker.
    pub marker_radius: f64,
    /// Fill for nodes without a color.
    pub default_fill: String,
    /// Label color.
    pub text_color: String,
    /// Box border color.
    pub border_color: String,
    /// Link and marker color.
    pub line_color: String,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            bezier_radius: 14.0,
            marker_radius: 4.0,
            default_fill: String::from("rgba(255,255,255,0.5)"),
            text_color: String::from("#121212"),
            border_color: String::from("#888"),
            line_color: String::from("#AAA"),
        }
    }
}

impl PaintStyle {
    /// Link from a parent's right-middle anchor to a child's left-middle anchor.
    pub fn link(&self, from: Point, to: Point) -> CubicBez {
        let handle = Vec2::new(self.bezier_radius, 0.0);
        CubicBez::new(from, from + handle, to - handle, to)
    }

    /// Right-facing half circle centered just outside a box's right edge.
    pub fn collapsed_marker(&self, rect: Rect) -> Arc {
        Arc {
            center: Point::new(rect.x1 + 1.0, rect.y0 + rect.height() / 2.0 + 1.0),
            radii: Vec2::new(self.marker_radius, self.marker_radius),
            start_angle: FRAC_PI_2,
            sweep_angle: -PI,
            x_rotation: 0.0,
        }
    }
}

/// Paints one frame at animation progress `pct`.
///
/// Each visible node is drawn at the interpolation between its committed and scheduled
/// positions. Links run between interpolated positions, so they follow the boxes while
/// they move.
pub fn paint<D, R: Renderer + ?Sized>(
    model: &TreeModel<D>,
    matrix: &VisibleMatrix,
    pct: f64,
    style: &PaintStyle,
    sizing: &SizingConfig,
    renderer: &mut R,
) {
    renderer.clear();

    let mut drawn = Vec::new();
    drawn.resize(model.count_nodes(), Point::ZERO);
    for id in matrix.iter() {
        if let Some(node) = model.node(id) {
            drawn[id.get() as usize] = interpolate(node.position, node.scheduled, pct);
        }
    }

    for id in matrix.iter() {
        let Some(node) = model.node(id) else {
            continue;
        };
        let origin = drawn[id.get() as usize];
        let rect = Rect::from_origin_size(origin, node.size());

        if let Some(parent) = node.parent().and_then(|p| model.node(p)) {
            let p = drawn[parent.id().get() as usize];
            let size = parent.size();
            let from = Point::new(p.x + size.width, p.y + size.height / 2.0);
            let to = Point::new(origin.x, origin.y + rect.height() / 2.0);
            renderer.draw_link(style.link(from, to), &style.line_color);
        }
        if node.has_children() && !node.expanded {
            renderer.draw_collapsed_marker(style.collapsed_marker(rect), &style.line_color);
        }

        let fill = node.color().unwrap_or(&style.default_fill);
        renderer.draw_box(rect, &style.border_color, fill);

        let mut text_x = origin.x + sizing.x_box_padding;
        if let (Some(image), Some(image_size)) = (node.image(), node.image_size()) {
            let at = origin + Vec2::new(1.0, 1.0);
            renderer.draw_image(image, Rect::from_origin_size(at, image_size));
            text_x += image_size.width + 1.0;
        }
        renderer.draw_text(
            node.label(),
            Point::new(text_x, origin.y + rect.height() / 2.0),
            &style.text_color,
        );
    }
}

/// A recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Surface cleared.
    Clear,
    /// A node box.
    Box {
        /// Box bounds.
        rect: Rect,
        /// Border color.
        border: String,
        /// Fill color.
        fill: String,
    },
    /// A parent-to-child link.
    Link {
        /// Link geometry.
        curve: CubicBez,
        /// Stroke color.
        color: String,
    },
    /// A collapsed-children marker.
    CollapsedMarker {
        /// Marker geometry.
        arc: Arc,
        /// Stroke color.
        color: String,
    },
    /// A label.
    Text {
        /// Label text.
        text: String,
        /// Left-middle anchor.
        anchor: Point,
        /// Text color.
        color: String,
    },
    /// An image.
    Image {
        /// Image reference.
        image_ref: String,
        /// Destination bounds.
        rect: Rect,
    },
}

/// A [`Renderer`] that records commands for later replay.
///
/// Each [`clear`](Renderer::clear) starts a new frame, so the list always holds the most
/// recent frame only. Text is measured with `M`.
#[derive(Clone, Debug, Default)]
pub struct DisplayList<M = MonospaceMetrics> {
    metrics: M,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl<M: TextMetrics> DisplayList<M> {
    /// Creates an empty list measuring text with `metrics`.
    pub fn new(metrics: M) -> Self {
        Self {
            metrics,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Commands of the most recent frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames started so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Boxes of the most recent frame, in drawing order.
    pub fn boxes(&self) -> impl Iterator<Item = Rect> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Box { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Labels of the most recent frame, in drawing order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl<M: TextMetrics> TextMetrics for DisplayList<M> {
    fn text_width(&self, text: &str) -> f64 {
        self.metrics.text_width(text)
    }

    fn line_height(&self) -> f64 {
        self.metrics.line_height()
    }
}

impl<M: TextMetrics> Renderer for DisplayList<M> {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn draw_box(&mut self, rect: Rect, border: &str, fill: &str) {
        self.commands.push(DrawCommand::Box {
            rect,
            border: String::from(border),
            fill: String::from(fill),
        });
    }

    fn draw_link(&mut self, curve: CubicBez, color: &str) {
        self.commands.push(DrawCommand::Link {
            curve,
            color: String::from(color),
        });
    }

    fn draw_collapsed_marker(&mut self, arc: Arc, color: &str) {
        self.commands.push(DrawCommand::CollapsedMarker {
            arc,
            color: String::from(color),
        });
    }

    fn draw_text(&mut self, text: &str, anchor: Point, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: String::from(text),
            anchor,
            color: String::from(color),
        });
    }

    fn draw_image(&mut self, image_ref: &str, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            image_ref: String::from(image_ref),
            rect,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use understory_tree_layout::{ImageSource, NodeId, NodeSpec};

    struct Icons;

    impl ImageSource for Icons {
        fn image_size(&mut self, _image_ref: &str) -> Option<Size> {
            Some(Size::new(64.0, 64.0))
        }
    }

    fn model() -> TreeModel {
        let mut model = TreeModel::default();
        model.load(
            NodeSpec::new("root")
                .with_color("red")
                .child(NodeSpec::new("a").with_image("a.png"))
                .child(NodeSpec::new("b").child(NodeSpec::new("hidden"))),
            &MonospaceMetrics::default(),
            &mut Icons,
        );
        model.node_mut(NodeId::new(0)).unwrap().position = Point::new(0.0, 40.0);
        model.node_mut(NodeId::new(1)).unwrap().position = Point::new(100.0, 0.0);
        model.node_mut(NodeId::new(2)).unwrap().position = Point::new(100.0, 80.0);
        model
    }

    fn painted(model: &TreeModel, pct: f64) -> DisplayList {
        let mut list = DisplayList::default();
        paint(
            model,
            &model.visible_matrix(),
            pct,
            &PaintStyle::default(),
            &SizingConfig::default(),
            &mut list,
        );
        list
    }

    #[test]
    fn frame_starts_with_clear_and_draws_visible_nodes() {
        let list = painted(&model(), 1.0);
        assert_eq!(list.commands()[0], DrawCommand::Clear);
        assert_eq!(list.labels().collect::<Vec<_>>(), ["root", "a", "b"]);
        assert_eq!(list.frames(), 1);
    }

    #[test]
    fn links_join_right_middle_to_left_middle() {
        let list = painted(&model(), 1.0);
        let links: Vec<CubicBez> = list
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Link { curve, .. } => Some(*curve),
                _ => None,
            })
            .collect();
        assert_eq!(links.len(), 2);
        // root is 40x18 at (0, 40); a is 39x23 at (100, 0).
        assert_eq!(links[0].p0, Point::new(40.0, 49.0));
        assert_eq!(links[0].p1, Point::new(54.0, 49.0));
        assert_eq!(links[0].p2, Point::new(86.0, 11.5));
        assert_eq!(links[0].p3, Point::new(100.0, 11.5));
    }

    #[test]
    fn collapsed_nodes_get_a_marker() {
        let list = painted(&model(), 1.0);
        let markers: Vec<Arc> = list
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::CollapsedMarker { arc, .. } => Some(*arc),
                _ => None,
            })
            .collect();
        assert_eq!(markers.len(), 1, "only b hides children");
        // b is 16x18 at (100, 80).
        assert_eq!(markers[0].center, Point::new(117.0, 90.0));
        assert_eq!(markers[0].sweep_angle, -PI);
    }

    #[test]
    fn images_shift_the_label() {
        let list = painted(&model(), 1.0);
        let image = list.commands().iter().find_map(|cmd| match cmd {
            DrawCommand::Image { rect, .. } => Some(*rect),
            _ => None,
        });
        assert_eq!(image, Some(Rect::new(101.0, 1.0, 123.0, 23.0)));
        let anchor = list.commands().iter().find_map(|cmd| match cmd {
            DrawCommand::Text { text, anchor, .. } if text == "a" => Some(*anchor),
            _ => None,
        });
        assert_eq!(anchor, Some(Point::new(127.0, 11.5)));
    }

    #[test]
    fn fills_fall_back_to_default() {
        let list = painted(&model(), 1.0);
        let fills: Vec<&str> = list
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Box { fill, .. } => Some(fill.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, ["red", "rgba(255,255,255,0.5)", "rgba(255,255,255,0.5)"]);
    }

    #[test]
    fn boxes_are_drawn_at_interpolated_positions() {
        let mut model = model();
        model.node_mut(NodeId::new(1)).unwrap().scheduled = Some(Point::new(200.0, 0.0));
        let list = painted(&model, 0.5);
        let a = list.boxes().nth(1).unwrap();
        assert_eq!(a.origin(), Point::new(150.0, 0.0));
        // The link follows the moving box.
        let link = list.commands().iter().find_map(|cmd| match cmd {
            DrawCommand::Link { curve, .. } => Some(*curve),
            _ => None,
        });
        assert_eq!(link.unwrap().p3, Point::new(150.0, 11.5));
    }

    #[test]
    fn repaint_replaces_previous_frame() {
        let model = model();
        let matrix = model.visible_matrix();
        let mut list: DisplayList = DisplayList::default();
        for _ in 0..3 {
            paint(&model, &matrix, 1.0, &PaintStyle::default(), &SizingConfig::default(), &mut list);
        }
        assert_eq!(list.frames(), 3);
        assert_eq!(list.boxes().count(), 3);
    }
}
