// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the tree graph demos.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_graph_walkthrough`

use std::collections::HashMap;
use std::fmt::Write as _;

use kurbo::{Arc, CubicBez, Point, Rect, Shape as _, Size};
use understory_tree_graph::Renderer;
use understory_tree_layout::{ImageSource, MonospaceMetrics, NodeSpec, TextMetrics};

/// A small organisation chart; payloads are employee numbers.
pub fn org_chart() -> NodeSpec<u32> {
    NodeSpec::new("Board")
        .with_data(1)
        .with_image("crest.png")
        .child(
            NodeSpec::new("Engineering")
                .with_data(10)
                .with_color("#cde")
                .child(NodeSpec::new("Compilers").with_data(11))
                .child(
                    NodeSpec::new("Graphics")
                        .with_data(12)
                        .child(NodeSpec::new("Text").with_data(121))
                        .child(NodeSpec::new("Paths").with_data(122)),
                ),
        )
        .child(
            NodeSpec::new("Design")
                .with_data(20)
                .with_color("#edc")
                .child(NodeSpec::new("Research").with_data(21)),
        )
        .child(NodeSpec::new("Finance").with_data(30).with_image("missing.png"))
}

/// Images with fixed natural sizes; unknown references fail to load.
#[derive(Clone, Debug, Default)]
pub struct StaticImages {
    sizes: HashMap<String, Size>,
}

impl StaticImages {
    /// Registers `image_ref` with its natural size.
    #[must_use]
    pub fn with(mut self, image_ref: &str, size: Size) -> Self {
        self.sizes.insert(image_ref.to_owned(), size);
        self
    }
}

impl ImageSource for StaticImages {
    fn image_size(&mut self, image_ref: &str) -> Option<Size> {
        self.sizes.get(image_ref).copied()
    }
}

/// Renders frames into SVG markup, measuring text with monospace metrics.
#[derive(Clone, Debug, Default)]
pub struct SvgRenderer {
    metrics: MonospaceMetrics,
    body: String,
}

impl SvgRenderer {
    /// Wraps the last frame in an `<svg>` element of the given size.
    pub fn document(&self, size: Size) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">{}</svg>"#,
            size.width, size.height, self.body
        )
    }
}

impl TextMetrics for SvgRenderer {
    fn text_width(&self, text: &str) -> f64 {
        self.metrics.text_width(text)
    }

    fn line_height(&self) -> f64 {
        self.metrics.line_height()
    }
}

impl Renderer for SvgRenderer {
    fn clear(&mut self) {
        self.body.clear();
    }

    fn draw_box(&mut self, rect: Rect, border: &str, fill: &str) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" stroke="{border}" fill="{fill}"/>"#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
    }

    fn draw_link(&mut self, curve: CubicBez, color: &str) {
        let _ = write!(
            self.body,
            r#"<path d="{}" stroke="{color}" fill="none"/>"#,
            curve.to_path(0.1).to_svg()
        );
    }

    fn draw_collapsed_marker(&mut self, arc: Arc, color: &str) {
        let _ = write!(
            self.body,
            r#"<path d="{}" stroke="{color}" fill="none"/>"#,
            arc.to_path(0.1).to_svg()
        );
    }

    fn draw_text(&mut self, text: &str, anchor: Point, color: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" dominant-baseline="middle" fill="{color}">{text}</text>"#,
            anchor.x, anchor.y
        );
    }

    fn draw_image(&mut self, image_ref: &str, rect: Rect) {
        let _ = write!(
            self.body,
            r#"<image href="{image_ref}" x="{}" y="{}" width="{}" height="{}"/>"#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
    }
}
