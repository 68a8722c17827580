// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intrinsic node sizing: text metrics, image resolution, and the per-load measurement cache.

use alloc::string::String;
use hashbrown::HashMap;
use kurbo::Size;

/// Text measurement provided by the drawing backend.
pub trait TextMetrics {
    /// Advance width of `text` in the font used for node labels.
    fn text_width(&self, text: &str) -> f64;

    /// Height of one line of label text.
    fn line_height(&self) -> f64;
}

/// Fixed-advance metrics, handy for terminals, tests, and headless hosts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    /// Width of every character.
    pub advance: f64,
    /// Height of a line.
    pub line_height: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 18.0,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> f64 {
        self.advance * text.chars().count() as f64
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}

/// Resolves image references to their natural size.
///
/// Returning `None` means the image failed to load. The node then renders without it.
pub trait ImageSource {
    /// Natural size of the image at `image_ref`, or `None` if it cannot be loaded.
    fn image_size(&mut self, image_ref: &str) -> Option<Size>;
}

/// An [`ImageSource`] that resolves nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn image_size(&mut self, _image_ref: &str) -> Option<Size> {
        None
    }
}

/// Sizing parameters for node boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SizingConfig {
    /// Horizontal padding on each side of the label.
    pub x_box_padding: f64,
    /// Forced square size for every image. `None` keeps each image's natural size.
    pub image_size: Option<f64>,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            x_box_padding: 4.0,
            image_size: Some(22.0),
        }
    }
}

impl SizingConfig {
    /// Size an image is drawn at, given its natural size.
    pub fn drawn_image_size(&self, natural: Size) -> Size {
        match self.image_size {
            Some(side) => Size::new(side, side),
            None => natural,
        }
    }

    /// Grows a label box to make room for an image drawn at `drawn`.
    pub fn with_image(&self, label_box: Size, drawn: Size) -> Size {
        Size::new(
            label_box.width + drawn.width + 1.0,
            label_box.height.max(drawn.height + 1.0),
        )
    }
}

/// Measurement cache owned by a [`TreeModel`](crate::TreeModel).
///
/// Line height is measured once and label widths once per distinct label. Everything is
/// dropped when a new tree is loaded, since the backend's font may have changed.
#[derive(Clone, Debug, Default)]
pub(crate) struct MeasureCache {
    line_height: Option<f64>,
    widths: HashMap<String, f64>,
}

impl MeasureCache {
    pub(crate) fn reset(&mut self) {
        self.line_height = None;
        self.widths.clear();
    }

    /// Box size for a label before any image is added.
    pub(crate) fn label_box(
        &mut self,
        label: &str,
        metrics: &dyn TextMetrics,
        sizing: &SizingConfig,
    ) -> Size {
        let height = *self
            .line_height
            .get_or_insert_with(|| metrics.line_height());
        let width = match self.widths.get(label) {
            Some(w) => *w,
            None => {
                let w = metrics.text_width(label);
                self.widths.insert(String::from(label), w);
                w
            }
        };
        Size::new(width + sizing.x_box_padding * 2.0, height)
    }

    #[cfg(test)]
    pub(crate) fn cached_labels(&self) -> usize {
        self.widths.len()
    }
}
