//! Feature extraction inside one window
//!
//! The window polygon is rasterized into a mask the size of the feature
//! mask, the two are ANDed, and every border of the result is traced
//! without simplification. Each non-degenerate border counts as one
//! component, with its area taken from the border polygon.

use crate::error::{SamplingError, SamplingResult};
use crate::window::Window;
use fovstat_core::{Color, Pix, PixelDepth, fill_convex_polygon};
use fovstat_region::{Border, BorderType, ContourRetrieval, ScanBox, find_borders_in};

/// Width in pixels of borders drawn on overlays.
pub const OVERLAY_LINE_WIDTH: u32 = 2;

/// One connected foreground component seen through a window
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Enclosed area (zeroth moment of the border polygon)
    pub area: f64,
    /// The traced border
    pub border: Border,
}

impl Component {
    pub fn border_type(&self) -> BorderType {
        self.border.border_type
    }
}

/// Result of extracting one window
#[derive(Debug, Clone)]
pub struct Extraction {
    intersected: Pix,
    components: Vec<Component>,
    discarded: usize,
}

impl Extraction {
    /// The feature mask restricted to the window (1 bpp).
    pub fn intersected(&self) -> &Pix {
        &self.intersected
    }

    /// Non-degenerate components in trace order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Areas of the non-degenerate components, in trace order.
    pub fn areas(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.area).collect()
    }

    /// Number of degenerate borders that were dropped.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Render the intersected region white on black with the component
    /// borders drawn in red.
    pub fn overlay(&self) -> SamplingResult<Pix> {
        let rgb = self.intersected.binary_to_rgb(Color::WHITE, Color::BLACK)?;
        let mut pm = rgb.to_mut();
        for component in &self.components {
            pm.render_polyline_color(&component.border.to_pta(), OVERLAY_LINE_WIDTH, true, Color::RED)?;
        }
        Ok(pm.into())
    }
}

/// Isolates and measures the features inside a window
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    retrieval: ContourRetrieval,
}

impl FeatureExtractor {
    /// Create an extractor that counts the borders `retrieval` selects.
    pub fn new(retrieval: ContourRetrieval) -> Self {
        Self { retrieval }
    }

    pub fn retrieval(&self) -> ContourRetrieval {
        self.retrieval
    }

    /// Extract the components of `mask` that lie inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Input`] unless `mask` is 1 bpp.
    pub fn extract(&self, mask: &Pix, window: &Window) -> SamplingResult<Extraction> {
        if mask.depth() != PixelDepth::Bit1 {
            return Err(SamplingError::Input(format!(
                "feature mask must be 1 bpp, got {} bpp",
                mask.depth().bits()
            )));
        }
        let (w, h) = (mask.width(), mask.height());
        let region = fill_convex_polygon(w, h, &window.to_pta())?;
        let intersected = region.and(mask)?;

        let borders = find_borders_in(&intersected, scan_box(window), self.retrieval)?;
        let total = borders.len();
        let components: Vec<Component> = borders
            .into_iter()
            .filter(|b| !b.is_degenerate())
            .map(|border| Component {
                area: border.area(),
                border,
            })
            .collect();

        Ok(Extraction {
            intersected,
            discarded: total - components.len(),
            components,
        })
    }
}

/// Pixel rectangle covering everything the window fill can set.
fn scan_box(window: &Window) -> ScanBox {
    let (xmin, ymin, xmax, ymax) = window.bounding_box();
    let x0 = (xmin - 1.0).floor().max(0.0) as u32;
    let y0 = (ymin - 1.0).floor().max(0.0) as u32;
    let x1 = (xmax + 1.0).ceil().max(0.0) as u32;
    let y1 = (ymax + 1.0).ceil().max(0.0) as u32;
    ScanBox::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
}
