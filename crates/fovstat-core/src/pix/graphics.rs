//! Graphics rendering functions
//!
//! This module provides the two drawing primitives the sampler needs:
//! - Filled convex polygons rasterized into a 1 bpp mask
//! - Lines and closed polylines (with variable width) for overlays

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};
use crate::pta::Pta;

/// RGB color for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// White color
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Red color
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };

    /// Compose as 32-bit RGBA pixel
    pub fn to_pixel32(&self) -> u32 {
        crate::color::compose_rgb(self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Generate a point array for a line using Bresenham's integer algorithm.
///
/// The line connects `(x1, y1)` to `(x2, y2)` with 8-connectivity and
/// includes both endpoints.
pub fn generate_line_pta(x1: i32, y1: i32, x2: i32, y2: i32) -> Pta {
    if x1 == x2 && y1 == y2 {
        let mut pta = Pta::with_capacity(1);
        pta.push(x1 as f64, y1 as f64);
        return pta;
    }

    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x2 > x1 { 1i32 } else { -1 };
    let sy = if y2 > y1 { 1i32 } else { -1 };

    let npts = dx.max(dy) + 1;
    let mut pta = Pta::with_capacity(npts as usize);

    let (mut x, mut y) = (x1, y1);
    if dx >= dy {
        let mut err = dx / 2;
        for _ in 0..npts {
            pta.push(x as f64, y as f64);
            err -= dy;
            if err < 0 {
                y += sy;
                err += dx;
            }
            x += sx;
        }
    } else {
        let mut err = dy / 2;
        for _ in 0..npts {
            pta.push(x as f64, y as f64);
            err -= dx;
            if err < 0 {
                x += sx;
                err += dy;
            }
            y += sy;
        }
    }

    pta
}

/// Generate the points of a closed (or open) polyline with the given width.
///
/// Width `w > 1` thickens each point into a `w`x`w` square anchored at the
/// point, so a width of 2 covers the point and its east/south neighbours.
pub fn generate_polyline_pta(vertices: &Pta, width: u32, close: bool) -> Pta {
    let n = vertices.len();
    let mut out = Pta::new();
    if n == 0 {
        return out;
    }

    let round = |(x, y): (f64, f64)| (x.round() as i32, y.round() as i32);
    let segments = if close { n } else { n - 1 };
    let mut base = Pta::new();
    if n == 1 {
        base.push(vertices.x_coords()[0], vertices.y_coords()[0]);
    }
    for i in 0..segments {
        let Some(p0) = vertices.get(i) else { continue };
        let Some(p1) = vertices.get((i + 1) % n) else { continue };
        let (x0, y0) = round(p0);
        let (x1, y1) = round(p1);
        base.extend(&generate_line_pta(x0, y0, x1, y1));
    }

    let width = width.max(1) as i32;
    for (x, y) in base.iter() {
        for dy in 0..width {
            for dx in 0..width {
                out.push(x + dx as f64, y + dy as f64);
            }
        }
    }
    out
}

/// Rasterize a filled convex polygon into a new 1 bpp image.
///
/// A pixel is set when its center (integer coordinates) lies inside the
/// polygon grown outward by half a pixel along every edge normal. Pixels
/// touched by the boundary are therefore included, and the traced outer
/// border of the result runs along the true polygon edges on average.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] for fewer than 3 vertices, non-finite
///   coordinates, a degenerate (zero area) polygon, or a non-convex polygon.
/// - [`Error::InvalidDimension`] for a zero-sized output.
pub fn fill_convex_polygon(width: u32, height: u32, vertices: &Pta) -> Result<Pix> {
    let n = vertices.len();
    if n < 3 {
        return Err(Error::InvalidParameter(
            "polygon requires at least 3 vertices".to_string(),
        ));
    }
    if vertices.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(Error::InvalidParameter(
            "polygon vertices must be finite".to_string(),
        ));
    }

    let area = vertices.polygon_area();
    if area == 0.0 {
        return Err(Error::InvalidParameter(
            "polygon has zero area".to_string(),
        ));
    }
    let orientation = area.signum();

    // Inward-facing half-planes: a*x + b*y + c >= 0 inside.
    let mut planes = Vec::with_capacity(n);
    for i in 0..n {
        let (x0, y0) = vertices.get(i).unwrap_or_default();
        let (x1, y1) = vertices.get((i + 1) % n).unwrap_or_default();
        let (ex, ey) = (x1 - x0, y1 - y0);
        let len = ex.hypot(ey);
        if len == 0.0 {
            continue;
        }
        let (a, b) = (-ey * orientation / len, ex * orientation / len);
        let c = -(a * x0 + b * y0);
        planes.push((a, b, c));
    }

    for i in 0..n {
        let (x0, y0) = vertices.get(i).unwrap_or_default();
        let (x1, y1) = vertices.get((i + 1) % n).unwrap_or_default();
        let (x2, y2) = vertices.get((i + 2) % n).unwrap_or_default();
        let cross = (x1 - x0) * (y2 - y1) - (y1 - y0) * (x2 - x1);
        if cross * orientation < -1e-9 {
            return Err(Error::InvalidParameter(
                "polygon is not convex".to_string(),
            ));
        }
    }

    let pix = Pix::new(width, height, PixelDepth::Bit1)?;
    let mut pixd = pix.to_mut();

    let (xmin, ymin, xmax, ymax) = vertices
        .bounding_box()
        .ok_or(Error::NullInput("empty polygon"))?;
    let col_lo = (xmin - 1.0).floor().max(0.0) as u32;
    let row_lo = (ymin - 1.0).floor().max(0.0) as u32;
    let col_hi = ((xmax + 1.0).ceil().max(0.0) as u32).min(width - 1);
    let row_hi = ((ymax + 1.0).ceil().max(0.0) as u32).min(height - 1);
    if col_lo > col_hi || row_lo > row_hi {
        return Ok(pixd.into());
    }

    for row in row_lo..=row_hi {
        let fy = row as f64;
        for col in col_lo..=col_hi {
            let fx = col as f64;
            let inside = planes.iter().all(|&(a, b, c)| a * fx + b * fy + c >= -0.5);
            if inside {
                pixd.set_pixel_unchecked(col, row, 1);
            }
        }
    }

    Ok(pixd.into())
}

impl PixMut {
    /// Render every point of `pta` with the given raw pixel value.
    ///
    /// Points outside the image bounds are clipped.
    pub fn render_pta(&mut self, pta: &Pta, val: u32) {
        for (x, y) in pta.iter() {
            self.set_pixel_clipped(x.round() as i64, y.round() as i64, val);
        }
    }

    /// Render a point array with a specific RGB color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] unless the image is 32 bpp.
    pub fn render_pta_color(&mut self, pta: &Pta, color: Color) -> Result<()> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        self.render_pta(pta, color.to_pixel32());
        Ok(())
    }

    /// Render a closed or open polyline in the given color.
    pub fn render_polyline_color(
        &mut self,
        vertices: &Pta,
        width: u32,
        close: bool,
        color: Color,
    ) -> Result<()> {
        let pta = generate_polyline_pta(vertices, width, close);
        self.render_pta_color(&pta, color)
    }
}
