//! Pta - Point arrays
//!
//! Arrays of floating-point coordinate pairs, used for window polygons,
//! rendered outlines and traced borders.
//!
//! # Storage layout
//!
//! Points are stored as separate X and Y vectors (SoA layout).

use crate::error::{Error, Result};

/// Array of points.
///
/// Stores 2D points as parallel x/y coordinate vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pta {
    /// X coordinates
    x: Vec<f64>,
    /// Y coordinates
    y: Vec<f64>,
}

impl Pta {
    /// Create a new empty Pta.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Create a Pta with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Create a Pta from coordinate vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` have different lengths.
    pub fn from_vecs(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::InvalidParameter(format!(
                "coordinate vectors differ in length: {} vs {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Get a point by index.
    ///
    /// Returns `None` if the index is out of bounds.
    pub fn get(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Add a point.
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Append all points of another array.
    pub fn extend(&mut self, other: &Pta) {
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
    }

    /// Get X coordinates as a slice.
    pub fn x_coords(&self) -> &[f64] {
        &self.x
    }

    /// Get Y coordinates as a slice.
    pub fn y_coords(&self) -> &[f64] {
        &self.y
    }

    /// Compute the bounding box.
    ///
    /// Returns `(x_min, y_min, x_max, y_max)`, or `None` if empty.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                    (lo.min(c), hi.max(c))
                })
        };
        let (xmin, xmax) = fold(&self.x);
        let (ymin, ymax) = fold(&self.y);
        Some((xmin, ymin, xmax, ymax))
    }

    /// Signed area of the closed polygon through the points (shoelace).
    ///
    /// Positive for counter-clockwise order in a y-up frame, which is
    /// clockwise on screen.
    pub fn polygon_area(&self) -> f64 {
        let n = self.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            twice += self.x[i] * self.y[j] - self.x[j] * self.y[i];
        }
        twice / 2.0
    }

    /// Area centroid of the closed polygon through the points.
    ///
    /// Falls back to the vertex mean when the polygon has no area.
    /// Returns `None` if empty.
    pub fn polygon_centroid(&self) -> Option<(f64, f64)> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let area = self.polygon_area();
        if area == 0.0 {
            let cx = self.x.iter().sum::<f64>() / n as f64;
            let cy = self.y.iter().sum::<f64>() / n as f64;
            return Some((cx, cy));
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for i in 0..n {
            let j = (i + 1) % n;
            let cross = self.x[i] * self.y[j] - self.x[j] * self.y[i];
            cx += (self.x[i] + self.x[j]) * cross;
            cy += (self.y[i] + self.y[j]) * cross;
        }
        Some((cx / (6.0 * area), cy / (6.0 * area)))
    }

    /// Create an iterator over points.
    pub fn iter(&self) -> PtaIter<'_> {
        PtaIter {
            pta: self,
            index: 0,
        }
    }
}

/// Iterator over Pta points.
pub struct PtaIter<'a> {
    pta: &'a Pta,
    index: usize,
}

impl Iterator for PtaIter<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let pt = self.pta.get(self.index)?;
        self.index += 1;
        Some(pt)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pta.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PtaIter<'_> {}

impl<'a> IntoIterator for &'a Pta {
    type Item = (f64, f64);
    type IntoIter = PtaIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(f64, f64)> for Pta {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let (lower, upper) = iter.size_hint();
        let mut pta = Self::with_capacity(upper.unwrap_or(lower));
        for (x, y) in iter {
            pta.push(x, y);
        }
        pta
    }
}
