//! Contour moments
//!
//! Spatial moments of the polygon through a traced border's points,
//! computed with Green's theorem. Orientation does not matter: moments
//! are reported for the counter-clockwise (positive area) order.

use crate::ccbord::BorderPoint;

/// Zeroth and first order moments of a closed contour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContourMoments {
    /// Enclosed area
    pub m00: f64,
    /// First moment about the y axis
    pub m10: f64,
    /// First moment about the x axis
    pub m01: f64,
}

impl ContourMoments {
    /// Compute the moments of the closed polygon through `points`.
    ///
    /// Fewer than 3 points give all-zero moments.
    pub fn from_points(points: &[BorderPoint]) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::default();
        }

        let (mut a, mut sx, mut sy) = (0.0, 0.0, 0.0);
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % n];
            let (x0, y0) = (f64::from(p.x), f64::from(p.y));
            let (x1, y1) = (f64::from(q.x), f64::from(q.y));
            let cross = x0 * y1 - x1 * y0;
            a += cross;
            sx += (x0 + x1) * cross;
            sy += (y0 + y1) * cross;
        }
        let sign = if a < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a / 2.0,
            m10: sign * sx / 6.0,
            m01: sign * sy / 6.0,
        }
    }

    /// Centroid `(x, y)`, or `None` for a contour with no area.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 <= 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}
