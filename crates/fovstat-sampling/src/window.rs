//! Random window placement
//!
//! A [`Window`] is a rectangle of fixed length and breadth, anchored at a
//! base point and rotated by an integer number of degrees in `0..=90`.
//! Its corners are found by walking the edges from the base point:
//!
//! ```text
//!   p1 = p0 + length  * (cos θ,        sin θ)
//!   p2 = p1 + breadth * (cos(θ + 90°), sin(θ + 90°))
//!   p3 = p2 + length  * (cos(θ + 180°), sin(θ + 180°))
//! ```
//!
//! [`RandomWindowGenerator`] draws the base point uniformly from the
//! domain (less an optional safety margin) and the angle uniformly from
//! the integer degrees. A generated window may stick out of the domain;
//! [`Window::contains_check`] reports whether it does not.

use crate::error::{SamplingError, SamplingResult};
use fovstat_core::Pta;
use rand::Rng;
use rand::distr::{Distribution, Uniform};
use std::f64::consts::SQRT_2;

/// Largest rotation angle in degrees.
pub const MAX_ANGLE_DEG: u32 = 90;

/// Closed axis-aligned rectangle `[minx, maxx] x [miny, maxy]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Domain {
    /// Create a domain from its limits
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Domain `[0, width] x [0, height]` of an image.
    pub fn for_image(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Boundary-inclusive point test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
}

/// One placed rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    corners: [(f64, f64); 4],
    domain: Domain,
    length: u32,
    breadth: u32,
    angle_deg: u32,
}

impl Window {
    /// Place a window with base point `base` and rotation `angle_deg`.
    pub fn place(length: u32, breadth: u32, base: (f64, f64), angle_deg: u32, domain: Domain) -> Self {
        let (s, c) = f64::from(angle_deg).to_radians().sin_cos();
        let walk = |(x, y): (f64, f64), len: f64, (dx, dy): (f64, f64)| {
            (x + len * dx, y + len * dy)
        };
        let (l, b) = (f64::from(length), f64::from(breadth));
        // cos(θ + 90°) = -sin θ, sin(θ + 90°) = cos θ, and so on.
        let p0 = base;
        let p1 = walk(p0, l, (c, s));
        let p2 = walk(p1, b, (-s, c));
        let p3 = walk(p2, l, (-c, -s));
        Self {
            corners: [p0, p1, p2, p3],
            domain,
            length,
            breadth,
            angle_deg,
        }
    }

    /// The four corners, base point first, in walking order.
    pub fn corners(&self) -> &[(f64, f64); 4] {
        &self.corners
    }

    /// Centroid of the window polygon.
    pub fn center(&self) -> (f64, f64) {
        self.to_pta().polygon_centroid().unwrap_or(self.corners[0])
    }

    /// Half the diagonal of a square with the window's length as side.
    ///
    /// Depends only on the distance between the first two corners, so it
    /// is the same for every rotation.
    pub fn half_diag(&self) -> f64 {
        let (x0, y0) = self.corners[0];
        let (x1, y1) = self.corners[1];
        0.5 * (x1 - x0).hypot(y1 - y0) * SQRT_2
    }

    /// Check that every corner lies inside the closed domain.
    pub fn contains_check(&self) -> bool {
        self.corners
            .iter()
            .all(|&(x, y)| self.domain.contains(x, y))
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn breadth(&self) -> u32 {
        self.breadth
    }

    /// Rotation in whole degrees.
    pub fn angle_degrees(&self) -> u32 {
        self.angle_deg
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Nominal area `length * breadth`, independent of rotation.
    pub fn nominal_area(&self) -> f64 {
        f64::from(self.length) * f64::from(self.breadth)
    }

    /// Corners as a closed polygon.
    pub fn to_pta(&self) -> Pta {
        self.corners.iter().copied().collect()
    }

    /// Bounding box of the corners as `(xmin, ymin, xmax, ymax)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let (x, y) = self.corners[0];
        self.corners.iter().fold((x, y, x, y), |(x0, y0, x1, y1), &(x, y)| {
            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
        })
    }
}

/// Draws randomly placed, randomly oriented windows of one size.
#[derive(Debug, Clone)]
pub struct RandomWindowGenerator {
    length: u32,
    breadth: u32,
    domain: Domain,
    safety_margin: f64,
    base_x: Uniform<f64>,
    base_y: Uniform<f64>,
    angle: Uniform<u32>,
}

impl RandomWindowGenerator {
    /// Create a generator for `length` x `breadth` windows over `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] for a zero dimension or a
    /// non-finite or empty domain.
    pub fn new(length: u32, breadth: u32, domain: Domain) -> SamplingResult<Self> {
        Self::with_safety_margin(length, breadth, domain, 0.0)
    }

    /// Like [`RandomWindowGenerator::new`], keeping base points at least
    /// `margin` away from the domain edges.
    pub fn with_safety_margin(
        length: u32,
        breadth: u32,
        domain: Domain,
        margin: f64,
    ) -> SamplingResult<Self> {
        if length == 0 || breadth == 0 {
            return Err(SamplingError::Configuration(format!(
                "window {}x{} has zero area",
                length, breadth
            )));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(SamplingError::Configuration(format!(
                "invalid safety margin {}",
                margin
            )));
        }
        let range = |lo: f64, hi: f64, axis: &str| {
            Uniform::new_inclusive(lo + margin, hi - margin).map_err(|e| {
                SamplingError::Configuration(format!(
                    "no base points along {} in [{}, {}] with margin {}: {}",
                    axis, lo, hi, margin, e
                ))
            })
        };
        let base_x = range(domain.minx, domain.maxx, "x")?;
        let base_y = range(domain.miny, domain.maxy, "y")?;
        let angle = Uniform::new_inclusive(0, MAX_ANGLE_DEG)
            .map_err(|e| SamplingError::Configuration(e.to_string()))?;

        Ok(Self {
            length,
            breadth,
            domain,
            safety_margin: margin,
            base_x,
            base_y,
            angle,
        })
    }

    /// Generate one window. It may or may not lie inside the domain.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Window {
        let x = self.base_x.sample(rng);
        let y = self.base_y.sample(rng);
        let angle_deg = self.angle.sample(rng);
        Window::place(self.length, self.breadth, (x, y), angle_deg, self.domain)
    }

    /// Whether some base point makes a window at `angle_deg` fit.
    pub fn orientation_fits(&self, angle_deg: u32) -> bool {
        let (s, c) = f64::from(angle_deg).to_radians().sin_cos();
        let (l, b) = (f64::from(self.length), f64::from(self.breadth));
        let d = &self.domain;
        let m = self.safety_margin;

        // Corner offsets from the base span [-b sin, l cos] in x and
        // [0, l sin + b cos] in y.
        let x_lo = (d.minx + m).max(d.minx + b * s);
        let x_hi = (d.maxx - m).min(d.maxx - l * c);
        let y_lo = d.miny + m;
        let y_hi = (d.maxy - m).min(d.maxy - (l * s + b * c));
        x_lo <= x_hi && y_lo <= y_hi
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn breadth(&self) -> u32 {
        self.breadth
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn safety_margin(&self) -> f64 {
        self.safety_margin
    }
}
