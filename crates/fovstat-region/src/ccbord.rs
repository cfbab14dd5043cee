//! Border tracing for connected components
//!
//! This module finds the outer borders and hole borders of every
//! 8-connected foreground component of a binary image, together with their
//! nesting, using topological border following (Suzuki and Abe). Every
//! boundary pixel is kept; no polygon simplification is applied.
//!
//! The image is scanned inside a frame of zero pixels, so components
//! touching the image edge still get closed borders.

use crate::error::{RegionError, RegionResult};
use crate::moments::ContourMoments;
use fovstat_core::{Pix, PixelDepth, Pta};

/// Direction to an 8-connected neighbour.
///
/// Indices increase counter-clockwise on screen (y pointing down),
/// starting from East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// East (1, 0)
    East = 0,
    /// Northeast (1, -1)
    NorthEast = 1,
    /// North (0, -1)
    North = 2,
    /// Northwest (-1, -1)
    NorthWest = 3,
    /// West (-1, 0)
    West = 4,
    /// Southwest (-1, 1)
    SouthWest = 5,
    /// South (0, 1)
    South = 6,
    /// Southeast (1, 1)
    SouthEast = 7,
}

/// X offset for each direction
const XPOSTAB: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];

/// Y offset for each direction
const YPOSTAB: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];

/// Direction lookup table: DIRTAB[1+dy][1+dx] gives direction index
const DIRTAB: [[i32; 3]; 3] = [[3, 2, 1], [4, -1, 0], [5, 6, 7]];

impl Direction {
    /// Get the x offset for this direction
    #[inline]
    pub fn dx(self) -> i32 {
        XPOSTAB[self as usize]
    }

    /// Get the y offset for this direction
    #[inline]
    pub fn dy(self) -> i32 {
        YPOSTAB[self as usize]
    }

    /// Get direction from x,y offsets
    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        if dx.abs() > 1 || dy.abs() > 1 || (dx == 0 && dy == 0) {
            return None;
        }
        let idx = DIRTAB[(1 + dy) as usize][(1 + dx) as usize];
        if idx < 0 {
            None
        } else {
            Some(Self::from_index(idx as usize))
        }
    }

    #[inline]
    fn from_index(idx: usize) -> Self {
        match idx % 8 {
            0 => Direction::East,
            1 => Direction::NorthEast,
            2 => Direction::North,
            3 => Direction::NorthWest,
            4 => Direction::West,
            5 => Direction::SouthWest,
            6 => Direction::South,
            _ => Direction::SouthEast,
        }
    }

    /// Next direction counter-clockwise.
    #[inline]
    pub fn counter_clockwise(self) -> Self {
        Self::from_index(self as usize + 1)
    }

    /// Next direction clockwise.
    #[inline]
    pub fn clockwise(self) -> Self {
        Self::from_index(self as usize + 7)
    }

    /// The reverse direction.
    #[inline]
    pub fn opposite(self) -> Self {
        Self::from_index(self as usize + 4)
    }
}

/// A point on a border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BorderPoint {
    /// X coordinate (column)
    pub x: i32,
    /// Y coordinate (row)
    pub y: i32,
}

impl BorderPoint {
    /// Create a new border point
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move in the given direction
    #[inline]
    pub fn moved(self, dir: Direction) -> Self {
        Self {
            x: self.x + dir.dx(),
            y: self.y + dir.dy(),
        }
    }

    /// Add offset to create new point
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Border type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderType {
    /// Boundary between a component and the background around it
    #[default]
    Outer,
    /// Boundary between a component and a hole inside it
    Hole,
}

/// Which borders a trace returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContourRetrieval {
    /// Every outer and hole border, with full nesting
    #[default]
    Tree,
    /// Only the outermost borders (those not inside any hole)
    External,
}

/// A single traced border (outer or hole)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Border {
    /// Type of this border
    pub border_type: BorderType,
    /// Index of the enclosing border in the same trace result, if any
    pub parent: Option<usize>,
    /// All points on the border, in traversal order (image coordinates)
    pub points: Vec<BorderPoint>,
}

impl Border {
    /// Get the number of points in this border
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the border is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Moments of the polygon through the border points.
    pub fn moments(&self) -> ContourMoments {
        ContourMoments::from_points(&self.points)
    }

    /// Enclosed area (zeroth moment).
    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    /// A border is degenerate if it has fewer than 3 points or no area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area() <= 0.0
    }

    /// Border points as a point array.
    pub fn to_pta(&self) -> Pta {
        self.points
            .iter()
            .map(|p| (f64::from(p.x), f64::from(p.y)))
            .collect()
    }

    /// Bounding box as `(x_min, y_min, x_max, y_max)`, inclusive.
    pub fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        ))
    }
}

/// Rectangular part of an image to trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScanBox {
    /// Create a new scan box
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip to an image of the given size. Returns `None` if nothing remains.
    pub fn clip(self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, w, h))
    }
}

/// Label image used while following borders.
///
/// Holds 0 for background, 1 for untouched foreground, and `±nbd` for
/// pixels already on border number `nbd`. Number 1 is the frame.
struct Tracer {
    labels: Vec<i32>,
    stride: usize,
}

impl Tracer {
    fn new(pix: &Pix, region: ScanBox) -> Self {
        let stride = region.width as usize + 2;
        let mut labels = vec![0i32; stride * (region.height as usize + 2)];
        for row in 0..region.height {
            let base = (row as usize + 1) * stride + 1;
            for col in 0..region.width {
                if pix.get_pixel_unchecked(region.x + col, region.y + row) != 0 {
                    labels[base + col as usize] = 1;
                }
            }
        }
        Self { labels, stride }
    }

    #[inline]
    fn index(&self, p: BorderPoint) -> usize {
        p.y as usize * self.stride + p.x as usize
    }

    #[inline]
    fn at(&self, p: BorderPoint) -> i32 {
        self.labels[self.index(p)]
    }

    #[inline]
    fn set(&mut self, p: BorderPoint, val: i32) {
        let idx = self.index(p);
        self.labels[idx] = val;
    }

    /// Follow one border starting at `start`, whose zero neighbour that
    /// triggered the start lies in direction `from`.
    fn follow(&mut self, start: BorderPoint, from: Direction, nbd: i32) -> Vec<BorderPoint> {
        let mut dir = from;
        let mut first = None;
        for _ in 0..8 {
            if self.at(start.moved(dir)) != 0 {
                first = Some(dir);
                break;
            }
            dir = dir.clockwise();
        }
        let Some(first_dir) = first else {
            // Isolated pixel
            self.set(start, -nbd);
            return vec![start];
        };
        let second = start.moved(first_dir);

        let mut points = Vec::new();
        let mut cur = start;
        let mut back = first_dir;
        loop {
            points.push(cur);

            let mut d = back;
            let mut east_is_zero = false;
            for _ in 0..8 {
                d = d.counter_clockwise();
                if self.at(cur.moved(d)) != 0 {
                    break;
                }
                if d == Direction::East {
                    east_is_zero = true;
                }
            }
            let next = cur.moved(d);

            if east_is_zero {
                self.set(cur, -nbd);
            } else if self.at(cur) == 1 {
                self.set(cur, nbd);
            }

            if next == start && cur == second {
                break;
            }
            back = d.opposite();
            cur = next;
        }
        points
    }
}

/// Decide the parent of a new border from the last border met on the row.
///
/// `lnbd` 1 is the frame, which behaves as a hole border with no parent.
fn parent_of(borders: &[Border], border_type: BorderType, lnbd: i32) -> Option<usize> {
    let last = usize::try_from(lnbd - 2)
        .ok()
        .and_then(|idx| borders.get(idx).map(|b| (idx, b)));
    let (last_type, last_parent, last_index) = match last {
        Some((idx, b)) => (b.border_type, b.parent, Some(idx)),
        None => (BorderType::Hole, None, None),
    };
    if border_type == last_type {
        last_parent
    } else {
        last_index
    }
}

/// Trace borders inside part of a binary image.
///
/// Pixels outside `region` are treated as background. Returned points are
/// in full-image coordinates. With [`ContourRetrieval::Tree`], `parent`
/// indexes into the returned vector; with [`ContourRetrieval::External`],
/// only top-level outer borders are returned and have no parent.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] unless the image is 1 bpp.
pub fn find_borders_in(
    pix: &Pix,
    region: ScanBox,
    mode: ContourRetrieval,
) -> RegionResult<Vec<Border>> {
    if pix.depth() != PixelDepth::Bit1 {
        return Err(RegionError::UnsupportedDepth {
            expected: "1 bpp",
            actual: pix.depth().bits(),
        });
    }
    let Some(region) = region.clip(pix.width(), pix.height()) else {
        return Ok(Vec::new());
    };

    let mut tracer = Tracer::new(pix, region);
    let mut borders: Vec<Border> = Vec::new();
    let mut nbd = 1i32;
    let (ox, oy) = (region.x as i32 - 1, region.y as i32 - 1);

    for i in 1..=region.height as i32 {
        let mut lnbd = 1i32;
        for j in 1..=region.width as i32 {
            let p = BorderPoint::new(j, i);
            let fij = tracer.at(p);
            if fij == 0 {
                continue;
            }

            let start = if fij == 1 && tracer.at(p.moved(Direction::West)) == 0 {
                Some((BorderType::Outer, Direction::West))
            } else if fij >= 1 && tracer.at(p.moved(Direction::East)) == 0 {
                if fij > 1 {
                    lnbd = fij;
                }
                Some((BorderType::Hole, Direction::East))
            } else {
                None
            };

            if let Some((border_type, from)) = start {
                nbd += 1;
                let parent = parent_of(&borders, border_type, lnbd);
                let points = tracer
                    .follow(p, from, nbd)
                    .into_iter()
                    .map(|q| q.offset(ox, oy))
                    .collect();
                borders.push(Border {
                    border_type,
                    parent,
                    points,
                });
            }

            let fij = tracer.at(p);
            if fij != 1 {
                lnbd = fij.abs();
            }
        }
    }

    Ok(match mode {
        ContourRetrieval::Tree => borders,
        ContourRetrieval::External => borders
            .into_iter()
            .filter(|b| b.border_type == BorderType::Outer && b.parent.is_none())
            .collect(),
    })
}

/// Trace borders of a whole binary image.
pub fn find_borders(pix: &Pix, mode: ContourRetrieval) -> RegionResult<Vec<Border>> {
    find_borders_in(
        pix,
        ScanBox::new(0, 0, pix.width(), pix.height()),
        mode,
    )
}

/// Get outer borders of all top-level connected components
pub fn get_outer_borders(pix: &Pix) -> RegionResult<Vec<Border>> {
    find_borders(pix, ContourRetrieval::External)
}

/// Get all borders (outer + holes) with their nesting
pub fn get_all_borders(pix: &Pix) -> RegionResult<Vec<Border>> {
    find_borders(pix, ContourRetrieval::Tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_from(w: u32, h: u32, f: impl Fn(u32, u32) -> bool) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit1).unwrap().to_mut();
        for y in 0..h {
            for x in 0..w {
                if f(x, y) {
                    pm.set_pixel(x, y, 1).unwrap();
                }
            }
        }
        pm.into()
    }

    #[test]
    fn test_direction_tables() {
        for d in 0..8 {
            let dir = Direction::from_index(d);
            assert_eq!(Direction::from_offset(dir.dx(), dir.dy()), Some(dir));
            assert_eq!(dir.counter_clockwise().clockwise(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::from_offset(0, 0), None);
        assert_eq!(Direction::East.counter_clockwise(), Direction::NorthEast);
    }

    #[test]
    fn test_square_border() {
        let pix = binary_from(20, 20, |x, y| (2..7).contains(&x) && (2..7).contains(&y));
        let borders = get_all_borders(&pix).unwrap();
        assert_eq!(borders.len(), 1);
        let b = &borders[0];
        assert_eq!(b.border_type, BorderType::Outer);
        assert_eq!(b.parent, None);
        assert_eq!(b.len(), 16);
        assert_eq!(b.points[0], BorderPoint::new(2, 2));
        assert_eq!(b.area(), 16.0);
        assert_eq!(b.bounding_box(), Some((2, 2, 6, 6)));
        assert!(!b.is_degenerate());
    }

    #[test]
    fn test_component_touching_edge() {
        let pix = binary_from(10, 8, |_, _| true);
        let borders = get_all_borders(&pix).unwrap();
        assert_eq!(borders.len(), 1);
        assert_eq!(borders[0].area(), 9.0 * 7.0);
    }

    #[test]
    fn test_ring_with_island() {
        // 7x7 ring at (25,2) with a 3x3 hole, plus a single pixel in the hole
        let pix = binary_from(40, 12, |x, y| {
            let in_outer = (25..32).contains(&x) && (2..9).contains(&y);
            let in_hole = (27..30).contains(&x) && (4..7).contains(&y);
            (in_outer && !in_hole) || (x == 28 && y == 5)
        });
        let borders = get_all_borders(&pix).unwrap();
        assert_eq!(borders.len(), 3);

        assert_eq!(borders[0].border_type, BorderType::Outer);
        assert_eq!(borders[0].parent, None);
        assert_eq!(borders[0].area(), 36.0);

        assert_eq!(borders[1].border_type, BorderType::Hole);
        assert_eq!(borders[1].parent, Some(0));
        let hole_area = borders[1].area();
        assert!(hole_area > 9.0 && hole_area <= 16.0);

        assert_eq!(borders[2].border_type, BorderType::Outer);
        assert_eq!(borders[2].parent, Some(1));
        assert_eq!(borders[2].points, vec![BorderPoint::new(28, 5)]);
        assert!(borders[2].is_degenerate());

        let outer = get_outer_borders(&pix).unwrap();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].area(), 36.0);
    }

    #[test]
    fn test_line_is_degenerate() {
        let pix = binary_from(20, 30, |x, y| y == 20 && (5..12).contains(&x));
        let borders = get_all_borders(&pix).unwrap();
        assert_eq!(borders.len(), 1);
        assert_eq!(borders[0].len(), 12);
        assert_eq!(borders[0].area(), 0.0);
        assert!(borders[0].is_degenerate());
    }

    #[test]
    fn test_scan_box_matches_full_trace() {
        let pix = binary_from(50, 40, |x, y| {
            ((10..20).contains(&x) && (10..15).contains(&y)) || (x == 40 && y == 30)
        });
        let full = get_all_borders(&pix).unwrap();
        let part = find_borders_in(&pix, ScanBox::new(5, 5, 20, 20), ContourRetrieval::Tree)
            .unwrap();
        assert_eq!(part.len(), 1);
        assert_eq!(part[0], full[0]);

        let none = find_borders_in(&pix, ScanBox::new(60, 0, 5, 5), ContourRetrieval::Tree)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_requires_binary() {
        let pix = Pix::new(5, 5, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            get_all_borders(&pix),
            Err(RegionError::UnsupportedDepth { .. })
        ));
    }
}
