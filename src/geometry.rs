use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SIN_30: f64 = 0.5;
pub const COS_30: f64 = 0.866_025_403_784_438_6;
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Tolerance for grid-fit and triangle comparisons.
pub const EPSILON: f64 = 1e-5;

/// Relative band, in units of the side length, inside which a point counts as
/// lying on a cell edge. Neighbors compute a shared edge from different
/// centers, so it never matches bit for bit.
pub const ON_EDGE_EPSILON: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("side length must be positive, got {0}")]
    NonPositiveSide(f64),
    #[error("non-finite coordinate in geometry input")]
    NonFinite,
    #[error("triangle is not equilateral (squared sides {0}, {1}, {2})")]
    NotEquilateral(f64, f64, f64),
    #[error("trimmed cell pitch must be positive, got {0}")]
    DegeneratePitch(f64),
    #[error("image must have a positive area, got {0}x{1}")]
    EmptyImage(f64, f64),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Point at `dist` from `self` along `bearing_deg` (screen coordinates, y down).
    pub fn offset(self, bearing_deg: f64, dist: f64) -> Self {
        let a = bearing_deg.to_radians();
        Self::new(self.x + dist * a.cos(), self.y + dist * a.sin())
    }

    pub fn dist_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn dist(self, other: Point) -> f64 {
        self.dist_sq(other).sqrt()
    }
}

/// Hexagon orientation. `Horizontal` is flat-top, `Vertical` is pointy-top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Which side of a directed line a point falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Colinear,
}

/// Classify `pt` against the directed line `src -> dst` by the sign of
/// `(dst - src) x (pt - src)`. With y pointing down, a negative cross product
/// is `Left`; exactly zero is `Colinear`.
#[inline]
pub fn orient(src: Point, dst: Point, pt: Point) -> Side {
    orient_within(src, dst, pt, 0.0)
}

/// `orient` with a cross product of magnitude up to `tol` counted as `Colinear`.
#[inline]
pub fn orient_within(src: Point, dst: Point, pt: Point, tol: f64) -> Side {
    let val = (dst.x - src.x) * (pt.y - src.y) - (dst.y - src.y) * (pt.x - src.x);
    if val < -tol {
        Side::Left
    } else if val > tol {
        Side::Right
    } else {
        Side::Colinear
    }
}

/// Equilateral triangle, validated at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct EqTriangle {
    vertices: [Point; 3],
    center: Point,
    length: f64,
    height: f64,
}

impl EqTriangle {
    /// Side comparisons are done on squared lengths with a tolerance that
    /// scales with the larger side.
    pub fn new(a: Point, b: Point, c: Point) -> Result<Self, GeometryError> {
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        let l1 = a.dist_sq(b);
        let l2 = b.dist_sq(c);
        let l3 = c.dist_sq(a);
        let tol = l1.max(l2) * EPSILON;
        let equal = (l1 - l2).abs() <= tol && (l2 - l3).abs() <= tol && (l3 - l1).abs() <= tol;
        if !equal || l1 <= 0.0 {
            return Err(GeometryError::NotEquilateral(l1, l2, l3));
        }

        let length = l1.sqrt();
        Ok(Self {
            vertices: [a, b, c],
            center: Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0),
            length,
            height: length * SQRT_3 * 0.25,
        })
    }

    /// Unit triangle centered on the origin.
    pub fn unit() -> Self {
        let h = 0.25 * SQRT_3;
        Self {
            vertices: [Point::new(0.0, h), Point::new(-0.5, -h), Point::new(0.5, -h)],
            center: Point::new(0.0, 0.0),
            length: 1.0,
            height: h,
        }
    }

    pub fn vertices(&self) -> [Point; 3] {
        self.vertices
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}
