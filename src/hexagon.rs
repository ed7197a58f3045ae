use serde::Serialize;

use crate::geometry::{
    COS_30, GeometryError, ON_EDGE_EPSILON, Orientation, Point, SIN_30, Side, orient_within,
};

/// State bits. Independent flags, any combination is accepted.
pub const FILLED: u8 = 0x01;
pub const COLORED: u8 = 0x02;
pub const SHOW_CENTER: u8 = 0x04;
pub const SHOW_INDEX: u8 = 0x08;

pub type Color = [u8; 3];

/// Uncolored cells report this until a plate claims them.
pub const NO_COLOR: Color = [0, 0, 0];

/// A regular hexagon with an immutable outline and mutable display/ownership state.
///
/// Vertex 0 is the top vertex for the orientation (the apex for `Vertical`,
/// the upper-left corner of the flat top for `Horizontal`); vertices wind
/// clockwise on screen and vertex 6 repeats vertex 0 to close the outline.
#[derive(Clone, Debug, Serialize)]
pub struct Hexagon {
    index: u32,
    row: u32,
    col: u32,
    center: Point,
    side: f64,
    orientation: Orientation,
    vertices: [Point; 7],
    state: u8,
    color: Color,
}

impl Hexagon {
    pub fn new(
        index: u32,
        center: Point,
        side: f64,
        orientation: Orientation,
    ) -> Result<Self, GeometryError> {
        if !side.is_finite() || !center.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if side <= 0.0 {
            return Err(GeometryError::NonPositiveSide(side));
        }

        Ok(Self {
            index,
            row: 0,
            col: 0,
            center,
            side,
            orientation,
            vertices: vertices(center, side, orientation),
            state: 0,
            color: NO_COLOR,
        })
    }

    /// Record the offset-grid position the builder placed this cell at.
    pub fn at_offset(mut self, row: u32, col: u32) -> Self {
        self.row = row;
        self.col = col;
        self
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn vertices(&self) -> &[Point; 7] {
        &self.vertices
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn set_state(&mut self, state: u8) {
        self.state = state;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.state & FILLED == FILLED
    }

    /// Index, column and row as shown when `SHOW_INDEX` is set.
    pub fn label(&self) -> String {
        format!("{:04}\n{:03},{:03}", self.index, self.col, self.row)
    }

    /// Half-open point containment.
    ///
    /// The bounding box admits `min < p <= max` on both axes, which settles the
    /// two edges parallel to an axis. The four slanted edges are tested with
    /// `orient`: interior points are on the left of every edge, points exactly
    /// on one of the two upper edges are rejected and points exactly on one of
    /// the two lower edges are accepted. Opposite edges always get opposite
    /// rules, so in a gapless tiling every shared edge point and every shared
    /// vertex has exactly one owner.
    ///
    /// "Exactly on" means within `ON_EDGE_EPSILON * side` of the edge.
    pub fn contains(&self, pt: Point) -> bool {
        let v = &self.vertices;
        let (min_x, max_x) = match self.orientation {
            Orientation::Vertical => (v[4].x, v[1].x),
            Orientation::Horizontal => (v[5].x, v[2].x),
        };
        let (min_y, max_y) = (v[0].y, v[3].y);

        let tol = ON_EDGE_EPSILON * self.side;
        let inside_box = pt.x - min_x > tol
            && pt.x - max_x <= tol
            && pt.y - min_y > tol
            && pt.y - max_y <= tol;
        if !inside_box {
            return false;
        }

        // (src, dst, on-line counts as inside)
        let edges: [(Point, Point, bool); 4] = match self.orientation {
            Orientation::Vertical => [
                (v[1], v[0], false),
                (v[0], v[5], false),
                (v[4], v[3], true),
                (v[3], v[2], true),
            ],
            Orientation::Horizontal => [
                (v[2], v[1], false),
                (v[0], v[5], false),
                (v[5], v[4], true),
                (v[3], v[2], true),
            ],
        };

        // Edges are `side` long, so the cross product is `side` times the distance.
        let cross_tol = tol * self.side;
        edges.iter().all(|&(src, dst, inclusive)| match orient_within(src, dst, pt, cross_tol) {
            Side::Left => true,
            Side::Colinear => inclusive,
            Side::Right => false,
        })
    }
}

fn vertices(c: Point, side: f64, orientation: Orientation) -> [Point; 7] {
    let height = side * SIN_30;
    let length = side * COS_30;
    let half_side = side / 2.0;
    let half_height = half_side + height;

    let six = match orientation {
        Orientation::Vertical => [
            Point::new(c.x, c.y - half_height),
            Point::new(c.x + length, c.y - half_side),
            Point::new(c.x + length, c.y + half_side),
            Point::new(c.x, c.y + half_height),
            Point::new(c.x - length, c.y + half_side),
            Point::new(c.x - length, c.y - half_side),
        ],
        Orientation::Horizontal => [
            Point::new(c.x - half_side, c.y - length),
            Point::new(c.x + half_side, c.y - length),
            Point::new(c.x + half_height, c.y),
            Point::new(c.x + half_side, c.y + length),
            Point::new(c.x - half_side, c.y + length),
            Point::new(c.x - half_height, c.y),
        ],
    };

    [six[0], six[1], six[2], six[3], six[4], six[5], six[0]]
}
