use log::{debug, warn};
use serde::Serialize;

use crate::geometry::{COS_30, EPSILON, GeometryError, Orientation, Point, SIN_30, SQRT_3};
use crate::hexagon::{Hexagon, NO_COLOR};

/// Cell extents and pitches for one hexagon size and orientation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Layout {
    pub orientation: Orientation,
    pub hex_size: f64,
    /// Horizontal extent used for packing (trimmed across-flats for `Vertical`).
    pub cell_width: f64,
    /// Vertical extent used for packing (trimmed across-flats for `Horizontal`).
    pub cell_height: f64,
}

impl Layout {
    pub fn new(hex_size: f64, orientation: Orientation, pitch_trim: f64) -> Result<Self, GeometryError> {
        if !hex_size.is_finite() || !pitch_trim.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if hex_size <= 0.0 {
            return Err(GeometryError::NonPositiveSide(hex_size));
        }

        let across_flats = hex_size * SQRT_3 - pitch_trim;
        if across_flats <= 0.0 {
            return Err(GeometryError::DegeneratePitch(across_flats));
        }

        let (cell_width, cell_height) = match orientation {
            Orientation::Vertical => (across_flats, 2.0 * hex_size),
            Orientation::Horizontal => (2.0 * hex_size, across_flats),
        };
        Ok(Self {
            orientation,
            hex_size,
            cell_width,
            cell_height,
        })
    }

    /// Distance between neighboring columns; corrected widths are multiples of it.
    pub fn horizontal_pitch(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.cell_width,
            Orientation::Horizontal => 0.75 * self.cell_width,
        }
    }

    /// Minimum distance a plate seed keeps from every image edge.
    pub fn edge_margin(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.hex_size * (1.0 + 2.0 * SIN_30),
            Orientation::Vertical => 2.0 * self.hex_size * COS_30,
        }
    }
}

/// Requested versus corrected image dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridFit {
    pub requested_width: f64,
    pub requested_height: f64,
    pub width: f64,
    pub height: f64,
    pub rows: u32,
    pub cols: u32,
}

impl GridFit {
    /// True when the image had to be resized to tile cleanly.
    pub fn adjusted(&self) -> bool {
        (self.width - self.requested_width).abs() > EPSILON
            || (self.height - self.requested_height).abs() > EPSILON
    }
}

/// Insertion-ordered hexagon tiling. A cell's index is its position in `cells`.
#[derive(Clone, Debug, Serialize)]
pub struct HexGrid {
    pub layout: Layout,
    pub fit: GridFit,
    cells: Vec<Hexagon>,
}

impl HexGrid {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Hexagon] {
        &self.cells
    }

    pub fn get(&self, index: u32) -> Option<&Hexagon> {
        self.cells.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut Hexagon> {
        self.cells.get_mut(index as usize)
    }

    /// First cell in grid order whose `contains` accepts `pt`.
    pub fn cell_at(&self, pt: Point) -> Option<u32> {
        self.cells
            .iter()
            .position(|h| h.contains(pt))
            .map(|i| i as u32)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|h| h.is_filled()).count()
    }

    /// Overwrite every cell's state bits and clear its color, e.g. to start a fresh run.
    pub fn reset_states(&mut self, state: u8) {
        for h in &mut self.cells {
            h.set_state(state);
            h.set_color(NO_COLOR);
        }
    }
}

/// Round `value` up to a whole number of `pitch`es unless it already is one
/// within `EPSILON`. Returns (count, corrected value).
fn fit_multiple(value: f64, pitch: f64) -> (u32, f64) {
    let ratio = value / pitch;
    let whole = ratio.floor();
    let count = if (ratio - whole).abs() > EPSILON {
        whole + 1.0
    } else {
        whole
    };
    let count = count.max(1.0) as u32;
    (count, count as f64 * pitch)
}

/// Tile an image with hexagons, growing the image where needed so no column is cut.
///
/// `Vertical` cells pack in rows of `cols` cells with alternate rows shifted by
/// half a cell; row heights alternate between one and two hexagon sides until
/// the requested height is covered. `Horizontal` cells pack in half-height
/// bands, alternate bands holding the even and the odd columns.
pub fn build_grid(
    image_width: f64,
    image_height: f64,
    hex_size: f64,
    orientation: Orientation,
    pitch_trim: f64,
    hex_props: u8,
) -> Result<HexGrid, GeometryError> {
    if !(image_width > 0.0 && image_height > 0.0) {
        return Err(GeometryError::EmptyImage(image_width, image_height));
    }
    let layout = Layout::new(hex_size, orientation, pitch_trim)?;
    let cw = layout.cell_width;
    let ch = layout.cell_height;

    let mut centers: Vec<(u32, u32, Point)> = Vec::new();
    let fit = match orientation {
        Orientation::Vertical => {
            let (cols, width) = fit_multiple(image_width, cw);

            let mut rows = 0u32;
            let mut height = 0.0;
            while height < image_height {
                height += if rows % 2 == 1 { 2.0 * hex_size } else { hex_size };
                rows += 1;
            }

            for r in 0..rows {
                let x0 = if r % 2 == 0 { 0.5 * cw } else { cw };
                let y = 0.5 * ch + r as f64 * (0.75 * ch);
                for c in 0..cols {
                    centers.push((r, c, Point::new(x0 + c as f64 * cw, y)));
                }
            }

            GridFit {
                requested_width: image_width,
                requested_height: image_height,
                width,
                height,
                rows,
                cols,
            }
        }
        Orientation::Horizontal => {
            let (cols, width) = fit_multiple(image_width, layout.horizontal_pitch());
            let (bands, height) = fit_multiple(image_height, ch);
            let rows = 2 * bands - 1;

            for r in 0..rows {
                let odd = r % 2;
                let x0 = if odd == 0 { 0.5 * cw } else { 1.25 * cw };
                let y = 0.5 * ch + r as f64 * (0.5 * ch);
                let n = if odd == 0 { cols.div_ceil(2) } else { cols / 2 };
                for k in 0..n {
                    centers.push((r, 2 * k + odd, Point::new(x0 + k as f64 * (1.5 * cw), y)));
                }
            }

            GridFit {
                requested_width: image_width,
                requested_height: image_height,
                width,
                height,
                rows,
                cols,
            }
        }
    };

    let mut cells = Vec::with_capacity(centers.len());
    for (next, (row, col, center)) in centers.into_iter().enumerate() {
        let mut hex = Hexagon::new(next as u32, center, hex_size, orientation)?.at_offset(row, col);
        hex.set_state(hex_props);
        cells.push(hex);
    }

    if fit.adjusted() {
        warn!(
            "image resized from {:.1}x{:.1} to {:.1}x{:.1} to tile cleanly",
            fit.requested_width, fit.requested_height, fit.width, fit.height
        );
    }
    debug!(
        "built {:?} grid: {} cells in {} rows x {} cols",
        orientation,
        cells.len(),
        fit.rows,
        fit.cols
    );

    Ok(HexGrid { layout, fit, cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cell_is_a_closed_regular_outline() {
        for o in [Orientation::Vertical, Orientation::Horizontal] {
            let grid = build_grid(200.0, 150.0, 10.0, o, 1.0, 0).unwrap();
            assert!(!grid.is_empty());
            for h in grid.cells() {
                let v = h.vertices();
                assert_eq!(v.len(), 7);
                assert_eq!(v[0], v[6]);
                for i in 0..6 {
                    assert!((v[i].dist(v[i + 1]) - 10.0).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn indices_follow_insertion_order() {
        let grid = build_grid(120.0, 90.0, 8.0, Orientation::Vertical, 1.0, 0).unwrap();
        for (i, h) in grid.cells().iter().enumerate() {
            assert_eq!(h.index() as usize, i);
        }
        // A second grid starts counting from zero again.
        let again = build_grid(50.0, 50.0, 8.0, Orientation::Horizontal, 1.0, 0).unwrap();
        assert_eq!(again.cells()[0].index(), 0);
    }

    #[test]
    fn corrected_width_is_whole_pitches() {
        for o in [Orientation::Vertical, Orientation::Horizontal] {
            for w in [37.0, 100.0, 333.3, 640.0, 1024.0] {
                for size in [5.0, 10.0, 18.0, 31.5] {
                    let grid = build_grid(w, 100.0, size, o, 1.0, 0).unwrap();
                    let pitch = grid.layout.horizontal_pitch();
                    let ratio = grid.fit.width / pitch;
                    assert!((ratio - ratio.round()).abs() < 1e-6, "{o:?} w={w} size={size}");
                    assert!(grid.fit.width >= w - 1e-3);
                    assert_eq!(ratio.round() as u32, grid.fit.cols);
                }
            }
        }
    }

    #[test]
    fn exact_multiple_is_left_alone() {
        let layout = Layout::new(10.0, Orientation::Vertical, 1.0).unwrap();
        let w = layout.cell_width * 6.0;
        let grid = build_grid(w, 100.0, 10.0, Orientation::Vertical, 1.0, 0).unwrap();
        assert_eq!(grid.fit.cols, 6);
        assert!((grid.fit.width - w).abs() < 1e-9);
    }

    #[test]
    fn vertical_rows_alternate_heights() {
        // 100px tall with side 10: 10, 30, 40, 60, 70, 90, 100.
        let grid = build_grid(100.0, 100.0, 10.0, Orientation::Vertical, 1.0, 0).unwrap();
        assert_eq!(grid.fit.rows, 7);
        assert!((grid.fit.height - 100.0).abs() < 1e-9);
        assert_eq!(grid.fit.cols, 7);
        assert_eq!(grid.len(), 49);
        assert!(grid.fit.adjusted());

        let first = grid.cells()[0].center();
        let second_row = grid.cells()[7].center();
        assert!((second_row.y - first.y - 15.0).abs() < 1e-9);
        assert!((second_row.x - first.x - grid.layout.cell_width / 2.0).abs() < 1e-9);
    }

    #[test]
    fn horizontal_bands_interleave_columns() {
        let grid = build_grid(90.0, 50.0, 10.0, Orientation::Horizontal, 0.0, 0).unwrap();
        // 90 / 15 = 6 columns, 50 / 17.32 -> 3 bands -> 5 rows.
        assert_eq!(grid.fit.cols, 6);
        assert_eq!(grid.fit.rows, 5);
        assert_eq!(grid.len(), 3 * 3 + 2 * 3);
        let cols: Vec<u32> = grid.cells().iter().filter(|h| h.row() == 1).map(|h| h.col()).collect();
        assert_eq!(cols, vec![1, 3, 5]);
    }

    #[test]
    fn hex_props_seed_every_cell_state() {
        let grid = build_grid(60.0, 60.0, 10.0, Orientation::Vertical, 1.0, 0x0C).unwrap();
        assert!(grid.cells().iter().all(|h| h.state() == 0x0C));
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn reset_clears_state_and_color() {
        let mut grid = build_grid(60.0, 60.0, 10.0, Orientation::Vertical, 1.0, 0x08).unwrap();
        if let Some(h) = grid.get_mut(3) {
            h.set_state(0x0F);
            h.set_color([1, 2, 3]);
        }
        assert_eq!(grid.filled_count(), 1);
        grid.reset_states(0x08);
        assert_eq!(grid.filled_count(), 0);
        assert!(grid.cells().iter().all(|h| h.state() == 0x08 && h.color() == NO_COLOR));
    }

    #[test]
    fn cell_at_finds_the_containing_cell() {
        let grid = build_grid(200.0, 200.0, 10.0, Orientation::Vertical, 1.0, 0).unwrap();
        for h in grid.cells() {
            assert_eq!(grid.cell_at(h.center()), Some(h.index()));
        }
        assert_eq!(grid.cell_at(Point::new(-50.0, -50.0)), None);
    }

    #[test]
    fn exact_tiling_covers_each_point_once() {
        for o in [Orientation::Vertical, Orientation::Horizontal] {
            let grid = build_grid(120.0, 120.0, 10.0, o, 0.0, 0).unwrap();
            let step = 0.7;
            let mut y = 12.0;
            while y < 100.0 {
                let mut x = 12.0;
                while x < 100.0 {
                    let p = Point::new(x, y);
                    let owners = grid.cells().iter().filter(|h| h.contains(p)).count();
                    assert_eq!(owners, 1, "{o:?} point {p:?} has {owners} owners");
                    x += step;
                }
                y += step;
            }
        }
    }

    /// Edge midpoints and vertices of `grid` whose surrounding cells all exist.
    fn shared_boundary_points(grid: &HexGrid) -> (Vec<Point>, Vec<Point>) {
        let has_center = |p: Point| {
            grid.cells()
                .iter()
                .any(|h| h.center().dist(p) < 1e-6 * h.side())
        };
        let (cos, sin) = (-0.5, COS_30);

        let mut midpoints = Vec::new();
        let mut vertices = Vec::new();
        for h in grid.cells() {
            let c = h.center();
            let v = h.vertices();
            for i in 0..6 {
                let m = Point::new((v[i].x + v[i + 1].x) / 2.0, (v[i].y + v[i + 1].y) / 2.0);
                if has_center(Point::new(2.0 * m.x - c.x, 2.0 * m.y - c.y)) {
                    midpoints.push(m);
                }

                // The other two cells at a vertex sit 120 degrees round from this one.
                let (ux, uy) = (c.x - v[i].x, c.y - v[i].y);
                let others = [sin, -sin].map(|s| {
                    Point::new(v[i].x + ux * cos - uy * s, v[i].y + ux * s + uy * cos)
                });
                if others.iter().all(|&p| has_center(p)) {
                    vertices.push(v[i]);
                }
            }
        }
        (midpoints, vertices)
    }

    #[test]
    fn shared_edges_and_vertices_have_one_owner() {
        for o in [Orientation::Vertical, Orientation::Horizontal] {
            for size in [7.0, 10.0, 18.0] {
                let grid = build_grid(300.0, 260.0, size, o, 0.0, 0).unwrap();
                let (midpoints, vertices) = shared_boundary_points(&grid);
                assert!(midpoints.len() > grid.len(), "{o:?} {size}");
                assert!(vertices.len() > grid.len(), "{o:?} {size}");

                for p in midpoints.iter().chain(&vertices) {
                    let owners = grid.cells().iter().filter(|h| h.contains(*p)).count();
                    assert_eq!(owners, 1, "{o:?} size {size}: {p:?} has {owners} owners");
                    assert!(grid.cell_at(*p).is_some());
                }
            }
        }
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            build_grid(0.0, 10.0, 5.0, Orientation::Vertical, 1.0, 0),
            Err(GeometryError::EmptyImage(..))
        ));
        assert!(matches!(
            build_grid(10.0, 10.0, -1.0, Orientation::Vertical, 1.0, 0),
            Err(GeometryError::NonPositiveSide(_))
        ));
        assert!(matches!(
            Layout::new(0.5, Orientation::Horizontal, 1.0),
            Err(GeometryError::DegeneratePitch(_))
        ));
    }

    #[test]
    fn margins_match_orientation() {
        let v = Layout::new(10.0, Orientation::Vertical, 1.0).unwrap();
        let h = Layout::new(10.0, Orientation::Horizontal, 1.0).unwrap();
        assert!((v.edge_margin() - 10.0 * SQRT_3).abs() < 1e-9);
        assert!((h.edge_margin() - 20.0).abs() < 1e-9);
    }
}
