use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::grid::HexGrid;
use crate::hexagon::Hexagon;

/// How growth finds the cell on the far side of each edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborLookup {
    /// Scan the whole grid for every probe, every step.
    Scan,
    /// Resolve every probe once up front through a spatial bucket index.
    #[default]
    Indexed,
}

/// Compass bearings (degrees, y down) of the six probes, for both orientations.
///
/// On pointy-top cells they cross the six edges. On flat-top cells they aim
/// at vertices, and the half-open containment rule decides which of the
/// cells meeting there a probe lands in.
pub const PROBE_BEARINGS: [f64; 6] = [0.0, 60.0, 120.0, 180.0, 240.0, 300.0];

/// Points two sides out from the center, one per bearing.
pub fn probe_points(hex: &Hexagon) -> [Point; 6] {
    let reach = 2.0 * hex.side();
    PROBE_BEARINGS.map(|b| hex.center().offset(b, reach))
}

/// Neighbors of `cell` by probing and scanning the full grid; first match wins.
pub fn probe_neighbors(grid: &HexGrid, cell: u32) -> [Option<u32>; 6] {
    match grid.get(cell) {
        Some(hex) => probe_points(hex).map(|p| grid.cell_at(p)),
        None => [None; 6],
    }
}

/// Cells bucketed on a uniform lattice of one cell pitch by their bounding
/// boxes. Every cell that can contain a point is listed in that point's bin,
/// in grid order, so the first match in the bin is the first match in the grid.
struct CellBins {
    origin: Point,
    bin_width: f64,
    bin_height: f64,
    cols: usize,
    rows: usize,
    bins: Vec<Vec<u32>>,
}

impl CellBins {
    fn new(grid: &HexGrid) -> Self {
        let layout = &grid.layout;
        // Wider than the containment tolerance; only adds candidates.
        let pad = layout.hex_size * 1e-6;

        let boxes: Vec<(Point, Point)> = grid
            .cells()
            .iter()
            .map(|h| {
                let mut min = Point::new(f64::INFINITY, f64::INFINITY);
                let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for v in &h.vertices()[..6] {
                    min = Point::new(min.x.min(v.x), min.y.min(v.y));
                    max = Point::new(max.x.max(v.x), max.y.max(v.y));
                }
                (
                    Point::new(min.x - pad, min.y - pad),
                    Point::new(max.x + pad, max.y + pad),
                )
            })
            .collect();

        let mut bins = Self {
            origin: Point::new(0.0, 0.0),
            bin_width: layout.cell_width,
            bin_height: layout.cell_height,
            cols: 0,
            rows: 0,
            bins: Vec::new(),
        };
        if boxes.is_empty() {
            return bins;
        }

        let (lo, hi) = boxes.iter().fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), (min, max)| {
                (
                    Point::new(lo.x.min(min.x), lo.y.min(min.y)),
                    Point::new(hi.x.max(max.x), hi.y.max(max.y)),
                )
            },
        );
        bins.origin = lo;
        bins.cols = ((hi.x - lo.x) / bins.bin_width).floor() as usize + 1;
        bins.rows = ((hi.y - lo.y) / bins.bin_height).floor() as usize + 1;
        bins.bins = vec![Vec::new(); bins.cols * bins.rows];

        for (cell, (min, max)) in boxes.iter().enumerate() {
            let (c0, r0) = bins.bin_coords(*min);
            let (c1, r1) = bins.bin_coords(*max);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    bins.bins[r * bins.cols + c].push(cell as u32);
                }
            }
        }
        bins
    }

    /// Unclamped lattice coordinates; only called for points inside the bounds.
    fn bin_coords(&self, p: Point) -> (usize, usize) {
        (
            ((p.x - self.origin.x) / self.bin_width).floor() as usize,
            ((p.y - self.origin.y) / self.bin_height).floor() as usize,
        )
    }

    fn candidates(&self, p: Point) -> &[u32] {
        let c = ((p.x - self.origin.x) / self.bin_width).floor();
        let r = ((p.y - self.origin.y) / self.bin_height).floor();
        if !(c >= 0.0 && r >= 0.0 && (c as usize) < self.cols && (r as usize) < self.rows) {
            return &[];
        }
        &self.bins[r as usize * self.cols + c as usize]
    }

    fn largest(&self) -> usize {
        self.bins.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Same answer as `HexGrid::cell_at`.
    fn cell_at(&self, grid: &HexGrid, p: Point) -> Option<u32> {
        self.candidates(p)
            .iter()
            .copied()
            .find(|&i| grid.get(i).is_some_and(|h| h.contains(p)))
    }
}

/// Per-cell answers of `probe_neighbors`, computed once.
#[derive(Clone, Debug)]
pub struct NeighborIndex {
    table: Vec<[Option<u32>; 6]>,
}

impl NeighborIndex {
    pub fn build(grid: &HexGrid) -> Self {
        let bins = CellBins::new(grid);
        debug!(
            "neighbor bins: {}x{}, at most {} cells per bin",
            bins.cols,
            bins.rows,
            bins.largest()
        );
        let table = grid
            .cells()
            .par_iter()
            .map(|h| probe_points(h).map(|p| bins.cell_at(grid, p)))
            .collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, cell: u32) -> [Option<u32>; 6] {
        self.table.get(cell as usize).copied().unwrap_or([None; 6])
    }
}

/// Neighbor source used by the growth engine.
#[derive(Clone, Debug)]
pub enum Neighbors {
    Scan,
    Indexed(NeighborIndex),
}

impl Neighbors {
    pub fn new(grid: &HexGrid, lookup: NeighborLookup) -> Self {
        match lookup {
            NeighborLookup::Scan => Neighbors::Scan,
            NeighborLookup::Indexed => Neighbors::Indexed(NeighborIndex::build(grid)),
        }
    }

    pub fn of(&self, grid: &HexGrid, cell: u32) -> [Option<u32>; 6] {
        match self {
            Neighbors::Scan => probe_neighbors(grid, cell),
            Neighbors::Indexed(index) => index.get(cell),
        }
    }
}
