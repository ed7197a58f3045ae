pub mod grow;
pub mod motion;
pub mod neighbors;
pub mod seed;

use serde::Serialize;

use crate::geometry::Point;
use crate::hexagon::Color;

pub use grow::{GrowthOutcome, StepReport, grow_plates, grow_step};
pub use motion::{Velocity, assign_plate_motion};
pub use neighbors::{NeighborIndex, NeighborLookup, Neighbors};
pub use seed::{SeedError, seed_plates, seed_plates_at};

/// brass, brown, burnt sienna, camel, chocolate, dark brown,
/// fawn, khaki, maroon, nude, olive green, Tuscan red
pub const PALETTE: [Color; 12] = [
    [225, 193, 110],
    [165, 42, 42],
    [233, 116, 81],
    [193, 154, 107],
    [123, 63, 0],
    [92, 64, 51],
    [229, 170, 112],
    [240, 230, 140],
    [128, 0, 0],
    [242, 210, 189],
    [128, 128, 0],
    [124, 48, 48],
];

/// Color for the plate at 0-based position `i`; wraps past the palette.
pub fn plate_color(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}

#[derive(Clone, Debug, Serialize)]
pub struct Plate {
    /// 1-based, in seeding order.
    pub index: u32,
    pub center: Point,
    pub color: Color,
    /// Cells claimed in the latest step; the next step grows from here.
    pub frontier: Vec<u32>,
    /// Every cell this plate ever claimed, seed first.
    pub cells: Vec<u32>,
    pub velocity: Option<Velocity>,
}

impl Plate {
    pub fn new(index: u32, center: Point, color: Color, seed_cell: u32) -> Self {
        Self {
            index,
            center,
            color,
            frontier: vec![seed_cell],
            cells: vec![seed_cell],
            velocity: None,
        }
    }

    /// Frontier empty: this plate can no longer grow.
    pub fn is_stable(&self) -> bool {
        self.frontier.is_empty()
    }
}
