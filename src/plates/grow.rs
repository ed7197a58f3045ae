use log::{debug, info};
use serde::Serialize;

use crate::grid::HexGrid;
use crate::hexagon::{COLORED, FILLED};

use super::Plate;
use super::neighbors::Neighbors;

/// What one growth step did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: u32,
    /// Cells claimed by each plate, in plate order.
    pub claimed: Vec<usize>,
}

impl StepReport {
    pub fn total_claimed(&self) -> usize {
        self.claimed.iter().sum()
    }

    /// No plate gained a cell.
    pub fn converged(&self) -> bool {
        self.total_claimed() == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GrowthOutcome {
    pub steps: u32,
    pub converged: bool,
}

/// Expand every plate's frontier by one ring.
///
/// Plates are processed in order. For each frontier cell, each of the six
/// neighbors that is not yet filled is claimed for the current plate and joins
/// its new frontier; a cell reachable by several plates in the same step goes
/// to the lowest plate index. The filled bit is never cleared, so a cell is
/// claimed at most once and the run terminates.
pub fn grow_step(grid: &mut HexGrid, plates: &mut [Plate], neighbors: &Neighbors) -> Vec<usize> {
    let mut claimed = Vec::with_capacity(plates.len());

    for plate in plates.iter_mut() {
        let mut new_border = Vec::new();
        for &cell in &plate.frontier {
            for next in neighbors.of(grid, cell).into_iter().flatten() {
                let Some(hex) = grid.get_mut(next) else {
                    continue;
                };
                if hex.is_filled() {
                    continue;
                }
                hex.set_state(hex.state() | FILLED | COLORED);
                hex.set_color(plate.color);
                new_border.push(next);
            }
        }

        debug!("plate {} claimed {} cells", plate.index, new_border.len());
        plate.cells.extend_from_slice(&new_border);
        claimed.push(new_border.len());
        plate.frontier = new_border;
    }

    claimed
}

/// Step until no plate grows or `max_steps` have run.
pub fn grow_plates(
    grid: &mut HexGrid,
    plates: &mut [Plate],
    neighbors: &Neighbors,
    max_steps: u32,
) -> GrowthOutcome {
    let mut steps = 0;
    while steps < max_steps {
        steps += 1;
        let claimed = grow_step(grid, plates, neighbors);
        let total: usize = claimed.iter().sum();
        debug!("step {steps}: {total} cells claimed");
        if total == 0 {
            info!("plates converged after {steps} steps");
            return GrowthOutcome {
                steps,
                converged: true,
            };
        }
    }

    info!("plate growth stopped at the {max_steps} step budget");
    GrowthOutcome {
        steps,
        converged: false,
    }
}
