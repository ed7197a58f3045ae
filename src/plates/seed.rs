use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

use crate::geometry::Point;
use crate::grid::HexGrid;
use crate::hexagon::{COLORED, FILLED, SHOW_CENTER};

use super::{Plate, plate_color};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeedError {
    #[error(
        "no valid seed for plate {plate} after {attempts} attempts; reduce the plate count or enlarge the image"
    )]
    Exhausted { plate: u32, attempts: u32 },
    #[error("seed for plate {plate} at ({x:.2}, {y:.2}) is not inside any cell")]
    Uncovered { plate: u32, x: f64, y: f64 },
    #[error("seed for plate {plate} lands in cell {cell}, already taken by plate {owner}")]
    CellTaken { plate: u32, cell: u32, owner: u32 },
}

/// Pick `count` random seed points and claim the cell under each.
///
/// Points are drawn uniformly over the (corrected) image and redrawn when they
/// fall within the orientation's edge margin, closer than `min_separation` to
/// an earlier seed, outside every cell, or inside a cell an earlier seed took.
/// The grid is only touched once every plate has a seed, so an exhausted
/// budget leaves it as it was.
pub fn seed_plates<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    count: u32,
    min_separation: f64,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Vec<Plate>, SeedError> {
    let margin = grid.layout.edge_margin();
    let (w, h) = (grid.fit.width, grid.fit.height);
    info!("generating {count} plate centers (edge margin {margin:.2})");

    let mut picks: Vec<(Point, u32)> = Vec::with_capacity(count as usize);
    for plate in 1..=count {
        let mut attempts = 0;
        let pick = loop {
            if attempts == max_attempts {
                warn!("plate {plate}: gave up after {attempts} seed attempts");
                return Err(SeedError::Exhausted { plate, attempts });
            }
            attempts += 1;

            let p = Point::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h));
            if p.x < margin || w - p.x < margin || p.y < margin || h - p.y < margin {
                debug!("rejected ({:.2}, {:.2}): too close to edge", p.x, p.y);
                continue;
            }
            if min_separation > 0.0 && picks.iter().any(|(q, _)| q.dist(p) < min_separation) {
                debug!("rejected ({:.2}, {:.2}): too close to another seed", p.x, p.y);
                continue;
            }
            let Some(cell) = grid.cell_at(p) else {
                debug!("rejected ({:.2}, {:.2}): not inside any cell", p.x, p.y);
                continue;
            };
            if picks.iter().any(|&(_, c)| c == cell) {
                debug!("rejected ({:.2}, {:.2}): cell {cell} already seeded", p.x, p.y);
                continue;
            }
            break (p, cell);
        };
        picks.push(pick);
    }

    Ok(claim(grid, &picks))
}

/// Seed one plate at each given point, in order.
pub fn seed_plates_at(grid: &mut HexGrid, points: &[Point]) -> Result<Vec<Plate>, SeedError> {
    let mut picks: Vec<(Point, u32)> = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        let plate = i as u32 + 1;
        let cell = grid
            .cell_at(p)
            .ok_or(SeedError::Uncovered { plate, x: p.x, y: p.y })?;
        if let Some(owner) = picks.iter().position(|&(_, c)| c == cell) {
            return Err(SeedError::CellTaken {
                plate,
                cell,
                owner: owner as u32 + 1,
            });
        }
        picks.push((p, cell));
    }

    Ok(claim(grid, &picks))
}

fn claim(grid: &mut HexGrid, picks: &[(Point, u32)]) -> Vec<Plate> {
    let mut plates = Vec::with_capacity(picks.len());
    for (i, &(p, cell)) in picks.iter().enumerate() {
        let plate = Plate::new(i as u32 + 1, p, plate_color(i), cell);
        if let Some(hex) = grid.get_mut(cell) {
            hex.set_state(hex.state() | FILLED | COLORED | SHOW_CENTER);
            hex.set_color(plate.color);
        }
        info!("plate {}: center is at ({:.4}, {:.4}), cell {cell}", plate.index, p.x, p.y);
        plates.push(plate);
    }
    plates
}
