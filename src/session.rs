use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, Params};
use crate::geometry::{GeometryError, Point};
use crate::grid::{GridFit, HexGrid, build_grid};
use crate::hexagon::Hexagon;
use crate::plates::{
    GrowthOutcome, Neighbors, Plate, SeedError, StepReport, assign_plate_motion, grow_step,
    seed_plates, seed_plates_at,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("invalid parameters: {0}")]
    Config(#[from] ConfigError),
    #[error("grid construction failed: {0}")]
    Geometry(#[from] GeometryError),
    #[error("plate seeding failed: {0}")]
    Seed(#[from] SeedError),
    #[error("cannot {action} while the session is {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },
}

/// Where a session is in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Grid built, no plates yet.
    Idle,
    /// One seed cell per plate.
    Seeded,
    Growing,
    /// A full step claimed nothing.
    Converged,
    /// Velocities assigned; the clock may run.
    Moving,
}

/// One map: the grid, its plates, the RNG and the simulated clock.
///
/// Growth is driven one step at a time so a host can interleave its own work;
/// stopping between steps always leaves a consistent grid.
pub struct Session {
    params: Params,
    grid: HexGrid,
    plates: Vec<Plate>,
    neighbors: Neighbors,
    rng: ChaCha8Rng,
    phase: Phase,
    steps: u32,
    cur_time: u64,
}

impl Session {
    pub fn new(mut params: Params) -> Result<Self, SessionError> {
        params.validate()?;
        let grid = build_grid(
            params.image_width,
            params.image_height,
            params.hex_size,
            params.orientation,
            params.pitch_trim,
            params.hex_props,
        )?;
        params.image_width = grid.fit.width;
        params.image_height = grid.fit.height;
        let neighbors = Neighbors::new(&grid, params.neighbor_lookup);
        info!(
            "new map {:.0}x{:.0}, {} cells of size {}",
            grid.fit.width,
            grid.fit.height,
            grid.len(),
            params.hex_size
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            params,
            grid,
            plates: Vec::new(),
            neighbors,
            phase: Phase::Idle,
            steps: 0,
            cur_time: 0,
        })
    }

    /// Parameters as used, with the image size corrected to the grid.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Corrected image size and the request it came from.
    pub fn fit(&self) -> GridFit {
        self.grid.fit
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn cur_time(&self) -> u64 {
        self.cur_time
    }

    fn expect_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    /// Seed `params.plate_count` plates at random.
    pub fn seed_plates(&mut self) -> Result<&[Plate], SessionError> {
        self.expect_phase("seed plates", &[Phase::Idle])?;
        self.plates = seed_plates(
            &mut self.grid,
            self.params.plate_count,
            self.params.min_seed_separation,
            self.params.max_seed_attempts,
            &mut self.rng,
        )?;
        self.phase = Phase::Seeded;
        Ok(&self.plates)
    }

    /// Seed one plate at each of `points`.
    pub fn seed_plates_at(&mut self, points: &[Point]) -> Result<&[Plate], SessionError> {
        self.expect_phase("seed plates", &[Phase::Idle])?;
        self.plates = seed_plates_at(&mut self.grid, points)?;
        self.phase = Phase::Seeded;
        Ok(&self.plates)
    }

    /// Run one growth step. After convergence this is a no-op that reports
    /// nothing claimed.
    pub fn step(&mut self) -> Result<StepReport, SessionError> {
        self.expect_phase("grow plates", &[Phase::Seeded, Phase::Growing, Phase::Converged])?;
        if self.phase == Phase::Converged {
            return Ok(StepReport {
                step: self.steps,
                claimed: vec![0; self.plates.len()],
            });
        }

        self.steps += 1;
        let claimed = grow_step(&mut self.grid, &mut self.plates, &self.neighbors);
        let report = StepReport {
            step: self.steps,
            claimed,
        };
        debug!("step {}: {} cells claimed", report.step, report.total_claimed());

        self.phase = if report.converged() {
            info!("plates converged after {} steps", self.steps);
            Phase::Converged
        } else {
            Phase::Growing
        };
        Ok(report)
    }

    /// Step until convergence or the `max_growth_steps` budget runs out.
    pub fn run_to_convergence(&mut self) -> Result<GrowthOutcome, SessionError> {
        let start = self.steps;
        while self.phase != Phase::Converged && self.steps - start < self.params.max_growth_steps {
            self.step()?;
        }
        Ok(GrowthOutcome {
            steps: self.steps - start,
            converged: self.phase == Phase::Converged,
        })
    }

    /// Assign every plate a velocity. Only valid once growth has converged.
    pub fn assign_motion(&mut self) -> Result<&[Plate], SessionError> {
        self.expect_phase("assign motion", &[Phase::Converged])?;
        assign_plate_motion(&mut self.plates, &mut self.rng);
        self.phase = Phase::Moving;
        Ok(&self.plates)
    }

    /// Advance the clock by one time step. `None` once the next step would
    /// pass `max_time`.
    pub fn tick(&mut self) -> Result<Option<u64>, SessionError> {
        self.expect_phase("advance time", &[Phase::Moving])?;
        match self.cur_time.checked_add(self.params.time_step) {
            Some(next) if next <= self.params.max_time => {
                self.cur_time = next;
                debug!("updating to {next} years");
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }

    /// Tick until `max_time`; returns the final time.
    pub fn run_clock(&mut self) -> Result<u64, SessionError> {
        while self.tick()?.is_some() {}
        info!("simulation clock stopped at {} years", self.cur_time);
        Ok(self.cur_time)
    }

    /// Back to `Idle` on the same grid: plates dropped, cells cleared to
    /// `hex_props`, clock at zero. The RNG carries on, so reseeding draws new
    /// centers.
    pub fn restart(&mut self) {
        self.grid.reset_states(self.params.hex_props);
        self.plates.clear();
        self.phase = Phase::Idle;
        self.steps = 0;
        self.cur_time = 0;
        info!("session restarted on {} cells", self.grid.len());
    }

    /// 1-based index of the plate that claimed `cell`.
    pub fn owner_of(&self, cell: u32) -> Option<u32> {
        self.plates
            .iter()
            .find(|p| p.cells.contains(&cell))
            .map(|p| p.index)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            fit: self.grid.fit,
            phase: self.phase,
            steps: self.steps,
            cur_time: self.cur_time,
            plates: &self.plates,
            cells: self.grid.cells(),
        }
    }
}

/// Everything a host needs to present the session.
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub fit: GridFit,
    pub phase: Phase,
    pub steps: u32,
    pub cur_time: u64,
    pub plates: &'a [Plate],
    pub cells: &'a [Hexagon],
}
