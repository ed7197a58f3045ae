pub mod config;
pub mod geometry;
pub mod grid;
pub mod hexagon;
pub mod plates;
pub mod session;

use std::time::Instant;

use config::Params;
use session::{Session, SessionError};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Build a map, seed and grow its plates to convergence, then assign motion.
///
/// Returns the finished session with per-stage timings. Growth that hits the
/// step budget without converging stops there and skips motion.
pub fn generate(params: &Params) -> Result<(Session, Vec<Timing>), SessionError> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Lay out the grid (and the neighbor index, if enabled)
    let t = Instant::now();
    let mut session = Session::new(params.clone())?;
    timings.push(Timing {
        name: "grid",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Seed plates
    let t = Instant::now();
    session.seed_plates()?;
    timings.push(Timing {
        name: "plate_seed",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Grow plates until no frontier moves
    let t = Instant::now();
    let outcome = session.run_to_convergence()?;
    timings.push(Timing {
        name: "plate_grow",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 4. Plate velocities
    if outcome.converged {
        let t = Instant::now();
        session.assign_motion()?;
        timings.push(Timing {
            name: "plate_motion",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
    }

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    Ok((session, timings))
}
