use log::info;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

use crate::geometry::Point;

use super::Plate;

/// Plate speeds follow N(4.5, 2.0) cm/yr; most real plates move 2 to 5 cm/yr.
pub const MEAN_SPEED: f64 = 4.5;
pub const SPEED_STD_DEV: f64 = 2.0;
/// Replaces negative speed draws.
pub const FALLBACK_SPEED: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Velocity {
    pub speed: f64,
    /// Degrees in [0, 360), measured like probe bearings (y down).
    pub direction: f64,
}

impl Velocity {
    pub fn components(&self) -> (f64, f64) {
        let a = self.direction.to_radians();
        (self.speed * a.cos(), self.speed * a.sin())
    }

    /// Arrow head for a vector drawn from `origin`, `scale` pixels per unit speed.
    pub fn endpoint(&self, origin: Point, scale: f64) -> Point {
        origin.offset(self.direction, scale * self.speed)
    }
}

pub fn sample_velocity<R: Rng + ?Sized>(rng: &mut R) -> Velocity {
    let z: f64 = rng.sample(StandardNormal);
    let mut speed = MEAN_SPEED + SPEED_STD_DEV * z;
    if speed < 0.0 {
        speed = FALLBACK_SPEED;
    }
    Velocity {
        speed,
        direction: rng.gen_range(0.0..360.0),
    }
}

/// Give every plate an independent random velocity anchored at its center.
pub fn assign_plate_motion<R: Rng + ?Sized>(plates: &mut [Plate], rng: &mut R) {
    for plate in plates.iter_mut() {
        let v = sample_velocity(rng);
        info!(
            "plate {}: speed {:.4}, direction {:.4}",
            plate.index, v.speed, v.direction
        );
        plate.velocity = Some(v);
    }
}
