// vsense_core/src/models/drift.rs

//! Slow random processes layered over the true state: wind, GNSS drift and
//! barometric offset.

use crate::config::{DriftParams, WalkParams};
use crate::random::RandomSource;
use nalgebra::Vector3;

/// A 3-axis exponentially smoothed random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftProcess {
    pub value: Vector3<f64>,
    alpha: f64,
    sigma: f64,
}

impl DriftProcess {
    pub fn new(params: WalkParams) -> Self {
        Self {
            value: Vector3::zeros(),
            alpha: params.alpha,
            sigma: params.sigma,
        }
    }

    pub fn update(&mut self, noise: &mut dyn RandomSource) -> Vector3<f64> {
        for axis in 0..3 {
            self.value[axis] = self.value[axis] * self.alpha + noise.gaussian() * self.sigma;
        }
        self.value
    }
}

/// Barometric offset. Zero means "not yet seeded": the first update jumps
/// straight to the seed value, every later one adds a small Gaussian step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroOffset {
    pub value: f64,
    seed: f64,
    sigma: f64,
}

impl BaroOffset {
    pub fn new(seed: f64, sigma: f64) -> Self {
        Self {
            value: 0.0,
            seed,
            sigma,
        }
    }

    pub fn update(&mut self, noise: &mut dyn RandomSource) -> f64 {
        if self.value == 0.0 {
            self.value = self.seed;
        } else {
            self.value += noise.gaussian() * self.sigma;
        }
        self.value
    }
}

/// All drift processes owned by one dynamic variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftState {
    pub wind: DriftProcess,
    pub gps_position: DriftProcess,
    pub gps_velocity: DriftProcess,
    pub baro_offset: BaroOffset,
}

impl DriftState {
    pub fn new(params: &DriftParams) -> Self {
        Self {
            wind: DriftProcess::new(params.wind),
            gps_position: DriftProcess::new(params.gps_position),
            gps_velocity: DriftProcess::new(params.gps_velocity),
            baro_offset: BaroOffset::new(params.baro_seed_m, params.baro_walk_sigma),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RandomSource, ScriptedSource, ZeroNoise};
    use approx::assert_abs_diff_eq;

    /// Always returns the same Gaussian.
    #[derive(Debug)]
    struct Constant(f64);

    impl RandomSource for Constant {
        fn uniform(&mut self) -> f64 {
            0.5
        }
        fn gaussian(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn walk_converges_to_steady_state_under_constant_input() {
        let mut process = DriftProcess::new(WalkParams {
            alpha: 0.95,
            sigma: 0.1,
        });
        let mut noise = Constant(1.0);
        for _ in 0..2000 {
            process.update(&mut noise);
        }
        // x* = sigma / (1 - alpha)
        assert_abs_diff_eq!(process.value.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(process.value.z, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn walk_decays_without_noise() {
        let mut process = DriftProcess::new(WalkParams {
            alpha: 0.65,
            sigma: 0.2,
        });
        process.value = Vector3::new(1.0, -1.0, 0.5);
        process.update(&mut ZeroNoise);
        assert_abs_diff_eq!(process.value.x, 0.65, epsilon = 1e-12);
        assert_abs_diff_eq!(process.value.y, -0.65, epsilon = 1e-12);
    }

    #[test]
    fn baro_offset_seeds_then_walks() {
        let mut offset = BaroOffset::new(50.0, 0.01);
        let mut noise = Constant(2.0);
        assert_eq!(offset.update(&mut noise), 50.0);
        assert_abs_diff_eq!(offset.update(&mut noise), 50.02, epsilon = 1e-12);
    }

    #[test]
    fn baro_offset_stays_seeded_without_noise() {
        let mut offset = BaroOffset::new(50.0, 0.01);
        let mut noise = ScriptedSource::new(vec![0.5]);
        offset.update(&mut noise);
        offset.update(&mut noise);
        assert_eq!(offset.value, 50.0);
    }
}
