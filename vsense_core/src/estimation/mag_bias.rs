// vsense_core/src/estimation/mag_bias.rs

//! Online magnetometer offset estimation, run on every magnetometer emission.

use crate::config::{MagBiasConfig, MagBiasMethod};
use crate::messages::{AttitudeActual, HomeLocation};
use crate::models::rigid_body::earth_to_body;
use nalgebra::{Vector2, Vector3};
use std::fmt::Debug;

pub trait MagBiasEstimator: Debug + Send + Sync {
    /// Removes the current bias estimate from `raw`, refines the estimate and
    /// returns the corrected reading.
    fn correct(
        &mut self,
        raw: Vector3<f64>,
        attitude: &AttitudeActual,
        home: &HomeLocation,
    ) -> Vector3<f64>;

    fn bias(&self) -> Vector3<f64>;
}

pub fn from_config(config: &MagBiasConfig) -> Box<dyn MagBiasEstimator> {
    match config.method {
        MagBiasMethod::HomeField => Box::new(HomeFieldNulling::new(config.rate)),
        MagBiasMethod::NormDifference => Box::new(NormDifferenceNulling::new(
            config.rate,
            config.min_norm_difference,
        )),
    }
}

// --- Home Field Nulling ---

/// Pulls the earth-frame reading toward the home field: horizontal magnitude
/// toward |Be_xy|, vertical component toward Be_z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeFieldNulling {
    bias: Vector3<f64>,
    rate: f64,
}

impl HomeFieldNulling {
    pub fn new(rate: f64) -> Self {
        Self {
            bias: Vector3::zeros(),
            rate,
        }
    }
}

impl MagBiasEstimator for HomeFieldNulling {
    fn correct(
        &mut self,
        raw: Vector3<f64>,
        attitude: &AttitudeActual,
        home: &HomeLocation,
    ) -> Vector3<f64> {
        let corrected = raw - self.bias;

        let home_xy = home.be.xy().norm();
        let home_z = home.be.z;

        let earth = earth_to_body(&attitude.q).transpose() * corrected;
        let (sy, cy) = attitude.yaw.to_radians().sin_cos();
        let xy = Vector2::new(cy * earth.x + sy * earth.y, -sy * earth.x + cy * earth.y);

        let xy_norm = xy.norm();
        if xy_norm > 0.0 {
            let horizontal = -self.rate * (xy / xy_norm * home_xy - xy);
            self.bias.x += horizontal.x;
            self.bias.y += horizontal.y;
        }
        self.bias.z += -self.rate * (home_z - earth.z);

        corrected
    }

    fn bias(&self) -> Vector3<f64> {
        self.bias
    }
}

// --- Norm Difference Nulling ---

/// Uses the change in norm between two sufficiently different readings: a
/// pure rotation preserves the norm, so any norm change is blamed on offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormDifferenceNulling {
    bias: Vector3<f64>,
    rate: f64,
    min_norm_difference: f64,
    previous: Option<Vector3<f64>>,
}

impl NormDifferenceNulling {
    pub fn new(rate: f64, min_norm_difference: f64) -> Self {
        Self {
            bias: Vector3::zeros(),
            rate,
            min_norm_difference,
            previous: None,
        }
    }
}

impl MagBiasEstimator for NormDifferenceNulling {
    fn correct(
        &mut self,
        raw: Vector3<f64>,
        _attitude: &AttitudeActual,
        _home: &HomeLocation,
    ) -> Vector3<f64> {
        let current = raw - self.bias;

        let Some(previous) = self.previous else {
            self.previous = Some(current);
            return current;
        };

        let difference = previous - current;
        let norm_difference = difference.norm();
        if norm_difference > self.min_norm_difference {
            let scale = self.rate * (previous.norm() - current.norm()) / norm_difference;
            self.bias += difference * scale;
            self.previous = Some(current);
        }

        current
    }

    fn bias(&self) -> Vector3<f64> {
        self.bias
    }
}
