// vsense_core/src/estimation/filters/air.rs

use super::{EstimationState, StateFilter};
use crate::error::FilterError;
use crate::messages::SensorField;

const FEET_PER_1000: f64 = 304.8;

/// Indicated to true airspeed: 2% per 1000 ft of pressure altitude, which
/// stands in for a real density correction without outside air temperature.
pub fn ias_to_tas_factor(altitude_m: f64) -> f64 {
    1.0 + 0.02 * altitude_m / FEET_PER_1000
}

/// Computes true airspeed from indicated airspeed and the latest barometric
/// altitude. Must run ahead of any stage that removes barometric bias.
#[derive(Debug, Clone, Default)]
pub struct AirspeedFilter {
    altitude: f64,
}

impl AirspeedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

impl StateFilter for AirspeedFilter {
    fn name(&self) -> &'static str {
        "airspeed"
    }

    fn init(&mut self) -> Result<(), FilterError> {
        self.altitude = 0.0;
        Ok(())
    }

    fn filter(&mut self, state: &mut EstimationState) -> Result<(), FilterError> {
        if state.is_updated(SensorField::Baro) {
            self.altitude = state.baro[0];
        }
        if state.is_updated(SensorField::Airspeed) {
            state.airspeed[1] = state.airspeed[0] * ias_to_tas_factor(self.altitude);
        }
        Ok(())
    }

    /// Must see the pressure altitude before bias removal.
    fn runs_before(&self) -> &'static [&'static str] {
        &["baro_bias"]
    }
}
