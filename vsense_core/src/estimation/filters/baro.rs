// vsense_core/src/estimation/filters/baro.rs

use super::{EstimationState, StateFilter};
use crate::error::FilterError;
use crate::messages::SensorField;

/// Zeroes barometric altitude at start-up. The first `settle_samples`
/// readings are averaged into an offset and withheld from later stages;
/// every reading after that has the offset removed.
#[derive(Debug, Clone)]
pub struct BaroBiasFilter {
    settle_samples: usize,
    seen: usize,
    offset: f64,
}

impl BaroBiasFilter {
    pub fn new(settle_samples: usize) -> Self {
        Self {
            settle_samples,
            seen: 0,
            offset: 0.0,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_settled(&self) -> bool {
        self.seen >= self.settle_samples
    }
}

impl StateFilter for BaroBiasFilter {
    fn name(&self) -> &'static str {
        "baro_bias"
    }

    fn init(&mut self) -> Result<(), FilterError> {
        self.seen = 0;
        self.offset = 0.0;
        Ok(())
    }

    fn filter(&mut self, state: &mut EstimationState) -> Result<(), FilterError> {
        if !state.is_updated(SensorField::Baro) {
            return Ok(());
        }
        let altitude = state.baro[0];
        if !altitude.is_finite() {
            return Err(FilterError::NonFinite { stage: self.name() });
        }

        if self.is_settled() {
            state.baro[0] = altitude - self.offset;
        } else {
            self.seen += 1;
            self.offset += (altitude - self.offset) / self.seen as f64;
            state.updated.remove(SensorField::Baro);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn baro(altitude: f64) -> EstimationState {
        EstimationState {
            updated: SensorField::Baro.into(),
            baro: [altitude],
            airspeed: [0.0, 0.0],
        }
    }

    #[test]
    fn averages_then_subtracts() {
        let mut filter = BaroBiasFilter::new(4);
        filter.init().unwrap();
        for altitude in [49.0, 51.0, 50.5, 49.5] {
            let mut state = baro(altitude);
            filter.filter(&mut state).unwrap();
            assert!(!state.is_updated(SensorField::Baro));
        }
        assert!(filter.is_settled());
        assert_abs_diff_eq!(filter.offset(), 50.0, epsilon = 1e-12);

        let mut state = baro(62.0);
        filter.filter(&mut state).unwrap();
        assert!(state.is_updated(SensorField::Baro));
        assert_abs_diff_eq!(state.baro[0], 12.0, epsilon = 1e-12);
    }

    #[test]
    fn ignores_runs_without_baro() {
        let mut filter = BaroBiasFilter::new(1);
        let mut state = EstimationState {
            baro: [f64::NAN],
            ..Default::default()
        };
        assert!(filter.filter(&mut state).is_ok());
        assert!(!filter.is_settled());
    }
}
