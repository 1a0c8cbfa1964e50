// vsense_core/src/config.rs

//! Engine tuning. Every field has a default, so an empty TOML table is a valid config.

use crate::error::ConfigError;
use crate::messages::GpsFixStatus;
use crate::models::AirframeClass;
use crate::random::NoiseSampler;
use nalgebra::Vector3;
use serde::Deserialize;
use std::time::Duration;

pub const GRAVITY: f64 = 9.81;

/// Longest interval the 32-bit microsecond counter can measure.
pub const MAX_PERIOD_S: f64 = u32::MAX as f64 * 1e-6;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Nominal tick period, used in place of any elapsed time below `min_dt_s`.
    pub tick_period_s: f64,
    pub min_dt_s: f64,
    pub gravity: f64,
    /// Write the simulated attitude back over the estimator's attitude.
    pub override_attitude: bool,
    /// Pin the model regardless of the configured airframe type.
    pub forced_class: Option<AirframeClass>,
    /// Standard deviation of the per-instance accelerometer bias, m/s^2.
    pub accel_bias_stddev: f64,
    pub sampler: NoiseSampler,
    pub channels: ChannelPeriods,
    pub drift: DriftParams,
    pub quadcopter: QuadcopterParams,
    pub airplane: AirplaneParams,
    pub constant: ConstantReadings,
    pub receiver: ReceiverParams,
    pub mag_bias: MagBiasConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_s: 2e-3,
            min_dt_s: 1e-3,
            gravity: GRAVITY,
            override_attitude: false,
            forced_class: None,
            accel_bias_stddev: 0.1,
            sampler: NoiseSampler::default(),
            channels: ChannelPeriods::default(),
            drift: DriftParams::default(),
            quadcopter: QuadcopterParams::default(),
            airplane: AirplaneParams::default(),
            constant: ConstantReadings::default(),
            receiver: ReceiverParams::default(),
            mag_bias: MagBiasConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("tick_period_s", self.tick_period_s)?;
        check_period("min_dt_s", self.min_dt_s)?;
        check_magnitude("gravity", self.gravity)?;
        check_magnitude("accel_bias_stddev", self.accel_bias_stddev)?;
        self.channels.validate()?;
        self.drift.validate()?;
        self.quadcopter.validate()?;
        self.airplane.validate()?;
        self.mag_bias.validate()?;
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(self.tick_period_s)
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

/// Emission periods of the rate-gated channels, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelPeriods {
    pub gps_s: f64,
    /// How far the GNSS velocity timer lags the position timer at start-up.
    pub gps_velocity_stagger_s: f64,
    pub mag_s: f64,
    pub baro_s: f64,
    pub airspeed_s: f64,
}

impl Default for ChannelPeriods {
    fn default() -> Self {
        Self {
            gps_s: 0.1,
            gps_velocity_stagger_s: 1e-3,
            mag_s: 1.0 / 75.0,
            baro_s: 1.0 / 20.0,
            airspeed_s: 1.0 / 20.0,
        }
    }
}

impl ChannelPeriods {
    fn validate(&self) -> Result<(), ConfigError> {
        check_period("channels.gps_s", self.gps_s)?;
        check_offset("channels.gps_velocity_stagger_s", self.gps_velocity_stagger_s)?;
        check_period("channels.mag_s", self.mag_s)?;
        check_period("channels.baro_s", self.baro_s)?;
        check_period("channels.airspeed_s", self.airspeed_s)
    }
}

/// One exponentially smoothed random walk: `x = alpha * x + sigma * n`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalkParams {
    pub alpha: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriftParams {
    pub wind: WalkParams,
    pub gps_position: WalkParams,
    pub gps_velocity: WalkParams,
    /// Value the barometric offset jumps to on its first update, meters.
    pub baro_seed_m: f64,
    pub baro_walk_sigma: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            wind: WalkParams {
                alpha: 0.95,
                sigma: 0.1,
            },
            gps_position: WalkParams {
                alpha: 0.95,
                sigma: 0.1,
            },
            gps_velocity: WalkParams {
                alpha: 0.65,
                sigma: 0.2,
            },
            baro_seed_m: 50.0,
            baro_walk_sigma: 0.01,
        }
    }
}

impl DriftParams {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, walk) in [
            ("drift.wind", self.wind),
            ("drift.gps_position", self.gps_position),
            ("drift.gps_velocity", self.gps_velocity),
        ] {
            check_smoothing(name, walk.alpha)?;
            check_magnitude(name, walk.sigma)?;
        }
        check_magnitude("drift.baro_walk_sigma", self.baro_walk_sigma)?;
        if !self.baro_seed_m.is_finite() {
            return Err(ConfigError::InvalidMagnitude {
                name: "drift.baro_seed_m",
                value: self.baro_seed_m,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuadcopterParams {
    pub actuator_alpha: f64,
    /// Body rate in deg/s produced by a full-scale actuator command.
    pub actuator_rate_scale: f64,
    pub max_thrust: f64,
    pub friction: f64,
}

impl Default for QuadcopterParams {
    fn default() -> Self {
        Self {
            actuator_alpha: 0.99,
            actuator_rate_scale: 250.0,
            max_thrust: 2.0 * GRAVITY,
            friction: 1.0,
        }
    }
}

impl QuadcopterParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_smoothing("quadcopter.actuator_alpha", self.actuator_alpha)?;
        check_magnitude("quadcopter.actuator_rate_scale", self.actuator_rate_scale)?;
        check_magnitude("quadcopter.max_thrust", self.max_thrust)?;
        check_magnitude("quadcopter.friction", self.friction)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirplaneParams {
    pub actuator_alpha: f64,
    pub max_thrust: f64,
    pub friction: f64,
    /// Forward airspeed (m/s) at which lift balances gravity at zero pitch.
    pub lift_speed: f64,
    /// Heading change (deg/s) per degree of roll.
    pub roll_heading_coupling: f64,
    /// Forward deceleration (m/s^2) per degree of pitch.
    pub pitch_thrust_coupling: f64,
    /// Multiplier on friction for sideways and vertical body airspeed.
    pub cross_flow_damping: f64,
    /// Hard-iron offset added to every magnetometer axis before bias removal.
    pub mag_hard_iron: f64,
    /// Apply the drifting wind to the airframe. The process is advanced either way.
    pub simulate_wind: bool,
}

impl Default for AirplaneParams {
    fn default() -> Self {
        Self {
            actuator_alpha: 0.8,
            max_thrust: 2.0 * GRAVITY,
            friction: 0.2,
            lift_speed: 8.0,
            roll_heading_coupling: 0.1,
            pitch_thrust_coupling: 0.2,
            cross_flow_damping: 100.0,
            mag_hard_iron: 100.0,
            simulate_wind: false,
        }
    }
}

impl AirplaneParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_smoothing("airplane.actuator_alpha", self.actuator_alpha)?;
        check_magnitude("airplane.max_thrust", self.max_thrust)?;
        check_magnitude("airplane.friction", self.friction)?;
        check_magnitude("airplane.lift_speed", self.lift_speed)?;
        check_magnitude("airplane.cross_flow_damping", self.cross_flow_damping)
    }
}

/// Fixed readings of the bench-test and model-agnostic variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstantReadings {
    pub baro_altitude: f64,
    pub mag: Vector3<f64>,
}

impl Default for ConstantReadings {
    fn default() -> Self {
        Self {
            baro_altitude: 1.0,
            mag: Vector3::new(400.0, 0.0, 800.0),
        }
    }
}

/// Synthetic receiver quality fields, held constant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverParams {
    pub satellites: u8,
    pub pdop: f64,
    pub status: GpsFixStatus,
}

impl Default for ReceiverParams {
    fn default() -> Self {
        Self {
            satellites: 7,
            pdop: 1.0,
            status: GpsFixStatus::Fix3D,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagBiasMethod {
    /// Drive the earth-frame reading toward the home field.
    #[default]
    HomeField,
    /// Cancel offsets from the norm change between successive readings.
    NormDifference,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MagBiasConfig {
    pub method: MagBiasMethod,
    /// Nulling gain applied on every magnetometer emission.
    pub rate: f64,
    /// Minimum change between readings before the norm-difference method updates.
    pub min_norm_difference: f64,
}

impl Default for MagBiasConfig {
    fn default() -> Self {
        Self {
            method: MagBiasMethod::HomeField,
            rate: 0.01,
            min_norm_difference: 50.0,
        }
    }
}

impl MagBiasConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_magnitude("mag_bias.rate", self.rate)?;
        check_magnitude("mag_bias.min_norm_difference", self.min_norm_difference)
    }
}

// --- Helpers ---

fn check_period(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= MAX_PERIOD_S {
        Ok(())
    } else {
        Err(ConfigError::InvalidPeriod { name, value })
    }
}

/// Zero allowed, bounded like a period.
fn check_offset(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=MAX_PERIOD_S).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidMagnitude { name, value })
    }
}

fn check_smoothing(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSmoothing { name, value })
    }
}

fn check_magnitude(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMagnitude { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_channel_period() {
        let mut config = EngineConfig::default();
        config.channels.mag_s = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPeriod {
                name: "channels.mag_s",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_periods_the_counter_cannot_measure() {
        let mut config = EngineConfig::default();
        config.channels.gps_s = 1e12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPeriod { name: "channels.gps_s", .. })
        ));

        let mut config = EngineConfig::default();
        config.channels.gps_velocity_stagger_s = MAX_PERIOD_S * 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMagnitude {
                name: "channels.gps_velocity_stagger_s",
                ..
            })
        ));

        let mut config = EngineConfig::default();
        config.channels.baro_s = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.channels.mag_s = MAX_PERIOD_S;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_unit_smoothing_constant() {
        let mut config = EngineConfig::default();
        config.quadcopter.actuator_alpha = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSmoothing { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_gain() {
        let mut config = EngineConfig::default();
        config.mag_bias.rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMagnitude { name: "mag_bias.rate", .. })
        ));
    }
}
