// vsense_sim/src/simulation/config/structs.rs

use bevy::prelude::Resource;
use serde::Deserialize;
use vsense_core::config::EngineConfig;
use vsense_core::messages::HomeLocation;
use vsense_core::models::AirframeType;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The root of a scenario TOML file.
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    // `[[vehicles]]` in the TOML.
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    pub duration_seconds: f64,
    /// Engine tick rate. The flight stack runs its sensor task at 500 Hz.
    pub tick_hz: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 10.0,
            tick_hz: 500.0,
        }
    }
}

/// The airframe setting as it would sit on the bus. A bare number is passed
/// through unchecked, which is how unknown settings are exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AirframeSetting {
    Named(AirframeType),
    Raw(u8),
}

impl AirframeSetting {
    pub fn raw(self) -> u8 {
        match self {
            AirframeSetting::Named(airframe) => airframe as u8,
            AirframeSetting::Raw(raw) => raw,
        }
    }
}

impl Default for AirframeSetting {
    fn default() -> Self {
        AirframeSetting::Named(AirframeType::QuadX)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    pub name: String,
    #[serde(default)]
    pub airframe: AirframeSetting,
    #[serde(default)]
    pub home: HomeLocation,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    /// Time-ordered command segments played back into the bus.
    #[serde(default)]
    pub commands: Vec<CommandSegment>,
}

/// Which estimation stages run downstream of the sensors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub airspeed: bool,
    /// Readings averaged into the barometric offset. `None` disables the stage.
    pub baro_bias_samples: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            airspeed: true,
            baro_bias_samples: Some(20),
        }
    }
}

/// From `at_s` on, the named inputs take these values. Inputs a segment
/// leaves out keep whatever the previous segment set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSegment {
    pub at_s: f64,
    pub armed: Option<bool>,
    pub throttle: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub rate_roll: Option<f64>,
    pub rate_pitch: Option<f64>,
    pub rate_yaw: Option<f64>,
}
