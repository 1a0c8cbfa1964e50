// vsense_sim/src/simulation/config/mod.rs

//! Loading the scenario file and layering command-line overrides on top.

pub mod structs;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::Path;

pub use structs::{
    AirframeSetting, CommandSegment, FilterConfig, ScenarioConfig, Simulation, VehicleConfig,
};

/// Values the command line may override. Unset fields leave the file alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioOverrides {
    pub simulation: SimulationOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_hz: Option<f64>,
}

/// A missing file is an error rather than an empty scenario.
pub fn load_scenario(
    path: &Path,
    overrides: &ScenarioOverrides,
) -> Result<ScenarioConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "scenario file {} not found",
            path.display()
        )));
    }
    scenario_figment(Figment::new().merge(Toml::file(path)), overrides).extract()
}

/// Same as [`load_scenario`] for a scenario held in memory.
pub fn parse_scenario(
    toml: &str,
    overrides: &ScenarioOverrides,
) -> Result<ScenarioConfig, figment::Error> {
    scenario_figment(Figment::new().merge(Toml::string(toml)), overrides).extract()
}

fn scenario_figment(base: Figment, overrides: &ScenarioOverrides) -> Figment {
    base.merge(Serialized::defaults(overrides))
}
