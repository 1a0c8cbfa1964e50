// vsense_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::commands::CommandPlaybackPlugin;
use crate::simulation::plugins::estimation::EstimationPlugin;
use crate::simulation::plugins::sensors::SensorsPlugin;
use crate::simulation::plugins::telemetry::TelemetryPlugin;
use crate::simulation::plugins::vehicles::VehiclesPlugin;

// This prelude is for convenience for other files WITHIN the vsense_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
/// The binary inserts the `ScenarioConfig` resource, then adds this one plugin.
pub struct VsenseSimulationPlugin;

impl Plugin for VsenseSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Time, randomness and the schedule graph.
            SimulationSetupPlugin,
            // One engine entity per configured vehicle.
            VehiclesPlugin,
            CommandPlaybackPlugin,
            SensorsPlugin,
            EstimationPlugin,
            TelemetryPlugin,
        ));
    }
}
