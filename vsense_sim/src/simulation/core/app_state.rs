// vsense_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. Vehicles are spawned here.
    #[default]
    Loading,

    /// Engines tick on every fixed update.
    Running,

    /// The configured duration elapsed. Reports are written and the app exits.
    Finished,
}

/// Ordering of the one-shot work done on entering `Loading`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadSet {
    /// Build one engine entity per configured vehicle.
    Spawn,
    /// Move on to `Running`.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets (The "Data Flow Graph") ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Scripted pilot inputs are written to each vehicle's bus.
    Commands,
    /// Each engine reads its bus and publishes synthetic readings.
    Sensors,
    /// Filter chains consume the fresh readings.
    Estimation,
    /// Emission counting and end-of-run detection.
    Telemetry,
}
