// vsense_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the vsense_core prelude so plugins see the engine, bus and
// filter types directly.
pub use vsense_core::messages::HomeLocation;
pub use vsense_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, LoadSet, SimulationSet};
pub use crate::simulation::core::components::{VehicleBus, VehicleEngine};
pub use crate::simulation::core::events::SensorPacketEvent;
