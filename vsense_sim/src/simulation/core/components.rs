// vsense_sim/src/simulation/core/components.rs

use bevy::prelude::Component;
use vsense_core::prelude::{InMemoryBus, SensorEngine};

// --- Wrapper Components for Core Types ---

/// The sensor engine of one vehicle entity.
#[derive(Component, Debug)]
pub struct VehicleEngine(pub SensorEngine);

/// The state bus the engine reads commands from and publishes readings to.
#[derive(Component, Debug, Default)]
pub struct VehicleBus(pub InMemoryBus);
