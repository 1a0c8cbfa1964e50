// vsense_sim/src/simulation/plugins/vehicles.rs

use bevy::prelude::*;

use crate::prelude::*;
use crate::simulation::core::{
    app_state::LoadSet,
    components::{VehicleBus, VehicleEngine},
    prng::SimulationRng,
};
use crate::simulation::plugins::{
    commands::CommandScript, estimation::VehicleFilters, telemetry::TelemetryCounters,
};

pub struct VehiclesPlugin;

impl Plugin for VehiclesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::Loading),
            spawn_vehicles.in_set(LoadSet::Spawn),
        );
    }
}

/// Builds the bus a vehicle starts from: its home location plus the
/// airframe setting the engine selects a variant from.
pub fn initial_bus(vehicle: &VehicleConfig) -> InMemoryBus {
    let mut bus = InMemoryBus::new(vehicle.home);
    bus.system_settings.airframe_type = vehicle.airframe.raw();
    bus
}

/// One entity per configured vehicle. A vehicle whose engine or filter
/// configuration is rejected is logged and left out of the run.
fn spawn_vehicles(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut rng: ResMut<SimulationRng>,
) {
    if config.vehicles.is_empty() {
        warn!("[SPAWN] Scenario has no vehicles");
    }

    for vehicle in &config.vehicles {
        // Drawn before validation so a rejected vehicle does not shift the
        // seeds of the ones after it.
        let seed = rng.vehicle_seed();

        let engine = match SensorEngine::seeded(vehicle.engine.clone(), seed) {
            Ok(engine) => engine,
            Err(e) => {
                error!("[SPAWN] Vehicle '{}' has an invalid engine config: {}", vehicle.name, e);
                continue;
            }
        };
        let filters = match VehicleFilters::from_config(&vehicle.filters) {
            Ok(filters) => filters,
            Err(e) => {
                error!("[SPAWN] Vehicle '{}' filter chain failed to init: {}", vehicle.name, e);
                continue;
            }
        };

        let bus = initial_bus(vehicle);
        let entity = commands
            .spawn((
                Name::new(vehicle.name.clone()),
                VehicleBus(bus),
                CommandScript::new(vehicle.commands.clone()),
                filters,
                TelemetryCounters::default(),
            ))
            .id();
        // The handle carries the entity bits so packets can be routed back.
        let engine = engine.with_vehicle(VehicleHandle::from_entity(entity));
        commands.entity(entity).insert(VehicleEngine(engine));

        info!(
            "[SPAWN] Vehicle '{}' airframe setting {} ({:?}), seed {:#018x}",
            vehicle.name,
            vehicle.airframe.raw(),
            AirframeClass::from_raw(vehicle.airframe.raw()),
            seed
        );
    }
}
