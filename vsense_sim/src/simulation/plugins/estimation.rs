// vsense_sim/src/simulation/plugins/estimation.rs

use bevy::prelude::*;

use crate::prelude::*;
use crate::simulation::core::{components::VehicleBus, events::SensorPacketEvent};

// =========================================================================
// == Filter Chain Component & Plugin ==
// =========================================================================

/// The downstream estimation chain of one vehicle and its latest outputs.
#[derive(Component, Debug, Clone)]
pub struct VehicleFilters {
    pub chain: FilterChain,
    pub state: EstimationState,
    /// Bias-corrected barometric altitude, once the baro stage has settled.
    pub altitude: Option<f64>,
    /// Latest true airspeed, if the chain computes one.
    pub true_airspeed: Option<f64>,
    pub errors: u64,
    computes_tas: bool,
}

impl VehicleFilters {
    /// Builds and initializes the chain. The airspeed stage always runs
    /// ahead of the barometric bias stage.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        let mut chain = FilterChain::new();
        if config.airspeed {
            chain.push(Box::new(AirspeedFilter::new()));
        }
        if let Some(samples) = config.baro_bias_samples {
            chain.push(Box::new(BaroBiasFilter::new(samples)));
        }
        chain.init()?;

        Ok(Self {
            chain,
            state: EstimationState::default(),
            altitude: None,
            true_airspeed: None,
            errors: 0,
            computes_tas: config.airspeed,
        })
    }

    /// Feeds the readings the engine just published through the chain.
    pub fn process(&mut self, updated: UpdatedFields, bus: &InMemoryBus) -> Result<(), FilterError> {
        self.state.updated = updated;
        if updated.contains(SensorField::Baro) {
            if let Some(baro) = bus.baro_altitude {
                self.state.baro[0] = baro.altitude;
            }
        }
        if updated.contains(SensorField::Airspeed) {
            if let Some(airspeed) = bus.airspeed {
                self.state.airspeed[0] = airspeed.calibrated_airspeed;
            }
        }

        self.chain.run(&mut self.state)?;

        // A stage may withhold a reading by clearing its flag.
        if self.state.is_updated(SensorField::Baro) {
            self.altitude = Some(self.state.baro[0]);
        }
        if self.computes_tas && self.state.is_updated(SensorField::Airspeed) {
            self.true_airspeed = Some(self.state.airspeed[1]);
        }
        Ok(())
    }
}

pub struct EstimationPlugin;

impl Plugin for EstimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            filter_chain_system.in_set(SimulationSet::Estimation),
        );
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn filter_chain_system(
    mut packets: EventReader<SensorPacketEvent>,
    mut query: Query<(&Name, &VehicleBus, &mut VehicleFilters)>,
) {
    for SensorPacketEvent(packet) in packets.read() {
        let Ok((name, bus, mut filters)) = query.get_mut(packet.vehicle.to_entity()) else {
            continue;
        };
        if let Err(e) = filters.process(packet.updated, &bus.0) {
            filters.errors += 1;
            warn!("[ESTIMATION] '{}' at {:?}: {}", name.as_str(), packet.timestamp, e);
        }
    }
}
