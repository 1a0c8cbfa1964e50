// vsense_sim/src/simulation/plugins/sensors.rs
use bevy::prelude::*;

// --- Simulation Crate Imports ---
use crate::prelude::*;
use crate::simulation::core::{
    components::{VehicleBus, VehicleEngine},
    events::SensorPacketEvent,
};

pub struct SensorsPlugin;

impl Plugin for SensorsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            sensor_engine_system.in_set(SimulationSet::Sensors),
        );
    }
}

/// The free-running microsecond counter every engine reads this tick.
pub fn fixed_clock(elapsed: std::time::Duration) -> ManualClock {
    ManualClock::at(Timestamp::from_micros_wrapping(elapsed.as_micros() as u64))
}

/// Steps every vehicle engine once per fixed update and announces what
/// each one published.
fn sensor_engine_system(
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut VehicleEngine, &mut VehicleBus)>,
    mut packets: EventWriter<SensorPacketEvent>,
) {
    let clock = fixed_clock(time.elapsed());
    for (mut engine, mut bus) in &mut query {
        let packet = engine.0.step(&mut bus.0, &clock);
        // The packet already lists this tick's writes.
        bus.0.take_updated();
        packets.write(SensorPacketEvent(packet));
    }
}
