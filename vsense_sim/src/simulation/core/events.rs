// vsense_sim/src/simulation/core/events.rs
use bevy::prelude::Event;
// Import the pure data struct from the core library
use vsense_core::messages::SensorPacket;

/// One engine tick's summary, wrapped so Bevy can carry it.
#[derive(Event, Debug, Clone, Copy)]
pub struct SensorPacketEvent(pub SensorPacket);
