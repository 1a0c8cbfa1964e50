// vsense_sim/src/simulation/plugins/mod.rs

pub mod commands;
pub mod estimation;
pub mod sensors;
pub mod telemetry;
pub mod vehicles;
