// vsense_core/src/lib.rs

//! Virtual sensor generator: rigid-body airframe models that emit synthetic
//! inertial, barometric, magnetic, airspeed and GNSS readings onto a flight
//! stack's state bus.

pub mod bus;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimation;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod random;
pub mod types;
