// vsense_core/src/estimation/mod.rs

pub mod filters;
pub mod mag_bias;
