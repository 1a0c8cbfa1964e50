// vsense_sim/src/simulation/core/prng.rs

use bevy::prelude::Resource;
use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A newtype wrapper around `ChaCha8Rng` to make it a Bevy Resource.
/// Every vehicle engine is seeded from this generator, so one scenario seed
/// reproduces the whole run.
#[derive(Resource)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    /// Seeded from the OS when the scenario names no seed.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| OsRng.next_u64());
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// A fresh seed for one vehicle engine.
    pub fn vehicle_seed(&mut self) -> u64 {
        self.0.next_u64()
    }
}
