// vsense_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::bus::{InMemoryBus, StateBus};
pub use crate::estimation::filters::{EstimationState, FilterChain, StateFilter};
pub use crate::estimation::mag_bias::MagBiasEstimator;
pub use crate::models::{AirframeClass, AirframeModel, AirframeType};
pub use crate::random::RandomSource;
pub use crate::types::{Clock, Timestamp, VehicleHandle};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::EngineConfig;
pub use crate::engine::SensorEngine;
pub use crate::error::{ConfigError, FilterError};
pub use crate::messages::{SensorField, SensorPacket, UpdatedFields};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::estimation::filters::{AirspeedFilter, BaroBiasFilter};
pub use crate::random::{RngSource, ZeroNoise};
pub use crate::types::ManualClock;
