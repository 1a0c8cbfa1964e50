// vsense_core/src/types.rs

use std::cell::Cell;
use std::time::{Duration, Instant};

// --- Core Identifier ---
/// Identifies one simulated vehicle. In the Bevy sim we use the bits of the Entity ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VehicleHandle(pub u64);

impl VehicleHandle {
    // A convenience method for use in the Bevy adapter crate.
    #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
    pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
        Self(entity.to_bits())
    }

    #[cfg(feature = "bevy")]
    pub fn to_entity(self) -> bevy_ecs::prelude::Entity {
        bevy_ecs::prelude::Entity::from_bits(self.0)
    }
}

// --- Time ---

/// A raw microsecond counter, as read from a free-running hardware timer.
///
/// The counter is 32 bits wide and wraps roughly every 71 minutes, so two
/// timestamps must only ever be compared through [`Timestamp::elapsed_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// Truncates a monotonic microsecond count to the wrapping counter width.
    pub fn from_micros_wrapping(micros: u64) -> Self {
        Self(micros as u32)
    }

    /// Time elapsed from `earlier` to `self`, correct across one counter roll-over.
    pub fn elapsed_since(self, earlier: Timestamp) -> Duration {
        Duration::from_micros(u64::from(self.0.wrapping_sub(earlier.0)))
    }

    pub fn wrapping_add(self, delta: Duration) -> Self {
        Self(self.0.wrapping_add(delta.as_micros() as u32))
    }
}

// --- Core Trait for Time Lookups ---
/// Monotonic time source read by the engine at the start of each tick and
/// at every channel emission check.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// A clock that only moves when told to. The sim adapter sets it from the
/// fixed-update time each tick; tests advance it by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().wrapping_add(delta));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Wall-clock backed source for running the engine against real time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros_wrapping(self.origin.elapsed().as_micros() as u64)
    }
}
