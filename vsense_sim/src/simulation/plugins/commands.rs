// vsense_sim/src/simulation/plugins/commands.rs

use bevy::prelude::*;

use crate::prelude::*;
use crate::simulation::core::{components::VehicleBus, simulation_setup::RunStart};

// =========================================================================
// == Command Script Component & Plugin ==
// =========================================================================

/// Scripted pilot and controller inputs for one vehicle, played back in
/// time order into its bus.
#[derive(Component, Debug, Clone, Default)]
pub struct CommandScript {
    segments: Vec<CommandSegment>,
    next: usize,
}

impl CommandScript {
    pub fn new(mut segments: Vec<CommandSegment>) -> Self {
        segments.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
        Self { segments, next: 0 }
    }

    /// Segments not yet applied.
    pub fn remaining(&self) -> usize {
        self.segments.len() - self.next
    }

    /// Applies every segment whose start time is at or before `elapsed_s`.
    /// Returns how many were applied.
    pub fn apply_due(&mut self, elapsed_s: f64, bus: &mut InMemoryBus) -> usize {
        let mut applied = 0;
        while let Some(segment) = self.segments.get(self.next) {
            if segment.at_s > elapsed_s {
                break;
            }
            apply_segment(segment, bus);
            self.next += 1;
            applied += 1;
        }
        applied
    }
}

fn apply_segment(segment: &CommandSegment, bus: &mut InMemoryBus) {
    if let Some(armed) = segment.armed {
        bus.flight_status.armed = armed;
    }

    let actuator = &mut bus.actuator_desired;
    if let Some(throttle) = segment.throttle {
        actuator.throttle = throttle.clamp(0.0, 1.0);
    }
    if let Some(roll) = segment.roll {
        actuator.roll = roll.clamp(-1.0, 1.0);
    }
    if let Some(pitch) = segment.pitch {
        actuator.pitch = pitch.clamp(-1.0, 1.0);
    }
    if let Some(yaw) = segment.yaw {
        actuator.yaw = yaw.clamp(-1.0, 1.0);
    }

    // Rates in deg/s, unclamped.
    let rates = &mut bus.rate_desired;
    if let Some(rate) = segment.rate_roll {
        rates.roll = rate;
    }
    if let Some(rate) = segment.rate_pitch {
        rates.pitch = rate;
    }
    if let Some(rate) = segment.rate_yaw {
        rates.yaw = rate;
    }
}

pub struct CommandPlaybackPlugin;

impl Plugin for CommandPlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            command_playback_system.in_set(SimulationSet::Commands),
        );
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn command_playback_system(
    time: Res<Time<Fixed>>,
    start: Res<RunStart>,
    mut query: Query<(&Name, &mut CommandScript, &mut VehicleBus)>,
) {
    let elapsed_s = time.elapsed().saturating_sub(start.0).as_secs_f64();
    for (name, mut script, mut bus) in &mut query {
        let applied = script.apply_due(elapsed_s, &mut bus.0);
        if applied > 0 {
            let bus = &bus.0;
            debug!(
                "[COMMANDS] '{}' at {:.3} s: armed={} throttle={:.2} rates=({:.1}, {:.1}, {:.1})",
                name.as_str(),
                elapsed_s,
                bus.flight_status.armed,
                bus.actuator_desired.throttle,
                bus.rate_desired.roll,
                bus.rate_desired.pitch,
                bus.rate_desired.yaw
            );
        }
    }
}
