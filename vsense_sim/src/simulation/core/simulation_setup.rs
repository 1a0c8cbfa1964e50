// vsense_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;

use crate::prelude::*;
use crate::simulation::core::app_state::LoadSet;
use crate::simulation::core::events::SensorPacketEvent;
use crate::simulation::core::prng::SimulationRng;

/// Fixed-update time at which `Running` was entered.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RunStart(pub Duration);

/// How long the run lasts once `Running` is entered.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RunDuration(pub Duration);

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // The scenario is loaded before the app is built.
        let simulation = match app.world().get_resource::<ScenarioConfig>() {
            Some(config) => config.simulation.clone(),
            None => {
                warn!("No ScenarioConfig resource, running with the default simulation block");
                app.init_resource::<ScenarioConfig>();
                Simulation::default()
            }
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        app.insert_resource(SimulationRng::new(simulation.seed));

        // --- 2. Time ---
        // Every frame advances virtual time by exactly one engine tick, so the
        // run is reproducible regardless of wall-clock speed.
        let tick = tick_period(simulation.tick_hz);
        info!(
            "[SETUP] Tick period {:?} ({:.1} Hz), run length {:.2} s",
            tick, simulation.tick_hz, simulation.duration_seconds
        );
        app.insert_resource(Time::<Fixed>::from_duration(tick))
            .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
            .insert_resource(RunDuration(run_duration(simulation.duration_seconds)))
            .init_resource::<RunStart>()
            .add_event::<SensorPacketEvent>();

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        app.configure_sets(
            OnEnter(AppState::Loading),
            (LoadSet::Spawn, LoadSet::Finalize).chain(),
        )
        .add_systems(
            OnEnter(AppState::Loading),
            transition_to_running.in_set(LoadSet::Finalize),
        )
        .add_systems(OnEnter(AppState::Running), record_run_start);

        // Configure the runtime schedule graph.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Commands,
                SimulationSet::Sensors,
                SimulationSet::Estimation,
                SimulationSet::Telemetry,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );
    }
}

/// Falls back to the flight stack's 500 Hz when the rate is unusable.
pub fn tick_period(tick_hz: f64) -> Duration {
    match Duration::try_from_secs_f64(1.0 / tick_hz) {
        Ok(period) if tick_hz.is_finite() && !period.is_zero() => period,
        _ => {
            warn!("Invalid tick rate {tick_hz}, using 500 Hz");
            Duration::from_millis(2)
        }
    }
}

/// Negative or NaN runs end at once. Lengths past `Duration::MAX` never end.
pub fn run_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("[SETUP] Vehicles spawned. Transitioning to AppState::Running.");
    next_state.set(AppState::Running);
}

fn record_run_start(mut commands: Commands, time: Res<Time<Fixed>>) {
    commands.insert_resource(RunStart(time.elapsed()));
}
