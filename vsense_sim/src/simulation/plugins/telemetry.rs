// vsense_sim/src/simulation/plugins/telemetry.rs

//! Per-vehicle emission counting, end-of-run detection and the run report.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::cli::Cli;
use crate::prelude::*;
use crate::simulation::core::{
    components::VehicleEngine,
    events::SensorPacketEvent,
    simulation_setup::{RunDuration, RunStart},
};
use crate::simulation::plugins::estimation::VehicleFilters;

// =========================================================================
// == Telemetry Components & Plugin ==
// =========================================================================

#[derive(Component, Debug, Clone, Default)]
pub struct TelemetryCounters {
    pub ticks: u64,
    pub emissions: HashMap<SensorField, u64>,
    pub last_class: Option<AirframeClass>,
}

impl TelemetryCounters {
    /// Counts one packet. Returns the new class when the variant changed.
    pub fn record(&mut self, packet: &SensorPacket) -> Option<AirframeClass> {
        self.ticks += 1;
        for field in packet.updated.iter() {
            *self.emissions.entry(field).or_default() += 1;
        }
        let changed = self.last_class != Some(packet.class);
        self.last_class = Some(packet.class);
        changed.then_some(packet.class)
    }

    pub fn count(&self, field: SensorField) -> u64 {
        self.emissions.get(&field).copied().unwrap_or(0)
    }
}

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (count_packets_system, check_run_complete)
                .chain()
                .in_set(SimulationSet::Telemetry),
        )
        .add_systems(OnEnter(AppState::Finished), finish_run);
    }
}

// =========================================================================
// == Run Report ==
// =========================================================================

#[derive(Debug, Clone, Serialize, Default)]
pub struct RunReport {
    pub vehicles: Vec<VehicleReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleReport {
    pub name: String,
    pub class: Option<AirframeClass>,
    pub ticks: u64,
    pub filter_errors: u64,
    /// NED position in meters. Only the dynamic variants track one.
    pub position: Option<[f64; 3]>,
    pub mag_bias: [f64; 3],
    pub accel_bias: [f64; 3],
    pub altitude: Option<f64>,
    pub true_airspeed: Option<f64>,
    pub emissions: BTreeMap<String, u64>,
}

impl VehicleReport {
    pub fn new(
        name: &str,
        engine: &SensorEngine,
        counters: &TelemetryCounters,
        filters: Option<&VehicleFilters>,
    ) -> Self {
        let class = engine.active_class();
        let position = class
            .and_then(|class| engine.vehicle_state(class))
            .map(|state| state.position.into());
        let emissions = SensorField::ALL
            .into_iter()
            .map(|field| (format!("{field:?}"), counters.count(field)))
            .filter(|(_, count)| *count > 0)
            .collect();

        Self {
            name: name.to_string(),
            class,
            ticks: counters.ticks,
            filter_errors: filters.map_or(0, |f| f.errors),
            position,
            mag_bias: engine.mag_bias().into(),
            accel_bias: engine.accel_bias().into(),
            altitude: filters.and_then(|f| f.altitude),
            true_airspeed: filters.and_then(|f| f.true_airspeed),
            emissions,
        }
    }
}

impl RunReport {
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        let text = self.to_toml().map_err(|e| e.to_string())?;
        std::fs::write(path, text).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

fn count_packets_system(
    mut packets: EventReader<SensorPacketEvent>,
    mut query: Query<(&Name, &mut TelemetryCounters)>,
) {
    for SensorPacketEvent(packet) in packets.read() {
        let Ok((name, mut counters)) = query.get_mut(packet.vehicle.to_entity()) else {
            continue;
        };
        if let Some(class) = counters.record(packet) {
            info!("[TELEMETRY] '{}' now running the {:?} model", name.as_str(), class);
        }
    }
}

fn check_run_complete(
    time: Res<Time<Fixed>>,
    start: Res<RunStart>,
    duration: Res<RunDuration>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if time.elapsed().saturating_sub(start.0) >= duration.0 {
        info!("[TELEMETRY] Run length {:?} reached", duration.0);
        next_state.set(AppState::Finished);
    }
}

fn finish_run(
    query: Query<(
        &Name,
        &VehicleEngine,
        &TelemetryCounters,
        Option<&VehicleFilters>,
    )>,
    cli: Option<Res<Cli>>,
    mut exit: EventWriter<AppExit>,
) {
    let mut report = RunReport::default();
    for (name, engine, counters, filters) in &query {
        report
            .vehicles
            .push(VehicleReport::new(name.as_str(), &engine.0, counters, filters));
    }
    report.vehicles.sort_by(|a, b| a.name.cmp(&b.name));

    for vehicle in &report.vehicles {
        info!(
            "[SUMMARY] '{}' {:?}: {} ticks, emissions {:?}, position {:?}, mag bias {:?}",
            vehicle.name,
            vehicle.class,
            vehicle.ticks,
            vehicle.emissions,
            vehicle.position,
            vehicle.mag_bias
        );
        if vehicle.filter_errors > 0 {
            warn!(
                "[SUMMARY] '{}' had {} filter errors",
                vehicle.name, vehicle.filter_errors
            );
        }
    }

    let report_path = cli.as_ref().and_then(|cli| cli.report.as_deref());
    if let Some(path) = report_path {
        if let Err(e) = report.write(path) {
            error!("[SUMMARY] Failed to write report: {}", e);
            exit.write(AppExit::error());
            return;
        }
        info!("[SUMMARY] Report written to {}", path.display());
    }
    exit.write(AppExit::Success);
}
