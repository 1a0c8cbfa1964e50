// vsense_sim/src/bin/vsense.rs

//! Headless run of a vsense scenario.
//!
//! `cargo run --bin vsense -- --scenario assets/scenarios/00_mixed_fleet.toml --report run.toml`

use std::process::ExitCode;
use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin};
use clap::Parser;

use vsense_sim::cli::Cli;
use vsense_sim::prelude::AppState;
use vsense_sim::simulation::config::load_scenario;
use vsense_sim::VsenseSimulationPlugin;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --- 1. Load Simulation Configuration ---
    // Logging is not up yet, so a bad scenario goes straight to stderr.
    let config = match load_scenario(&cli.scenario, &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Could not load scenario '{}': {}",
                cli.scenario.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    app.add_plugins((
        // No window: frames run back to back and virtual time advances by
        // a fixed tick per frame.
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        StatesPlugin,
        LogPlugin {
            filter: cli.log_filter.clone(),
            ..default()
        },
    ))
    .insert_resource(config)
    .insert_resource(cli);

    app.init_state::<AppState>();

    // --- 3. Add the Main Simulation Plugin ---
    app.add_plugins(VsenseSimulationPlugin);

    // --- 4. Run the App ---
    info!("Starting vsense simulation...");
    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}
