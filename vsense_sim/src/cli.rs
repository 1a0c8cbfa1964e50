// vsense_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

use crate::simulation::config::{ScenarioOverrides, SimulationOverrides};

/// vsense: headless virtual sensor simulation for flight-control testing.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/00_mixed_fleet.toml")]
    pub scenario: PathBuf,

    /// Override the scenario's PRNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the simulated duration, in seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Override the engine tick rate, in Hz.
    #[arg(long)]
    pub tick_hz: Option<f64>,

    /// Log filter in `tracing` env-filter syntax.
    #[arg(long, default_value = "info,vsense_sim=debug,vsense_core=info")]
    pub log_filter: String,

    /// Write an end-of-run report to this TOML file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            simulation: SimulationOverrides {
                seed: self.seed,
                duration_seconds: self.duration,
                tick_hz: self.tick_hz,
            },
        }
    }
}
