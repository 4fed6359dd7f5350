//! Headless driver for the Life3D chromatic cellular automaton.
//!
//! Loads the configuration, runs the simulation to a terminal state or the
//! step budget, exports periodic snapshots for an external renderer, and
//! writes a run report.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LIFE3D_CONFIG` or `life3d-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Validate the configuration and seed the grid
//! 4. Export the seed state when snapshots are enabled
//! 5. Run the simulation loop
//! 6. Log the result and write `run-report.json`

mod error;
mod report;
mod snapshot_writer;

use std::path::PathBuf;

use chrono::Utc;
use life3d_core::runner::{self, StopPolicy};
use life3d_core::{SimulationConfig, configure};
use life3d_types::RunId;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report::{ReportContext, RunReport};
use crate::snapshot_writer::SnapshotWriter;

/// Environment variable that overrides the configuration file path.
const CONFIG_ENV: &str = "LIFE3D_CONFIG";

/// Configuration file looked up in the working directory by default.
const DEFAULT_CONFIG_FILE: &str = "life3d-config.yaml";

/// Application entry point for the headless driver.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the output directory
/// cannot be written, or a step fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is configured from it, so nothing is
    //    logged until it has been read.
    let config_path = config_path();
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("life3d-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        rule = config.rule,
        rng_seed = config.rng_seed,
        max_steps = config.run.max_steps,
        snapshot_every = config.run.snapshot_every,
        auto_stop_extinction = config.run.auto_stop_extinction,
        auto_stop_steady = config.run.auto_stop_steady,
        steady_patience = config.run.steady_patience,
        output_dir = %config.run.output_dir.display(),
        "Run settings"
    );

    // 3. Build the simulation.
    let mut sim = configure(&config)?;
    let run_id = RunId::new();
    let started_at = Utc::now();
    info!(run_id = %run_id, "Simulation ready");

    // 4. Export the seed state.
    let mut writer = SnapshotWriter::new(run_id, &config.run.output_dir, config.run.snapshot_every);
    if writer.is_enabled() {
        let path = writer.write_initial(&sim)?;
        info!(path = %path.display(), "Initial snapshot written");
    }

    // 5. Run the simulation.
    let policy = StopPolicy::from(&config.run);
    let result = runner::run_simulation(&mut sim, policy, &mut writer)?;

    // 6. Log results and write the report.
    runner::log_run_end(&result);

    let ctx = ReportContext {
        run_id,
        config: &config,
        rule: sim.engine().rule().to_string(),
        started_at,
        final_population: sim.population(),
    };
    let report = RunReport::new(
        ctx,
        &result,
        writer.totals(),
        writer.written(),
        writer.failures(),
    );
    let report_path = report.write(&config.run.output_dir)?;

    info!(
        end_reason = result.end_reason.as_str(),
        total_steps = result.total_steps,
        snapshots = writer.written(),
        snapshot_failures = writer.failures(),
        report = %report_path.display(),
        "life3d-engine shutdown complete"
    );

    Ok(())
}

/// The configuration path: `LIFE3D_CONFIG` when set, else the default file.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Load the simulation configuration from `path`.
///
/// A missing file yields the defaults; the flag reports whether the file
/// was found.
fn load_config(path: &std::path::Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
