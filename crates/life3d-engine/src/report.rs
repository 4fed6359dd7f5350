//! End-of-run report written next to the snapshots.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use life3d_core::SimulationConfig;
use life3d_core::runner::{RunEndReason, RunResult};
use life3d_types::{ColorMode, RunId, Shape, StepInfo};
use serde::Serialize;

use crate::error::EngineError;

/// File name of the report inside the output directory.
pub const REPORT_FILE: &str = "run-report.json";

/// Counters accumulated over every executed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    /// Cells born across the run.
    pub births: u64,
    /// Cells that died across the run.
    pub deaths: u64,
    /// Mutated newborns across both passes.
    pub mutations: u64,
    /// Largest population seen after any step.
    pub peak_population: u64,
}

impl RunTotals {
    /// Fold one step into the totals.
    pub fn record(&mut self, info: &StepInfo) {
        self.births = self.births.saturating_add(info.births);
        self.deaths = self.deaths.saturating_add(info.deaths);
        self.mutations = self.mutations.saturating_add(info.mutations());
        self.peak_population = self.peak_population.max(info.alive_after);
    }
}

/// Summary of one run, serialized as `run-report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier shared with every snapshot of the run.
    pub run_id: RunId,
    /// Wall-clock time the run loop started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the run loop returned.
    pub finished_at: DateTime<Utc>,
    /// Rule in canonical notation.
    pub rule: String,
    /// Lattice extents.
    pub shape: Shape,
    /// Seed of the run's random number generator.
    pub rng_seed: u64,
    /// Color inheritance mode.
    pub color_mode: ColorMode,
    /// Why the run stopped.
    pub end_reason: &'static str,
    /// Cycle length for steady-state endings.
    pub period: Option<u32>,
    /// Steps executed.
    pub total_steps: u64,
    /// Live cells when the run stopped.
    pub final_population: usize,
    /// Per-step counters summed over the run.
    pub totals: RunTotals,
    /// Snapshot files written successfully.
    pub snapshots_written: u64,
    /// Snapshot writes that failed and were skipped.
    pub snapshot_failures: u64,
}

/// Everything the report needs besides the run result.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// The run's identifier.
    pub run_id: RunId,
    /// Configuration the run was built from.
    pub config: &'a SimulationConfig,
    /// Canonical rule text.
    pub rule: String,
    /// Start of the run loop.
    pub started_at: DateTime<Utc>,
    /// Population after the last step.
    pub final_population: usize,
}

impl RunReport {
    /// Assemble the report from the run outcome.
    pub fn new(
        ctx: ReportContext<'_>,
        result: &RunResult,
        totals: RunTotals,
        snapshots_written: u64,
        snapshot_failures: u64,
    ) -> Self {
        let period = match result.end_reason {
            RunEndReason::SteadyState { period } => Some(period),
            RunEndReason::Extinction | RunEndReason::MaxStepsReached => None,
        };
        Self {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            finished_at: Utc::now(),
            rule: ctx.rule,
            shape: ctx.config.grid,
            rng_seed: ctx.config.rng_seed,
            color_mode: ctx.config.color.mode,
            end_reason: result.end_reason.as_str(),
            period,
            total_steps: result.total_steps,
            final_population: ctx.final_population,
            totals,
            snapshots_written,
            snapshot_failures,
        }
    }

    /// Write the report into `dir`, creating the directory if needed.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, EngineError> {
        ensure_dir(dir)?;
        let path = dir.join(REPORT_FILE);
        write_json(&path, self, true)?;
        Ok(path)
    }
}

/// Create `dir` and its parents.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(dir).map_err(|source| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Serialize `value` as JSON into a fresh file at `path`.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), EngineError> {
    let io_err = |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    out.flush().map_err(io_err)
}
