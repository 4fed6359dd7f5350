//! Step callback that exports grid snapshots for the external renderer.
//!
//! Every `snapshot_every` steps (and on the terminal step) the live cells
//! are written to `step_NNNN.json` in the output directory. Write failures
//! are logged and counted but never stop the run.

use std::path::{Path, PathBuf};

use life3d_core::Simulation;
use life3d_core::runner::StepCallback;
use life3d_types::{Rgb, RunId, Shape, Snapshot, StepInfo};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::report::{self, RunTotals};

/// One live cell in an exported snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
struct CellRecord {
    x: u32,
    y: u32,
    z: u32,
    rgb: Rgb,
    age: u32,
}

/// On-disk snapshot layout: sparse, live cells only.
#[derive(Debug, Clone, Serialize)]
struct SnapshotFile {
    run_id: RunId,
    step: u64,
    shape: Shape,
    population: usize,
    cells: Vec<CellRecord>,
}

impl SnapshotFile {
    fn new(run_id: RunId, snapshot: &Snapshot) -> Self {
        let cells: Vec<CellRecord> = snapshot
            .live_cells()
            .map(|(c, rgb, age)| CellRecord {
                x: c.x,
                y: c.y,
                z: c.z,
                rgb,
                age,
            })
            .collect();
        Self {
            run_id,
            step: snapshot.step,
            shape: snapshot.shape,
            population: cells.len(),
            cells,
        }
    }
}

/// File name for the snapshot taken after `step` steps.
pub fn snapshot_file_name(step: u64) -> String {
    format!("step_{step:04}.json")
}

/// Exports snapshots and keeps the run totals for the final report.
pub struct SnapshotWriter {
    run_id: RunId,
    dir: PathBuf,
    every: u64,
    written: u64,
    failures: u64,
    totals: RunTotals,
}

impl SnapshotWriter {
    /// Create a writer targeting `dir`. An `every` of zero disables export.
    pub fn new(run_id: RunId, dir: &Path, every: u64) -> Self {
        Self {
            run_id,
            dir: dir.to_path_buf(),
            every,
            written: 0,
            failures: 0,
            totals: RunTotals::default(),
        }
    }

    /// Whether periodic export is on.
    pub const fn is_enabled(&self) -> bool {
        self.every > 0
    }

    /// Snapshot files written so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Snapshot writes that failed.
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Totals over every step seen.
    pub const fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Create the output directory and export the seed state.
    ///
    /// Unlike the per-step exports, a failure here is fatal: it means the
    /// output directory is unusable.
    pub fn write_initial(&mut self, sim: &Simulation) -> Result<PathBuf, EngineError> {
        report::ensure_dir(&self.dir)?;
        let path = self.write(&sim.snapshot())?;
        self.written = self.written.saturating_add(1);
        Ok(path)
    }

    fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, EngineError> {
        let path = self.dir.join(snapshot_file_name(snapshot.step));
        report::write_json(&path, &SnapshotFile::new(self.run_id, snapshot), false)?;
        Ok(path)
    }

    fn is_due(&self, info: &StepInfo) -> bool {
        self.is_enabled() && (info.is_terminal() || info.step.checked_rem(self.every) == Some(0))
    }
}

impl StepCallback for SnapshotWriter {
    fn on_step(&mut self, info: &StepInfo, sim: &Simulation) {
        self.totals.record(info);
        if !self.is_due(info) {
            return;
        }
        match self.write(&sim.snapshot()) {
            Ok(path) => {
                self.written = self.written.saturating_add(1);
                debug!(step = info.step, path = %path.display(), "Snapshot written");
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!(step = info.step, error = %e, "Failed to write snapshot, continuing");
            }
        }
    }
}
