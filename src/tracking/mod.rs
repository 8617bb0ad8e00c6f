//! Experiment tracking for training runs.
//!
//! Every training run gets its own directory under the configured runs root,
//! holding a single `run.json` with the run's parameters, metrics and final
//! status. The run id doubles as the artifact version of the pair the run
//! produced, which makes a run and its artifacts trivially joinable.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use strum::Display;
use uuid::Uuid;

/// File name of the per-run record
pub const RUN_FILE: &str = "run.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Everything recorded about one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRun {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub params: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
    pub artifact_version: Option<String>,
    pub error: Option<String>,
}

/// Collects parameters and metrics for one run and persists them as JSON
pub struct RunTracker {
    dir: PathBuf,
    run: TrainingRun,
}

impl RunTracker {
    /// Mint a run id, create the run directory and persist the initial record
    pub fn start(runs_dir: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let dir = runs_dir.join(&run_id);
        fs::create_dir_all(&dir)?;

        let run = TrainingRun {
            run_id: run_id.clone(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifact_version: None,
            error: None,
        };

        let tracker = Self { dir, run };
        tracker.persist()?;

        tracing::info!(run_id = %run_id, dir = %tracker.dir.display(), "Started training run");

        Ok(tracker)
    }

    pub fn run_id(&self) -> &str {
        &self.run.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_param(&mut self, key: impl Into<String>, value: impl ToString) {
        self.run.params.insert(key.into(), value.to_string());
    }

    pub fn log_metric(&mut self, key: impl Into<String>, value: f64) {
        self.run.metrics.insert(key.into(), value);
    }

    pub fn log_metrics(&mut self, metrics: &HashMap<String, f64>) {
        for (key, value) in metrics {
            self.run.metrics.insert(key.clone(), *value);
        }
    }

    /// Mark the run completed, record the artifact version and persist
    pub fn finish(mut self, artifact_version: &str) -> Result<TrainingRun> {
        self.run.status = RunStatus::Completed;
        self.run.finished_at = Some(Utc::now());
        self.run.artifact_version = Some(artifact_version.to_string());
        self.persist()?;
        Ok(self.run)
    }

    /// Mark the run failed with the error message and persist
    pub fn fail(mut self, error: &AppError) -> Result<TrainingRun> {
        self.run.status = RunStatus::Failed;
        self.run.finished_at = Some(Utc::now());
        self.run.error = Some(error.to_string());
        self.persist()?;
        Ok(self.run)
    }

    fn persist(&self) -> Result<()> {
        let path = self.dir.join(RUN_FILE);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.run)?;
        writer.flush()?;
        Ok(())
    }
}

/// Read a single run record
pub fn read_run(path: impl AsRef<Path>) -> Result<TrainingRun> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(AppError::from)
}

/// Read all run records under `runs_dir`, newest first
///
/// Unreadable entries are skipped with a warning instead of failing the
/// whole listing.
pub fn list_runs(runs_dir: &Path) -> Result<Vec<TrainingRun>> {
    if !runs_dir.exists() {
        return Ok(Vec::new());
    }

    let mut runs = Vec::new();
    for entry in fs::read_dir(runs_dir)? {
        let entry = entry?;
        let path = entry.path().join(RUN_FILE);
        if !path.is_file() {
            continue;
        }
        match read_run(&path) {
            Ok(run) => runs.push(run),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable run record");
            }
        }
    }

    runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    Ok(runs)
}
