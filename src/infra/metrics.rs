// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:         the epoch number (1, 2, 3, ...)
//   - train_loss:    mean summed MSE over training batches
//   - val_loss:      mean summed MSE over validation batches
//   - best_val_loss: lowest val_loss so far in this run
//   - improved:      1 if best_model was written this epoch
//
// Output file: <run dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,best_val_loss,improved
//   1,1.982311,1.904022,1.904022,1
//   2,1.620487,1.951730,1.904022,0
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const METRICS_FILE: &str = "metrics.csv";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:         usize,
    pub train_loss:    f64,
    pub val_loss:      f64,
    pub best_val_loss: f64,
    pub improved:      bool,
}

impl EpochMetrics {
    pub fn new(
        epoch:         usize,
        train_loss:    f64,
        val_loss:      f64,
        best_val_loss: f64,
        improved:      bool,
    ) -> Self {
        Self { epoch, train_loss, val_loss, best_val_loss, improved }
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,val_loss,best_val_loss,improved")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.best_val_loss,
            u8::from(m.improved),
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
