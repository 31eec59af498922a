// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder,
// plus the JSON metadata a later reconstruction needs.
//
// One directory per training run, named by its start time:
//
//   models/
//     2026-10-18_14-03-55/
//       best_model.mpk            ← weights with lowest val loss
//       last_model.mpk            ← weights after latest epoch (optional)
//       train_config.json         ← TrainConfig (shape, widths, lr, ...)
//       normalization_stats.json  ← stats the model was trained with
//       metrics.csv               ← written by MetricsLogger
//
// best_model is overwritten on every improvement; nothing in a run
// directory is ever deleted.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::stats::NormalizationStats;
use crate::ml::{model::ReconNet, trainer::Checkpointer};

pub const BEST_MODEL_STEM: &str = "best_model";
pub const LAST_MODEL_STEM: &str = "last_model";
pub const CONFIG_FILE:     &str = "train_config.json";
pub const STATS_FILE:      &str = "normalization_stats.json";

/// Human-readable run directory name, e.g. 2026-10-18_14-03-55
pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Manages the files of one training run directory.
pub struct CheckpointManager {
    run_dir: PathBuf,
}

impl CheckpointManager {
    /// Create `<models_dir>/<timestamp>` for a new training run.
    /// A second run started within the same second gets a `_1`, `_2`, ... suffix.
    pub fn create_run(models_dir: impl AsRef<Path>) -> Result<Self> {
        let stamp   = run_timestamp();
        let mut run_dir = models_dir.as_ref().join(&stamp);
        let mut n = 0;
        while run_dir.exists() {
            n += 1;
            run_dir = models_dir.as_ref().join(format!("{stamp}_{n}"));
        }
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create run directory '{}'", run_dir.display()))?;
        tracing::info!("Run directory: {}", run_dir.display());
        Ok(Self { run_dir })
    }

    /// Open an existing run directory, e.g. the parent of a checkpoint file.
    pub fn open(run_dir: impl Into<PathBuf>) -> Self {
        Self { run_dir: run_dir.into() }
    }

    /// Directory holding `checkpoint`.
    pub fn for_checkpoint(checkpoint: &Path) -> Self {
        let dir = checkpoint
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::open(dir)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Full path (with the recorder's extension) of a model file.
    pub fn model_path<B: Backend>(&self, stem: &str) -> PathBuf {
        self.run_dir
            .join(stem)
            .with_extension(<CompactRecorder as FileRecorder<B>>::file_extension())
    }

    /// Overwrite the run's best checkpoint with `model`'s weights.
    pub fn save_best<B: Backend>(&self, model: &ReconNet<B>) -> Result<PathBuf> {
        self.save_model(model, BEST_MODEL_STEM)
    }

    /// Overwrite the run's latest-epoch checkpoint.
    pub fn save_last<B: Backend>(&self, model: &ReconNet<B>) -> Result<PathBuf> {
        self.save_model(model, LAST_MODEL_STEM)
    }

    fn save_model<B: Backend>(&self, model: &ReconNet<B>, stem: &str) -> Result<PathBuf> {
        let path = self.model_path::<B>(stem);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(path)
    }

    /// Load the weights at `path` into `model`, replacing all parameters.
    pub fn load_model<B: Backend>(
        model:  ReconNet<B>,
        path:   &Path,
        device: &B::Device,
    ) -> Result<ReconNet<B>> {
        if !path.is_file() {
            bail!("Checkpoint '{}' does not exist", path.display());
        }

        let record = CompactRecorder::new()
            .load(path.to_path_buf(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Was it written for the same network widths?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration so the network can be rebuilt.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    /// Training configuration of this run, if it was recorded.
    pub fn load_config(&self) -> Result<Option<TrainConfig>> {
        self.read_json(CONFIG_FILE)
    }

    /// Persist the statistics the model was trained with.
    pub fn save_stats(&self, stats: &NormalizationStats) -> Result<()> {
        self.write_json(STATS_FILE, stats)
    }

    pub fn load_stats(&self) -> Result<Option<NormalizationStats>> {
        self.read_json(STATS_FILE)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.run_dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.run_dir.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let value = serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse '{}'", path.display()))?;
        Ok(Some(value))
    }
}

impl<B: Backend> Checkpointer<B> for CheckpointManager {
    fn run_dir(&self) -> &Path {
        CheckpointManager::run_dir(self)
    }

    fn save_best(&self, model: &ReconNet<B>) -> Result<PathBuf> {
        CheckpointManager::save_best(self, model)
    }

    fn save_last(&self, model: &ReconNet<B>) -> Result<PathBuf> {
        CheckpointManager::save_last(self, model)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::FieldStats;
    use crate::ml::model::ReconNetConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn weights(model: &ReconNet<TestBackend>) -> Vec<f32> {
        model.enc1.conv1.weight.val().into_data().to_vec().unwrap()
    }

    fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
    }

    #[test]
    fn test_timestamp_format() {
        let ts = run_timestamp();
        // YYYY-MM-DD_HH-MM-SS
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "_");
        assert_eq!(&ts[13..14], "-");
    }

    #[test]
    fn test_best_checkpoint_holds_last_saved_parameters() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = ReconNetConfig::new(1, 1, 1).with_base_channels(2);
        let ckpt   = CheckpointManager::create_run(tmp.path()).unwrap();

        let first:  ReconNet<TestBackend> = cfg.init(&device);
        let second: ReconNet<TestBackend> = cfg.init(&device);
        let path_a = ckpt.save_best(&first).unwrap();
        let path_b = ckpt.save_best(&second).unwrap();
        assert_eq!(path_a, path_b);

        let best_files = fs::read_dir(ckpt.run_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(BEST_MODEL_STEM))
            .count();
        assert_eq!(best_files, 1);

        let loaded = CheckpointManager::load_model(cfg.init::<TestBackend>(&device), &path_b, &device).unwrap();
        assert!(max_abs_diff(&weights(&loaded), &weights(&second)) < 1e-2);
        assert!(max_abs_diff(&weights(&loaded), &weights(&first)) > 1e-2);
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model: ReconNet<TestBackend> = ReconNetConfig::new(1, 1, 1).with_base_channels(2).init(&device);
        assert!(CheckpointManager::load_model(model, &tmp.path().join("nope.mpk"), &device).is_err());
    }

    #[test]
    fn test_stats_and_config_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::open(tmp.path());
        assert!(ckpt.load_stats().unwrap().is_none());
        assert!(ckpt.load_config().unwrap().is_none());

        let stats = NormalizationStats {
            measurement: FieldStats { mean: 1.5, std: 0.25 },
            mus:         FieldStats { mean: 10.0, std: 3.0 },
            mua:         FieldStats { mean: 0.01, std: 0.002 },
        };
        ckpt.save_stats(&stats).unwrap();
        assert_eq!(ckpt.load_stats().unwrap(), Some(stats));

        let cfg = TrainConfig { epochs: 7, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap().unwrap().epochs, 7);
    }
}
