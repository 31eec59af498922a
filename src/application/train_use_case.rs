// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate parameters          (before any I/O)
//   Step 2: Discover + normalise samples (Layer 4 - data)
//   Step 3: Train / validation split     (Layer 4 - data)
//   Step 4: Build model, optional resume  (Layer 5 - ml)
//   Step 5: Create run directory, save
//           config + stats                (Layer 6 - infra)
//   Step 6: Run training loop             (Layer 5 - ml)
//
// A cancelled/missing data directory, or one with no results,
// ends the use case with Ok(None) before anything is created.
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::backend::{BackendKind, CpuTrainBackend, GpuTrainBackend};
use crate::data::{dataset::ReconDataset, splitter::split_train_val, store::SampleStore};
use crate::domain::shape::ShapeConfig;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::{ReconNet, ReconNetConfig},
    trainer::{run_training, TrainReport},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All parameters of a training run. Saved next to the checkpoint
// so reconstruction can rebuild the same network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Root scanned for simulation results; None = nothing selected
    pub data_dir:       Option<String>,
    /// Parent of the timestamped run directories
    pub models_dir:     String,
    /// Checkpoint to start from instead of random initialisation
    pub resume_from:    Option<String>,
    pub epochs:         usize,
    pub lr:             f64,
    pub batch_size:     usize,
    pub train_fraction: f64,
    pub base_channels:  usize,
    pub shape:          ShapeConfig,
    /// Also write last_model after every epoch
    pub save_last:      bool,
    /// Split / shuffle seed; drawn at random when None
    pub seed:           Option<u64>,
    pub backend:        BackendKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       None,
            models_dir:     "models".to_string(),
            resume_from:    None,
            epochs:         10,
            lr:             1e-3,
            batch_size:     16,
            train_fraction: crate::data::splitter::TRAIN_FRACTION,
            base_channels:  64,
            shape:          ShapeConfig::default(),
            save_last:      false,
            seed:           None,
            backend:        BackendKind::default(),
        }
    }
}

impl TrainConfig {
    /// Reject parameters that would make training meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            bail!("number of epochs must be a positive integer (got {})", self.epochs);
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            bail!("learning rate must be a positive number (got {})", self.lr);
        }
        if self.batch_size == 0 {
            bail!("batch size must be positive");
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            bail!("train fraction must lie strictly between 0 and 1 (got {})", self.train_fraction);
        }
        if self.base_channels == 0 {
            bail!("base channel count must be positive");
        }
        self.shape.validate()
    }

    pub fn net_config(&self) -> Result<ReconNetConfig> {
        Ok(ReconNetConfig::for_shape(&self.shape)?.with_base_channels(self.base_channels))
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline on the configured backend.
    /// Ok(None) means there was nothing to train on.
    pub fn execute(&self) -> Result<Option<TrainReport>> {
        match self.config.backend {
            BackendKind::Wgpu => self.execute_on::<GpuTrainBackend>(Default::default()),
            BackendKind::Ndarray => self.execute_on::<CpuTrainBackend>(Default::default()),
        }
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<Option<TrainReport>> {
        // ── Step 1: Validate parameters ───────────────────────────────────────
        self.config.validate()?;
        let net_cfg = self.config.net_config()?;

        // ── Step 2: Discover and normalise samples ────────────────────────────
        let store = SampleStore::new(self.config.shape);
        let root  = self.config.data_dir.as_deref().map(Path::new);
        let Some(set) = store.discover_and_normalize(root)? else {
            tracing::info!("No samples to train on — nothing to do");
            return Ok(None);
        };
        if set.len() < 2 {
            bail!(
                "need at least 2 samples to form training and validation sets (found {})",
                set.len()
            );
        }
        tracing::info!("Loaded {} normalised samples", set.len());

        // ── Step 3: Train / validation split ──────────────────────────────────
        let mut cfg = self.config.clone();
        let seed    = *cfg.seed.get_or_insert_with(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let stats   = set.stats;
        let (train_items, val_items) = split_train_val(set.items, cfg.train_fraction, &mut rng);
        tracing::info!(
            "Split: {} train, {} validation (seed {})",
            train_items.len(), val_items.len(), seed
        );

        // ── Step 4: Build model (optionally from a checkpoint) ────────────────
        let mut model: ReconNet<B> = net_cfg.init(&device);
        if let Some(path) = &cfg.resume_from {
            tracing::info!("Loading initial parameters from '{}'", path);
            model = CheckpointManager::load_model(model, Path::new(path), &device)?;
        }

        // ── Step 5: Run directory + metadata for reconstruction ───────────────
        let ckpt_manager = CheckpointManager::create_run(&cfg.models_dir)?;
        ckpt_manager.save_config(&cfg)?;
        ckpt_manager.save_stats(&stats)?;
        let metrics = MetricsLogger::new(ckpt_manager.run_dir())?;

        // ── Step 6: Training loop (Layer 5) ───────────────────────────────────
        let report = run_training(
            &cfg,
            model,
            ReconDataset::new(train_items),
            ReconDataset::new(val_items),
            &ckpt_manager,
            &metrics,
            device,
        )?;
        Ok(Some(report))
    }
}
