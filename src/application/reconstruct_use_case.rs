// ============================================================
// Layer 2 — ReconstructUseCase
// ============================================================
// Orchestrates inference over a directory of simulations:
//
//   Step 1: Locate the checkpoint's run directory and read the
//           network shape it was trained with        (Layer 6)
//   Step 2: Rebuild the network and load weights      (Layer 5)
//   Step 3: Discover + normalise samples, using the
//           run's persisted statistics when present   (Layer 4)
//   Step 4: Predict, de-normalise, write results      (Layer 5/6)
//
// No checkpoint selected, or no samples found, ends the use case
// with Ok(None).

use anyhow::Result;
use burn::prelude::Backend;
use std::path::{Path, PathBuf};

use crate::application::backend::{BackendKind, CpuBackend, GpuBackend};
use crate::application::train_use_case::TrainConfig;
use crate::data::store::SampleStore;
use crate::domain::stats::NormalizationStats;
use crate::infra::{checkpoint::CheckpointManager, result_writer::JsonResultWriter};
use crate::ml::inferencer::{ReconstructionRecord, Reconstructor};

#[derive(Debug, Clone, Default)]
pub struct ReconstructConfig {
    /// Weights file written by a training run; None = nothing selected
    pub checkpoint:  Option<String>,
    /// Root scanned for simulation results; None = nothing selected
    pub data_dir:    Option<String>,
    /// Ignore the run's persisted statistics and recompute from the scan
    pub fresh_stats: bool,
    pub backend:     BackendKind,
}

/// Where the de-normalisation statistics came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsOrigin {
    /// normalization_stats.json of the training run
    Persisted,
    /// computed from the reconstruction scan itself
    Recomputed,
}

#[derive(Debug, Clone)]
pub struct ReconstructReport {
    pub records:      Vec<ReconstructionRecord>,
    pub stats:        NormalizationStats,
    pub stats_origin: StatsOrigin,
}

pub struct ReconstructUseCase {
    config: ReconstructConfig,
}

impl ReconstructUseCase {
    pub fn new(config: ReconstructConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Option<ReconstructReport>> {
        match self.config.backend {
            BackendKind::Wgpu => self.execute_on::<GpuBackend>(Default::default()),
            BackendKind::Ndarray => self.execute_on::<CpuBackend>(Default::default()),
        }
    }

    pub fn execute_on<B: Backend>(&self, device: B::Device) -> Result<Option<ReconstructReport>> {
        let Some(checkpoint) = self.config.checkpoint.as_deref().map(PathBuf::from) else {
            tracing::warn!("No checkpoint selected.");
            return Ok(None);
        };

        // ── Step 1: Run metadata ──────────────────────────────────────────────
        let run = CheckpointManager::for_checkpoint(&checkpoint);
        let train_cfg = match run.load_config()? {
            Some(cfg) => cfg,
            None => {
                tracing::warn!(
                    "No training config next to '{}' — assuming the default network",
                    checkpoint.display()
                );
                TrainConfig::default()
            }
        };
        let shape   = train_cfg.shape;
        let net_cfg = train_cfg.net_config()?;

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let reconstructor =
            Reconstructor::<B>::from_checkpoint(&checkpoint, &net_cfg, shape.image_size, device)?;

        // ── Step 3: Samples ───────────────────────────────────────────────────
        let store = SampleStore::new(shape);
        let root  = self.config.data_dir.as_deref().map(Path::new);
        let persisted = if self.config.fresh_stats { None } else { run.load_stats()? };

        let (set, stats_origin) = match persisted {
            Some(stats) => {
                tracing::info!("Using normalisation stats saved with the checkpoint");
                (store.discover_with_stats(root, &stats)?, StatsOrigin::Persisted)
            }
            None => {
                if !self.config.fresh_stats {
                    tracing::warn!(
                        "No saved normalisation stats in '{}' — recomputing from the scanned data",
                        run.run_dir().display()
                    );
                }
                (store.discover_and_normalize(root)?, StatsOrigin::Recomputed)
            }
        };
        let Some(set) = set else {
            tracing::info!("No samples to reconstruct — nothing to do");
            return Ok(None);
        };

        // ── Step 4: Predict, de-normalise, persist ────────────────────────────
        let stats   = set.stats;
        let records = reconstructor.reconstruct_all(&set, &stats, &JsonResultWriter::new())?;
        tracing::info!("Reconstructed {} samples", records.len());

        Ok(Some(ReconstructReport { records, stats, stats_origin }))
    }
}
