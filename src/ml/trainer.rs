// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fixed-epoch train + validation loop using Burn's DataLoader
// and Adam.
//
// Per epoch:
//   1. training phase   — shuffled batches, loss = MSE(mus) + MSE(mua),
//                         backward, Adam step
//   2. validation phase — model.valid() on the inner backend
//                         (no autodiff), fixed order, same loss
//   3. if the mean validation loss is strictly below the best so
//      far, overwrite the run's best_model checkpoint
//
// No early stopping and no learning-rate schedule: the loop
// always runs cfg.epochs epochs.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::{Path, PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ReconBatcher, dataset::ReconDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::ReconNet;

pub const DEFAULT_SEED: u64 = 42;

// ─── Checkpointer ─────────────────────────────────────────────────────────────
/// Where the training loop persists parameters.
/// Implemented by `infra::checkpoint::CheckpointManager`.
pub trait Checkpointer<B: Backend> {
    fn run_dir(&self) -> &Path;

    /// Overwrite the best checkpoint with `model`.
    fn save_best(&self, model: &ReconNet<B>) -> Result<PathBuf>;

    /// Overwrite the latest-epoch checkpoint with `model`.
    fn save_last(&self, model: &ReconNet<B>) -> Result<PathBuf>;
}

// ─── BestTracker ──────────────────────────────────────────────────────────────
/// Remembers the lowest validation loss seen in a run.
#[derive(Debug, Clone)]
pub struct BestTracker {
    best_loss:  f64,
    best_epoch: Option<usize>,
}

impl Default for BestTracker {
    fn default() -> Self {
        Self { best_loss: f64::INFINITY, best_epoch: None }
    }
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an epoch's validation loss. Returns true when it is a
    /// strict improvement, i.e. the checkpoint must be written.
    pub fn observe(&mut self, epoch: usize, val_loss: f64) -> bool {
        if val_loss < self.best_loss {
            self.best_loss  = val_loss;
            self.best_epoch = Some(epoch);
            true
        } else {
            false
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub run_dir:       PathBuf,
    pub epochs:        usize,
    pub best_epoch:    Option<usize>,
    pub best_val_loss: f64,
    pub history:       Vec<EpochMetrics>,
}

fn mean_or_nan(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

pub fn run_training<B: AutodiffBackend, C: Checkpointer<B>>(
    cfg:           &TrainConfig,
    mut model:     ReconNet<B>,
    train_dataset: ReconDataset,
    val_dataset:   ReconDataset,
    ckpt_manager:  &C,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainReport> {
    let image_size = cfg.shape.image_size;
    let seed       = cfg.seed.unwrap_or(DEFAULT_SEED);

    tracing::info!(
        "Training on {} samples, validating on {}",
        train_dataset.sample_count(),
        val_dataset.sample_count(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().init();

    // ── Training data loader (AutodiffBackend, reshuffled every epoch) ────────
    let train_batcher = ReconBatcher::<B>::new(device.clone(), image_size);
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, fixed order) ────────────────────
    let val_batcher = ReconBatcher::<B::InnerBackend>::new(device.clone(), image_size);
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut best    = BestTracker::new();
    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.measurements, batch.mus, batch.mua);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }
        let avg_train_loss = mean_or_nan(train_loss_sum, train_batches);
        tracing::info!("Epoch {}/{}, Train Loss: {:.6}", epoch, cfg.epochs, avg_train_loss);

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let (loss, _) = model_valid.forward_loss(batch.measurements, batch.mus, batch.mua);
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }
        let avg_val_loss = mean_or_nan(val_loss_sum, val_batches);
        tracing::info!("Epoch {}/{}, Val Loss: {:.6}", epoch, cfg.epochs, avg_val_loss);

        // ── Checkpointing ─────────────────────────────────────────────────────
        let improved = best.observe(epoch, avg_val_loss);
        if improved {
            let path = ckpt_manager.save_best(&model)?;
            tracing::info!(
                "Best model saved at epoch {} with val loss {:.6} → {}",
                epoch, avg_val_loss, path.display()
            );
        }
        if cfg.save_last {
            ckpt_manager.save_last(&model)?;
        }

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, best.best_loss(), improved);
        metrics.log(&row)?;
        println!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6}{}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss,
            if improved { " | best" } else { "" },
        );
        history.push(row);
    }

    tracing::info!("Training complete!");
    Ok(TrainReport {
        run_dir:       ckpt_manager.run_dir().to_path_buf(),
        epochs:        cfg.epochs,
        best_epoch:    best.best_epoch(),
        best_val_loss: best.best_loss(),
        history,
    })
}
