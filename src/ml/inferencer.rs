// ============================================================
// Layer 5 — Reconstructor
// ============================================================
// Loads a checkpoint into a fresh ReconNet and turns normalised
// samples back into physical mus / mua profiles:
//
//   for each sample (batch size 1, original order):
//     forward pass           → normalised mus, mua
//     x = z * std + mean     → mus with mus stats, mua with mua stats
//     sink.write_profile     → reconstructed_mus / reconstructed_mua
//
// Each sample is written independently; a failed write stops the
// run but leaves earlier samples' files in place.

use anyhow::{Context, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use std::path::{Path, PathBuf};

use crate::data::{batcher::ReconBatcher, dataset::ReconItem, store::NormalizedSet};
use crate::domain::{
    stats::{FieldStats, NormalizationStats},
    traits::{Quantity, ReconstructionSink},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ReconNet, ReconNetConfig};

/// Normalised prediction for one sample.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub mus: Vec<f32>,
    pub mua: Vec<f32>,
}

/// What was written for one sample.
#[derive(Debug, Clone)]
pub struct ReconstructionRecord {
    pub source_dir: PathBuf,
    pub mus_path:   PathBuf,
    pub mua_path:   PathBuf,
}

pub struct Reconstructor<B: Backend> {
    model:   ReconNet<B>,
    batcher: ReconBatcher<B>,
}

impl<B: Backend> Reconstructor<B> {
    /// Wrap an already initialised model.
    pub fn new(model: ReconNet<B>, image_size: usize, device: B::Device) -> Self {
        Self { model, batcher: ReconBatcher::new(device, image_size) }
    }

    /// Build a fresh model from `net_cfg` and load the weights at `checkpoint`.
    pub fn from_checkpoint(
        checkpoint: &Path,
        net_cfg:    &ReconNetConfig,
        image_size: usize,
        device:     B::Device,
    ) -> Result<Self> {
        let model: ReconNet<B> = net_cfg.init(&device);
        let model = CheckpointManager::load_model(model, checkpoint, &device)?;
        tracing::info!("Model loaded from checkpoint '{}'", checkpoint.display());
        Ok(Self::new(model, image_size, device))
    }

    /// Forward one sample.
    pub fn predict(&self, item: &ReconItem) -> Result<Prediction> {
        let batch  = self.batcher.batch(vec![item.clone()]);
        let output = self.model.forward(batch.measurements);
        let to_vec = |t: Tensor<B, 2>| -> Result<Vec<f32>> {
            t.into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("Cannot read prediction: {e:?}"))
        };
        Ok(Prediction { mus: to_vec(output.mus)?, mua: to_vec(output.mua)? })
    }

    /// Predict, de-normalise and persist every sample of `set`.
    pub fn reconstruct_all<S: ReconstructionSink>(
        &self,
        set:   &NormalizedSet,
        stats: &NormalizationStats,
        sink:  &S,
    ) -> Result<Vec<ReconstructionRecord>> {
        let mut records = Vec::with_capacity(set.len());
        for (idx, item) in set.items.iter().enumerate() {
            let prediction = self
                .predict(item)
                .with_context(|| format!("Inference failed for sample {idx}"))?;

            let mus = denormalize(&prediction.mus, &stats.mus);
            let mua = denormalize(&prediction.mua, &stats.mua);

            let mus_path = sink.write_profile(&item.source_dir, Quantity::Mus, &mus)?;
            let mua_path = sink.write_profile(&item.source_dir, Quantity::Mua, &mua)?;
            tracing::info!("Reconstructed mus and mua saved to {}", item.source_dir.display());

            records.push(ReconstructionRecord {
                source_dir: item.source_dir.clone(),
                mus_path,
                mua_path,
            });
        }
        Ok(records)
    }
}

/// x = z * std + mean, elementwise.
pub fn denormalize(values: &[f32], stats: &FieldStats) -> Vec<f32> {
    values.iter().map(|&z| stats.denormalize(z as f64) as f32).collect()
}
