// ============================================================
// Layer 4 — Reconstruction Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ReconItems into
// tensors for the model forward pass.
//
//   Input:  Vec of N ReconItems
//   Output: ReconBatch
//             measurements [N, 1, S, S]
//             mus          [N, L]
//             mua          [N, L]
//
// All items already share one shape (see preprocessor.rs), so
// batching is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::ReconItem;

/// A batch of samples ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ReconBatch<B: Backend> {
    /// Single-channel images — shape: [batch_size, 1, S, S]
    pub measurements: Tensor<B, 4>,

    /// Normalised scattering targets — shape: [batch_size, L]
    pub mus: Tensor<B, 2>,

    /// Normalised absorption targets — shape: [batch_size, L]
    pub mua: Tensor<B, 2>,
}

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct ReconBatcher<B: Backend> {
    pub device:     B::Device,
    pub image_size: usize,
}

impl<B: Backend> ReconBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<ReconItem, ReconBatch<B>> for ReconBatcher<B> {
    fn batch(&self, items: Vec<ReconItem>) -> ReconBatch<B> {
        let batch_size = items.len();
        let size       = self.image_size;
        let target_len = items[0].mus.len();

        let images: Vec<f32> = items.iter().flat_map(|s| s.measurement.iter().copied()).collect();
        let mus:    Vec<f32> = items.iter().flat_map(|s| s.mus.iter().copied()).collect();
        let mua:    Vec<f32> = items.iter().flat_map(|s| s.mua.iter().copied()).collect();

        let measurements = Tensor::<B, 4>::from_floats(
            TensorData::new(images, [batch_size, 1, size, size]), &self.device,
        );
        let mus = Tensor::<B, 2>::from_floats(
            TensorData::new(mus, [batch_size, target_len]), &self.device,
        );
        let mua = Tensor::<B, 2>::from_floats(
            TensorData::new(mua, [batch_size, target_len]), &self.device,
        );

        ReconBatch { measurements, mus, mua }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn item(fill: f32) -> ReconItem {
        ReconItem {
            measurement: vec![fill; 16],
            mus:         vec![fill; 32],
            mua:         vec![-fill; 32],
            source_dir:  "s".into(),
        }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = ReconBatcher::<TestBackend>::new(Default::default(), 4);
        let batch   = batcher.batch(vec![item(1.0), item(2.0), item(3.0)]);
        assert_eq!(batch.measurements.dims(), [3, 1, 4, 4]);
        assert_eq!(batch.mus.dims(), [3, 32]);
        assert_eq!(batch.mua.dims(), [3, 32]);
    }

    #[test]
    fn test_rows_keep_item_order() {
        let batcher = ReconBatcher::<TestBackend>::new(Default::default(), 4);
        let batch   = batcher.batch(vec![item(1.0), item(2.0)]);
        let mua: Vec<f32> = batch.mua.into_data().to_vec().unwrap();
        assert_eq!(mua[0], -1.0);
        assert_eq!(mua[32], -2.0);
    }
}
