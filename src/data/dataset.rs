use burn::data::dataset::Dataset;
use std::path::PathBuf;

/// One normalised, fixed-shape sample.
/// measurement: image_size² values, row-major; mus/mua: target_len values.
#[derive(Debug, Clone)]
pub struct ReconItem {
    pub measurement: Vec<f32>,
    pub mus:         Vec<f32>,
    pub mua:         Vec<f32>,
    pub source_dir:  PathBuf,
}

pub struct ReconDataset {
    items: Vec<ReconItem>,
}

impl ReconDataset {
    pub fn new(items: Vec<ReconItem>) -> Self { Self { items } }

    pub fn sample_count(&self) -> usize { self.items.len() }
}

impl Dataset<ReconItem> for ReconDataset {
    fn get(&self, index: usize) -> Option<ReconItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
