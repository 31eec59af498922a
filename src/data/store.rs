// ============================================================
// Layer 4 — Sample Store
// ============================================================
// Turns a root directory of simulation results into a set of
// normalised, fixed-shape items:
//
//   root dir
//       │
//       ▼
//   SimulationLoader  → RawSample per valid result file
//       │
//       ▼
//   Preprocessor      → resize / pad to ShapeConfig
//       │
//       ▼
//   NormalizationStats (computed here, or supplied by caller)
//       │
//       ▼
//   NormalizedSet     → Vec<ReconItem> + stats
//
// No root (cancelled selection) or zero valid files yields
// Ok(None): callers treat that as "nothing to do".

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::ReconItem,
    loader::SimulationLoader,
    preprocessor::{PreparedSample, Preprocessor},
};
use crate::domain::{
    shape::ShapeConfig,
    stats::{FieldStats, NormalizationStats},
    traits::SampleSource,
};

/// Normalised items, their provenance and the statistics used.
#[derive(Debug, Clone)]
pub struct NormalizedSet {
    pub items: Vec<ReconItem>,
    pub stats: NormalizationStats,
    pub shape: ShapeConfig,
}

impl NormalizedSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Source directories, index-aligned with `items`
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|i| i.source_dir.clone()).collect()
    }
}

pub struct SampleStore {
    shape: ShapeConfig,
}

impl SampleStore {
    pub fn new(shape: ShapeConfig) -> Self {
        Self { shape }
    }

    /// Scan `root`, compute dataset-wide statistics and normalise.
    pub fn discover_and_normalize(&self, root: Option<&Path>) -> Result<Option<NormalizedSet>> {
        let Some(prepared) = self.scan(root)? else {
            return Ok(None);
        };
        let stats = compute_stats(&prepared)?;
        tracing::info!(
            "Normalisation stats: Y=({:.4e}, {:.4e}) mus=({:.4e}, {:.4e}) mua=({:.4e}, {:.4e})",
            stats.measurement.mean, stats.measurement.std,
            stats.mus.mean, stats.mus.std,
            stats.mua.mean, stats.mua.std,
        );
        Ok(Some(self.normalize(prepared, stats)))
    }

    /// Scan `root` and normalise with previously computed statistics.
    pub fn discover_with_stats(
        &self,
        root:  Option<&Path>,
        stats: &NormalizationStats,
    ) -> Result<Option<NormalizedSet>> {
        stats.validate()?;
        Ok(self.scan(root)?.map(|prepared| self.normalize(prepared, *stats)))
    }

    /// Load and reshape every sample from any source.
    pub fn prepare_from<S: SampleSource>(&self, source: &S) -> Result<Vec<PreparedSample>> {
        let preprocessor = Preprocessor::new(self.shape);
        Ok(source
            .load_all()?
            .iter()
            .map(|raw| preprocessor.prepare(raw))
            .collect())
    }

    fn scan(&self, root: Option<&Path>) -> Result<Option<Vec<PreparedSample>>> {
        self.shape.validate()?;
        let Some(root) = root else {
            tracing::warn!("No folder selected.");
            return Ok(None);
        };

        let prepared = self.prepare_from(&SimulationLoader::new(root))?;
        if prepared.is_empty() {
            tracing::warn!("No simulation results found under '{}'", root.display());
            return Ok(None);
        }
        Ok(Some(prepared))
    }

    pub fn normalize(&self, prepared: Vec<PreparedSample>, stats: NormalizationStats) -> NormalizedSet {
        let apply = |values: &[f64], fs: &FieldStats| -> Vec<f32> {
            values.iter().map(|&v| fs.normalize(v) as f32).collect()
        };

        let items = prepared
            .into_iter()
            .map(|p| ReconItem {
                measurement: apply(&p.measurement, &stats.measurement),
                mus:         apply(&p.mus, &stats.mus),
                mua:         apply(&p.mua, &stats.mua),
                source_dir:  p.source_dir,
            })
            .collect();

        NormalizedSet { items, stats, shape: self.shape }
    }
}

/// Mean / population std per field over all samples.
pub fn compute_stats(prepared: &[PreparedSample]) -> Result<NormalizationStats> {
    Ok(NormalizationStats {
        measurement: FieldStats::compute("measurement", prepared.iter().map(|p| p.measurement.as_slice()))?,
        mus:         FieldStats::compute("mus", prepared.iter().map(|p| p.mus.as_slice()))?,
        mua:         FieldStats::compute("mua", prepared.iter().map(|p| p.mua.as_slice()))?,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::RESULT_FILE_NAME;
    use crate::domain::sample::RawSample;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use std::fs;

    struct FixedSource(Vec<RawSample>);

    impl SampleSource for FixedSource {
        fn load_all(&self) -> Result<Vec<RawSample>> {
            Ok(self.0.clone())
        }
    }

    fn write_case(dir: &Path, rows: usize, cols: usize, n: usize, offset: f64) {
        fs::create_dir_all(dir).unwrap();
        let y: Vec<Vec<f64>> = (0..rows)
            .map(|r| (0..cols).map(|c| offset + (r * cols + c) as f64).collect())
            .collect();
        let mus: Vec<f64> = (0..n).map(|i| offset + i as f64 * 0.1).collect();
        let mua: Vec<f64> = (0..n).map(|i| offset * 2.0 + i as f64 * 0.01).collect();
        let body = serde_json::json!({ "Y": y, "mus": mus, "mua": mua });
        fs::write(dir.join(RESULT_FILE_NAME), body.to_string()).unwrap();
    }

    #[test]
    fn test_every_valid_file_becomes_one_fixed_shape_item() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(&tmp.path().join("run1"), 10, 12, 500, 0.0);
        write_case(&tmp.path().join("run2"), 64, 3, 20000, 1.0);
        write_case(&tmp.path().join("run3/deep"), 200, 200, 16384, 2.0);
        fs::create_dir_all(tmp.path().join("bad")).unwrap();
        fs::write(tmp.path().join("bad").join(RESULT_FILE_NAME), r#"{"Y": [[1]]}"#).unwrap();

        let set = SampleStore::new(ShapeConfig::default())
            .discover_and_normalize(Some(tmp.path()))
            .unwrap()
            .expect("samples");

        assert_eq!(set.len(), 3);
        for item in &set.items {
            assert_eq!(item.measurement.len(), 128 * 128);
            assert_eq!(item.mus.len(), 16384);
            assert_eq!(item.mua.len(), 16384);
        }
        assert_eq!(set.paths()[0], tmp.path().join("run1"));
        assert_eq!(set.paths()[2], tmp.path().join("run3/deep"));
    }

    #[test]
    fn test_normalised_fields_have_zero_mean_unit_std() {
        let shape = ShapeConfig::new(8, 64);
        let source = FixedSource(vec![
            RawSample::new(Array2::from_shape_fn((5, 5), |(r, c)| (r + c) as f64), vec![1.0, 2.0, 3.0], vec![0.5; 70], "a"),
            RawSample::new(Array2::from_shape_fn((3, 9), |(r, c)| (r * c) as f64), vec![4.0; 80], vec![0.1, 0.2], "b"),
        ]);
        let store    = SampleStore::new(shape);
        let prepared = store.prepare_from(&source).unwrap();
        let stats    = compute_stats(&prepared).unwrap();
        let set      = store.normalize(prepared, stats);

        let all_mus: Vec<f64> = set.items.iter().flat_map(|i| i.mus.iter().map(|&v| v as f64)).collect();
        let mean = all_mus.iter().sum::<f64>() / all_mus.len() as f64;
        let var  = all_mus.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / all_mus.len() as f64;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-5);
        assert_relative_eq!(var.sqrt(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_supplied_stats_are_used_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(&tmp.path().join("x"), 4, 4, 16, 0.0);
        let stats = NormalizationStats {
            measurement: FieldStats { mean: 1.0, std: 2.0 },
            mus:         FieldStats { mean: 0.0, std: 10.0 },
            mua:         FieldStats { mean: 0.0, std: 1.0 },
        };
        let set = SampleStore::new(ShapeConfig::new(4, 16))
            .discover_with_stats(Some(tmp.path()), &stats)
            .unwrap()
            .unwrap();
        assert_eq!(set.stats, stats);
        // Y[0][0] = 0 → (0 - 1) / 2
        assert_relative_eq!(set.items[0].measurement[0], -0.5);
        // mus[1] = 0.1 → 0.01
        assert_relative_eq!(set.items[0].mus[1], 0.01, epsilon = 1e-7);
    }

    #[test]
    fn test_cancelled_selection_is_empty_sentinel() {
        let store = SampleStore::new(ShapeConfig::default());
        assert!(store.discover_and_normalize(None).unwrap().is_none());
    }

    #[test]
    fn test_directory_without_results_is_empty_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("readme.txt"), "nothing here").unwrap();
        let store = SampleStore::new(ShapeConfig::default());
        assert!(store.discover_and_normalize(Some(tmp.path())).unwrap().is_none());
    }

    #[test]
    fn test_constant_field_fails_fast() {
        let source = FixedSource(vec![
            RawSample::new(Array2::from_elem((2, 2), 3.0), vec![1.0, 2.0], vec![1.0], "a"),
        ]);
        let store    = SampleStore::new(ShapeConfig::new(4, 16));
        let prepared = store.prepare_from(&source).unwrap();
        let err      = compute_stats(&prepared).unwrap_err();
        assert!(err.to_string().contains("measurement"));
    }
}
