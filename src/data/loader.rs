// ============================================================
// Layer 4 — Simulation Result Loader
// ============================================================
// Recursively walks a root directory for simulation result
// files and extracts the three fields every case needs:
//
//   "Y"   — measurement matrix, either dense rows
//             [[y00, y01, ...], [y10, ...], ...]
//           or sparse coordinates
//             { "shape": [r, c],
//               "row_indices": [...], "col_indices": [...],
//               "values": [...] }
//   "mus" — scattering coefficients  (flat or nested array)
//   "mua" — absorption coefficients  (flat or nested array)
//
// Any other fields in the file are ignored.
//
// A file that cannot be parsed, lacks one of the fields, or has
// an inconsistent matrix is skipped with a warning; one bad
// case never aborts the scan.
//
// Reference: walkdir crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::domain::sample::RawSample;
use crate::domain::traits::SampleSource;

/// Exact filename of a simulation result
pub const RESULT_FILE_NAME: &str = "simulation_config_and_results.json";

/// Largest densified measurement accepted (64 Mi cells, 512 MiB of f64)
pub const MAX_MEASUREMENT_CELLS: usize = 1 << 26;

// ─── On-disk representation ───────────────────────────────────────────────────

/// Sparse matrix in coordinate form. Duplicate coordinates are summed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub shape:       [usize; 2],
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values:      Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementField {
    Dense(Vec<Vec<f64>>),
    Sparse(SparseMatrix),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VectorField {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

/// The subset of a result file this crate reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationFile {
    #[serde(rename = "Y", default, skip_serializing_if = "Option::is_none")]
    pub y:   Option<MeasurementField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mus: Option<VectorField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mua: Option<VectorField>,
}

impl MeasurementField {
    /// Convert to a dense matrix, densifying sparse input.
    pub fn to_dense(&self) -> Result<Array2<f64>> {
        match self {
            MeasurementField::Dense(rows) => {
                let n_rows = rows.len();
                let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
                if n_rows == 0 || n_cols == 0 {
                    bail!("measurement matrix is empty");
                }
                if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
                    bail!(
                        "measurement row {} has {} columns, expected {}",
                        bad, rows[bad].len(), n_cols
                    );
                }
                let flat: Vec<f64> = rows.iter().flatten().copied().collect();
                Ok(Array2::from_shape_vec((n_rows, n_cols), flat)?)
            }
            MeasurementField::Sparse(sp) => {
                let [n_rows, n_cols] = sp.shape;
                if n_rows == 0 || n_cols == 0 {
                    bail!("sparse measurement has empty shape {:?}", sp.shape);
                }
                match n_rows.checked_mul(n_cols) {
                    Some(cells) if cells <= MAX_MEASUREMENT_CELLS => {}
                    _ => bail!(
                        "sparse measurement shape {:?} exceeds {} cells",
                        sp.shape, MAX_MEASUREMENT_CELLS
                    ),
                }
                if sp.row_indices.len() != sp.values.len()
                    || sp.col_indices.len() != sp.values.len()
                {
                    bail!(
                        "sparse measurement index/value lengths differ ({}, {}, {})",
                        sp.row_indices.len(), sp.col_indices.len(), sp.values.len()
                    );
                }
                let mut dense = Array2::<f64>::zeros((n_rows, n_cols));
                for ((&r, &c), &v) in sp.row_indices.iter().zip(&sp.col_indices).zip(&sp.values) {
                    if r >= n_rows || c >= n_cols {
                        bail!("sparse entry ({r}, {c}) outside shape {:?}", sp.shape);
                    }
                    dense[[r, c]] += v;
                }
                Ok(dense)
            }
        }
    }
}

impl VectorField {
    /// Flatten to a 1D vector in row-major order.
    pub fn to_flat(&self) -> Vec<f64> {
        match self {
            VectorField::Flat(v)    => v.clone(),
            VectorField::Nested(vs) => vs.iter().flatten().copied().collect(),
        }
    }
}

// ─── SimulationLoader ─────────────────────────────────────────────────────────

/// Finds and parses every result file below a root directory.
/// Implements the SampleSource trait from Layer 3.
pub struct SimulationLoader {
    root: PathBuf,
}

impl SimulationLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All result file paths below the root, in a stable order.
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!("Cannot read directory entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.file_name() == RESULT_FILE_NAME)
            .map(|e| e.into_path())
            .collect();
        found.sort();
        found
    }
}

impl SampleSource for SimulationLoader {
    fn load_all(&self) -> Result<Vec<RawSample>> {
        if !self.root.is_dir() {
            tracing::warn!(
                "Data directory '{}' does not exist — nothing to load",
                self.root.display()
            );
            return Ok(Vec::new());
        }

        let mut samples = Vec::new();
        for path in self.discover() {
            tracing::info!("Processing file: {}", path.display());
            match load_single_result(&path) {
                Ok(sample) => {
                    tracing::debug!(
                        "Loaded {:?} measurement, {} mus, {} mua from '{}'",
                        sample.measurement_dims(),
                        sample.mus.len(),
                        sample.mua.len(),
                        sample.source_dir.display(),
                    );
                    samples.push(sample);
                }
                Err(e) => {
                    tracing::warn!("Skipping file '{}': {:#}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} simulation samples", samples.len());
        Ok(samples)
    }
}

/// Parse one result file into a RawSample.
fn load_single_result(path: &Path) -> Result<RawSample> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let file: SimulationFile = serde_json::from_str(&text)
        .with_context(|| format!("Cannot parse '{}'", path.display()))?;

    let (y, mus, mua) = match (&file.y, &file.mus, &file.mua) {
        (Some(y), Some(mus), Some(mua)) => (y, mus, mua),
        _ => bail!("file does not contain the required arrays Y, mus and mua"),
    };

    let source_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(RawSample::new(y.to_dense()?, mus.to_flat(), mua.to_flat(), source_dir))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn write_case(dir: &Path, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(RESULT_FILE_NAME), body).unwrap();
    }

    #[test]
    fn test_sparse_measurement_is_densified() {
        let field = MeasurementField::Sparse(SparseMatrix {
            shape:       [2, 3],
            row_indices: vec![0, 1, 1],
            col_indices: vec![2, 0, 0],
            values:      vec![5.0, 1.0, 2.0],
        });
        let dense = field.to_dense().unwrap();
        assert_eq!(dense.dim(), (2, 3));
        assert_eq!(dense[[0, 2]], 5.0);
        // duplicates are summed
        assert_eq!(dense[[1, 0]], 3.0);
        assert_eq!(dense[[0, 0]], 0.0);
    }

    #[test]
    fn test_sparse_out_of_range_is_error() {
        let field = MeasurementField::Sparse(SparseMatrix {
            shape:       [2, 2],
            row_indices: vec![2],
            col_indices: vec![0],
            values:      vec![1.0],
        });
        assert!(field.to_dense().is_err());
    }

    #[test]
    fn test_oversized_sparse_shape_is_error() {
        let field = MeasurementField::Sparse(SparseMatrix {
            shape:       [usize::MAX, usize::MAX],
            row_indices: vec![0],
            col_indices: vec![0],
            values:      vec![1.0],
        });
        assert!(field.to_dense().is_err());

        let field = MeasurementField::Sparse(SparseMatrix {
            shape:       [MAX_MEASUREMENT_CELLS, 2],
            row_indices: vec![],
            col_indices: vec![],
            values:      vec![],
        });
        assert!(field.to_dense().is_err());
    }

    #[test]
    fn test_load_all_skips_oversized_sparse_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_case(&root.join("good"), r#"{"Y": [[1, 2], [3, 4]], "mus": [0.1], "mua": [0.2]}"#);
        write_case(
            &root.join("huge"),
            r#"{"Y": {"shape": [18446744073709551615, 18446744073709551615],
                      "row_indices": [0], "col_indices": [0], "values": [1.0]},
                "mus": [0.1], "mua": [0.2]}"#,
        );

        let samples = SimulationLoader::new(root).load_all().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].source_dir, root.join("good"));
    }

    #[test]
    fn test_ragged_dense_is_error() {
        let field = MeasurementField::Dense(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(field.to_dense().is_err());
    }

    #[test]
    fn test_nested_vector_is_flattened() {
        let v: VectorField = serde_json::from_str("[[1.0], [2.0], [3.0]]").unwrap();
        assert_eq!(v.to_flat(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parses_both_measurement_encodings() {
        let dense: SimulationFile =
            serde_json::from_str(r#"{"Y": [[1, 2], [3, 4]], "mus": [1], "mua": [2]}"#).unwrap();
        assert!(matches!(dense.y, Some(MeasurementField::Dense(_))));

        let sparse: SimulationFile = serde_json::from_str(
            r#"{"Y": {"shape": [4, 4], "row_indices": [0], "col_indices": [1], "values": [9.5]},
                "mus": [1], "mua": [2], "extra": "ignored"}"#,
        ).unwrap();
        assert!(matches!(sparse.y, Some(MeasurementField::Sparse(_))));
    }

    #[test]
    fn test_load_all_skips_incomplete_and_broken_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_case(&root.join("a"), r#"{"Y": [[1, 2], [3, 4]], "mus": [0.1, 0.2], "mua": [0.3]}"#);
        write_case(&root.join("b/nested"), r#"{"Y": [[5]], "mus": [1.0], "mua": [2.0]}"#);
        // missing mua
        write_case(&root.join("c"), r#"{"Y": [[1]], "mus": [1.0]}"#);
        // not JSON
        write_case(&root.join("d"), "garbage");
        // wrong file name is not discovered
        fs::write(root.join("a/other.json"), r#"{"Y": [[1]], "mus": [1], "mua": [1]}"#).unwrap();

        let samples = SimulationLoader::new(root).load_all().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].source_dir, root.join("a"));
        assert_eq!(samples[1].source_dir, root.join("b/nested"));
        assert_eq!(samples[0].measurement_dims(), (2, 2));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let samples = SimulationLoader::new(tmp.path().join("nope")).load_all().unwrap();
        assert!(samples.is_empty());
    }
}
