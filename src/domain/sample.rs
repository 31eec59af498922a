// ============================================================
// Layer 3 — RawSample Domain Type
// ============================================================
// One simulation case exactly as it was extracted from its
// result file, before any resizing or normalisation:
//
//   measurement — 2D optical signal matrix (any shape, dense)
//   mus         — scattering coefficients (any length)
//   mua         — absorption coefficients (any length)
//   source_dir  — directory the result file lives in; the
//                 reconstruction outputs are written back here
//
// Reference: Rust Book §5 (Structs and Methods)

use ndarray::Array2;
use std::path::{Path, PathBuf};

/// A simulation case with its provenance.
#[derive(Debug, Clone)]
pub struct RawSample {
    pub measurement: Array2<f64>,
    pub mus:         Vec<f64>,
    pub mua:         Vec<f64>,
    pub source_dir:  PathBuf,
}

impl RawSample {
    pub fn new(
        measurement: Array2<f64>,
        mus:         Vec<f64>,
        mua:         Vec<f64>,
        source_dir:  impl Into<PathBuf>,
    ) -> Self {
        Self {
            measurement,
            mus,
            mua,
            source_dir: source_dir.into(),
        }
    }

    /// (rows, cols) of the measurement matrix
    pub fn measurement_dims(&self) -> (usize, usize) {
        self.measurement.dim()
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_measurement_dims() {
        let s = RawSample::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], vec![1.0], vec![2.0], "case_a");
        assert_eq!(s.measurement_dims(), (2, 3));
        assert_eq!(s.source_dir(), Path::new("case_a"));
    }
}
