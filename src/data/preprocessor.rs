// ============================================================
// Layer 4 — Sample Preprocessor
// ============================================================
// Brings every raw sample to the fixed shape the network uses:
//
//   measurement — bilinear resize to image_size × image_size
//   mus / mua   — zero-pad or truncate to target_len
//
// Resize semantics match `align_corners = false`: output pixel
// centres are mapped into the input grid with
//
//   src = (dst + 0.5) * (in / out) - 0.5
//
// negative coordinates are clamped to 0 and the upper
// neighbour is clamped to the last row/column.
//
// No statistics are applied here; see store.rs.

use ndarray::Array2;
use std::path::PathBuf;

use crate::domain::{sample::RawSample, shape::ShapeConfig};

/// A raw sample brought to fixed shape, not yet normalised.
#[derive(Debug, Clone)]
pub struct PreparedSample {
    /// Row-major image_size × image_size
    pub measurement: Vec<f64>,
    pub mus:         Vec<f64>,
    pub mua:         Vec<f64>,
    pub source_dir:  PathBuf,
}

pub struct Preprocessor {
    shape: ShapeConfig,
}

impl Preprocessor {
    pub fn new(shape: ShapeConfig) -> Self {
        Self { shape }
    }

    pub fn prepare(&self, raw: &RawSample) -> PreparedSample {
        let size    = self.shape.image_size;
        let resized = resize_bilinear(&raw.measurement, size, size);
        PreparedSample {
            measurement: resized.into_iter().collect(),
            mus:         pad_or_truncate(&raw.mus, self.shape.target_len),
            mua:         pad_or_truncate(&raw.mua, self.shape.target_len),
            source_dir:  raw.source_dir.clone(),
        }
    }
}

/// Right-pad `values` with zeros, or keep only the first `len`.
pub fn pad_or_truncate(values: &[f64], len: usize) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().take(len).copied().collect();
    out.resize(len, 0.0);
    out
}

/// Source coordinate and interpolation weight along one axis.
/// Returns (lower index, upper index, weight of upper).
fn source_index(dst: usize, in_len: usize, out_len: usize) -> (usize, usize, f64) {
    let scale = in_len as f64 / out_len as f64;
    let src   = ((dst as f64 + 0.5) * scale - 0.5).max(0.0);
    let lo    = (src.floor() as usize).min(in_len - 1);
    let hi    = if lo < in_len - 1 { lo + 1 } else { lo };
    (lo, hi, src - lo as f64)
}

/// Bilinear resize of a non-empty matrix.
pub fn resize_bilinear(input: &Array2<f64>, out_rows: usize, out_cols: usize) -> Array2<f64> {
    let (in_rows, in_cols) = input.dim();
    debug_assert!(in_rows > 0 && in_cols > 0, "cannot resize an empty matrix");

    let rows: Vec<_> = (0..out_rows).map(|r| source_index(r, in_rows, out_rows)).collect();
    let cols: Vec<_> = (0..out_cols).map(|c| source_index(c, in_cols, out_cols)).collect();

    Array2::from_shape_fn((out_rows, out_cols), |(r, c)| {
        let (r0, r1, wr) = rows[r];
        let (c0, c1, wc) = cols[c];
        let top    = input[[r0, c0]] * (1.0 - wc) + input[[r0, c1]] * wc;
        let bottom = input[[r1, c0]] * (1.0 - wc) + input[[r1, c1]] * wc;
        top * (1.0 - wr) + bottom * wr
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_short_vector_is_zero_padded() {
        let v   = vec![1.0; 100];
        let out = pad_or_truncate(&v, 16384);
        assert_eq!(out.len(), 16384);
        assert!(out[..100].iter().all(|&x| x == 1.0));
        assert!(out[100..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_long_vector_is_truncated() {
        let v: Vec<f64> = (0..20000).map(|i| i as f64).collect();
        let out = pad_or_truncate(&v, 16384);
        assert_eq!(out.len(), 16384);
        assert_eq!(out[16383], 16383.0);
    }

    #[test]
    fn test_upsample_matches_half_pixel_convention() {
        // 2 → 4 along each axis: centres map to -0.25, 0.25, 0.75, 1.25
        let input = array![[0.0, 1.0], [2.0, 3.0]];
        let out   = resize_bilinear(&input, 4, 4);
        let expected_row0 = [0.0, 0.25, 0.75, 1.0];
        for (c, &e) in expected_row0.iter().enumerate() {
            assert_relative_eq!(out[[0, c]], e, epsilon = 1e-12);
        }
        assert_relative_eq!(out[[3, 3]], 3.0, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 1]], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_downsample_by_two_averages_blocks() {
        // 4 → 2: centres land exactly between source pixels
        let input = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        let out   = resize_bilinear(&input, 2, 2);
        assert_relative_eq!(out[[0, 0]], (0.0 + 1.0 + 4.0 + 5.0) / 4.0, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 1]], (10.0 + 11.0 + 14.0 + 15.0) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_pixel_is_broadcast() {
        let out = resize_bilinear(&array![[7.0]], 8, 8);
        assert!(out.iter().all(|&v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn test_prepare_fixes_all_shapes() {
        let raw = RawSample::new(
            Array2::from_elem((37, 91), 1.5),
            vec![0.2; 10],
            vec![0.4; 20000],
            "case",
        );
        let prepared = Preprocessor::new(ShapeConfig::default()).prepare(&raw);
        assert_eq!(prepared.measurement.len(), 128 * 128);
        assert_eq!(prepared.mus.len(), 16384);
        assert_eq!(prepared.mua.len(), 16384);
        assert_eq!(prepared.source_dir, PathBuf::from("case"));
    }
}
