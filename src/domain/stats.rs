// ============================================================
// Layer 3 — Normalisation Statistics
// ============================================================
// Six scalars computed once over an entire loaded set:
//
//   measurement (mean, std)
//   mus         (mean, std)
//   mua         (mean, std)
//
// Each pair is taken over ALL elements of ALL samples, not per
// sample, using the population standard deviation.
//
//   normalise:    z = (x - mean) / std
//   de-normalise: x = z * std + mean
//
// A field that is constant across the whole set has std = 0;
// that is rejected here instead of producing NaN/Inf later.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Mean and standard deviation of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub mean: f64,
    pub std:  f64,
}

impl FieldStats {
    /// Compute stats over every value yielded by `values`.
    /// `field` names the quantity in error messages.
    pub fn compute<'a, I>(field: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [f64]> + Clone,
    {
        let mut count = 0usize;
        let mut sum   = 0.0f64;
        for chunk in values.clone() {
            count += chunk.len();
            sum   += chunk.iter().sum::<f64>();
        }
        if count == 0 {
            bail!("cannot compute statistics for '{field}': no values");
        }
        let mean = sum / count as f64;

        // two-pass variance
        let sq_sum: f64 = values
            .into_iter()
            .flat_map(|chunk| chunk.iter())
            .map(|v| (v - mean).powi(2))
            .sum();
        let std = (sq_sum / count as f64).sqrt();

        let stats = Self { mean, std };
        stats.check_non_degenerate(field)?;
        Ok(stats)
    }

    fn check_non_degenerate(&self, field: &str) -> Result<()> {
        if !self.mean.is_finite() || !self.std.is_finite() {
            bail!("degenerate dataset: '{field}' statistics are not finite (mean={}, std={})", self.mean, self.std);
        }
        if self.std <= 0.0 {
            bail!("degenerate dataset: '{field}' is constant across all samples (std = 0)");
        }
        Ok(())
    }

    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }

    pub fn denormalize(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}

/// Dataset-wide statistics shared by training and reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub measurement: FieldStats,
    pub mus:         FieldStats,
    pub mua:         FieldStats,
}

impl NormalizationStats {
    /// Validate stats that came from outside `compute`, e.g. a
    /// persisted JSON file.
    pub fn validate(&self) -> Result<()> {
        self.measurement.check_non_degenerate("measurement")?;
        self.mus.check_non_degenerate("mus")?;
        self.mua.check_non_degenerate("mua")
    }
}
