// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application and ML layers program against these traits
// rather than concrete file formats:
//
//   SampleSource       — where simulation cases come from
//                        (SimulationLoader walks a directory of
//                         JSON result files)
//   ReconstructionSink — where de-normalised predictions go
//                        (JsonResultWriter writes them next to
//                         the source file)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::domain::sample::RawSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce raw simulation samples.
pub trait SampleSource {
    /// Load every valid sample. Invalid inputs are skipped by the
    /// implementation; an empty Vec means "nothing found".
    fn load_all(&self) -> Result<Vec<RawSample>>;
}

// ─── Quantity ─────────────────────────────────────────────────────────────────
/// The two physical profiles the network predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Scattering coefficient
    Mus,
    /// Absorption coefficient
    Mua,
}

impl Quantity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Mus => "mus",
            Quantity::Mua => "mua",
        }
    }

    /// Field / file stem used for reconstruction outputs
    pub fn output_name(&self) -> String {
        format!("reconstructed_{}", self.as_str())
    }
}

// ─── ReconstructionSink ───────────────────────────────────────────────────────
/// Any component that can persist one reconstructed profile.
pub trait ReconstructionSink {
    /// Persist `values` for `quantity` next to the sample found in
    /// `source_dir`. Returns the path that was written.
    fn write_profile(
        &self,
        source_dir: &Path,
        quantity:   Quantity,
        values:     &[f32],
    ) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        assert_eq!(Quantity::Mus.output_name(), "reconstructed_mus");
        assert_eq!(Quantity::Mua.output_name(), "reconstructed_mua");
    }
}
