// ============================================================
// Layer 6 — Reconstruction Result Writer
// ============================================================
// Writes each de-normalised profile next to the simulation file
// it came from:
//
//   <source dir>/reconstructed_mus.json  {"reconstructed_mus": [...]}
//   <source dir>/reconstructed_mua.json  {"reconstructed_mua": [...]}
//
// Existing outputs are overwritten.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::{Quantity, ReconstructionSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResultWriter;

impl JsonResultWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn output_path(source_dir: &Path, quantity: Quantity) -> PathBuf {
        source_dir.join(format!("{}.json", quantity.output_name()))
    }
}

impl ReconstructionSink for JsonResultWriter {
    fn write_profile(
        &self,
        source_dir: &Path,
        quantity:   Quantity,
        values:     &[f32],
    ) -> Result<PathBuf> {
        let path = Self::output_path(source_dir, quantity);

        let mut body = BTreeMap::new();
        body.insert(quantity.output_name(), values);
        let json = serde_json::to_string(&body)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write reconstruction to '{}'", path.display()))?;
        tracing::debug!("Wrote {} values to '{}'", values.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_named_field() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = JsonResultWriter::new()
            .write_profile(tmp.path(), Quantity::Mua, &[0.5, 1.5])
            .unwrap();
        assert_eq!(path, tmp.path().join("reconstructed_mua.json"));

        let parsed: BTreeMap<String, Vec<f32>> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["reconstructed_mua"], vec![0.5, 1.5]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let res = JsonResultWriter::new().write_profile(&tmp.path().join("gone"), Quantity::Mus, &[1.0]);
        assert!(res.is_err());
    }
}
