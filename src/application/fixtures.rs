// Shared on-disk fixtures for the use case tests.

use std::{fs, path::Path};

use crate::application::{backend::BackendKind, train_use_case::TrainConfig};
use crate::data::loader::RESULT_FILE_NAME;
use crate::domain::shape::ShapeConfig;

/// Write `n` small simulation cases under `root/case_XX/`.
pub fn write_cases(root: &Path, n: usize) {
    for i in 0..n {
        let dir = root.join(format!("case_{i:02}"));
        fs::create_dir_all(&dir).unwrap();
        let y: Vec<Vec<f64>> = (0..6)
            .map(|r| (0..6).map(|c| ((r * 6 + c + i) as f64).sin()).collect())
            .collect();
        let mus: Vec<f64> = (0..50).map(|k| 1.0 + 0.01 * (k + i) as f64).collect();
        let mua: Vec<f64> = (0..70).map(|k| 0.01 + 0.001 * ((k * i) % 7) as f64).collect();
        let body = serde_json::json!({ "Y": y, "mus": mus, "mua": mua });
        fs::write(dir.join(RESULT_FILE_NAME), body.to_string()).unwrap();
    }
}

/// CPU config small enough to train in a unit test.
pub fn tiny_config(data_dir: &Path, models_dir: &Path) -> TrainConfig {
    TrainConfig {
        data_dir:      Some(data_dir.to_string_lossy().into_owned()),
        models_dir:    models_dir.to_string_lossy().into_owned(),
        epochs:        2,
        lr:            1e-3,
        base_channels: 2,
        shape:         ShapeConfig::new(8, 64),
        seed:          Some(3),
        backend:       BackendKind::Ndarray,
        ..TrainConfig::default()
    }
}
