// ============================================================
// Layer 2 — Backend Selection
// ============================================================
// Which Burn backend a run executes on:
//
//   wgpu    — GPU through WebGPU (default)
//   ndarray — CPU
//
// Training wraps either one in Autodiff; reconstruction uses the
// plain backend.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type GpuBackend      = burn::backend::Wgpu;
pub type CpuBackend      = burn::backend::NdArray;
pub type GpuTrainBackend = burn::backend::Autodiff<GpuBackend>;
pub type CpuTrainBackend = burn::backend::Autodiff<CpuBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Wgpu,
    Ndarray,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wgpu" | "gpu"    => Ok(BackendKind::Wgpu),
            "ndarray" | "cpu" => Ok(BackendKind::Ndarray),
            other => Err(format!("unknown backend '{other}' (expected wgpu or ndarray)")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Wgpu    => write!(f, "wgpu"),
            BackendKind::Ndarray => write!(f, "ndarray"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("WGPU".parse::<BackendKind>().unwrap(), BackendKind::Wgpu);
        assert_eq!("cpu".parse::<BackendKind>().unwrap(), BackendKind::Ndarray);
        assert!("cuda".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [BackendKind::Wgpu, BackendKind::Ndarray] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }
}
