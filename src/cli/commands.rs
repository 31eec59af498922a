// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `reconstruct`
// and all their configurable flags.
//
// Leaving out --data-dir (or --checkpoint) is the "nothing
// selected" case: the command exits cleanly without work.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    backend::BackendKind,
    reconstruct_use_case::ReconstructConfig,
    train_use_case::TrainConfig,
};
use crate::domain::shape::ShapeConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the reconstruction network on simulated measurements
    Train(TrainArgs),

    /// Reconstruct mus/mua profiles with a trained checkpoint
    Reconstruct(ReconstructArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Root directory searched for simulation_config_and_results.json files
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Parent directory of the timestamped run directories
    #[arg(long, default_value = "models")]
    pub models_dir: String,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Channel width of the first encoder block
    #[arg(long, default_value_t = 64)]
    pub base_channels: usize,

    /// Side length of the square network input
    #[arg(long, default_value_t = 128)]
    pub image_size: usize,

    /// Length every mus/mua profile is padded or truncated to
    #[arg(long, default_value_t = 16384)]
    pub target_len: usize,

    /// Start from this checkpoint instead of random weights
    #[arg(long)]
    pub resume: Option<String>,

    /// Also keep the weights of the latest epoch (last_model)
    #[arg(long)]
    pub save_last: bool,

    /// Seed for the split and shuffling; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// wgpu (GPU) or ndarray (CPU)
    #[arg(long, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:      a.data_dir,
            models_dir:    a.models_dir,
            resume_from:   a.resume,
            epochs:        a.epochs,
            lr:            a.lr,
            batch_size:    a.batch_size,
            base_channels: a.base_channels,
            shape:         ShapeConfig::new(a.image_size, a.target_len),
            save_last:     a.save_last,
            seed:          a.seed,
            backend:       a.backend,
            ..TrainConfig::default()
        }
    }
}

/// All arguments for the `reconstruct` command
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Weights file written by `train` (e.g. models/<run>/best_model.mpk)
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Root directory searched for simulation_config_and_results.json files
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Recompute normalisation stats from the scanned data instead of
    /// using the ones saved with the checkpoint
    #[arg(long)]
    pub fresh_stats: bool,

    /// wgpu (GPU) or ndarray (CPU)
    #[arg(long, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,
}

impl From<ReconstructArgs> for ReconstructConfig {
    fn from(a: ReconstructArgs) -> Self {
        ReconstructConfig {
            checkpoint:  a.checkpoint,
            data_dir:    a.data_dir,
            fresh_stats: a.fresh_stats,
            backend:     a.backend,
        }
    }
}
