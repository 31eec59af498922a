// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`       — trains the network on simulation results
//   2. `reconstruct` — loads a checkpoint and writes predicted
//                      mus/mua profiles next to each input
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ReconstructArgs, TrainArgs};

use crate::application::{
    reconstruct_use_case::{ReconstructUseCase, StatsOrigin},
    train_use_case::TrainUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "dot-recon",
    version,
    about = "Train a CNN to reconstruct DOT optical profiles (mus, mua) from measurements."
)]
pub struct Cli {
    /// The subcommand to run (train or reconstruct)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)       => run_train(args),
            Commands::Reconstruct(args) => run_reconstruct(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let Some(report) = TrainUseCase::new(args.into()).execute()? else {
        println!("No training data selected or found. Nothing to do.");
        return Ok(());
    };

    match report.best_epoch {
        Some(epoch) => println!(
            "Training complete. Best val loss {:.6} at epoch {} ({} epochs).",
            report.best_val_loss, epoch, report.epochs
        ),
        None => println!("Training complete. Validation loss never improved; no best model written."),
    }
    println!("Run directory: {}", report.run_dir.display());
    Ok(())
}

fn run_reconstruct(args: ReconstructArgs) -> Result<()> {
    let Some(report) = ReconstructUseCase::new(args.into()).execute()? else {
        println!("No checkpoint or input data selected or found. Nothing to do.");
        return Ok(());
    };

    let origin = match report.stats_origin {
        StatsOrigin::Persisted  => "saved with the checkpoint",
        StatsOrigin::Recomputed => "recomputed from the input data",
    };
    for record in &report.records {
        println!("{}", record.source_dir.display());
    }
    println!("Reconstructed {} samples (normalisation stats {}).", report.records.len(), origin);
    Ok(())
}
