use anyhow::Result;
use clap::Parser;
use dot_recon::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dot_recon=info".parse()?))
        .init();

    let cli = Cli::parse();
    cli.run()
}
