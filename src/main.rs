use anyhow::Result;
use clap::Parser;
use digit_vae::cli::{interpolate, sample, train, Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Train(args) => {
            train::run(args)?;
        }
        Commands::Interpolate(args) => {
            interpolate::run(args)?;
        }
        Commands::Sample(args) => {
            sample::run(args)?;
        }
    }

    Ok(())
}
