//! # Create Database
//!
//! Command line entry point: issues every credential of the input database
//! and writes the output database.

use std::path::PathBuf;

use clap::Parser;
use credman_testdata::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file. Flags override its settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input database.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output database.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Document signer certificate chain, PEM.
    #[arg(long)]
    certificate: Option<PathBuf>,

    /// Document signer private key, PEM.
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// Seed for reproducible output. Test use only.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(certificate) = self.certificate {
            config.certificate = certificate;
        }
        if let Some(private_key) = self.private_key {
            config.private_key = private_key;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    let config = Args::parse().into_config()?;
    credman_testdata::generate(&config)
}
