//! Shared command-line plumbing for the binaries.

use std::path::PathBuf;
use clap::Args;
use tracing_subscriber::EnvFilter;
use crate::predictor::{ ConfigFileError, PredictorConfig };

/// Predictor parameters given on the command line.
///
/// Flags override values read from `--config`, which override the defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// TOML file with predictor parameters
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of counters (a power of two)
    #[arg(long)]
    pub counters: Option<u64>,

    /// Width of each counter in bits (1 to 8)
    #[arg(long)]
    pub counter_bits: Option<u8>,

    /// Length of the global history register (0 for a direct-mapped table)
    #[arg(long)]
    pub history_bits: Option<u32>,

    /// Number of history bits XOR'ed with program counter bits
    #[arg(long)]
    pub shared_bits: Option<u32>,
}
impl ConfigArgs {
    /// Build a configuration from the defaults, the config file, and flags.
    pub fn resolve(&self) -> Result<PredictorConfig, ConfigFileError> {
        let base = match &self.config {
            Some(path) => PredictorConfig::from_file(path)?,
            None => PredictorConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Override fields of 'base' with any flags that were given.
    pub fn apply(&self, base: PredictorConfig) -> PredictorConfig {
        PredictorConfig {
            counters: self.counters.unwrap_or(base.counters),
            counter_bits: self.counter_bits.unwrap_or(base.counter_bits),
            history_bits: self.history_bits.unwrap_or(base.history_bits),
            shared_bits: self.shared_bits.unwrap_or(base.shared_bits),
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings and errors by default).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
