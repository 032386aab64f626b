//! Predictor configuration and validation.

use std::path::{ Path, PathBuf };
use serde::Deserialize;
use thiserror::Error;
use crate::history::MAX_HISTORY_BITS;
use crate::predictor::*;

mod defaults {
    /// Number of counters in the bank.
    pub const COUNTERS: u64 = 4096;

    /// Width of each counter in bits.
    pub const COUNTER_BITS: u8 = 2;

    /// Length of the global history register.
    pub const HISTORY_BITS: u32 = 12;

    /// History bits XOR'ed into the program counter bits.
    pub const SHARED_BITS: u32 = 12;
}

/// A rejected predictor configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("number of counters must be nonzero")]
    ZeroCounters,

    #[error("number of counters must be a power of 2 (got {0})")]
    NotPowerOfTwo(u64),

    #[error("counter width must be between 1 and {max} bits (got {bits})",
        max = MAX_COUNTER_BITS)]
    CounterWidth { bits: u8 },

    #[error("history length must be at most {max} bits (got {bits})",
        max = MAX_HISTORY_BITS)]
    HistoryWidth { bits: u32 },

    #[error("shared bits ({shared}) exceed the history length ({history})")]
    SharedBitsExceedHistory { shared: u32, history: u32 },

    #[error("{unshared} unshared history bits leave no room for program \
        counter bits in a {index_bits}-bit index")]
    IndexWidth { unshared: u32, index_bits: u32 },

    #[error("history length ({history}) exceeds the {index_bits}-bit index")]
    HistoryTooLong { history: u32, index_bits: u32 },
}

/// Failed to read a predictor configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("unable to read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
}

/// Parameters for a [`crate::GsharePredictor`].
///
/// A configuration with zero history bits describes a predictor indexed
/// only by the program counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    /// Number of counters in the bank (a power of two)
    pub counters: u64,

    /// Width of each counter in bits
    pub counter_bits: u8,

    /// Length of the global history register in bits
    pub history_bits: u32,

    /// Number of history bits XOR'ed with program counter bits
    pub shared_bits: u32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            counters: defaults::COUNTERS,
            counter_bits: defaults::COUNTER_BITS,
            history_bits: defaults::HISTORY_BITS,
            shared_bits: defaults::SHARED_BITS,
        }
    }
}

impl std::fmt::Display for PredictorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Number of counters = {}", self.counters)?;
        writeln!(f, "Counter size in bits = {}", self.counter_bits)?;
        writeln!(f, "History length = {}", self.history_bits)?;
        write!(f, "Shared history bits = {}", self.shared_bits)
    }
}

impl PredictorConfig {
    pub fn new(counters: u64, counter_bits: u8, history_bits: u32,
        shared_bits: u32) -> Self
    {
        Self { counters, counter_bits, history_bits, shared_bits }
    }

    /// A predictor indexed only by the low bits of the program counter.
    pub fn direct(counters: u64, counter_bits: u8) -> Self {
        Self::new(counters, counter_bits, 0, 0)
    }

    /// Parse a configuration from TOML. Missing keys take default values.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| {
            ConfigFileError::Io { path: path.to_owned(), source }
        })?;
        Self::from_toml(&s).map_err(|source| {
            ConfigFileError::Toml { path: path.to_owned(), source }
        })
    }

    /// Check this configuration and compute the constants used to index
    /// the counter bank.
    pub fn validate(&self) -> Result<DerivedConfig, ConfigError> {
        if self.counters == 0 {
            return Err(ConfigError::ZeroCounters);
        }
        if !self.counters.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo(self.counters));
        }
        if !(1..=MAX_COUNTER_BITS).contains(&self.counter_bits) {
            return Err(ConfigError::CounterWidth { bits: self.counter_bits });
        }
        if self.history_bits as usize > MAX_HISTORY_BITS {
            return Err(ConfigError::HistoryWidth { bits: self.history_bits });
        }
        if self.shared_bits > self.history_bits {
            return Err(ConfigError::SharedBitsExceedHistory {
                shared: self.shared_bits,
                history: self.history_bits,
            });
        }

        let index_bits = self.counters.trailing_zeros();
        let unshared = self.history_bits - self.shared_bits;
        let pc_bits = index_bits.checked_sub(unshared)
            .ok_or(ConfigError::IndexWidth { unshared, index_bits })?;

        // The shared history bits overlap the top of the program counter
        // bits, so the whole register must fit in the index.
        let history_shift = index_bits.checked_sub(self.history_bits)
            .ok_or(ConfigError::HistoryTooLong {
                history: self.history_bits,
                index_bits,
            })?;

        // Both widths are at most 63 bits here.
        let pc_mask = (1u64 << pc_bits) - 1;
        let history_mask = (1u64 << self.history_bits) - 1;

        let strategy = if self.history_bits == 0 {
            IndexStrategy::Direct { index_mask: self.counters - 1 }
        } else {
            IndexStrategy::Gshare { pc_mask, history_shift }
        };

        Ok(DerivedConfig {
            counter: SaturatingCounterConfig::new(self.counter_bits),
            index_bits,
            pc_bits,
            pc_mask,
            history_shift,
            history_mask,
            strategy,
        })
    }
}

/// Constants derived from a valid [PredictorConfig].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedConfig {
    /// Parameters for the saturating counters
    pub counter: SaturatingCounterConfig,

    /// Width of an index into the counter bank
    pub index_bits: u32,

    /// Number of program counter bits used in an index
    pub pc_bits: u32,
    pub pc_mask: u64,

    /// Distance the history register is shifted before being XOR'ed
    pub history_shift: u32,
    pub history_mask: u64,

    /// Strategy for indexing into the counter bank
    pub strategy: IndexStrategy,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_classic_gshare() {
        let d = PredictorConfig::default().validate().unwrap();
        assert_eq!(d.index_bits, 12);
        assert_eq!(d.pc_bits, 12);
        assert_eq!(d.history_shift, 0);
        assert_eq!(d.strategy, IndexStrategy::Gshare {
            pc_mask: 0xfff, history_shift: 0
        });
    }

    #[test]
    fn direct_config() {
        let d = PredictorConfig::direct(4, 2).validate().unwrap();
        assert_eq!(d.strategy, IndexStrategy::Direct { index_mask: 3 });
        assert_eq!(d.history_mask, 0);
        assert_eq!(d.counter.taken_threshold(), 2);
        assert_eq!(d.counter.max_value(), 3);
    }

    #[test]
    fn unshared_history_sits_above_pc_bits() {
        let d = PredictorConfig::new(1024, 2, 4, 0).validate().unwrap();
        assert_eq!(d.pc_bits, 6);
        assert_eq!(d.pc_mask, 0x3f);
        assert_eq!(d.history_shift, 6);
        assert_eq!(d.history_mask, 0xf);
    }

    #[test]
    fn rejects_invalid_configs() {
        let cases = [
            (PredictorConfig::new(0, 2, 0, 0), ConfigError::ZeroCounters),
            (PredictorConfig::new(6, 2, 0, 0), ConfigError::NotPowerOfTwo(6)),
            (PredictorConfig::new(8, 0, 0, 0), ConfigError::CounterWidth { bits: 0 }),
            (PredictorConfig::new(8, 9, 0, 0), ConfigError::CounterWidth { bits: 9 }),
            (PredictorConfig::new(8, 2, 64, 0), ConfigError::HistoryWidth { bits: 64 }),
            (PredictorConfig::new(8, 2, 2, 3),
                ConfigError::SharedBitsExceedHistory { shared: 3, history: 2 }),
            (PredictorConfig::new(8, 2, 4, 0),
                ConfigError::IndexWidth { unshared: 4, index_bits: 3 }),
            (PredictorConfig::new(8, 2, 4, 2),
                ConfigError::HistoryTooLong { history: 4, index_bits: 3 }),
        ];
        for (cfg, err) in cases {
            assert_eq!(cfg.validate(), Err(err), "{:?}", cfg);
        }
    }

    #[test]
    fn parse_toml_with_defaults() {
        let cfg = PredictorConfig::from_toml("counters = 256\nhistory_bits = 4\n")
            .unwrap();
        assert_eq!(cfg, PredictorConfig {
            counters: 256,
            counter_bits: defaults::COUNTER_BITS,
            history_bits: 4,
            shared_bits: defaults::SHARED_BITS,
        });
        assert!(PredictorConfig::from_toml("bogus = 1").is_err());
    }

    #[test]
    fn summary_lists_parameters() {
        let s = PredictorConfig::new(8, 1, 2, 2).to_string();
        assert_eq!(s, "Number of counters = 8\nCounter size in bits = 1\n\
            History length = 2\nShared history bits = 2");
    }
}
