//! Branch predictor components.

pub mod table;
pub mod counter;
pub mod bank;
pub mod config;
pub mod gshare;

pub use table::*;
pub use counter::*;
pub use bank::*;
pub use config::*;
pub use gshare::*;

use thiserror::Error;
use crate::Outcome;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// Failed to create a predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("invalid predictor configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
