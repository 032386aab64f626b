//! Replay branch traces through a saturating-counter branch predictor
//! (direct-mapped or gshare) and measure how often it mispredicts.

pub mod branch;
pub mod history;
pub mod predictor;
pub mod stats;
pub mod trace;
pub mod sim;
pub mod cli;

pub use branch::*;
pub use history::*;
pub use predictor::*;
pub use trace::*;
