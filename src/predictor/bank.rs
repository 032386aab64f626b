//! A bank of saturating counters (a pattern history table).

use thiserror::Error;
use crate::predictor::*;

/// Failed to allocate storage for a [CounterBank].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unable to allocate memory for {counters} counters")]
pub struct AllocationError {
    pub counters: u64,
}

/// A table of [SaturatingCounter] indexed by program counter and history.
///
/// The number of entries is fixed when the bank is created. Every counter
/// starts at zero (strongly not-taken).
#[derive(Clone, Debug)]
pub struct CounterBank {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,

    /// Index function
    strat: IndexStrategy,
}
impl CounterBank {
    pub fn new(size: u64, cfg: SaturatingCounterConfig, strat: IndexStrategy)
        -> Result<Self, AllocationError>
    {
        assert!(size.is_power_of_two());
        let err = AllocationError { counters: size };
        let len = usize::try_from(size).map_err(|_| err)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| err)?;
        data.resize(len, cfg.build());
        Ok(Self { cfg, data, strat })
    }

    pub fn counter_config(&self) -> SaturatingCounterConfig { self.cfg }
    pub fn strategy(&self) -> IndexStrategy { self.strat }

    /// Return all of the counters in the bank.
    pub fn counters(&self) -> &[SaturatingCounter] { &self.data }

    /// Return every counter to zero.
    pub fn reset(&mut self) {
        for ctr in self.data.iter_mut() {
            ctr.reset();
        }
    }
}

impl PredictorTable for CounterBank {
    /// Program counter and global history
    type Input = (u64, u64);
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, (pc, history): (u64, u64)) -> usize {
        self.strat.index(pc, history)
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        &mut self.data[idx]
    }
}
