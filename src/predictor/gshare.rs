//! The predictor engine: a bank of saturating counters indexed by the
//! program counter, optionally hashed with global branch history.

use tracing::{ debug, trace };
use crate::branch::*;
use crate::history::GlobalHistoryRegister;
use crate::predictor::*;
use crate::stats::PredictorStats;

/// A gshare-style branch predictor.
///
/// With zero history bits this degenerates into a table of counters
/// indexed directly by the program counter.
///
/// For every branch, callers must use [GsharePredictor::predict], then
/// [GsharePredictor::record_outcome], then [GsharePredictor::update_predictor]
/// before moving on to the next branch. The update recomputes the index used
/// by the prediction, which is only possible while global history is
/// unchanged.
#[derive(Clone, Debug)]
pub struct GsharePredictor {
    cfg: PredictorConfig,
    derived: DerivedConfig,
    bank: CounterBank,
    ghr: GlobalHistoryRegister,
    stats: PredictorStats,
}

impl GsharePredictor {
    /// Validate the configuration and allocate a zeroed counter bank.
    pub fn new(cfg: PredictorConfig) -> Result<Self, InitError> {
        let derived = cfg.validate()?;
        let bank = CounterBank::new(cfg.counters, derived.counter,
            derived.strategy)?;
        let ghr = GlobalHistoryRegister::new(cfg.history_bits as usize);

        debug!(
            counters = cfg.counters,
            counter_bits = cfg.counter_bits,
            history_bits = cfg.history_bits,
            shared_bits = cfg.shared_bits,
            pc_bits = derived.pc_bits,
            history_shift = derived.history_shift,
            "built predictor"
        );

        Ok(Self {
            cfg,
            derived,
            bank,
            ghr,
            stats: PredictorStats::new(),
        })
    }

    pub fn config(&self) -> &PredictorConfig { &self.cfg }
    pub fn derived(&self) -> &DerivedConfig { &self.derived }
    pub fn history(&self) -> &GlobalHistoryRegister { &self.ghr }
    pub fn bank(&self) -> &CounterBank { &self.bank }

    /// Return the value of a particular counter.
    pub fn counter_at(&self, idx: usize) -> Option<u8> {
        self.bank.counters().get(idx).map(|c| c.value())
    }

    /// Return the counter index for a branch, given the current history.
    pub fn index_for(&self, pc: u64) -> usize {
        self.bank.get_index((pc, self.ghr.value()))
    }

    /// Predict the outcome of a branch.
    ///
    /// A hint always wins over the counters. This does not change any state.
    pub fn predict(&self, pc: u64, hint: Hint) -> Outcome {
        if let Some(outcome) = hint.outcome() {
            return outcome;
        }
        self.bank.get_entry(self.index_for(pc)).predict()
    }

    /// Account for the prediction made for a branch.
    pub fn record_outcome(&mut self, prediction: Outcome, actual: Outcome) {
        self.stats.record(prediction, actual);
    }

    /// Train the counter used to predict this branch, then shift the
    /// outcome into global history.
    pub fn update_predictor(&mut self, pc: u64, actual: Outcome) {
        let idx = self.index_for(pc);
        let ctr = self.bank.get_entry_mut(idx);
        ctr.update(actual);
        trace!(pc, idx, ctr = ctr.value(), ?actual, "update");

        if self.derived.strategy.uses_history() {
            self.ghr.push(actual);
        }
    }

    /// Return every counter, the history register, and all statistics to
    /// zero. Storage is released when the predictor is dropped.
    pub fn reset(&mut self) {
        self.bank.reset();
        self.ghr.clear();
        self.stats = PredictorStats::new();
    }

    /// Return a copy of the statistics accumulated so far.
    pub fn stats_snapshot(&self) -> PredictorStats { self.stats }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(p: &mut GsharePredictor, pc: u64, actual: Outcome) -> Outcome {
        let prediction = p.predict(pc, Hint::None);
        p.record_outcome(prediction, actual);
        p.update_predictor(pc, actual);
        prediction
    }

    #[test]
    fn direct_mapped_scenario() {
        let mut p = GsharePredictor::new(PredictorConfig::direct(4, 2)).unwrap();
        assert_eq!(step(&mut p, 0, Outcome::T), Outcome::N);
        assert_eq!(p.counter_at(0), Some(1));
        assert_eq!(step(&mut p, 0, Outcome::T), Outcome::N);
        assert_eq!(p.counter_at(0), Some(2));
        assert_eq!(step(&mut p, 0, Outcome::N), Outcome::T);
        assert_eq!(p.counter_at(0), Some(1));

        assert_eq!(p.stats_snapshot(), PredictorStats {
            taken_count: 2,
            not_taken_count: 1,
            mispredicts: [1, 2],
        });
        assert_eq!(p.history().value(), 0);
    }

    #[test]
    fn gshare_scenario() {
        let mut p = GsharePredictor::new(PredictorConfig::new(8, 1, 2, 2))
            .unwrap();
        assert_eq!(p.index_for(0b001), 1);
        step(&mut p, 0b001, Outcome::T);
        assert_eq!(p.history().value(), 1);
        assert_eq!(p.counter_at(1), Some(1));

        assert_eq!(p.index_for(0b001), 3);
        assert_eq!(p.predict(0b001, Hint::None), Outcome::N);
        step(&mut p, 0b001, Outcome::T);
        assert_eq!(p.counter_at(3), Some(1));
        assert_eq!(p.history().value(), 0b11);
    }

    #[test]
    fn hints_override_counters() {
        let mut p = GsharePredictor::new(PredictorConfig::direct(4, 2)).unwrap();
        for _ in 0..4 {
            step(&mut p, 2, Outcome::T);
        }
        assert_eq!(p.predict(2, Hint::None), Outcome::T);
        assert_eq!(p.predict(2, Hint::PredictNotTaken), Outcome::N);
        assert_eq!(p.predict(1, Hint::PredictTaken), Outcome::T);
    }

    #[test]
    fn history_only_tracks_outcomes() {
        let mut p = GsharePredictor::new(PredictorConfig::new(64, 2, 3, 1))
            .unwrap();
        let outcomes = [Outcome::T, Outcome::N, Outcome::T, Outcome::T];
        let mut expected = 0u64;
        for (pc, outcome) in [0x40, 0x1234, 0x7, 0xffff_0000].into_iter()
            .zip(outcomes)
        {
            step(&mut p, pc, outcome);
            expected = ((expected << 1) | outcome.index() as u64) & 0b111;
            assert_eq!(p.history().value(), expected);
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let cfg = PredictorConfig::new(16, 3, 2, 1);
        let fresh = GsharePredictor::new(cfg).unwrap();
        let mut p = GsharePredictor::new(cfg).unwrap();
        for pc in 0..32 {
            step(&mut p, pc, Outcome::from(pc % 3 == 0));
        }
        p.reset();
        let once = (p.bank().counters().to_vec(), p.history().clone(),
            p.stats_snapshot());
        p.reset();
        let twice = (p.bank().counters().to_vec(), p.history().clone(),
            p.stats_snapshot());
        assert_eq!(once, twice);
        assert_eq!(once.0, fresh.bank().counters().to_vec());
        assert_eq!(once.1.value(), 0);
        assert_eq!(once.2, PredictorStats::default());
    }

    #[test]
    fn instances_are_independent() {
        let cfg = PredictorConfig::direct(4, 2);
        let mut a = GsharePredictor::new(cfg).unwrap();
        let b = GsharePredictor::new(cfg).unwrap();
        step(&mut a, 1, Outcome::T);
        step(&mut a, 1, Outcome::T);
        assert_eq!(a.predict(1, Hint::None), Outcome::T);
        assert_eq!(b.predict(1, Hint::None), Outcome::N);
        assert_eq!(b.stats_snapshot().total_branches(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = GsharePredictor::new(PredictorConfig::direct(3, 2)).unwrap_err();
        assert_eq!(err, InitError::Config(ConfigError::NotPowerOfTwo(3)));
    }
}
