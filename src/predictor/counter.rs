//! Implementation of a saturating counter.

use crate::Outcome;
use crate::predictor::StatefulPredictor;

/// The widest counter that fits in a [`SaturatingCounter`].
pub const MAX_COUNTER_BITS: u8 = 8;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Width of the counter in bits (1 to 8)
    pub bits: u8,
}
impl SaturatingCounterConfig {
    pub fn new(bits: u8) -> Self {
        assert!((1..=MAX_COUNTER_BITS).contains(&bits));
        Self { bits }
    }

    pub fn storage_bits(&self) -> usize { self.bits as usize }

    /// The largest value a counter can hold.
    pub fn max_value(&self) -> u8 {
        ((1u16 << self.bits) - 1) as u8
    }

    /// The smallest value which predicts 'taken'.
    pub fn taken_threshold(&self) -> u8 {
        1u8 << (self.bits - 1)
    }

    pub fn build(self) -> SaturatingCounter {
        SaturatingCounter {
            max: self.max_value(),
            threshold: self.taken_threshold(),
            ctr: 0,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
///
/// Counters start at zero (strongly not-taken) and never wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    max: u8,
    threshold: u8,
    ctr: u8,
}
impl SaturatingCounter {
    /// Move the counter one step toward 'taken'.
    pub fn inc(&mut self) {
        if self.ctr != self.max {
            self.ctr += 1;
        }
    }

    /// Move the counter one step toward 'not-taken'.
    pub fn dec(&mut self) {
        self.ctr = self.ctr.saturating_sub(1);
    }

    pub fn value(&self) -> u8 { self.ctr }
    pub fn max_value(&self) -> u8 { self.max }
    pub fn taken_threshold(&self) -> u8 { self.threshold }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }
    fn predict(&self) -> Outcome {
        Outcome::from(self.ctr >= self.threshold)
    }
    fn reset(&mut self) {
        self.ctr = 0;
    }
    fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn saturates_at_both_ends(#[values(1, 2, 3, 4, 5, 6, 7, 8)] bits: u8) {
        let cfg = SaturatingCounterConfig::new(bits);
        let mut ctr = cfg.build();
        for _ in 0..300 {
            ctr.update(Outcome::T);
            assert!(ctr.value() <= cfg.max_value());
        }
        assert_eq!(ctr.value(), cfg.max_value());
        for _ in 0..300 {
            ctr.update(Outcome::N);
        }
        assert_eq!(ctr.value(), 0);
    }

    #[rstest]
    fn predicts_taken_at_threshold(#[values(1, 2, 3, 4, 5, 6, 7, 8)] bits: u8) {
        let cfg = SaturatingCounterConfig::new(bits);
        let mut ctr = cfg.build();
        let threshold = 1u16 << (bits - 1);
        for step in 0..(1u16 << bits) {
            assert_eq!(ctr.value() as u16, step);
            assert_eq!(ctr.predict(), Outcome::from(step >= threshold));
            ctr.inc();
        }
    }

    #[test]
    fn eight_bit_limits() {
        let cfg = SaturatingCounterConfig::new(8);
        assert_eq!(cfg.max_value(), 255);
        assert_eq!(cfg.taken_threshold(), 128);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut ctr = SaturatingCounterConfig::new(2).build();
        ctr.inc();
        ctr.inc();
        assert_eq!(ctr.predict(), Outcome::T);
        ctr.reset();
        assert_eq!(ctr.value(), 0);
        assert_eq!(ctr.predict(), Outcome::N);
    }
}
