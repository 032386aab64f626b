//! Helpers for collecting statistics.

use std::collections::*;
use itertools::*;
use crate::branch::*;
use crate::predictor::PredictorConfig;

/// Running counts of branch outcomes and mispredictions.
///
/// Mispredictions are split by the *actual* outcome of the branch:
/// `mispredicts[0]` counts not-taken branches that were predicted taken,
/// and `mispredicts[1]` counts taken branches that were predicted not-taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredictorStats {
    /// Number of taken branches
    pub taken_count: u64,

    /// Number of not-taken branches
    pub not_taken_count: u64,

    /// Number of mispredictions (indexed by actual [Outcome])
    pub mispredicts: [u64; 2],
}
impl PredictorStats {
    pub fn new() -> Self { Self::default() }

    /// Account for a single branch.
    pub fn record(&mut self, prediction: Outcome, actual: Outcome) {
        match actual {
            Outcome::T => self.taken_count += 1,
            Outcome::N => self.not_taken_count += 1,
        }
        if prediction != actual {
            self.mispredicts[actual.index()] += 1;
        }
    }

    /// Return the total branch count.
    pub fn total_branches(&self) -> u64 {
        self.taken_count + self.not_taken_count
    }

    /// Return the total misprediction count.
    pub fn total_mispredicts(&self) -> u64 {
        self.mispredicts[0] + self.mispredicts[1]
    }

    /// Return the misprediction count for branches with some outcome.
    pub fn mispredicts_for(&self, actual: Outcome) -> u64 {
        self.mispredicts[actual.index()]
    }

    /// Fraction of all branches that were mispredicted.
    /// Returns [None] when no branches were observed.
    pub fn mispredict_rate(&self) -> Option<f64> {
        ratio(self.total_mispredicts(), self.total_branches())
    }

    /// Fraction of not-taken branches that were mispredicted.
    /// Returns [None] when no not-taken branches were observed.
    pub fn not_taken_mispredict_rate(&self) -> Option<f64> {
        ratio(self.mispredicts[0], self.not_taken_count)
    }

    /// Fraction of taken branches that were mispredicted.
    /// Returns [None] when no taken branches were observed.
    pub fn taken_mispredict_rate(&self) -> Option<f64> {
        ratio(self.mispredicts[1], self.taken_count)
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    if den == 0 { None } else { Some(num as f64 / den as f64) }
}

/// Formats a rate as a percentage with one decimal place.
/// Undefined rates are printed as `n/a`.
pub struct Percent(pub Option<f64>);
impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self.0 {
            Some(rate) => format!("{:.1}%", rate * 100.0),
            None => "n/a".to_string(),
        };
        f.pad(&s)
    }
}

/// The report printed after replaying a trace: the predictor
/// configuration followed by the misprediction rates.
pub struct Report<'a> {
    pub cfg: &'a PredictorConfig,
    pub stats: &'a PredictorStats,
}
impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.cfg)?;
        writeln!(f, "Total mispredict rate = {}",
            Percent(self.stats.mispredict_rate()))?;
        writeln!(f, "mispredict rate when branch is not taken = {}",
            Percent(self.stats.not_taken_mispredict_rate()))?;
        writeln!(f, "mispredict rate when branch is taken = {}",
            Percent(self.stats.taken_mispredict_rate()))
    }
}


/// Per-branch statistics collected while replaying a trace.
#[derive(Debug, Default)]
pub struct BranchStats {
    /// Per-branch data (indexed by program counter value)
    pub data: BTreeMap<u64, BranchData>,
}
impl BranchStats {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Update per-branch statistics.
    pub fn update(&mut self, record: &BranchRecord, prediction: Outcome) {
        let data = self.get_mut(record.pc);
        data.occ += 1;
        if record.is_taken() { data.taken += 1; }
        if prediction == record.outcome { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: u64) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: u64) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the branches with the most mispredictions, worst first.
    /// Ties are broken by program counter value.
    pub fn worst_branches(&self, n: usize) -> Vec<(u64, &BranchData)> {
        self.data.iter()
            .filter(|(_, s)| s.misses() > 0)
            .sorted_by(|x, y| y.1.misses().cmp(&x.1.misses()).then(x.0.cmp(y.0)))
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: u64,

    /// Number of correct predictions for this branch.
    pub hits: u64,

    /// Number of times this branch was taken.
    pub taken: u64,
}
impl BranchData {
    pub fn misses(&self) -> u64 { self.occ - self.hits }

    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / self.occ as f64
    }
}
