//! Types for implementing a table of predictors.

/// A strategy for turning a program counter and global history into an
/// index for a [PredictorTable].
///
/// All of the masks and shift amounts are derived once when a predictor is
/// configured (see [`crate::PredictorConfig::validate`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexStrategy {
    /// Use the low bits of the program counter.
    Direct {
        index_mask: u64,
    },

    /// XOR global history into the program counter bits.
    ///
    /// The low bits of the index come from the program counter. History
    /// is shifted up by `history_shift` so that the top of the register
    /// lands on the top bit of the index.
    Gshare {
        pc_mask: u64,
        history_shift: u32,
    },
}
impl IndexStrategy {
    /// Compute an index from a program counter and global history value.
    pub fn index(&self, pc: u64, history: u64) -> usize {
        let idx = match self {
            Self::Direct { index_mask } => pc & index_mask,
            Self::Gshare { pc_mask, history_shift } => {
                (history << history_shift) ^ (pc & pc_mask)
            },
        };
        idx as usize
    }

    /// Returns 'true' if this strategy depends on global history.
    pub fn uses_history(&self) -> bool {
        matches!(self, Self::Gshare { .. })
    }
}

/// Interface to a table of predictors.
pub trait PredictorTable {
    /// The type of input to the table used to form an index.
    type Input;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Given some input, return the corresponding index into the table.
    fn get_index(&self, input: Self::Input) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}
