
use bitvec::prelude::*;
use crate::branch::Outcome;

/// The widest global history register we can turn into an index.
pub const MAX_HISTORY_BITS: usize = 63;

/// A shift register recording the most recent branch outcomes.
///
/// Bit 0 is always the most recent outcome. A register with zero length
/// never records anything and always reads as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalHistoryRegister {
    data: BitVec<u64, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the oldest outcome and the rightmost bit is the
// most recent outcome (index 0).
impl std::fmt::Display for GlobalHistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl GlobalHistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len <= MAX_HISTORY_BITS, "history register too wide ({} bits)", len);
        Self {
            data: bitvec![u64, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn data(&self) -> &BitSlice<u64, Lsb0> { self.data.as_bitslice() }

    /// Returns a mask covering every bit in the register.
    pub fn mask(&self) -> u64 {
        (1u64 << self.len) - 1
    }

    /// Return the contents of the register as an integer.
    pub fn value(&self) -> u64 {
        if self.len == 0 {
            return 0;
        }
        self.data.load_le::<u64>()
    }

    /// Shift a new outcome into the register.
    /// The oldest outcome falls off the top of the register.
    pub fn push(&mut self, outcome: Outcome) {
        if self.len == 0 {
            return;
        }
        self.data.shift_right(1);
        self.data.set(0, outcome.into());
    }

    /// Clear all of the bits in the register.
    pub fn clear(&mut self) {
        self.data.fill(false);
    }
}
