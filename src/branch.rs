//! Types for representing branches, outcomes, and compiler hints.

use thiserror::Error;

/// A branch outcome.
///
/// The discriminant is used to index per-outcome statistics.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// Return this outcome as an index (0 for not-taken, 1 for taken).
    pub fn index(self) -> usize { self as usize }

    /// Return the character used for this outcome in a text trace.
    pub fn as_char(self) -> char {
        match self {
            Self::T => 'T',
            Self::N => 'F',
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        match x {
            Outcome::T => true,
            Outcome::N => false,
        }
    }
}

/// An invalid hint value found at the trace boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid hint value {0:?} (expected '0', '1' or '2')")]
pub struct HintError(pub char);

/// A prediction hint attached to a branch by the compiler.
///
/// When present, a hint overrides whatever the predictor has learned.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hint {
    /// No hint: use the learned prediction
    #[default]
    None = 0,
    /// The branch is asserted to be taken
    PredictTaken = 1,
    /// The branch is asserted to be not-taken
    PredictNotTaken = 2,
}
impl Hint {
    /// Returns the outcome asserted by this hint, if any.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Self::None => None,
            Self::PredictTaken => Some(Outcome::T),
            Self::PredictNotTaken => Some(Outcome::N),
        }
    }

    /// Return the digit used for this hint in a text trace.
    pub fn as_char(self) -> char {
        match self {
            Self::None => '0',
            Self::PredictTaken => '1',
            Self::PredictNotTaken => '2',
        }
    }
}
impl TryFrom<char> for Hint {
    type Error = HintError;
    fn try_from(c: char) -> Result<Self, HintError> {
        match c {
            '0' => Ok(Self::None),
            '1' => Ok(Self::PredictTaken),
            '2' => Ok(Self::PredictNotTaken),
            _ => Err(HintError(c)),
        }
    }
}


/// A record of branch execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: u64,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,

    /// The hint attached to this branch
    pub hint: Hint,
}
impl BranchRecord {
    pub fn new(pc: u64, outcome: Outcome, hint: Hint) -> Self {
        Self { pc, outcome, hint }
    }

    /// Returns 'true' if the branch was taken.
    pub fn is_taken(&self) -> bool {
        self.outcome == Outcome::T
    }
}
