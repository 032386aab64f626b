//! Assemble small synthetic programs and unroll them into branch traces.

use rand::prelude::*;
use rand::rngs::StdRng;
use thiserror::Error;
use crate::branch::*;
use crate::trace::TextTrace;

/// Failed to compile a synthetic program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("label {0:?} was never bound")]
    UndefinedLabel(Label),
}

/// A trace produced by a [TraceAssembler].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticTrace {
    pub data: Vec<BranchRecord>,
}
impl SyntheticTrace {
    pub fn as_slice(&self) -> &[BranchRecord] { &self.data }

    /// Convert into a named [TextTrace].
    pub fn into_trace(self, name: &str) -> TextTrace {
        TextTrace { name: name.to_string(), data: self.data }
    }
}

/// An identifier for a particular [EmitterOp].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Label(usize);
impl Label {
    pub fn new(id: usize) -> Self { Self(id) }
    pub fn id(&self) -> usize { self.0 }
}

/// A map from labels to indexes.
#[derive(Debug, Default)]
pub struct LabelDb {
    data: Vec<Option<usize>>,
}
impl LabelDb {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Allocate a new label
    pub fn alloc(&mut self) -> Label {
        self.data.push(None);
        Label::new(self.data.len() - 1)
    }

    /// Bind a label to some index
    pub fn define(&mut self, label: &Label, idx: usize) {
        self.data[label.id()] = Some(idx);
    }

    /// Resolve a label
    pub fn resolve(&self, label: &Label) -> Option<usize> {
        self.data.get(label.id()).copied().flatten()
    }
}

/// A pre-determined pattern of outcomes associated with a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary pattern of outcomes.
    Pattern(&'static [Outcome]),

    /// A branch which is taken with some probability (in percent).
    Random(u8),
}

/// An instruction in the IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmitterOp {
    /// A conditional branch to some [Label], with a pattern of outcomes
    /// and a hint.
    Branch(Label, BranchPattern, Hint),

    /// An unconditional branch to some [Label].
    Jump(Label),
}
impl EmitterOp {
    /// Returns the number of "bytes" that correspond to this instruction.
    pub fn size(&self) -> u64 { 1 }

    pub fn target(&self) -> Label {
        match self {
            Self::Branch(tgt, _, _) | Self::Jump(tgt) => *tgt,
        }
    }

    pub fn hint(&self) -> Hint {
        match self {
            Self::Branch(_, _, hint) => *hint,
            Self::Jump(_) => Hint::None,
        }
    }

    /// Generate a branch outcome for the 'ctr'-th execution of this op.
    pub fn outcome(&self, ctr: usize, rng: &mut impl Rng) -> Outcome {
        match self {
            EmitterOp::Jump(_) => Outcome::T,
            EmitterOp::Branch(_, pat, _) => match pat {
                BranchPattern::Pattern(p) => p[ctr % p.len()],
                BranchPattern::NeverTaken => Outcome::N,
                BranchPattern::AlwaysTaken => Outcome::T,
                BranchPattern::TakenPeriodic(p) => {
                    if ctr % p == (p - 1) { Outcome::T } else { Outcome::N }
                },
                BranchPattern::NotTakenPeriodic(p) => {
                    if ctr % p == (p - 1) { Outcome::N } else { Outcome::T }
                },
                BranchPattern::Random(pct) => {
                    Outcome::from(rng.gen_ratio((*pct).min(100) as u32, 100))
                },
            }
        }
    }
}


/// Used to assemble and compile a trace.
#[derive(Debug)]
pub struct TraceAssembler {
    /// The list of [EmitterOp]s.
    ops: Vec<EmitterOp>,

    /// The list of program counter values corresponding to each [EmitterOp].
    pcs: Vec<u64>,

    /// State tracking the program counter value during assembly.
    cursor: u64,

    /// Map from some [Label] to an [EmitterOp] index.
    labels: LabelDb,
}

impl TraceAssembler {
    /// Create a new assembler starting at the given address.
    pub fn new(base: u64) -> Self {
        Self {
            ops: Vec::new(),
            pcs: Vec::new(),
            cursor: base,
            labels: LabelDb::new(),
        }
    }

    /// Create a new label.
    pub fn create_label(&mut self) -> Label {
        self.labels.alloc()
    }

    /// Bind a label to the current point in the program.
    pub fn bind_label(&mut self, label: Label) {
        let off = self.ops.len();
        self.labels.define(&label, off);
    }

    fn push_op(&mut self, op: EmitterOp) {
        let op_size = op.size();
        self.ops.push(op);
        self.pcs.push(self.cursor);
        self.cursor += op_size;
    }

    /// Emit a conditional branch to the provided [Label].
    pub fn branch_to_label(&mut self, tgt: Label, pat: BranchPattern) {
        self.push_op(EmitterOp::Branch(tgt, pat, Hint::None));
    }

    /// Emit a conditional branch carrying a hint.
    pub fn hinted_branch_to_label(&mut self, tgt: Label, pat: BranchPattern,
        hint: Hint)
    {
        self.push_op(EmitterOp::Branch(tgt, pat, hint));
    }

    /// Emit an unconditional branch to the provided [Label].
    pub fn jump_to_label(&mut self, tgt: Label) {
        self.push_op(EmitterOp::Jump(tgt));
    }

    /// Increment the program counter by some value.
    pub fn pad(&mut self, len: u64) {
        self.cursor += len;
    }

    /// Increment and align the program counter to some power of two.
    pub fn pad_align(&mut self, aln: u64) {
        assert!(aln.is_power_of_two());
        let mask = aln - 1;
        self.cursor = (self.cursor + mask) & !mask;
    }

    /// Resolve every branch target into an op index.
    fn resolve_targets(&self) -> Result<Vec<usize>, AssemblerError> {
        self.ops.iter().map(|op| {
            let lab = op.target();
            self.labels.resolve(&lab).ok_or(AssemblerError::UndefinedLabel(lab))
        }).collect()
    }

    /// Unroll this program into a trace of at most 'max_iters' branches.
    /// Random outcomes are drawn from an RNG seeded with 'seed'.
    ///
    /// A label bound after the last op ends the program.
    pub fn compile(&self, max_iters: usize, seed: u64)
        -> Result<SyntheticTrace, AssemblerError>
    {
        let targets = self.resolve_targets()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let num_ops = self.ops.len();
        let mut ctr = vec![0; num_ops];
        let mut data = Vec::new();
        let mut cur = 0;

        while data.len() < max_iters && cur < num_ops {
            let op = &self.ops[cur];
            let outcome = op.outcome(ctr[cur], &mut rng);
            ctr[cur] += 1;
            data.push(BranchRecord::new(self.pcs[cur], outcome, op.hint()));

            cur = match outcome {
                Outcome::T => targets[cur],
                Outcome::N => cur + 1,
            };
        }
        Ok(SyntheticTrace { data })
    }
}
