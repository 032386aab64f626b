//! Reading and writing text branch traces.
//!
//! Each line of a trace describes one branch:
//!
//! ```text
//! 0x00000000004005d6: taken T, hint 0
//! ```
//!
//! The first two bytes are skipped, followed by the program counter in hex,
//! the outcome (`T` or `F`) and a hint digit (`0` for no hint, `1` for
//! "predict taken", `2` for "predict not-taken"). Older traces without the
//! hint clause are read as having no hint.

pub mod assembler;

use std::io::Write;
use std::path::{ Path, PathBuf };
use thiserror::Error;
use tracing::{ info, warn };
use crate::branch::*;

/// Number of bytes skipped at the start of each record.
const LINE_START: usize = 2;

/// Maximum number of hex digits in a program counter.
const MAX_PC_DIGITS: usize = 16;

/// Why a single trace record could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("record is too short")]
    TooShort,

    #[error("missing ':' after the program counter")]
    MissingColon,

    #[error("invalid program counter {0:?}")]
    BadPc(String),

    #[error("expected \" taken \" after the program counter")]
    MissingTaken,

    #[error("invalid outcome {0:?} (expected 'T' or 'F')")]
    BadOutcome(Option<char>),

    #[error("expected \", hint \" after the outcome")]
    MissingHint,

    #[error(transparent)]
    BadHint(#[from] HintError),

    #[error("unexpected trailing data {0:?}")]
    TrailingData(String),
}

/// Failed to load a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("unable to read trace {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("{name}:{line}: {kind}")]
    Parse { name: String, line: usize, kind: ParseErrorKind },
}

/// Parse a single record.
pub fn parse_record(line: &str) -> Result<BranchRecord, ParseErrorKind> {
    let body = line.get(LINE_START..).ok_or(ParseErrorKind::TooShort)?;
    let (pc_str, rest) = body.split_once(':')
        .ok_or(ParseErrorKind::MissingColon)?;

    if pc_str.is_empty() || pc_str.len() > MAX_PC_DIGITS {
        return Err(ParseErrorKind::BadPc(pc_str.to_string()));
    }
    let pc = u64::from_str_radix(pc_str, 16)
        .map_err(|_| ParseErrorKind::BadPc(pc_str.to_string()))?;

    let rest = rest.strip_prefix(" taken ")
        .ok_or(ParseErrorKind::MissingTaken)?;
    let mut chars = rest.chars();
    let outcome = match chars.next() {
        Some('T') => Outcome::T,
        Some('F') => Outcome::N,
        c => return Err(ParseErrorKind::BadOutcome(c)),
    };

    let rest = chars.as_str();
    if rest.is_empty() {
        return Ok(BranchRecord::new(pc, outcome, Hint::None));
    }

    let rest = rest.strip_prefix(", hint ")
        .ok_or(ParseErrorKind::MissingHint)?;
    let mut chars = rest.chars();
    let hint = Hint::try_from(chars.next().ok_or(ParseErrorKind::MissingHint)?)?;
    if !chars.as_str().is_empty() {
        return Err(ParseErrorKind::TrailingData(chars.as_str().to_string()));
    }
    Ok(BranchRecord::new(pc, outcome, hint))
}

/// Write a single record (including the newline).
pub fn write_record(w: &mut impl Write, record: &BranchRecord)
    -> std::io::Result<()>
{
    writeln!(w, "0x{:016x}: taken {}, hint {}",
        record.pc, record.outcome.as_char(), record.hint.as_char())
}


/// A trace read from a text file.
#[derive(Clone, Debug)]
pub struct TextTrace {
    pub name: String,
    pub data: Vec<BranchRecord>,
}
impl TextTrace {
    /// Parse a trace from a string. Blank lines are skipped.
    pub fn parse(name: &str, text: &str) -> Result<Self, TraceError> {
        let mut data = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                warn!(trace = name, line = lineno + 1, "skipping blank line");
                continue;
            }
            let record = parse_record(line).map_err(|kind| TraceError::Parse {
                name: name.to_string(),
                line: lineno + 1,
                kind,
            })?;
            data.push(record);
        }
        Ok(Self { name: name.to_string(), data })
    }

    /// Create a [TextTrace] from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            TraceError::Io { path: path.to_owned(), source }
        })?;
        let name = path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let res = Self::parse(&name, &text)?;
        info!(trace = %res.name, records = res.num_entries(), "loaded trace");
        Ok(res)
    }

    /// Write every record in this trace.
    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        for record in self.data.iter() {
            write_record(w, record)?;
        }
        Ok(())
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.data.len() }

    pub fn name(&self) -> &str { &self.name }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] { &self.data }
}


/// A list of trace files, loaded one at a time.
#[derive(Clone, Debug, Default)]
pub struct TraceSet {
    /// A list of filenames
    pub files: Vec<PathBuf>,

    cur: usize,
}
impl TraceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_from_slice(paths: &[PathBuf]) -> Self {
        Self { files: paths.to_vec(), cur: 0 }
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }
}
impl Iterator for TraceSet {
    type Item = Result<TextTrace, TraceError>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(TextTrace::from_file(path))
    }
}
