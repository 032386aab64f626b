//! Write a synthetic branch trace in the text trace format.

use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{ value_parser, Parser };
use thiserror::Error;
use tracing::{ error, info };
use gshare_sim::*;
use gshare_sim::cli::init_logging;
use gshare_sim::trace::assembler::*;

#[derive(Parser, Debug)]
#[command(name = "gen-trace", version, about = "Generate a synthetic branch trace")]
struct Cli {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of branches to emit
    #[arg(short = 'n', long, default_value_t = 100_000)]
    count: usize,

    /// Seed for data-dependent branch outcomes
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Probability (in percent) that the data-dependent branch is taken
    #[arg(long, default_value_t = 50, value_parser = value_parser!(u8).range(0..=100))]
    taken_percent: u8,
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Assembler(#[from] AssemblerError),

    #[error("unable to write trace: {0}")]
    Io(#[from] std::io::Error),
}

/// An outer loop around an inner loop with a data-dependent branch.
fn assemble(taken_percent: u8) -> TraceAssembler {
    let mut e = TraceAssembler::new(0x0040_0000);
    let outer = e.create_label();
    let inner = e.create_label();
    let skip = e.create_label();

    e.bind_label(outer);
    e.pad(0x10);
    e.bind_label(inner);
    e.branch_to_label(skip, BranchPattern::Random(taken_percent));
    e.pad(0x8);
    e.bind_label(skip);
    e.branch_to_label(inner, BranchPattern::NotTakenPeriodic(8));
    e.hinted_branch_to_label(outer,
        BranchPattern::Pattern(&[Outcome::T, Outcome::T, Outcome::N]),
        Hint::PredictTaken,
    );
    e.jump_to_label(outer);
    e
}

fn run(args: &Cli) -> Result<(), Error> {
    let trace = assemble(args.taken_percent)
        .compile(args.count, args.seed)?
        .into_trace("synthetic");

    let mut w: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    trace.write_to(&mut w)?;
    w.flush()?;
    info!(records = trace.num_entries(), "wrote trace");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Cli::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
