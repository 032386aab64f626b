//! Replay a branch trace through a predictor and report misprediction rates.

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use thiserror::Error;
use tracing::error;
use gshare_sim::*;
use gshare_sim::cli::*;
use gshare_sim::sim;
use gshare_sim::stats::Report;

#[derive(Parser, Debug)]
#[command(
    name = "predictor",
    version,
    about = "Replay a branch trace through a saturating-counter predictor"
)]
struct Cli {
    /// Branch trace file
    trace: PathBuf,

    #[command(flatten)]
    cfg: ConfigArgs,

    /// Also list the N branches with the most mispredictions
    #[arg(long, value_name = "N")]
    profile: Option<usize>,
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Trace(#[from] TraceError),
}

fn run(args: &Cli) -> Result<(), Error> {
    let cfg = args.cfg.resolve()?;
    let mut predictor = GsharePredictor::new(cfg)?;
    let trace = TextTrace::from_file(&args.trace)?;

    let res = match args.profile {
        Some(_) => sim::replay_profiled(&mut predictor, trace.as_slice()),
        None => sim::replay(&mut predictor, trace.as_slice()),
    };
    print!("{}", Report { cfg: predictor.config(), stats: &res.stats });

    if let (Some(n), Some(branches)) = (args.profile, &res.branches) {
        println!("Unique branches: {}", branches.num_unique_branches());
        println!("Most mispredicted branches:");
        for (pc, data) in branches.worst_branches(n) {
            println!("  {:016x} {:8}/{:8} {:.4}",
                pc, data.hits, data.occ, data.hit_rate()
            );
        }
    }
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
