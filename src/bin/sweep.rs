//! Evaluate a grid of predictor configurations against one or more traces.

use std::path::PathBuf;
use std::process::ExitCode;
use clap::{ value_parser, Parser };
use itertools::iproduct;
use tracing::{ debug, error };
use gshare_sim::*;
use gshare_sim::cli::init_logging;
use gshare_sim::sim;
use gshare_sim::stats::Percent;

#[derive(Parser, Debug)]
#[command(name = "sweep", version, about = "Sweep predictor configurations")]
struct Cli {
    /// Branch trace files
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Smallest counter bank (log2 of the number of counters)
    #[arg(long, default_value_t = 8, value_parser = value_parser!(u32).range(0..=32))]
    min_index_bits: u32,

    /// Largest counter bank (log2 of the number of counters)
    #[arg(long, default_value_t = 16, value_parser = value_parser!(u32).range(0..=32))]
    max_index_bits: u32,

    /// Counter widths to evaluate
    #[arg(long, value_delimiter = ',', default_values_t = [1u8, 2, 3])]
    counter_bits: Vec<u8>,

    /// History lengths to evaluate (all history bits are shared)
    #[arg(long, value_delimiter = ',', default_values_t = [0u32, 4, 8, 12, 16])]
    history_bits: Vec<u32>,
}

fn run(args: &Cli) -> Result<(), TraceError> {
    let grid: Vec<(u32, u8, u32)> = iproduct!(
        args.min_index_bits..=args.max_index_bits,
        args.counter_bits.iter().copied(),
        args.history_bits.iter().copied()
    ).collect();

    for trace in TraceSet::new_from_slice(&args.traces) {
        let trace = trace?;
        println!("[*] {}, {} records", trace.name(), trace.num_entries());
        println!("  {:>8} {:>4} {:>4}  {:>7} {:>9} {:>7}",
            "counters", "bits", "hist", "total", "not-taken", "taken");

        for &(index_bits, counter_bits, history_bits) in grid.iter() {
            let cfg = PredictorConfig::new(1 << index_bits, counter_bits,
                history_bits, history_bits);
            let mut predictor = match GsharePredictor::new(cfg) {
                Ok(p) => p,
                Err(e) => {
                    debug!(?cfg, %e, "skipping configuration");
                    continue;
                },
            };
            let stats = sim::replay(&mut predictor, trace.as_slice()).stats;
            println!("  {:>8} {:>4} {:>4}  {:>7} {:>9} {:>7}",
                cfg.counters, cfg.counter_bits, cfg.history_bits,
                Percent(stats.mispredict_rate()),
                Percent(stats.not_taken_mispredict_rate()),
                Percent(stats.taken_mispredict_rate()),
            );
        }
        println!();
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
