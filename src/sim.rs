//! Replaying a trace through a predictor.

use std::time::{ Duration, Instant };
use tracing::info;
use crate::branch::*;
use crate::predictor::GsharePredictor;
use crate::stats::*;

/// Run one branch through the predictor: predict, account for the
/// prediction, then train. Returns the prediction.
pub fn step(p: &mut GsharePredictor, record: &BranchRecord) -> Outcome {
    let prediction = p.predict(record.pc, record.hint);
    p.record_outcome(prediction, record.outcome);
    p.update_predictor(record.pc, record.outcome);
    prediction
}

/// The result of replaying a trace.
#[derive(Debug)]
pub struct Replay {
    /// Statistics accumulated by the predictor
    pub stats: PredictorStats,

    /// Per-branch statistics, if they were requested
    pub branches: Option<BranchStats>,

    /// Time spent replaying the trace
    pub elapsed: Duration,
}

/// Replay every record in order.
pub fn replay(p: &mut GsharePredictor, records: &[BranchRecord]) -> Replay {
    run(p, records, None)
}

/// Replay every record in order, also collecting per-branch statistics.
pub fn replay_profiled(p: &mut GsharePredictor, records: &[BranchRecord])
    -> Replay
{
    run(p, records, Some(BranchStats::new()))
}

fn run(p: &mut GsharePredictor, records: &[BranchRecord],
    mut branches: Option<BranchStats>) -> Replay
{
    let start = Instant::now();
    for record in records {
        let prediction = step(p, record);
        if let Some(b) = branches.as_mut() {
            b.update(record, prediction);
        }
    }
    let elapsed = start.elapsed();

    let stats = p.stats_snapshot();
    info!(
        records = records.len(),
        mispredicts = stats.total_mispredicts(),
        elapsed_ms = elapsed.as_millis() as u64,
        "replayed trace"
    );
    Replay { stats, branches, elapsed }
}
