//! End-to-end tests: load text traces from disk and replay them.

use std::io::Write;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use gshare_sim::*;
use gshare_sim::sim;
use gshare_sim::stats::Report;
use gshare_sim::trace::assembler::*;

fn write_trace(lines: &[&str]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
    f.flush().unwrap();
    f
}

#[test]
fn direct_mapped_trace_report() {
    let f = write_trace(&[
        "0x0000000000000000: taken T, hint 0",
        "0x0000000000000000: taken T, hint 0",
        "0x0000000000000000: taken F, hint 0",
    ]);
    let trace = TextTrace::from_file(f.path()).unwrap();
    assert_eq!(trace.num_entries(), 3);

    let mut p = GsharePredictor::new(PredictorConfig::direct(4, 2)).unwrap();
    let res = sim::replay(&mut p, trace.as_slice());
    assert_eq!(p.counter_at(0), Some(1));

    let report = Report { cfg: p.config(), stats: &res.stats }.to_string();
    assert_eq!(report, "\
Number of counters = 4
Counter size in bits = 2
History length = 0
Shared history bits = 0
Total mispredict rate = 100.0%
mispredict rate when branch is not taken = 100.0%
mispredict rate when branch is taken = 100.0%
");
}

#[test]
fn trace_without_taken_branches() {
    let f = write_trace(&[
        "0x0000000000001000: taken F, hint 0",
        "0x0000000000001004: taken F, hint 1",
        "0x0000000000001008: taken F, hint 2",
    ]);
    let trace = TextTrace::from_file(f.path()).unwrap();
    let mut p = GsharePredictor::new(PredictorConfig::default()).unwrap();
    let stats = sim::replay(&mut p, trace.as_slice()).stats;

    // Only the branch hinted 'taken' is mispredicted
    assert_eq!(stats.mispredicts, [1, 0]);
    assert_eq!(stats.taken_mispredict_rate(), None);
    let report = Report { cfg: p.config(), stats: &stats }.to_string();
    assert!(report.contains("mispredict rate when branch is taken = n/a\n"));
    assert!(report.contains("mispredict rate when branch is not taken = 33.3%\n"));
}

#[test]
fn trace_without_not_taken_branches() {
    let f = write_trace(&["0x10: taken T", "0x10: taken T"]);
    let trace = TextTrace::from_file(f.path()).unwrap();
    let mut p = GsharePredictor::new(PredictorConfig::direct(16, 1)).unwrap();
    let stats = sim::replay(&mut p, trace.as_slice()).stats;
    assert_eq!(stats.not_taken_mispredict_rate(), None);
    assert_eq!(stats.taken_mispredict_rate(), Some(0.5));
}

#[test]
fn empty_trace_has_undefined_rates() {
    let f = write_trace(&[]);
    let trace = TextTrace::from_file(f.path()).unwrap();
    let mut p = GsharePredictor::new(PredictorConfig::default()).unwrap();
    let stats = sim::replay(&mut p, trace.as_slice()).stats;
    assert_eq!(stats.mispredict_rate(), None);
}

#[test]
fn malformed_trace_is_rejected() {
    let f = write_trace(&[
        "0x0000000000000000: taken T, hint 0",
        "0x0000000000000004: taken T, hint 9",
    ]);
    match TextTrace::from_file(f.path()) {
        Err(TraceError::Parse { line, kind, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(kind, ParseErrorKind::BadHint(HintError('9')));
        },
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn missing_trace_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.trace");
    assert!(matches!(TextTrace::from_file(&path), Err(TraceError::Io { .. })));
}

#[test]
fn trace_set_loads_each_file() {
    let a = write_trace(&["0x10: taken T, hint 0"]);
    let b = write_trace(&["0x20: taken F, hint 0", "0x30: taken F, hint 0"]);
    let mut set = TraceSet::new();
    set.add_file(a.path());
    set.add_file(b.path());
    let sizes: Vec<usize> = set.map(|t| t.unwrap().num_entries()).collect();
    assert_eq!(sizes, vec![1, 2]);
}

#[test]
fn synthetic_trace_survives_a_file_round_trip() {
    let mut e = TraceAssembler::new(0x40_0000);
    let top = e.create_label();
    e.bind_label(top);
    e.branch_to_label(top, BranchPattern::Random(70));
    e.hinted_branch_to_label(top, BranchPattern::TakenPeriodic(3),
        Hint::PredictNotTaken);
    e.jump_to_label(top);
    let trace = e.compile(2000, 42).unwrap().into_trace("synthetic");

    let mut f = NamedTempFile::new().unwrap();
    trace.write_to(&mut f).unwrap();
    f.flush().unwrap();
    let loaded = TextTrace::from_file(f.path()).unwrap();
    assert_eq!(loaded.as_slice(), trace.as_slice());

    let cfg = PredictorConfig::new(1024, 2, 6, 3);
    let mut a = GsharePredictor::new(cfg).unwrap();
    let mut b = GsharePredictor::new(cfg).unwrap();
    assert_eq!(
        sim::replay(&mut a, trace.as_slice()).stats,
        sim::replay(&mut b, loaded.as_slice()).stats,
    );
}

#[test]
fn config_file_feeds_the_predictor() {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "counters = 64\ncounter_bits = 3\nhistory_bits = 4\nshared_bits = 2")
        .unwrap();
    f.flush().unwrap();
    let cfg = PredictorConfig::from_file(f.path()).unwrap();
    assert_eq!(cfg, PredictorConfig::new(64, 3, 4, 2));
    let p = GsharePredictor::new(cfg).unwrap();
    assert_eq!(p.derived().pc_bits, 4);
    assert_eq!(p.derived().history_shift, 2);

    let mut bad = NamedTempFile::new().unwrap();
    writeln!(bad, "counters = \"many\"").unwrap();
    bad.flush().unwrap();
    assert!(matches!(PredictorConfig::from_file(bad.path()),
        Err(ConfigFileError::Toml { .. })));
}
