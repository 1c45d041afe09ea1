use crate::{
    error::IngestError,
    pnml::{merge_hmorph, parse_real_time, timing, HmorphTime, Timing, DDMC_FINISHED, ENCODE_FINISHED},
};
use std::path::Path;

#[test]
pub fn real_time_in_seconds() {
    assert_eq!(parse_real_time("real\t1m2.500s"), Some(62.5));
    assert_eq!(parse_real_time("real\t0m0,250s"), Some(0.25));
    assert_eq!(parse_real_time("real\t12.5"), None);
    assert_eq!(parse_real_time("real"), None);
}

#[test]
pub fn finished_encode_uses_last_real_time() {
    let text = "pnml-encode: reading net\n\
                real\t0m1.000s\n\
                pnml-encode: Result symbolic LTS written to net.ldd\n\
                real\t0m3.000s\n\
                user\t0m2.000s\n";

    assert_eq!(
        timing(Path::new("net.log"), text, ENCODE_FINISHED).unwrap(),
        Timing::Seconds(3.0)
    );
}

#[test]
pub fn unfinished_runs_did_not_finish() {
    let text = "pnml-encode: reading net\nKilled\nreal\t10m0.000s\n";

    assert_eq!(
        timing(Path::new("net.log"), text, ENCODE_FINISHED).unwrap(),
        Timing::Dnf
    );
    assert_eq!(Timing::Dnf.to_string(), "DNF");
}

#[test]
pub fn ddmc_finished_marker_may_appear_mid_line() {
    let text = "lddmc: Writing stats to out.csv\nreal\t0m4,5s\n";

    assert_eq!(
        timing(Path::new("net-ddmc-stats.log"), text, DDMC_FINISHED).unwrap(),
        Timing::Seconds(4.5)
    );
}

#[test]
pub fn finished_log_without_time_is_malformed() {
    let text = "pnml-encode: Result symbolic LTS written to net.ldd\n";

    assert!(matches!(
        timing(Path::new("net.log"), text, ENCODE_FINISHED),
        Err(IngestError::Malformed { .. })
    ));
}

#[test]
pub fn hmorph_merge_marks_missing_sides() {
    let rows = merge_hmorph(
        vec![
            ("a".to_owned(), Timing::Seconds(1.0)),
            ("b".to_owned(), Timing::Dnf),
        ],
        vec![
            ("c".to_owned(), Timing::Seconds(2.0)),
            ("a".to_owned(), Timing::Seconds(0.5)),
        ],
    );

    assert_eq!(
        rows.iter().map(HmorphTime::record).collect::<Vec<_>>(),
        vec![
            vec!["a", "1", "0.5"],
            vec!["b", "DNF", "-"],
            vec!["c", "-", "2"],
        ]
    );
}
