use crate::{
    compare::Comparator,
    loader::DatasetRegistry,
    overhead::OverheadRequest,
    record::{DatasetKey, ResultRecord, ResultTable},
};

const REC: u32 = 4;
const REC_PAR: u32 = 14;

fn request() -> OverheadRequest {
    OverheadRequest {
        config: "sl-ldd".to_owned(),
        baseline: REC,
        candidate: REC_PAR,
    }
}

#[test]
pub fn buckets_by_baseline_decade() {
    let mut registry = DatasetRegistry::new(Vec::new());
    registry.insert(ResultTable::new(
        DatasetKey::new("beem", "sl-ldd"),
        "beem_sloan_stats_ldd.csv",
        vec![
            ResultRecord::new("m1", REC, Some(1.0)),
            ResultRecord::new("m2", REC, Some(2.0)),
            ResultRecord::new("m3", REC, Some(30.0)),
            ResultRecord::new("m4", REC, Some(0.0)),
            ResultRecord::new("m1", REC_PAR, Some(2.0)).with_merge_time(0.5),
            ResultRecord::new("m2", REC_PAR, Some(3.0)).with_merge_time(1.0),
            ResultRecord::new("m3", REC_PAR, Some(15.0)).with_merge_time(3.0),
            ResultRecord::new("m4", REC_PAR, Some(1.0)),
            ResultRecord::new("m5", REC_PAR, Some(1.0)),
        ],
    ));

    let buckets = Comparator::new(&registry)
        .merge_overhead(&["beem"], &request())
        .unwrap();

    assert_eq!(buckets.len(), 2);

    assert_eq!((buckets[0].lower, buckets[0].upper), (0.5, 5.0));
    assert_eq!(buckets[0].size, 2);
    assert_eq!(buckets[0].avg_reach, 1.75);
    assert_eq!(buckets[0].avg_merge, 0.5);

    assert_eq!((buckets[1].lower, buckets[1].upper), (5.0, 50.0));
    assert_eq!(buckets[1].size, 1);
    assert_eq!(buckets[1].avg_reach, 0.5);
    assert_eq!(buckets[1].avg_merge, 0.1);
}

#[test]
pub fn no_common_benchmarks_give_no_buckets() {
    let mut registry = DatasetRegistry::new(Vec::new());
    registry.insert(ResultTable::new(
        DatasetKey::new("ptri", "sl-ldd"),
        "petrinets_sloan_stats_ldd.csv",
        vec![
            ResultRecord::new("a", REC, Some(1.0)),
            ResultRecord::new("b", REC_PAR, Some(1.0)),
        ],
    ));

    let buckets = Comparator::new(&registry)
        .merge_overhead(&["ptri", "prom"], &request())
        .unwrap();

    assert!(buckets.is_empty());
}

#[test]
pub fn datasets_without_the_candidate_are_skipped() {
    let mut registry = DatasetRegistry::new(Vec::new());
    registry.insert(ResultTable::new(
        DatasetKey::new("beem", "sl-ldd"),
        "beem_sloan_stats_ldd.csv",
        vec![ResultRecord::new("m1", REC, Some(1.0))],
    ));
    registry.insert(ResultTable::new(
        DatasetKey::new("prom", "sl-ldd"),
        "promela_sloan_stats_ldd.csv",
        vec![
            ResultRecord::new("p1", REC, Some(2.0)),
            ResultRecord::new("p1", REC_PAR, Some(4.0)).with_merge_time(1.0),
        ],
    ));

    let buckets = Comparator::new(&registry)
        .merge_overhead(&["beem", "prom"], &request())
        .unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].size, 1);
    assert_eq!(buckets[0].avg_reach, 2.0);
    assert_eq!(buckets[0].avg_merge, 0.5);
}
