use crate::{
    compare::{join, Bounds, Comparator, Comparison, ComparisonRequest, JoinMode, Outcome, Selection},
    error::{AnalysisError, MissingSelection},
    loader::DatasetRegistry,
    record::{DatasetKey, ResultRecord, ResultTable},
    strategy::StrategyRegistry,
};

const A: u32 = 0;
const B: u32 = 2;

fn registry() -> DatasetRegistry {
    let mut registry = DatasetRegistry::new(Vec::new());

    registry.insert(ResultTable::new(
        DatasetKey::new("dve", "vanilla"),
        "dve_vanilla.csv",
        vec![
            ResultRecord::new("m1", A, Some(5.0)),
            ResultRecord::new("m1", B, Some(2.0)).with_merge_time(0.5),
            ResultRecord::new("m2", A, Some(3.0)),
            ResultRecord::new("m3", B, None),
        ],
    ));
    registry.insert(ResultTable::new(
        DatasetKey::new("ptri", "vanilla"),
        "ptri_vanilla.csv",
        vec![
            ResultRecord::new("n1", A, Some(10.0)),
            ResultRecord::new("n1", B, Some(2.5)),
            ResultRecord::new("n1", B, Some(4.0)).with_workers(2),
        ],
    ));

    registry
}

fn request(join: JoinMode) -> ComparisonRequest {
    ComparisonRequest {
        left: Selection::new("vanilla", A),
        right: Selection::new("vanilla", B),
        join,
        include_merge_time: false,
    }
}

#[test]
pub fn inner_join_keeps_common_benchmarks() {
    let registry = registry();
    let results = Comparator::new(&registry)
        .compare("dve", &request(JoinMode::Inner))
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].benchmark, "m1");
    assert_eq!(results[0].left, Outcome::Completed(5.0));
    assert_eq!(results[0].right, Outcome::Completed(2.0));
    assert_eq!(results[0].ratio(), 0.4);
}

#[test]
pub fn outer_join_keeps_every_benchmark() {
    let registry = registry();
    let results = Comparator::new(&registry)
        .compare("dve", &request(JoinMode::Outer))
        .unwrap();

    let names: Vec<&str> = results.iter().map(|result| result.benchmark.as_str()).collect();
    assert_eq!(names, vec!["m1", "m2", "m3"]);

    assert_eq!(results[1].left, Outcome::Completed(3.0));
    assert_eq!(results[1].right, Outcome::Missing);
    assert_eq!(results[2].left, Outcome::Missing);
    assert_eq!(results[2].right, Outcome::Missing);
    assert!(results[1].ratio().is_nan());
}

#[test]
pub fn inner_join_is_subset_of_outer_join() {
    let registry = registry();
    let comparator = Comparator::new(&registry);
    let datasets = ["dve", "ptri"];

    let inner = comparator
        .compare_across(&datasets, &request(JoinMode::Inner))
        .unwrap();
    let outer = comparator
        .compare_across(&datasets, &request(JoinMode::Outer))
        .unwrap();

    assert!(inner.benchmarks().is_subset(&outer.benchmarks()));
    assert!(inner.completed().count() <= outer.len());
}

#[test]
pub fn ratio_is_right_over_left() {
    let registry = registry();
    let request = ComparisonRequest {
        left: Selection::new("vanilla", A),
        right: Selection::new("vanilla", B).with_workers(1),
        join: JoinMode::Inner,
        include_merge_time: false,
    };
    let comparison = Comparator::new(&registry)
        .compare_across(&["ptri"], &request)
        .unwrap();

    assert_eq!(comparison.ratios(), vec![0.25]);
    assert_eq!(comparison.names(), vec!["n1"]);
}

#[test]
pub fn duplicate_benchmarks_pair_up_per_match() {
    let registry = registry();
    let comparison = Comparator::new(&registry)
        .compare_across(&["ptri"], &request(JoinMode::Inner))
        .unwrap();

    assert_eq!(comparison.ratios(), vec![0.25, 0.4]);
}

#[test]
pub fn merge_time_is_added_on_request() {
    let registry = registry();
    let request = ComparisonRequest {
        include_merge_time: true,
        ..request(JoinMode::Inner)
    };
    let results = Comparator::new(&registry).compare("dve", &request).unwrap();

    assert_eq!(results[0].right, Outcome::Completed(2.5));
    assert_eq!(results[0].ratio(), 0.5);
}

#[test]
pub fn multiple_datasets_are_concatenated_in_order() {
    let registry = registry();
    let comparison = Comparator::new(&registry)
        .compare_across(&["ptri", "dve"], &request(JoinMode::Outer))
        .unwrap();

    let datasets: Vec<&str> = comparison.iter().map(|result| result.dataset.as_str()).collect();
    assert_eq!(datasets, vec!["ptri", "ptri", "dve", "dve", "dve"]);
    assert_eq!(comparison.for_dataset("dve").count(), 3);
}

#[test]
pub fn missing_datasets_are_skipped() {
    let registry = registry();
    let comparison = Comparator::new(&registry)
        .compare_across(&["beem", "dve"], &request(JoinMode::Inner))
        .unwrap();

    assert_eq!(comparison.datasets().into_iter().collect::<Vec<_>>(), vec!["dve"]);
}

#[test]
pub fn datasets_without_the_strategy_are_skipped() {
    let registry = registry();
    let request = ComparisonRequest {
        left: Selection::new("vanilla", A),
        right: Selection::new("vanilla", B).with_workers(2),
        join: JoinMode::Inner,
        include_merge_time: false,
    };
    let comparator = Comparator::new(&registry);

    let comparison = comparator.compare_across(&["dve", "ptri"], &request).unwrap();
    assert_eq!(comparison.ratios(), vec![0.4]);

    assert!(matches!(
        comparator.compare_across(&["dve"], &request),
        Err(AnalysisError::SelectionNotFound(MissingSelection::Workers { workers: 2, .. }))
    ));
}

#[test]
pub fn no_matching_dataset_is_an_error() {
    let registry = registry();
    let result = Comparator::new(&registry).compare_across(&["beem"], &request(JoinMode::Inner));

    match result {
        Err(AnalysisError::SelectionNotFound(MissingSelection::Dataset(key))) => {
            assert_eq!(key, DatasetKey::new("beem", "vanilla"))
        }
        other => panic!("expected missing dataset, got {other:?}"),
    }
}

#[test]
pub fn unknown_strategy_name_is_an_error() {
    let strategies = StrategyRegistry::default();

    assert!(matches!(
        strategies.resolve("dfs"),
        Err(AnalysisError::SelectionNotFound(MissingSelection::StrategyName(name))) if name == "dfs"
    ));
}

#[test]
pub fn strategy_without_records_is_an_error() {
    let registry = registry();
    let comparator = Comparator::new(&registry);

    assert!(matches!(
        comparator.select("dve", &Selection::new("vanilla", 104)),
        Err(AnalysisError::SelectionNotFound(MissingSelection::Strategy { strategy: 104, .. }))
    ));
    assert!(matches!(
        comparator.select("dve", &Selection::new("vanilla", B).with_workers(8)),
        Err(AnalysisError::SelectionNotFound(MissingSelection::Workers { workers: 8, .. }))
    ));
}

#[test]
pub fn missing_sides_are_drawn_at_the_sentinel() {
    let registry = registry();
    let comparison = Comparator::new(&registry)
        .compare_across(&["dve"], &request(JoinMode::Outer))
        .unwrap();

    assert_eq!(
        comparison.pairs(600.0),
        vec![(5.0, 2.0), (3.0, 600.0), (600.0, 600.0)]
    );
    assert_eq!(
        comparison.bounds(600.0),
        Some(Bounds {
            min: 2.0,
            max: 600.0
        })
    );
    assert_eq!(comparison.completed().count(), 1);
}

#[test]
pub fn empty_comparison_has_no_bounds() {
    assert_eq!(Comparison::default().bounds(600.0), None);
}

#[test]
pub fn join_orders_left_then_right_only() {
    let left = [
        ResultRecord::new("b", A, Some(1.0)),
        ResultRecord::new("a", A, Some(2.0)),
    ];
    let right = [
        ResultRecord::new("c", B, Some(3.0)),
        ResultRecord::new("a", B, Some(4.0)),
    ];
    let left: Vec<&ResultRecord> = left.iter().collect();
    let right: Vec<&ResultRecord> = right.iter().collect();

    let names = |mode| {
        join(&left, &right, mode)
            .into_iter()
            .map(|(l, r)| {
                (
                    l.map(|record| record.benchmark.as_str()),
                    r.map(|record| record.benchmark.as_str()),
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(names(JoinMode::Inner), vec![(Some("a"), Some("a"))]);
    assert_eq!(
        names(JoinMode::Outer),
        vec![
            (Some("b"), None),
            (Some("a"), Some("a")),
            (None, Some("c"))
        ]
    );
}
