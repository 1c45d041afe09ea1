use crate::{
    record::{DatasetKey, DiagramType, ResultRecord, ResultTable},
    strategy::{StrategyRegistry, DEFAULT_STRATEGIES},
};

#[test]
pub fn diagram_type_from_config_label() {
    assert_eq!(DatasetKey::new("beem", "sl-bdd").diagram(), Some(DiagramType::Bdd));
    assert_eq!(DatasetKey::new("ptri", "sl-static-9-ldd").diagram(), Some(DiagramType::Ldd));
    assert_eq!(DatasetKey::new("dve", "vanilla").diagram(), None);
    assert_eq!(DatasetKey::new("dve", "vanilla").to_string(), "(dve, vanilla)");
}

#[test]
pub fn metric_of_unfinished_run_is_none() {
    let finished = ResultRecord::new("m", 0, Some(2.0)).with_merge_time(0.25);
    let unfinished = ResultRecord::new("m", 0, None).with_merge_time(0.25);

    assert_eq!(finished.metric(false), Some(2.0));
    assert_eq!(finished.metric(true), Some(2.25));
    assert_eq!(unfinished.metric(true), None);
}

#[test]
pub fn table_selection() {
    let table = ResultTable::new(
        DatasetKey::new("beem", "sl-bdd"),
        "beem.csv",
        vec![
            ResultRecord::new("a", 14, Some(4.0)),
            ResultRecord::new("a", 14, Some(1.0)).with_workers(4),
            ResultRecord::new("b", 14, Some(2.0)),
            ResultRecord::new("b", 2, Some(3.0)),
        ],
    );

    assert_eq!(table.select(14, None).len(), 3);
    assert_eq!(table.select(14, Some(4)).len(), 1);
    assert!(table.has_strategy(2));
    assert!(!table.has_strategy(0));
    assert_eq!(table.worker_counts().into_iter().collect::<Vec<_>>(), vec![1, 4]);

    let without = table.without_benchmarks(["a"]);
    assert_eq!(without.len(), 2);
    assert!(without.iter().all(|record| record.benchmark == "b"));
}

#[test]
pub fn default_strategies_resolve() {
    let strategies = StrategyRegistry::default();

    for (name, id) in DEFAULT_STRATEGIES {
        assert_eq!(strategies.resolve(name).unwrap(), id);
        assert_eq!(strategies.name_of(id), Some(name));
    }
}

#[test]
pub fn experimental_strategies_can_be_registered() {
    let mut strategies = StrategyRegistry::empty();
    assert!(strategies.resolve("sat").is_err());

    assert_eq!(strategies.register("rec-par-x", 15), None);
    strategies.extend([("sat".to_owned(), 2)]);

    assert!(strategies.contains("rec-par-x"));
    assert_eq!(strategies.resolve("sat").unwrap(), 2);
    assert_eq!(strategies.iter().count(), 2);
}
