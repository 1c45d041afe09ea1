use crate::{
    compare::Outcome,
    error::{AnalysisError, MissingSelection},
    record::{DatasetKey, ResultRecord, ResultTable},
    reference::{
        compare_with_reference, cross_check, strip_diagram_suffix, without_disagreements,
        ReferenceTable,
    },
};
use std::path::Path;

const ITS: &str = "benchmark,type,time,memory_kb,states
philo.5,.gal,1.5,1024,1234568
philo.5,RD,0,1024,1234568
mutex.3,.gal,0.2,512,7
ring.2,.gal,30,2048,99
";

fn reference() -> ReferenceTable {
    ReferenceTable::read(Path::new("its.csv"), ITS.as_bytes()).unwrap()
}

fn table() -> ResultTable {
    ResultTable::new(
        DatasetKey::new("ptri", "sl-bdd"),
        "petrinets_sloan_stats_bdd.csv",
        vec![
            ResultRecord::new("philo.5.bdd", 2, Some(3.0)).with_counts(Some(1234567.0), None),
            ResultRecord::new("mutex.3.bdd", 2, Some(0.1)).with_counts(Some(8.0), None),
            ResultRecord::new("lift.4.bdd", 2, Some(1.0)),
        ],
    )
}

#[test]
pub fn aggregator_columns_are_accepted() {
    let reference = reference();

    assert_eq!(reference.records.len(), 4);
    assert_eq!(reference.records[0].kind, ".gal");
    assert_eq!(reference.records[0].reach_time, Some(1.5));
    assert_eq!(reference.records[0].final_states, Some(1234568.0));
    assert_eq!(reference.of_kind("RD").count(), 1);
}

#[test]
pub fn missing_time_column_is_malformed() {
    assert!(matches!(
        ReferenceTable::read(Path::new("its.csv"), "benchmark,states\na,1\n".as_bytes()),
        Err(AnalysisError::MalformedData { row: 1, .. })
    ));
}

#[test]
pub fn diagram_suffix_is_stripped() {
    assert_eq!(strip_diagram_suffix("philo.5.bdd"), "philo.5");
    assert_eq!(strip_diagram_suffix("philo.5.ldd"), "philo.5");
    assert_eq!(strip_diagram_suffix("philo.5"), "philo.5");
}

#[test]
pub fn state_counts_agree_after_rounding() {
    let disagreements = cross_check(&table(), &reference(), 6);

    assert_eq!(disagreements.len(), 1);
    assert_eq!(disagreements[0].benchmark, "mutex.3");
    assert_eq!(disagreements[0].table_states, 8.0);
    assert_eq!(disagreements[0].reference_states, 7.0);

    assert_eq!(cross_check(&table(), &reference(), 7).len(), 3);
}

#[test]
pub fn disagreeing_benchmarks_are_removed() {
    let table = table();
    let disagreements = cross_check(&table, &reference(), 6);
    let filtered = without_disagreements(&table, &disagreements);

    let names: Vec<&str> = filtered.iter().map(|record| record.benchmark.as_str()).collect();
    assert_eq!(names, vec!["philo.5.bdd", "lift.4.bdd"]);
}

#[test]
pub fn reference_comparison_is_an_outer_join() {
    let comparison = compare_with_reference(&table(), 2, &reference(), ".gal").unwrap();

    let names: Vec<&str> = comparison.names();
    assert_eq!(names, vec!["philo.5", "mutex.3", "ring.2", "lift.4"]);

    let ring = &comparison.results[2];
    assert_eq!(ring.left, Outcome::Completed(30.0));
    assert_eq!(ring.right, Outcome::Missing);

    assert_eq!(comparison.results[0].ratio(), 2.0);
    assert_eq!(comparison.results[3].left, Outcome::Missing);
}

#[test]
pub fn reference_runs_without_time_are_excluded() {
    let comparison = compare_with_reference(&table(), 2, &reference(), "RD").unwrap();

    let names: Vec<&str> = comparison.names();
    assert_eq!(names, vec!["philo.5", "mutex.3", "lift.4"]);
    assert!(comparison.iter().all(|result| result.left.is_missing()));
}

#[test]
pub fn unknown_reference_type_is_an_error() {
    // aggregated ITS statistics carry no type column
    let its = ReferenceTable::read(
        Path::new("its_stats.csv"),
        "benchmark,time,memory_kb,states\nphilo.5,1.5,1024,1234568\n".as_bytes(),
    )
    .unwrap();

    match compare_with_reference(&table(), 2, &its, ".gal") {
        Err(AnalysisError::SelectionNotFound(MissingSelection::ReferenceKind { path, kind })) => {
            assert_eq!(path, Path::new("its_stats.csv"));
            assert_eq!(kind, ".gal");
        }
        other => panic!("expected missing reference type, got {other:?}"),
    }
    assert!(compare_with_reference(&table(), 2, &its, "").is_ok());
}

#[test]
pub fn strategy_without_runs_is_an_error() {
    assert!(matches!(
        compare_with_reference(&table(), 4, &reference(), ".gal"),
        Err(AnalysisError::SelectionNotFound(MissingSelection::Strategy { strategy: 4, .. }))
    ));
}
