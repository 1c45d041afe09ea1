use crate::config::RunConfig;
use reachbench_analysis::{compare::JoinMode, matrix::LocalityMetric, DatasetKey};
use std::path::PathBuf;

fn parse(yaml: &str) -> RunConfig {
    serde_yaml::from_str(yaml).unwrap()
}

fn with_data(yaml: &str) -> (tempfile::TempDir, RunConfig) {
    let directory = tempfile::tempdir().unwrap();
    let mut config = parse(yaml);
    config.data.path = directory.path().to_path_buf();

    (directory, config)
}

#[test]
pub fn defaults() {
    let config = parse("{}");

    assert_eq!(config.data.path, PathBuf::from("bench_data"));
    assert_eq!(config.output.maxtime, 600.0);
    assert_eq!(config.datasets, vec!["beem", "ptri", "prom"]);
    assert_eq!(config.table_specs().len(), 15);
    assert!(config.comparisons.is_empty());
}

#[test]
pub fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<RunConfig>("databse: {}").is_err());
    assert!(serde_yaml::from_str::<RunConfig>("output: { maxtme: 10 }").is_err());
}

#[test]
pub fn comparison_requests_resolve_strategies() {
    let config = parse(
        "
strategies:
  rec-par-x: 15
comparisons:
  rec_vs_par:
    left: { config: sl-bdd, strategy: rec }
    right: { config: sl-bdd, strategy: rec-par-x, workers: 4 }
    join: outer
    merge_time: true
",
    );
    let strategies = config.strategy_registry();
    let request = config.comparisons["rec_vs_par"].request(&strategies).unwrap();

    assert_eq!(request.left.strategy, 4);
    assert_eq!(request.right.strategy, 15);
    assert_eq!(request.right.workers, Some(4));
    assert_eq!(request.join, JoinMode::Outer);
    assert!(request.include_merge_time);
}

#[test]
pub fn configured_tables_replace_defaults() {
    let config = parse(
        "
tables:
  - { dataset: dve, config: vanilla, file: dve.csv }
",
    );
    let specs = config.table_specs();

    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].key, DatasetKey::new("dve", "vanilla"));
    assert_eq!(specs[0].file, PathBuf::from("dve.csv"));
}

#[test]
pub fn preflight_reports_unknown_strategies() {
    let (_directory, mut config) = with_data(
        "
comparisons:
  typo:
    left: { config: sl-bdd, strategy: rec }
    right: { config: sl-bdd, strategy: recc }
",
    );

    assert!(config.preflight_checks());
}

#[test]
pub fn preflight_fills_fallbacks() {
    let (_directory, mut config) = with_data(
        "
datasets: [beem, ptri]
comparisons:
  rec_vs_sat:
    left: { config: sl-bdd, strategy: sat }
    right: { config: sl-bdd, strategy: rec }
speedups:
  par:
    config: sl-bdd
    strategy: rec-par
    datasets: [prom]
locality:
  sloan:
    comparison: rec_vs_sat
    config: sl-bdd
",
    );

    assert!(!config.preflight_checks());
    assert_eq!(config.comparisons["rec_vs_sat"].datasets, vec!["beem", "ptri"]);
    assert_eq!(config.speedups["par"].datasets, vec!["prom"]);
    assert_eq!(config.locality["sloan"].metrics, LocalityMetric::ALL.to_vec());
}

#[test]
pub fn preflight_rejects_invalid_values() {
    let (_directory, mut config) = with_data(
        "
output: { maxtime: 0 }
locality:
  sloan:
    comparison: missing
    config: sl-bdd
    metrics: [rel-density]
",
    );

    assert!(config.preflight_checks());

    let mut config = parse("data: { path: /definitely/not/here }");
    assert!(config.preflight_checks());
}
