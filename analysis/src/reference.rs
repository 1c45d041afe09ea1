//! Cross-checks against an external reference tool (ITS-tools).
//!
//! The reference CSV has one row per benchmark and input type (`.gal`, `.img.gal`, `RD`, ...).
//! Column names follow either the result table (`reach_time`, `final_states`) or the raw
//! aggregator output (`time`, `states`).

use crate::{
    checker::round_significant,
    compare::{join, Comparison, ComparisonResult, JoinMode, Outcome},
    error::{AnalysisError, MissingSelection},
    loader::parse_measurement,
    record::{ResultRecord, ResultTable, StrategyId},
};
use csv::{ReaderBuilder, Trim};
use std::{
    collections::BTreeSet,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    pub benchmark: String,
    pub kind: String,
    pub reach_time: Option<f64>,
    pub final_states: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    pub path: PathBuf,
    pub records: Vec<ReferenceRecord>,
}

impl ReferenceTable {
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        if !path.is_file() {
            return Err(AnalysisError::MissingFile(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::read(path, file)
    }

    pub fn read<R: Read>(path: &Path, reader: R) -> Result<Self, AnalysisError> {
        let malformed = |row: u64, reason: String| AnalysisError::MalformedData {
            path: path.to_path_buf(),
            row,
            reason,
        };

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| malformed(1, e.to_string()))?
            .clone();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|header| names.iter().any(|name| *name == header))
        };

        let benchmark =
            find(&["benchmark"]).ok_or_else(|| malformed(1, "missing column 'benchmark'".into()))?;
        let time = find(&["reach_time", "time"])
            .ok_or_else(|| malformed(1, "missing column 'reach_time'".into()))?;
        let kind = find(&["type"]);
        let states = find(&["final_states", "states"]);

        let mut records = Vec::new();

        for row in reader.records() {
            let row = row.map_err(|e| {
                let line = e.position().map_or(0, |position| position.line());
                malformed(line, e.to_string())
            })?;
            let line = row.position().map_or(0, |position| position.line());
            let cell = |index: Option<usize>| index.and_then(|index| row.get(index)).unwrap_or("");

            records.push(ReferenceRecord {
                benchmark: cell(Some(benchmark)).to_owned(),
                kind: cell(kind).to_owned(),
                reach_time: parse_measurement(cell(Some(time)), "reach_time")
                    .map_err(|reason| malformed(line, reason))?,
                final_states: parse_measurement(cell(states), "final_states")
                    .map_err(|reason| malformed(line, reason))?,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ReferenceRecord> {
        self.records.iter().filter(move |record| record.kind == kind)
    }
}

/// benchmark name without the diagram file extension the reachability tools keep in it
pub fn strip_diagram_suffix(benchmark: &str) -> String {
    benchmark.replace(".ldd", "").replace(".bdd", "")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDisagreement {
    pub benchmark: String,
    pub strategy: StrategyId,
    pub kind: String,
    pub table_states: f64,
    pub reference_states: f64,
}

/// Compare state counts of `table` with the reference after rounding both to `digits`
/// significant digits. Benchmarks without a state count on either side are not compared.
#[instrument(skip_all, fields(key = %table.key), level = "info")]
pub fn cross_check(
    table: &ResultTable,
    reference: &ReferenceTable,
    digits: u32,
) -> Vec<ReferenceDisagreement> {
    let mut disagreements = Vec::new();

    for record in table.iter() {
        let Some(states) = record.final_states else {
            continue;
        };
        let benchmark = strip_diagram_suffix(&record.benchmark);

        for expected in reference.records.iter().filter(|expected| expected.benchmark == benchmark) {
            let Some(reference_states) = expected.final_states else {
                continue;
            };

            if round_significant(states, digits) != round_significant(reference_states, digits) {
                warn!(
                    benchmark = %benchmark,
                    "Reference disagrees on the number of states: {states} != {reference_states}"
                );

                disagreements.push(ReferenceDisagreement {
                    benchmark: benchmark.clone(),
                    strategy: record.strategy,
                    kind: expected.kind.clone(),
                    table_states: states,
                    reference_states,
                });
            }
        }
    }

    disagreements
}

/// copy of `table` without any benchmark the reference disagrees with
pub fn without_disagreements(table: &ResultTable, disagreements: &[ReferenceDisagreement]) -> ResultTable {
    let excluded: BTreeSet<&str> = disagreements
        .iter()
        .map(|disagreement| disagreement.benchmark.as_str())
        .collect();

    let benchmarks: Vec<&str> = table
        .iter()
        .filter(|record| excluded.contains(strip_diagram_suffix(&record.benchmark).as_str()))
        .map(|record| record.benchmark.as_str())
        .collect();

    info!(
        key = %table.key,
        removed = benchmarks.len(),
        "Removing benchmarks the reference disagrees with"
    );

    table.without_benchmarks(benchmarks)
}

/// Outer join of the reference runs of `kind` (x, left) with the `strategy` runs of `table`
/// (y, right). Reference runs reporting zero time are excluded.
///
/// Fails if the reference has no row of `kind` or `table` has no run of `strategy`.
pub fn compare_with_reference(
    table: &ResultTable,
    strategy: StrategyId,
    reference: &ReferenceTable,
    kind: &str,
) -> Result<Comparison, AnalysisError> {
    let (timed, untimed): (Vec<&ReferenceRecord>, Vec<&ReferenceRecord>) = reference
        .of_kind(kind)
        .partition(|record| record.reach_time != Some(0.0));

    if timed.is_empty() && untimed.is_empty() {
        return Err(MissingSelection::ReferenceKind {
            path: reference.path.clone(),
            kind: kind.to_owned(),
        }
        .into());
    }
    if !table.has_strategy(strategy) {
        return Err(MissingSelection::Strategy {
            key: table.key.clone(),
            strategy,
        }
        .into());
    }

    if !untimed.is_empty() {
        info!(
            kind = kind,
            benchmarks = ?untimed.iter().map(|record| record.benchmark.as_str()).collect::<Vec<_>>(),
            "Ignoring reference runs without time"
        );
    }

    let references: Vec<ResultRecord> = timed
        .iter()
        .map(|record| {
            ResultRecord::new(record.benchmark.as_str(), strategy, record.reach_time)
                .with_counts(record.final_states, None)
        })
        .collect();
    let runs: Vec<ResultRecord> = table
        .select(strategy, None)
        .into_iter()
        .map(|record| ResultRecord {
            benchmark: strip_diagram_suffix(&record.benchmark),
            ..record.clone()
        })
        .collect();

    let left: Vec<&ResultRecord> = references.iter().collect();
    let right: Vec<&ResultRecord> = runs.iter().collect();

    Ok(Comparison {
        results: join(&left, &right, JoinMode::Outer)
            .into_iter()
            .filter_map(|(reference, run)| {
                Some(ComparisonResult {
                    dataset: table.key.dataset.clone(),
                    benchmark: reference.or(run)?.benchmark.clone(),
                    left: reference
                        .and_then(|record| record.reach_time)
                        .map_or(Outcome::Missing, Outcome::Completed),
                    right: run
                        .and_then(|record| record.reach_time)
                        .map_or(Outcome::Missing, Outcome::Completed),
                })
            })
            .collect(),
    })
}
