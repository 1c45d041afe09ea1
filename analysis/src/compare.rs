use crate::{
    error::{AnalysisError, MissingSelection},
    loader::DatasetRegistry,
    record::{DatasetKey, ResultRecord, StrategyId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// drop benchmarks missing on either side
    #[default]
    Inner,
    /// keep every benchmark, the absent side is `Outcome::Missing`
    Outer,
}

/// Which records of a dataset take part in a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub config: String,
    pub strategy: StrategyId,
    pub workers: Option<u32>,
}

impl Selection {
    pub fn new(config: impl Into<String>, strategy: StrategyId) -> Self {
        Self {
            config: config.into(),
            strategy,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn key(&self, dataset: &str) -> DatasetKey {
        DatasetKey::new(dataset, self.config.as_str())
    }
}

/// Per side value of a comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Completed(f64),
    /// no record, or a record without a reach time (timeout/ DNF)
    Missing,
}

impl Outcome {
    fn of(record: Option<&ResultRecord>, include_merge_time: bool) -> Self {
        match record.and_then(|record| record.metric(include_merge_time)) {
            Some(value) => Self::Completed(value),
            None => Self::Missing,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Completed(value) => Some(*value),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// value for plotting, missing runs are drawn at `sentinel`
    pub fn or_sentinel(&self, sentinel: f64) -> f64 {
        self.value().unwrap_or(sentinel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub dataset: String,
    pub benchmark: String,
    pub left: Outcome,
    pub right: Outcome,
}

impl ComparisonResult {
    /// `right / left`, NaN if either side is missing or left is zero
    pub fn ratio(&self) -> f64 {
        match (self.left, self.right) {
            (Outcome::Completed(left), Outcome::Completed(right)) if left != 0.0 => right / left,
            _ => f64::NAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub left: Selection,
    pub right: Selection,
    pub join: JoinMode,
    pub include_merge_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Results of one comparison over one or more datasets, in dataset order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub results: Vec<ComparisonResult>,
}

impl Comparison {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter()
    }

    /// benchmark names in result order, used to label points
    pub fn names(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|result| result.benchmark.as_str())
            .collect()
    }

    pub fn benchmarks(&self) -> BTreeSet<&str> {
        self.results
            .iter()
            .map(|result| result.benchmark.as_str())
            .collect()
    }

    pub fn datasets(&self) -> BTreeSet<&str> {
        self.results
            .iter()
            .map(|result| result.dataset.as_str())
            .collect()
    }

    pub fn for_dataset<'a>(&'a self, dataset: &'a str) -> impl Iterator<Item = &'a ComparisonResult> {
        self.results
            .iter()
            .filter(move |result| result.dataset == dataset)
    }

    /// (x, y) points with missing sides substituted by `sentinel`
    pub fn pairs(&self, sentinel: f64) -> Vec<(f64, f64)> {
        self.results
            .iter()
            .map(|result| (result.left.or_sentinel(sentinel), result.right.or_sentinel(sentinel)))
            .collect()
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.results.iter().map(ComparisonResult::ratio).collect()
    }

    /// results where both sides finished
    pub fn completed(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results
            .iter()
            .filter(|result| !result.left.is_missing() && !result.right.is_missing())
    }

    /// min/ max over both axes after sentinel substitution, `None` if empty
    pub fn bounds(&self, sentinel: f64) -> Option<Bounds> {
        self.pairs(sentinel)
            .into_iter()
            .flat_map(|(x, y)| [x, y])
            .fold(None, |bounds, value| match bounds {
                None => Some(Bounds {
                    min: value,
                    max: value,
                }),
                Some(Bounds { min, max }) => Some(Bounds {
                    min: min.min(value),
                    max: max.max(value),
                }),
            })
    }
}

/// Relational join of two record subsets on the benchmark name.
///
/// Pairs keep the order of `left`; an outer join appends the right-only records in the order of
/// `right`. Every matching (left, right) combination yields a pair.
pub fn join<'r>(
    left: &[&'r ResultRecord],
    right: &[&'r ResultRecord],
    mode: JoinMode,
) -> Vec<(Option<&'r ResultRecord>, Option<&'r ResultRecord>)> {
    let mut index: BTreeMap<&str, Vec<&'r ResultRecord>> = BTreeMap::new();
    for record in right {
        index.entry(record.benchmark.as_str()).or_default().push(*record);
    }

    let mut pairs = Vec::with_capacity(left.len());

    for record in left {
        match index.get(record.benchmark.as_str()) {
            Some(matches) => {
                pairs.extend(matches.iter().map(|matched| (Some(*record), Some(*matched))));
            }
            None if mode == JoinMode::Outer => pairs.push((Some(*record), None)),
            None => {}
        }
    }

    if mode == JoinMode::Outer {
        let left_names: BTreeSet<&str> = left.iter().map(|record| record.benchmark.as_str()).collect();

        pairs.extend(
            right
                .iter()
                .filter(|record| !left_names.contains(record.benchmark.as_str()))
                .map(|record| (None, Some(*record))),
        );
    }

    pairs
}

/// Selection, join and metric computation over a `DatasetRegistry`
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    registry: &'a DatasetRegistry,
}

impl<'a> Comparator<'a> {
    pub fn new(registry: &'a DatasetRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a DatasetRegistry {
        self.registry
    }

    /// Records of `dataset` matching `selection`.
    ///
    /// Fails if the table is not loaded, the strategy has no records in it or no record of the
    /// strategy ran with the requested worker count.
    pub fn select(
        &self,
        dataset: &str,
        selection: &Selection,
    ) -> Result<Vec<&'a ResultRecord>, AnalysisError> {
        let key = selection.key(dataset);
        let table = self.registry.table(&key)?;

        if !table.has_strategy(selection.strategy) {
            return Err(MissingSelection::Strategy {
                key,
                strategy: selection.strategy,
            }
            .into());
        }

        let records = table.select(selection.strategy, selection.workers);

        match selection.workers {
            Some(workers) if records.is_empty() => Err(MissingSelection::Workers {
                key,
                strategy: selection.strategy,
                workers,
            }
            .into()),
            _ => Ok(records),
        }
    }

    /// compare two selections within a single dataset
    pub fn compare(
        &self,
        dataset: &str,
        request: &ComparisonRequest,
    ) -> Result<Vec<ComparisonResult>, AnalysisError> {
        let left = self.select(dataset, &request.left)?;
        let right = self.select(dataset, &request.right)?;

        Ok(results(dataset, &left, &right, request))
    }

    /// Repeat `compare` for every dataset and concatenate the results.
    ///
    /// Datasets where one of the two selections cannot be resolved are skipped; if that leaves
    /// nothing to compare the first unresolved selection is reported.
    #[instrument(skip(self, datasets), level = "debug")]
    pub fn compare_across<S: AsRef<str>>(
        &self,
        datasets: &[S],
        request: &ComparisonRequest,
    ) -> Result<Comparison, AnalysisError> {
        let mut comparison = Comparison::default();

        self.for_each_dataset(datasets, &[&request.left, &request.right], |dataset, selected| {
            let results = results(dataset, &selected[0], &selected[1], request);
            debug!(dataset = dataset, results = results.len(), "Compared");

            comparison.results.extend(results);
        })?;

        Ok(comparison)
    }

    /// Select every one of `selections` in each dataset and hand the records to `job`, in
    /// the order of `selections`.
    ///
    /// A dataset where a selection cannot be resolved is skipped with a warning. Fails with the
    /// first unresolved selection only if no dataset was handed to `job`.
    pub(crate) fn for_each_dataset<S, F>(
        &self,
        datasets: &[S],
        selections: &[&Selection],
        mut job: F,
    ) -> Result<(), AnalysisError>
    where
        S: AsRef<str>,
        F: FnMut(&str, Vec<Vec<&'a ResultRecord>>),
    {
        let mut first_missing = None;
        let mut selected = 0;

        for dataset in datasets.iter().map(AsRef::as_ref) {
            let records = selections
                .iter()
                .map(|selection| self.select(dataset, selection))
                .collect::<Result<Vec<_>, _>>();

            match records {
                Ok(records) => {
                    job(dataset, records);
                    selected += 1;
                }
                Err(AnalysisError::SelectionNotFound(missing)) => {
                    warn!("Could not find data for {dataset} ({missing}), skipping");
                    first_missing.get_or_insert(missing);
                }
                Err(e) => return Err(e),
            }
        }

        match first_missing {
            Some(missing) if selected == 0 => Err(missing.into()),
            _ => Ok(()),
        }
    }
}

fn results(
    dataset: &str,
    left: &[&ResultRecord],
    right: &[&ResultRecord],
    request: &ComparisonRequest,
) -> Vec<ComparisonResult> {
    join(left, right, request.join)
        .into_iter()
        .filter_map(|(left, right)| {
            let benchmark = left.or(right)?.benchmark.clone();

            Some(ComparisonResult {
                dataset: dataset.to_owned(),
                benchmark,
                left: Outcome::of(left, request.include_merge_time),
                right: Outcome::of(right, request.include_merge_time),
            })
        })
        .collect()
}
