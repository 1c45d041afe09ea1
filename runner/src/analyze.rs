use crate::{config::RunConfig, error::RunError, report};
use reachbench_analysis::{
    matrix::MatrixStore,
    reference::{compare_with_reference, cross_check, without_disagreements, ReferenceTable},
    stats::{linear_regression, median},
    Comparator, Comparison, ConsistencyChecker, DatasetKey, DatasetRegistry,
};
use std::{collections::BTreeMap, fs, path::PathBuf};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub tables: usize,
    pub disagreements: usize,
    pub written: Vec<PathBuf>,
    /// tables that failed to load and jobs that could not run, each was logged
    pub failed: usize,
}

/// Load the batch in `config.data.path`, check it and run every configured job.
///
/// A job failing on missing data is logged and counted, it does not stop the others.
#[instrument(skip_all, fields(data = %config.data.path.display()), level = "info")]
pub fn analyze(config: &RunConfig) -> Result<Summary, RunError> {
    let strategies = config.strategy_registry();
    let (mut registry, outcome) = DatasetRegistry::load(&config.data.path, config.table_specs());

    info!(
        loaded = outcome.loaded.len(),
        skipped = outcome.skipped.len(),
        failed = outcome.failed.len(),
        "Loaded result tables"
    );
    if !outcome.has_expected(config.data.expected) {
        return Err(RunError::MissingTables {
            loaded: outcome.loaded.len(),
            expected: config.data.expected,
        });
    }

    let output = &config.output.path;
    fs::create_dir_all(output).map_err(|source| RunError::Output {
        path: output.clone(),
        source,
    })?;

    let checker = match config.check.significant_digits {
        Some(digits) => ConsistencyChecker::with_rounding(digits),
        None => ConsistencyChecker::new(),
    };
    let consistency = checker.check(&registry);
    consistency.log();

    let mut summary = Summary {
        tables: registry.len(),
        disagreements: consistency.disagreements.len(),
        written: vec![report::consistency(&output.join("consistency.csv"), &consistency)?],
        failed: outcome.failed.len(),
    };

    // references may replace tables, so they run before anything borrows the registry
    for (name, reference) in config.references.iter() {
        let key = DatasetKey::new(reference.dataset.as_str(), reference.config.as_str());
        let strategy = strategies.resolve(&reference.strategy)?;
        let (its, table) = match ReferenceTable::load(&reference.file)
            .and_then(|its| Ok((its, registry.table(&key)?.clone())))
        {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(reference = name.as_str(), "Skipped reference: {e}");
                summary.failed += 1;
                continue;
            }
        };

        let disagreements = cross_check(&table, &its, reference.significant_digits);
        summary.disagreements += disagreements.len();

        let table = if reference.exclude_disagreements {
            let filtered = without_disagreements(&table, &disagreements);
            registry.insert(filtered.clone());
            filtered
        } else {
            table
        };

        let comparison = match compare_with_reference(&table, strategy, &its, &reference.kind) {
            Ok(comparison) => comparison,
            Err(e) => {
                error!(reference = name.as_str(), "Skipped reference: {e}");
                summary.failed += 1;
                continue;
            }
        };
        summary.written.push(report::comparison(
            &output.join(format!("reference_{name}.csv")),
            &comparison,
            config.output.maxtime,
        )?);
    }

    let comparator = Comparator::new(&registry);
    let mut comparisons: BTreeMap<&str, Comparison> = BTreeMap::new();

    for (name, job) in config.comparisons.iter() {
        let request = job.request(&strategies)?;

        match comparator.compare_across(job.datasets.as_slice(), &request) {
            Ok(comparison) => {
                info!(
                    comparison = name.as_str(),
                    results = comparison.len(),
                    completed = comparison.completed().count(),
                    "Compared"
                );
                summary.written.push(report::comparison(
                    &output.join(format!("comparison_{name}.csv")),
                    &comparison,
                    config.output.maxtime,
                )?);
                comparisons.insert(name.as_str(), comparison);
            }
            Err(e) => {
                error!(comparison = name.as_str(), "Skipped comparison: {e}");
                summary.failed += 1;
            }
        }
    }

    for (name, job) in config.speedups.iter() {
        let request = job.request(&strategies)?;

        match comparator.speedups(job.datasets.as_slice(), &request) {
            Ok(series) => {
                for workers in series.worker_counts() {
                    info!(
                        speedup = name.as_str(),
                        workers = workers,
                        median = ?median(&series.speedups(workers)),
                        "Speedup over a single worker"
                    );
                }
                summary.written.push(report::speedups(
                    &output.join(format!("speedup_{name}.csv")),
                    &series,
                )?);
            }
            Err(e) => {
                error!(speedup = name.as_str(), "Skipped speedup: {e}");
                summary.failed += 1;
            }
        }
    }

    for (name, job) in config.overheads.iter() {
        let request = job.request(&strategies)?;

        match comparator.merge_overhead(job.datasets.as_slice(), &request) {
            Ok(buckets) => {
                summary.written.push(report::overhead(
                    &output.join(format!("overhead_{name}.csv")),
                    &buckets,
                )?);
            }
            Err(e) => {
                error!(overhead = name.as_str(), "Skipped overhead: {e}");
                summary.failed += 1;
            }
        }
    }

    for (name, job) in config.locality.iter() {
        let Some(comparison) = comparisons.get(job.comparison.as_str()) else {
            warn!(
                locality = name.as_str(),
                "Comparison {} did not run, skipping",
                job.comparison
            );
            summary.failed += 1;
            continue;
        };
        let store = MatrixStore::new(job.models.as_path());

        for metric in job.metrics.iter().copied() {
            let points = match store.locality(comparison, &job.config, metric) {
                Ok(points) => points,
                Err(e) => {
                    error!(locality = name.as_str(), metric = %metric, "Skipped metric: {e}");
                    summary.failed += 1;
                    continue;
                }
            };

            let trend = linear_regression(
                &points
                    .iter()
                    .map(|point| (point.metric, point.ratio))
                    .collect::<Vec<_>>(),
            );
            match trend {
                Some(trend) => info!(
                    locality = name.as_str(),
                    metric = %metric,
                    slope = trend.slope,
                    intercept = trend.intercept,
                    r = trend.r,
                    "Trend of {} against ratio",
                    metric.label()
                ),
                None => warn!(locality = name.as_str(), metric = %metric, "Not enough points for a trend"),
            }

            summary.written.push(report::locality(
                &output.join(format!("locality_{name}_{metric}.csv")),
                &points,
            )?);
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed,
        "Analysis done"
    );

    Ok(summary)
}
