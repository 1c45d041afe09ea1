//! CSV outputs of the analysis jobs, one file per job.

use crate::error::RunError;
use reachbench_analysis::{
    checker::ConsistencyReport, compare::Comparison, matrix::LocalityPoint,
    overhead::OverheadBucket, speedup::SpeedupSeries,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ComparisonRow<'a> {
    dataset: &'a str,
    benchmark: &'a str,
    left: f64,
    right: f64,
    left_timeout: bool,
    right_timeout: bool,
    ratio: f64,
}

#[derive(Debug, Serialize)]
struct DisagreementRow<'a> {
    dataset: &'a str,
    config: &'a str,
    benchmark: &'a str,
    field: String,
    expected: f64,
    actual: f64,
}

#[derive(Debug, Serialize)]
struct SpeedupRow<'a> {
    dataset: &'a str,
    benchmark: &'a str,
    workers: u32,
    speedup: f64,
}

#[derive(Debug, Serialize)]
struct OverheadRow {
    lower: f64,
    upper: f64,
    size: usize,
    avg_reach: f64,
    avg_merge: f64,
}

#[derive(Debug, Serialize)]
struct LocalityRow<'a> {
    dataset: &'a str,
    benchmark: &'a str,
    metric: f64,
    ratio: f64,
}

fn write_rows<T, I>(path: &Path, rows: I) -> Result<PathBuf, RunError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let failed = |source: csv::Error| RunError::Report {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(failed)?;
    let mut count = 0;

    for row in rows {
        writer.serialize(row).map_err(failed)?;
        count += 1;
    }

    writer.flush().map_err(|source| failed(source.into()))?;
    debug!(rows = count, "Wrote {}", path.display());

    Ok(path.to_path_buf())
}

/// Missing sides are written as `sentinel` and flagged as timeout
pub fn comparison(path: &Path, comparison: &Comparison, sentinel: f64) -> Result<PathBuf, RunError> {
    write_rows(
        path,
        comparison.iter().map(|result| ComparisonRow {
            dataset: &result.dataset,
            benchmark: &result.benchmark,
            left: result.left.or_sentinel(sentinel),
            right: result.right.or_sentinel(sentinel),
            left_timeout: result.left.is_missing(),
            right_timeout: result.right.is_missing(),
            ratio: result.ratio(),
        }),
    )
}

pub fn consistency(path: &Path, report: &ConsistencyReport) -> Result<PathBuf, RunError> {
    write_rows(
        path,
        report.disagreements.iter().map(|disagreement| DisagreementRow {
            dataset: &disagreement.key.dataset,
            config: &disagreement.key.config,
            benchmark: &disagreement.benchmark,
            field: disagreement.field.to_string(),
            expected: disagreement.expected,
            actual: disagreement.actual,
        }),
    )
}

pub fn speedups(path: &Path, series: &SpeedupSeries) -> Result<PathBuf, RunError> {
    write_rows(
        path,
        series.iter().map(|speedup| SpeedupRow {
            dataset: &speedup.dataset,
            benchmark: &speedup.benchmark,
            workers: speedup.workers,
            speedup: speedup.speedup,
        }),
    )
}

pub fn overhead(path: &Path, buckets: &[OverheadBucket]) -> Result<PathBuf, RunError> {
    write_rows(
        path,
        buckets.iter().map(|bucket| OverheadRow {
            lower: bucket.lower,
            upper: bucket.upper,
            size: bucket.size,
            avg_reach: bucket.avg_reach,
            avg_merge: bucket.avg_merge,
        }),
    )
}

pub fn locality(path: &Path, points: &[LocalityPoint]) -> Result<PathBuf, RunError> {
    write_rows(
        path,
        points.iter().map(|point| LocalityRow {
            dataset: &point.dataset,
            benchmark: &point.benchmark,
            metric: point.metric,
            ratio: point.ratio,
        }),
    )
}
