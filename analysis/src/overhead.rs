use crate::{
    compare::{join, Comparator, JoinMode, Selection},
    error::AnalysisError,
    record::StrategyId,
    stats::mean,
};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct OverheadRequest {
    pub config: String,
    pub baseline: StrategyId,
    pub candidate: StrategyId,
}

/// Averages of all benchmarks whose baseline time falls into `[lower, upper)`
#[derive(Debug, Clone, PartialEq)]
pub struct OverheadBucket {
    pub lower: f64,
    pub upper: f64,
    pub size: usize,
    /// candidate reach time relative to the baseline reach time
    pub avg_reach: f64,
    /// candidate merge time relative to the baseline reach time
    pub avg_merge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OverheadPoint {
    baseline: f64,
    relative_reach: f64,
    relative_merge: f64,
}

impl<'a> Comparator<'a> {
    /// Relative merge overhead of `candidate` over `baseline`, bucketed by decades of the
    /// baseline reach time.
    #[instrument(skip(self, datasets), level = "debug")]
    pub fn merge_overhead<S: AsRef<str>>(
        &self,
        datasets: &[S],
        request: &OverheadRequest,
    ) -> Result<Vec<OverheadBucket>, AnalysisError> {
        let baseline = Selection::new(request.config.as_str(), request.baseline);
        let candidate = Selection::new(request.config.as_str(), request.candidate);
        let mut points = Vec::new();

        self.for_each_dataset(datasets, &[&candidate, &baseline], |_, selected| {
            points.extend(
                join(&selected[0], &selected[1], JoinMode::Inner)
                    .into_iter()
                    .filter_map(|(candidate, baseline)| {
                        let candidate = candidate?;
                        let base = baseline?.reach_time.filter(|time| *time > 0.0)?;

                        Some(OverheadPoint {
                            baseline: base,
                            relative_reach: candidate.reach_time? / base,
                            relative_merge: candidate.merge_time / base,
                        })
                    }),
            );
        })?;

        let buckets = bucket(&points);
        info!(
            sizes = ?buckets.iter().map(|bucket| bucket.size).collect::<Vec<_>>(),
            "Bucketed merge overhead"
        );

        Ok(buckets)
    }
}

/// Decade buckets `[10^e / 2, 10^e * 5)` from the smallest to the largest baseline time, empty
/// buckets are skipped
fn bucket(points: &[OverheadPoint]) -> Vec<OverheadBucket> {
    if points.is_empty() {
        return Vec::new();
    }

    let (min, max) = points.iter().fold((f64::INFINITY, 0f64), |(min, max), point| {
        (min.min(point.baseline), max.max(point.baseline))
    });

    let lowest = min.log10().floor() as i32;
    let highest = max.log10().ceil() as i32;

    (lowest..=highest)
        .filter_map(|exponent| {
            let decade = 10f64.powi(exponent);
            let (lower, upper) = (decade / 2.0, decade * 5.0);
            let selected: Vec<&OverheadPoint> = points
                .iter()
                .filter(|point| point.baseline >= lower && point.baseline < upper)
                .collect();

            let reach: Vec<f64> = selected.iter().map(|point| point.relative_reach).collect();
            let merge: Vec<f64> = selected.iter().map(|point| point.relative_merge).collect();

            Some(OverheadBucket {
                lower,
                upper,
                size: selected.len(),
                avg_reach: mean(&reach)?,
                avg_merge: mean(&merge)?,
            })
        })
        .collect()
}
