use crate::{
    compare::{join, Comparator, JoinMode, Selection},
    error::AnalysisError,
    record::{ResultRecord, StrategyId},
};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupRequest {
    pub config: String,
    pub strategy: StrategyId,
    /// runs faster than this are dropped before joining, they only add noise
    pub min_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Speedup {
    pub dataset: String,
    pub benchmark: String,
    pub workers: u32,
    pub speedup: f64,
}

/// Speedups relative to a single worker, grouped by worker count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedupSeries {
    pub groups: BTreeMap<u32, Vec<Speedup>>,
}

impl SpeedupSeries {
    pub fn worker_counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    pub fn speedups(&self, workers: u32) -> Vec<f64> {
        self.groups
            .get(&workers)
            .map(|group| group.iter().map(|speedup| speedup.speedup).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Speedup> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Comparator<'a> {
    /// Join every N-worker run of a strategy with its 1-worker run and compute
    /// `time(1 worker) / time(N workers)` per benchmark.
    #[instrument(skip(self, datasets), level = "debug")]
    pub fn speedups<S: AsRef<str>>(
        &self,
        datasets: &[S],
        request: &SpeedupRequest,
    ) -> Result<SpeedupSeries, AnalysisError> {
        let selection = Selection::new(request.config.as_str(), request.strategy);
        let mut series = SpeedupSeries::default();

        self.for_each_dataset(datasets, &[&selection], |dataset, selected| {
            let by_workers = selected
                .iter()
                .flatten()
                .filter(|record| record.reach_time.map_or(false, |time| time >= request.min_time))
                .fold(BTreeMap::<u32, Vec<&ResultRecord>>::new(), |mut groups, record| {
                    groups.entry(record.workers).or_default().push(*record);
                    groups
                });

            let Some(single) = by_workers.get(&1) else {
                warn!(
                    dataset = dataset,
                    strategy = request.strategy,
                    "No single worker runs to compute speedups against"
                );
                return;
            };

            for (workers, group) in by_workers.iter().filter(|(workers, _)| **workers > 1) {
                let speedups = join(group, single, JoinMode::Inner)
                    .into_iter()
                    .filter_map(|(parallel, sequential)| {
                        let parallel = parallel?;
                        let base = sequential?.reach_time?;
                        let time = parallel.reach_time?;

                        Some(Speedup {
                            dataset: dataset.to_owned(),
                            benchmark: parallel.benchmark.clone(),
                            workers: *workers,
                            speedup: if time == 0.0 { f64::NAN } else { base / time },
                        })
                    })
                    .collect::<Vec<_>>();

                debug!(dataset = dataset, workers = workers, speedups = speedups.len(), "Joined");
                series.groups.entry(*workers).or_default().extend(speedups);
            }
        })?;

        Ok(series)
    }
}
