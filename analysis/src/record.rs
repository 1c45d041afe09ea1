use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, path::PathBuf};

/// Numeric identifier of a reachability strategy as written by the benchmark tools
pub type StrategyId = u32;

/// (dataset, configuration) pair identifying a single result table, e.g. `(beem, sl-bdd)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub dataset: String,
    pub config: String,
}

impl DatasetKey {
    pub fn new(dataset: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            config: config.into(),
        }
    }

    /// diagram type encoded at the end of the configuration label
    pub fn diagram(&self) -> Option<DiagramType> {
        DiagramType::from_label(&self.config)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dataset, self.config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramType {
    Bdd,
    Ldd,
}

impl DiagramType {
    pub fn from_label(label: &str) -> Option<Self> {
        if label.ends_with("bdd") {
            Some(Self::Bdd)
        } else if label.ends_with("ldd") {
            Some(Self::Ldd)
        } else {
            None
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bdd => write!(f, "bdd"),
            Self::Ldd => write!(f, "ldd"),
        }
    }
}

/// A single reachability run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub benchmark: String,
    pub strategy: StrategyId,
    pub workers: u32,
    /// `None` if the run did not finish
    pub reach_time: Option<f64>,
    pub merge_time: f64,
    pub final_states: Option<f64>,
    pub final_nodecount: Option<u64>,
}

impl ResultRecord {
    pub fn new(benchmark: impl Into<String>, strategy: StrategyId, reach_time: Option<f64>) -> Self {
        Self {
            benchmark: benchmark.into(),
            strategy,
            workers: 1,
            reach_time,
            merge_time: 0.0,
            final_states: None,
            final_nodecount: None,
        }
    }

    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_merge_time(mut self, merge_time: f64) -> Self {
        self.merge_time = merge_time;
        self
    }

    pub fn with_counts(mut self, final_states: Option<f64>, final_nodecount: Option<u64>) -> Self {
        self.final_states = final_states;
        self.final_nodecount = final_nodecount;
        self
    }

    /// Reach time, plus the merge overhead if requested. `None` for runs that did not finish.
    pub fn metric(&self, include_merge_time: bool) -> Option<f64> {
        self.reach_time.map(|reach| {
            if include_merge_time {
                reach + self.merge_time
            } else {
                reach
            }
        })
    }
}

/// All records of one (dataset, configuration) pair in file order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub key: DatasetKey,
    pub path: PathBuf,
    pub records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new(key: DatasetKey, path: impl Into<PathBuf>, records: Vec<ResultRecord>) -> Self {
        Self {
            key,
            path: path.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    pub fn has_strategy(&self, strategy: StrategyId) -> bool {
        self.records.iter().any(|record| record.strategy == strategy)
    }

    /// records of `strategy`, optionally restricted to a worker count, in table order
    pub fn select(&self, strategy: StrategyId, workers: Option<u32>) -> Vec<&ResultRecord> {
        self.records
            .iter()
            .filter(|record| record.strategy == strategy)
            .filter(|record| workers.map_or(true, |workers| record.workers == workers))
            .collect()
    }

    pub fn worker_counts(&self) -> BTreeSet<u32> {
        self.records.iter().map(|record| record.workers).collect()
    }

    /// copy of this table without the records of the given benchmarks
    pub fn without_benchmarks<'a, I>(&self, benchmarks: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let excluded: BTreeSet<&str> = benchmarks.into_iter().collect();

        Self {
            key: self.key.clone(),
            path: self.path.clone(),
            records: self
                .records
                .iter()
                .filter(|record| !excluded.contains(record.benchmark.as_str()))
                .cloned()
                .collect(),
        }
    }
}
