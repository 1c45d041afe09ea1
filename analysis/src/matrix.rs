//! Locality metrics of variable/ relation dependency matrices.
//!
//! Matrix files are written per benchmark as rows of `+`, `r`, `w` (variable is read and/ or
//! written by the relation) and `-` (not touched). LDD matrices can be ragged, shorter rows are
//! padded with unset entries.

use crate::{
    compare::Comparison,
    error::{AnalysisError, MissingSelection},
    record::DatasetKey,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    rows: Vec<Vec<bool>>,
    width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bandwidth {
    pub max: usize,
    pub avg: f64,
}

impl FromStr for IncidenceMatrix {
    type Err = std::convert::Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(text))
    }
}

impl IncidenceMatrix {
    pub fn parse(text: &str) -> Self {
        Self::from_rows(
            text.lines()
                .map(|line| {
                    line.chars()
                        .filter_map(|entry| match entry {
                            '+' | 'r' | 'w' => Some(true),
                            '-' => Some(false),
                            _ => None,
                        })
                        .collect()
                })
                .collect(),
        )
    }

    /// pad all rows to the longest one
    pub fn from_rows(mut rows: Vec<Vec<bool>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        rows.iter_mut().for_each(|row| row.resize(width, false));

        Self { rows, width }
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        debug!("Reading {}", path.display());

        let text = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&text))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width == 0
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(false)
    }

    pub fn ones(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|entry| **entry).count())
            .sum()
    }

    /// fraction of set entries, NaN for an empty matrix
    pub fn density(&self) -> f64 {
        self.ones() as f64 / (self.height() * self.width) as f64
    }

    /// Per row bandwidth is the distance from the first to the last set entry (inclusive), rows
    /// with less than two entries count as 1.
    pub fn bandwidth(&self) -> Bandwidth {
        let widths: Vec<usize> = self
            .rows
            .iter()
            .map(|row| {
                let first = row.iter().position(|entry| *entry);
                let last = row.iter().rposition(|entry| *entry);

                match (first, last) {
                    (Some(first), Some(last)) => last - first + 1,
                    _ => 1,
                }
            })
            .collect();

        Bandwidth {
            max: widths.iter().copied().max().unwrap_or(0),
            avg: widths.iter().sum::<usize>() as f64 / widths.len() as f64,
        }
    }

    /// Relation x relation matrix, entry (i, j) is set iff rows i and j share a set column
    pub fn relation_matrix(&self) -> Self {
        let packed: Vec<Vec<u64>> = self
            .rows
            .iter()
            .map(|row| {
                row.chunks(64)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .enumerate()
                            .fold(0u64, |word, (bit, entry)| word | ((*entry as u64) << bit))
                    })
                    .collect()
            })
            .collect();

        let rows = packed
            .iter()
            .map(|left| {
                packed
                    .iter()
                    .map(|right| left.iter().zip(right).any(|(l, r)| l & r != 0))
                    .collect()
            })
            .collect();

        Self::from_rows(rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalityMetric {
    VarAvgBw,
    VarMaxBw,
    VarDensity,
    RelAvgBw,
    RelMaxBw,
    RelDensity,
}

impl LocalityMetric {
    pub const ALL: [LocalityMetric; 6] = [
        Self::VarAvgBw,
        Self::VarMaxBw,
        Self::VarDensity,
        Self::RelAvgBw,
        Self::RelMaxBw,
        Self::RelDensity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::VarAvgBw => "var-avg-bw",
            Self::VarMaxBw => "var-max-bw",
            Self::VarDensity => "var-density",
            Self::RelAvgBw => "rel-avg-bw",
            Self::RelMaxBw => "rel-max-bw",
            Self::RelDensity => "rel-density",
        }
    }

    /// axis label
    pub fn label(&self) -> &'static str {
        match self {
            Self::VarAvgBw | Self::RelAvgBw => "average relative bandwidth",
            Self::VarMaxBw | Self::RelMaxBw => "maximum relative bandwidth",
            Self::VarDensity | Self::RelDensity => "matrix density",
        }
    }

    /// whether the metric is taken on the derived relation x relation matrix
    pub fn on_relations(&self) -> bool {
        matches!(self, Self::RelAvgBw | Self::RelMaxBw | Self::RelDensity)
    }

    /// bandwidths are normalized by the matrix width
    pub fn compute(&self, matrix: &IncidenceMatrix) -> f64 {
        let matrix = if self.on_relations() {
            Cow::Owned(matrix.relation_matrix())
        } else {
            Cow::Borrowed(matrix)
        };
        let width = matrix.width() as f64;

        match self {
            Self::VarAvgBw | Self::RelAvgBw => matrix.bandwidth().avg / width,
            Self::VarMaxBw | Self::RelMaxBw => matrix.bandwidth().max as f64 / width,
            Self::VarDensity | Self::RelDensity => matrix.density(),
        }
    }
}

impl fmt::Display for LocalityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LocalityMetric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name() == value)
            .ok_or_else(|| format!("unknown locality metric '{value}'"))
    }
}

/// Matrix folders per table, relative to the model root
pub static DEFAULT_MATRIX_FOLDERS: Lazy<BTreeMap<DatasetKey, PathBuf>> = Lazy::new(|| {
    let mut folders = BTreeMap::new();

    for (dataset, models) in [("beem", "beem"), ("ptri", "petrinets"), ("prom", "promela")] {
        for (diagram, diagrams) in [("bdd", "bdds"), ("ldd", "ldds")] {
            for (ordering, orderings) in [("vn", "vanilla"), ("sl", "sloan")] {
                folders.insert(
                    DatasetKey::new(dataset, format!("{ordering}-{diagram}")),
                    PathBuf::from(format!("models/{models}/matrices/{diagrams}/{orderings}")),
                );
            }
        }
    }

    folders
});

/// Locality metric of a benchmark next to its comparison ratio
#[derive(Debug, Clone, PartialEq)]
pub struct LocalityPoint {
    pub dataset: String,
    pub benchmark: String,
    pub metric: f64,
    pub ratio: f64,
}

/// Looks up `<benchmark>.matrix` files below `root`
#[derive(Debug, Clone)]
pub struct MatrixStore {
    root: PathBuf,
    folders: BTreeMap<DatasetKey, PathBuf>,
}

impl MatrixStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_folders(root, DEFAULT_MATRIX_FOLDERS.clone())
    }

    pub fn with_folders(root: impl Into<PathBuf>, folders: BTreeMap<DatasetKey, PathBuf>) -> Self {
        Self {
            root: root.into(),
            folders,
        }
    }

    pub fn path(&self, key: &DatasetKey, benchmark: &str) -> Result<PathBuf, AnalysisError> {
        let folder = self
            .folders
            .get(key)
            .ok_or_else(|| MissingSelection::MatrixFolder(key.clone()))?;

        Ok(self.root.join(folder).join(format!("{benchmark}.matrix")))
    }

    pub fn metric(
        &self,
        key: &DatasetKey,
        benchmark: &str,
        metric: LocalityMetric,
    ) -> Result<f64, AnalysisError> {
        let path = self.path(key, benchmark)?;
        let matrix = IncidenceMatrix::load(&path)?;

        if matrix.is_empty() {
            return Err(AnalysisError::EmptyMatrix(path));
        }

        Ok(metric.compute(&matrix))
    }

    /// Pair the ratio of every result in `comparison` with the locality metric of its benchmark,
    /// looked up in the matrix folder of `(result.dataset, config)`.
    #[instrument(skip(self, comparison), level = "info")]
    pub fn locality(
        &self,
        comparison: &Comparison,
        config: &str,
        metric: LocalityMetric,
    ) -> Result<Vec<LocalityPoint>, AnalysisError> {
        comparison
            .iter()
            .map(|result| {
                let key = DatasetKey::new(result.dataset.as_str(), config);

                Ok(LocalityPoint {
                    dataset: result.dataset.clone(),
                    benchmark: result.benchmark.clone(),
                    metric: self.metric(&key, &result.benchmark, metric)?,
                    ratio: result.ratio(),
                })
            })
            .collect()
    }
}
