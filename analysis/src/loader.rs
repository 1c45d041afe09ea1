use crate::{
    error::{AnalysisError, MissingSelection},
    record::{DatasetKey, ResultRecord, ResultTable},
};
use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, error, info, instrument};

/// Where the result table of a `DatasetKey` lives, relative to a batch directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub key: DatasetKey,
    pub file: PathBuf,
}

impl TableSpec {
    pub fn new(dataset: &str, config: &str, file: impl Into<PathBuf>) -> Self {
        Self {
            key: DatasetKey::new(dataset, config),
            file: file.into(),
        }
    }
}

/// Table layout produced by the benchmark batches
pub static DEFAULT_TABLES: Lazy<Vec<TableSpec>> = Lazy::new(|| {
    vec![
        // BDDs
        TableSpec::new("beem", "vn-bdd", "beem_vanilla_stats_bdd.csv"),
        TableSpec::new("beem", "sl-bdd", "beem_sloan_stats_bdd.csv"),
        TableSpec::new("ptri", "vn-bdd", "petrinets_vanilla_stats_bdd.csv"),
        TableSpec::new("ptri", "sl-bdd", "petrinets_sloan_stats_bdd.csv"),
        TableSpec::new("prom", "vn-bdd", "promela_vanilla_stats_bdd.csv"),
        TableSpec::new("prom", "sl-bdd", "promela_sloan_stats_bdd.csv"),
        // LDDs
        TableSpec::new("beem", "vn-ldd", "beem_vanilla_stats_ldd.csv"),
        TableSpec::new("beem", "sl-ldd", "beem_sloan_stats_ldd.csv"),
        TableSpec::new("ptri", "vn-ldd", "petrinets_vanilla_stats_ldd.csv"),
        TableSpec::new("ptri", "sl-ldd", "petrinets_sloan_stats_ldd.csv"),
        TableSpec::new("prom", "vn-ldd", "promela_vanilla_stats_ldd.csv"),
        TableSpec::new("prom", "sl-ldd", "promela_sloan_stats_ldd.csv"),
        // static BDDs/ LDDs
        TableSpec::new("ptri", "sl-static-9-bdd", "petrinets_sloan_stats_bdd_static_9.csv"),
        TableSpec::new("ptri", "sl-static-9-ldd", "petrinets_sloan_stats_ldd_static_9.csv"),
        // deadlocks
        TableSpec::new("ptri-dl", "sl-bdd", "petrinets_sloan_stats_bdd_deadlocks.csv"),
    ]
});

/// What happened to each table spec during a (re)load
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub loaded: Vec<DatasetKey>,
    pub skipped: Vec<(DatasetKey, PathBuf)>,
    pub failed: Vec<(DatasetKey, AnalysisError)>,
}

impl LoadOutcome {
    pub fn has_expected(&self, expected: usize) -> bool {
        self.loaded.len() >= expected
    }
}

/// All loaded result tables of one benchmark batch, keyed by `DatasetKey`
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRegistry {
    specs: Vec<TableSpec>,
    tables: BTreeMap<DatasetKey, ResultTable>,
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TABLES.clone())
    }
}

impl DatasetRegistry {
    /// create an empty registry that loads `specs` on `reload`
    pub fn new(specs: Vec<TableSpec>) -> Self {
        Self {
            specs,
            tables: BTreeMap::new(),
        }
    }

    pub fn load(directory: &Path, specs: Vec<TableSpec>) -> (Self, LoadOutcome) {
        let mut registry = Self::new(specs);
        let outcome = registry.reload(directory);

        (registry, outcome)
    }

    /// Replace all tables with the ones found in `directory`.
    ///
    /// Missing files are skipped, a malformed file only fails its own table.
    #[instrument(skip(self), level = "info")]
    pub fn reload(&mut self, directory: &Path) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        self.tables.clear();

        for spec in self.specs.iter() {
            let path = directory.join(&spec.file);

            match load_table(spec.key.clone(), &path) {
                Ok(table) => {
                    info!(key = %spec.key, records = table.len(), "Loaded {}", path.display());
                    outcome.loaded.push(spec.key.clone());
                    self.tables.insert(spec.key.clone(), table);
                }
                Err(AnalysisError::MissingFile(path)) => {
                    debug!(key = %spec.key, path = ?path, "Skipped missing table");
                    outcome.skipped.push((spec.key.clone(), path));
                }
                Err(e) => {
                    error!(key = %spec.key, "Failed to load table: {e}");
                    outcome.failed.push((spec.key.clone(), e));
                }
            }
        }

        outcome
    }

    pub fn specs(&self) -> &[TableSpec] {
        &self.specs
    }

    /// add or replace a table, bypassing the file system
    pub fn insert(&mut self, table: ResultTable) -> Option<ResultTable> {
        self.tables.insert(table.key.clone(), table)
    }

    pub fn get(&self, key: &DatasetKey) -> Option<&ResultTable> {
        self.tables.get(key)
    }

    /// like `get`, but a missing table is a `SelectionNotFound` error
    pub fn table(&self, key: &DatasetKey) -> Result<&ResultTable, AnalysisError> {
        self.tables
            .get(key)
            .ok_or_else(|| MissingSelection::Dataset(key.clone()).into())
    }

    pub fn contains(&self, key: &DatasetKey) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DatasetKey> {
        self.tables.keys()
    }

    pub fn tables(&self) -> impl Iterator<Item = &ResultTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// unique worker counts over all tables
    pub fn worker_counts(&self) -> BTreeSet<u32> {
        self.tables
            .values()
            .flat_map(|table| table.worker_counts())
            .collect()
    }
}

pub fn load_table(key: DatasetKey, path: &Path) -> Result<ResultTable, AnalysisError> {
    if !path.is_file() {
        return Err(AnalysisError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_table(key, path, file)
}

/// Parse a result table from `reader`, `path` is only used for error reporting
pub fn read_table<R: Read>(
    key: DatasetKey,
    path: &Path,
    reader: R,
) -> Result<ResultTable, AnalysisError> {
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
    let columns = Columns::locate(&headers).map_err(|reason| malformed(1, reason))?;

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map_or(0, |position| position.line());
            malformed(line, e.to_string())
        })?;
        let line = row.position().map_or(0, |position| position.line());

        records.push(columns.parse(&row).map_err(|reason| malformed(line, reason))?);
    }

    Ok(ResultTable::new(key, path, records))
}

/// column positions of the recognized fields, everything else is ignored
struct Columns {
    benchmark: usize,
    strategy: usize,
    workers: usize,
    reach_time: usize,
    merge_time: Option<usize>,
    final_states: Option<usize>,
    final_nodecount: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column '{name}'"));

        Ok(Self {
            benchmark: require("benchmark")?,
            strategy: require("strategy")?,
            workers: require("workers")?,
            reach_time: require("reach_time")?,
            merge_time: find("merge_time"),
            final_states: find("final_states"),
            final_nodecount: find("final_nodecount"),
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<ResultRecord, String> {
        let cell = |index: usize| row.get(index).unwrap_or("").trim();
        let optional = |index: Option<usize>| index.map(cell).unwrap_or("");

        let benchmark = cell(self.benchmark);
        if benchmark.is_empty() {
            return Err("empty benchmark name".to_owned());
        }

        let workers: u32 = parse_required(cell(self.workers), "workers")?;
        if workers == 0 {
            return Err("workers must be at least 1".to_owned());
        }

        Ok(ResultRecord {
            benchmark: benchmark.to_owned(),
            strategy: parse_required(cell(self.strategy), "strategy")?,
            workers,
            reach_time: parse_measurement(cell(self.reach_time), "reach_time")?,
            merge_time: parse_measurement(optional(self.merge_time), "merge_time")?.unwrap_or(0.0),
            final_states: parse_measurement(optional(self.final_states), "final_states")?,
            final_nodecount: parse_count(optional(self.final_nodecount), "final_nodecount")?,
        })
    }
}

/// markers the tools (and hand-edited tables) use for a run without a value
pub(crate) fn is_absent(value: &str) -> bool {
    value.is_empty()
        || value == "-"
        || value.eq_ignore_ascii_case("dnf")
        || value.eq_ignore_ascii_case("nan")
}

pub(crate) fn parse_required<T: FromStr>(value: &str, column: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {column} value '{value}'"))
}

pub(crate) fn parse_measurement(value: &str, column: &str) -> Result<Option<f64>, String> {
    if is_absent(value) {
        return Ok(None);
    }

    let parsed: f64 = parse_required(value, column)?;

    if !parsed.is_finite() || parsed < 0.0 {
        Err(format!("{column} must be a finite non-negative number, got '{value}'"))
    } else {
        Ok(Some(parsed))
    }
}

fn parse_count(value: &str, column: &str) -> Result<Option<u64>, String> {
    if is_absent(value) {
        return Ok(None);
    }

    if let Ok(count) = value.parse::<u64>() {
        return Ok(Some(count));
    }

    // some tools print integral counts as floats, e.g. `1234.0`
    match parse_measurement(value, column)? {
        Some(count) if count.fract() == 0.0 && count <= u64::MAX as f64 => Ok(Some(count as u64)),
        _ => Err(format!("{column} must be a non-negative integer, got '{value}'")),
    }
}
