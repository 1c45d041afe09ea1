use itertools::Itertools;
use reachbench_analysis::{
    compare::{ComparisonRequest, JoinMode, Selection},
    loader::{TableSpec, DEFAULT_TABLES},
    matrix::LocalityMetric,
    overhead::OverheadRequest,
    speedup::SpeedupRequest,
    AnalysisError, StrategyId, StrategyRegistry,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::Path, path::PathBuf};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config is not valid yaml")]
    Parse(#[from] serde_yaml::Error),
    #[error("Strategy could not be resolved")]
    UnknownStrategy(#[from] AnalysisError),
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    // experimental strategies on top of the default registry
    #[serde(default)]
    pub strategies: BTreeMap<String, StrategyId>,
    #[serde(default = "default_datasets")]
    pub datasets: Vec<String>,
    // replaces the default table layout if not empty
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    #[serde(default)]
    pub check: CheckConfig,

    #[serde(default)]
    pub comparisons: BTreeMap<String, ComparisonConfig>,
    #[serde(default)]
    pub speedups: BTreeMap<String, SpeedupConfig>,
    #[serde(default)]
    pub overheads: BTreeMap<String, OverheadConfig>,
    #[serde(default)]
    pub locality: BTreeMap<String, LocalityConfig>,
    #[serde(default, alias = "refs")]
    pub references: BTreeMap<String, ReferenceConfig>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    // minimum number of tables that have to load
    #[serde(default)]
    pub expected: usize,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    // value missing runs are written as, i.e. the timeout of the batch
    #[serde(default = "default_maxtime")]
    pub maxtime: f64,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub dataset: String,
    pub config: String,
    pub file: PathBuf,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    pub significant_digits: Option<u32>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SideConfig {
    pub config: String,
    pub strategy: String,
    pub workers: Option<u32>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    pub left: SideConfig,
    pub right: SideConfig,
    #[serde(default)]
    pub join: JoinMode,
    #[serde(default)]
    pub merge_time: bool,
    // falls back to the top level datasets
    #[serde(default)]
    pub datasets: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SpeedupConfig {
    pub config: String,
    pub strategy: String,
    #[serde(default = "default_min_time")]
    pub min_time: f64,
    #[serde(default)]
    pub datasets: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct OverheadConfig {
    pub config: String,
    pub baseline: String,
    pub candidate: String,
    #[serde(default)]
    pub datasets: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct LocalityConfig {
    // name of an entry in `comparisons`
    pub comparison: String,
    // matrix folder configuration, e.g. `sl-bdd`
    pub config: String,
    #[serde(default = "default_models_path")]
    pub models: PathBuf,
    #[serde(default)]
    pub metrics: Vec<LocalityMetric>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    pub file: PathBuf,
    pub dataset: String,
    pub config: String,
    pub strategy: String,
    #[serde(default = "default_reference_kind", rename = "type")]
    pub kind: String,
    #[serde(default = "default_significant_digits")]
    pub significant_digits: u32,
    // drop benchmarks with disagreeing state counts from the loaded table
    #[serde(default)]
    pub exclude_disagreements: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            expected: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            maxtime: default_maxtime(),
        }
    }
}

impl SideConfig {
    pub fn selection(&self, strategies: &StrategyRegistry) -> Result<Selection, ConfigErrors> {
        let selection = Selection::new(self.config.as_str(), strategies.resolve(&self.strategy)?);

        Ok(match self.workers {
            Some(workers) => selection.with_workers(workers),
            None => selection,
        })
    }
}

impl ComparisonConfig {
    pub fn request(&self, strategies: &StrategyRegistry) -> Result<ComparisonRequest, ConfigErrors> {
        Ok(ComparisonRequest {
            left: self.left.selection(strategies)?,
            right: self.right.selection(strategies)?,
            join: self.join,
            include_merge_time: self.merge_time,
        })
    }
}

impl SpeedupConfig {
    pub fn request(&self, strategies: &StrategyRegistry) -> Result<SpeedupRequest, ConfigErrors> {
        Ok(SpeedupRequest {
            config: self.config.clone(),
            strategy: strategies.resolve(&self.strategy)?,
            min_time: self.min_time,
        })
    }
}

impl OverheadConfig {
    pub fn request(&self, strategies: &StrategyRegistry) -> Result<OverheadRequest, ConfigErrors> {
        Ok(OverheadRequest {
            config: self.config.clone(),
            baseline: strategies.resolve(&self.baseline)?,
            candidate: strategies.resolve(&self.candidate)?,
        })
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let text = fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_yaml::from_str(&text)?)
    }

    /// default strategies plus the ones configured in `strategies`
    pub fn strategy_registry(&self) -> StrategyRegistry {
        let mut registry = StrategyRegistry::default();
        registry.extend(self.strategies.clone());

        registry
    }

    pub fn table_specs(&self) -> Vec<TableSpec> {
        if self.tables.is_empty() {
            DEFAULT_TABLES.clone()
        } else {
            self.tables
                .iter()
                .map(|table| TableSpec::new(&table.dataset, &table.config, table.file.clone()))
                .collect()
        }
    }

    /// Validate the config and fill in fallbacks, returns whether any error was found.
    ///
    /// All problems are logged before returning.
    pub fn preflight_checks(&mut self) -> bool {
        let mut contains_error = false;
        let strategies = self.strategy_registry();
        let mut check_strategy = |context: String, name: &str| {
            if !strategies.contains(name) {
                error!(
                    "{context} '{name}' is not a known strategy, known are: {}",
                    strategies.iter().map(|(name, _)| name).join(", ")
                );
                contains_error = true;
            }
        };

        for (name, comparison) in self.comparisons.iter() {
            check_strategy(format!("comparisons.{name}.left.strategy"), &comparison.left.strategy);
            check_strategy(format!("comparisons.{name}.right.strategy"), &comparison.right.strategy);
        }
        for (name, speedup) in self.speedups.iter() {
            check_strategy(format!("speedups.{name}.strategy"), &speedup.strategy);
        }
        for (name, overhead) in self.overheads.iter() {
            check_strategy(format!("overheads.{name}.baseline"), &overhead.baseline);
            check_strategy(format!("overheads.{name}.candidate"), &overhead.candidate);
        }
        for (name, reference) in self.references.iter() {
            check_strategy(format!("references.{name}.strategy"), &reference.strategy);
        }

        if self.datasets.is_empty() {
            error!("No dataset was defined, nothing can be compared");
            contains_error = true;
        }

        if !self.data.path.is_dir() {
            error!(
                "data.path {} is not a directory",
                self.data.path.to_string_lossy()
            );
            contains_error = true;
        }

        if !(self.output.maxtime > 0.0) {
            error!("output.maxtime has to be positive, it is drawn for every missing run");
            contains_error = true;
        }

        let datasets = self.datasets.clone();
        let mut fallback = |job: String, selected: &mut Vec<String>| {
            if selected.is_empty() {
                *selected = datasets.clone();
            } else if let Some(unknown) = selected.iter().find(|dataset| !datasets.contains(dataset)) {
                warn!("{job} uses dataset {unknown} which is not in the top level datasets");
            }
        };

        for (name, comparison) in self.comparisons.iter_mut() {
            fallback(format!("comparisons.{name}"), &mut comparison.datasets);
        }
        for (name, speedup) in self.speedups.iter_mut() {
            fallback(format!("speedups.{name}"), &mut speedup.datasets);
        }
        for (name, overhead) in self.overheads.iter_mut() {
            fallback(format!("overheads.{name}"), &mut overhead.datasets);
        }

        for (name, speedup) in self.speedups.iter() {
            if speedup.min_time < 0.0 {
                error!("speedups.{name}.min_time cannot be negative");
                contains_error = true;
            }
        }

        for (name, locality) in self.locality.iter_mut() {
            if !self.comparisons.contains_key(&locality.comparison) {
                error!(
                    "locality.{name} references comparison {} which is not defined",
                    locality.comparison
                );
                contains_error = true;
            }

            if locality.metrics.is_empty() {
                warn!("locality.{name} has an empty set of metrics. Falling back to all metrics");
                locality.metrics = LocalityMetric::ALL.to_vec();
            }
        }

        contains_error
    }
}

fn default_datasets() -> Vec<String> {
    vec!["beem".to_owned(), "ptri".to_owned(), "prom".to_owned()]
}

fn default_data_path() -> PathBuf {
    PathBuf::from("bench_data")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("plots")
}

fn default_models_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_maxtime() -> f64 {
    600.0
}

fn default_min_time() -> f64 {
    0.1
}

fn default_reference_kind() -> String {
    ".gal".to_owned()
}

fn default_significant_digits() -> u32 {
    6
}
