use crate::config::ConfigErrors;
use reachbench_analysis::AnalysisError;
use reachbench_ingest::IngestError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to load config")]
    Config(#[from] ConfigErrors),
    #[error("Config contains errors, see above")]
    Preflight,
    #[error("Only {loaded} of at least {expected} tables could be loaded")]
    MissingTables { loaded: usize, expected: usize },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("Failed to create {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
