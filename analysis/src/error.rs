use crate::record::{DatasetKey, StrategyId};
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Malformed data in {} (row {row}): {reason}", .path.display())]
    MalformedData {
        path: PathBuf,
        row: u64,
        reason: String,
    },
    #[error("Selection not found: {0}")]
    SelectionNotFound(MissingSelection),
    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Matrix {} has no entries", .0.display())]
    EmptyMatrix(PathBuf),
}

/// The part of a selection that could not be resolved against the loaded data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingSelection {
    Dataset(DatasetKey),
    StrategyName(String),
    Strategy {
        key: DatasetKey,
        strategy: StrategyId,
    },
    Workers {
        key: DatasetKey,
        strategy: StrategyId,
        workers: u32,
    },
    MatrixFolder(DatasetKey),
    ReferenceKind {
        path: PathBuf,
        kind: String,
    },
}

impl fmt::Display for MissingSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(key) => write!(f, "no table loaded for {key}"),
            Self::StrategyName(name) => write!(f, "strategy '{name}' is not registered"),
            Self::Strategy { key, strategy } => {
                write!(f, "strategy {strategy} has no records in {key}")
            }
            Self::Workers {
                key,
                strategy,
                workers,
            } => write!(
                f,
                "strategy {strategy} has no records with {workers} workers in {key}"
            ),
            Self::MatrixFolder(key) => write!(f, "no matrix folder registered for {key}"),
            Self::ReferenceKind { path, kind } => {
                write!(f, "no reference runs of type '{kind}' in {}", path.display())
            }
        }
    }
}

impl From<MissingSelection> for AnalysisError {
    fn from(value: MissingSelection) -> Self {
        AnalysisError::SelectionNotFound(value)
    }
}
