use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid log file pattern")]
    InvalidGlob(#[from] globset::Error),
    #[error("Failed to list {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed line {line} in {}: {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
