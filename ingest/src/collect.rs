use crate::error::IngestError;
use globset::GlobBuilder;
use ignore::WalkBuilder;
use itertools::Itertools;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Files directly inside `directory` whose name matches `pattern`, sorted by path
pub fn collect_logs(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>, IngestError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();
    let mut paths = Vec::new();

    debug!("Filtering {} with glob: {glob:?}", directory.display());

    // log folders are often ignored by vcs, so no standard filters
    for entry in WalkBuilder::new(directory)
        .max_depth(Some(1))
        .standard_filters(false)
        .build()
    {
        let entry = entry.map_err(|source| IngestError::Walk {
            path: directory.to_path_buf(),
            source,
        })?;

        if entry.file_type().map_or(false, |kind| kind.is_file())
            && glob.is_match(entry.file_name())
        {
            paths.push(entry.into_path());
        }
    }

    Ok(paths.into_iter().sorted().collect_vec())
}

pub fn read_log(path: &Path) -> Result<String, IngestError> {
    debug!("Processing {}", path.display());

    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// File name of `path` without its last `suffix_len` characters
pub fn benchmark_name(path: &Path, suffix_len: usize) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let keep = name.chars().count().saturating_sub(suffix_len);

    name.chars().take(keep).collect()
}
