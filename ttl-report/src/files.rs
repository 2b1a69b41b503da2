use glob::{GlobError, PatternError};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum FileListError {
    #[error("Input path does not exist: {0}")]
    NotFound(PathBuf),
    #[error("Cannot convert path to string: {0}")]
    CannotConvertPath(PathBuf),
    #[error("Glob Pattern Error: {0}")]
    GlobPattern(#[from] PatternError),
    #[error("Glob Error: {0}")]
    Glob(#[from] GlobError),
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
}

/// Lists the trace files to process. A file input is returned as is, a
/// directory is searched with `pattern` and the matches sorted by
/// modification time, then by path.
pub(crate) fn build_file_list(
    input: &Path,
    pattern: &str,
    recurse: bool,
) -> Result<Vec<PathBuf>, FileListError> {
    if !input.exists() {
        return Err(FileListError::NotFound(input.to_path_buf()));
    }
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let full_pattern = if recurse {
        input.join("**").join(pattern)
    } else {
        input.join(pattern)
    };
    let full_pattern = full_pattern
        .to_str()
        .ok_or_else(|| FileListError::CannotConvertPath(full_pattern.clone()))?;

    let mut files = Vec::new();
    for entry in glob::glob(full_pattern)? {
        let path = entry?;
        if path.is_file() {
            let modified = fs::metadata(&path)?.modified()?;
            files.push((modified, path));
        }
    }
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}
