//! Filesystem utilities.
//!
//! Template discovery and atomic write-back.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{LintError, Result};

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Expand command line inputs into template files.
///
/// Directories are walked recursively for `*.json` files in file name
/// order. Anything else is passed through untouched so that missing or
/// unreadable inputs are reported when they are opened.
#[must_use]
pub fn discover_templates(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_json(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "directory walk failed");
                    if let Some(path) = err.path() {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }
    }
    files
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Replace `path` with `contents`.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over the target, so readers never see a partial template.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| LintError::TempFile {
        dir: dir.to_path_buf(),
        message: err.to_string(),
    })?;
    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| LintError::Write {
            path: temp.path().to_path_buf(),
            message: err.to_string(),
        })?;

    let temp_path = temp.path().to_path_buf();
    temp.persist(path).map_err(|err| LintError::Rename {
        from: temp_path,
        to: path.to_path_buf(),
        message: err.error.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "template written");
    Ok(())
}
