use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fixer_core::Graph;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("workflow directory missing or not a directory: {0}")]
    Directory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("workflow json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_workflow(path: &Path) -> Result<Graph, PersistError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes the graph next to its destination, then renames it into place.
///
/// A failed write leaves any existing file untouched.
pub fn save_workflow(path: &Path, graph: &Graph) -> Result<PathBuf, PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(PersistError::Directory(dir.display().to_string()));
    }

    let json = serde_json::to_string_pretty(graph)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| PersistError::Io(err.error))?;
    Ok(path.to_path_buf())
}
