use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::AssetMap;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid asset map {path}: {source}")]
    AssetMap {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads the annotated exam text.
pub fn read_exam(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Writes the exam text back, creating parent directories if needed.
pub fn write_exam(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(path, content).map_err(IoError::Io)
}

/// Reads the sidecar asset map the converter writes next to the exam.
///
/// A missing sidecar is not an error: exams without images or formulas
/// simply have no map, and rendering degrades to badges.
pub fn read_asset_map(path: &Path) -> Result<AssetMap, IoError> {
    if !path.exists() {
        return Ok(AssetMap::empty());
    }
    let json = fs::read_to_string(path).map_err(IoError::Io)?;
    AssetMap::from_json(&json).map_err(|source| IoError::AssetMap {
        path: path.to_path_buf(),
        source,
    })
}

/// The conventional sidecar path for an exam file: the exam path with
/// `suffix` appended to its extension (`de1.txt` → `de1.txt.assets.json`
/// for the default suffix `assets.json`).
pub fn asset_map_path(exam_path: &Path, suffix: &str) -> PathBuf {
    let mut s = exam_path.as_os_str().to_os_string();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}
