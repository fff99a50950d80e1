//! Writing citation blobs to disk.

use std::fs;
use std::path::Path;

use super::{generate_bibtex, generate_ris};
use crate::error::{Error, Result};
use crate::models::Reference;

fn write_blob(path: &Path, contents: &str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(Error::InvalidInput("output path is required".to_string()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Write `references` as RIS to `path`, creating parent directories
pub fn write_ris_file(path: impl AsRef<Path>, references: &[Reference]) -> Result<()> {
    write_blob(path.as_ref(), &generate_ris(references))
}

/// Write `references` as BibTeX to `path`, creating parent directories
pub fn write_bibtex_file(path: impl AsRef<Path>, references: &[Reference]) -> Result<()> {
    write_blob(path.as_ref(), &generate_bibtex(references))
}
