//! Moves dispatched documents out of the scan folder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the directory, next to each document, that receives sent files.
pub const SENT_DIR: &str = "ENVIADOS";

/// Move `document` into `<its directory>/ENVIADOS/`, creating it if needed.
///
/// Returns the new path. An existing file with the same name is replaced.
pub fn move_to_sent(document: &Path) -> Result<PathBuf> {
    let parent = document
        .parent()
        .with_context(|| format!("{} has no parent directory", document.display()))?;
    let name = document
        .file_name()
        .with_context(|| format!("{} has no file name", document.display()))?;

    let sent_dir = parent.join(SENT_DIR);
    fs::create_dir_all(&sent_dir)
        .with_context(|| format!("Failed to create {}", sent_dir.display()))?;
    let target = sent_dir.join(name);

    if fs::rename(document, &target).is_err() {
        // rename fails across mounts; fall back to copy + delete.
        fs::copy(document, &target).with_context(|| {
            format!("Failed to copy {} to {}", document.display(), target.display())
        })?;
        fs::remove_file(document)
            .with_context(|| format!("Failed to remove {}", document.display()))?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_into_sent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("ANA_LIMA.pdf");
        fs::write(&doc, b"%PDF").unwrap();

        let moved = move_to_sent(&doc).unwrap();

        assert_eq!(moved, dir.path().join(SENT_DIR).join("ANA_LIMA.pdf"));
        assert!(!doc.exists());
        assert_eq!(fs::read(&moved).unwrap(), b"%PDF");
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(move_to_sent(&dir.path().join("ghost.pdf")).is_err());
    }
}
