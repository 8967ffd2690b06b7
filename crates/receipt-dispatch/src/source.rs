//! Network share scanning.
//!
//! Shares are laid out as `<share>/<YYYY>/<MM-YYYY>/*.pdf`; each run works on
//! the newest month of the newest year.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::config::ShareConfig;

fn subdirectories(path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to list {}", path.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    Ok(dirs)
}

/// Newest `MM-YYYY` directory inside the newest `YYYY` directory of `base`.
///
/// Returns `Ok(None)` when either level has no candidates.
pub fn latest_period_dir(base: &Path) -> Result<Option<PathBuf>> {
    let year = subdirectories(base)?
        .into_iter()
        .filter(|(name, _)| name.len() == 4 && name.chars().all(|c| c.is_ascii_digit()))
        .max_by(|a, b| a.0.cmp(&b.0));
    let Some((_, year_dir)) = year else {
        return Ok(None);
    };

    let month_pattern = Regex::new(r"^(\d{2})-(\d{4})").expect("month pattern is a valid regex");
    let month = subdirectories(&year_dir)?
        .into_iter()
        .filter_map(|(name, path)| {
            let caps = month_pattern.captures(&name)?;
            let month: u32 = caps[1].parse().ok()?;
            let year: i32 = caps[2].parse().ok()?;
            let date = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some((date, path))
        })
        .max_by_key(|(date, _)| *date);

    Ok(month.map(|(_, path)| path))
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut docs = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let entry = entry?;
        let is_pdf = entry
            .file_name()
            .to_string_lossy()
            .to_ascii_lowercase()
            .ends_with(".pdf");
        if is_pdf && entry.file_type()?.is_file() {
            docs.push(entry.path());
        }
    }
    docs.sort();
    debug!(dir = %dir.display(), count = docs.len(), "Listed documents");
    Ok(docs)
}

/// Remote sector name for a share: the explicit override, else the share's
/// directory name uppercased with `prefixes` removed.
pub fn sector_name(share: &ShareConfig, prefixes: &[String]) -> String {
    if let Some(sector) = &share.sector {
        return sector.trim().to_uppercase();
    }
    let mut name = share
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    for prefix in prefixes {
        name = name.replace(&prefix.to_uppercase(), "");
    }
    name.trim().to_string()
}
