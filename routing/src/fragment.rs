//! Filename → search fragment.
//!
//! Assumes names are front-loaded in the filename and metadata trails:
//! `MARIA_DE_SOUZA_RECIBO_13º.pdf` becomes `MARIA DE SOUZA`.

use std::path::Path;

use regex::Regex;

/// Number of leading tokens handed to the matcher.
const FRAGMENT_TOKENS: usize = 3;

/// Underscore, hyphen, whitespace, ordinal marker and period.
const SEPARATORS: &str = r"[_\-\sº.]+";

#[derive(Debug, Clone)]
pub struct FragmentExtractor {
    separators: Regex,
    markers: Option<Regex>,
}

impl FragmentExtractor {
    /// Build an extractor that removes `suffix_markers` (matched on the
    /// uppercased name) before collapsing separators.
    pub fn new<S: AsRef<str>>(suffix_markers: &[S]) -> Self {
        let mut markers: Vec<String> = suffix_markers
            .iter()
            .map(|m| m.as_ref().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();
        // `_13º` has to win over `_13`.
        markers.sort_by_key(|m| std::cmp::Reverse(m.chars().count()));

        let markers = (!markers.is_empty()).then(|| {
            let alternation = markers
                .iter()
                .map(|m| regex::escape(m))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&alternation).expect("escaped alternation is a valid regex")
        });

        Self {
            separators: Regex::new(SEPARATORS).expect("separator class is a valid regex"),
            markers,
        }
    }

    /// Produce the search fragment for a filename (or path).
    ///
    /// Markers are removed wherever they occur, not only at the end.
    pub fn extract(&self, filename: &str) -> String {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut cleaned = stem.to_uppercase();
        if let Some(markers) = &self.markers {
            cleaned = markers.replace_all(&cleaned, "").into_owned();
        }
        let cleaned = self.separators.replace_all(&cleaned, " ");

        cleaned
            .split_whitespace()
            .take(FRAGMENT_TOKENS)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for FragmentExtractor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SUFFIX_MARKERS)
    }
}
