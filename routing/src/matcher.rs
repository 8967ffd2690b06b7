//! Fuzzy identity matching.
//!
//! A fragment matches a roster entry when every informative fragment token
//! (more than two characters) appears verbatim among the full name's tokens.
//! The first matching entry in roster order wins; there is no scoring, so an
//! ambiguous fragment routes to whichever employee was loaded first.

use std::collections::HashSet;

use crate::roster::{Roster, RosterEntry};

/// Tokens at or below this length ("DE", "DA", initials) are ignored.
const MIN_TOKEN_CHARS: usize = 2;

fn informative_tokens(fragment: &str) -> HashSet<String> {
    fragment
        .to_uppercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Find the first roster entry whose name contains every informative token.
///
/// Returns the canonical full name alongside the entry.
pub fn match_fragment<'r>(roster: &'r Roster, fragment: &str) -> Option<(&'r str, &'r RosterEntry)> {
    let wanted = informative_tokens(fragment);
    if wanted.is_empty() {
        return None;
    }

    roster
        .iter()
        .find(|entry| {
            let have: HashSet<&str> = entry.full_name.split_whitespace().collect();
            wanted.iter().all(|t| have.contains(t.as_str()))
        })
        .map(|entry| (entry.full_name.as_str(), entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::entry;

    fn roster(names: &[&str]) -> Roster {
        names.iter().map(|n| entry(n)).collect()
    }

    #[test]
    fn test_short_tokens_only_never_match() {
        let r = roster(&["JOAO DA SILVA"]);
        assert!(match_fragment(&r, "DA DE J").is_none());
        assert!(match_fragment(&r, "").is_none());
        assert!(match_fragment(&r, "   ").is_none());
    }

    #[test]
    fn test_subset_match_ignores_order_and_noise() {
        let r = roster(&["JOAO DA SILVA"]);
        let (name, _) = match_fragment(&r, "silva da joao").unwrap();
        assert_eq!(name, "JOAO DA SILVA");
    }

    #[test]
    fn test_every_token_must_be_present() {
        let r = roster(&["JOAO DA SILVA"]);
        assert!(match_fragment(&r, "JOAO SOUZA").is_none());
    }

    #[test]
    fn test_no_partial_token_match() {
        let r = roster(&["JOAO DA SILVA"]);
        assert!(match_fragment(&r, "JOA SILV").is_none());
    }

    #[test]
    fn test_first_in_roster_order_wins() {
        let r = roster(&["JOAO SILVA JUNIOR", "JOAO SILVA"]);
        let (name, _) = match_fragment(&r, "JOAO SILVA").unwrap();
        assert_eq!(name, "JOAO SILVA JUNIOR");

        let r = roster(&["JOAO SILVA", "JOAO SILVA JUNIOR"]);
        let (name, _) = match_fragment(&r, "JOAO SILVA").unwrap();
        assert_eq!(name, "JOAO SILVA");
    }

    #[test]
    fn test_token_length_counts_characters() {
        // "JOÃ" is three characters but four bytes.
        let r = roster(&["JOÃ LIMA"]);
        assert!(match_fragment(&r, "JOÃ").is_some());
    }
}
