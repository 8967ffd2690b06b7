//! Employee roster.
//!
//! An insertion-ordered map keyed by the uppercase full name. Iteration order
//! is load order, which the matcher relies on for its tie-break.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One employee as loaded from the roster source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Uppercase, trimmed; the roster key.
    pub full_name: String,
    /// Title-cased name used in signing messages.
    pub display_name: String,
    /// Digits only.
    pub tax_id: String,
    /// International format, e.g. `55(11)98765-4321`.
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    index: HashMap<String, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its normalized full name.
    ///
    /// A duplicate name replaces the earlier entry but keeps its position.
    pub fn insert(&mut self, mut entry: RosterEntry) {
        entry.full_name = entry.full_name.trim().to_uppercase();
        match self.index.get(&entry.full_name) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.index
                    .insert(entry.full_name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, full_name: &str) -> Option<&RosterEntry> {
        self.index
            .get(&full_name.trim().to_uppercase())
            .map(|&slot| &self.entries[slot])
    }

    /// Entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RosterEntry> for Roster {
    fn from_iter<I: IntoIterator<Item = RosterEntry>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for entry in iter {
            roster.insert(entry);
        }
        roster
    }
}

#[cfg(test)]
pub(crate) fn entry(full_name: &str) -> RosterEntry {
    RosterEntry {
        full_name: full_name.to_string(),
        display_name: full_name.to_string(),
        tax_id: String::new(),
        phone: String::new(),
        email: String::new(),
    }
}
