//! Employee roster from the HR workbook.
//!
//! The first worksheet's header row must contain `NOME`, `TELEFONE`, `CPF`
//! and `EMAIL`; other columns are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Reader};
use routing::{Roster, RosterEntry};
use tracing::{debug, info};

const COL_NAME: &str = "NOME";
const COL_PHONE: &str = "TELEFONE";
const COL_TAX_ID: &str = "CPF";
const COL_EMAIL: &str = "EMAIL";

/// Country calling code prepended to bare national numbers.
const COUNTRY_CODE: &str = "55";

pub fn load_roster(path: &Path) -> Result<Roster> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open roster {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("Roster workbook has no worksheets")?
        .with_context(|| format!("Failed to read first worksheet of {}", path.display()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let roster = roster_from_rows(rows)?;

    info!(path = %path.display(), employees = roster.len(), "Loaded roster");
    Ok(roster)
}

/// Build a roster from string cells; the first row is the header.
pub fn roster_from_rows<I>(mut rows: I) -> Result<Roster>
where
    I: Iterator<Item = Vec<String>>,
{
    let header = rows.next().context("Roster sheet is empty")?;
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .with_context(|| format!("Roster header has no {name} column"))
    };
    let (name_col, phone_col, tax_col, email_col) = (
        column(COL_NAME)?,
        column(COL_PHONE)?,
        column(COL_TAX_ID)?,
        column(COL_EMAIL)?,
    );

    let mut roster = Roster::new();
    for row in rows {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or_default();

        let full_name = cell(name_col).trim().to_uppercase();
        if full_name.is_empty() {
            debug!("Skipping roster row without a name");
            continue;
        }

        roster.insert(RosterEntry {
            display_name: title_case(&full_name),
            tax_id: digits_only(cell(tax_col)),
            phone: normalize_phone(cell(phone_col)),
            email: cell(email_col).trim().to_string(),
            full_name,
        });
    }
    Ok(roster)
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Digits only, country code prepended, then `55(11)98765-4321` layout.
pub fn normalize_phone(raw: &str) -> String {
    let mut digits = digits_only(raw);
    if !digits.is_empty() && !digits.starts_with(COUNTRY_CODE) {
        digits.insert_str(0, COUNTRY_CODE);
    }
    format_phone(&digits)
}

/// Lay out a 12–13 digit international number; anything else is returned as-is.
pub fn format_phone(digits: &str) -> String {
    if !(12..=13).contains(&digits.len()) || !digits.is_ascii() {
        return digits.to_string();
    }
    let (country, rest) = digits.split_at(2);
    let (area, number) = rest.split_at(2);
    let split = match number.len() {
        9 => 5,
        8 => 4,
        _ => return digits.to_string(),
    };
    let (head, tail) = number.split_at(split);
    format!("{country}({area}){head}-{tail}")
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
