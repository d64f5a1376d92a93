//! Strict tab-delimited reader.
//!
//! Values are never coerced: leading zeros and sign padding survive. Headers
//! and cells are trimmed, all-empty columns are dropped, and columns that hold
//! amounts, rates or counts have their `+`/zero padding collapsed.

use std::fs;
use std::path::Path;

use crate::detect::TextEncoding;
use crate::error::{ConvertError, Result};
use crate::model::{FormatKind, Table};
use crate::strategy::first_success;

use super::delimited::{parse_text, Dialect};
use super::Parser;

/// Header fragments (lower case) that mark a column for sign/zero normalization
const NUMERIC_KEYWORDS: [&str; 12] = [
    "units",
    "amount",
    "rate",
    "royalties",
    "payable",
    "share",
    "ppd",
    "retail",
    "price",
    "payout",
    "%",
    "received",
];

/// Parser for `.tab`, `.tsv` and tab-delimited `.txt` files
pub struct StrictTabParser;

impl Parser for StrictTabParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let bytes = fs::read(path)?;
        read_strict_tab(&bytes)
            .map_err(|reason| ConvertError::unreadable(path, self.kind().label(), reason))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::StrictTab
    }
}

/// Decode and parse tab-delimited bytes.
///
/// The first encoding that both decodes and parses wins; if none does, the
/// error lists every attempt.
pub fn read_strict_tab(bytes: &[u8]) -> std::result::Result<Table, String> {
    let mut table = first_success(TextEncoding::FILE_ORDER, |encoding| {
        let text = encoding
            .decode(bytes)
            .ok_or_else(|| format!("not valid {}", encoding.name()))?;
        parse_text(&text, Dialect::STRICT_TAB)
    })
    .map_err(|attempts| attempts.to_string())?;

    table.drop_empty_columns();
    normalize_numeric_columns(&mut table);
    Ok(table)
}

/// True when a header names an amount-like column
pub fn is_numeric_column(header: &str) -> bool {
    let lower = header.trim().to_lowercase();
    NUMERIC_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn normalize_numeric_columns(table: &mut Table) {
    let targets: Vec<String> = table
        .columns()
        .filter(|name| is_numeric_column(name))
        .map(str::to_string)
        .collect();
    for column in targets {
        table.map_column(&column, normalize_plus_padded);
    }
}

/// Collapse `+` and zero padding on an integer part.
///
/// `"+000012.50"` becomes `"12.50"` and `"+0"` becomes `"0"`. Anything that is
/// not digits (optionally followed by a fraction) is returned unchanged,
/// leading `+` included.
pub fn normalize_plus_padded(value: &str) -> String {
    let body = value.strip_prefix('+').unwrap_or(value);
    match body.split_once('.') {
        Some((whole, fraction)) if is_digits(whole) => {
            format!("{}.{}", collapse_zeros(whole), fraction)
        }
        None if is_digits(body) => collapse_zeros(body).to_string(),
        _ => value.to_string(),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn collapse_zeros(digits: &str) -> &str {
    match digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    }
}
