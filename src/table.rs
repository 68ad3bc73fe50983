//! In-memory table model shared by every stage.
//!
//! A [`Table`] is a header plus ordered rows of string cells. Rows may be
//! shorter or longer than the header until the schema normalizer has run.

use std::fmt;

use crate::error::{RepairError, Result};

pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table from string literals. Handy for fixtures.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Resolves a column position by exact header name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| RepairError::missing_column(name, &self.headers))
    }

    /// Returns the cell at `idx`, treating cells past the end of a short row as empty.
    pub fn cell(row: &[String], idx: usize) -> &str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Extends `row` with empty cells until it holds at least `len` cells.
pub fn pad_to(row: &mut Row, len: usize) {
    if row.len() < len {
        row.resize(len, String::new());
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// True for an optionally signed run of ASCII digits, tolerating whitespace
/// and surrounding double quotes. Length is unbounded.
pub fn is_numeric_identifier(value: &str) -> bool {
    let body = unquote(value);
    let digits = body.strip_prefix(['+', '-']).unwrap_or(body);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A non-negative numeric identifier of any length, held as canonical
/// decimal digits (no leading zeros).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn zero() -> Self {
        Identifier("0".to_string())
    }

    /// Parses a non-negative identifier cell. Negative values yield `None`
    /// since they never raise the backfill counter above zero.
    pub fn parse(value: &str) -> Option<Self> {
        if !is_numeric_identifier(value) {
            return None;
        }
        let body = unquote(value);
        if body.starts_with('-') {
            return None;
        }
        let digits = body.trim_start_matches('+').trim_start_matches('0');
        if digits.is_empty() {
            Some(Self::zero())
        } else {
            Some(Identifier(digits.to_string()))
        }
    }

    /// The next identifier, carrying through the decimal digits.
    pub fn next(&self) -> Self {
        let mut digits = self.0.clone().into_bytes();
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                return Identifier(String::from_utf8_lossy(&digits).into_owned());
            }
        }
        digits.insert(0, b'1');
        Identifier(String::from_utf8_lossy(&digits).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
