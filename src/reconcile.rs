//! Field reconciler for swapped price and description content.
//!
//! Two independent checks run per row, in this order:
//!
//! 1. A free-text cell that is entirely price-shaped moves into the price cell
//!    when that cell is empty, and is cleared either way. An existing price
//!    is never overwritten.
//! 2. A non-empty price cell that is not price-shaped (evaluated after step 1)
//!    is appended to the free text and cleared.
//!
//! Both cells are written back trimmed.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::{
    error::{RepairError, Result},
    pipeline::Stage,
    schema::CanonicalSchema,
    table::{Table, pad_to},
};

static PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn price_pattern() -> &'static Regex {
    PRICE_PATTERN.get_or_init(|| {
        Regex::new(r"^\$?[0-9]+(\.[0-9]{1,2})?$").expect("price pattern is a valid regex")
    })
}

/// True for `$12`, `12.5`, `$8.00` and similar. Empty strings are not price-shaped.
pub fn is_price_shaped(value: &str) -> bool {
    price_pattern().is_match(value)
}

/// Outcome of checking the free-text cell against the price pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeTextAction {
    Keep,
    /// Free text is a price and the price cell is empty: move it over.
    MoveToPrice,
    /// Free text is a price but a price is already present: drop the copy.
    Clear,
}

/// Outcome of checking the price cell against the price pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceAction {
    Keep,
    MoveToFreeText,
}

pub fn classify_free_text(free_text: &str, price: &str) -> FreeTextAction {
    if !is_price_shaped(free_text) {
        FreeTextAction::Keep
    } else if price.is_empty() {
        FreeTextAction::MoveToPrice
    } else {
        FreeTextAction::Clear
    }
}

pub fn classify_price(price: &str) -> PriceAction {
    if price.is_empty() || is_price_shaped(price) {
        PriceAction::Keep
    } else {
        PriceAction::MoveToFreeText
    }
}

/// Resolves one `(free_text, price)` pair. Inputs are trimmed before classification.
pub fn reconcile_cells(free_text: &str, price: &str) -> (String, String) {
    let mut free_text = free_text.trim().to_string();
    let mut price = price.trim().to_string();

    match classify_free_text(&free_text, &price) {
        FreeTextAction::Keep => {}
        FreeTextAction::MoveToPrice => price = std::mem::take(&mut free_text),
        FreeTextAction::Clear => free_text.clear(),
    }

    if classify_price(&price) == PriceAction::MoveToFreeText {
        if !free_text.is_empty() {
            free_text.push(' ');
        }
        free_text.push_str(&price);
        price.clear();
    }

    (free_text, price)
}

#[derive(Debug, Clone)]
pub struct FieldReconciler {
    pub free_text_column: String,
    pub price_column: String,
}

impl FieldReconciler {
    pub fn new(free_text_column: impl Into<String>, price_column: impl Into<String>) -> Self {
        Self {
            free_text_column: free_text_column.into(),
            price_column: price_column.into(),
        }
    }

    pub fn from_schema(schema: &CanonicalSchema) -> Self {
        Self::new(schema.free_text_column.clone(), schema.price_column.clone())
    }
}

impl Stage for FieldReconciler {
    fn name(&self) -> &'static str {
        "reconcile"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let free_idx = table.column_index(&self.free_text_column)?;
        let price_idx = table.column_index(&self.price_column)?;
        if free_idx == price_idx {
            return Err(RepairError::RoleCollision {
                column: self.price_column.clone(),
                first: "free text",
                second: "price",
            });
        }
        let needed = free_idx.max(price_idx) + 1;

        let mut changed = 0usize;
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let free_text = Table::cell(row, free_idx);
                let price = Table::cell(row, price_idx);
                let (new_free_text, new_price) = reconcile_cells(free_text, price);
                if new_free_text == free_text && new_price == price {
                    return row.clone();
                }
                changed += 1;
                let mut row = row.clone();
                pad_to(&mut row, needed);
                row[free_idx] = new_free_text;
                row[price_idx] = new_price;
                row
            })
            .collect();
        debug!("Reconciled price/description content in {changed} row(s)");
        Ok(Table::new(table.headers.clone(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_pattern_is_strict() {
        for valid in ["8", "$8", "8.5", "$8.00", "12.99", "$0"] {
            assert!(is_price_shaped(valid), "{valid} should match");
        }
        for invalid in ["", "$", "8.", "8.999", "$ 8", "8,00", "ask server", "$8.00 each", "-3"] {
            assert!(!is_price_shaped(invalid), "{invalid:?} should not match");
        }
    }

    #[test]
    fn free_text_branch_is_independent() {
        assert_eq!(classify_free_text("Crispy", ""), FreeTextAction::Keep);
        assert_eq!(classify_free_text("$8.00", ""), FreeTextAction::MoveToPrice);
        assert_eq!(classify_free_text("$8.00", "9"), FreeTextAction::Clear);
        assert_eq!(classify_free_text("", ""), FreeTextAction::Keep);
    }

    #[test]
    fn price_branch_is_independent() {
        assert_eq!(classify_price(""), PriceAction::Keep);
        assert_eq!(classify_price("$4.50"), PriceAction::Keep);
        assert_eq!(classify_price("ask server"), PriceAction::MoveToFreeText);
    }

    #[test]
    fn price_in_description_moves_verbatim() {
        assert_eq!(
            reconcile_cells("$8.00", ""),
            (String::new(), "$8.00".to_string())
        );
    }

    #[test]
    fn existing_price_wins() {
        assert_eq!(
            reconcile_cells("8.00", "$9.49"),
            (String::new(), "$9.49".to_string())
        );
    }

    #[test]
    fn text_in_price_is_appended_to_description() {
        assert_eq!(
            reconcile_cells("Seasonal item", "ask server"),
            ("Seasonal item ask server".to_string(), String::new())
        );
        assert_eq!(
            reconcile_cells("", " Market price "),
            ("Market price".to_string(), String::new())
        );
    }

    #[test]
    fn both_branches_apply_to_one_row() {
        assert_eq!(
            reconcile_cells("5", "varies"),
            ("varies".to_string(), String::new())
        );
    }

    #[test]
    fn stage_rewrites_only_affected_cells() {
        let table = Table::from_strs(
            &["ID", "DESCRIPTION", "PRICE"],
            &[
                &["1", "$3.50", ""],
                &["2", "Tasty", "$4"],
                &["3", "Fresh", "n/a"],
            ],
        );
        let out = FieldReconciler::new("DESCRIPTION", "PRICE")
            .apply(&table)
            .expect("reconcile");
        assert_eq!(out.rows[0], vec!["1", "", "$3.50"]);
        assert_eq!(out.rows[1], vec!["2", "Tasty", "$4"]);
        assert_eq!(out.rows[2], vec!["3", "Fresh n/a", ""]);
    }

    #[test]
    fn short_rows_are_padded_only_when_written() {
        let table = Table::from_strs(
            &["ID", "DESCRIPTION", "PRICE"],
            &[&["1", "$2"], &["2"]],
        );
        let out = FieldReconciler::new("DESCRIPTION", "PRICE")
            .apply(&table)
            .expect("reconcile");
        assert_eq!(out.rows[0], vec!["1", "", "$2"]);
        assert_eq!(out.rows[1], vec!["2"]);
    }

    #[test]
    fn same_column_for_free_text_and_price_is_fatal() {
        let table = Table::from_strs(&["ID", "PRICE"], &[&["1", "$2"]]);
        let err = FieldReconciler::new("PRICE", "PRICE")
            .apply(&table)
            .unwrap_err();
        assert_eq!(
            err,
            RepairError::RoleCollision {
                column: "PRICE".to_string(),
                first: "free text",
                second: "price",
            }
        );
    }

    #[test]
    fn missing_price_column_is_fatal() {
        let table = Table::from_strs(&["ID", "DESCRIPTION"], &[]);
        assert!(
            FieldReconciler::new("DESCRIPTION", "PRICE")
                .apply(&table)
                .is_err()
        );
    }
}
