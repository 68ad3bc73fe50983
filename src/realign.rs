//! Row realignment and identifier renumbering.
//!
//! A row whose leading cell is not an integer is assumed to have lost its
//! identifier cell, which pulled every later value one column to the left.
//! Realignment shifts such rows back right, fits every row to the header
//! width, and then renumbers all identifiers from 1. Prior identifier values
//! are discarded, so this is meant as a one-off repair pass.

use log::debug;

use crate::{
    error::Result,
    pipeline::Stage,
    table::{Row, Table, is_numeric_identifier, pad_to},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Aligned,
    Misaligned,
}

pub fn classify(row: &[String]) -> Alignment {
    match row.first() {
        Some(cell) if is_numeric_identifier(cell) => Alignment::Aligned,
        _ => Alignment::Misaligned,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RowRealigner;

impl Stage for RowRealigner {
    fn name(&self) -> &'static str {
        "realign"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        Ok(realign_rows(table))
    }
}

pub fn realign_rows(table: &Table) -> Table {
    let width = table.width();
    let mut shifted = 0usize;
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut fixed: Row = Vec::with_capacity(width.max(row.len() + 1));
            if classify(row) == Alignment::Misaligned {
                fixed.push(String::new());
                shifted += 1;
            }
            fixed.extend(row.iter().cloned());
            pad_to(&mut fixed, width);
            fixed.truncate(width);
            if let Some(id) = fixed.first_mut() {
                *id = (idx + 1).to_string();
            }
            fixed
        })
        .collect();
    debug!("Shifted {shifted} misaligned row(s) of {}", table.row_count());
    Table::new(table.headers.clone(), rows)
}

/// Overwrites the identifier column with `1, 2, 3, …` without moving any cells.
#[derive(Debug, Clone)]
pub struct IdRenumber {
    pub id_column: String,
}

impl IdRenumber {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
        }
    }
}

impl Stage for IdRenumber {
    fn name(&self) -> &'static str {
        "renumber"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        renumber_ids(table, &self.id_column)
    }
}

pub fn renumber_ids(table: &Table, id_column: &str) -> Result<Table> {
    let id_idx = table.column_index(id_column)?;
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut row = row.clone();
            pad_to(&mut row, id_idx + 1);
            row[id_idx] = (idx + 1).to_string();
            row
        })
        .collect();
    Ok(Table::new(table.headers.clone(), rows))
}
