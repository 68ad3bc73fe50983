//! Identifier backfill.
//!
//! Fills blank identifier cells with fresh integers that continue after the
//! highest numeric identifier already present. Non-empty identifiers are left
//! exactly as they are, numeric or not.

use log::debug;

use crate::{
    error::Result,
    pipeline::Stage,
    table::{Identifier, Table, pad_to},
};

#[derive(Debug, Clone)]
pub struct IdBackfill {
    pub id_column: String,
}

impl IdBackfill {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
        }
    }
}

impl Stage for IdBackfill {
    fn name(&self) -> &'static str {
        "backfill-ids"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        backfill_ids(table, &self.id_column)
    }
}

pub fn backfill_ids(table: &Table, id_column: &str) -> Result<Table> {
    let id_idx = table.column_index(id_column)?;

    let mut last_id = table
        .rows
        .iter()
        .filter_map(|row| Identifier::parse(Table::cell(row, id_idx)))
        .max()
        .unwrap_or_else(Identifier::zero);

    let mut assigned = 0usize;
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if Table::cell(&row, id_idx).trim().is_empty() {
                last_id = last_id.next();
                pad_to(&mut row, id_idx + 1);
                row[id_idx] = last_id.to_string();
                assigned += 1;
            }
            row
        })
        .collect();

    debug!("Assigned {assigned} identifier(s); highest is now {last_id}");
    Ok(Table::new(table.headers.clone(), rows))
}
