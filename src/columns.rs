//! Column removal by name.

use log::debug;

use crate::{error::Result, pipeline::Stage, table::Table};

#[derive(Debug, Clone)]
pub struct ColumnDrop {
    pub column: String,
}

impl ColumnDrop {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Stage for ColumnDrop {
    fn name(&self) -> &'static str {
        "drop-column"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        drop_column(table, &self.column)
    }
}

/// Removes `column` from the header and from every row long enough to hold it.
pub fn drop_column(table: &Table, column: &str) -> Result<Table> {
    let idx = table.column_index(column)?;
    let mut headers = table.headers.clone();
    headers.remove(idx);
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if row.len() > idx {
                row.remove(idx);
            }
            row
        })
        .collect();
    debug!("Dropped column '{column}' at position {}", idx + 1);
    Ok(Table::new(headers, rows))
}
