//! Schema normalizer.
//!
//! Reshapes every row to the canonical width. Short rows are padded on the
//! right. Long rows are assumed to carry unescaped delimiters inside the
//! free-text column, so the overflow is folded back into that column and the
//! trailing columns move left into place.
//!
//! The same pass also clears a price cell that holds a bare `true`/`false`
//! (left behind by an earlier bad shift) and coerces the flag column to
//! exactly `true` or `false`.

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    error::Result,
    pipeline::Stage,
    schema::{CanonicalSchema, SchemaLayout},
    table::{Row, Table, pad_to},
};

pub const FLAG_TRUE: &str = "true";
pub const FLAG_FALSE: &str = "false";

#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    schema: CanonicalSchema,
    layout: SchemaLayout,
}

impl SchemaNormalizer {
    pub fn new(schema: CanonicalSchema) -> Result<Self> {
        schema.validate()?;
        let layout = schema.layout()?;
        Ok(Self { schema, layout })
    }

    pub fn normalize_row(&self, row: &[String]) -> Row {
        let mut row = reshape_row(row, self.layout.width, self.layout.free_text);
        coerce_fields(&mut row, &self.layout);
        row
    }
}

impl Stage for SchemaNormalizer {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        if table.headers != self.schema.columns {
            warn!(
                "Input header [{}] differs from canonical schema; rows are reshaped positionally",
                table.headers.join(", ")
            );
        }
        let mut padded = 0usize;
        let mut folded = 0usize;
        let rows = table
            .rows
            .iter()
            .map(|row| {
                if row.len() < self.layout.width {
                    padded += 1;
                } else if row.len() > self.layout.width {
                    folded += 1;
                }
                self.normalize_row(row)
            })
            .collect();
        debug!("Padded {padded} short row(s); folded overflow in {folded} row(s)");
        Ok(Table::new(self.schema.columns.clone(), rows))
    }
}

/// Fits `row` to exactly `width` cells, joining any overflow into `free_text`.
pub fn reshape_row(row: &[String], width: usize, free_text: usize) -> Row {
    let mut reshaped = row.to_vec();
    if reshaped.len() < width {
        pad_to(&mut reshaped, width);
        return reshaped;
    }
    let excess = reshaped.len() - width;
    if excess > 0 && free_text < width {
        let end = free_text + excess;
        let merged = reshaped[free_text..=end].iter().join(" ");
        let tail = reshaped.split_off(end + 1);
        reshaped.truncate(free_text);
        reshaped.push(merged);
        reshaped.extend(tail);
    }
    reshaped.truncate(width);
    reshaped
}

fn coerce_fields(row: &mut Row, layout: &SchemaLayout) {
    if let Some(price) = row.get_mut(layout.price)
        && (*price == FLAG_TRUE || *price == FLAG_FALSE)
    {
        price.clear();
    }
    if let Some(flag) = row.get_mut(layout.flag)
        && *flag != FLAG_TRUE
    {
        *flag = FLAG_FALSE.to_string();
    }
}
