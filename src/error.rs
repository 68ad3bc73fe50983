//! Fatal error taxonomy for the repair stages.
//!
//! Structural and content anomalies in the data are repaired silently by the
//! stages themselves. Only configuration-level mismatches surface here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepairError {
    #[error("Column '{column}' not found in header (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Duplicate column name '{0}' in schema")]
    DuplicateColumn(String),

    #[error("Schema does not define any columns")]
    EmptySchema,

    #[error("The {first} and {second} roles both use column '{column}'")]
    RoleCollision {
        column: String,
        first: &'static str,
        second: &'static str,
    },
}

impl RepairError {
    pub fn missing_column(column: &str, headers: &[String]) -> Self {
        RepairError::MissingColumn {
            column: column.to_string(),
            available: headers.join(", "),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepairError>;
