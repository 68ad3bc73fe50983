//! Canonical schema definition and YAML persistence.
//!
//! The [`CanonicalSchema`] is the fixed, authoritative column list every
//! normalized row conforms to, plus the names of the columns that carry a
//! role in the repair stages (identifier, free text, price, flag). It is
//! supplied as configuration and never derived from input data.

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::RepairError;

pub const DEFAULT_ID_COLUMN: &str = "ID";
pub const DEFAULT_FREE_TEXT_COLUMN: &str = "DESCRIPTION";
pub const DEFAULT_PRICE_COLUMN: &str = "PRICE";
pub const DEFAULT_FLAG_COLUMN: &str = "IS_DDP_SNACK";
pub const LEGACY_DINING_PLAN_COLUMN: &str = "DINING PLAN";

const CANONICAL_COLUMNS: &[&str] = &[
    "ID",
    "ITEM",
    "RESTAURANT",
    "CATEGORY",
    "LOCATION",
    "DISNEY PARK",
    "DESCRIPTION",
    "PRICE",
    "IS_DDP_SNACK",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalSchema {
    pub columns: Vec<String>,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_free_text_column")]
    pub free_text_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default = "default_flag_column")]
    pub flag_column: String,
}

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

fn default_free_text_column() -> String {
    DEFAULT_FREE_TEXT_COLUMN.to_string()
}

fn default_price_column() -> String {
    DEFAULT_PRICE_COLUMN.to_string()
}

fn default_flag_column() -> String {
    DEFAULT_FLAG_COLUMN.to_string()
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::with_columns(CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

/// Positional view of a schema, resolved once per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaLayout {
    pub width: usize,
    pub id: usize,
    pub free_text: usize,
    pub price: usize,
    pub flag: usize,
}

impl CanonicalSchema {
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            id_column: default_id_column(),
            free_text_column: default_free_text_column(),
            price_column: default_price_column(),
            flag_column: default_flag_column(),
        }
    }

    /// The ten-column layout that still carries the `DINING PLAN` column.
    pub fn legacy() -> Self {
        let mut columns: Vec<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
        let location = columns
            .iter()
            .position(|c| c == "LOCATION")
            .unwrap_or(columns.len());
        columns.insert(location, LEGACY_DINING_PLAN_COLUMN.to_string());
        Self::with_columns(columns)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn validate(&self) -> std::result::Result<(), RepairError> {
        if self.columns.is_empty() {
            return Err(RepairError::EmptySchema);
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(RepairError::DuplicateColumn(column.clone()));
            }
        }
        self.layout().map(|_| ())
    }

    pub fn layout(&self) -> std::result::Result<SchemaLayout, RepairError> {
        let resolve = |name: &str| {
            self.column_index(name)
                .ok_or_else(|| RepairError::missing_column(name, &self.columns))
        };
        let layout = SchemaLayout {
            width: self.width(),
            id: resolve(&self.id_column)?,
            free_text: resolve(&self.free_text_column)?,
            price: resolve(&self.price_column)?,
            flag: resolve(&self.flag_column)?,
        };
        let roles = [
            ("id", layout.id),
            ("free text", layout.free_text),
            ("price", layout.price),
            ("flag", layout.flag),
        ];
        // Each role writes its own cell; a shared column would lose one write.
        if let Some(((first, idx), (second, _))) = roles
            .into_iter()
            .tuple_combinations()
            .find(|((_, a), (_, b))| a == b)
        {
            return Err(RepairError::RoleCollision {
                column: self.columns[idx].clone(),
                first,
                second,
            });
        }
        Ok(layout)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: CanonicalSchema =
            serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        schema
            .validate()
            .with_context(|| format!("Validating schema {path:?}"))?;
        Ok(schema)
    }

    /// Loads the schema at `path`, or the built-in default when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML string")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }
}
