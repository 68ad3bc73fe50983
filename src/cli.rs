use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::StageKind;
use crate::schema::DEFAULT_ID_COLUMN;

#[derive(Debug, Parser)]
#[command(author, version, about = "Repair schema drift in menu CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill blank identifiers with values after the highest existing numeric ID
    BackfillIds(IdArgs),
    /// Shift rows that lost their leading ID cell and renumber every row from 1
    Realign(IoArgs),
    /// Overwrite the identifier column with sequential values
    Renumber(IdArgs),
    /// Remove a named column from the header and every row
    DropColumn(DropColumnArgs),
    /// Reshape rows to the canonical schema and coerce flag values
    Normalize(SchemaArgs),
    /// Move prices out of descriptions and text out of prices
    Reconcile(SchemaArgs),
    /// Run the full repair pipeline
    Clean(CleanArgs),
    /// Write the built-in canonical schema as YAML
    Schema(SchemaExportArgs),
}

#[derive(Debug, Args)]
pub struct IoArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[command(flatten)]
    pub io: IoArgs,
    /// Name of the identifier column
    #[arg(long = "id-column", default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,
}

#[derive(Debug, Args)]
pub struct DropColumnArgs {
    #[command(flatten)]
    pub io: IoArgs,
    /// Column to remove
    #[arg(short = 'c', long = "column")]
    pub column: String,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub io: IoArgs,
    /// Canonical schema YAML (built-in menu schema if omitted)
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub io: IoArgs,
    /// Canonical schema YAML (built-in menu schema if omitted)
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
    /// Columns to remove before normalizing (repeatable)
    #[arg(long = "drop-column", action = clap::ArgAction::Append)]
    pub drop_columns: Vec<String>,
    /// Pipeline stages to skip (repeatable)
    #[arg(long = "skip", value_enum, action = clap::ArgAction::Append)]
    pub skip: Vec<SkipStage>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum SkipStage {
    Backfill,
    Realign,
    DropColumns,
    Normalize,
    Reconcile,
}

impl From<SkipStage> for StageKind {
    fn from(value: SkipStage) -> Self {
        match value {
            SkipStage::Backfill => StageKind::Backfill,
            SkipStage::Realign => StageKind::Realign,
            SkipStage::DropColumns => StageKind::DropColumns,
            SkipStage::Normalize => StageKind::Normalize,
            SkipStage::Reconcile => StageKind::Reconcile,
        }
    }
}

#[derive(Debug, Args)]
pub struct SchemaExportArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Emit the ten-column layout that still includes DINING PLAN
    #[arg(long)]
    pub legacy: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
