pub mod backfill;
pub mod cli;
pub mod columns;
pub mod error;
pub mod io_utils;
pub mod normalize;
pub mod pipeline;
pub mod realign;
pub mod reconcile;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    backfill::IdBackfill,
    cli::{Cli, CleanArgs, Commands, IoArgs, SchemaExportArgs},
    columns::ColumnDrop,
    normalize::SchemaNormalizer,
    pipeline::{CleanOptions, Pipeline, StageKind},
    realign::{IdRenumber, RowRealigner},
    reconcile::FieldReconciler,
    schema::CanonicalSchema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_repair", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::BackfillIds(args) => {
            run_pipeline(&args.io, Pipeline::new().with_stage(IdBackfill::new(args.id_column)))
        }
        Commands::Realign(args) => run_pipeline(&args, Pipeline::new().with_stage(RowRealigner)),
        Commands::Renumber(args) => {
            run_pipeline(&args.io, Pipeline::new().with_stage(IdRenumber::new(args.id_column)))
        }
        Commands::DropColumn(args) => {
            run_pipeline(&args.io, Pipeline::new().with_stage(ColumnDrop::new(args.column)))
        }
        Commands::Normalize(args) => {
            let schema = load_schema(args.schema.as_deref())?;
            let stage = SchemaNormalizer::new(schema).context("Preparing schema normalizer")?;
            run_pipeline(&args.io, Pipeline::new().with_stage(stage))
        }
        Commands::Reconcile(args) => {
            let schema = load_schema(args.schema.as_deref())?;
            run_pipeline(
                &args.io,
                Pipeline::new().with_stage(FieldReconciler::from_schema(&schema)),
            )
        }
        Commands::Clean(args) => handle_clean(args),
        Commands::Schema(args) => handle_schema(&args),
    }
}

fn load_schema(path: Option<&std::path::Path>) -> Result<CanonicalSchema> {
    let schema = CanonicalSchema::load_or_default(path)?;
    debug!("Canonical schema: [{}]", schema.columns.join(", "));
    Ok(schema)
}

fn handle_clean(args: CleanArgs) -> Result<()> {
    let options = CleanOptions {
        schema: load_schema(args.schema.as_deref())?,
        drop_columns: args.drop_columns,
        skip: args.skip.into_iter().map(StageKind::from).collect(),
    };
    let pipeline = Pipeline::clean(&options).context("Building clean pipeline")?;
    run_pipeline(&args.io, pipeline)
}

fn handle_schema(args: &SchemaExportArgs) -> Result<()> {
    let schema = if args.legacy {
        CanonicalSchema::legacy()
    } else {
        CanonicalSchema::default()
    };
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!(
                "Schema with {} column(s) written to {:?}",
                schema.width(),
                path
            );
        }
        _ => print!("{}", schema.to_yaml_string()?),
    }
    Ok(())
}

/// Reads the whole input, runs every stage, and only then writes the output.
fn run_pipeline(io: &IoArgs, pipeline: Pipeline) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&io.input, io.delimiter);
    let encoding = io_utils::resolve_encoding(io.input_encoding.as_deref())?;
    let output_path = io.output.as_deref();
    let output_delimiter = io_utils::resolve_output_delimiter(output_path, delimiter);
    info!(
        "Repairing '{}' with stage(s) [{}] (delimiter '{}')",
        io.input.display(),
        pipeline.stage_names().join(", "),
        printable_delimiter(delimiter)
    );

    let table = io_utils::read_table_from_path(&io.input, delimiter, encoding)?;
    let repaired = pipeline
        .run(&table)
        .with_context(|| format!("Repairing {:?}", io.input))?;
    io_utils::write_table(&repaired, output_path, output_delimiter)?;

    let destination = output_path
        .filter(|path| !io_utils::is_dash(path))
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "Wrote {} row(s) across {} column(s) -> {}",
        repaired.row_count(),
        repaired.width(),
        destination
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
