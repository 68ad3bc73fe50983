//! Stage abstraction and the composed repair pipeline.
//!
//! Every stage is a pure `&Table -> Table` transformation. A [`Pipeline`]
//! runs its stages in order and stops at the first fatal error, so either the
//! whole table is repaired or nothing is produced.

use std::fmt;

use log::debug;

use crate::{
    backfill::IdBackfill,
    columns::ColumnDrop,
    error::Result,
    normalize::SchemaNormalizer,
    realign::RowRealigner,
    reconcile::FieldReconciler,
    schema::CanonicalSchema,
    table::Table,
};

pub trait Stage {
    fn name(&self) -> &'static str;
    fn apply(&self, table: &Table) -> Result<Table>;
}

/// Stage kinds of the `clean` pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Backfill,
    Realign,
    DropColumns,
    Normalize,
    Reconcile,
}

impl StageKind {
    pub const ORDER: [StageKind; 5] = [
        StageKind::Backfill,
        StageKind::Realign,
        StageKind::DropColumns,
        StageKind::Normalize,
        StageKind::Reconcile,
    ];
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageKind::Backfill => "backfill",
            StageKind::Realign => "realign",
            StageKind::DropColumns => "drop-columns",
            StageKind::Normalize => "normalize",
            StageKind::Reconcile => "reconcile",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub schema: CanonicalSchema,
    pub drop_columns: Vec<String>,
    pub skip: Vec<StageKind>,
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Builds the standard repair sequence, leaving out any skipped stage kinds.
    pub fn clean(options: &CleanOptions) -> Result<Self> {
        let mut pipeline = Pipeline::new();
        for kind in StageKind::ORDER {
            if options.skip.contains(&kind) {
                debug!("Skipping stage '{kind}'");
                continue;
            }
            pipeline = match kind {
                StageKind::Backfill => pipeline.with_stage(IdBackfill::new(&options.schema.id_column)),
                StageKind::Realign => pipeline.with_stage(RowRealigner),
                StageKind::DropColumns => options
                    .drop_columns
                    .iter()
                    .fold(pipeline, |acc, column| acc.with_stage(ColumnDrop::new(column))),
                StageKind::Normalize => {
                    pipeline.with_stage(SchemaNormalizer::new(options.schema.clone())?)
                }
                StageKind::Reconcile => {
                    pipeline.with_stage(FieldReconciler::from_schema(&options.schema))
                }
            };
        }
        Ok(pipeline)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, table: &Table) -> Result<Table> {
        let mut current = table.clone();
        for stage in &self.stages {
            current = stage.apply(&current)?;
            debug!(
                "Stage '{}' produced {} row(s)",
                stage.name(),
                current.row_count()
            );
        }
        Ok(current)
    }
}
