use csv_repair::{
    backfill::backfill_ids,
    normalize::SchemaNormalizer,
    pipeline::{CleanOptions, Pipeline, Stage},
    realign::realign_rows,
    reconcile::{FieldReconciler, is_price_shaped},
    schema::CanonicalSchema,
    table::{Identifier, Table},
};
use proptest::prelude::*;

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("true".to_string()),
        Just("false".to_string()),
        "[0-9]{1,3}",
        "[0-9]{18,25}",
        Just(i64::MAX.to_string()),
        "\\$[0-9]{1,2}\\.[0-9]{2}",
        "[A-Za-z ,\"]{1,12}",
    ]
}

fn table_strategy() -> impl Strategy<Value = Table> {
    let headers = CanonicalSchema::default().columns;
    proptest::collection::vec(proptest::collection::vec(cell_strategy(), 0..14), 0..20)
        .prop_map(move |rows| Table::new(headers.clone(), rows))
}

fn normalizer() -> SchemaNormalizer {
    SchemaNormalizer::new(CanonicalSchema::default()).expect("schema")
}

proptest! {
    #[test]
    fn backfill_assigns_increasing_ids_above_existing_max(table in table_strategy()) {
        let existing_max = table
            .rows
            .iter()
            .filter_map(|row| row.first().and_then(|id| Identifier::parse(id)))
            .max()
            .unwrap_or_else(Identifier::zero);
        let out = backfill_ids(&table, "ID").expect("backfill");
        prop_assert_eq!(out.row_count(), table.row_count());

        let mut previous = existing_max;
        for (before, after) in table.rows.iter().zip(&out.rows) {
            prop_assert!(!after[0].trim().is_empty());
            let was_blank = before.first().is_none_or(|id| id.trim().is_empty());
            if was_blank {
                let assigned = Identifier::parse(&after[0]).expect("numeric id");
                prop_assert_eq!(assigned.as_str(), after[0].as_str());
                prop_assert!(assigned > previous);
                previous = assigned;
            } else {
                prop_assert_eq!(&before[0], &after[0]);
            }
        }
    }

    #[test]
    fn realign_produces_header_width_rows_numbered_from_one(table in table_strategy()) {
        let out = realign_rows(&table);
        prop_assert_eq!(out.row_count(), table.row_count());
        for (idx, row) in out.rows.iter().enumerate() {
            prop_assert_eq!(row.len(), table.width());
            prop_assert_eq!(row[0].clone(), (idx + 1).to_string());
        }
    }

    #[test]
    fn normalizer_is_idempotent_and_closes_flags(table in table_strategy()) {
        let stage = normalizer();
        let once = stage.apply(&table).expect("first pass");
        let twice = stage.apply(&once).expect("second pass");
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.row_count(), table.row_count());
        for row in &once.rows {
            prop_assert_eq!(row.len(), 9);
            prop_assert!(row[8] == "true" || row[8] == "false");
        }
    }

    #[test]
    fn reconciler_converges(table in table_strategy()) {
        let normalized = normalizer().apply(&table).expect("normalize");
        let out = FieldReconciler::from_schema(&CanonicalSchema::default())
            .apply(&normalized)
            .expect("reconcile");
        prop_assert_eq!(out.row_count(), table.row_count());
        for row in &out.rows {
            prop_assert!(row[7].is_empty() || is_price_shaped(&row[7]));
            prop_assert!(!is_price_shaped(&row[6]));
        }
    }

    #[test]
    fn clean_pipeline_preserves_row_count(table in table_strategy()) {
        let out = Pipeline::clean(&CleanOptions::default())
            .expect("pipeline")
            .run(&table)
            .expect("run");
        prop_assert_eq!(out.row_count(), table.row_count());
        prop_assert!(out.rows.iter().all(|row| row.len() == 9));
    }
}
