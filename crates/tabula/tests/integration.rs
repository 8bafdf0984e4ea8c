//! End-to-end scenarios across the engine crates.

use proptest::prelude::*;
use tabula::etl::{KeyOrder, Pipeline, TransformStep};
use tabula::manifest::Manifest;
use tabula::query::WidgetBinding;
use tabula::prelude::*;
use tabula::{detect_column_types, evaluate, ColumnType, Formula};

fn regions() -> Dataset {
    Dataset::from_rows(vec![
        row! { "region" => "North", "revenue" => 100 },
        row! { "region" => "North", "revenue" => 50 },
        row! { "region" => "South", "revenue" => 80 },
    ])
}

// ===== Scenario Tests =====

#[test]
fn test_aggregation_scenario() {
    let spec = AggregationSpec::new("region", "revenue", Aggregator::Sum);
    let out = aggregate_data(&regions(), &spec).into_dataset();
    assert_eq!(
        out,
        Dataset::from_rows(vec![
            row! { "region" => "North", "revenue" => 150 },
            row! { "region" => "South", "revenue" => 80 },
        ])
    );
}

#[test]
fn test_calculated_column_scenario() {
    let step: TransformStep = serde_json::from_str(
        r#"{"type": "calculated", "colName": "margin", "formula": "{revenue}-{cost}"}"#,
    )
    .unwrap();
    let source = Dataset::from_rows(vec![row! { "revenue" => 100, "cost" => 60 }]);
    let out = step.apply(&source).unwrap();
    assert_eq!(
        out.rows()[0],
        row! { "revenue" => 100, "cost" => 60, "margin" => 40 }
    );
}

#[test]
fn test_split_scenario() {
    let step: TransformStep = serde_json::from_str(
        r#"{"type": "split", "column": "name", "separator": ",", "newCols": ["first", "last"]}"#,
    )
    .unwrap();
    let out = step
        .apply(&Dataset::from_rows(vec![row! { "name" => "John,Doe" }]))
        .unwrap();
    assert_eq!(out.rows()[0].value("first"), &Value::from("John"));
    assert_eq!(out.rows()[0].value("last"), &Value::from("Doe"));
}

#[test]
fn test_global_dynamic_filter_scenario() {
    let data = Dataset::from_rows(vec![
        row! { "id" => 1, "category" => "A" },
        row! { "id" => 2, "category" => "B" },
        row! { "id" => 3, "category" => "A" },
    ]);
    let state: GlobalFilterState =
        serde_json::from_str(r#"{"dynamic": [{"field": "category", "values": ["A"]}]}"#).unwrap();
    let config = WidgetConfig {
        apply_global_filters: true,
        ..WidgetConfig::default()
    };
    let out = apply_global_filters(&data, &state, &config);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|r| r.value("category") == &Value::from("A")));
}

#[test]
fn test_limit_scenario() {
    let out = limit_data(&regions(), 2, LimitDirection::Top, Some("revenue"));
    assert_eq!(
        out,
        Dataset::from_rows(vec![
            row! { "region" => "North", "revenue" => 100 },
            row! { "region" => "South", "revenue" => 80 },
        ])
    );
}

// ===== Evaluator Tests =====

#[test]
fn test_evaluator_precedence_and_zero_division() {
    assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
    let formula = Formula::new("{a}/{b}");
    assert_eq!(formula.evaluate_row(&row! { "a" => 1, "b" => 0 }).unwrap(), 0.0);
}

// ===== Dashboard Tests =====

#[test]
fn test_manifest_pipeline_then_widgets() {
    let manifest = Manifest::from_yaml(
        r"
global:
  search: north
widgets:
  - id: byRegion
    type: barChart
    config:
      applyGlobalFilters: true
      aggregation: { dimension: region, measure: revenue, aggregator: average }
  - id: table
    type: table
    config:
      filters:
        - { field: revenue, condition: gte, value: 80 }
      sort: { by: revenue, order: asc }
pipeline:
  steps:
    - { type: toNumber, column: revenue }
",
    )
    .unwrap();
    let raw = Dataset::from_rows(vec![
        row! { "region" => "North", "revenue" => "100" },
        row! { "region" => "North", "revenue" => "50" },
        row! { "region" => "South", "revenue" => "80" },
    ]);
    let prepared = manifest.prepare(&raw).unwrap();

    let chart = manifest.query(&prepared, "byRegion").unwrap();
    assert_eq!(chart.rows(), &[row! { "region" => "North", "revenue" => 75 }]);

    let table = manifest.query(&prepared, "table").unwrap();
    assert_eq!(
        table,
        Dataset::from_rows(vec![
            row! { "region" => "South", "revenue" => 80 },
            row! { "region" => "North", "revenue" => 100 },
        ])
    );
}

#[test]
fn test_types_after_pipeline() {
    let raw = Dataset::from_rows(vec![
        row! { "when" => "2024-03-01", "amount" => "$1,000", "note" => "ok" },
        row! { "when" => "2024-03-02", "amount" => "$250", "note" => "" },
    ]);
    let before = detect_column_types(&raw);
    assert_eq!(before.get("amount"), Some(ColumnType::Text));
    assert_eq!(before.get("when"), Some(ColumnType::Date));

    let pipeline: Pipeline = vec![TransformStep::RemoveCurrency {
        column: "amount".to_string(),
    }]
    .into();
    let after = detect_column_types(&pipeline.apply(&raw).unwrap());
    assert_eq!(after.get("amount"), Some(ColumnType::Number));
}

// ===== Property Tests =====

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(
        (prop::sample::select(vec!["a", "b", "c"]), -1000i32..1000),
        0..40,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(key, n)| row! { "key" => key, "n" => n })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_empty_filter_is_identity(data in arb_dataset()) {
        prop_assert_eq!(filter_data(&data, &[]), data);
    }

    #[test]
    fn prop_empty_cross_filter_list_is_identity(data in arb_dataset()) {
        let widgets = vec![WidgetBinding::filter("picker", "key", ["chart"])];
        let mut live = std::collections::HashMap::new();
        live.insert("picker".to_string(), LiveValue::List(Vec::new()));
        prop_assert_eq!(apply_cross_filters(&data, "chart", &widgets, &live), data);
    }

    #[test]
    fn prop_grouped_sum_matches_total(data in arb_dataset()) {
        let spec = AggregationSpec::new("key", "n", Aggregator::Sum);
        let grouped = aggregate_data(&data, &spec).into_dataset();
        let total: f64 = data.iter().map(|r| r.value("n").to_number_or_zero()).sum();
        let reduced: f64 = grouped.iter().map(|r| r.value("n").to_number_or_zero()).sum();
        prop_assert_eq!(total, reduced);
    }

    #[test]
    fn prop_canonical_dedup_is_idempotent(data in arb_dataset()) {
        let step = TransformStep::RemoveDuplicates { key_order: KeyOrder::Canonical };
        let once = step.apply(&data).unwrap();
        prop_assert_eq!(step.apply(&once).unwrap(), once);
    }
}
