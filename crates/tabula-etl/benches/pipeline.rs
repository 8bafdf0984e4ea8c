//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tabula_core::{Dataset, Row};
use tabula_etl::{CaseType, DatePart, KeyOrder, Pipeline, TransformStep};

fn orders(n: usize) -> Dataset {
    (0..n)
        .map(|i| {
            Row::new()
                .with("customer", format!("  customer {} ", i % 97))
                .with("amount", format!("${},{:03}.50", i % 9 + 1, i % 1000))
                .with("cost", (i % 500) as f64)
                .with("order_date", format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1))
        })
        .collect()
}

fn cleaning_pipeline() -> Pipeline {
    Pipeline::from_steps(vec![
        TransformStep::Trim {
            column: "customer".to_string(),
        },
        TransformStep::ChangeCase {
            column: "customer".to_string(),
            case_type: CaseType::Capitalize,
        },
        TransformStep::RemoveCurrency {
            column: "amount".to_string(),
        },
        TransformStep::Calculated {
            col_name: "margin".to_string(),
            formula: "({amount} - {cost}) / {amount} * 100".to_string(),
        },
        TransformStep::ExtractDate {
            column: "order_date".to_string(),
            part: DatePart::Quarter,
            new_col: None,
        },
        TransformStep::RemoveDuplicates {
            key_order: KeyOrder::Preserve,
        },
    ])
}

fn bench_pipeline(c: &mut Criterion) {
    let source = orders(5_000);
    let pipeline = cleaning_pipeline();
    c.bench_function("pipeline_apply_5k", |b| {
        b.iter(|| pipeline.apply(black_box(&source)));
    });
    c.bench_function("pipeline_preview_5k", |b| {
        b.iter(|| pipeline.preview(black_box(&source)));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
