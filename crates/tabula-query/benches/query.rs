//! Benchmarks for the widget query chain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabula_core::{Dataset, Row};
use tabula_query::{
    aggregate_data, filter_data, sort_data, AggregationSpec, Aggregator, DashboardContext,
    FilterCondition, GlobalFilterState, Operator, SortBy, SortOrder, SortSpec, Widget,
    WidgetConfig,
};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [&str; 3] = ["A", "B", "C"];

fn sales(n: usize) -> Dataset {
    (0..n)
        .map(|i| {
            Row::new()
                .with("region", REGIONS[i % REGIONS.len()])
                .with("product", PRODUCTS[i % PRODUCTS.len()])
                .with("revenue", (i * 37 % 1000) as f64)
                .with("order_date", format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1))
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let conditions = [
        FilterCondition::new("region", Operator::NotEquals, "East"),
        FilterCondition::new("revenue", Operator::Gte, 100),
    ];
    for n in [1_000, 10_000] {
        let ds = sales(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ds, |b, ds| {
            b.iter(|| filter_data(black_box(ds), black_box(&conditions)));
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let ds = sales(10_000);
    let grouped = AggregationSpec::new("region", "revenue", Aggregator::Sum);
    let pivoted = grouped.clone().color_by("product");
    group.bench_function("grouped", |b| {
        b.iter(|| aggregate_data(black_box(&ds), black_box(&grouped)));
    });
    group.bench_function("pivoted", |b| {
        b.iter(|| aggregate_data(black_box(&ds), black_box(&pivoted)));
    });
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let ds = sales(10_000);
    c.bench_function("sort_by_label", |b| {
        b.iter(|| sort_data(black_box(&ds), &SortBy::Label, SortOrder::Asc, None));
    });
}

fn bench_widget_chain(c: &mut Criterion) {
    let ds = sales(10_000);
    let widget = Widget::new("chart", "barChart").with_config(WidgetConfig {
        apply_global_filters: true,
        aggregation: Some(AggregationSpec::new("region", "revenue", Aggregator::Average)),
        sort: Some(SortSpec {
            by: SortBy::Value,
            order: SortOrder::Desc,
            field: None,
        }),
        ..WidgetConfig::default()
    });
    let ctx = DashboardContext {
        global: GlobalFilterState {
            search: "a".to_string(),
            ..GlobalFilterState::default()
        },
        widgets: vec![widget],
        ..DashboardContext::default()
    };
    c.bench_function("widget_chain", |b| {
        b.iter(|| ctx.query(black_box(&ds), "chart"));
    });
}

criterion_group!(
    benches,
    bench_filter,
    bench_aggregate,
    bench_sort,
    bench_widget_chain
);
criterion_main!(benches);
