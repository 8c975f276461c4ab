use std::sync::Arc;

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use datafusion_common::ScalarValue;
use fsql::{
    ColumnRange, Crawler, DateRange, Expr, PartitionValue, PathPattern, ScanOptions,
    prune::evaluate,
};
use futures_util::TryStreamExt;
use object_store::{ObjectStore, PutPayload, memory::InMemory, path::Path};
use tokio::runtime::Runtime;

// ============================================================================
// Helper Functions
// ============================================================================

/// `t/year=Y/month=M/day=D/part-0.csv` for `years` years starting at 2000.
fn create_store(rt: &Runtime, years: i64) -> Arc<dyn ObjectStore> {
    let store = InMemory::new();
    rt.block_on(async {
        for year in 2000..2000 + years {
            for month in 1..=12 {
                for day in [1, 15] {
                    let location =
                        Path::from(format!("t/year={year}/month={month}/day={day}/part-0.csv"));
                    store
                        .put(&location, PutPayload::from(Bytes::from_static(b"v\n1\n")))
                        .await
                        .unwrap();
                }
            }
        }
    });
    Arc::new(store)
}

fn columns(year: i64, month: i64, day: i64) -> Vec<PartitionValue> {
    vec![
        PartitionValue::new("year", ScalarValue::Int64(Some(year))),
        PartitionValue::new("month", ScalarValue::Int64(Some(month))),
        PartitionValue::new("day", ScalarValue::Int64(Some(day))),
    ]
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let range = DateRange::parse("2001/03/10", "2003/07/01").unwrap();
    let cases = [
        (
            "cmp_and",
            Expr::and(vec![Expr::gt_eq("year", 2001i64), Expr::lt("month", 6i64)]),
        ),
        ("date_range", Expr::date_range(range)),
        (
            "lex_range",
            Expr::lex_range(vec![
                ColumnRange::numeric("year", 2001, 2003).unwrap(),
                ColumnRange::numeric("month", 3, 7).unwrap(),
            ]),
        ),
        (
            "in_list",
            Expr::in_list("month", (1..=12).filter(|m| m % 2 == 0).map(|m| m as i64)),
        ),
    ];
    let partial = columns(2002, 4, 1)[..2].to_vec();
    let full = columns(2002, 4, 1);
    for (name, expr) in &cases {
        group.bench_with_input(BenchmarkId::new(*name, "partial"), &partial, |b, cols| {
            b.iter(|| black_box(evaluate(expr, cols)))
        });
        group.bench_with_input(BenchmarkId::new(*name, "full"), &full, |b, cols| {
            b.iter(|| black_box(evaluate(expr, cols)))
        });
    }
    group.finish();
}

fn bench_crawl(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("crawl");

    for years in [1, 5, 20] {
        let store = create_store(&rt, years);
        let pattern = PathPattern::hive("year:int/month:int/day:int").unwrap();
        let files = years as u64 * 24;
        group.throughput(Throughput::Elements(files));

        // Lists every directory
        group.bench_with_input(BenchmarkId::new("full_scan", years), &years, |b, _| {
            let crawler = Crawler::new(
                store.clone(),
                pattern.clone(),
                Expr::True,
                ScanOptions::default(),
            );
            b.to_async(&rt).iter(|| async {
                let found: Vec<_> = crawler
                    .discover(Path::from("t"))
                    .try_collect()
                    .await
                    .unwrap();
                black_box(found.len())
            })
        });

        // Prunes every year but the first one at the top level
        group.bench_with_input(BenchmarkId::new("pruned", years), &years, |b, _| {
            let crawler = Crawler::new(
                store.clone(),
                pattern.clone(),
                Expr::and(vec![Expr::eq("year", 2000i64), Expr::lt_eq("month", 3i64)]),
                ScanOptions::default(),
            );
            b.to_async(&rt).iter(|| async {
                let found: Vec<_> = crawler
                    .discover(Path::from("t"))
                    .try_collect()
                    .await
                    .unwrap();
                black_box(found.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_crawl);
criterion_main!(benches);
