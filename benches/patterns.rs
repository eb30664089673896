//! Benchmarks for candlestick pattern classification.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use stockday::prelude::*;

/// Generate deterministic "random" days
fn generate_days(n: usize) -> Vec<DayRecord> {
  let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
  let mut days = Vec::with_capacity(n);
  let mut price = Decimal::new(10_000, 2);

  for i in 0..n {
    let change = Decimal::new(((i * 7 + 13) % 100) as i64 * 2 - 100, 2);
    let spread = Decimal::new(100 + ((i * 3) % 10) as i64 * 20, 2);

    let open = price;
    let close = price + change;
    let high = if i % 5 == 0 { open.max(close) } else { open.max(close) + spread / Decimal::TWO };
    let low = open.min(close) - spread;

    days.push(DayRecord::new(start + Duration::days(i as i64), open, high, low, close).unwrap());
    price = close;
  }

  days
}

fn bench_construct(c: &mut Criterion) {
  let open = Decimal::new(5825, 2);
  let high = Decimal::new(5865, 2);
  let low = Decimal::new(5820, 2);
  let close = Decimal::new(5835, 2);
  let date = NaiveDate::from_ymd_opt(2016, 10, 31).unwrap();

  c.bench_function("construct_day_record", |b| {
    b.iter(|| DayRecord::new(black_box(date), black_box(open), high, low, close))
  });
}

fn bench_single_pattern(c: &mut Criterion) {
  let days = generate_days(1000);
  let classifier = Classifier::default();

  c.bench_function("find_hammer_1000_days", |b| {
    b.iter(|| {
      let _ = black_box(classifier.find_matches("hammer", black_box(&days)));
    })
  });
}

fn bench_all_patterns(c: &mut Criterion) {
  let days = generate_days(1000);
  let classifier = Classifier::default();

  c.bench_function("scan_all_patterns_1000_days", |b| {
    b.iter(|| {
      let _ = black_box(classifier.scan_all(black_box(&days)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let mut group = c.benchmark_group("scaling");
  let sequential = Classifier::default();
  let parallel = ClassifierBuilder::new().with_all_defaults().parallel(true).build().unwrap();

  for size in [100, 1000, 10000].iter() {
    let days = generate_days(*size);

    group.bench_with_input(BenchmarkId::new("sequential", size), &days, |b, days| {
      b.iter(|| {
        let _ = black_box(sequential.find_matches("evening_star", days));
      })
    });

    group.bench_with_input(BenchmarkId::new("parallel", size), &days, |b, days| {
      b.iter(|| {
        let _ = black_box(parallel.find_matches("evening_star", days));
      })
    });
  }

  group.finish();
}

criterion_group!(benches, bench_construct, bench_single_pattern, bench_all_patterns, bench_scaling);
criterion_main!(benches);
