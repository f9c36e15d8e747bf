use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fragmenter::enumerator::fragment_metadata;
use fragmenter::{IntervalUnit, PartitionPlan};

fn bench_int_range(c: &mut Criterion) {
    let plan = PartitionPlan::Int {
        column: String::from("id"),
        start: 0,
        end: 1_000_000,
        interval: 10,
    };
    c.bench_function("int 100k fragments", |b| {
        b.iter(|| fragment_metadata(black_box(Some(&plan)), None).unwrap())
    });
}

fn bench_date_range(c: &mut Criterion) {
    let plan = PartitionPlan::Date {
        column: String::from("createdate"),
        start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2100, 1, 1).unwrap(),
        interval: 1,
        unit: IntervalUnit::Day,
    };
    c.bench_function("date daily fragments over 200 years", |b| {
        b.iter(|| fragment_metadata(black_box(Some(&plan)), None).unwrap())
    });
}

criterion_group!(benches, bench_int_range, bench_date_range);
criterion_main!(benches);
