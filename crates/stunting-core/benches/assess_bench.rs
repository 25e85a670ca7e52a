//! Benchmarks for the assessment pipeline.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use stunting_core::{AssessmentRequest, GrowthAssessor, Sex, StandardsTable, age_in_months};

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_embedded_table", |b| {
        b.iter(|| StandardsTable::who_default().unwrap());
    });
}

fn bench_lookup(c: &mut Criterion) {
    let table = StandardsTable::who_default().unwrap();
    c.bench_function("lookup_exact", |b| {
        b.iter(|| table.lookup(black_box(Sex::Female), black_box(37)).unwrap());
    });
    c.bench_function("lookup_clamped", |b| {
        b.iter(|| table.lookup(black_box(Sex::Male), black_box(72)).unwrap());
    });
}

fn bench_assess(c: &mut Criterion) {
    let assessor = GrowthAssessor::new(Arc::new(StandardsTable::who_default().unwrap()));
    let today = NaiveDate::from_ymd_opt(2026, 10, 10).unwrap();
    let request = AssessmentRequest::new("boys", 84.3, "2024-10-22");

    c.bench_function("assess_request", |b| {
        b.iter(|| assessor.assess_request(black_box(&request), today).unwrap());
    });

    let birth = NaiveDate::from_ymd_opt(2022, 3, 17).unwrap();
    c.bench_function("age_in_months", |b| {
        b.iter(|| age_in_months(black_box(birth), black_box(today)));
    });
}

criterion_group!(benches, bench_load, bench_lookup, bench_assess);
criterion_main!(benches);
