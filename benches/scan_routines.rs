//! Criterion benchmarks for scan routine dispatch.
//!
//! Run with:
//!   cargo bench --bench scan_routines

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scanmem::scan::{scan_match, DataType, MatchRelation};
use scanmem::value::{parse_uservalue_number, Value};

fn bench_scan_numeric(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_numeric");

    let memory = 42i32.to_le_bytes();
    let old = {
        let mut v = Value::empty();
        v.bytes[..4].copy_from_slice(&41i32.to_le_bytes());
        v.flags = scanmem::value::FLAGS_ALL;
        v
    };
    let user = [parse_uservalue_number("42").unwrap()];

    group.throughput(Throughput::Elements(1));
    group.bench_function(BenchmarkId::new("int32_equal_to", "single_window"), |b| {
        b.iter(|| scan_match(DataType::Int32, MatchRelation::EqualTo, &memory, &old, &user, false))
    });
    group.bench_function(BenchmarkId::new("int32_increased", "single_window"), |b| {
        b.iter(|| scan_match(DataType::Int32, MatchRelation::Increased, &memory, &old, &[], false))
    });
    group.bench_function(BenchmarkId::new("any_number_any", "single_window"), |b| {
        b.iter(|| scan_match(DataType::AnyNumber, MatchRelation::Any, &memory, &old, &[], false))
    });

    group.finish();
}

fn bench_scan_numeric_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_numeric_region");

    // A region-sized buffer of 4-byte windows, simulating one pass of
    // searchregions over a single mapped range.
    for &region_len in &[4_096usize, 65_536] {
        let buf = vec![0u8; region_len];
        let old = Value::empty();

        group.throughput(Throughput::Bytes(region_len as u64));
        group.bench_with_input(BenchmarkId::new("int32_any_scan_pass", region_len), &buf, |b, buf| {
            b.iter(|| {
                let mut matches = 0usize;
                let mut offset = 0usize;
                while offset + 4 <= buf.len() {
                    let outcome = scan_match(DataType::Int32, MatchRelation::Any, &buf[offset..offset + 4], &old, &[], false);
                    if outcome.is_match() {
                        matches += 1;
                    }
                    offset += 4;
                }
                matches
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan_numeric, bench_scan_numeric_region);
criterion_main!(benches);
