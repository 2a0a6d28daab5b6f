use context_codec::{ContextSerializer, ContextValue, ExecutionContext, JobParameter, JobParameters};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn sample_context(size: usize) -> ExecutionContext {
    let mut context = ExecutionContext::new();
    for i in 0..size {
        match i % 4 {
            0 => context.insert(format!("long.{i}"), ContextValue::Long(i as i64)),
            1 => context.insert(format!("text.{i}"), ContextValue::from(format!("value {i}"))),
            2 => context.insert(format!("double.{i}"), ContextValue::Double(i as f64 + 0.5)),
            _ => {
                let mut params = JobParameters::new();
                params.insert("run.id", JobParameter::long(i as i64, true));
                context.insert(format!("params.{i}"), ContextValue::Parameters(params))
            }
        };
    }
    context
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("envelope", size), &size, |b, &size| {
            let codec = ContextSerializer::new();
            let context = sample_context(size);
            let mut sink = Vec::with_capacity(64 * size);
            b.iter(|| {
                sink.clear();
                codec.write(&context, &mut sink).unwrap();
                black_box(sink.len());
            });
        });
    }
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("envelope", size), &size, |b, &size| {
            let codec = ContextSerializer::new();
            let mut blob = Vec::new();
            codec.write(&sample_context(size), &mut blob).unwrap();
            b.iter(|| black_box(codec.read(blob.as_slice()).unwrap()));
        });
    }
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    group.sample_size(50);
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("envelope", size), &size, |b, &size| {
            let codec = ContextSerializer::new();
            let context = sample_context(size);
            let mut sink = Vec::with_capacity(64 * size);
            b.iter(|| {
                sink.clear();
                codec.write(&context, &mut sink).unwrap();
                black_box(codec.read(sink.as_slice()).unwrap());
            });
        });
    }
}

criterion_group!(benches, bench_write, bench_read, bench_roundtrip);
criterion_main!(benches);
