use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use syslog_parser::ParserConfig;
use syslog_tests::{block_on, chunked, parse_chunks, synthetic_log};

fn bench_parse_single(c: &mut Criterion) {
    let input = b"<123>1 2018-01-01T00:00:00Z localhost myapp 1 - [x@1 test=\"1\\\"2\"] msg1\n";

    c.bench_function("parse_single", |b| {
        b.iter(|| block_on(parse_chunks(chunked(input, input.len()), ParserConfig::default())).unwrap());
    });
}

fn bench_parse_chunk_sizes(c: &mut Criterion) {
    let input = synthetic_log(1000);
    let mut group = c.benchmark_group("parse_chunk_size");
    group.throughput(Throughput::Bytes(input.len() as u64));

    for size in [64, 512, 4096, 65536] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| block_on(parse_chunks(chunked(&input, size), ParserConfig::default())).unwrap());
        });
    }

    group.finish();
}

fn bench_parse_caches(c: &mut Criterion) {
    let input = synthetic_log(1000);
    let mut group = c.benchmark_group("parse_caches");
    group.throughput(Throughput::Bytes(input.len() as u64));

    let configs = [
        ("cached", ParserConfig::default()),
        ("no_field_cache", ParserConfig::default().with_field_cache(false)),
        ("no_interning", ParserConfig::default().with_max_interned_keys(0)),
    ];
    for (name, config) in configs {
        group.bench_function(name, |b| {
            b.iter(|| block_on(parse_chunks(chunked(&input, 4096), config.clone())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_single, bench_parse_chunk_sizes, bench_parse_caches);
criterion_main!(benches);
