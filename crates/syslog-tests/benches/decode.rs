use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use syslog_decoder::{CharBuffer, IncrementalDecoder};
use syslog_wire::GrowableBuffer;

fn bench_decode_slices(c: &mut Criterion) {
    let text = "ascii and ünïcödé € \u{1F600} ".repeat(512);
    let bytes = text.as_bytes();
    let mut group = c.benchmark_group("decode_slices");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    for piece in [7, 64, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(piece), &piece, |b, &piece| {
            b.iter(|| {
                let mut decoder = IncrementalDecoder::default();
                let mut dst = CharBuffer::with_capacity(bytes.len());
                let count = bytes.chunks(piece).count();
                for (i, part) in bytes.chunks(piece).enumerate() {
                    decoder.decode(part, &mut dst, i + 1 == count).unwrap();
                }
                dst.len()
            });
        });
    }

    group.finish();
}

fn bench_growable_buffer(c: &mut Criterion) {
    let block = vec![0xA5u8; 1500];
    let mut group = c.benchmark_group("growable_buffer");
    group.throughput(Throughput::Bytes(64 * 1500));

    group.bench_function("write_then_read", |b| {
        let mut buffer = GrowableBuffer::new();
        let mut out = vec![0u8; 1500];
        b.iter(|| {
            buffer.clear();
            for _ in 0..64 {
                buffer.write(&block);
            }
            let mut position = 0;
            while let Some(n) = buffer.read_at(&mut out, position) {
                position += n as u64;
            }
            position
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode_slices, bench_growable_buffer);
criterion_main!(benches);
