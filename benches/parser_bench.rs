//! Performance benchmarks for the TP parser.
//!
//! Run with:
//! ```sh
//! cargo bench --bench parser_bench
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use respb_protocol::{parse_frame, CommandRecord, Outcome, StreamParser};
use std::hint::black_box;

fn encode_frame(verb: &str, args: &[&[u8]]) -> Vec<u8> {
    let args: Vec<Vec<u8>> = args.iter().map(|a| a.to_vec()).collect();
    CommandRecord::new(verb.as_bytes(), args).to_tp_bytes()
}

fn bench_parse_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_simple");
    group.throughput(Throughput::Elements(1));

    let frame = encode_frame("GET", &[b"mykey"]);

    group.bench_function("parse_get", |b| {
        b.iter(|| {
            let outcome = parse_frame(black_box(&frame));
            black_box(outcome);
        });
    });

    group.finish();
}

fn bench_parse_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_complex");
    group.throughput(Throughput::Elements(1));

    let frame = encode_frame("SET", &[b"foo", b"hello", b"EX", b"60"]);

    group.bench_function("parse_set_with_flags", |b| {
        b.iter(|| {
            let outcome = parse_frame(black_box(&frame));
            black_box(outcome);
        });
    });

    group.finish();
}

fn bench_parse_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_batch");

    for batch_size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));

        let mut stream = Vec::new();
        for _ in 0..*batch_size {
            stream.extend(encode_frame("GET", &[b"mykey"]));
        }

        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &stream, |b, stream| {
            b.iter(|| {
                let mut parser = StreamParser::new();
                parser.feed(black_box(stream));
                let mut count = 0;
                while parser.next_frame().is_some() {
                    count += 1;
                }
                black_box(count);
            });
        });
    }

    group.finish();
}

fn bench_parse_partial_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_partial_streaming");
    group.throughput(Throughput::Elements(1));

    let frame = encode_frame("SET", &[b"foo", b"hello", b"EX", b"60"]);

    for chunk_size in [4, 8, 16].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chunk_{chunk_size}_bytes")),
            chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut parser = StreamParser::new();
                    for chunk in frame.chunks(size) {
                        parser.feed(chunk);
                    }
                    black_box(parser.next_frame());
                });
            },
        );
    }

    group.finish();
}

fn bench_resync_after_garbage(c: &mut Criterion) {
    let mut group = c.benchmark_group("resync_after_garbage");
    group.throughput(Throughput::Elements(1));

    let mut stream = b"garbage-garbage-garbage".to_vec();
    stream.extend(encode_frame("PING", &[]));

    group.bench_function("parse_after_leading_garbage", |b| {
        b.iter(|| {
            let outcome = parse_frame(black_box(&stream));
            black_box(outcome);
        });
    });

    group.bench_function("resync_finds_next_frame", |b| {
        b.iter(|| match parse_frame(&stream) {
            Outcome::Malformed { at_offset } => black_box(at_offset),
            _ => 0,
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_complex,
    bench_parse_batch,
    bench_parse_partial_streaming,
    bench_resync_after_garbage,
);

criterion_main!(benches);
