use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::path::Path;

use popcheck::model::message::RawHeaderFields;
use popcheck::model::store::MessageStore;
use popcheck::pop3::headers::HeaderExtractor;
use popcheck::pop3::response::parse_list_body;

fn header_block() -> Vec<u8> {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("message1.hdr");
    let text = std::fs::read_to_string(fixture_path).unwrap();
    let mut block = b"+OK\r\n".to_vec();
    block.extend_from_slice(text.replace('\n', "\r\n").as_bytes());
    block.extend_from_slice(b".\r\n");
    block
}

fn bench_scan_whole(c: &mut Criterion) {
    let block = header_block();
    c.bench_function("scan_headers_whole", |b| {
        let mut extractor = HeaderExtractor::new();
        b.iter(|| {
            let mut raw = RawHeaderFields::default();
            extractor.scan(&block, true, &mut raw);
            raw.decode()
        })
    });
}

fn bench_scan_chunked(c: &mut Criterion) {
    let block = header_block();
    c.bench_function("scan_headers_16_byte_chunks", |b| {
        let mut extractor = HeaderExtractor::new();
        b.iter(|| {
            let mut raw = RawHeaderFields::default();
            let mut first = true;
            for chunk in block.chunks(16) {
                extractor.scan(chunk, first, &mut raw);
                first = false;
            }
            raw.decode()
        })
    });
}

fn bench_list_body(c: &mut Criterion) {
    let mut body = b"+OK 5000 messages\r\n".to_vec();
    for n in 1..=5000u32 {
        body.extend_from_slice(format!("{n} {}\r\n", 1000 + n).as_bytes());
    }
    body.extend_from_slice(b".\r\n");

    c.bench_function("parse_list_5000", |b| {
        b.iter_batched(
            || MessageStore::new(5000).unwrap(),
            |mut store| parse_list_body(body.as_slice(), &mut store).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_scan_whole, bench_scan_chunked, bench_list_body);
criterion_main!(benches);
