use aireports::core::decoder::{decode_line, DecodeEvent, StreamDecoder};
use aireports::core::log::{LogLevel, LogSink};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures_util::stream;
use std::convert::Infallible;
use tokio_util::sync::CancellationToken;

struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: LogLevel, _message: &str, _detail: Option<&str>) {}
}

fn make_body(records: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..records {
        body.push_str(&format!(
            "data: {{\"id\":\"chatcmpl-1\",\"created\":1,\"model\":\"m\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"token {i} of the quarterly summary \"}}}}]}}\n"
        ));
        if i % 50 == 0 {
            body.push('\n');
        }
    }
    body.push_str("data: [DONE]\n");
    body.into_bytes()
}

/// Split `body` into network-sized pieces that ignore line boundaries.
fn chunked(body: &[u8], size: usize) -> Vec<Result<Vec<u8>, Infallible>> {
    body.chunks(size).map(|piece| Ok(piece.to_vec())).collect()
}

fn bench_decode_line(c: &mut Criterion) {
    let line = r#"data: {"id":"chatcmpl-1","created":1,"model":"m","choices":[{"index":0,"delta":{"content":"Revenue grew 12% year over year."}}]}"#;
    let mut group = c.benchmark_group("decode_line");
    group.throughput(Throughput::Bytes(line.len() as u64));
    group.bench_function("content_record", |b| {
        b.iter(|| decode_line(std::hint::black_box(line)))
    });
    group.finish();
}

fn bench_stream_decoder(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    for &records in &[100usize, 2000usize] {
        let body = make_body(records);
        let mut group = c.benchmark_group(format!("stream_decoder_records{records}"));
        group.throughput(Throughput::Bytes(body.len() as u64));

        for &chunk_size in &[64usize, 4096usize] {
            group.bench_with_input(
                BenchmarkId::new("chunk_size", chunk_size),
                &chunk_size,
                |b, &size| {
                    b.iter(|| {
                        let parts = chunked(&body, size);
                        let cancel = CancellationToken::new();
                        runtime.block_on(async {
                            let mut total = 0usize;
                            StreamDecoder::new(&NullSink)
                                .decode(stream::iter(parts), &cancel, |event| {
                                    if let DecodeEvent::Delta(delta) = event {
                                        total += delta.len();
                                    }
                                })
                                .await;
                            total
                        })
                    })
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, bench_decode_line, bench_stream_decoder);
criterion_main!(benches);
