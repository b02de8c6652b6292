//! Benchmarks for the adblink frame codec

use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

use adblink::protocol::{read_frame, write_frame};

fn protocol_benchmarks(c: &mut Criterion) {
    let payload = vec![b'x'; 4096];

    c.bench_function("write_frame_4k", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(payload.len() + 4);
            write_frame(&mut out, &payload).unwrap();
            out
        })
    });

    let mut encoded = Vec::new();
    write_frame(&mut encoded, &payload).unwrap();

    c.bench_function("read_frame_4k", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(encoded.as_slice());
            read_frame(&mut cursor).unwrap()
        })
    });

    let device_list =
        "ABC123               device product:sdk_gphone64 model:sdk_gphone64_arm64 device:emu64a transport_id:1\n"
            .repeat(16);

    c.bench_function("parse_device_list_long_16", |b| {
        b.iter(|| adblink::device::parse_device_list_long(&device_list).unwrap())
    });
}

criterion_group!(benches, protocol_benchmarks);
criterion_main!(benches);
