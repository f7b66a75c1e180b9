//! codec.rs — micro-benchs des chemins chauds de tml-codec
//!
//! Lancer :
//!   cargo bench -p tml-codec --bench codec
//!   cargo bench -p tml-codec --bench codec -- --save-baseline hot
//!
//! Couvre le VByte (tml-core) et l'aller-retour Writer→Reader sur un petit
//! document représentatif (quelques frames imbriquées, slots ASCII répétés).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tml_codec::writer::ElementName;
use tml_codec::{Cell, Reader, Writer};
use tml_core::vbyte;

fn bench_vbyte_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("vbyte/u32_roundtrip");
    for value in [0u32, 127, 128, 16_384, u32::MAX] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(value), &value, |b, &v| {
            b.iter(|| {
                let enc = vbyte::encode_u32(black_box(v));
                let (decoded, _) = vbyte::decode_u32(enc.as_bytes()).unwrap();
                black_box(decoded)
            });
        });
    }
    group.finish();
}

fn build_document() -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&mut bytes);
    writer.start_frame(ElementName::Ascii("root")).unwrap();
    for i in 0..64 {
        writer
            .write_slot(&Cell::Int32(i), ElementName::Ascii("item"), false)
            .unwrap();
    }
    writer.end_frame().unwrap();
    bytes
}

fn bench_writer_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/writer_build_document");
    group.throughput(Throughput::Elements(64));
    group.bench_function("64_slots_interned_name", |b| {
        b.iter(|| black_box(build_document()));
    });
    group.finish();
}

fn bench_reader_drain(c: &mut Criterion) {
    let document = build_document();
    let mut group = c.benchmark_group("codec/reader_drain_document");
    group.throughput(Throughput::Bytes(document.len() as u64));
    group.bench_function("64_slots_interned_name", |b| {
        b.iter(|| {
            let mut reader = Reader::new(document.as_slice());
            while reader.next_token(false).unwrap().is_useful() {
                black_box(reader.value());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_vbyte_roundtrip, bench_writer_build, bench_reader_drain);
criterion_main!(benches);
