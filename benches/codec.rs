//! Benchmark: decode, decode+group, and encode throughput over a
//! synthetic document stream of pages with text data, NOP comments and
//! TLE attributes.

use afpcodec::{
    codepage, AfpReader, AttValTriplet, FqnTriplet, GenericRecord, ReadWriteOptions, Record,
    RecordGrouper, TleRecord, Triplet,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const BDT: u32 = 0xD3A8A8;
const EDT: u32 = 0xD3A9A8;
const BPG: u32 = 0xD3A8AF;
const EPG: u32 = 0xD3A9AF;
const NOP: u32 = 0xD3EEEE;
const PTX: u32 = 0xD3EE9B;

fn plain(identifier: u32, data: Vec<u8>) -> Record {
    Record::Generic(GenericRecord::new(identifier, 0, 0, data).expect("record"))
}

fn build_stream(pages: usize) -> Vec<u8> {
    let mut records = Vec::new();
    records.push(plain(NOP, codepage::encode("bench stream")));
    records.push(plain(BDT, Vec::new()));
    for page in 0..pages {
        let fqn = Triplet::Fqn(FqnTriplet::with_text(0x0B, "PAGE.NUMBER").expect("fqn"));
        let attval =
            Triplet::AttVal(AttValTriplet::new(&format!("{page:08}")).expect("attval"));
        records.push(Record::Tle(
            TleRecord::new(0, 0, vec![fqn, attval]).expect("tle"),
        ));
        records.push(plain(BPG, Vec::new()));
        records.push(plain(PTX, vec![0x2B; 512]));
        records.push(plain(EPG, Vec::new()));
    }
    records.push(plain(EDT, Vec::new()));

    let mut out = Vec::new();
    for record in &records {
        record.write_to(&mut out).expect("encode");
    }
    out
}

fn decode_all(bytes: &[u8]) -> usize {
    let mut reader = AfpReader::new(bytes);
    let mut count = 0;
    while let Some(record) = reader.read_record().expect("read") {
        black_box(record.length());
        count += 1;
    }
    count
}

fn decode_and_group(bytes: &[u8]) -> usize {
    let reader = AfpReader::new(bytes);
    let mut grouper = RecordGrouper::new(reader);
    let mut count = 0;
    while let Some(grouped) = grouper.next_grouped().expect("group") {
        black_box(grouped.identifier());
        count += 1;
    }
    count
}

fn decode_and_reencode(bytes: &[u8]) -> Vec<u8> {
    let options = ReadWriteOptions::default();
    let mut reader = AfpReader::with_options(bytes, options);
    let mut out = Vec::with_capacity(bytes.len());
    while let Some(record) = reader.read_record().expect("read") {
        record.write_to(&mut out).expect("encode");
    }
    out
}

fn bench_codec(c: &mut Criterion) {
    let stream = build_stream(200);

    c.bench_function("decode_200_pages", |b| {
        b.iter(|| decode_all(black_box(&stream)))
    });
    c.bench_function("decode_group_200_pages", |b| {
        b.iter(|| decode_and_group(black_box(&stream)))
    });
    c.bench_function("decode_encode_200_pages", |b| {
        b.iter(|| decode_and_reencode(black_box(&stream)))
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
