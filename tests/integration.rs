//! End-to-end tests: build a document stream, write it to a file, read
//! it back with promotion, group it, render it, and re-encode it
//! byte-identically.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use afpcodec::{
    codepage, AfpReader, AttValTriplet, ConvertSpecific, FqnTriplet, GenericRecord, GroupedRecord,
    ReadWriteOptions, Record, RecordGrouper, RecordSource, TleRecord, Triplet,
};

const BDT: u32 = 0xD3A8A8;
const EDT: u32 = 0xD3A9A8;
const BPG: u32 = 0xD3A8AF;
const EPG: u32 = 0xD3A9AF;
const NOP: u32 = 0xD3EEEE;
const PTX: u32 = 0xD3EE9B;
const TLE: u32 = 0xD3A090;

fn plain(identifier: u32, data: &[u8]) -> Record {
    Record::Generic(GenericRecord::new(identifier, 0, 0, data.to_vec()).expect("record"))
}

fn sample_tle() -> Record {
    let fqn = Triplet::Fqn(FqnTriplet::with_text(0x0B, "DOC.OWNER").expect("fqn"));
    let attval = Triplet::AttVal(AttValTriplet::new("ACCOUNTING").expect("attval"));
    Record::Tle(TleRecord::new(0, 0, vec![fqn, attval]).expect("tle"))
}

fn sample_nop() -> Record {
    let data = codepage::encode("Generated for the nightly batch");
    Record::Generic(GenericRecord::new(NOP, 0, 0, data).expect("nop"))
}

fn sample_stream() -> Vec<Record> {
    vec![
        sample_nop(),
        plain(BDT, b""),
        sample_tle(),
        plain(BPG, b""),
        plain(PTX, b"\x01\x02\x03"),
        plain(EPG, b""),
        plain(EDT, b""),
    ]
}

fn encode_stream(records: &[Record]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        record.write_to(&mut out).expect("encode");
    }
    out
}

#[test]
fn read_stream_with_promotion() {
    let bytes = encode_stream(&sample_stream());
    let mut reader = AfpReader::new(bytes.as_slice());

    match reader.read_record().expect("nop").expect("some") {
        Record::Nop(nop) => {
            assert_eq!(
                nop.text().as_deref(),
                Some("Generated for the nightly batch")
            );
        }
        other => panic!("expected NOP, got {other:?}"),
    }

    assert_eq!(
        reader.read_record().expect("bdt").expect("some").identifier(),
        BDT
    );

    match reader.read_record().expect("tle").expect("some") {
        Record::Tle(tle) => {
            assert_eq!(tle.attribute_name(), Some("DOC.OWNER".to_string()));
            assert_eq!(tle.attribute_value(), Some("ACCOUNTING"));
            assert_eq!(tle.triplets().len(), 2);
        }
        other => panic!("expected TLE, got {other:?}"),
    }

    for expected in [BPG, PTX, EPG, EDT] {
        let record = reader.read_record().expect("record").expect("some");
        assert_eq!(record.identifier(), expected);
        assert!(matches!(record, Record::Generic(_)));
    }
    assert!(reader.read_record().expect("end").is_none());
}

#[test]
fn conversion_can_be_disabled() {
    let bytes = encode_stream(&[sample_nop()]);
    let options = ReadWriteOptions::default().with_convert(ConvertSpecific::None);
    let mut reader = AfpReader::with_options(bytes.as_slice(), options);
    let record = reader.read_record().expect("record").expect("some");
    assert!(matches!(record, Record::Generic(_)));
}

#[test]
fn conversion_set_applies_per_identifier() {
    let bytes = encode_stream(&[sample_nop(), sample_tle()]);
    let only: HashSet<u32> = [TLE].into_iter().collect();
    let options = ReadWriteOptions::default().with_convert(ConvertSpecific::Only(only));
    let mut reader = AfpReader::with_options(bytes.as_slice(), options);
    assert!(matches!(
        reader.read_record().expect("nop").expect("some"),
        Record::Generic(_)
    ));
    assert!(matches!(
        reader.read_record().expect("tle").expect("some"),
        Record::Tle(_)
    ));
}

#[test]
fn file_round_trip_is_byte_identical() {
    let original = encode_stream(&sample_stream());

    let mut file: File = tempfile::tempfile().expect("tempfile");
    file.write_all(&original).expect("write");
    file.seek(SeekFrom::Start(0)).expect("seek");

    let mut reader = AfpReader::new(&mut file);
    let mut rebuilt = Vec::new();
    while let Some(record) = reader.read_record().expect("read") {
        record.write_to(&mut rebuilt).expect("encode");
    }
    assert_eq!(rebuilt, original);
}

#[test]
fn crlf_delimited_stream_round_trips() {
    let mut delimited = Vec::new();
    for record in sample_stream() {
        record.write_to(&mut delimited).expect("encode");
        delimited.extend_from_slice(b"\r\n");
    }

    let mut reader = AfpReader::new(delimited.as_slice());
    let mut records = Vec::new();
    while let Some(record) = reader.read_record().expect("read") {
        assert!(record.generic().ends_in_crlf());
        records.push(record);
    }
    assert_eq!(records.len(), 7);

    let mut rebuilt = Vec::new();
    for record in &records {
        record.write_to(&mut rebuilt).expect("encode");
    }
    assert_eq!(rebuilt, delimited);
}

#[test]
fn grouped_stream_renders_nested_dump() {
    let bytes = encode_stream(&sample_stream());
    let reader = AfpReader::new(bytes.as_slice());
    let mut grouper = RecordGrouper::new(reader);

    let mut results = Vec::new();
    while let Some(grouped) = grouper.next_grouped().expect("group") {
        results.push(grouped);
    }
    assert_eq!(results.len(), 2);
    assert!(matches!(&results[0], GroupedRecord::Record(_)));
    let group = match &results[1] {
        GroupedRecord::Group(group) => group,
        other => panic!("expected group, got {other:?}"),
    };
    assert_eq!(group.identifier(), BDT);

    let options = ReadWriteOptions::default();
    let mut out = Vec::new();
    group.render(&mut out, &options, 0).expect("render");
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("BDT: Begin Document"), "got: {text}");
    assert!(text.contains("TLE: Tag Logical Element"), "got: {text}");
    assert!(text.contains("FQName=DOC.OWNER"), "got: {text}");
    assert!(text.contains("AttVal=ACCOUNTING"), "got: {text}");
    assert!(text.contains("\n  BPG: Begin Page"), "got: {text}");
    assert!(
        text.contains("\n    PTX: Presentation Text Data"),
        "got: {text}"
    );
    assert!(text.contains("\nEDT: End Document"), "got: {text}");
}

#[test]
fn grouper_over_buffered_reader() {
    let bytes = encode_stream(&sample_stream());
    let reader = AfpReader::new(bytes.as_slice());
    let mut buffered = afpcodec::BufferedSource::new(reader, 4);

    let first = buffered.next_record().expect("first").expect("some");
    assert_eq!(first.identifier(), NOP);
    buffered.unget().expect("unget");

    let mut grouper = RecordGrouper::new(buffered);
    let replayed = grouper.next_grouped().expect("replayed").expect("some");
    assert_eq!(replayed.identifier(), NOP);
    let group = grouper.next_grouped().expect("group").expect("some");
    assert_eq!(group.identifier(), BDT);
    assert!(grouper.next_grouped().expect("end").is_none());
}
