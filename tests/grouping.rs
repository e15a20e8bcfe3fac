//! Grouper state machine and buffered source tests.

use std::collections::HashSet;
use std::collections::VecDeque;

use afpcodec::{
    AfpError, BufferedSource, GenericRecord, GroupedRecord, Record, RecordGroup, RecordGrouper,
    RecordSource,
};

const BDT: u32 = 0xD3A8A8;
const EDT: u32 = 0xD3A9A8;
const BPG: u32 = 0xD3A8AF;
const EPG: u32 = 0xD3A9AF;
const ENG: u32 = 0xD3A9AD;
const NOP: u32 = 0xD3EEEE;
const PTX: u32 = 0xD3EE9B;

fn record(identifier: u32, data: &[u8]) -> Record {
    Record::Generic(GenericRecord::new(identifier, 0, 0, data.to_vec()).expect("record"))
}

struct VecSource {
    records: VecDeque<Record>,
}

impl VecSource {
    fn new(records: Vec<Record>) -> Self {
        VecSource {
            records: records.into(),
        }
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<Record>, AfpError> {
        Ok(self.records.pop_front())
    }
}

#[test]
fn standalone_record_passes_through() {
    let mut grouper = RecordGrouper::new(VecSource::new(vec![record(NOP, b"x")]));
    match grouper.next_grouped().expect("grouped") {
        Some(GroupedRecord::Record(r)) => assert_eq!(r.identifier(), NOP),
        other => panic!("expected standalone record, got {other:?}"),
    }
    assert!(grouper.next_grouped().expect("end").is_none());
}

#[test]
fn nested_groups_build_a_tree() {
    let stream = vec![
        record(BDT, b""),
        record(NOP, b"1"),
        record(BPG, b""),
        record(PTX, b"2"),
        record(EPG, b""),
        record(NOP, b"3"),
        record(EDT, b""),
    ];
    let mut grouper = RecordGrouper::new(VecSource::new(stream));

    let group = match grouper.next_grouped().expect("grouped") {
        Some(GroupedRecord::Group(group)) => group,
        other => panic!("expected group, got {other:?}"),
    };
    assert_eq!(group.identifier(), BDT);
    assert!(group.is_closed());
    assert_eq!(group.end().map(Record::identifier), Some(EDT));
    assert_eq!(group.members().len(), 3);

    assert_eq!(group.members()[0].identifier(), NOP);
    match &group.members()[1] {
        GroupedRecord::Group(inner) => {
            assert_eq!(inner.identifier(), BPG);
            assert_eq!(inner.members().len(), 1);
            assert_eq!(inner.members()[0].identifier(), PTX);
        }
        other => panic!("expected nested group, got {other:?}"),
    }
    assert_eq!(group.members()[2].identifier(), NOP);

    assert!(grouper.next_grouped().expect("end").is_none());
}

#[test]
fn group_serialization_round_trip() {
    let stream = vec![
        record(BDT, b""),
        record(NOP, b"1"),
        record(BPG, b""),
        record(PTX, b"22"),
        record(EPG, b""),
        record(EDT, b""),
    ];
    let mut original = Vec::new();
    for r in &stream {
        r.write_to(&mut original).expect("encode");
    }

    let mut grouper = RecordGrouper::new(VecSource::new(stream));
    let group = grouper.next_grouped().expect("grouped").expect("one group");
    let mut rebuilt = Vec::new();
    group.write_to(&mut rebuilt).expect("write");
    assert_eq!(rebuilt, original);
}

#[test]
fn mismatched_end_fails() {
    let mut grouper = RecordGrouper::new(VecSource::new(vec![record(BDT, b""), record(ENG, b"")]));
    let err = grouper.next_grouped().unwrap_err();
    match err {
        AfpError::Grouping(msg) => {
            assert!(msg.contains("EDT"), "got: {msg}");
            assert!(msg.contains("ENG"), "got: {msg}");
        }
        other => panic!("expected grouping error, got {other}"),
    }
}

#[test]
fn end_before_begin_fails() {
    let mut grouper = RecordGrouper::new(VecSource::new(vec![record(EDT, b"")]));
    let err = grouper.next_grouped().unwrap_err();
    match err {
        AfpError::Grouping(msg) => assert!(msg.contains("before begin"), "got: {msg}"),
        other => panic!("expected grouping error, got {other}"),
    }
}

#[test]
fn unterminated_group_fails() {
    let mut grouper = RecordGrouper::new(VecSource::new(vec![record(BDT, b""), record(NOP, b"")]));
    let err = grouper.next_grouped().unwrap_err();
    match err {
        AfpError::Grouping(msg) => assert!(msg.contains("unterminated"), "got: {msg}"),
        other => panic!("expected grouping error, got {other}"),
    }
}

#[test]
fn no_group_identifiers_stay_plain() {
    let no_group: HashSet<u32> = [BPG, EPG].into_iter().collect();
    let stream = vec![
        record(BDT, b""),
        record(BPG, b""),
        record(EPG, b""),
        record(EDT, b""),
    ];
    let mut grouper = RecordGrouper::with_no_group(VecSource::new(stream), no_group);
    let group = match grouper.next_grouped().expect("grouped") {
        Some(GroupedRecord::Group(group)) => group,
        other => panic!("expected group, got {other:?}"),
    };
    assert_eq!(group.members().len(), 2);
    assert!(group
        .members()
        .iter()
        .all(|m| matches!(m, GroupedRecord::Record(_))));
}

#[test]
fn group_from_non_begin_record_is_rejected() {
    let err = RecordGroup::new(record(NOP, b"")).unwrap_err();
    assert!(matches!(err, AfpError::Grouping(_)));
}

#[test]
fn group_closes_exactly_once() {
    let mut group = RecordGroup::new(record(BDT, b"")).expect("group");
    group.close(record(EDT, b"")).expect("close");
    let err = group.close(record(EDT, b"")).unwrap_err();
    assert!(matches!(err, AfpError::Grouping(_)));
}

#[test]
fn open_group_refuses_to_serialize() {
    let group = RecordGroup::new(record(BDT, b"")).expect("group");
    let err = group.write_to(&mut Vec::new()).unwrap_err();
    assert!(matches!(err, AfpError::Grouping(_)));
}

#[test]
fn buffered_source_unget_replays_records() {
    let stream = vec![record(NOP, b"1"), record(NOP, b"2"), record(NOP, b"3")];
    let mut source = BufferedSource::new(VecSource::new(stream), 2);

    let r1 = source.next_record().expect("r1").expect("some");
    let r2 = source.next_record().expect("r2").expect("some");
    let r3 = source.next_record().expect("r3").expect("some");
    assert_eq!(source.history_len(), 2);

    source.unget().expect("first unget");
    source.unget().expect("second unget");
    assert_eq!(source.unget_len(), 2);
    let err = source.unget().unwrap_err();
    assert!(matches!(err, AfpError::UngetUnderflow));

    let r2_again = source.next_record().expect("r2 again").expect("some");
    let r3_again = source.next_record().expect("r3 again").expect("some");
    assert_eq!(r2_again, r2);
    assert_eq!(r3_again, r3);
    assert_ne!(r2_again, r1);
}

#[test]
fn buffered_source_clears_on_end_of_sequence() {
    let mut source = BufferedSource::new(VecSource::new(vec![record(NOP, b"1")]), 2);
    source.next_record().expect("record").expect("some");
    assert_eq!(source.history_len(), 1);
    assert!(source.next_record().expect("end").is_none());
    assert_eq!(source.history_len(), 0);
    assert_eq!(source.unget_len(), 0);
    let err = source.unget().unwrap_err();
    assert!(matches!(err, AfpError::UngetUnderflow));
}
