use tml_codec::reader::Token;
use tml_codec::writer::ElementName;
use tml_codec::{Cell, Reader, Record, Writer};
use tml_core::NameTag;

fn build_nested_document() -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&mut bytes);
    writer.start_frame(ElementName::Ascii("root")).unwrap();
    writer
        .write_slot(&Cell::Int32(7), ElementName::Ascii("count"), false)
        .unwrap();
    writer.start_frame(ElementName::Tag(NameTag::from_ascii(b"ABC\0"))).unwrap();
    writer
        .write_slot(&Cell::Latin1(b"hello".to_vec()), ElementName::None, false)
        .unwrap();
    writer.end_frame().unwrap();
    writer
        .write_slot(&Cell::Null, ElementName::Ascii("count"), false)
        .unwrap();
    writer.end_frame().unwrap();
    bytes
}

#[test]
fn reader_walks_nested_frames_and_reinterns_repeated_names() {
    let bytes = build_nested_document();
    let mut reader = Reader::new(bytes.as_slice());

    assert_eq!(reader.next_token(false).unwrap(), Token::BeginFrame);
    assert_eq!(reader.next_token(false).unwrap(), Token::Slot);
    assert_eq!(reader.value(), Some(&Cell::Int32(7)));

    assert_eq!(reader.next_token(false).unwrap(), Token::BeginFrame);
    assert_eq!(reader.next_token(false).unwrap(), Token::Slot);
    assert_eq!(reader.name(), &Cell::Null);
    assert_eq!(reader.next_token(false).unwrap(), Token::EndFrame);

    // Second "count" slot reuses the interned name, which resolves to Latin1.
    assert_eq!(reader.next_token(false).unwrap(), Token::Slot);
    assert_eq!(reader.name(), &Cell::Latin1(b"count".to_vec()));
    assert_eq!(reader.next_token(false).unwrap(), Token::EndFrame);
    assert_eq!(reader.next_token(false).unwrap(), Token::Pending);
    assert_eq!(reader.level(), 0);
}

#[test]
fn record_buckets_top_level_slots_only() {
    let bytes = build_nested_document();
    let record = Record::read_from(&bytes).unwrap();

    assert_eq!(record.strings.get(b"count".as_slice()), Some(&Cell::Int32(7)));
    // The repeated "count" slot resolves to a Latin1-named cell and is
    // dropped, matching the reference implementation's bucketing.
    assert_eq!(record.strings.len(), 1);
    assert!(record.array.is_empty());
    assert!(record.tags.is_empty());
}

#[test]
fn reader_reports_open_frames_at_truncation() {
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&mut bytes);
    writer.start_frame(ElementName::None).unwrap();
    writer.start_frame(ElementName::None).unwrap();
    // No matching end_frame calls: two frames remain open.

    let mut reader = Reader::new(bytes.as_slice());
    while reader.next_token(false).unwrap() != Token::Pending {}
    assert_eq!(reader.level(), 2);
}

#[test]
fn skip_to_end_frame_descends_past_nested_content() {
    let bytes = build_nested_document();
    let mut reader = Reader::new(bytes.as_slice());

    assert_eq!(reader.next_token(false).unwrap(), Token::BeginFrame);
    assert_eq!(reader.next_token(false).unwrap(), Token::Slot);
    assert!(reader.skip_to_end_frame().unwrap());
    assert_eq!(reader.level(), 0);
    assert_eq!(reader.next_token(false).unwrap(), Token::Pending);
}
