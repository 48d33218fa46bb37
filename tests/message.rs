mod common;

use common::{init_logging, name};
use core::str::FromStr;
use rstest::rstest;
use zonewire::base::stream::{frame, StreamDecoder};
use zonewire::base::{Class, Message, ParseError, Record, Rtype, Section};

fn record(s: &str) -> Record {
    Record::from_str(s).unwrap()
}

fn txt(owner: &str, len: usize) -> Record {
    record(&format!("{} 300 IN TXT {}", owner, "x".repeat(len)))
}

fn sample_message() -> Message {
    let mut msg =
        Message::new_query(name("www.example.com."), Rtype::A, Class::In);
    msg.header_mut().set_qr(true);
    msg.add_record(Section::Answer, record("www.example.com. 300 A 192.0.2.1"));
    msg.add_record(Section::Answer, record("www.example.com. 300 A 192.0.2.2"));
    msg.add_record(
        Section::Authority,
        record("example.com. 300 NS ns1.example.com."),
    );
    msg.add_record(
        Section::Additional,
        record("ns1.example.com. 300 A 192.0.2.53"),
    );
    msg
}

#[test]
fn round_trip() {
    init_logging();
    let msg = sample_message();
    let wire = msg.to_wire().unwrap();
    let parsed = Message::from_octets(wire.clone()).unwrap();

    assert_eq!(parsed.header(), msg.header());
    assert_eq!(parsed.counts(), msg.counts());
    assert_eq!(parsed.questions(), msg.questions());
    assert_eq!(parsed.answer(), msg.answer());
    assert_eq!(parsed.authority(), msg.authority());
    assert_eq!(parsed.additional(), msg.additional());
    assert_eq!(parsed.as_wire(), Some(&wire));

    // Encoding the decoded message again gives the same octets.
    assert_eq!(parsed.to_wire().unwrap(), wire);
}

#[test]
fn compression_is_shorter() {
    init_logging();
    let msg = sample_message();
    let compressed = msg.to_wire().unwrap();
    let plain = msg.to_wire_uncompressed().unwrap();
    assert!(compressed.len() < plain.len());

    let one = Message::from_octets(compressed).unwrap();
    let two = Message::from_octets(plain).unwrap();
    for (left, right) in one.answer().iter().zip(two.answer()) {
        assert!(left.owner().eq_case_sensitive(right.owner()));
    }
    assert_eq!(one.authority(), two.authority());
}

#[test]
fn truncation_drops_complete_rrsets() {
    init_logging();
    let mut msg =
        Message::new_query(name("example.com."), Rtype::Txt, Class::In);
    for owner in ["a", "b", "c", "d"] {
        msg.add_record(
            Section::Answer,
            txt(&format!("{}.example.com.", owner), 200),
        );
    }
    msg.add_record(
        Section::Authority,
        record("example.com. 300 NS ns1.example.com."),
    );
    msg.add_record(
        Section::Additional,
        record("ns1.example.com. 300 A 192.0.2.53"),
    );

    let wire = msg.to_wire_bounded(512).unwrap();
    assert!(wire.len() <= 512);
    let parsed = Message::from_octets(wire).unwrap();
    assert!(parsed.header().tc());
    assert_eq!(parsed.counts().ancount(), 2);
    assert_eq!(parsed.counts().nscount(), 0);
    assert_eq!(parsed.counts().arcount(), 0);
    assert_eq!(parsed.answer(), &msg.answer()[..2]);

    // Without a limit everything is there.
    let parsed = Message::from_octets(msg.to_wire().unwrap()).unwrap();
    assert!(!parsed.header().tc());
    assert_eq!(parsed.counts().ancount(), 4);
}

#[test]
fn truncation_never_splits_an_rrset() {
    init_logging();
    let mut msg =
        Message::new_query(name("example.com."), Rtype::Txt, Class::In);
    for len in [200, 201, 202] {
        msg.add_record(Section::Answer, txt("big.example.com.", len));
    }
    let parsed =
        Message::from_octets(msg.to_wire_bounded(512).unwrap()).unwrap();
    assert!(parsed.header().tc());
    assert_eq!(parsed.counts().ancount(), 0);
    assert_eq!(parsed.questions().len(), 1);
}

#[test]
fn bounded_encode_fails_without_room_for_header() {
    let msg = sample_message();
    assert!(msg.to_wire_bounded(11).is_err());
}

#[rstest]
#[case::short_header(&b"\x12\x34\x01\x00\x00\x01"[..])]
#[case::missing_question(&b"\x12\x34\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00"[..])]
#[case::bad_label(&b"\x12\x34\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\x40abc"[..])]
fn broken_messages(#[case] wire: &[u8]) {
    init_logging();
    assert!(matches!(
        Message::from_slice(wire),
        Err(ParseError::ShortInput | ParseError::Form(_))
    ));
}

#[test]
fn truncated_response_is_partially_parsed() {
    init_logging();
    let mut msg = sample_message();
    msg.header_mut().set_tc(true);
    let wire = msg.to_wire().unwrap();
    let cut = wire.slice(..wire.len() - 3);

    let parsed = Message::from_octets(cut.clone()).unwrap();
    assert_eq!(parsed.answer().len(), 2);
    assert!(parsed.additional().is_empty());

    // Without the TC flag, the same damage is an error.
    let mut octets = cut.to_vec();
    octets[2] &= !0x02;
    assert!(Message::from_slice(&octets).is_err());
}

#[test]
fn stream_framing() {
    let one = sample_message().to_wire().unwrap();
    let two = Message::new_query(name("example.com."), Rtype::Soa, Class::In)
        .to_wire()
        .unwrap();

    let mut decoder = StreamDecoder::new();
    let framed_one = frame(&one).unwrap();
    let framed_two = frame(&two).unwrap();
    decoder.push(&framed_one[..7]);
    assert!(decoder.next_message().is_none());
    decoder.push(&framed_one[7..]);
    decoder.push(&framed_two);
    assert_eq!(decoder.next_message().unwrap(), one);
    assert_eq!(decoder.next_message().unwrap(), two);
    assert_eq!(decoder.pending(), 0);
}
