mod common;

use bytes::Bytes;
use common::{init_logging, name};
use core::str::FromStr;
use rstest::rstest;
use zonewire::base::{
    Class, Message, Record, Rtype, Section, TsigRcode, TsigState,
};
use zonewire::rdata::{AllRecordData, Tsig};
use zonewire::tsig::{Algorithm, Key, StreamSigner, StreamVerifier};

fn key() -> Key {
    Key::from_base64("hmac-sha256", "transfer.key.", "c2VjcmV0IGtleSBtYXRlcmlhbA==")
        .unwrap()
}

fn response(id: u16, host: usize) -> Message {
    let mut msg = Message::new();
    msg.header_mut().set_id(id);
    msg.header_mut().set_qr(true);
    msg.add_record(
        Section::Answer,
        Record::from_str(&format!(
            "host{}.example.com. 300 A 192.0.2.{}",
            host,
            host % 250
        ))
        .unwrap(),
    );
    msg
}

fn txt_message() -> Message {
    let mut msg = Message::new_query(name("example.com."), Rtype::Txt, Class::In);
    msg.add_record(
        Section::Answer,
        Record::from_str("example.com. 60 TXT xxxxxxxx").unwrap(),
    );
    msg
}

/// Signs a query and returns it decoded together with its TSIG record.
fn signed_query(key: &Key) -> (Message, Tsig) {
    let mut query =
        Message::new_query(name("example.com."), Rtype::Axfr, Class::In);
    key.apply(&mut query, TsigRcode::NoError, None).unwrap();
    let query = Message::from_octets(query.to_wire().unwrap()).unwrap();
    let tsig = query.tsig().cloned().unwrap();
    (query, tsig)
}

#[test]
fn sign_and_verify() {
    init_logging();
    let key = key();
    let mut msg = txt_message();
    key.apply(&mut msg, TsigRcode::NoError, None).unwrap();
    assert_eq!(msg.tsig_state(), TsigState::Signed);

    let wire = msg.to_wire().unwrap();
    let mut parsed = Message::from_octets(wire.clone()).unwrap();
    assert_eq!(parsed.tsig().unwrap().original_id(), msg.header().id());
    assert_eq!(key.verify(&mut parsed, None), TsigRcode::NoError);
    assert_eq!(parsed.tsig_state(), TsigState::Verified);

    // Flip a single octet of the record data.
    let mut octets = wire.to_vec();
    let pos = octets
        .windows(8)
        .position(|window| window == b"xxxxxxxx")
        .unwrap();
    octets[pos] = b'y';
    let mut parsed = Message::from_slice(&octets).unwrap();
    assert_eq!(key.verify(&mut parsed, None), TsigRcode::BadSig);
    assert_eq!(parsed.tsig_state(), TsigState::Failed);
}

#[test]
fn sign_when_encoding() {
    init_logging();
    let key = key();
    let mut msg = txt_message();
    for i in 0..40 {
        msg.add_record(
            Section::Additional,
            Record::from_str(&format!("ns{}.example.com. A 192.0.2.{}", i, i))
                .unwrap(),
        );
    }
    msg.set_tsig(key.clone(), TsigRcode::NoError, None);

    let wire = msg.to_wire_bounded(512).unwrap();
    assert!(wire.len() <= 512);
    let mut parsed = Message::from_octets(wire).unwrap();
    assert!(parsed.header().tc());
    assert!(parsed.additional().len() < 41);
    assert_eq!(key.verify(&mut parsed, None), TsigRcode::NoError);
}

#[test]
fn unsigned_message_is_formerr() {
    let mut msg = Message::from_octets(txt_message().to_wire().unwrap()).unwrap();
    assert_eq!(key().verify(&mut msg, None), TsigRcode::FormErr);
    assert_eq!(msg.tsig_state(), TsigState::Failed);
}

#[rstest]
#[case::other_name("other.key.", "hmac-sha256")]
#[case::other_algorithm("transfer.key.", "hmac-sha512")]
fn wrong_key(#[case] key_name: &str, #[case] algorithm: &str) {
    init_logging();
    let mut msg = txt_message();
    key().apply(&mut msg, TsigRcode::NoError, None).unwrap();
    let mut parsed = Message::from_octets(msg.to_wire().unwrap()).unwrap();

    let other = Key::from_base64(
        algorithm,
        key_name,
        "c2VjcmV0IGtleSBtYXRlcmlhbA==",
    )
    .unwrap();
    assert_eq!(other.verify(&mut parsed, None), TsigRcode::BadKey);
    assert_eq!(parsed.tsig_state(), TsigState::Failed);
}

/// Replaces the MAC of a signed message with its first `len` octets.
fn truncate_mac(key: &Key, len: usize) -> Message {
    let mut msg = txt_message();
    key.apply(&mut msg, TsigRcode::NoError, None).unwrap();
    let tsig = msg.tsig().cloned().unwrap();
    let record = msg.tsig_record().cloned().unwrap();
    msg.remove_tsig();
    let truncated = Tsig::new(
        tsig.algorithm().clone(),
        tsig.time_signed(),
        tsig.fudge(),
        tsig.mac().slice(..len),
        tsig.original_id(),
        tsig.error(),
        tsig.other().clone(),
    )
    .unwrap();
    msg.add_record(
        Section::Additional,
        Record::new(
            record.owner().clone(),
            Class::Any,
            0,
            AllRecordData::Tsig(truncated),
        ),
    );
    Message::from_octets(msg.to_wire().unwrap()).unwrap()
}

#[rstest]
#[case::full(32, TsigRcode::NoError)]
#[case::half(16, TsigRcode::NoError)]
#[case::below_half(15, TsigRcode::BadSig)]
#[case::tiny(8, TsigRcode::BadSig)]
fn truncated_mac(#[case] len: usize, #[case] expected: TsigRcode) {
    init_logging();
    let key = key();
    assert_eq!(key.min_mac_len(), 16);
    let mut msg = truncate_mac(&key, len);
    assert_eq!(key.verify(&mut msg, None), expected);
}

#[test]
fn sha1_minimum_is_ten() {
    let key = Key::new(Algorithm::Sha1, b"secret", name("k.")).unwrap();
    assert_eq!(key.min_mac_len(), 10);
    let mut msg = truncate_mac(&key, 10);
    assert_eq!(key.verify(&mut msg, None), TsigRcode::NoError);
    let mut msg = truncate_mac(&key, 9);
    assert_eq!(key.verify(&mut msg, None), TsigRcode::BadSig);
}

#[test]
fn response_is_chained_to_request() {
    init_logging();
    let key = key();
    let (query, query_tsig) = signed_query(&key);

    let mut answer = Message::start_answer(&query);
    answer.set_tsig(key.clone(), TsigRcode::NoError, Some(query_tsig.clone()));
    let mut parsed = Message::from_octets(answer.to_wire().unwrap()).unwrap();
    assert_eq!(key.verify(&mut parsed, Some(&query_tsig)), TsigRcode::NoError);

    // Without the request MAC the signature doesn’t match.
    let mut parsed = Message::from_octets(answer.to_wire().unwrap()).unwrap();
    assert_eq!(key.verify(&mut parsed, None), TsigRcode::BadSig);
}

/// Signs a stream of `count` responses.
///
/// If `skip` is given, that message is left unsigned even if it is due.
fn sign_stream(
    key: &Key,
    query_tsig: &Tsig,
    count: usize,
    skip: Option<usize>,
) -> Vec<Bytes> {
    let mut signer = StreamSigner::new(key.clone(), Some(query_tsig.clone()));
    (1..=count)
        .map(|i| {
            let msg = response(query_tsig.original_id(), i);
            if Some(i) == skip {
                msg.to_wire().unwrap()
            } else {
                signer.next(&msg, i == count).unwrap()
            }
        })
        .collect()
}

#[test]
fn stream_with_150_messages() {
    init_logging();
    let key = key();
    let (_, query_tsig) = signed_query(&key);
    let stream = sign_stream(&key, &query_tsig, 150, None);

    let mut verifier = StreamVerifier::new(key, Some(query_tsig));
    for (i, wire) in stream.into_iter().enumerate() {
        let n = i + 1;
        let mut msg = Message::from_octets(wire).unwrap();
        assert_eq!(msg.tsig().is_some(), n == 1 || n == 100 || n == 150);
        assert_eq!(verifier.verify(&mut msg), TsigRcode::NoError, "message {}", n);
        if msg.tsig().is_some() {
            assert_eq!(msg.tsig_state(), TsigState::Verified);
        } else {
            assert_eq!(msg.tsig_state(), TsigState::Intermediate);
        }
    }
    assert_eq!(verifier.responses(), 150);
    assert_eq!(verifier.finish(), TsigRcode::NoError);
}

#[test]
fn stream_with_gap_fails_at_message_100() {
    init_logging();
    let key = key();
    let (_, query_tsig) = signed_query(&key);
    let stream = sign_stream(&key, &query_tsig, 150, Some(100));

    let mut verifier = StreamVerifier::new(key, Some(query_tsig));
    for (i, wire) in stream.into_iter().enumerate().take(100) {
        let mut msg = Message::from_octets(wire).unwrap();
        let res = verifier.verify(&mut msg);
        if i + 1 < 100 {
            assert_eq!(res, TsigRcode::NoError);
        } else {
            assert_eq!(res, TsigRcode::FormErr);
            assert_eq!(msg.tsig_state(), TsigState::Failed);
        }
    }
}

#[test]
fn stream_must_end_signed() {
    init_logging();
    let key = key();
    let (_, query_tsig) = signed_query(&key);
    let stream = sign_stream(&key, &query_tsig, 3, Some(3));

    let mut verifier = StreamVerifier::new(key, Some(query_tsig));
    for wire in stream {
        let mut msg = Message::from_octets(wire).unwrap();
        assert_eq!(verifier.verify(&mut msg), TsigRcode::NoError);
    }
    assert_eq!(verifier.finish(), TsigRcode::FormErr);
}

#[test]
fn stream_with_tampered_message() {
    init_logging();
    let key = key();
    let (_, query_tsig) = signed_query(&key);
    let mut stream = sign_stream(&key, &query_tsig, 5, None);

    // Change the address in an unsigned message in the middle.
    let mut octets = stream[2].to_vec();
    let last = octets.len() - 1;
    octets[last] ^= 0xFF;
    stream[2] = octets.into();

    let mut verifier = StreamVerifier::new(key, Some(query_tsig));
    let results: Vec<_> = stream
        .into_iter()
        .map(|wire| {
            let mut msg = Message::from_octets(wire).unwrap();
            verifier.verify(&mut msg)
        })
        .collect();
    assert_eq!(
        results,
        [
            TsigRcode::NoError,
            TsigRcode::NoError,
            TsigRcode::NoError,
            TsigRcode::NoError,
            TsigRcode::BadSig
        ]
    );
}

#[test]
fn stream_signer_interval() {
    let key = key();
    let (_, query_tsig) = signed_query(&key);
    let mut signer =
        StreamSigner::new(key.clone(), Some(query_tsig.clone())).with_interval(2);
    let signed: Vec<bool> = (1..=5)
        .map(|i| {
            let wire = signer.next(&response(1, i), i == 5).unwrap();
            Message::from_octets(wire).unwrap().tsig().is_some()
        })
        .collect();
    assert_eq!(signed, [true, true, false, true, true]);
    assert_eq!(signer.count(), 5);
}
