mod common;

use bytes::Bytes;
use common::{example_zone, init_logging, name};
use core::str::FromStr;
use rstest::rstest;
use zonewire::base::{
    Class, Message, Opcode, Question, Rcode, Record, Rtype,
    TsigRcode, TsigState,
};
use zonewire::responder::Responder;
use zonewire::tsig::{Algorithm, Key, StreamVerifier};
use zonewire::zone::Zone;

const SECRET: &[u8] = b"a secret shared by both sides";

fn key() -> Key {
    Key::new(Algorithm::Sha256, SECRET, name("transfer.key.")).unwrap()
}

fn responder() -> Responder {
    Responder::new().with_zone(example_zone()).with_key(key())
}

fn query(qname: &str, qtype: Rtype) -> Message {
    let mut msg = Message::new_query(name(qname), qtype, Class::In);
    msg.header_mut().set_id(0x4711);
    msg
}

/// Sends a query and returns the single decoded response.
fn ask(responder: &Responder, query: &Message, tcp: bool) -> Message {
    let wire = query.to_wire().unwrap();
    let mut res = responder.handle(&wire, tcp);
    assert_eq!(res.len(), 1);
    Message::from_octets(res.remove(0)).unwrap()
}

fn data(records: &[Record]) -> Vec<String> {
    records.iter().map(|record| record.data().to_string()).collect()
}

#[test]
fn authoritative_answer() {
    init_logging();
    let response = ask(&responder(), &query("www.example.com.", Rtype::A), false);
    let header = response.header();
    assert_eq!(header.id(), 0x4711);
    assert!(header.qr());
    assert!(header.aa());
    assert!(header.rd());
    assert!(!header.tc());
    assert_eq!(header.rcode(), Rcode::NoError);
    assert_eq!(response.questions().len(), 1);

    assert_eq!(data(response.answer()), ["1.2.3.4"]);
    assert_eq!(response.authority().len(), 2);
    assert!(response
        .authority()
        .iter()
        .all(|record| record.rtype() == Rtype::Ns));

    // Glue for the in-zone name server only.
    let mut glue = data(response.additional());
    glue.sort();
    assert_eq!(glue, ["192.0.2.53", "2001:db8::53"]);
}

#[test]
fn mx_gets_exchange_addresses() {
    init_logging();
    let response = ask(&responder(), &query("example.com.", Rtype::Mx), false);
    assert_eq!(response.answer().len(), 1);
    assert!(response
        .additional()
        .iter()
        .any(|record| record.owner() == &name("mail.example.com.")));
}

#[test]
fn apex_ns_is_not_repeated() {
    let response = ask(&responder(), &query("example.com.", Rtype::Ns), false);
    assert_eq!(response.answer().len(), 2);
    assert!(response.authority().is_empty());
}

#[test]
fn wildcard_answer() {
    let response =
        ask(&responder(), &query("other.example.com.", Rtype::A), false);
    assert!(response.header().aa());
    assert_eq!(response.answer().len(), 1);
    assert_eq!(response.answer()[0].owner(), &name("other.example.com."));
    assert_eq!(data(response.answer()), ["9.9.9.9"]);
}

#[test]
fn nxdomain() {
    init_logging();
    let zone = example_zone();
    zone.remove_record(&Record::from_str("*.example.com. A 9.9.9.9").unwrap());
    let responder = Responder::new().with_zone(zone);

    let response =
        ask(&responder, &query("nonexistent.example.com.", Rtype::A), false);
    assert_eq!(response.rcode(), Rcode::NXDomain);
    assert!(response.header().aa());
    assert!(response.answer().is_empty());
    assert_eq!(response.authority().len(), 1);
    assert_eq!(response.authority()[0].rtype(), Rtype::Soa);
}

#[test]
fn nodata() {
    let response = ask(&responder(), &query("www.example.com.", Rtype::Mx), false);
    assert_eq!(response.rcode(), Rcode::NoError);
    assert!(response.header().aa());
    assert!(response.answer().is_empty());
    assert_eq!(response.authority()[0].rtype(), Rtype::Soa);
}

#[test]
fn referral() {
    init_logging();
    let response =
        ask(&responder(), &query("host.sub.example.com.", Rtype::A), false);
    assert_eq!(response.rcode(), Rcode::NoError);
    assert!(!response.header().aa());
    assert!(response.answer().is_empty());
    assert_eq!(data(response.authority()), ["ns.sub.example.com."]);
    assert_eq!(data(response.additional()), ["192.0.2.100"]);
}

#[test]
fn cname_chain() {
    init_logging();
    let response =
        ask(&responder(), &query("alias.example.com.", Rtype::A), false);
    assert!(response.header().aa());
    assert_eq!(data(response.answer()), ["www.example.com.", "1.2.3.4"]);
    assert_eq!(response.answer()[0].rtype(), Rtype::Cname);
}

#[rstest]
#[case::default(Responder::DEFAULT_MAX_CHAIN)]
#[case::short(1)]
#[case::none(0)]
fn cname_loop_ends(#[case] max_chain: usize) {
    init_logging();
    let responder = responder().with_max_chain(max_chain);
    let response =
        ask(&responder, &query("loop1.example.com.", Rtype::A), false);
    assert_eq!(response.rcode(), Rcode::NoError);
    assert_eq!(response.answer().len(), (max_chain + 1).min(2));
}

#[test]
fn dname_synthesizes_cname() {
    init_logging();
    let response =
        ask(&responder(), &query("x.old.example.com.", Rtype::A), false);
    let answer = response.answer();
    assert_eq!(answer.len(), 3);
    assert_eq!(answer[0].rtype(), Rtype::Dname);
    assert_eq!(answer[1].rtype(), Rtype::Cname);
    assert_eq!(answer[1].owner(), &name("x.old.example.com."));
    assert_eq!(answer[1].data().to_string(), "x.new.example.com.");
    assert_eq!(answer[2].owner(), &name("x.new.example.com."));
    assert_eq!(answer[2].data().to_string(), "192.0.2.77");
}

#[rstest]
#[case::foreign_zone("www.example.org.", Rtype::A, Rcode::Refused)]
#[case::ixfr("example.com.", Rtype::Ixfr, Rcode::NotImp)]
fn error_responses(
    #[case] qname: &str,
    #[case] qtype: Rtype,
    #[case] rcode: Rcode,
) {
    init_logging();
    let response = ask(&responder(), &query(qname, qtype), true);
    assert_eq!(response.rcode(), rcode);
    assert!(!response.header().aa());
    assert!(response.answer().is_empty());
}

#[test]
fn unsupported_opcode() {
    let mut msg = query("example.com.", Rtype::Soa);
    msg.header_mut().set_opcode(Opcode::Notify);
    let response = ask(&responder(), &msg, false);
    assert_eq!(response.rcode(), Rcode::NotImp);
    assert_eq!(response.header().opcode(), Opcode::Notify);
}

#[test]
fn malformed_queries() {
    init_logging();
    let responder = responder();

    let mut msg = query("example.com.", Rtype::Soa);
    msg.add_question(Question::new(name("www.example.com."), Rtype::A, Class::In));
    let response = ask(&responder, &msg, false);
    assert_eq!(response.rcode(), Rcode::FormErr);

    // A question count without a question.
    let wire = b"\x47\x11\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00";
    let res = responder.handle(wire, false);
    let response = Message::from_octets(res[0].clone()).unwrap();
    assert_eq!(response.header().id(), 0x4711);
    assert_eq!(response.rcode(), Rcode::FormErr);

    // Too short for a header and responses get no answer at all.
    assert!(responder.handle(&wire[..11], false).is_empty());
    let mut msg = query("example.com.", Rtype::Soa);
    msg.header_mut().set_qr(true);
    assert!(responder.handle(&msg.to_wire().unwrap(), false).is_empty());
}

#[test]
fn udp_truncation() {
    init_logging();
    let zone = example_zone();
    for i in 0..5 {
        let text = format!(
            "big.example.com. 60 TXT {}{}",
            i,
            "x".repeat(200)
        );
        zone.add_record(Record::from_str(&text).unwrap()).unwrap();
    }
    let responder = Responder::new().with_zone(zone);
    let msg = query("big.example.com.", Rtype::Txt);

    let wire = responder.handle(&msg.to_wire().unwrap(), false).remove(0);
    assert!(wire.len() <= Responder::DEFAULT_UDP_PAYLOAD);
    let response = Message::from_octets(wire).unwrap();
    assert!(response.header().tc());
    assert!(response.answer().is_empty());

    let response = ask(&responder, &msg, true);
    assert!(!response.header().tc());
    assert_eq!(response.answer().len(), 5);

    let responder = responder.with_udp_payload(4096);
    let response = ask(&responder, &msg, false);
    assert!(!response.header().tc());
    assert_eq!(response.answer().len(), 5);
}

//------------ TSIG ----------------------------------------------------------

/// Signs a query and returns its octets and TSIG record data.
fn sign(
    key: &Key,
    msg: &mut Message,
) -> (Bytes, zonewire::rdata::Tsig) {
    key.apply(msg, TsigRcode::NoError, None).unwrap();
    let tsig = msg.tsig().cloned().unwrap();
    (msg.to_wire().unwrap(), tsig)
}

#[test]
fn signed_query() {
    init_logging();
    let key = key();
    let mut msg = query("www.example.com.", Rtype::A);
    let (wire, tsig) = sign(&key, &mut msg);

    let mut res = responder().handle(&wire, false);
    let mut response = Message::from_octets(res.remove(0)).unwrap();
    assert_eq!(response.rcode(), Rcode::NoError);
    assert_eq!(data(response.answer()), ["1.2.3.4"]);
    assert_eq!(key.verify(&mut response, Some(&tsig)), TsigRcode::NoError);
    assert_eq!(response.tsig_state(), TsigState::Verified);
}

#[test]
fn signed_refusal_is_signed() {
    let key = key();
    let mut msg = query("www.example.org.", Rtype::A);
    let (wire, tsig) = sign(&key, &mut msg);
    let mut res = responder().handle(&wire, false);
    let mut response = Message::from_octets(res.remove(0)).unwrap();
    assert_eq!(response.rcode(), Rcode::Refused);
    assert_eq!(key.verify(&mut response, Some(&tsig)), TsigRcode::NoError);
}

#[test]
fn unknown_key() {
    init_logging();
    let other = Key::new(Algorithm::Sha256, SECRET, name("other.key.")).unwrap();
    let mut msg = query("www.example.com.", Rtype::A);
    let (wire, _) = sign(&other, &mut msg);

    let mut res = responder().handle(&wire, false);
    let response = Message::from_octets(res.remove(0)).unwrap();
    assert_eq!(response.rcode(), Rcode::NotAuth);
    assert!(response.answer().is_empty());
    let tsig = response.tsig().unwrap();
    assert_eq!(tsig.error(), TsigRcode::BadKey);
    assert!(tsig.mac().is_empty());
    assert_eq!(response.tsig_record().unwrap().owner(), &name("other.key."));
}

#[test]
fn bad_signature() {
    init_logging();
    let forged = Key::new(Algorithm::Sha256, b"wrong", name("transfer.key."))
        .unwrap();
    let mut msg = query("www.example.com.", Rtype::A);
    let (wire, _) = sign(&forged, &mut msg);

    let mut res = responder().handle(&wire, false);
    let response = Message::from_octets(res.remove(0)).unwrap();
    assert_eq!(response.rcode(), Rcode::NotAuth);
    assert!(response.answer().is_empty());
    let tsig = response.tsig().unwrap();
    assert_eq!(tsig.error(), TsigRcode::BadSig);
    assert!(tsig.mac().is_empty());
}

//------------ AXFR ----------------------------------------------------------

#[test]
fn axfr() {
    init_logging();
    let zone = example_zone();
    let rrsets = zone.iter().count();
    let responder = Responder::new().with_zone(zone);
    let wire = query("example.com.", Rtype::Axfr).to_wire().unwrap();

    let res = responder.handle(&wire, true);
    assert_eq!(res.len(), rrsets + 1);
    let messages: Vec<_> = res
        .into_iter()
        .map(|wire| Message::from_octets(wire).unwrap())
        .collect();
    assert_eq!(messages[0].questions().len(), 1);
    assert!(messages[1..].iter().all(|msg| msg.questions().is_empty()));
    assert!(messages
        .iter()
        .all(|msg| msg.header().aa() && msg.header().id() == 0x4711));
    assert_eq!(messages[0].answer()[0].rtype(), Rtype::Soa);
    assert_eq!(messages.last().unwrap().answer()[0].rtype(), Rtype::Soa);

    let records: usize = messages.iter().map(|msg| msg.answer().len()).sum();
    assert_eq!(records, 17);
}

#[test]
fn signed_axfr() {
    init_logging();
    let key = key();
    let mut msg = query("example.com.", Rtype::Axfr);
    let (wire, tsig) = sign(&key, &mut msg);

    let res = responder().handle(&wire, true);
    assert!(res.len() > 2);
    let mut verifier = StreamVerifier::new(key, Some(tsig));
    for wire in res {
        let mut msg = Message::from_octets(wire).unwrap();
        assert_eq!(verifier.verify(&mut msg), TsigRcode::NoError);
    }
    assert_eq!(verifier.finish(), TsigRcode::NoError);
}

#[rstest]
#[case::udp("example.com.", false)]
#[case::not_apex("www.example.com.", true)]
#[case::foreign("example.org.", true)]
fn axfr_refused(#[case] qname: &str, #[case] tcp: bool) {
    init_logging();
    let response = ask(&responder(), &query(qname, Rtype::Axfr), tcp);
    assert_eq!(response.rcode(), Rcode::Refused);
    assert!(response.answer().is_empty());
}

#[test]
fn most_specific_zone_wins() {
    init_logging();
    let child = Zone::from_zonefile(
        name("sub.example.com."),
        "$TTL 60\n\
         @ SOA ns hostmaster 1 2 3 4 5\n\
         @ NS ns\n\
         ns A 192.0.2.100\n\
         host A 192.0.2.101\n",
    )
    .unwrap();
    let responder = responder().with_zone(child);
    assert_eq!(
        responder.find_zone(&name("host.sub.example.com.")).unwrap().origin(),
        name("sub.example.com.")
    );
    let response =
        ask(&responder, &query("host.sub.example.com.", Rtype::A), false);
    assert!(response.header().aa());
    assert_eq!(data(response.answer()), ["192.0.2.101"]);
}
