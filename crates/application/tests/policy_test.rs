mod helpers;

use ferrous_frontend_application::{Admission, AdmissionPolicy, SERVER_IDENTITY};
use ferrous_frontend_domain::{BlocklistSet, QueryClass, QueryType};
use helpers::*;

fn policy() -> AdmissionPolicy {
    AdmissionPolicy::new(BlocklistSet::new(), false)
}

fn blocking(domains: &[&str]) -> AdmissionPolicy {
    let mut set = BlocklistSet::new();
    for domain in domains {
        set.insert(domain);
    }
    AdmissionPolicy::new(set, true)
}

fn reply(admission: Admission) -> Vec<u8> {
    match admission {
        Admission::Reply(bytes) => bytes,
        other => panic!("expected a reply, got {:?}", other),
    }
}

// ── drops ──────────────────────────────────────────────────────────────────

#[test]
fn test_short_packet_is_dropped() {
    let admission = policy().admit(&[0x12, 0x34, 0x01], peer());
    assert!(matches!(admission, Admission::Drop(_)));
}

#[test]
fn test_response_bit_is_dropped() {
    let packet = QueryBuilder::new("example.com").flags(FLAG_QR | FLAG_RD).build();
    assert!(matches!(policy().admit(&packet, peer()), Admission::Drop(_)));
}

#[test]
fn test_truncated_question_is_dropped() {
    let mut packet = QueryBuilder::new("example.com").build();
    packet.truncate(packet.len() - 3);
    assert!(matches!(policy().admit(&packet, peer()), Admission::Drop(_)));
}

// ── header checks ──────────────────────────────────────────────────────────

#[test]
fn test_tc_bit_is_formerr() {
    let packet = QueryBuilder::new("example.com").flags(FLAG_RD | FLAG_TC).build();
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 1);
    assert!(!header(&bytes).truncated());
}

#[test]
fn test_rd_clear_is_refused() {
    let packet = QueryBuilder::new("example.com").flags(0).build();
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 5);
    assert!(!header(&bytes).recursion_desired());
}

#[test]
fn test_non_query_opcode_is_notimp() {
    let packet = QueryBuilder::new("example.com").flags(FLAG_RD | (2 << 11)).build();
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 4);
    assert_eq!(header(&bytes).opcode(), 0);
}

#[test]
fn test_all_counts_off_is_formerr() {
    let mut packet = QueryBuilder::new("example.com").counts(2, 1, 1, 2).build();
    // Second question plus one answer, one authority and two additional
    // records are never walked: the header check fires first.
    packet.extend_from_slice(&[0; 4]);
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 1);
}

#[test]
fn test_two_questions_alone_pass_count_check() {
    let mut packet = QueryBuilder::new("example.com").counts(2, 0, 0, 0).build();
    packet.extend_from_slice(&encode_name("second.example"));
    packet.extend_from_slice(&[0, 1, 0, 1]);
    let admission = policy().admit(&packet, peer());
    match admission {
        Admission::Forward(parsed) => assert_eq!(parsed.question.name, "example.com."),
        other => panic!("expected forward, got {:?}", other),
    }
}

#[test]
fn test_missing_question_is_formerr() {
    let packet = QueryBuilder::new("example.com").counts(0, 0, 0, 0).build();
    let bytes = reply(policy().admit(&packet[..12], peer()));
    assert_eq!(rcode(&bytes), 1);
    assert_eq!(header(&bytes).qdcount, 0);
}

#[test]
fn test_compressed_question_name_is_formerr() {
    let mut packet = QueryBuilder::new("example.com").build();
    packet.truncate(12);
    packet.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1]);
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 1);
}

#[test]
fn test_duplicate_opt_is_formerr_with_question_echoed() {
    let mut packet = QueryBuilder::new("example.com").edns(1232, false).counts(1, 0, 0, 2).build();
    packet.extend_from_slice(&[0, 0, 41, 0x04, 0xd0, 0, 0, 0, 0, 0, 0]);
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 1);
    assert_eq!(header(&bytes).qdcount, 1);
}

// ── blocklist ──────────────────────────────────────────────────────────────

#[test]
fn test_blocked_name_is_refused() {
    let packet = QueryBuilder::new("ads.example.com").build();
    let bytes = reply(blocking(&["ads.example.com"]).admit(&packet, peer()));
    assert_eq!(rcode(&bytes), 5);
}

#[test]
fn test_blocked_name_refused_regardless_of_type_and_class() {
    let policy = blocking(&["ADS.example.com."]);
    for (qtype, qclass) in [
        (QueryType::AXFR, QueryClass::IN),
        (QueryType::OPT, QueryClass::IN),
        (QueryType::TXT, QueryClass::CH),
        (QueryType::ANY, QueryClass::ANY),
    ] {
        let packet = QueryBuilder::new("ads.EXAMPLE.com").qtype(qtype).qclass(qclass).build();
        let bytes = reply(policy.admit(&packet, peer()));
        assert_eq!(rcode(&bytes), 5, "type {} class {}", qtype, qclass);
    }
}

#[test]
fn test_unblocked_name_is_forwarded() {
    let packet = QueryBuilder::new("www.example.com").build();
    let admission = blocking(&["ads.example.com"]).admit(&packet, peer());
    assert!(matches!(admission, Admission::Forward(_)));
}

// ── type and class checks ──────────────────────────────────────────────────

#[test]
fn test_zone_transfers_are_refused() {
    for qtype in [QueryType::AXFR, QueryType::IXFR] {
        let packet = QueryBuilder::new("example.com").qtype(qtype).build();
        assert_eq!(rcode(&reply(policy().admit(&packet, peer()))), 5);
    }
}

#[test]
fn test_meta_types_are_formerr() {
    for qtype in [
        QueryType::OPT,
        QueryType::TSIG,
        QueryType::TKEY,
        QueryType::MAILA,
        QueryType::MAILB,
        QueryType(128),
        QueryType(248),
    ] {
        let packet = QueryBuilder::new("example.com").qtype(qtype).build();
        assert_eq!(rcode(&reply(policy().admit(&packet, peer()))), 1, "type {}", qtype);
    }
}

#[test]
fn test_any_is_forwarded() {
    let packet = QueryBuilder::new("example.com").qtype(QueryType::ANY).build();
    assert!(matches!(policy().admit(&packet, peer()), Admission::Forward(_)));
}

#[test]
fn test_chaos_version_bind_gets_identity() {
    let packet = QueryBuilder::new("VERSION.BIND")
        .id(0xbeef)
        .qtype(QueryType::TXT)
        .qclass(QueryClass::CH)
        .flags(FLAG_RD | FLAG_CD)
        .build();
    let bytes = reply(policy().admit(&packet, peer()));
    let hdr = header(&bytes);

    assert_eq!(hdr.id, 0xbeef);
    assert!(hdr.is_response());
    assert!(hdr.recursion_desired());
    assert!(hdr.checking_disabled());
    assert_eq!(hdr.flags & FLAG_RA, FLAG_RA);
    assert_eq!(hdr.rcode(), 0);
    assert_eq!((hdr.qdcount, hdr.ancount), (1, 1));

    let question_end = packet.len();
    let answer = &bytes[question_end..];
    assert_eq!(&answer[..2], &[0xC0, 0x0C]);
    assert_eq!(&answer[2..4], &16u16.to_be_bytes());
    assert_eq!(&answer[4..6], &3u16.to_be_bytes());
    assert_eq!(&answer[6..10], &[0, 0, 0, 0]);
    let text = SERVER_IDENTITY.as_bytes();
    assert_eq!(&answer[10..12], &(text.len() as u16 + 1).to_be_bytes());
    assert_eq!(answer[12] as usize, text.len());
    assert_eq!(&answer[13..], text);
}

#[test]
fn test_chaos_version_server_gets_identity() {
    let packet = QueryBuilder::new("version.server").qtype(QueryType::TXT).qclass(QueryClass::CH).build();
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(header(&bytes).ancount, 1);
}

#[test]
fn test_other_chaos_name_is_refused() {
    let packet = QueryBuilder::new("hostname.bind").qtype(QueryType::TXT).qclass(QueryClass::CH).build();
    assert_eq!(rcode(&reply(policy().admit(&packet, peer()))), 5);
}

// ── error answer shape ─────────────────────────────────────────────────────

#[test]
fn test_error_answer_carries_opt_when_client_sent_edns() {
    let packet = QueryBuilder::new("example.com")
        .qtype(QueryType::AXFR)
        .edns(1232, true)
        .build();
    let bytes = reply(policy().admit(&packet, peer()));
    let hdr = header(&bytes);

    assert_eq!(hdr.arcount, 1);
    let opt = &bytes[bytes.len() - 11..];
    assert_eq!(&opt[..3], &[0, 0, 41]);
    assert_eq!(&opt[7..9], &[0x80, 0]);
}

#[test]
fn test_error_answer_without_edns_has_no_opt() {
    let packet = QueryBuilder::new("example.com").qtype(QueryType::AXFR).build();
    let bytes = reply(policy().admit(&packet, peer()));
    assert_eq!(header(&bytes).arcount, 0);
    assert_eq!(bytes.len(), packet.len());
}

#[test]
fn test_forward_carries_presentation_name_and_edns() {
    let packet = QueryBuilder::new("Mail.Example.org").qtype(QueryType::MX).edns(4096, true).build();
    match policy().admit(&packet, peer()) {
        Admission::Forward(parsed) => {
            assert_eq!(parsed.question.name, "Mail.Example.org.");
            assert_eq!(parsed.question.qtype, QueryType::MX);
            assert!(parsed.dnssec_ok());
            assert_eq!(parsed.edns.unwrap().udp_size, 4096);
        }
        other => panic!("expected forward, got {:?}", other),
    }
}
