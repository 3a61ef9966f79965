#![allow(dead_code)]

use ferrous_frontend_application::wire::ParsedQuery;
use ferrous_frontend_application::{Admission, AdmissionPolicy};
use ferrous_frontend_domain::BlocklistSet;
use std::net::SocketAddr;

pub const FLAG_QR: u16 = 0x8000;
pub const FLAG_AA: u16 = 0x0400;
pub const FLAG_TC: u16 = 0x0200;
pub const FLAG_RD: u16 = 0x0100;
pub const FLAG_RA: u16 = 0x0080;
pub const FLAG_AD: u16 = 0x0020;
pub const FLAG_CD: u16 = 0x0010;

pub const TYPE_A: u16 = 1;
pub const TYPE_NS: u16 = 2;
pub const TYPE_TXT: u16 = 16;
pub const TYPE_RRSIG: u16 = 46;
pub const TYPE_DNSKEY: u16 = 48;

pub const ROOT_KSK: &str = ". 172800 IN DNSKEY 257 3 8 AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kvArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+eoZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfdRUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwNR1AkUTV74bU=";

pub fn client() -> SocketAddr {
    "192.0.2.10:53000".parse().unwrap()
}

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

fn opt(udp_size: u16, dnssec_ok: bool) -> Vec<u8> {
    let mut buf = vec![0];
    buf.extend_from_slice(&41u16.to_be_bytes());
    buf.extend_from_slice(&udp_size.to_be_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&(if dnssec_ok { 0x8000u16 } else { 0 }).to_be_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

/// A client query with RD set and an optional OPT record.
pub fn query(id: u16, qname: &str, qtype: u16, edns: Option<(u16, bool)>) -> Vec<u8> {
    query_with_flags(id, FLAG_RD, qname, qtype, 1, edns)
}

pub fn query_with_flags(
    id: u16,
    flags: u16,
    qname: &str,
    qtype: u16,
    qclass: u16,
    edns: Option<(u16, bool)>,
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&flags.to_be_bytes());
    for count in [1u16, 0, 0, u16::from(edns.is_some())] {
        buf.extend_from_slice(&count.to_be_bytes());
    }
    buf.extend_from_slice(&encode_name(qname));
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&qclass.to_be_bytes());
    if let Some((size, dnssec_ok)) = edns {
        buf.extend(opt(size, dnssec_ok));
    }
    buf
}

/// Runs `packet` through admission and returns what would be forwarded.
pub fn parsed(packet: &[u8]) -> ParsedQuery {
    match AdmissionPolicy::new(BlocklistSet::new(), false).admit(packet, client()) {
        Admission::Forward(parsed) => parsed,
        other => panic!("query not forwarded: {:?}", other),
    }
}

pub fn record(name: &str, rtype: u16, ttl: u32, rdata: &[u8]) -> Vec<u8> {
    let mut buf = encode_name(name);
    buf.extend_from_slice(&rtype.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&ttl.to_be_bytes());
    buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    buf.extend_from_slice(rdata);
    buf
}

pub fn a_record(name: &str, address: [u8; 4]) -> Vec<u8> {
    record(name, TYPE_A, 3600, &address)
}

pub fn ns_record(zone: &str, server: &str) -> Vec<u8> {
    record(zone, TYPE_NS, 3600, &encode_name(server))
}

pub fn rrsig_record(name: &str, covered: u16, signer: &str) -> Vec<u8> {
    let mut rdata = Vec::new();
    rdata.extend_from_slice(&covered.to_be_bytes());
    rdata.push(8);
    rdata.push(name.trim_end_matches('.').split('.').count() as u8);
    rdata.extend_from_slice(&3600u32.to_be_bytes());
    rdata.extend_from_slice(&1_900_000_000u32.to_be_bytes());
    rdata.extend_from_slice(&1_700_000_000u32.to_be_bytes());
    rdata.extend_from_slice(&20326u16.to_be_bytes());
    rdata.extend_from_slice(&encode_name(signer));
    rdata.extend_from_slice(&[0xAB; 64]);
    record(name, TYPE_RRSIG, 3600, &rdata)
}

/// Builds answers the way the resolution engine hands them over.
pub struct AnswerBuilder {
    id: u16,
    flags: u16,
    qname: String,
    qtype: u16,
    answers: Vec<Vec<u8>>,
    authority: Vec<Vec<u8>>,
    additional: Vec<Vec<u8>>,
}

impl AnswerBuilder {
    pub fn new(qname: &str, qtype: u16) -> Self {
        Self {
            id: 0,
            flags: FLAG_QR | FLAG_RD | FLAG_RA,
            qname: qname.to_string(),
            qtype,
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn answer(mut self, record: Vec<u8>) -> Self {
        self.answers.push(record);
        self
    }

    pub fn authority(mut self, record: Vec<u8>) -> Self {
        self.authority.push(record);
        self
    }

    pub fn additional(mut self, record: Vec<u8>) -> Self {
        self.additional.push(record);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        for count in [
            1,
            self.answers.len() as u16,
            self.authority.len() as u16,
            self.additional.len() as u16,
        ] {
            buf.extend_from_slice(&count.to_be_bytes());
        }
        buf.extend_from_slice(&encode_name(&self.qname));
        buf.extend_from_slice(&self.qtype.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            buf.extend_from_slice(record);
        }
        buf
    }
}

pub fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

pub fn counts(reply: &[u8]) -> [u16; 4] {
    [u16_at(reply, 4), u16_at(reply, 6), u16_at(reply, 8), u16_at(reply, 10)]
}

/// Backend port that records every request.
#[derive(Default)]
pub struct RecordingBackend {
    sent: std::sync::Mutex<Vec<ferrous_frontend_domain::BackendRequest>>,
}

impl RecordingBackend {
    pub fn sent(&self) -> Vec<ferrous_frontend_domain::BackendRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl ferrous_frontend_application::ports::BackendPort for RecordingBackend {
    fn send(
        &self,
        request: ferrous_frontend_domain::BackendRequest,
    ) -> Result<(), ferrous_frontend_domain::DomainError> {
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}
