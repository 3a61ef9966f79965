//! Locally built answers: errors and the CHAOS identity reply.

use super::edns::Edns;
use super::header::{Header, FLAG_CD, FLAG_QR, FLAG_RA, FLAG_RD};
use super::question::Question;
use ferrous_frontend_domain::{QueryClass, QueryType, Rcode};

/// UDP payload size advertised in OPT records we generate.
pub const EDNS_ADVERTISED_SIZE: u16 = 4096;

const EDNS_DO: u16 = 0x8000;
const POINTER_TO_QUESTION: [u8; 2] = [0xC0, 0x0C];

/// Response flags: QR and RA set, RD and CD mirrored from the query.
fn response_flags(query: &Header, rcode: Rcode) -> u16 {
    FLAG_QR | FLAG_RA | (query.flags & (FLAG_RD | FLAG_CD)) | rcode.as_u8() as u16
}

/// Root-owned OPT record with our advertised size and the client's DO bit.
pub fn opt_record(dnssec_ok: bool) -> [u8; 11] {
    let size = EDNS_ADVERTISED_SIZE.to_be_bytes();
    let flags: u16 = if dnssec_ok { EDNS_DO } else { 0 };
    let flags = flags.to_be_bytes();
    [0, 0, 41, size[0], size[1], 0, 0, flags[0], flags[1], 0, 0]
}

/// Error reply echoing the query id and question.
///
/// The question is omitted when it could not be parsed; an OPT record is
/// appended only when the client sent one.
pub fn error_answer(
    query: &Header,
    question: Option<&Question>,
    edns: Option<&Edns>,
    rcode: Rcode,
) -> Vec<u8> {
    let header = Header {
        id: query.id,
        flags: response_flags(query, rcode),
        qdcount: question.is_some() as u16,
        ancount: 0,
        nscount: 0,
        arcount: edns.is_some() as u16,
    };

    let mut out = Vec::with_capacity(12 + question.map_or(0, |q| q.wire.len()) + 11);
    header.write_to(&mut out);
    if let Some(question) = question {
        out.extend_from_slice(&question.wire);
    }
    if let Some(edns) = edns {
        out.extend_from_slice(&opt_record(edns.dnssec_ok));
    }
    out
}

/// Single TXT record in class CH carrying `text`, owned by the question name.
pub fn chaos_answer(query: &Header, question: &Question, text: &str) -> Vec<u8> {
    let text = &text.as_bytes()[..text.len().min(255)];
    let header = Header {
        id: query.id,
        flags: response_flags(query, Rcode::NoError),
        qdcount: 1,
        ancount: 1,
        nscount: 0,
        arcount: 0,
    };

    let mut out = Vec::with_capacity(12 + question.wire.len() + 13 + text.len());
    header.write_to(&mut out);
    out.extend_from_slice(&question.wire);
    out.extend_from_slice(&POINTER_TO_QUESTION);
    out.extend_from_slice(&QueryType::TXT.0.to_be_bytes());
    out.extend_from_slice(&QueryClass::CH.0.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(text.len() as u16 + 1).to_be_bytes());
    out.push(text.len() as u8);
    out.extend_from_slice(text);
    out
}
