//! Re-encodes a resolver answer for the client that asked for it.
//!
//! The answer arrives from the backend as a complete DNS message built for
//! the backend's own query. The client gets its own id, its own question
//! bytes (case preserved), flags mirrored from its query and a payload that
//! fits its transport.

use ferrous_frontend_application::ports::{AnswerEncoder, AnswerLimits};
use ferrous_frontend_application::wire::header::{
    FLAG_AD, FLAG_CD, FLAG_QR, FLAG_RA, FLAG_RD, FLAG_TC,
};
use ferrous_frontend_application::wire::synthesize::opt_record;
use ferrous_frontend_application::wire::{Header, ParsedQuery, HEADER_LEN};
use ferrous_frontend_domain::{DomainError, QueryType};
use hickory_proto::op::Message;
use hickory_proto::rr::{Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use tracing::debug;

const OPCODE_MASK: u16 = 0x7800;
const RCODE_NOERROR: u8 = 0;

/// Hickory-backed answer encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct HickoryAnswerEncoder;

impl HickoryAnswerEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl AnswerEncoder for HickoryAnswerEncoder {
    fn encode(
        &self,
        answer: &[u8],
        query: &ParsedQuery,
        limits: AnswerLimits,
    ) -> Result<Vec<u8>, DomainError> {
        let answer_header = Header::parse(answer)
            .ok_or_else(|| DomainError::AnswerEncoding("answer shorter than a header".into()))?;
        let message = Message::from_vec(answer)
            .map_err(|e| DomainError::AnswerEncoding(format!("unparseable answer: {}", e)))?;

        let qtype = query.question.qtype;
        let keep = |record: &&Record| {
            record.record_type() != RecordType::OPT
                && (limits.dnssec_ok || !is_dnssec_record(record, qtype))
        };
        let answers: Vec<&Record> = message.answers.iter().filter(keep).collect();
        let mut authority: Vec<&Record> = message.authorities.iter().filter(keep).collect();
        let mut additional: Vec<&Record> = message.additionals.iter().filter(keep).collect();

        if limits.minimize && answer_header.rcode() == RCODE_NOERROR && !answers.is_empty() {
            authority.clear();
            additional.clear();
        }

        let flags = reply_flags(answer_header.flags, query, limits.dnssec_ok);
        let opt = query.edns.map(|_| opt_record(limits.dnssec_ok));
        let max_size = usize::from(limits.max_size);

        let attempts: [(&[&Record], &[&Record], &[&Record]); 3] = [
            (answers.as_slice(), authority.as_slice(), additional.as_slice()),
            (answers.as_slice(), authority.as_slice(), &[]),
            (answers.as_slice(), &[], &[]),
        ];
        for (an, ns, ar) in attempts {
            let encoded = encode_message(query, flags, [an, ns, ar], opt.as_ref())?;
            if encoded.len() <= max_size {
                return Ok(encoded);
            }
        }

        debug!(
            id = query.header.id,
            max_size,
            records = answers.len(),
            "Answer does not fit, setting TC"
        );
        encode_message(query, flags | FLAG_TC, [&[], &[], &[]], opt.as_ref())
    }
}

/// DNSSEC records are only kept for DO clients or when explicitly asked for.
fn is_dnssec_record(record: &Record, qtype: QueryType) -> bool {
    let rtype = u16::from(record.record_type());
    QueryType(rtype).is_dnssec() && rtype != qtype.0
}

fn reply_flags(answer_flags: u16, query: &ParsedQuery, dnssec_ok: bool) -> u16 {
    let mut flags = answer_flags & !(FLAG_TC | FLAG_RD | FLAG_CD | OPCODE_MASK);
    flags |= FLAG_QR | FLAG_RA;
    flags |= query.header.flags & (FLAG_RD | FLAG_CD);
    if !dnssec_ok && query.header.flags & FLAG_AD == 0 {
        flags &= !FLAG_AD;
    }
    flags
}

fn encode_message(
    query: &ParsedQuery,
    flags: u16,
    sections: [&[&Record]; 3],
    opt: Option<&[u8; 11]>,
) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    {
        let mut encoder = BinEncoder::new(&mut buf);
        let encoding = |e: hickory_proto::ProtoError| DomainError::AnswerEncoding(e.to_string());

        encoder.emit_vec(&[0u8; HEADER_LEN]).map_err(encoding)?;
        encoder.emit_vec(&query.question.wire).map_err(encoding)?;
        for section in sections {
            for record in section {
                record.emit(&mut encoder).map_err(encoding)?;
            }
        }
        if let Some(opt) = opt {
            encoder.emit_vec(opt).map_err(encoding)?;
        }
    }

    let count = |n: usize| {
        u16::try_from(n).map_err(|_| DomainError::AnswerEncoding("section too large".into()))
    };
    let header = Header {
        id: query.header.id,
        flags,
        qdcount: 1,
        ancount: count(sections[0].len())?,
        nscount: count(sections[1].len())?,
        arcount: count(sections[2].len() + usize::from(opt.is_some()))?,
    };
    let mut head = Vec::with_capacity(HEADER_LEN);
    header.write_to(&mut head);
    buf[..HEADER_LEN].copy_from_slice(&head);
    Ok(buf)
}
