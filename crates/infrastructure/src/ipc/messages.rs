//! Mapping between backend messages and frames.

use super::codec::Frame;
use bytes::{Buf, BufMut, BytesMut};
use ferrous_frontend_domain::{
    AddressFamily, AnswerFragment, BackendEvent, BackendQuery, BackendRequest, DomainError,
    QueryClass, QueryId, QueryType, ResolverProposal,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

pub mod kind {
    pub const QUERY: u32 = 1;
    pub const REPLACE_RESOLVERS: u32 = 2;
    pub const NETWORK_CHANGED: u32 = 3;
    pub const TRUST_ANCHOR: u32 = 4;
    pub const TRUST_ANCHORS_DONE: u32 = 5;
    pub const ANSWER: u32 = 16;
    pub const TRUST_ANCHOR_ADD: u32 = 17;
    pub const TRUST_ANCHOR_SET_DONE: u32 = 18;
    pub const TRUST_ANCHOR_SET_ABORT: u32 = 19;
}

/// Fixed part of an answer frame: id, total length and the two verdict bytes.
pub const ANSWER_HEADER_LEN: usize = 12;
const QUERY_HEADER_LEN: usize = 12;
const RESOLVERS_HEADER_LEN: usize = 6;

pub fn encode_request(request: &BackendRequest) -> Frame {
    match request {
        BackendRequest::Query(query) => {
            let mut buf = BytesMut::with_capacity(QUERY_HEADER_LEN + query.qname.len());
            buf.put_u64(query.id.get());
            buf.put_u16(query.qtype.0);
            buf.put_u16(query.qclass.0);
            buf.extend_from_slice(query.qname.as_bytes());
            Frame::new(kind::QUERY, buf.freeze())
        }
        BackendRequest::ReplaceResolvers(proposal) => {
            let mut buf = BytesMut::with_capacity(
                RESOLVERS_HEADER_LEN + proposal.addresses.len() * proposal.family.address_len(),
            );
            buf.put_u32(proposal.if_index);
            buf.put_u8(proposal.source);
            buf.put_u8(proposal.family.tag());
            for address in &proposal.addresses {
                match address {
                    IpAddr::V4(v4) => buf.extend_from_slice(&v4.octets()),
                    IpAddr::V6(v6) => buf.extend_from_slice(&v6.octets()),
                }
            }
            Frame::new(kind::REPLACE_RESOLVERS, buf.freeze())
        }
        BackendRequest::NetworkChanged => Frame::empty(kind::NETWORK_CHANGED),
        BackendRequest::TrustAnchor(anchor) => {
            Frame::new(kind::TRUST_ANCHOR, anchor.clone().into_bytes())
        }
        BackendRequest::TrustAnchorsDone => Frame::empty(kind::TRUST_ANCHORS_DONE),
    }
}

/// Decodes a request frame. Unknown kinds yield `None`.
pub fn decode_request(frame: Frame) -> Result<Option<BackendRequest>, DomainError> {
    let mut payload = frame.payload;
    let request = match frame.kind {
        kind::QUERY => {
            ensure_len(payload.len(), QUERY_HEADER_LEN, "query")?;
            let id = QueryId::new(payload.get_u64());
            let qtype = QueryType(payload.get_u16());
            let qclass = QueryClass(payload.get_u16());
            let qname = text(&payload, "query")?;
            BackendRequest::Query(BackendQuery {
                id,
                qname,
                qtype,
                qclass,
            })
        }
        kind::REPLACE_RESOLVERS => {
            ensure_len(payload.len(), RESOLVERS_HEADER_LEN, "resolvers")?;
            let if_index = payload.get_u32();
            let source = payload.get_u8();
            let family = AddressFamily::from_tag(payload.get_u8()).ok_or_else(|| {
                DomainError::BackendProtocol("resolvers: unknown address family".into())
            })?;
            if payload.len() % family.address_len() != 0 {
                return Err(DomainError::BackendProtocol(
                    "resolvers: truncated address".into(),
                ));
            }
            let addresses = payload
                .chunks_exact(family.address_len())
                .map(|raw| match family {
                    AddressFamily::Inet => {
                        IpAddr::V4(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]))
                    }
                    AddressFamily::Inet6 => {
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(raw);
                        IpAddr::V6(Ipv6Addr::from(octets))
                    }
                })
                .collect();
            BackendRequest::ReplaceResolvers(ResolverProposal {
                if_index,
                source,
                family,
                addresses,
            })
        }
        kind::NETWORK_CHANGED => BackendRequest::NetworkChanged,
        kind::TRUST_ANCHOR => BackendRequest::TrustAnchor(text(&payload, "trust anchor")?),
        kind::TRUST_ANCHORS_DONE => BackendRequest::TrustAnchorsDone,
        other => {
            debug!(kind = other, "Skipping unknown request frame");
            return Ok(None);
        }
    };
    Ok(Some(request))
}

pub fn encode_event(event: &BackendEvent) -> Frame {
    match event {
        BackendEvent::Answer(fragment) => {
            let mut buf = BytesMut::with_capacity(ANSWER_HEADER_LEN + fragment.data.len());
            buf.put_u64(fragment.id.get());
            buf.put_u16(fragment.answer_len);
            buf.put_u8(u8::from(fragment.srvfail));
            buf.put_u8(u8::from(fragment.bogus));
            buf.extend_from_slice(&fragment.data);
            Frame::new(kind::ANSWER, buf.freeze())
        }
        BackendEvent::TrustAnchorAdd(anchor) => {
            Frame::new(kind::TRUST_ANCHOR_ADD, anchor.clone().into_bytes())
        }
        BackendEvent::TrustAnchorSetDone => Frame::empty(kind::TRUST_ANCHOR_SET_DONE),
        BackendEvent::TrustAnchorSetAbort => Frame::empty(kind::TRUST_ANCHOR_SET_ABORT),
    }
}

/// Decodes an event frame. Unknown kinds yield `None`; a short answer
/// header is a protocol error.
pub fn decode_event(frame: Frame) -> Result<Option<BackendEvent>, DomainError> {
    let mut payload = frame.payload;
    let event = match frame.kind {
        kind::ANSWER => {
            ensure_len(payload.len(), ANSWER_HEADER_LEN, "answer")?;
            let id = QueryId::new(payload.get_u64());
            let answer_len = payload.get_u16();
            let srvfail = payload.get_u8() != 0;
            let bogus = payload.get_u8() != 0;
            BackendEvent::Answer(AnswerFragment {
                id,
                answer_len,
                srvfail,
                bogus,
                data: payload,
            })
        }
        kind::TRUST_ANCHOR_ADD => BackendEvent::TrustAnchorAdd(text(&payload, "trust anchor")?),
        kind::TRUST_ANCHOR_SET_DONE => BackendEvent::TrustAnchorSetDone,
        kind::TRUST_ANCHOR_SET_ABORT => BackendEvent::TrustAnchorSetAbort,
        other => {
            debug!(kind = other, "Skipping unknown event frame");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

fn ensure_len(len: usize, min: usize, what: &str) -> Result<(), DomainError> {
    if len < min {
        return Err(DomainError::BackendProtocol(format!(
            "{}: {} bytes, expected at least {}",
            what, len, min
        )));
    }
    Ok(())
}

fn text(payload: &[u8], what: &str) -> Result<String, DomainError> {
    String::from_utf8(payload.to_vec())
        .map_err(|_| DomainError::BackendProtocol(format!("{}: invalid utf-8", what)))
}
