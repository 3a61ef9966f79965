//! Admission checks applied to every complete client query, in order.

use crate::wire::header::OPCODE_QUERY;
use crate::wire::{
    parse_edns, parse_question, synthesize, Header, ParsedQuery, Question, QuestionError,
};
use ferrous_frontend_domain::{BlocklistSet, QueryClass, Rcode};
use std::net::SocketAddr;
use tracing::{debug, info};

/// Text returned for `version.server.` and `version.bind.` in class CH.
pub const SERVER_IDENTITY: &str = "ferrous-frontend";

const CHAOS_NAMES: [&str; 2] = ["version.server.", "version.bind."];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Discard without replying.
    Drop(&'static str),
    /// Reply with these bytes without involving the engine.
    Reply(Vec<u8>),
    /// Hand to the engine.
    Forward(ParsedQuery),
}

pub struct AdmissionPolicy {
    blocklist: BlocklistSet,
    log_blocked: bool,
}

impl AdmissionPolicy {
    pub fn new(blocklist: BlocklistSet, log_blocked: bool) -> Self {
        Self {
            blocklist,
            log_blocked,
        }
    }

    pub fn blocklist(&self) -> &BlocklistSet {
        &self.blocklist
    }

    pub fn replace_blocklist(&mut self, blocklist: BlocklistSet) {
        self.blocklist = blocklist;
    }

    pub fn admit(&self, packet: &[u8], peer: SocketAddr) -> Admission {
        let Some(header) = Header::parse(packet) else {
            return Admission::Drop("short header");
        };
        if header.is_response() {
            return Admission::Drop("response bit set");
        }

        let parsed_question = match header.qdcount {
            0 => None,
            _ => match parse_question(packet) {
                Err(QuestionError::Truncated) => return Admission::Drop("truncated question"),
                Err(QuestionError::InvalidName) => None,
                Ok(parsed) => Some(parsed),
            },
        };
        let question = parsed_question.as_ref().map(|(q, _)| q);

        let refuse = |rcode: Rcode, question: Option<&Question>| {
            Admission::Reply(synthesize::error_answer(&header, question, None, rcode))
        };

        if header.truncated() {
            return refuse(Rcode::FormErr, question);
        }
        if !header.recursion_desired() {
            return refuse(Rcode::Refused, question);
        }
        if header.opcode() != OPCODE_QUERY {
            return refuse(Rcode::NotImp, question);
        }
        if header.qdcount != 1 && header.ancount != 0 && header.nscount != 0 && header.arcount > 1
        {
            return refuse(Rcode::FormErr, question);
        }

        let Some((question, question_end)) = parsed_question else {
            return refuse(Rcode::FormErr, None);
        };

        let edns = match parse_edns(packet, &header, question_end) {
            Ok(edns) => edns,
            Err(e) => {
                debug!(error = ?e, qname = %question.name, "Malformed EDNS");
                return refuse(Rcode::FormErr, Some(&question));
            }
        };

        let parsed = ParsedQuery {
            header,
            question,
            edns,
        };

        if self.blocklist.contains(&parsed.question.name) {
            if self.log_blocked {
                info!(qname = %parsed.question.name, client = %peer, "Blocked query");
            }
            return Admission::Reply(parsed.error_answer(Rcode::Refused));
        }

        let qtype = parsed.question.qtype;
        if qtype.is_zone_transfer() {
            return Admission::Reply(parsed.error_answer(Rcode::Refused));
        }
        if qtype.is_meta() {
            return Admission::Reply(parsed.error_answer(Rcode::FormErr));
        }

        if parsed.question.qclass == QueryClass::CH {
            let name = &parsed.question.name;
            if CHAOS_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                return Admission::Reply(synthesize::chaos_answer(
                    &parsed.header,
                    &parsed.question,
                    SERVER_IDENTITY,
                ));
            }
            return Admission::Reply(parsed.error_answer(Rcode::Refused));
        }

        Admission::Forward(parsed)
    }
}
