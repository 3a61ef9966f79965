//! Wire-level view of client queries and locally synthesized answers.

pub mod edns;
pub mod header;
pub mod question;
pub mod synthesize;

pub use edns::{parse_edns, Edns, EdnsError};
pub use header::{Header, HEADER_LEN};
pub use question::{parse_question, Question, QuestionError};

use ferrous_frontend_domain::{Rcode, TransportKind};

/// Plain DNS payload limit without EDNS.
pub const DEFAULT_UDP_SIZE: u16 = 512;

/// Everything the frontend keeps from an admitted query. Owned by the
/// pending query and freed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub header: Header,
    pub question: Question,
    pub edns: Option<Edns>,
}

impl ParsedQuery {
    pub fn dnssec_ok(&self) -> bool {
        self.edns.is_some_and(|e| e.dnssec_ok)
    }

    pub fn checking_disabled(&self) -> bool {
        self.header.checking_disabled()
    }

    /// Largest answer the client can take over `transport`.
    pub fn max_answer_size(&self, transport: TransportKind) -> u16 {
        match transport {
            TransportKind::Tcp => u16::MAX,
            TransportKind::Udp => self
                .edns
                .map_or(DEFAULT_UDP_SIZE, |e| e.udp_size.max(DEFAULT_UDP_SIZE)),
        }
    }

    pub fn error_answer(&self, rcode: Rcode) -> Vec<u8> {
        synthesize::error_answer(&self.header, Some(&self.question), self.edns.as_ref(), rcode)
    }
}
