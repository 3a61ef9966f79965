//! Messages exchanged with the resolution engine.

use crate::network::ResolverProposal;
use crate::query::{QueryClass, QueryId, QueryType};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendQuery {
    pub id: QueryId,
    /// Presentation form with trailing dot.
    pub qname: String,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

/// One chunk of an answer. `answer_len` is the size of the whole answer and
/// is only honoured on the chunk that starts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFragment {
    pub id: QueryId,
    pub answer_len: u16,
    pub srvfail: bool,
    pub bogus: bool,
    pub data: Bytes,
}

/// Frontend → engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    Query(BackendQuery),
    ReplaceResolvers(ResolverProposal),
    NetworkChanged,
    TrustAnchor(String),
    TrustAnchorsDone,
}

impl BackendRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendRequest::Query(_) => "query",
            BackendRequest::ReplaceResolvers(_) => "replace_resolvers",
            BackendRequest::NetworkChanged => "network_changed",
            BackendRequest::TrustAnchor(_) => "trust_anchor",
            BackendRequest::TrustAnchorsDone => "trust_anchors_done",
        }
    }
}

/// Engine → frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Answer(AnswerFragment),
    TrustAnchorAdd(String),
    TrustAnchorSetDone,
    TrustAnchorSetAbort,
}
