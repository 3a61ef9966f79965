use crate::wire::ParsedQuery;
use ferrous_frontend_domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerLimits {
    pub max_size: u16,
    pub dnssec_ok: bool,
    pub minimize: bool,
}

/// Turns a reassembled engine answer into the reply sent to the client:
/// client id and question, size limit, DNSSEC record filtering, minimization.
pub trait AnswerEncoder: Send + Sync {
    fn encode(
        &self,
        answer: &[u8],
        query: &ParsedQuery,
        limits: AnswerLimits,
    ) -> Result<Vec<u8>, DomainError>;
}
