use ferrous_frontend_domain::{DomainError, TrustAnchorSet};

pub trait TrustAnchorStore: Send + Sync {
    /// Anchors that parse as DNSKEY records; an absent store yields none.
    fn load(&self) -> Result<Vec<String>, DomainError>;

    /// Rewrites the whole store with `anchors`.
    fn save(&self, anchors: &TrustAnchorSet) -> Result<(), DomainError>;
}
