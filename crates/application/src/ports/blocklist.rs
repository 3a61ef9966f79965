use async_trait::async_trait;
use ferrous_frontend_domain::{BlocklistSet, DomainError};
use std::time::SystemTime;

#[async_trait]
pub trait BlocklistSource: Send + Sync {
    /// Modification time of the source, `None` when it does not exist.
    async fn modified(&self) -> Option<SystemTime>;

    async fn load(&self) -> Result<BlocklistSet, DomainError>;
}

/// Receives replacement blocklists for the admission policy.
pub trait BlocklistSink: Send + Sync {
    fn replace(&self, blocklist: BlocklistSet) -> Result<(), DomainError>;
}
