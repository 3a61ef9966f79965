use ferrous_frontend_domain::{BackendRequest, DomainError};

/// Outbound channel to the resolution engine.
pub trait BackendPort: Send + Sync {
    /// Queues `request` without blocking. Fails only once the channel is gone.
    fn send(&self, request: BackendRequest) -> Result<(), DomainError>;
}
