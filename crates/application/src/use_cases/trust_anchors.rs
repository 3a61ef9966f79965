use crate::ports::{BackendPort, TrustAnchorStore};
use ferrous_frontend_domain::{BackendRequest, DomainError, TrustAnchorSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the active anchor set and the set the engine is currently proposing.
pub struct TrustAnchorManager {
    active: TrustAnchorSet,
    proposed: TrustAnchorSet,
    backend: Arc<dyn BackendPort>,
    store: Option<Arc<dyn TrustAnchorStore>>,
}

impl TrustAnchorManager {
    pub fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self {
            active: TrustAnchorSet::new(),
            proposed: TrustAnchorSet::new(),
            backend,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TrustAnchorStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn active(&self) -> &TrustAnchorSet {
        &self.active
    }

    pub fn proposed(&self) -> &TrustAnchorSet {
        &self.proposed
    }

    /// Loads persisted anchors and announces them to the engine.
    pub fn load(&mut self) -> Result<usize, DomainError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        for anchor in store.load()? {
            self.active.add(anchor);
        }
        info!(count = self.active.len(), "Trust anchors loaded");
        if !self.active.is_empty() {
            self.send_active()?;
        }
        Ok(self.active.len())
    }

    pub fn propose(&mut self, anchor: String) {
        if !self.proposed.add(anchor) {
            debug!("Duplicate trust anchor in proposal");
        }
    }

    pub fn abort_proposal(&mut self) {
        debug!(discarded = self.proposed.len(), "Trust anchor proposal aborted");
        self.proposed.clear();
    }

    /// Merges the proposal into the active set. A changed set is sent back
    /// to the engine; the store is rewritten either way.
    pub fn complete_proposal(&mut self) -> Result<bool, DomainError> {
        let proposed = std::mem::take(&mut self.proposed);
        let changed = self.active.merge(proposed);

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.active) {
                warn!(error = %e, "Cannot persist trust anchors");
            }
        }

        if changed {
            info!(count = self.active.len(), "Trust anchors changed");
            self.send_active()?;
        }

        Ok(changed)
    }

    fn send_active(&self) -> Result<(), DomainError> {
        for anchor in self.active.iter() {
            self.backend
                .send(BackendRequest::TrustAnchor(anchor.to_string()))?;
        }
        self.backend.send(BackendRequest::TrustAnchorsDone)
    }
}
