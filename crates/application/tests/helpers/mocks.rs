use ferrous_frontend_application::pending::IdSource;
use ferrous_frontend_application::ports::{
    AnswerEncoder, AnswerLimits, BackendPort, TrustAnchorStore,
};
use ferrous_frontend_application::wire::ParsedQuery;
use ferrous_frontend_domain::{BackendRequest, DomainError, TrustAnchorSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct MockBackend {
    sent: Mutex<Vec<BackendRequest>>,
    closed: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed() -> Self {
        let backend = Self::default();
        backend.closed.store(true, Ordering::SeqCst);
        backend
    }

    pub fn sent(&self) -> Vec<BackendRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl BackendPort for MockBackend {
    fn send(&self, request: BackendRequest) -> Result<(), DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::BackendUnavailable);
        }
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}

/// Echoes the reassembled answer with the client's id patched in.
#[derive(Default)]
pub struct MockAnswerEncoder {
    calls: Mutex<Vec<(Vec<u8>, AnswerLimits)>>,
    fail: AtomicBool,
}

impl MockAnswerEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let encoder = Self::default();
        encoder.fail.store(true, Ordering::SeqCst);
        encoder
    }

    pub fn calls(&self) -> Vec<(Vec<u8>, AnswerLimits)> {
        self.calls.lock().unwrap().clone()
    }
}

impl AnswerEncoder for MockAnswerEncoder {
    fn encode(
        &self,
        answer: &[u8],
        query: &ParsedQuery,
        limits: AnswerLimits,
    ) -> Result<Vec<u8>, DomainError> {
        self.calls.lock().unwrap().push((answer.to_vec(), limits));
        if self.fail.load(Ordering::SeqCst) || answer.len() < 12 {
            return Err(DomainError::AnswerEncoding("mock failure".to_string()));
        }
        let mut reply = answer.to_vec();
        reply[..2].copy_from_slice(&query.header.id.to_be_bytes());
        Ok(reply)
    }
}

/// Stand-in for a TCP connection handle; counts how often it was dropped.
#[derive(Debug)]
pub struct MockConnection {
    drops: Arc<AtomicUsize>,
}

impl MockConnection {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                drops: drops.clone(),
            },
            drops,
        )
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out a fixed sequence of ids, then counts upward.
pub struct SequenceIds {
    ids: VecDeque<u64>,
    next: u64,
}

impl SequenceIds {
    pub fn new(ids: &[u64]) -> Self {
        Self {
            ids: ids.iter().copied().collect(),
            next: 1000,
        }
    }
}

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> u64 {
        self.ids.pop_front().unwrap_or_else(|| {
            self.next += 1;
            self.next
        })
    }
}

#[derive(Default)]
pub struct MockTrustAnchorStore {
    persisted: Vec<String>,
    saves: Mutex<Vec<TrustAnchorSet>>,
    fail_save: AtomicBool,
}

impl MockTrustAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchors(anchors: &[&str]) -> Self {
        Self {
            persisted: anchors.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_saves(self) -> Self {
        self.fail_save.store(true, Ordering::SeqCst);
        self
    }

    pub fn saves(&self) -> Vec<TrustAnchorSet> {
        self.saves.lock().unwrap().clone()
    }
}

impl TrustAnchorStore for MockTrustAnchorStore {
    fn load(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.persisted.clone())
    }

    fn save(&self, anchors: &TrustAnchorSet) -> Result<(), DomainError> {
        self.saves.lock().unwrap().push(anchors.clone());
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::IoError("disk full".to_string()));
        }
        Ok(())
    }
}
