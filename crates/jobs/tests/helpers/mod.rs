#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_frontend_application::ports::{BlocklistSink, BlocklistSource};
use ferrous_frontend_domain::{BlocklistSet, DomainError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub fn mtime(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn blocklist(domains: &[&str]) -> BlocklistSet {
    let mut set = BlocklistSet::new();
    for domain in domains {
        set.insert(domain);
    }
    set
}

pub struct MockBlocklistSource {
    modified: Mutex<Option<SystemTime>>,
    contents: Mutex<BlocklistSet>,
    fail_loads: Mutex<bool>,
    loads: AtomicUsize,
}

impl MockBlocklistSource {
    pub fn new() -> Self {
        Self {
            modified: Mutex::new(None),
            contents: Mutex::new(BlocklistSet::new()),
            fail_loads: Mutex::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn write(&self, modified: SystemTime, contents: BlocklistSet) {
        *self.modified.lock().unwrap() = Some(modified);
        *self.contents.lock().unwrap() = contents;
    }

    pub fn remove(&self) {
        *self.modified.lock().unwrap() = None;
    }

    pub fn set_fail_loads(&self, fail: bool) {
        *self.fail_loads.lock().unwrap() = fail;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlocklistSource for MockBlocklistSource {
    async fn modified(&self) -> Option<SystemTime> {
        *self.modified.lock().unwrap()
    }

    async fn load(&self) -> Result<BlocklistSet, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_loads.lock().unwrap() {
            return Err(DomainError::IoError("permission denied".into()));
        }
        Ok(self.contents.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct MockBlocklistSink {
    received: Mutex<Vec<BlocklistSet>>,
}

impl MockBlocklistSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<BlocklistSet> {
        self.received.lock().unwrap().clone()
    }
}

impl BlocklistSink for MockBlocklistSink {
    fn replace(&self, blocklist: BlocklistSet) -> Result<(), DomainError> {
        self.received.lock().unwrap().push(blocklist);
        Ok(())
    }
}
