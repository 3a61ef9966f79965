use async_trait::async_trait;
use ferrous_frontend_application::ports::BlocklistSource;
use ferrous_frontend_domain::{BlocklistSet, DomainError};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// One domain per line. Blank lines and `#` comments are skipped.
pub struct FileBlocklistSource {
    path: PathBuf,
}

impl FileBlocklistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlocklistSource for FileBlocklistSource {
    async fn modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .ok()
            .and_then(|meta| meta.modified().ok())
    }

    async fn load(&self) -> Result<BlocklistSet, DomainError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::IoError(format!("{}: {}", self.path.display(), e))
        })?;
        let blocklist = parse_blocklist(&contents);
        info!(file = %self.path.display(), domains = blocklist.len(), "Blocklist loaded");
        Ok(blocklist)
    }
}

pub fn parse_blocklist(contents: &str) -> BlocklistSet {
    let mut blocklist = BlocklistSet::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.chars().any(char::is_whitespace) {
            warn!(line = number + 1, entry = line, "Ignoring malformed blocklist entry");
            continue;
        }
        if !blocklist.insert(line) {
            debug!(line = number + 1, domain = line, "Duplicate blocklist entry");
        }
    }
    blocklist
}
