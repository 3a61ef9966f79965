use crate::dns::DnskeyRecord;
use ferrous_frontend_application::ports::TrustAnchorStore;
use ferrous_frontend_domain::{DomainError, TrustAnchorSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trust anchors persisted one DNSKEY record per line.
pub struct FileTrustAnchorStore {
    path: PathBuf,
}

impl FileTrustAnchorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: io::Error) -> DomainError {
        DomainError::IoError(format!("{}: {}", self.path.display(), e))
    }
}

impl TrustAnchorStore for FileTrustAnchorStore {
    fn load(&self) -> Result<Vec<String>, DomainError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = %self.path.display(), "No trust anchor file");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut anchors = Vec::new();
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            match DnskeyRecord::from_presentation(line) {
                Ok(record) => {
                    debug!(anchor = %record, "Trust anchor loaded");
                    anchors.push(line.to_string());
                }
                Err(e) => warn!(error = %e, "Ignoring trust anchor line"),
            }
        }
        Ok(anchors)
    }

    fn save(&self, anchors: &TrustAnchorSet) -> Result<(), DomainError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(anchors.to_file_contents().as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.io_error(e))
    }
}
