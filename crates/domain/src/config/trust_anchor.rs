use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrustAnchorConfig {
    /// Persisted DNSKEY anchors, rewritten after every merge.
    #[serde(default = "default_trust_anchor_file")]
    pub file: Option<String>,
}

impl Default for TrustAnchorConfig {
    fn default() -> Self {
        Self {
            file: default_trust_anchor_file(),
        }
    }
}

fn default_trust_anchor_file() -> Option<String> {
    Some("/var/lib/ferrous-frontend/root.key".to_string())
}
