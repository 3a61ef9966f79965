use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlocklistConfig {
    /// One domain per line. Unset means nothing is blocked.
    #[serde(default)]
    pub file: Option<String>,

    /// Log every refused query.
    #[serde(default)]
    pub log: bool,

    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            file: None,
            log: false,
            reload_interval_secs: default_reload_interval_secs(),
        }
    }
}

fn default_reload_interval_secs() -> u64 {
    30
}
