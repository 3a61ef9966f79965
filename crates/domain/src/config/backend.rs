use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unix stream socket of the resolution engine.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

fn default_socket_path() -> String {
    "/var/run/ferrous-frontend/engine.sock".to_string()
}
