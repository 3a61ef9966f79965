use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::errors::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Addresses to answer on; each gets a UDP socket and a TCP listener.
    #[serde(default = "default_listen")]
    pub listen: Vec<String>,
}

impl ServerConfig {
    pub fn listen_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.listen
            .iter()
            .map(|addr| {
                addr.parse::<SocketAddr>().map_err(|e| {
                    ConfigError::Validation(format!("Invalid listen address '{}': {}", addr, e))
                })
            })
            .collect()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> Vec<String> {
    vec!["127.0.0.1:53".to_string(), "[::1]:53".to_string()]
}
