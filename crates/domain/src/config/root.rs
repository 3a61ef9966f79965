use serde::{Deserialize, Serialize};
use std::path::Path;

use super::backend::BackendConfig;
use super::blocklist::BlocklistConfig;
use super::errors::ConfigError;
use super::frontend::FrontendConfig;
use super::logging::LoggingConfig;
use super::network::NetworkConfig;
use super::server::ServerConfig;
use super::trust_anchor::TrustAnchorConfig;

const LOCAL_CONFIG: &str = "ferrous-frontend.toml";
const SYSTEM_CONFIG: &str = "/etc/ferrous-frontend/config.toml";

/// Main configuration structure for the frontend
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listen addresses
    #[serde(default)]
    pub server: ServerConfig,

    /// Admission, TCP and buffer limits
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Resolution engine channel
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub blocklist: BlocklistConfig,

    #[serde(default)]
    pub trust_anchor: TrustAnchorConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-frontend.toml in current directory
    /// 3. /etc/ferrous-frontend/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG).exists() {
            Self::from_file(LOCAL_CONFIG)?
        } else if Path::new(SYSTEM_CONFIG).exists() {
            Self::from_file(SYSTEM_CONFIG)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if !overrides.listen.is_empty() {
            self.server.listen = overrides.listen;
        }
        if let Some(socket) = overrides.backend_socket {
            self.backend.socket_path = socket;
        }
        if let Some(file) = overrides.blocklist_file {
            self.blocklist.file = Some(file);
        }
        if let Some(file) = overrides.trust_anchor_file {
            self.trust_anchor.file = Some(file);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.is_empty() {
            return Err(ConfigError::Validation(
                "No listen addresses configured".to_string(),
            ));
        }
        self.server.listen_addrs()?;

        if self.frontend.tcp_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "TCP timeout cannot be 0".to_string(),
            ));
        }

        if self.frontend.tcp_initial_buffer < 2 {
            return Err(ConfigError::Validation(
                "TCP initial buffer must hold the length prefix".to_string(),
            ));
        }

        if self.backend.socket_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Backend socket path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Vec<String>,
    pub backend_socket: Option<String>,
    pub blocklist_file: Option<String>,
    pub trust_anchor_file: Option<String>,
    pub log_level: Option<String>,
}
