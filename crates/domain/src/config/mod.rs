pub mod backend;
pub mod blocklist;
pub mod errors;
pub mod frontend;
pub mod logging;
pub mod network;
pub mod root;
pub mod server;
pub mod trust_anchor;

pub use backend::BackendConfig;
pub use blocklist::BlocklistConfig;
pub use errors::ConfigError;
pub use frontend::FrontendConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use network::NetworkConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use trust_anchor::TrustAnchorConfig;
