use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrontendConfig {
    /// Idle limit for a TCP connection from accept to final write.
    #[serde(default = "default_tcp_timeout_secs")]
    pub tcp_timeout_secs: u64,

    /// Descriptors kept free before new TCP connections are accepted.
    #[serde(default = "default_fd_reserve")]
    pub fd_reserve: usize,

    /// Pause after the accept path hits the descriptor limit.
    #[serde(default = "default_accept_backoff_ms")]
    pub accept_backoff_ms: u64,

    #[serde(default = "default_max_udp_size")]
    pub max_udp_size: usize,

    /// Buffer size for a TCP request before its length prefix is known.
    #[serde(default = "default_tcp_initial_buffer")]
    pub tcp_initial_buffer: usize,

    /// Strip authority and additional sections from positive answers.
    #[serde(default = "default_true")]
    pub minimize_answers: bool,
}

impl FrontendConfig {
    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_timeout_secs)
    }

    pub fn accept_backoff(&self) -> Duration {
        Duration::from_millis(self.accept_backoff_ms)
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            tcp_timeout_secs: default_tcp_timeout_secs(),
            fd_reserve: default_fd_reserve(),
            accept_backoff_ms: default_accept_backoff_ms(),
            max_udp_size: default_max_udp_size(),
            tcp_initial_buffer: default_tcp_initial_buffer(),
            minimize_answers: true,
        }
    }
}

fn default_tcp_timeout_secs() -> u64 {
    15
}

fn default_fd_reserve() -> usize {
    5
}

fn default_accept_backoff_ms() -> u64 {
    1000
}

fn default_max_udp_size() -> usize {
    65535
}

fn default_tcp_initial_buffer() -> usize {
    512
}

fn default_true() -> bool {
    true
}
