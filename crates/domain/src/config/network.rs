use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Watch the routing socket for interface and resolver changes.
    #[serde(default = "default_route_monitor")]
    pub route_monitor: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            route_monitor: default_route_monitor(),
        }
    }
}

fn default_route_monitor() -> bool {
    true
}
