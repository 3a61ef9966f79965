pub mod monitor;
pub mod netlink;

pub use monitor::{handle_datagram, run_route_monitor};
#[cfg(target_os = "linux")]
pub use monitor::RouteSocket;
pub use netlink::parse_messages;
