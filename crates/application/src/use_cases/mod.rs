pub mod network_change;
pub mod trust_anchors;

pub use network_change::{NetworkChangeMonitor, NetworkEvent};
pub use trust_anchors::TrustAnchorManager;
