mod answer_encoder;
mod backend;
mod blocklist;
mod trust_anchor_store;

pub use answer_encoder::{AnswerEncoder, AnswerLimits};
pub use backend::BackendPort;
pub use blocklist::{BlocklistSink, BlocklistSource};
pub use trust_anchor_store::TrustAnchorStore;
