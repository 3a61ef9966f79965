//! Ferrous Frontend Domain Layer
pub mod blocklist;
pub mod buffer;
pub mod config;
pub mod errors;
pub mod ipc;
pub mod network;
pub mod query;
pub mod trust_anchor;

pub use blocklist::BlocklistSet;
pub use buffer::WireBuffer;
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use ipc::{AnswerFragment, BackendEvent, BackendQuery, BackendRequest};
pub use network::{AddressFamily, ResolverProposal, RouteMessage};
pub use query::{QueryClass, QueryId, QueryType, Rcode, TransportKind};
pub use trust_anchor::TrustAnchorSet;
