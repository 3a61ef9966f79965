//! Ferrous Frontend Application Layer
pub mod engine;
pub mod pending;
pub mod policy;
pub mod ports;
pub mod use_cases;
pub mod wire;

pub use engine::{Datagram, EngineSettings, Outcome, QueryEngine};
pub use policy::{Admission, AdmissionPolicy, SERVER_IDENTITY};
