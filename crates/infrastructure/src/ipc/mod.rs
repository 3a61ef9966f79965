pub mod client;
pub mod codec;
pub mod messages;

pub use client::{connect_backend, spawn_backend, BackendClient};
pub use codec::{Frame, FrameCodec};
pub use messages::{decode_event, decode_request, encode_event, encode_request};
