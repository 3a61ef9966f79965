pub mod connection;
pub mod dispatcher;
pub mod events;
pub mod tcp;
pub mod udp;

pub use connection::TcpConnection;
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use events::FrontendEvent;
pub use tcp::{
    bind_tcp, classify_accept_error, run_accept_loop, AcceptAction, DescriptorBudget,
    ProcessDescriptors,
};
pub use udp::{bind_udp, run_udp_listener};
