pub mod dns;
pub mod files;
pub mod ipc;
pub mod route;
pub mod server;
