#![allow(dead_code)]

mod mocks;
mod packets;

pub use mocks::*;
pub use packets::*;
