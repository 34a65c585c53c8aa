//! # mingle-shared
//!
//! Types shared by every Mingle crate: identifier newtypes, the domain
//! records pushed by the server, the named-event wire protocol, and the
//! protocol error type.

pub mod constants;
pub mod models;
pub mod protocol;
pub mod types;

mod error;

pub use error::ProtocolError;
