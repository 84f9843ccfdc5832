//! HTTP API over the feed pipeline
//!
//! `protocol` defines the wire shapes, `server` the axum router and listener.

mod protocol;
mod server;

pub use protocol::*;
pub use server::{router, AppState, HttpServer};
