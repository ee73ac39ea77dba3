//! HTTP backend for publishing to multiple social platforms.

pub mod error;
pub mod routes;
pub mod server;
