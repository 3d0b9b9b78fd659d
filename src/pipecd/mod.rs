//! PipeCD backend access.
//!
//! - `models`: backend-native records and API request/response types
//! - `client`: the [`PipecdClient`] trait the MCP layer depends on
//! - `http`: the production client speaking to PipeCD's API service
//! - `error`: client error types

mod client;
mod error;
pub mod http;
mod models;

#[cfg(test)]
mod http_test;

#[cfg(test)]
pub use client::MockPipecdClient;
pub use client::{PipecdClient, cancellable};
pub use error::{ClientError, ClientResult};
pub use http::HttpPipecdClient;
pub use models::*;
