//! MCP server exposing a PipeCD control plane.
//!
//! - `pipecd`: backend records and the API client
//! - `mcp`: resource routing, readers, tools and transports
//! - `config`: environment-driven settings

pub mod config;
pub mod mcp;
pub mod pipecd;
pub mod serde_utils;
