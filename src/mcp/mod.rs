//! Model Context Protocol (MCP) server implementation
//!
//! - **router**: `pipecd://` URI templates and structural matching
//! - **resources**: resource readers returning verbatim backend records
//! - **projection**: reduced entity shapes returned by list tools
//! - **tools**: tool handlers grouped per entity
//!   - ApplicationTools: ListApplications
//!   - DeploymentTools: ListDeployments, GetDeployment, GetDeploymentStageLogs
//! - **server**: `ServerHandler` wiring tools and resources together
//! - **service**: stdio and Streamable HTTP transports
//!
//! Every handler is generic over `C: PipecdClient` and shares one
//! `Arc<C>` backend handle.

pub mod projection;
pub mod resources;
pub mod router;
pub mod server;
mod service;
pub mod tools;

#[cfg(test)]
mod router_test;

pub use server::PipecdServer;
pub use service::{create_mcp_service, serve_http, serve_stdio};
