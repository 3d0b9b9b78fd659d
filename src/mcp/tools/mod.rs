//! MCP tool implementations
//!
//! Tool handlers are grouped per entity. Unlike resource reads, tool calls
//! surface backend error detail to the caller.

mod applications;
mod deployments;

#[cfg(test)]
mod applications_test;

pub use applications::{ApplicationTools, ListApplicationsParams};
pub use deployments::{
    DeploymentTools, GetDeploymentParams, GetDeploymentStageLogsParams, ListDeploymentsParams,
};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::json;

use crate::pipecd::ClientError;

use super::resources::json_contents;

/// Map a backend failure to a tool error, keeping its message and code.
pub(crate) fn map_client_error(err: ClientError) -> McpError {
    let data = err.code().map(|code| json!({ "code": code }));
    McpError::internal_error(err.to_string(), data)
}

/// Reject an absent or empty required parameter.
pub(crate) fn required<'a>(value: &'a str, name: &str) -> Result<&'a str, McpError> {
    if value.is_empty() {
        return Err(McpError::invalid_params(
            format!("{name} is required"),
            Some(json!({ "parameter": name })),
        ));
    }
    Ok(value)
}

/// Serialize `value` as the tool's single text result.
pub(crate) fn json_text<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(
            "serialization_error",
            Some(json!({ "error": e.to_string() })),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Serialize `value` as a single embedded `application/json` resource.
pub(crate) fn json_resource<T: Serialize>(
    uri: String,
    value: &T,
) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string(value).map_err(|e| {
        McpError::internal_error(
            "serialization_error",
            Some(json!({ "error": e.to_string() })),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::resource(
        json_contents(uri, text),
    )]))
}
