//! MCP tools for PipeCD applications.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::mcp::projection;
use crate::mcp::tools::{json_text, map_client_error};
use crate::pipecd::{ListApplicationsRequest, PipecdClient, cancellable};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsParams {
    #[schemars(
        description = "Cursor from a previous call's nextCursor. Omit or leave empty for the first page."
    )]
    pub cursor: Option<String>,
}

// =============================================================================
// Application Tools
// =============================================================================

pub struct ApplicationTools<C: PipecdClient> {
    client: Arc<C>,
}

impl<C: PipecdClient> Clone for ApplicationTools<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: PipecdClient + 'static> ApplicationTools<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// One page of applications, projected. An empty `nextCursor` marks the
    /// last page.
    #[instrument(skip_all)]
    pub async fn list_applications(
        &self,
        params: Parameters<ListApplicationsParams>,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let request = ListApplicationsRequest {
            cursor: params.0.cursor.unwrap_or_default(),
        };

        let response = cancellable(ct, self.client.list_applications(request))
            .await
            .map_err(map_client_error)?;

        let applications: Vec<projection::Application> = response
            .applications
            .into_iter()
            .map(projection::Application::from)
            .collect();

        json_text(&json!({
            "applications": applications,
            "nextCursor": response.cursor,
        }))
    }
}
