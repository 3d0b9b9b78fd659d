//! MCP tools for PipeCD deployments and their stage logs.

use std::collections::BTreeMap;
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
use crate::mcp::router::{deployment_uri, stage_logs_uri};
use crate::mcp::tools::{json_resource, json_text, map_client_error, required};
use crate::pipecd::{
    GetDeploymentRequest, ListDeploymentsRequest, ListStageLogsRequest, PipecdClient, cancellable,
};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDeploymentsParams {
    #[schemars(
        description = "Only list deployments of this application. Omit to list across all applications."
    )]
    pub application_id: Option<String>,
    #[schemars(
        description = "Cursor from a previous call's nextCursor. Omit or leave empty for the first page."
    )]
    pub cursor: Option<String>,
    #[schemars(
        description = "Only list deployments carrying all of these labels (exact key/value match)."
    )]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetDeploymentParams {
    #[schemars(description = "Deployment ID")]
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetDeploymentStageLogsParams {
    #[schemars(description = "Deployment ID")]
    pub deployment_id: String,
    #[schemars(description = "Stage ID within the deployment (see the deployment's stages)")]
    pub stage_id: String,
}

impl ListDeploymentsParams {
    fn into_request(self) -> ListDeploymentsRequest {
        ListDeploymentsRequest {
            application_ids: self
                .application_id
                .filter(|id| !id.is_empty())
                .into_iter()
                .collect(),
            labels: self.labels.unwrap_or_default(),
            cursor: self.cursor.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Deployment Tools
// =============================================================================

pub struct DeploymentTools<C: PipecdClient> {
    client: Arc<C>,
}

impl<C: PipecdClient> Clone for DeploymentTools<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: PipecdClient + 'static> DeploymentTools<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    #[instrument(skip_all)]
    pub async fn list_deployments(
        &self,
        params: Parameters<ListDeploymentsParams>,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let request = params.0.into_request();

        let response = cancellable(ct, self.client.list_deployments(request))
            .await
            .map_err(map_client_error)?;

        let deployments: Vec<projection::Deployment> = response
            .deployments
            .into_iter()
            .map(projection::Deployment::from)
            .collect();

        json_text(&json!({
            "deployments": deployments,
            "nextCursor": response.cursor,
        }))
    }

    #[instrument(skip_all, fields(id = %params.0.id))]
    pub async fn get_deployment(
        &self,
        params: Parameters<GetDeploymentParams>,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let id = required(&params.0.id, "id")?;

        let request = GetDeploymentRequest {
            deployment_id: id.to_string(),
        };
        let response = cancellable(ct, self.client.get_deployment(request))
            .await
            .map_err(map_client_error)?;

        let deployment = projection::Deployment::from(response.deployment);
        json_resource(deployment_uri(id), &deployment)
    }

    /// Logs of one stage. A stage without logs is an error here, while the
    /// equivalent resource read succeeds with an error-shaped body.
    #[instrument(
        skip_all,
        fields(deployment_id = %params.0.deployment_id, stage_id = %params.0.stage_id)
    )]
    pub async fn get_deployment_stage_logs(
        &self,
        params: Parameters<GetDeploymentStageLogsParams>,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let deployment_id = required(&params.0.deployment_id, "deploymentId")?;
        let stage_id = required(&params.0.stage_id, "stageId")?;

        let request = ListStageLogsRequest {
            deployment_id: deployment_id.to_string(),
        };
        let mut response = cancellable(ct, self.client.list_stage_logs(request))
            .await
            .map_err(map_client_error)?;

        let log = response
            .stage_logs
            .remove(stage_id)
            .ok_or_else(|| McpError::internal_error("no logs found", None))?;

        json_resource(stage_logs_uri(deployment_id, stage_id), &log)
    }
}
