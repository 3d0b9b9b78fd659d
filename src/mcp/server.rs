//! MCP server implementation
//!
//! `PipecdServer` registers the four PipeCD tools and the `pipecd://`
//! resource templates, delegating to the per-entity tool structs and the
//! resource readers.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, ListResourceTemplatesResult, PaginatedRequestParams,
        ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tokio_util::sync::CancellationToken;

use crate::pipecd::PipecdClient;

use super::resources::{ResourceReaders, resource_templates};
use super::tools::{
    ApplicationTools, DeploymentTools, GetDeploymentParams, GetDeploymentStageLogsParams,
    ListApplicationsParams, ListDeploymentsParams,
};

pub const SERVER_NAME: &str = "pipecd-mcp";

const INSTRUCTIONS: &str = "PipeCD MCP Server - Inspect applications, deployments and stage logs \
of a PipeCD control plane. List tools are paginated: pass a response's nextCursor as the next \
cursor until it is empty. Full records can be read as resources: \
pipecd://applications/{applicationId}, pipecd://deployments/{deploymentId} and \
pipecd://deployments/{deploymentId}/logs/{stageId}.";

/// Main MCP server coordinator
///
/// Generic over `C: PipecdClient` so tests can run against a mock backend.
pub struct PipecdServer<C: PipecdClient> {
    applications: ApplicationTools<C>,
    deployments: DeploymentTools<C>,
    resources: ResourceReaders<C>,
    tool_router: ToolRouter<Self>,
}

impl<C: PipecdClient> Clone for PipecdServer<C> {
    fn clone(&self) -> Self {
        Self {
            applications: self.applications.clone(),
            deployments: self.deployments.clone(),
            resources: self.resources.clone(),
            tool_router: self.tool_router.clone(),
        }
    }
}

#[tool_router]
impl<C: PipecdClient + 'static> PipecdServer<C> {
    /// Create a server sharing one backend client across all handlers.
    pub fn new(client: impl Into<Arc<C>>) -> Self {
        let client: Arc<C> = client.into();

        Self {
            applications: ApplicationTools::new(Arc::clone(&client)),
            deployments: DeploymentTools::new(Arc::clone(&client)),
            resources: ResourceReaders::new(client),
            tool_router: Self::tool_router(),
        }
    }

    /// Get the tool router for this handler
    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "ListApplications",
        description = "List applications managed by PipeCD. Returns {applications, nextCursor}; pass nextCursor back as cursor to fetch the next page. An empty nextCursor means there are no more pages."
    )]
    pub async fn list_applications(
        &self,
        params: Parameters<ListApplicationsParams>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        self.applications.list_applications(params, &ct).await
    }

    #[tool(
        name = "ListDeployments",
        description = "List deployments managed by PipeCD. Optionally scope to one application with applicationId and filter by exact-match labels. Returns {deployments, nextCursor}."
    )]
    pub async fn list_deployments(
        &self,
        params: Parameters<ListDeploymentsParams>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        self.deployments.list_deployments(params, &ct).await
    }

    #[tool(
        name = "GetDeployment",
        description = "Get a deployment managed by PipeCD, including its artifacts and pipeline stages."
    )]
    pub async fn get_deployment(
        &self,
        params: Parameters<GetDeploymentParams>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        self.deployments.get_deployment(params, &ct).await
    }

    #[tool(
        name = "GetDeploymentStageLogs",
        description = "Get the logs of one stage of a deployment managed by PipeCD. Stage IDs are listed in the deployment's stages."
    )]
    pub async fn get_deployment_stage_logs(
        &self,
        params: Parameters<GetDeploymentStageLogsParams>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        self.deployments.get_deployment_stage_logs(params, &ct).await
    }
}

#[tool_handler]
impl<C: PipecdClient + 'static> ServerHandler for PipecdServer<C> {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        let mut server_info = Implementation::default();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.server_info = server_info;
        info.capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .build();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(
            resource_templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.resources.read(&request.uri, &context.ct).await
    }
}
