//! Resource readers for `pipecd://` URIs.
//!
//! Single-resource reads return the backend record verbatim rather than the
//! reduced projection used by list tools. Backend failures are logged and
//! replaced by a fixed message so transport details never reach the client.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    model::{
        AnnotateAble, RawResourceTemplate, ReadResourceResult, ResourceContents, ResourceTemplate,
    },
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::pipecd::{
    GetApplicationRequest, GetDeploymentRequest, ListStageLogsRequest, PipecdClient, cancellable,
};

use super::router::{self, JSON_MIME, Resource, TEMPLATES};

/// Body returned when a stage has no recorded logs yet.
pub const NO_LOGS_BODY: &str = r#"{"error":"no logs found"}"#;

/// Resource templates advertised to clients, in routing-table order.
pub fn resource_templates() -> Vec<ResourceTemplate> {
    TEMPLATES
        .iter()
        .map(|t| {
            RawResourceTemplate {
                uri_template: t.uri_template.to_string(),
                name: t.name.to_string(),
                title: None,
                description: Some(t.description.to_string()),
                mime_type: Some(JSON_MIME.to_string()),
                icons: None,
            }
            .no_annotation()
        })
        .collect()
}

/// Wrap JSON text as a single `application/json` content item.
pub(crate) fn json_contents(uri: String, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri,
        mime_type: Some(JSON_MIME.to_string()),
        text,
        meta: None,
    }
}

fn single(uri: String, text: String) -> ReadResourceResult {
    ReadResourceResult::new(vec![json_contents(uri, text)])
}

fn require(value: &str, message: &'static str) -> Result<(), McpError> {
    if value.is_empty() {
        Err(McpError::invalid_params(message, None))
    } else {
        Ok(())
    }
}

fn marshal<T: Serialize>(record: &T, message: &'static str) -> Result<String, McpError> {
    serde_json::to_string(record).map_err(|e| {
        warn!(error = %e, "{}", message);
        McpError::internal_error(message, None)
    })
}

pub struct ResourceReaders<C: PipecdClient> {
    client: Arc<C>,
}

impl<C: PipecdClient> Clone for ResourceReaders<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: PipecdClient + 'static> ResourceReaders<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Route `uri` and read the resource it names.
    pub async fn read(
        &self,
        uri: &str,
        ct: &CancellationToken,
    ) -> Result<ReadResourceResult, McpError> {
        match router::route(uri)? {
            Resource::Application { application_id } => {
                self.read_application(&application_id, ct).await
            }
            Resource::Deployment { deployment_id } => {
                self.read_deployment(&deployment_id, ct).await
            }
            Resource::DeploymentStageLogs {
                deployment_id,
                stage_id,
            } => self.read_stage_logs(&deployment_id, &stage_id, ct).await,
        }
    }

    #[instrument(skip(self, ct))]
    pub async fn read_application(
        &self,
        application_id: &str,
        ct: &CancellationToken,
    ) -> Result<ReadResourceResult, McpError> {
        require(application_id, "missing application ID")?;

        let request = GetApplicationRequest {
            application_id: application_id.to_string(),
        };
        let response = cancellable(ct, self.client.get_application(request))
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to get application");
                McpError::internal_error("failed to get application", None)
            })?;

        let text = marshal(&response.application, "failed to marshal application")?;
        Ok(single(router::application_uri(application_id), text))
    }

    #[instrument(skip(self, ct))]
    pub async fn read_deployment(
        &self,
        deployment_id: &str,
        ct: &CancellationToken,
    ) -> Result<ReadResourceResult, McpError> {
        require(deployment_id, "missing deployment ID")?;

        let request = GetDeploymentRequest {
            deployment_id: deployment_id.to_string(),
        };
        let response = cancellable(ct, self.client.get_deployment(request))
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to get deployment");
                McpError::internal_error("failed to get deployment", None)
            })?;

        let text = marshal(&response.deployment, "failed to marshal deployment")?;
        Ok(single(router::deployment_uri(deployment_id), text))
    }

    #[instrument(skip(self, ct))]
    pub async fn read_stage_logs(
        &self,
        deployment_id: &str,
        stage_id: &str,
        ct: &CancellationToken,
    ) -> Result<ReadResourceResult, McpError> {
        require(deployment_id, "missing deployment ID")?;
        require(stage_id, "missing stage ID")?;

        let request = ListStageLogsRequest {
            deployment_id: deployment_id.to_string(),
        };
        let response = cancellable(ct, self.client.list_stage_logs(request))
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to get deployment stage logs");
                McpError::internal_error("failed to get deployment stage logs", None)
            })?;

        let uri = router::stage_logs_uri(deployment_id, stage_id);
        let text = match response.stage_logs.get(stage_id) {
            Some(log) => marshal(log, "failed to marshal deployment stage logs")?,
            None => NO_LOGS_BODY.to_string(),
        };
        Ok(single(uri, text))
    }
}
