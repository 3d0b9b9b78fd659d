//! Protocol-facing entity shapes.
//!
//! List tools return these reduced projections instead of the full backend
//! records. Every projection is total: absent nested records become the
//! nested shape's zero value and enums always render by name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pipecd;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    pub piped_id: String,
    pub project_id: String,
    pub deploy_targets: Vec<String>,
    pub description: String,
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "lastSuccessfulDeploymentID")]
    pub last_successful_deployment_id: String,
    pub sync_state: SyncState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: String,
    pub short_reason: String,
    pub reason: String,
    pub head_deployment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub application_id: String,
    pub labels: BTreeMap<String, String>,
    pub summary: String,
    pub status: String,
    pub status_reason: String,
    pub artifacts: Vec<Artifact>,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: String,
    pub name: String,
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub stage_name: String,
    pub status: String,
    pub status_reason: String,
}

impl From<pipecd::Application> for Application {
    fn from(a: pipecd::Application) -> Self {
        Self {
            id: a.id,
            name: a.name,
            piped_id: a.piped_id,
            project_id: a.project_id,
            deploy_targets: a.deploy_targets,
            description: a.description,
            labels: a.labels,
            last_successful_deployment_id: a
                .most_recently_successful_deployment
                .map(|d| d.deployment_id)
                .unwrap_or_default(),
            sync_state: a.sync_state.unwrap_or_default().into(),
        }
    }
}

impl From<pipecd::ApplicationSyncState> for SyncState {
    fn from(s: pipecd::ApplicationSyncState) -> Self {
        Self {
            status: s.status.as_str_name().into_owned(),
            short_reason: s.short_reason,
            reason: s.reason,
            head_deployment_id: s.head_deployment_id,
        }
    }
}

impl From<pipecd::Deployment> for Deployment {
    fn from(d: pipecd::Deployment) -> Self {
        Self {
            status: d.status.as_str_name().into_owned(),
            id: d.id,
            application_id: d.application_id,
            labels: d.labels,
            summary: d.summary,
            status_reason: d.status_reason,
            artifacts: d.versions.into_iter().map(Artifact::from).collect(),
            stages: d.stages.into_iter().map(Stage::from).collect(),
        }
    }
}

impl From<pipecd::ArtifactVersion> for Artifact {
    fn from(v: pipecd::ArtifactVersion) -> Self {
        Self {
            kind: v.kind.as_str_name().into_owned(),
            name: v.name,
            version: v.version,
            url: v.url,
        }
    }
}

impl From<pipecd::PipelineStage> for Stage {
    fn from(s: pipecd::PipelineStage) -> Self {
        Self {
            status: s.status.as_str_name().into_owned(),
            id: s.id,
            stage_name: s.name,
            status_reason: s.status_reason,
        }
    }
}
