//! `pipecd://` resource addressing.
//!
//! Resource URIs are matched structurally against an ordered table of
//! templates. Each template is a sequence of literal and placeholder
//! segments; the host of the URI is the first segment. When several
//! templates match, the one with the most segments wins.

use miette::Diagnostic;
use rmcp::ErrorData as McpError;
use thiserror::Error;
use url::Url;

pub const SCHEME: &str = "pipecd";
pub const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Application,
    Deployment,
    DeploymentStageLogs,
}

/// One row of the routing table.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ResourceKind,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        uri_template: "pipecd://applications/{applicationId}",
        name: "Application",
        description: "An application managed by PipeCD",
        kind: ResourceKind::Application,
    },
    Template {
        uri_template: "pipecd://deployments/{deploymentId}",
        name: "Deployment",
        description: "A deployment managed by PipeCD",
        kind: ResourceKind::Deployment,
    },
    Template {
        uri_template: "pipecd://deployments/{deploymentId}/logs/{stageId}",
        name: "Deployment Stage Logs",
        description: "Logs of a deployment stage managed by PipeCD",
        kind: ResourceKind::DeploymentStageLogs,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder,
}

impl Template {
    fn segments(&self) -> impl Iterator<Item = Segment<'static>> {
        self.uri_template
            .strip_prefix("pipecd://")
            .unwrap_or(self.uri_template)
            .split('/')
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    Segment::Placeholder
                } else {
                    Segment::Literal(s)
                }
            })
    }

    fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// Placeholder values in template order, or `None` if the shape differs.
    fn capture(&self, segments: &[&str]) -> Option<Vec<String>> {
        if self.segment_count() != segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (pattern, actual) in self.segments().zip(segments) {
            match pattern {
                Segment::Literal(lit) if lit == *actual => {}
                Segment::Literal(_) => return None,
                Segment::Placeholder => params.push((*actual).to_string()),
            }
        }
        Some(params)
    }
}

/// A routed resource with its identifiers. Identifiers may be empty; the
/// readers reject those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Application {
        application_id: String,
    },
    Deployment {
        deployment_id: String,
    },
    DeploymentStageLogs {
        deployment_id: String,
        stage_id: String,
    },
}

impl Resource {
    fn bind(kind: ResourceKind, params: Vec<String>) -> Option<Self> {
        let mut params = params.into_iter();
        let resource = match kind {
            ResourceKind::Application => Resource::Application {
                application_id: params.next()?,
            },
            ResourceKind::Deployment => Resource::Deployment {
                deployment_id: params.next()?,
            },
            ResourceKind::DeploymentStageLogs => Resource::DeploymentStageLogs {
                deployment_id: params.next()?,
                stage_id: params.next()?,
            },
        };
        Some(resource)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Application { .. } => ResourceKind::Application,
            Resource::Deployment { .. } => ResourceKind::Deployment,
            Resource::DeploymentStageLogs { .. } => ResourceKind::DeploymentStageLogs,
        }
    }

    /// Canonical URI, e.g. `pipecd://deployments/dep-1/logs/stage-1`.
    pub fn uri(&self) -> String {
        match self {
            Resource::Application { application_id } => application_uri(application_id),
            Resource::Deployment { deployment_id } => deployment_uri(deployment_id),
            Resource::DeploymentStageLogs {
                deployment_id,
                stage_id,
            } => stage_logs_uri(deployment_id, stage_id),
        }
    }
}

pub fn application_uri(application_id: &str) -> String {
    format!("{SCHEME}://applications/{application_id}")
}

pub fn deployment_uri(deployment_id: &str) -> String {
    format!("{SCHEME}://deployments/{deployment_id}")
}

pub fn stage_logs_uri(deployment_id: &str, stage_id: &str) -> String {
    format!("{SCHEME}://deployments/{deployment_id}/logs/{stage_id}")
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("failed to parse URI")]
    #[diagnostic(code(pipecd_mcp::router::parse))]
    Parse { uri: String },

    #[error("unsupported URI scheme")]
    #[diagnostic(code(pipecd_mcp::router::unsupported_scheme))]
    UnsupportedScheme { scheme: String },

    #[error("unsupported resource type")]
    #[diagnostic(code(pipecd_mcp::router::unsupported_resource))]
    UnsupportedResource { uri: String },
}

impl From<RouteError> for McpError {
    fn from(err: RouteError) -> Self {
        McpError::invalid_params(err.to_string(), None)
    }
}

/// Resolve a resource URI against [`TEMPLATES`].
pub fn route(uri: &str) -> Result<Resource, RouteError> {
    let parsed = Url::parse(uri).map_err(|_| RouteError::Parse {
        uri: uri.to_string(),
    })?;

    if parsed.scheme() != SCHEME {
        return Err(RouteError::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
        });
    }

    let unsupported = || RouteError::UnsupportedResource {
        uri: uri.to_string(),
    };

    let host = parsed.host_str().ok_or_else(unsupported)?;
    // `pipecd://applications` has no path at all; treat it as one empty segment
    let path = parsed.path().strip_prefix('/').unwrap_or(parsed.path());
    let segments: Vec<&str> = std::iter::once(host).chain(path.split('/')).collect();

    TEMPLATES
        .iter()
        .filter_map(|t| t.capture(&segments).map(|params| (t, params)))
        .max_by_key(|(t, _)| t.segment_count())
        .and_then(|(t, params)| Resource::bind(t.kind, params))
        .ok_or_else(unsupported)
}
