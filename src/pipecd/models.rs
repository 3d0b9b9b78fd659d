//! Backend-native PipeCD records.
//!
//! These types mirror PipeCD's `model` and `apiservice` protobuf messages in
//! their canonical JSON (protojson) form: camelCase field names, enums as
//! symbolic names and every field optional with a zero-value default. Fields
//! the crate does not model are kept in `extra`, at every nesting level, and
//! zero values are omitted on output, so a decoded record re-serializes to
//! what the server sent.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::serde_utils::{int64, is_default, null_as_default};

// =============================================================================
// Enumerations
// =============================================================================

/// Raw wire value of an enumeration member missing from the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(i32),
    Name(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Number(number) => write!(f, "{number}"),
            EnumValue::Name(name) => f.write_str(name),
        }
    }
}

/// Declares a protobuf enumeration together with its symbol table.
///
/// The generated type decodes from either the symbolic name or the numeric
/// value and always renders known members by name. Members the table does
/// not know are kept as [`EnumValue`] and render as the raw name, or as the
/// decimal number when only a number was sent.
macro_rules! pipecd_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $number:literal => $symbol:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
            Unrecognized(EnumValue),
        }

        impl $name {
            pub fn from_number(number: i32) -> Option<Self> {
                match number {
                    $($number => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn from_str_name(name: &str) -> Option<Self> {
                match name {
                    $($symbol => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Symbolic name of this value.
            pub fn as_str_name(&self) -> Cow<'_, str> {
                match self {
                    $(Self::$variant => Cow::Borrowed($symbol),)+
                    Self::Unrecognized(EnumValue::Name(name)) => Cow::Borrowed(name.as_str()),
                    Self::Unrecognized(EnumValue::Number(number)) => {
                        Cow::Owned(number.to_string())
                    }
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                match Self::from_number(0) {
                    Some(value) => value,
                    None => Self::Unrecognized(EnumValue::Number(0)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_str_name())
            }
        }

        // Unknown numbers go back out as numbers, as protojson does; only
        // `as_str_name` turns them into strings.
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    Self::Unrecognized(EnumValue::Number(number)) => {
                        serializer.serialize_i32(*number)
                    }
                    known => serializer.serialize_str(&known.as_str_name()),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = match Option::<EnumValue>::deserialize(deserializer)? {
                    None => Self::default(),
                    Some(EnumValue::Number(number)) => match Self::from_number(number) {
                        Some(known) => known,
                        None => Self::Unrecognized(EnumValue::Number(number)),
                    },
                    Some(EnumValue::Name(name)) => match Self::from_str_name(&name) {
                        Some(known) => known,
                        None => Self::Unrecognized(EnumValue::Name(name)),
                    },
                };
                Ok(value)
            }
        }
    };
}

pipecd_enum! {
    /// Platform an application is deployed to.
    ApplicationKind {
        Kubernetes = 0 => "KUBERNETES",
        Terraform = 1 => "TERRAFORM",
        Lambda = 3 => "LAMBDA",
        CloudRun = 4 => "CLOUDRUN",
        Ecs = 5 => "ECS",
        Application = 6 => "APPLICATION",
    }
}

pipecd_enum! {
    /// Whether the live state of an application matches its Git state.
    SyncStatus {
        Unknown = 0 => "UNKNOWN",
        Synced = 1 => "SYNCED",
        Deploying = 2 => "DEPLOYING",
        OutOfSync = 3 => "OUT_OF_SYNC",
        InvalidConfig = 4 => "INVALID_CONFIG",
    }
}

pipecd_enum! {
    DeploymentStatus {
        Pending = 0 => "DEPLOYMENT_PENDING",
        Planned = 1 => "DEPLOYMENT_PLANNED",
        Running = 2 => "DEPLOYMENT_RUNNING",
        RollingBack = 3 => "DEPLOYMENT_ROLLING_BACK",
        Success = 4 => "DEPLOYMENT_SUCCESS",
        Failure = 5 => "DEPLOYMENT_FAILURE",
        Cancelled = 6 => "DEPLOYMENT_CANCELLED",
    }
}

pipecd_enum! {
    StageStatus {
        NotStartedYet = 0 => "STAGE_NOT_STARTED_YET",
        Running = 1 => "STAGE_RUNNING",
        Success = 2 => "STAGE_SUCCESS",
        Failure = 3 => "STAGE_FAILURE",
        Cancelled = 4 => "STAGE_CANCELLED",
        Skipped = 5 => "STAGE_SKIPPED",
        Exited = 6 => "STAGE_EXITED",
    }
}

pipecd_enum! {
    /// Kind of artifact a deployment rolls out.
    ArtifactKind {
        Unknown = 0 => "UNKNOWN",
        ContainerImage = 1 => "CONTAINER_IMAGE",
        S3Object = 2 => "S3_OBJECT",
        LambdaFunction = 3 => "LAMBDA_FUNCTION",
        GitSource = 4 => "GIT_SOURCE",
        TerraformModule = 5 => "TERRAFORM_MODULE",
    }
}

pipecd_enum! {
    LogSeverity {
        Info = 0 => "INFO",
        Success = 1 => "SUCCESS",
        Error = 2 => "ERROR",
    }
}

// =============================================================================
// Records
// =============================================================================

/// An application registered in PipeCD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    #[serde(skip_serializing_if = "is_default")]
    pub id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    /// Piped agent that manages this application.
    #[serde(skip_serializing_if = "is_default")]
    pub piped_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub project_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub kind: ApplicationKind,
    #[serde(skip_serializing_if = "is_default")]
    pub platform_provider: String,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub deploy_targets: Vec<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_recently_successful_deployment: Option<ApplicationDeploymentReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_recently_triggered_deployment: Option<ApplicationDeploymentReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_state: Option<ApplicationSyncState>,
    #[serde(skip_serializing_if = "is_default")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub deleted: bool,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub updated_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDeploymentReference {
    #[serde(skip_serializing_if = "is_default")]
    pub deployment_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub summary: String,
    #[serde(skip_serializing_if = "is_default")]
    pub version: String,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub started_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub completed_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationSyncState {
    #[serde(skip_serializing_if = "is_default")]
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "is_default")]
    pub short_reason: String,
    #[serde(skip_serializing_if = "is_default")]
    pub reason: String,
    /// Deployment currently driving the application towards its Git state.
    #[serde(skip_serializing_if = "is_default")]
    pub head_deployment_id: String,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single rollout of an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    #[serde(skip_serializing_if = "is_default")]
    pub id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub application_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub application_name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub piped_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub project_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub kind: ApplicationKind,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_default")]
    pub summary: String,
    #[serde(skip_serializing_if = "is_default")]
    pub status: DeploymentStatus,
    #[serde(skip_serializing_if = "is_default")]
    pub status_reason: String,
    /// Artifacts being deployed, in the order the server reports them.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub versions: Vec<ArtifactVersion>,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub stages: Vec<PipelineStage>,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub updated_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub completed_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactVersion {
    #[serde(skip_serializing_if = "is_default")]
    pub kind: ArtifactKind,
    #[serde(skip_serializing_if = "is_default")]
    pub version: String,
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One step of a deployment pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineStage {
    #[serde(skip_serializing_if = "is_default")]
    pub id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub desc: String,
    #[serde(skip_serializing_if = "is_default")]
    pub index: i32,
    #[serde(skip_serializing_if = "is_default")]
    pub predefined: bool,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub visible: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub status: StageStatus,
    #[serde(skip_serializing_if = "is_default")]
    pub status_reason: String,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_default")]
    pub retried_count: i32,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub completed_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub updated_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Log output recorded for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageLog {
    #[serde(skip_serializing_if = "is_default")]
    pub completed: bool,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_default")]
    pub log_blocks: Vec<LogBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogBlock {
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub index: i64,
    #[serde(skip_serializing_if = "is_default")]
    pub log: String,
    #[serde(skip_serializing_if = "is_default")]
    pub severity: LogSeverity,
    #[serde(with = "int64", skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// API service requests and responses
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListApplicationsRequest {
    /// Continuation token; empty requests the first page.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListApplicationsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub applications: Vec<Application>,
    /// Empty when there are no further pages.
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetApplicationRequest {
    pub application_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetApplicationResponse {
    pub application: Application,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListDeploymentsRequest {
    /// Restricts the listing to these applications; empty lists all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub application_ids: Vec<String>,
    /// Exact-match label filter; empty applies no filter.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListDeploymentsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub deployments: Vec<Deployment>,
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetDeploymentRequest {
    pub deployment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetDeploymentResponse {
    pub deployment: Deployment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListStageLogsRequest {
    pub deployment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListStageLogsResponse {
    /// Logs keyed by stage ID. Stages without output are absent.
    #[serde(deserialize_with = "null_as_default")]
    pub stage_logs: HashMap<String, StageLog>,
}
