//! Tests for resource URI routing

use rmcp::{ErrorData as McpError, model::ErrorCode};

use crate::mcp::router::*;

#[test]
fn test_route_application() {
    let resource = route("pipecd://applications/app-1").unwrap();
    assert_eq!(
        resource,
        Resource::Application {
            application_id: "app-1".to_string()
        }
    );
    assert_eq!(resource.kind(), ResourceKind::Application);
}

#[test]
fn test_route_deployment() {
    let resource = route("pipecd://deployments/dep-1").unwrap();
    assert_eq!(
        resource,
        Resource::Deployment {
            deployment_id: "dep-1".to_string()
        }
    );
}

#[test]
fn test_route_prefers_most_specific_template() {
    let resource = route("pipecd://deployments/dep-1/logs/stage-2").unwrap();
    assert_eq!(
        resource,
        Resource::DeploymentStageLogs {
            deployment_id: "dep-1".to_string(),
            stage_id: "stage-2".to_string(),
        }
    );
}

#[test]
fn test_empty_final_segment_routes_with_empty_id() {
    assert_eq!(
        route("pipecd://applications/").unwrap(),
        Resource::Application {
            application_id: String::new()
        }
    );
    assert_eq!(
        route("pipecd://deployments").unwrap(),
        Resource::Deployment {
            deployment_id: String::new()
        }
    );
    assert_eq!(
        route("pipecd://deployments/dep-1/logs/").unwrap(),
        Resource::DeploymentStageLogs {
            deployment_id: "dep-1".to_string(),
            stage_id: String::new(),
        }
    );
}

#[test]
fn test_unsupported_scheme() {
    let err = route("https://applications/app-1").unwrap_err();
    assert!(matches!(err, RouteError::UnsupportedScheme { .. }));
    assert_eq!(err.to_string(), "unsupported URI scheme");
}

#[test]
fn test_unparseable_uri() {
    let err = route("not a uri").unwrap_err();
    assert!(matches!(err, RouteError::Parse { .. }));
    assert_eq!(err.to_string(), "failed to parse URI");
}

#[test]
fn test_unsupported_resource() {
    for uri in [
        "pipecd://pipeds/piped-1",
        "pipecd://deployments/dep-1/stages/stage-1",
        "pipecd://deployments/dep-1/",
        "pipecd://applications/app-1/extra",
        "pipecd:applications/app-1",
    ] {
        let err = route(uri).unwrap_err();
        assert!(
            matches!(err, RouteError::UnsupportedResource { .. }),
            "{uri} should be unsupported, got {err:?}"
        );
        assert_eq!(err.to_string(), "unsupported resource type");
    }
}

#[test]
fn test_route_error_is_invalid_params() {
    let err: McpError = route("file:///etc/passwd").unwrap_err().into();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(err.message, "unsupported URI scheme");
}

#[test]
fn test_canonical_uri_round_trips() {
    for uri in [
        "pipecd://applications/app-1",
        "pipecd://deployments/dep-1",
        "pipecd://deployments/dep-1/logs/stage-1",
    ] {
        assert_eq!(route(uri).unwrap().uri(), uri);
    }
}

#[test]
fn test_every_template_routes_to_its_kind() {
    for template in TEMPLATES {
        let concrete = template
            .uri_template
            .replace("{applicationId}", "a")
            .replace("{deploymentId}", "d")
            .replace("{stageId}", "s");
        assert_eq!(route(&concrete).unwrap().kind(), template.kind);
    }
}
