//! Tests for the HTTP PipeCD client against a local stand-in API service.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::{Value, json};

use crate::config::Config;
use crate::pipecd::http::{API_SERVICE, HttpPipecdClient, base_url};
use crate::pipecd::{
    ClientError, DeploymentStatus, GetDeploymentRequest, ListDeploymentsRequest, PipecdClient,
};

/// Serve `router` on an ephemeral port and return its address.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

fn client_for(addr: &str) -> HttpPipecdClient {
    let config = Config {
        insecure: true,
        ..Config::new(addr, "test-key")
    };
    HttpPipecdClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_get_deployment_sends_api_key_and_decodes() {
    let router = Router::new().route(
        &format!("/{API_SERVICE}/GetDeployment"),
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "API-KEY test-key");
            assert_eq!(body["deploymentId"], "dep-1");
            Json(json!({
                "deployment": {
                    "id": "dep-1",
                    "applicationId": "app-1",
                    "status": "DEPLOYMENT_RUNNING",
                    "createdAt": "1700000000",
                    "versions": [
                        {"kind": "CONTAINER_IMAGE", "name": "app", "version": "v1", "url": "registry/app:v1"}
                    ],
                    "trigger": {"commander": "alice"}
                }
            }))
        }),
    );
    let addr = spawn(router).await;

    let response = client_for(&addr)
        .get_deployment(GetDeploymentRequest {
            deployment_id: "dep-1".to_string(),
        })
        .await
        .unwrap();

    let deployment = response.deployment;
    assert_eq!(deployment.id, "dep-1");
    assert_eq!(deployment.status, DeploymentStatus::Running);
    assert_eq!(deployment.created_at, 1_700_000_000);
    assert_eq!(deployment.versions.len(), 1);
    assert_eq!(deployment.extra["trigger"]["commander"], "alice");
}

#[tokio::test]
async fn test_list_deployments_sends_filters() {
    let router = Router::new().route(
        &format!("/{API_SERVICE}/ListDeployments"),
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["applicationIds"], json!(["app-1"]));
            assert_eq!(body["labels"], json!({"env": "prod"}));
            assert_eq!(body["cursor"], "page-2");
            Json(json!({"deployments": [{"id": "dep-9"}], "cursor": ""}))
        }),
    );
    let addr = spawn(router).await;

    let request = ListDeploymentsRequest {
        application_ids: vec!["app-1".to_string()],
        labels: [("env".to_string(), "prod".to_string())].into(),
        cursor: "page-2".to_string(),
    };
    let response = client_for(&addr).list_deployments(request).await.unwrap();

    assert_eq!(response.deployments.len(), 1);
    assert_eq!(response.deployments[0].id, "dep-9");
    assert!(response.cursor.is_empty());
}

#[tokio::test]
async fn test_error_body_becomes_status_error() {
    let router = Router::new().route(
        &format!("/{API_SERVICE}/GetDeployment"),
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"code": "not_found", "message": "deployment dep-x not found"})),
            )
        }),
    );
    let addr = spawn(router).await;

    let err = client_for(&addr)
        .get_deployment(GetDeploymentRequest {
            deployment_id: "dep-x".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Status {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, "not_found");
            assert_eq!(message, "deployment dep-x not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_uses_http_reason() {
    let router = Router::new().route(
        &format!("/{API_SERVICE}/GetDeployment"),
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let addr = spawn(router).await;

    let err = client_for(&addr)
        .get_deployment(GetDeploymentRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("internal_server_error"));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = client_for(&addr)
        .get_deployment(GetDeploymentRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport { .. }));
}

#[test]
fn test_base_url_scheme_follows_insecure_flag() {
    assert_eq!(
        base_url("pipecd.example.com:443", false).unwrap().as_str(),
        "https://pipecd.example.com:443/"
    );
    assert_eq!(
        base_url("localhost:8080", true).unwrap().as_str(),
        "http://localhost:8080/"
    );
}

#[test]
fn test_base_url_keeps_explicit_scheme_and_path() {
    let url = base_url("https://ci.example.com/pipecd", true).unwrap();
    assert_eq!(url.as_str(), "https://ci.example.com/pipecd/");
}

#[test]
fn test_base_url_rejects_empty_host() {
    assert!(matches!(
        base_url("  ", false),
        Err(ClientError::InvalidAddress { .. })
    ));
}

#[test]
fn test_method_url() {
    let client = client_for("localhost:9080");
    let url = client.method_url("ListStageLogs").unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:9080/grpc.service.apiservice.APIService/ListStageLogs"
    );
}
