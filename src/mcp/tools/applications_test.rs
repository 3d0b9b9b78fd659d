//! Tests for application MCP tools

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorCode, RawContent};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::mcp::tools::{ApplicationTools, ListApplicationsParams};
use crate::pipecd::{
    Application, ApplicationDeploymentReference, ApplicationSyncState, ClientError,
    ListApplicationsResponse, MockPipecdClient, SyncStatus,
};

fn text_json(result: &CallToolResult) -> Value {
    let text = match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    };
    serde_json::from_str(text).unwrap()
}

fn app(id: &str) -> Application {
    Application {
        id: id.to_string(),
        name: format!("{id}-name"),
        ..Default::default()
    }
}

/// Backend that serves `apps` two per page, using the next index as cursor.
fn paging_backend(apps: Vec<Application>) -> MockPipecdClient {
    let mut mock = MockPipecdClient::new();
    mock.expect_list_applications().returning(move |req| {
        let start: usize = if req.cursor.is_empty() {
            0
        } else {
            req.cursor.parse().unwrap()
        };
        let end = (start + 2).min(apps.len());
        let cursor = if end < apps.len() {
            end.to_string()
        } else {
            String::new()
        };
        Ok(ListApplicationsResponse {
            applications: apps[start..end].to_vec(),
            cursor,
        })
    });
    mock
}

#[tokio::test]
async fn test_list_applications_projects_each_application() {
    let mut mock = MockPipecdClient::new();
    mock.expect_list_applications()
        .withf(|req| req.cursor.is_empty())
        .times(1)
        .returning(|_| {
            Ok(ListApplicationsResponse {
                applications: vec![Application {
                    id: "app-1".to_string(),
                    name: "web".to_string(),
                    piped_id: "piped-1".to_string(),
                    project_id: "proj".to_string(),
                    deploy_targets: vec!["cluster-a".to_string()],
                    labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
                    most_recently_successful_deployment: Some(ApplicationDeploymentReference {
                        deployment_id: "dep-9".to_string(),
                        ..Default::default()
                    }),
                    sync_state: Some(ApplicationSyncState {
                        status: SyncStatus::OutOfSync,
                        short_reason: "drift".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                cursor: "next-page".to_string(),
            })
        });
    let tools = ApplicationTools::new(Arc::new(mock));

    let result = tools
        .list_applications(
            Parameters(ListApplicationsParams::default()),
            &CancellationToken::new(),
        )
        .await
        .expect("list_applications should succeed");

    let json = text_json(&result);
    assert_eq!(json["nextCursor"], "next-page");
    let first = &json["applications"][0];
    assert_eq!(first["id"], "app-1");
    assert_eq!(first["pipedId"], "piped-1");
    assert_eq!(first["deployTargets"][0], "cluster-a");
    assert_eq!(first["labels"]["env"], "prod");
    assert_eq!(first["lastSuccessfulDeploymentID"], "dep-9");
    assert_eq!(first["syncState"]["status"], "OUT_OF_SYNC");
    assert_eq!(first["syncState"]["shortReason"], "drift");
}

#[tokio::test]
async fn test_list_applications_forwards_cursor() {
    let mut mock = MockPipecdClient::new();
    mock.expect_list_applications()
        .withf(|req| req.cursor == "abc")
        .times(1)
        .returning(|_| Ok(ListApplicationsResponse::default()));
    let tools = ApplicationTools::new(Arc::new(mock));

    let result = tools
        .list_applications(
            Parameters(ListApplicationsParams {
                cursor: Some("abc".to_string()),
            }),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let json = text_json(&result);
    assert_eq!(json["applications"].as_array().unwrap().len(), 0);
    assert_eq!(json["nextCursor"], "");
}

#[tokio::test]
async fn test_list_applications_pagination_round_trip() {
    let apps: Vec<Application> = (1..=5).map(|i| app(&format!("app-{i}"))).collect();
    let tools = ApplicationTools::new(Arc::new(paging_backend(apps)));
    let ct = CancellationToken::new();

    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    loop {
        pages += 1;
        assert!(pages <= 10, "pagination did not terminate");

        let result = tools
            .list_applications(Parameters(ListApplicationsParams { cursor }), &ct)
            .await
            .unwrap();
        let json = text_json(&result);
        for app in json["applications"].as_array().unwrap() {
            let id = app["id"].as_str().unwrap().to_string();
            assert!(seen.insert(id), "duplicate application across pages");
        }

        let next = json["nextCursor"].as_str().unwrap().to_string();
        if next.is_empty() {
            break;
        }
        cursor = Some(next);
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_list_applications_propagates_backend_error() {
    let mut mock = MockPipecdClient::new();
    mock.expect_list_applications().times(1).returning(|_| {
        Err(ClientError::Status {
            status: 401,
            code: "unauthenticated".to_string(),
            message: "invalid api key".to_string(),
        })
    });
    let tools = ApplicationTools::new(Arc::new(mock));

    let err = tools
        .list_applications(
            Parameters(ListApplicationsParams::default()),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("invalid api key"));
    assert_eq!(err.data.unwrap()["code"], "unauthenticated");
}

#[tokio::test]
async fn test_list_applications_cancelled() {
    let mut mock = MockPipecdClient::new();
    mock.expect_list_applications()
        .returning(|_| Ok(ListApplicationsResponse::default()));
    let tools = ApplicationTools::new(Arc::new(mock));
    let ct = CancellationToken::new();
    ct.cancel();

    let err = tools
        .list_applications(Parameters(ListApplicationsParams::default()), &ct)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(err.data.unwrap()["code"], "canceled");
}
