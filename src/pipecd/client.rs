//! PipeCD API service abstraction.
//!
//! Handlers depend on the [`PipecdClient`] trait only, so the HTTP client
//! can be swapped for a mock in tests.

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
use mockall::automock;

use super::error::{ClientError, ClientResult};
use super::models::{
    GetApplicationRequest, GetApplicationResponse, GetDeploymentRequest, GetDeploymentResponse,
    ListApplicationsRequest, ListApplicationsResponse, ListDeploymentsRequest,
    ListDeploymentsResponse, ListStageLogsRequest, ListStageLogsResponse,
};

/// The subset of PipeCD's `APIService` this server consumes.
///
/// Implementations are shared across concurrent requests and must be safe
/// to call from many tasks at once.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PipecdClient: Send + Sync {
    /// List one page of applications.
    async fn list_applications(
        &self,
        request: ListApplicationsRequest,
    ) -> ClientResult<ListApplicationsResponse>;

    /// Get an application by ID.
    async fn get_application(
        &self,
        request: GetApplicationRequest,
    ) -> ClientResult<GetApplicationResponse>;

    /// List one page of deployments.
    async fn list_deployments(
        &self,
        request: ListDeploymentsRequest,
    ) -> ClientResult<ListDeploymentsResponse>;

    /// Get a deployment by ID.
    async fn get_deployment(
        &self,
        request: GetDeploymentRequest,
    ) -> ClientResult<GetDeploymentResponse>;

    /// Get the logs of every stage of a deployment.
    async fn list_stage_logs(
        &self,
        request: ListStageLogsRequest,
    ) -> ClientResult<ListStageLogsResponse>;
}

/// Run a backend call until it finishes or `ct` is cancelled.
///
/// On cancellation the in-flight call is dropped and
/// [`ClientError::Cancelled`] is returned.
pub async fn cancellable<T, F>(ct: &CancellationToken, call: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    tokio::select! {
        biased;
        _ = ct.cancelled() => Err(ClientError::Cancelled),
        result = call => result,
    }
}
