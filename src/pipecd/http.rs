//! HTTP implementation of [`PipecdClient`].
//!
//! Each API method is a unary `POST {base}/grpc.service.apiservice.APIService/{Method}`
//! with a protojson request body. Authentication uses PipeCD's API key
//! credentials header (`authorization: API-KEY <key>`). See
//! [`HttpPipecdClient`] for what the server side must accept.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::client::PipecdClient;
use super::error::{ClientError, ClientResult};
use super::models::{
    GetApplicationRequest, GetApplicationResponse, GetDeploymentRequest, GetDeploymentResponse,
    ListApplicationsRequest, ListApplicationsResponse, ListDeploymentsRequest,
    ListDeploymentsResponse, ListStageLogsRequest, ListStageLogsResponse,
};
use crate::config::Config;

/// Fully qualified name of PipeCD's API service.
pub const API_SERVICE: &str = "grpc.service.apiservice.APIService";

/// Credential type prefix for API keys in the authorization header.
const API_KEY_SCHEME: &str = "API-KEY";

/// Install the process-wide rustls crypto provider. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Error body returned by the API service on non-success responses.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ErrorBody {
    code: String,
    message: String,
}

/// PipeCD API client over HTTP.
///
/// Speaks JSON over HTTP/1.1, not gRPC. A stock control plane serves
/// `APIService` as gRPC only, so this client needs a JSON-capable gateway
/// (gRPC-Web/Connect or a transcoding proxy) in front of it. Anything else
/// can plug in through [`PipecdClient`].
#[derive(Clone)]
pub struct HttpPipecdClient {
    base_url: Url,
    api_key: String,
    client: Client,
}

impl HttpPipecdClient {
    /// Build a client from configuration.
    ///
    /// `config.host` may be `host:port` or a full URL. Without an explicit
    /// scheme, `https` is used unless `config.insecure` is set.
    pub fn new(config: &Config) -> ClientResult<Self> {
        install_crypto_provider();

        let base_url = base_url(&config.host, config.insecure)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ClientError::Transport { source })?;

        Ok(Self {
            base_url,
            api_key: config.api_key.expose().to_string(),
            client,
        })
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a single API method.
    pub fn method_url(&self, method: &str) -> ClientResult<Url> {
        self.base_url
            .join(&format!("{API_SERVICE}/{method}"))
            .map_err(|e| ClientError::InvalidAddress {
                address: self.base_url.to_string(),
                message: e.to_string(),
            })
    }

    async fn unary<Req, Resp>(&self, method: &str, request: &Req) -> ClientResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.method_url(method)?;
        debug!(%url, "calling PipeCD API");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("{API_KEY_SCHEME} {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Decode a success body, or turn an error response into
    /// [`ClientError::Status`].
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let parsed: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        let code = if parsed.code.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown")
                .to_lowercase()
                .replace(' ', "_")
        } else {
            parsed.code
        };
        let message = if parsed.message.is_empty() {
            String::from_utf8_lossy(&body).trim().to_string()
        } else {
            parsed.message
        };

        Err(ClientError::Status {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

impl std::fmt::Debug for HttpPipecdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPipecdClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PipecdClient for HttpPipecdClient {
    async fn list_applications(
        &self,
        request: ListApplicationsRequest,
    ) -> ClientResult<ListApplicationsResponse> {
        self.unary("ListApplications", &request).await
    }

    async fn get_application(
        &self,
        request: GetApplicationRequest,
    ) -> ClientResult<GetApplicationResponse> {
        self.unary("GetApplication", &request).await
    }

    async fn list_deployments(
        &self,
        request: ListDeploymentsRequest,
    ) -> ClientResult<ListDeploymentsResponse> {
        self.unary("ListDeployments", &request).await
    }

    async fn get_deployment(
        &self,
        request: GetDeploymentRequest,
    ) -> ClientResult<GetDeploymentResponse> {
        self.unary("GetDeployment", &request).await
    }

    async fn list_stage_logs(
        &self,
        request: ListStageLogsRequest,
    ) -> ClientResult<ListStageLogsResponse> {
        self.unary("ListStageLogs", &request).await
    }
}

/// Normalize the configured host into a base URL ending in `/`.
pub fn base_url(host: &str, insecure: bool) -> ClientResult<Url> {
    let invalid = |message: String| ClientError::InvalidAddress {
        address: host.to_string(),
        message,
    };

    let host = host.trim();
    if host.is_empty() {
        return Err(invalid("address is empty".to_string()));
    }

    let raw = if host.contains("://") {
        host.to_string()
    } else {
        let scheme = if insecure { "http" } else { "https" };
        format!("{scheme}://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("address has no host".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
