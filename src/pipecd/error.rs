//! Backend client error types.
//!
//! Every failure of a single PipeCD API call maps to one of these variants.
//! They are transport-agnostic from the caller's point of view: handlers
//! only decide whether to surface or hide the detail.

use miette::Diagnostic;
use thiserror::Error;

/// Errors returned by a [`PipecdClient`](super::PipecdClient) call.
#[derive(Error, Diagnostic, Debug)]
pub enum ClientError {
    #[error("Failed to reach PipeCD API: {source}")]
    #[diagnostic(
        code(pipecd_mcp::client::transport),
        help("Check PIPECD_HOST and PIPECD_INSECURE, and that the control plane is reachable.")
    )]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("PipeCD API error ({status}, {code}): {message}")]
    #[diagnostic(code(pipecd_mcp::client::status))]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid response from PipeCD API: {message}")]
    #[diagnostic(code(pipecd_mcp::client::decode))]
    Decode { message: String },

    #[error("Invalid PipeCD address '{address}': {message}")]
    #[diagnostic(code(pipecd_mcp::client::invalid_address))]
    InvalidAddress { address: String, message: String },

    #[error("Request cancelled")]
    #[diagnostic(code(pipecd_mcp::client::cancelled))]
    Cancelled,
}

impl ClientError {
    /// Backend error code, when the server supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Status { code, .. } => Some(code.as_str()),
            ClientError::Cancelled => Some("canceled"),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode {
                message: e.to_string(),
            }
        } else {
            ClientError::Transport { source: e }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode {
            message: e.to_string(),
        }
    }
}

/// Result type for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;
