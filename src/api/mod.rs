//! Remote project API.
//!
//! [`ProjectApi`] is the seam the resource handlers talk to. The production
//! implementation is [`OryNetworkClient`]; tests substitute an in-memory
//! fake.

mod client;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::DecodeError;

pub use client::OryNetworkClient;
pub use models::{
    ApiProject, ApiProjectCors, ApiProjectServices, ApiServiceConfig, CreateProjectBody,
    SetProject, SetProjectResponse,
};

/// Errors returned by the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    ///
    /// The response body is appended on its own line.
    #[error("{method} {url} failed with status {status}\n{body}")]
    Status {
        /// HTTP method of the request.
        method: String,
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request could not be sent or the response not read.
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP method of the request.
        method: String,
        /// Requested URL.
        url: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("{method} {url} returned an invalid body: {source}\n{body}")]
    InvalidBody {
        /// HTTP method of the request.
        method: String,
        /// Requested URL.
        url: String,
        /// Raw response body.
        body: String,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but did not have the shape of the expected payload.
    #[error("{method} {url} returned an unexpected payload: {source}")]
    Decode {
        /// HTTP method of the request.
        method: String,
        /// Requested URL.
        url: String,
        /// The offending key path.
        #[source]
        source: DecodeError,
    },

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// No session is available and no credentials are stored.
    #[error("not signed in to Ory Network")]
    NotSignedIn,
}

impl ApiError {
    /// The HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Project operations consumed by the provider.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// Create a project with its name and optional workspace.
    async fn create_project(&self, body: &CreateProjectBody) -> Result<ApiProject, ApiError>;

    /// Fetch a project by id.
    async fn get_project(&self, id: &str) -> Result<ApiProject, ApiError>;

    /// Replace the configuration of a project.
    async fn set_project(&self, id: &str, body: &SetProject)
        -> Result<SetProjectResponse, ApiError>;

    /// Delete a project permanently.
    async fn purge_project(&self, id: &str) -> Result<(), ApiError>;
}
