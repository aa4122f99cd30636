//! Error types for the Ory Network provider.

use thiserror::Error;

use crate::api::ApiError;
use crate::models::DecodeError;
use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A local validation error; no remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is not configured or its configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The remote API rejected a request or could not be reached.
    #[error("Client error: {0}")]
    Client(#[source] ApiError),

    /// The remote API returned a payload with an unexpected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] DecodeError),

    /// Framework state could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The project was created but configuring it failed.
    ///
    /// `state` holds the project as it exists remotely so it can be
    /// persisted; a subsequent apply finishes the configuration.
    #[error("Project {id} was created but could not be configured, re-apply to finish: {source}")]
    PartiallyCreated {
        /// The server-assigned project id.
        id: String,
        /// State describing the created project.
        state: Box<serde_json::Value>,
        /// The error that interrupted configuration.
        #[source]
        source: Box<ProviderError>,
    },
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode { source, .. } => Self::Deserialization(source),
            other => Self::Client(other),
        }
    }
}

impl ProviderError {
    /// Short, user-facing summary for diagnostics.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Configuration(_) => "Configuration Error",
            Self::UnknownResource(_) => "Unknown Resource Type",
            Self::Client(_) => "Client Error",
            Self::Deserialization(_) => "Deserialization Error",
            Self::Serialization(_) => "Serialization Error",
            Self::PartiallyCreated { .. } => "Update Error",
        }
    }

    /// Convert the error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.to_string())
    }

    /// State that should still be persisted even though the operation failed.
    pub fn persisted_state(&self) -> Option<&serde_json::Value> {
        match self {
            Self::PartiallyCreated { state, .. } => Some(state),
            _ => None,
        }
    }
}
