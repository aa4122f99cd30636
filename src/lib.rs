//! Ory Network Provider
//!
//! An infrastructure-as-code provider that manages Ory Network projects:
//! the project itself, the CORS settings of its admin and public APIs, and
//! the configuration of its permission, identity and OAuth2 services.
//!
//! # Overview
//!
//! - **[`ProviderService`]**: the operations the orchestrating framework
//!   drives, implemented by [`OryNetworkProvider`]
//! - **[`ProviderServer`]**: logs every operation and turns errors into
//!   diagnostics
//! - **Schema types**: the declarative attributes of the provider block, the
//!   `orynetwork_project` resource and the `orynetwork_project` data source
//! - **Models**: typed project state and its mapping to and from the
//!   Ory Network API
//! - **API client**: signs in with email and password and calls the
//!   project API
//!
//! # Quick Start
//!
//! ```ignore
//! use orynetwork_provider::{OryNetworkProvider, ProviderServer};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     orynetwork_provider::init_logging();
//!
//!     let server = ProviderServer::new(OryNetworkProvider::new());
//!     let diagnostics = server
//!         .configure(json!({"email": "ops@example.org", "password": "secret"}))
//!         .await;
//!     assert!(diagnostics.is_empty());
//!
//!     let plan = server
//!         .plan("orynetwork_project", None, json!({"name": "Staging"}), json!({"name": "Staging"}))
//!         .await;
//!     let created = server
//!         .create("orynetwork_project", plan.planned_state.unwrap_or_default())
//!         .await;
//!     println!("{:?}", created.state);
//! }
//! ```
//!
//! # Create
//!
//! The project API creates a project with a name and a workspace only, and
//! its set-project call replaces the whole configuration. Creating a
//! project therefore takes two phases: create it, read back the server's
//! defaults, merge the configured attributes over them and set the result.
//! When the second phase fails the project already exists; the error
//! carries its state so it can be recorded, and applying again finishes
//! the configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use api::{ApiError, OryNetworkClient, ProjectApi};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::OryNetworkProvider;
pub use schema::ProviderSchema;
pub use service::{ProviderServer, ProviderService};
pub use types::{
    AttrValue, AttributeChange, ImportedResource, PlanResult, ProviderMetadata, UNKNOWN_VALUE,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
