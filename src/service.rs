//! The provider service trait and the request boundary that serves it.
//!
//! [`ProviderService`] is what a provider implements, with plain Rust
//! types and `Result`s. [`ProviderServer`] sits between the orchestrating
//! framework and a provider: every operation is logged, and every error is
//! turned into diagnostics the framework can show. Failed creates that
//! still produced remote objects keep their state in the response so the
//! framework can record it.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};

/// Trait that provider implementations must implement.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// The provider type name, used as prefix of its resource types.
    fn type_name(&self) -> &str;

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            type_name: self.type_name().to_string(),
            resources,
            data_sources,
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Upgrade resource state from an older schema version.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let _ = (resource_type, version);
        Ok(state)
    }

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let _ = id;
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let _ = config;
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// Result of an operation that produces state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateResponse {
    /// The state to record, if any.
    pub state: Option<Value>,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanResponse {
    /// The planned state, absent when planning failed.
    pub planned_state: Option<Value>,
    /// Top-level attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource has to be replaced.
    pub requires_replace: bool,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of an import.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportResponse {
    /// The imported resources.
    pub imported: Vec<ImportedResource>,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Returns true if any diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| d.severity == DiagnosticSeverity::Error)
}

/// Serves a [`ProviderService`] to the orchestrating framework.
pub struct ProviderServer<P: ProviderService> {
    provider: Arc<P>,
}

impl<P: ProviderService> Clone for ProviderServer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ProviderService> ProviderServer<P> {
    /// Serve `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The served provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn error_to_diagnostics(&self, err: &ProviderError) -> Vec<Diagnostic> {
        vec![err.to_diagnostic()]
    }

    /// Names of the resources and data sources.
    #[instrument(skip(self), name = "provider.get_metadata")]
    pub fn get_metadata(&self) -> ProviderMetadata {
        debug!("GetMetadata called");
        let metadata = self.provider.metadata();
        info!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        metadata
    }

    /// The full provider schema.
    #[instrument(skip(self), name = "provider.get_schema")]
    pub fn get_schema(&self) -> ProviderSchema {
        debug!("GetSchema called");
        let schema = self.provider.schema();
        info!(
            resources = schema.resources.len(),
            data_sources = schema.data_sources.len(),
            "GetSchema completed"
        );
        schema
    }

    /// Validate the provider block.
    #[instrument(skip(self, config), name = "provider.validate_provider_config")]
    pub async fn validate_provider_config(&self, config: Value) -> Vec<Diagnostic> {
        debug!("ValidateProviderConfig called");
        match self.provider.validate_provider_config(config).await {
            Ok(diagnostics) => {
                if has_errors(&diagnostics) {
                    warn!(
                        diagnostics = diagnostics.len(),
                        "ValidateProviderConfig completed with errors"
                    );
                } else {
                    info!("ValidateProviderConfig completed successfully");
                }
                diagnostics
            }
            Err(e) => {
                error!(error = %e, "ValidateProviderConfig failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Configure the provider.
    #[instrument(skip(self, config), name = "provider.configure")]
    pub async fn configure(&self, config: Value) -> Vec<Diagnostic> {
        debug!("Configure called");
        match self.provider.configure(config).await {
            Ok(diagnostics) => {
                if has_errors(&diagnostics) {
                    warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
                } else {
                    info!("Configure completed successfully");
                }
                diagnostics
            }
            Err(e) => {
                error!(error = %e, "Configure failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Stop the provider.
    #[instrument(skip(self), name = "provider.stop")]
    pub async fn stop(&self) -> Vec<Diagnostic> {
        info!("Stop called");
        match self.provider.stop().await {
            Ok(()) => {
                info!("Stop completed successfully");
                vec![]
            }
            Err(e) => {
                error!(error = %e, "Stop failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Validate a resource configuration.
    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    pub async fn validate_resource_config(&self, resource_type: &str, config: Value) -> Vec<Diagnostic> {
        debug!(resource_type = %resource_type, "ValidateResourceConfig called");
        match self.provider.validate_resource_config(resource_type, config).await {
            Ok(diagnostics) => {
                if has_errors(&diagnostics) {
                    warn!(resource_type = %resource_type, diagnostics = diagnostics.len(), "ValidateResourceConfig completed with errors");
                } else {
                    info!(resource_type = %resource_type, "ValidateResourceConfig completed successfully");
                }
                diagnostics
            }
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "ValidateResourceConfig failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Upgrade state written by an older schema version.
    #[instrument(skip(self, state), name = "provider.upgrade_resource_state")]
    pub async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> StateResponse {
        debug!(resource_type = %resource_type, version = version, "UpgradeResourceState called");
        match self
            .provider
            .upgrade_resource_state(resource_type, version, state)
            .await
        {
            Ok(state) => {
                info!(resource_type = %resource_type, from_version = version, "UpgradeResourceState completed");
                StateResponse {
                    state: Some(state),
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %resource_type, version = version, error = %e, "UpgradeResourceState failed");
                StateResponse {
                    state: None,
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }

    /// Plan a create, update or delete.
    #[instrument(skip(self, prior_state, proposed_state, config), name = "provider.plan")]
    pub async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> PlanResponse {
        let is_create = prior_state.as_ref().map_or(true, Value::is_null);
        debug!(resource_type = %resource_type, is_create = is_create, "Plan called");

        match self
            .provider
            .plan(resource_type, prior_state, proposed_state, config)
            .await
        {
            Ok(result) => {
                info!(
                    resource_type = %resource_type,
                    changes = result.changes.len(),
                    requires_replace = result.requires_replace,
                    "Plan completed"
                );
                PlanResponse {
                    planned_state: Some(result.planned_state),
                    changes: result.changes,
                    requires_replace: result.requires_replace,
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Plan failed");
                PlanResponse {
                    diagnostics: self.error_to_diagnostics(&e),
                    ..Default::default()
                }
            }
        }
    }

    /// Create a resource; a partially created resource still returns state.
    #[instrument(skip(self, planned_state), name = "provider.create")]
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> StateResponse {
        info!(resource_type = %resource_type, "Create called");
        match self.provider.create(resource_type, planned_state).await {
            Ok(state) => {
                info!(resource_type = %resource_type, "Create completed successfully");
                StateResponse {
                    state: Some(state),
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                let state = e.persisted_state().cloned();
                if state.is_some() {
                    warn!(resource_type = %resource_type, error = %e, "Create partially completed");
                } else {
                    error!(resource_type = %resource_type, error = %e, "Create failed");
                }
                StateResponse {
                    state,
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }

    /// Refresh a resource.
    #[instrument(skip(self, current_state), name = "provider.read")]
    pub async fn read(&self, resource_type: &str, current_state: Value) -> StateResponse {
        debug!(resource_type = %resource_type, "Read called");
        match self.provider.read(resource_type, current_state).await {
            Ok(state) => {
                debug!(resource_type = %resource_type, "Read completed successfully");
                StateResponse {
                    state: Some(state),
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Read failed");
                StateResponse {
                    state: None,
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }

    /// Update a resource.
    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> StateResponse {
        info!(resource_type = %resource_type, "Update called");
        match self
            .provider
            .update(resource_type, prior_state, planned_state)
            .await
        {
            Ok(state) => {
                info!(resource_type = %resource_type, "Update completed successfully");
                StateResponse {
                    state: Some(state),
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Update failed");
                StateResponse {
                    state: None,
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }

    /// Delete a resource.
    #[instrument(skip(self, current_state), name = "provider.delete")]
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Vec<Diagnostic> {
        info!(resource_type = %resource_type, "Delete called");
        match self.provider.delete(resource_type, current_state).await {
            Ok(()) => {
                info!(resource_type = %resource_type, "Delete completed successfully");
                vec![]
            }
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Delete failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Import an existing resource by id.
    #[instrument(skip(self), name = "provider.import_resource_state")]
    pub async fn import_resource_state(&self, resource_type: &str, id: &str) -> ImportResponse {
        info!(resource_type = %resource_type, id = %id, "ImportResourceState called");
        match self.provider.import_resource(resource_type, id).await {
            Ok(imported) => {
                info!(
                    resource_type = %resource_type,
                    id = %id,
                    imported_count = imported.len(),
                    "ImportResourceState completed"
                );
                ImportResponse {
                    imported,
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %resource_type, id = %id, error = %e, "ImportResourceState failed");
                ImportResponse {
                    imported: vec![],
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }

    /// Validate a data source configuration.
    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Vec<Diagnostic> {
        debug!(data_source_type = %data_source_type, "ValidateDataSourceConfig called");
        match self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await
        {
            Ok(diagnostics) => {
                if has_errors(&diagnostics) {
                    warn!(data_source_type = %data_source_type, diagnostics = diagnostics.len(), "ValidateDataSourceConfig completed with errors");
                } else {
                    info!(data_source_type = %data_source_type, "ValidateDataSourceConfig completed successfully");
                }
                diagnostics
            }
            Err(e) => {
                error!(data_source_type = %data_source_type, error = %e, "ValidateDataSourceConfig failed");
                self.error_to_diagnostics(&e)
            }
        }
    }

    /// Read a data source.
    #[instrument(skip(self, config), name = "provider.read_data_source")]
    pub async fn read_data_source(&self, data_source_type: &str, config: Value) -> StateResponse {
        debug!(data_source_type = %data_source_type, "ReadDataSource called");
        match self.provider.read_data_source(data_source_type, config).await {
            Ok(state) => {
                info!(data_source_type = %data_source_type, "ReadDataSource completed successfully");
                StateResponse {
                    state: Some(state),
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(data_source_type = %data_source_type, error = %e, "ReadDataSource failed");
                StateResponse {
                    state: None,
                    diagnostics: self.error_to_diagnostics(&e),
                }
            }
        }
    }
}
