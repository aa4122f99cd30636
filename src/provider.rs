//! The Ory Network provider.
//!
//! Dispatches the framework operations to the project resource and data
//! source handlers. The remote client is created and signed in by
//! [`ProviderService::configure`], or injected with
//! [`OryNetworkProvider::with_client`].

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::{OryNetworkClient, ProjectApi};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::ProjectModel;
use crate::resources::schema::{
    project_data_source_schema, project_resource_schema, provider_config_schema,
};
use crate::resources::{ProjectDataSource, ProjectResource, PROJECT_TYPE};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::{has_errors, ProviderService};
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

/// Provider type name.
pub const PROVIDER_TYPE: &str = "orynetwork";

/// Manages Ory Network projects.
#[derive(Default)]
pub struct OryNetworkProvider {
    client: RwLock<Option<Arc<dyn ProjectApi>>>,
}

impl OryNetworkProvider {
    /// A provider that still has to be configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that uses `client` and needs no configuration.
    pub fn with_client(client: Arc<dyn ProjectApi>) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    async fn client(&self) -> Result<Arc<dyn ProjectApi>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider has not been configured with Ory Network credentials".to_string(),
            )
        })
    }

    async fn project(&self, resource_type: &str) -> Result<ProjectResource, ProviderError> {
        check_type(resource_type)?;
        Ok(ProjectResource::new(self.client().await?))
    }
}

fn check_type(resource_type: &str) -> Result<(), ProviderError> {
    if resource_type == PROJECT_TYPE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }
}

/// Checks that need more than the schema.
fn validate_oauth2(config: &Value) -> Vec<Diagnostic> {
    let Ok(model) = ProjectModel::from_state(config) else {
        return vec![];
    };
    let Some(services) = model.services.as_known() else {
        return vec![];
    };
    match services.to_remote() {
        Ok(_) => vec![],
        Err(err) => vec![Diagnostic::error("Invalid OAuth2 Configuration")
            .with_detail(err.to_string())
            .with_attribute("services.oauth2.config")],
    }
}

#[async_trait::async_trait]
impl ProviderService for OryNetworkProvider {
    fn type_name(&self) -> &str {
        PROVIDER_TYPE
    }

    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(provider_config_schema())
            .with_resource(PROJECT_TYPE, project_resource_schema())
            .with_data_source(PROJECT_TYPE, project_data_source_schema())
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&provider_config_schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = match ProviderConfig::resolve(&config) {
            Ok(resolved) => resolved,
            Err(diagnostics) => return Ok(diagnostics),
        };
        debug!(config = ?resolved, "Resolved provider configuration");

        let client = OryNetworkClient::from_config(&resolved)?;
        client.sign_in(&resolved.email, &resolved.password).await?;

        *self.client.write().await = Some(Arc::new(client));
        info!(api_url = %resolved.api_url, "Provider configured");
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_type(resource_type)?;
        let diagnostics = validate(&project_resource_schema(), &config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }
        Ok(validate_oauth2(&config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        check_type(resource_type)?;
        Ok(ProjectResource::plan(prior_state.as_ref(), proposed_state))
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.project(resource_type).await?;
        let planned = ProjectModel::from_state(&planned_state)?;
        resource.create(&planned).await?.to_state()
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.project(resource_type).await?;
        let current = ProjectModel::from_state(&current_state)?;
        resource.read(&current).await?.to_state()
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.project(resource_type).await?;
        let prior = ProjectModel::from_state(&prior_state)?;
        let planned = ProjectModel::from_state(&planned_state)?;
        resource.update(&prior, &planned).await?.to_state()
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.project(resource_type).await?;
        let current = ProjectModel::from_state(&current_state)?;
        resource.delete(&current).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.project(resource_type).await?;
        let state = resource.import(id).await?.to_state()?;
        Ok(vec![ImportedResource::new(PROJECT_TYPE, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_type(data_source_type)?;
        Ok(validate(&project_data_source_schema(), &config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        check_type(data_source_type)?;
        let data_source = ProjectDataSource::new(self.client().await?);
        let config = ProjectModel::from_state(&config)?;
        data_source.read(&config).await?.to_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata() {
        let metadata = OryNetworkProvider::new().metadata();

        assert_eq!(metadata.type_name, "orynetwork");
        assert_eq!(metadata.resources, vec!["orynetwork_project"]);
        assert_eq!(metadata.data_sources, vec!["orynetwork_project"]);
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let provider = OryNetworkProvider::new();

        let err = provider
            .read(PROJECT_TYPE, json!({"id": "p1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = OryNetworkProvider::new();

        let err = provider
            .plan("orynetwork_workspace", None, json!({}), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(name) if name == "orynetwork_workspace"));
    }

    #[tokio::test]
    async fn test_configure_reports_missing_credentials() {
        let provider = OryNetworkProvider::new();

        let diagnostics = provider
            .configure(json!({"email": "not-an-email", "password": ""}))
            .await
            .unwrap();
        assert!(has_errors(&diagnostics));
        assert!(diagnostics
            .iter()
            .any(|d| d.attribute.as_deref() == Some("email")));
    }

    #[tokio::test]
    async fn test_validate_oauth2_config() {
        let provider = OryNetworkProvider::new();

        let diagnostics = provider
            .validate_resource_config(
                PROJECT_TYPE,
                json!({"name": "Test", "services": {"oauth2": {"config": "[]"}}}),
            )
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("services.oauth2.config")
        );

        let diagnostics = provider
            .validate_resource_config(
                PROJECT_TYPE,
                json!({"name": "Test", "services": {"oauth2": {"config": "{\"ttl\": {}}"}}}),
            )
            .await
            .unwrap();
        assert!(diagnostics.is_empty());
    }
}
