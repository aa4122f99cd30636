//! The `orynetwork_project` data source.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::ProjectApi;
use crate::error::ProviderError;
use crate::models::ProjectModel;

/// Reads a project that is managed elsewhere.
pub struct ProjectDataSource {
    client: Arc<dyn ProjectApi>,
}

impl ProjectDataSource {
    /// Data source using `client` for remote calls.
    pub fn new(client: Arc<dyn ProjectApi>) -> Self {
        Self { client }
    }

    /// Fetch the project named by `config.id`.
    #[instrument(skip(self, config), name = "project.read_data_source")]
    pub async fn read(&self, config: &ProjectModel) -> Result<ProjectModel, ProviderError> {
        let id = config.require_id()?;
        let project = self.client.get_project(id).await?;
        debug!(project_id = %id, slug = %project.slug, "Project fetched");
        Ok(ProjectModel::from_remote(&project)?)
    }
}
