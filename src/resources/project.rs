//! Handlers of the `orynetwork_project` resource.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiProject, ProjectApi, SetProjectResponse};
use crate::error::ProviderError;
use crate::models::{OAuth2Service, ProjectBase, ProjectModel};
use crate::types::{AttrValue, PlanResult, UNKNOWN_VALUE};

use super::plan::plan_resource;
use super::schema::project_resource_schema;

/// Lifecycle operations of a project.
pub struct ProjectResource {
    client: Arc<dyn ProjectApi>,
}

impl ProjectResource {
    /// Handlers using `client` for remote calls.
    pub fn new(client: Arc<dyn ProjectApi>) -> Self {
        Self { client }
    }

    /// Plan a create, update or delete.
    ///
    /// Any planned change to an existing project gets a new revision.
    pub fn plan(prior: Option<&Value>, mut proposed: Value) -> PlanResult {
        normalize_oauth2(&mut proposed);
        let mut result = plan_resource(&project_resource_schema(), prior, proposed);
        let updates = prior.is_some_and(|p| !p.is_null())
            && !result.planned_state.is_null()
            && !result.requires_replace
            && !result.changes.is_empty();
        if updates {
            if let Value::Object(planned) = &mut result.planned_state {
                planned.insert("revision_id".to_string(), Value::from(UNKNOWN_VALUE));
            }
        }
        result
    }

    /// Create the project and apply the planned configuration to it.
    ///
    /// Once the project exists remotely, every failure is reported as
    /// [`ProviderError::PartiallyCreated`] carrying the project's state.
    #[instrument(skip(self, planned), name = "project.create")]
    pub async fn create(&self, planned: &ProjectModel) -> Result<ProjectModel, ProviderError> {
        let body = planned.create_body()?;
        let created = self.client.create_project(&body).await?;
        info!(project_id = %created.id, slug = %created.slug, "Project created");

        let mut latest = created;
        match self.configure_created(planned, &mut latest).await {
            Ok(model) => Ok(model),
            Err(source) => Err(ProviderError::PartiallyCreated {
                id: latest.id.clone(),
                state: Box::new(partial_state(&latest)),
                source: Box::new(source),
            }),
        }
    }

    async fn configure_created(
        &self,
        planned: &ProjectModel,
        latest: &mut ApiProject,
    ) -> Result<ProjectModel, ProviderError> {
        let id = latest.id.clone();

        *latest = self.client.get_project(&id).await?;
        let defaults = ProjectModel::from_remote(latest)?;
        debug!(project_id = %id, "Merging configuration over server defaults");

        let merged = planned.merge_with_defaults(&defaults);
        let response = self.client.set_project(&id, &merged.to_set_project()?).await?;
        *latest = response.project.clone();

        settled(response, &merged)
    }

    /// Refresh the project from the server.
    #[instrument(skip(self, current), name = "project.read")]
    pub async fn read(&self, current: &ProjectModel) -> Result<ProjectModel, ProviderError> {
        let id = current.require_id()?;
        let project = self.client.get_project(id).await?;

        let mut model = ProjectModel::from_remote(&project)?;
        model.workspace_id.fill_from(&current.workspace_id);
        Ok(model)
    }

    /// Apply `planned` over `prior` with a full replace of the configuration.
    #[instrument(skip(self, prior, planned), name = "project.update")]
    pub async fn update(
        &self,
        prior: &ProjectModel,
        planned: &ProjectModel,
    ) -> Result<ProjectModel, ProviderError> {
        let id = prior.require_id()?;

        let merged = planned.merge_with_defaults(prior);
        let response = self.client.set_project(id, &merged.to_set_project()?).await?;
        info!(project_id = %id, "Project configuration replaced");

        settled(response, &merged)
    }

    /// Purge the project.
    #[instrument(skip(self, current), name = "project.delete")]
    pub async fn delete(&self, current: &ProjectModel) -> Result<(), ProviderError> {
        let id = current.require_id()?;
        self.client.purge_project(id).await?;
        info!(project_id = %id, "Project purged");
        Ok(())
    }

    /// Read an existing project by id.
    pub async fn import(&self, id: &str) -> Result<ProjectModel, ProviderError> {
        let current = ProjectModel {
            id: AttrValue::known(id.to_string()),
            ..Default::default()
        };
        self.read(&current).await
    }
}

/// Rewrite a configured OAuth2 document the way the server's copy is stored.
fn normalize_oauth2(proposed: &mut Value) {
    let Some(config) = proposed.pointer_mut("/services/oauth2/config") else {
        return;
    };
    let normalized = match config.as_str() {
        Some(raw) if raw != UNKNOWN_VALUE => OAuth2Service::normalize(raw),
        _ => None,
    };
    if let Some(normalized) = normalized {
        *config = Value::String(normalized);
    }
}

/// State after a set-project call; the server may omit the workspace.
fn settled(response: SetProjectResponse, merged: &ProjectModel) -> Result<ProjectModel, ProviderError> {
    let mut model = ProjectModel::from_remote(&response.project)?;
    model.workspace_id.fill_from(&merged.workspace_id);
    Ok(model)
}

/// Best available state of a project whose configuration did not finish.
fn partial_state(project: &ApiProject) -> Value {
    let model = ProjectModel::from_remote(project).unwrap_or_else(|_| {
        let base = ProjectBase::from_remote(project);
        ProjectModel {
            id: base.id,
            name: base.name,
            slug: base.slug,
            revision_id: base.revision_id,
            state: base.state,
            workspace_id: base.workspace_id,
            ..Default::default()
        }
    });
    match model.to_state() {
        Ok(state) => state,
        Err(err) => {
            warn!(project_id = %project.id, error = %err, "Partial project state could not be encoded");
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_update_renews_revision() {
        let prior = json!({
            "id": "p1",
            "name": "Test",
            "slug": "s",
            "revision_id": "r1",
            "state": "running",
            "workspace_id": null,
            "cors_admin": {"enabled": false, "origins": []},
            "cors_public": {"enabled": false, "origins": []},
            "services": {"permission": {"config": {"namespaces": []}}}
        });

        let unchanged = ProjectResource::plan(Some(&prior), json!({"name": "Test"}));
        assert!(unchanged.changes.is_empty());
        assert_eq!(unchanged.planned_state["revision_id"], "r1");

        let renamed = ProjectResource::plan(Some(&prior), json!({"name": "Renamed"}));
        assert_eq!(renamed.planned_state["revision_id"], UNKNOWN_VALUE);
        assert_eq!(renamed.planned_state["slug"], "s");
        assert!(!renamed.requires_replace);
    }

    #[test]
    fn test_plan_normalizes_oauth2_document() {
        let prior = json!({
            "id": "p1",
            "name": "Test",
            "slug": "s",
            "revision_id": "r1",
            "state": "running",
            "workspace_id": null,
            "cors_admin": {"enabled": false, "origins": []},
            "cors_public": {"enabled": false, "origins": []},
            "services": {
                "permission": null,
                "identity": null,
                "oauth2": {"config": r#"{"ttl":{"access_token":"2h"}}"#}
            }
        });
        let proposed = json!({
            "name": "Test",
            "services": {"oauth2": {"config": "{\n  \"ttl\": { \"access_token\": \"2h\" }\n}"}}
        });

        let plan = ProjectResource::plan(Some(&prior), proposed);

        assert!(plan.changes.is_empty());
        assert_eq!(plan.planned_state["revision_id"], "r1");
    }

    #[test]
    fn test_partial_state_falls_back_to_scalars() {
        let project: ApiProject = serde_json::from_value(json!({
            "id": "p1",
            "name": "Test",
            "slug": "s",
            "services": {"permission": {"config": {"namespaces": [{"id": "x", "name": "n"}]}}}
        }))
        .unwrap();

        let state = partial_state(&project);
        assert_eq!(state["id"], "p1");
        assert_eq!(state["slug"], "s");
        assert!(state["services"].is_null());
    }
}
