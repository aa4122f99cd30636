//! The project aggregate and its merge-with-defaults policy.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::cors::CorsSettings;
use super::remote::DecodeError;
use super::services::ServicesBundle;
use crate::api::{ApiProject, ApiProjectCors, CreateProjectBody, SetProject};
use crate::error::ProviderError;
use crate::types::AttrValue;

/// Declarative state of an `orynetwork_project`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectModel {
    /// Server-assigned project id.
    pub id: AttrValue<String>,
    /// Display name.
    pub name: AttrValue<String>,
    /// Server-derived slug.
    pub slug: AttrValue<String>,
    /// Current configuration revision.
    pub revision_id: AttrValue<String>,
    /// Lifecycle state.
    pub state: AttrValue<String>,
    /// Workspace the project belongs to. Changing it replaces the project.
    pub workspace_id: AttrValue<String>,
    /// CORS settings of the admin APIs.
    pub cors_admin: AttrValue<CorsSettings>,
    /// CORS settings of the public APIs.
    pub cors_public: AttrValue<CorsSettings>,
    /// Service configurations.
    pub services: AttrValue<ServicesBundle>,
}

/// Scalar attributes of a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct ProjectBase {
    pub id: AttrValue<String>,
    pub name: AttrValue<String>,
    pub slug: AttrValue<String>,
    pub revision_id: AttrValue<String>,
    pub state: AttrValue<String>,
    pub workspace_id: AttrValue<String>,
}

impl ProjectBase {
    /// Scalars of an API project.
    pub fn from_remote(project: &ApiProject) -> Self {
        Self {
            id: AttrValue::known(project.id.clone()),
            name: AttrValue::known(project.name.clone()),
            slug: AttrValue::known(project.slug.clone()),
            revision_id: AttrValue::from_option(project.revision_id.clone()),
            state: AttrValue::from_option(project.state.clone()),
            workspace_id: AttrValue::from_option(project.workspace_id.clone()),
        }
    }
}

impl ProjectModel {
    /// Decode framework state; `null` is an empty model.
    pub fn from_state(state: &Json) -> Result<Self, ProviderError> {
        if state.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(state.clone())?)
    }

    /// Encode as framework state.
    pub fn to_state(&self) -> Result<Json, ProviderError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Assemble a fully populated model.
    pub fn compose(
        base: ProjectBase,
        cors_admin: CorsSettings,
        cors_public: CorsSettings,
        services: ServicesBundle,
    ) -> Self {
        Self {
            id: base.id,
            name: base.name,
            slug: base.slug,
            revision_id: base.revision_id,
            state: base.state,
            workspace_id: base.workspace_id,
            cors_admin: AttrValue::known(cors_admin),
            cors_public: AttrValue::known(cors_public),
            services: AttrValue::known(services),
        }
    }

    /// Map an API project. Missing CORS blocks decode as disabled.
    pub fn from_remote(project: &ApiProject) -> Result<Self, DecodeError> {
        let cors = |cors: &Option<ApiProjectCors>| {
            cors.as_ref()
                .map_or_else(CorsSettings::disabled, CorsSettings::from_remote)
        };
        Ok(Self::compose(
            ProjectBase::from_remote(project),
            cors(&project.cors_admin),
            cors(&project.cors_public),
            ServicesBundle::from_remote(&project.services)?,
        ))
    }

    /// Overlay this configuration on `baseline`.
    ///
    /// Every attribute set here wins. Unset CORS blocks and services are
    /// taken from `baseline`, and from their zero value when the baseline
    /// has none either. A CORS block that is set is used as is, so unset
    /// `origins` inside it means no origins.
    pub fn merge_with_defaults(&self, baseline: &ProjectModel) -> ProjectModel {
        let cors = |own: &AttrValue<CorsSettings>, base: &AttrValue<CorsSettings>| {
            own.clone()
                .or(base.clone())
                .or(AttrValue::known(CorsSettings::disabled()))
        };

        let services = match (self.services.as_known(), baseline.services.as_known()) {
            (Some(own), Some(base)) => own.merge_with(base),
            (Some(own), None) => own.merge_with(&ServicesBundle::default()),
            (None, Some(base)) => base.clone(),
            (None, None) => ServicesBundle::zero(),
        };

        ProjectModel {
            id: self.id.clone().or(baseline.id.clone()),
            name: self.name.clone().or(baseline.name.clone()),
            slug: self.slug.clone().or(baseline.slug.clone()),
            revision_id: self.revision_id.clone().or(baseline.revision_id.clone()),
            state: self.state.clone().or(baseline.state.clone()),
            workspace_id: self.workspace_id.clone().or(baseline.workspace_id.clone()),
            cors_admin: cors(&self.cors_admin, &baseline.cors_admin),
            cors_public: cors(&self.cors_public, &baseline.cors_public),
            services: AttrValue::known(services),
        }
    }

    /// The project id, which must be known.
    pub fn require_id(&self) -> Result<&str, ProviderError> {
        self.id.as_known().map(String::as_str).ok_or_else(|| {
            ProviderError::Validation("project ID must be set and a known value".to_string())
        })
    }

    fn require_name(&self) -> Result<&str, ProviderError> {
        self.name.as_known().map(String::as_str).ok_or_else(|| {
            ProviderError::Validation("project name must be set and a known value".to_string())
        })
    }

    /// Body of the create call.
    ///
    /// An unknown workspace was left to the server and is not sent.
    pub fn create_body(&self) -> Result<CreateProjectBody, ProviderError> {
        let name = self.require_name()?.to_string();
        Ok(CreateProjectBody {
            name,
            workspace_id: self.workspace_id.as_known().cloned(),
        })
    }

    /// Body of the set-project call.
    ///
    /// The call replaces the whole configuration, so this should be built
    /// from a merged model.
    pub fn to_set_project(&self) -> Result<SetProject, ProviderError> {
        let name = self.require_name()?.to_string();
        let cors = |value: &AttrValue<CorsSettings>| {
            CorsSettings::from_declared(value)
                .unwrap_or_else(CorsSettings::disabled)
                .to_remote()
        };
        Ok(SetProject {
            cors_admin: cors(&self.cors_admin),
            cors_public: cors(&self.cors_public),
            name,
            services: self.services.known_or_default().to_remote()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::permission::{Namespace, PermissionConfig, PermissionService};
    use crate::types::UNKNOWN_VALUE;
    use serde_json::json;

    fn api_project(value: Json) -> ApiProject {
        serde_json::from_value(value).unwrap()
    }

    fn server_defaults() -> ProjectModel {
        ProjectModel::from_remote(&api_project(json!({
            "id": "p1",
            "name": "test",
            "slug": "happy-slug",
            "state": "running",
            "cors_admin": {"enabled": false, "origins": []},
            "services": {
                "permission": {"config": {"namespaces": []}},
                "identity": {"config": {"identity": {
                    "default_schema_id": "preset://username",
                    "schemas": [{"id": "preset://username", "url": "base64://e30="}]
                }}}
            }
        })))
        .unwrap()
    }

    fn namespaces(model: &ProjectModel) -> Vec<Namespace> {
        model
            .services
            .as_known()
            .and_then(|s| s.permission.as_known())
            .and_then(|p| p.config.as_known())
            .and_then(|c| c.namespaces.as_known())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_from_remote_fills_everything() {
        let model = server_defaults();

        assert_eq!(model.id, AttrValue::Known("p1".to_string()));
        assert_eq!(model.revision_id, AttrValue::Null);
        assert_eq!(model.cors_public, AttrValue::Known(CorsSettings::disabled()));
        assert!(namespaces(&model).is_empty());
    }

    #[test]
    fn test_merge_server_default_wins_when_unset() {
        let user = ProjectModel {
            name: "test".into(),
            ..Default::default()
        };

        let merged = user.merge_with_defaults(&server_defaults());
        assert!(namespaces(&merged).is_empty());
        assert_eq!(
            merged.services.as_known().unwrap().identity,
            server_defaults().services.as_known().unwrap().identity
        );
    }

    #[test]
    fn test_merge_user_wins_when_set() {
        let cors = CorsSettings {
            enabled: AttrValue::known(true),
            origins: AttrValue::known(vec!["https://google.com".to_string()]),
        };
        let user = ProjectModel {
            name: "test".into(),
            cors_admin: AttrValue::known(cors.clone()),
            services: AttrValue::known(ServicesBundle {
                permission: AttrValue::known(PermissionService {
                    config: AttrValue::known(PermissionConfig::with_namespaces(vec![
                        Namespace::new(1, "Test"),
                    ])),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = user.merge_with_defaults(&server_defaults());
        assert_eq!(merged.cors_admin, AttrValue::Known(cors));
        assert_eq!(namespaces(&merged), vec![Namespace::new(1, "Test")]);
    }

    #[test]
    fn test_merge_without_baseline_uses_zero_values() {
        let user = ProjectModel {
            name: "test".into(),
            cors_admin: AttrValue::Unknown,
            ..Default::default()
        };

        let merged = user.merge_with_defaults(&ProjectModel::default());
        assert_eq!(merged.cors_admin, AttrValue::Known(CorsSettings::disabled()));
        assert_eq!(merged.services, AttrValue::Known(ServicesBundle::zero()));
    }

    #[test]
    fn test_set_project_disables_cors_without_origins() {
        let user = ProjectModel {
            name: "test".into(),
            cors_admin: AttrValue::known(CorsSettings {
                enabled: AttrValue::known(false),
                origins: AttrValue::Null,
            }),
            ..Default::default()
        };
        let baseline = ProjectModel {
            cors_admin: AttrValue::known(CorsSettings {
                enabled: AttrValue::known(true),
                origins: AttrValue::known(vec!["https://old.example".to_string()]),
            }),
            ..server_defaults()
        };

        let body = user.merge_with_defaults(&baseline).to_set_project().unwrap();
        assert_eq!(
            serde_json::to_value(&body.cors_admin).unwrap(),
            json!({"enabled": false, "origins": []})
        );
        assert_eq!(
            serde_json::to_value(&body.services.permission).unwrap(),
            json!({"config": {"namespaces": []}})
        );
    }

    #[test]
    fn test_validation_messages() {
        let unnamed = ProjectModel::default();
        assert_eq!(
            unnamed.create_body().unwrap_err().to_string(),
            "Validation error: project name must be set and a known value"
        );
        assert!(unnamed.to_set_project().is_err());
        assert_eq!(
            unnamed.require_id().unwrap_err().to_string(),
            "Validation error: project ID must be set and a known value"
        );

        let pending_workspace = ProjectModel {
            name: "test".into(),
            workspace_id: AttrValue::Unknown,
            ..Default::default()
        };
        assert_eq!(pending_workspace.create_body().unwrap().workspace_id, None);
    }

    #[test]
    fn test_create_body() {
        let model = ProjectModel {
            name: "test".into(),
            workspace_id: "w1".into(),
            ..Default::default()
        };
        assert_eq!(
            model.create_body().unwrap(),
            CreateProjectBody {
                name: "test".to_string(),
                workspace_id: Some("w1".to_string()),
            }
        );
    }

    #[test]
    fn test_state_round_trip() {
        let state = json!({
            "id": UNKNOWN_VALUE,
            "name": "test",
            "cors_admin": {"enabled": true, "origins": ["https://google.com"]},
            "services": {"permission": {"config": {"namespaces": [{"id": 1, "name": "Test"}]}}}
        });

        let model = ProjectModel::from_state(&state).unwrap();
        assert!(model.id.is_unknown());
        assert!(model.services.as_known().unwrap().identity.is_null());
        assert_eq!(namespaces(&model), vec![Namespace::new(1, "Test")]);

        let back = model.to_state().unwrap();
        assert_eq!(back["id"], json!(UNKNOWN_VALUE));
        assert_eq!(back["cors_admin"], state["cors_admin"]);
        assert_eq!(back["slug"], Json::Null);

        assert_eq!(ProjectModel::from_state(&Json::Null).unwrap(), ProjectModel::default());
    }
}
