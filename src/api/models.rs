//! Wire types of the Ory Network console API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::models::{DecodeError, FromRemote, Lens};

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiProject {
    /// Server-assigned project id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Server-derived slug.
    #[serde(default)]
    pub slug: String,
    /// Current configuration revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    /// Lifecycle state, e.g. `running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Workspace the project belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// CORS settings of the admin APIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_admin: Option<ApiProjectCors>,
    /// CORS settings of the public APIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_public: Option<ApiProjectCors>,
    /// Service configurations.
    #[serde(default)]
    pub services: ApiProjectServices,
}

/// CORS settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiProjectCors {
    /// Whether CORS is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Allowed origins.
    #[serde(default)]
    pub origins: Option<Vec<String>>,
}

/// Service configurations of a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiProjectServices {
    /// Identity and self-service configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ApiServiceConfig>,
    /// Permission namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<ApiServiceConfig>,
    /// OAuth2 server configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<ApiServiceConfig>,
}

/// A free-form service config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiServiceConfig {
    /// The raw configuration object.
    #[serde(default)]
    pub config: Map<String, Json>,
}

impl ApiServiceConfig {
    /// Wrap a raw configuration object.
    pub fn new(config: Map<String, Json>) -> Self {
        Self { config }
    }
}

impl FromRemote for ApiProject {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: lens.get("id")?.require_string()?,
            name: lens.get("name")?.require_string()?,
            slug: lens.get("slug")?.string()?.into_known().unwrap_or_default(),
            revision_id: lens.get("revision_id")?.string()?.into_known(),
            state: lens.get("state")?.string()?.into_known(),
            workspace_id: lens.get("workspace_id")?.string()?.into_known(),
            cors_admin: cors(&lens.get("cors_admin")?)?,
            cors_public: cors(&lens.get("cors_public")?)?,
            services: ApiProjectServices::from_remote(&lens.get("services")?)?,
        })
    }
}

fn cors(lens: &Lens<'_>) -> Result<Option<ApiProjectCors>, DecodeError> {
    if lens.is_absent() {
        return Ok(None);
    }
    let origins = lens.get("origins")?;
    Ok(Some(ApiProjectCors {
        enabled: lens.get("enabled")?.flag()?.known_or(false),
        origins: if origins.is_absent() {
            None
        } else {
            origins.strings()?.into_known()
        },
    }))
}

impl FromRemote for ApiProjectServices {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        let service = |name: &str| -> Result<Option<ApiServiceConfig>, DecodeError> {
            let service = lens.get(name)?;
            if service.is_absent() {
                return Ok(None);
            }
            Ok(Some(ApiServiceConfig::new(service.get("config")?.raw_object()?)))
        };

        Ok(Self {
            identity: service("identity")?,
            permission: service("permission")?,
            oauth2: service("oauth2")?,
        })
    }
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectBody {
    /// Display name.
    pub name: String,
    /// Workspace to create the project in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

/// Body of `PUT /projects/{id}`; replaces the whole configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetProject {
    /// CORS settings of the admin APIs.
    pub cors_admin: ApiProjectCors,
    /// CORS settings of the public APIs.
    pub cors_public: ApiProjectCors,
    /// Display name.
    pub name: String,
    /// Service configurations.
    pub services: ApiProjectServices,
}

/// Response of `PUT /projects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetProjectResponse {
    /// The project after the update.
    pub project: ApiProject,
    /// Non-fatal warnings about the submitted configuration.
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

impl FromRemote for SetProjectResponse {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        let warnings = lens
            .get("warnings")?
            .items()?
            .iter()
            .map(|warning| {
                Ok(Warning {
                    code: warning.get("code")?.int()?.into_known(),
                    message: warning
                        .get("message")?
                        .string()?
                        .into_known()
                        .unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(Self {
            project: ApiProject::from_remote(&lens.get("project")?)?,
            warnings,
        })
    }
}

/// A configuration warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Machine-readable code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// A native login flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginFlow {
    /// Flow id to submit the credentials to.
    pub id: String,
}

/// Body submitted to complete a login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordLogin<'a> {
    /// Always `password`.
    pub method: &'static str,
    /// The account email.
    pub identifier: &'a str,
    /// The account password.
    pub password: &'a str,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginSuccess {
    /// Bearer token for subsequent calls.
    pub session_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_defaults() {
        let project: ApiProject = serde_json::from_value(json!({
            "id": "p1",
            "name": "Test",
            "slug": "eager-wing",
            "state": "running",
            "services": {
                "permission": {"config": {"namespaces": []}}
            }
        }))
        .unwrap();

        assert_eq!(project.state.as_deref(), Some("running"));
        assert!(project.cors_admin.is_none());
        assert!(project.services.identity.is_none());
        assert_eq!(
            project.services.permission.unwrap().config["namespaces"],
            json!([])
        );
    }

    #[test]
    fn test_create_body_omits_workspace() {
        let body = CreateProjectBody {
            name: "Test".to_string(),
            workspace_id: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"name": "Test"}));
    }

    #[test]
    fn test_project_decode_names_the_key() {
        let body = json!({
            "id": "p1",
            "name": "Test",
            "cors_admin": {"enabled": "yes"}
        });
        let err = ApiProject::from_remote(&Lens::root(&body)).unwrap_err();
        assert_eq!(err.path, "cors_admin.enabled");
        assert_eq!(err.expected, "bool");

        let body = json!({
            "project": {"id": "p1", "name": "Test", "services": {"permission": {"config": []}}}
        });
        let err = SetProjectResponse::from_remote(&Lens::root(&body)).unwrap_err();
        assert_eq!(err.path, "project.services.permission.config");
    }

    #[test]
    fn test_project_decode_treats_null_as_absent() {
        let body = json!({
            "id": "p1",
            "name": "Test",
            "slug": null,
            "cors_public": {"enabled": true, "origins": null},
            "services": {"permission": {"config": null}, "identity": null}
        });
        let project = ApiProject::from_remote(&Lens::root(&body)).unwrap();

        assert_eq!(project.slug, "");
        assert_eq!(
            project.cors_public,
            Some(ApiProjectCors {
                enabled: true,
                origins: None
            })
        );
        assert!(project.services.permission.unwrap().config.is_empty());
        assert!(project.services.identity.is_none());
    }

    #[test]
    fn test_set_project_response() {
        let response: SetProjectResponse = serde_json::from_value(json!({
            "project": {"id": "p1", "name": "Test", "slug": "s", "services": {}},
            "warnings": [{"code": 1, "message": "deprecated key"}]
        }))
        .unwrap();

        assert_eq!(response.project.id, "p1");
        assert_eq!(response.warnings[0].message, "deprecated key");
    }
}
