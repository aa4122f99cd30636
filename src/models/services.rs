//! The services bundle: permission, identity and OAuth2 configurations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::identity::{IdentityConfig, IdentityService};
use super::permission::{PermissionConfig, PermissionService};
use super::remote::DecodeError;
use crate::api::{ApiProjectServices, ApiServiceConfig};
use crate::error::ProviderError;
use crate::types::AttrValue;

/// `services.oauth2`.
///
/// The OAuth2 server configuration is carried opaquely as a JSON string.
/// Strings produced by the provider are normalized (keys sorted, no
/// whitespace) so repeated reads compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuth2Service {
    /// The configuration document.
    pub config: AttrValue<String>,
}

impl OAuth2Service {
    /// The normalized form of a configured document, or `None` when it is
    /// not valid JSON.
    pub fn normalize(raw: &str) -> Option<String> {
        serde_json::from_str::<Json>(raw)
            .ok()
            .map(|document| document.to_string())
    }

    fn from_remote(config: &Map<String, Json>) -> Self {
        Self {
            config: AttrValue::known(Json::Object(config.clone()).to_string()),
        }
    }

    fn to_remote(&self) -> Result<Option<ApiServiceConfig>, ProviderError> {
        let Some(raw) = self.config.as_known() else {
            return Ok(None);
        };
        match serde_json::from_str::<Json>(raw) {
            Ok(Json::Object(map)) => Ok(Some(ApiServiceConfig::new(map))),
            Ok(_) => Err(ProviderError::Validation(
                "services.oauth2.config must be a JSON object".to_string(),
            )),
            Err(err) => Err(ProviderError::Validation(format!(
                "services.oauth2.config is not valid JSON: {}",
                err
            ))),
        }
    }
}

/// `services`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesBundle {
    /// Permission namespaces.
    pub permission: AttrValue<PermissionService>,
    /// Identity and self-service configuration.
    pub identity: AttrValue<IdentityService>,
    /// OAuth2 server configuration.
    pub oauth2: AttrValue<OAuth2Service>,
}

impl ServicesBundle {
    /// The bundle used when neither the operator nor the server supplied one.
    pub fn zero() -> Self {
        Self {
            permission: AttrValue::known(zero_permission()),
            identity: AttrValue::known(zero_identity()),
            oauth2: AttrValue::Null,
        }
    }

    /// Map the API representation.
    ///
    /// A missing permission or identity service decodes as an empty
    /// configuration; a missing OAuth2 service stays null.
    pub fn from_remote(services: &ApiProjectServices) -> Result<Self, DecodeError> {
        let empty = Map::new();

        let permission_config = services
            .permission
            .as_ref()
            .map_or(&empty, |s| &s.config);
        let permission = PermissionConfig::from_remote(permission_config)
            .map_err(|e| e.within("services.permission.config"))?;

        let identity_config = services.identity.as_ref().map_or(&empty, |s| &s.config);
        let identity = IdentityConfig::from_remote(identity_config)
            .map_err(|e| e.within("services.identity.config"))?;

        let oauth2 = AttrValue::from_option(
            services
                .oauth2
                .as_ref()
                .map(|service| OAuth2Service::from_remote(&service.config)),
        );

        Ok(Self {
            permission: AttrValue::known(PermissionService {
                config: AttrValue::known(permission),
            }),
            identity: AttrValue::known(IdentityService {
                config: AttrValue::known(identity),
            }),
            oauth2,
        })
    }

    /// Map to the API representation.
    ///
    /// Null or unknown sub-services are left out. Fails when the OAuth2
    /// document is not a JSON object.
    pub fn to_remote(&self) -> Result<ApiProjectServices, ProviderError> {
        let permission = self.permission.as_known().map(|service| {
            ApiServiceConfig::new(service.config.known_or_default().to_remote())
        });
        let identity = self.identity.as_known().map(|service| {
            ApiServiceConfig::new(service.config.known_or_default().to_remote())
        });
        let oauth2 = match self.oauth2.as_known() {
            Some(service) => service.to_remote()?,
            None => None,
        };

        Ok(ApiProjectServices {
            identity,
            permission,
            oauth2,
        })
    }

    /// Fill every sub-service left unset here from `baseline`.
    ///
    /// A configured sub-service with an unset `config` takes the baseline's
    /// config. Sub-services unset in both fall back to their zero value.
    pub fn merge_with(&self, baseline: &ServicesBundle) -> ServicesBundle {
        let zero = Self::zero();

        let mut permission = self
            .permission
            .clone()
            .or(baseline.permission.clone())
            .or(zero.permission);
        if let (Some(service), Some(fallback)) =
            (permission.as_known_mut(), baseline.permission.as_known())
        {
            service.config.fill_from(&fallback.config);
        }

        let mut identity = self
            .identity
            .clone()
            .or(baseline.identity.clone())
            .or(zero.identity);
        if let (Some(service), Some(fallback)) =
            (identity.as_known_mut(), baseline.identity.as_known())
        {
            service.config.fill_from(&fallback.config);
        }

        let mut oauth2 = self.oauth2.clone().or(baseline.oauth2.clone());
        if let (Some(service), Some(fallback)) = (oauth2.as_known_mut(), baseline.oauth2.as_known())
        {
            service.config.fill_from(&fallback.config);
        }

        ServicesBundle {
            permission,
            identity,
            oauth2,
        }
    }
}

fn zero_permission() -> PermissionService {
    PermissionService {
        config: AttrValue::known(PermissionConfig::with_namespaces(Vec::new())),
    }
}

fn zero_identity() -> IdentityService {
    IdentityService {
        config: AttrValue::known(IdentityConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::permission::Namespace;
    use serde_json::json;

    fn remote(value: Json) -> ApiProjectServices {
        serde_json::from_value(value).unwrap()
    }

    fn namespaces(bundle: &ServicesBundle) -> Vec<Namespace> {
        bundle
            .permission
            .as_known()
            .and_then(|p| p.config.as_known())
            .and_then(|c| c.namespaces.as_known())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_from_remote_missing_services() {
        let bundle = ServicesBundle::from_remote(&ApiProjectServices::default()).unwrap();

        assert!(namespaces(&bundle).is_empty());
        assert!(bundle.identity.as_known().unwrap().config.is_known());
        assert!(bundle.oauth2.is_null());
    }

    #[test]
    fn test_from_remote_prefixes_paths() {
        let err = ServicesBundle::from_remote(&remote(json!({
            "permission": {"config": {"namespaces": [{"id": 1.5, "name": "x"}]}}
        })))
        .unwrap_err();
        assert_eq!(err.path, "services.permission.config.namespaces[0].id");

        let err = ServicesBundle::from_remote(&remote(json!({
            "identity": {"config": {"identity": {"schemas": {}}}}
        })))
        .unwrap_err();
        assert_eq!(err.path, "services.identity.config.identity.schemas");
    }

    #[test]
    fn test_oauth2_is_normalized() {
        let bundle = ServicesBundle::from_remote(&remote(json!({
            "oauth2": {"config": {"ttl": {"access_token": "1h"}, "strategies": {"scope": "exact"}}}
        })))
        .unwrap();

        assert_eq!(
            bundle.oauth2.as_known().unwrap().config,
            AttrValue::Known(
                r#"{"strategies":{"scope":"exact"},"ttl":{"access_token":"1h"}}"#.to_string()
            )
        );

        let back = bundle.to_remote().unwrap();
        assert_eq!(
            Json::Object(back.oauth2.unwrap().config),
            json!({"strategies": {"scope": "exact"}, "ttl": {"access_token": "1h"}})
        );
    }

    #[test]
    fn test_oauth2_normalize() {
        assert_eq!(
            OAuth2Service::normalize("{\"ttl\": {\"access_token\": \"2h\"}, \"a\": 1}").as_deref(),
            Some(r#"{"a":1,"ttl":{"access_token":"2h"}}"#)
        );
        assert_eq!(OAuth2Service::normalize("{"), None);
    }

    #[test]
    fn test_oauth2_must_be_object() {
        let bundle = ServicesBundle {
            oauth2: AttrValue::known(OAuth2Service {
                config: AttrValue::known("[1, 2]".to_string()),
            }),
            ..Default::default()
        };
        let err = bundle.to_remote().unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        let bundle = ServicesBundle {
            oauth2: AttrValue::known(OAuth2Service {
                config: AttrValue::known("{".to_string()),
            }),
            ..Default::default()
        };
        assert!(bundle.to_remote().is_err());
    }

    #[test]
    fn test_to_remote_skips_unset_services() {
        let services = ServicesBundle {
            permission: AttrValue::known(zero_permission()),
            identity: AttrValue::Unknown,
            oauth2: AttrValue::Null,
        }
        .to_remote()
        .unwrap();

        assert_eq!(
            serde_json::to_value(&services).unwrap(),
            json!({"permission": {"config": {"namespaces": []}}})
        );
    }

    #[test]
    fn test_merge_prefers_configured_services() {
        let configured = ServicesBundle {
            permission: AttrValue::known(PermissionService {
                config: AttrValue::known(PermissionConfig::with_namespaces(vec![Namespace::new(
                    1, "Test",
                )])),
            }),
            ..Default::default()
        };
        let baseline = ServicesBundle::from_remote(&remote(json!({
            "permission": {"config": {"namespaces": [{"id": 9, "name": "server"}]}},
            "identity": {"config": {"identity": {"default_schema_id": "preset://username"}}},
            "oauth2": {"config": {}}
        })))
        .unwrap();

        let merged = configured.merge_with(&baseline);
        assert_eq!(namespaces(&merged), vec![Namespace::new(1, "Test")]);
        assert_eq!(merged.identity, baseline.identity);
        assert_eq!(merged.oauth2, baseline.oauth2);
    }

    #[test]
    fn test_merge_fills_unset_config() {
        let configured = ServicesBundle {
            permission: AttrValue::known(PermissionService {
                config: AttrValue::Unknown,
            }),
            ..Default::default()
        };
        let baseline = ServicesBundle::from_remote(&remote(json!({
            "permission": {"config": {"namespaces": [{"id": 9, "name": "server"}]}}
        })))
        .unwrap();

        let merged = configured.merge_with(&baseline);
        assert_eq!(namespaces(&merged), vec![Namespace::new(9, "server")]);
    }

    #[test]
    fn test_merge_falls_back_to_zero() {
        let merged = ServicesBundle::default().merge_with(&ServicesBundle::default());
        assert_eq!(merged, ServicesBundle::zero());
        assert!(namespaces(&merged).is_empty());
    }
}
