//! Permission service: the relationship namespaces of a project.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::remote::{DecodeError, FromRemote, Lens, RemoteObject, ToRemote};
use crate::types::AttrValue;

/// `services.permission`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionService {
    /// The service configuration.
    pub config: AttrValue<PermissionConfig>,
}

/// `services.permission.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Namespaces, in configured order. Duplicates are kept.
    pub namespaces: AttrValue<Vec<Namespace>>,
}

/// A numerically identified namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespace {
    /// Stable namespace id.
    pub id: AttrValue<i64>,
    /// Namespace name.
    pub name: AttrValue<String>,
}

impl Namespace {
    /// A namespace with known id and name.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: AttrValue::known(id),
            name: AttrValue::known(name.into()),
        }
    }
}

impl FromRemote for Namespace {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: AttrValue::known(lens.get("id")?.require_int()?),
            name: AttrValue::known(lens.get("name")?.require_string()?),
        })
    }
}

impl ToRemote for Namespace {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .int("id", &self.id)
            .raw("name", Json::String(self.name.known_or_default()))
            .build()
    }
}

impl PermissionConfig {
    /// A config with the given namespaces.
    pub fn with_namespaces(namespaces: Vec<Namespace>) -> Self {
        Self {
            namespaces: AttrValue::known(namespaces),
        }
    }

    /// Decode the raw `config` object; missing `namespaces` is empty.
    pub fn from_remote(config: &Map<String, Json>) -> Result<Self, DecodeError> {
        let raw = Json::Object(config.clone());
        <Self as FromRemote>::from_remote(&Lens::root(&raw))
    }

    /// Encode as the raw `config` object.
    pub fn to_remote(&self) -> Map<String, Json> {
        let mut config = <Self as ToRemote>::to_remote(self);
        config
            .entry("namespaces")
            .or_insert_with(|| Json::Array(Vec::new()));
        config
    }
}

impl FromRemote for PermissionConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            namespaces: lens.get("namespaces")?.objects()?,
        })
    }
}

impl ToRemote for PermissionConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .objects("namespaces", &self.namespaces)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_to_remote_shape() {
        let config = PermissionConfig::with_namespaces(vec![
            Namespace::new(1, "Test"),
            Namespace::new(2, "Test2"),
        ]);

        assert_eq!(
            Json::Object(config.to_remote()),
            json!({"namespaces": [{"id": 1, "name": "Test"}, {"id": 2, "name": "Test2"}]})
        );
    }

    #[test]
    fn test_round_trip_is_stable() {
        let cases = vec![
            vec![],
            vec![Namespace::new(0, "files")],
            vec![Namespace::new(7, "b"), Namespace::new(3, "a"), Namespace::new(7, "b")],
        ];

        for namespaces in cases {
            let remote = PermissionConfig::with_namespaces(namespaces).to_remote();
            let again = PermissionConfig::from_remote(&remote).unwrap().to_remote();
            assert_eq!(again, remote);
        }
    }

    #[test]
    fn test_from_remote_missing_namespaces() {
        let config = PermissionConfig::from_remote(&Map::new()).unwrap();
        assert_eq!(config.namespaces, AttrValue::Known(vec![]));
        assert_eq!(Json::Object(config.to_remote()), json!({"namespaces": []}));
    }

    #[test]
    fn test_from_remote_accepts_integral_floats() {
        let config =
            PermissionConfig::from_remote(&as_map(json!({"namespaces": [{"id": 4.0, "name": "x"}]})))
                .unwrap();
        assert_eq!(config.namespaces.as_known().unwrap()[0].id, AttrValue::Known(4));
    }

    #[test]
    fn test_from_remote_rejects_bad_id() {
        let err = PermissionConfig::from_remote(&as_map(json!({
            "namespaces": [{"id": 1, "name": "ok"}, {"id": "1", "name": "bad"}]
        })))
        .unwrap_err();

        assert_eq!(err.path, "namespaces[1].id");
        assert_eq!(err.found, "string");
    }

    #[test]
    fn test_from_remote_rejects_missing_name() {
        let err = PermissionConfig::from_remote(&as_map(json!({"namespaces": [{"id": 1}]})))
            .unwrap_err();
        assert_eq!(err.path, "namespaces[0].name");
        assert_eq!(err.found, "nothing");
    }

    #[test]
    fn test_declarative_shape() {
        let service: PermissionService = serde_json::from_value(json!({
            "config": {"namespaces": [{"id": 1, "name": "Test"}]}
        }))
        .unwrap();

        assert_eq!(
            service.config,
            AttrValue::Known(PermissionConfig::with_namespaces(vec![Namespace::new(1, "Test")]))
        );
    }
}
