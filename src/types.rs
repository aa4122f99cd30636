//! Convenience types shared by the provider operations.
//!
//! [`AttrValue`] models the three states an attribute can be in while the
//! orchestrating framework drives a plan: absent (`null`), not yet known
//! (`unknown`), or a concrete value. The framework encodes unknown values in
//! JSON with the [`UNKNOWN_VALUE`] sentinel string.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel string the framework uses for values only known after apply.
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// Returns true if the JSON value is the unknown sentinel.
pub fn is_unknown(value: &serde_json::Value) -> bool {
    value.as_str() == Some(UNKNOWN_VALUE)
}

/// An attribute value as seen by the framework.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttrValue<T> {
    /// The attribute is absent.
    #[default]
    Null,
    /// The attribute will be known after apply.
    Unknown,
    /// The attribute has a concrete value.
    Known(T),
}

impl<T> AttrValue<T> {
    /// Wrap a concrete value.
    pub fn known(value: T) -> Self {
        Self::Known(value)
    }

    /// Convert an `Option`, mapping `None` to null.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Null,
        }
    }

    /// Returns true for [`AttrValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for [`AttrValue::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true for [`AttrValue::Known`].
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Borrow the concrete value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Mutably borrow the concrete value, if any.
    pub fn as_known_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Take the concrete value, if any.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Keep `self` when known, otherwise fall back to `other`.
    pub fn or(self, other: AttrValue<T>) -> AttrValue<T> {
        if self.is_known() {
            self
        } else {
            other
        }
    }
}

impl<T: Clone> AttrValue<T> {
    /// Replace a null or unknown value with a copy of `other`.
    pub fn fill_from(&mut self, other: &AttrValue<T>) {
        if !self.is_known() {
            *self = other.clone();
        }
    }

    /// The concrete value, or `default` when null or unknown.
    pub fn known_or(&self, default: T) -> T {
        self.as_known().cloned().unwrap_or(default)
    }
}

impl<T: Clone + Default> AttrValue<T> {
    /// The concrete value, or `T::default()` when null or unknown.
    pub fn known_or_default(&self) -> T {
        self.as_known().cloned().unwrap_or_default()
    }
}

impl<T> From<T> for AttrValue<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl From<&str> for AttrValue<String> {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}

impl<T: Serialize> Serialize for AttrValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Unknown => serializer.serialize_str(UNKNOWN_VALUE),
            Self::Known(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for AttrValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Self::Null),
            ref v if is_unknown(v) => Ok(Self::Unknown),
            other => serde_json::from_value(other)
                .map(Self::Known)
                .map_err(D::Error::custom),
        }
    }
}

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<serde_json::Value>,
    /// The value after the change (None if deleting).
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// Compute top-level attribute changes between two object states.
///
/// Null and missing attributes are treated the same.
pub fn diff_attributes(
    before: Option<&serde_json::Value>,
    after: &serde_json::Value,
) -> Vec<AttributeChange> {
    let empty = serde_json::Map::new();
    let before = before.and_then(|v| v.as_object()).unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut keys: Vec<&String> = before.keys().chain(after.keys()).collect();
    keys.sort();
    keys.dedup();

    let present = |map: &serde_json::Map<String, serde_json::Value>, key: &str| {
        map.get(key).filter(|v| !v.is_null()).cloned()
    };

    keys.into_iter()
        .filter_map(|key| match (present(before, key), present(after, key)) {
            (None, Some(a)) => Some(AttributeChange::added(key.as_str(), a)),
            (Some(b), None) => Some(AttributeChange::removed(key.as_str(), b)),
            (Some(b), Some(a)) if b != a => Some(AttributeChange::modified(key.as_str(), b, a)),
            _ => None,
        })
        .collect()
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: serde_json::Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Names of the resources and data sources a provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// The provider type name used as resource prefix.
    pub type_name: String,
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: AttrValue<String>,
        count: AttrValue<i64>,
        tags: AttrValue<Vec<String>>,
    }

    #[test]
    fn test_attr_value_deserialize() {
        let sample: Sample = serde_json::from_value(json!({
            "name": UNKNOWN_VALUE,
            "count": 3,
        }))
        .unwrap();

        assert!(sample.name.is_unknown());
        assert_eq!(sample.count, AttrValue::Known(3));
        assert!(sample.tags.is_null());
    }

    #[test]
    fn test_attr_value_serialize() {
        let sample = Sample {
            name: AttrValue::Unknown,
            count: AttrValue::Null,
            tags: AttrValue::known(vec!["a".to_string()]),
        };

        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            json!({"name": UNKNOWN_VALUE, "count": null, "tags": ["a"]})
        );
    }

    #[test]
    fn test_attr_value_type_mismatch() {
        let result: Result<Sample, _> = serde_json::from_value(json!({"count": "three"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_attr_value_fallbacks() {
        let known: AttrValue<i64> = AttrValue::known(1);
        assert_eq!(known.clone().or(AttrValue::known(2)), AttrValue::Known(1));
        assert_eq!(
            AttrValue::<i64>::Unknown.or(AttrValue::known(2)),
            AttrValue::Known(2)
        );

        let mut value = AttrValue::<i64>::Null;
        value.fill_from(&known);
        assert_eq!(value, AttrValue::Known(1));

        assert!(!AttrValue::<bool>::Null.known_or(false));
        assert_eq!(AttrValue::<Vec<u8>>::Unknown.known_or_default(), Vec::<u8>::new());
    }

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("test"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("test")));

        let removed = AttributeChange::removed("name", json!("old"));
        assert_eq!(removed.before, Some(json!("old")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("count", json!(1), json!(2));
        assert_eq!(modified.before, Some(json!(1)));
        assert_eq!(modified.after, Some(json!(2)));
    }

    #[test]
    fn test_diff_attributes() {
        let before = json!({"id": "p1", "name": "old", "slug": "s", "workspace_id": null});
        let after = json!({"id": "p1", "name": "new", "workspace_id": "w1"});

        let changes = diff_attributes(Some(&before), &after);
        let paths: Vec<_> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "slug", "workspace_id"]);
        assert_eq!(changes[1].after, None);
        assert_eq!(changes[2].before, None);

        let created = diff_attributes(None, &json!({"name": "x", "id": null}));
        assert_eq!(created, vec![AttributeChange::added("name", json!("x"))]);
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(json!({"id": "123"}));
        assert!(no_change.changes.is_empty());
        assert!(!no_change.requires_replace);

        let with_changes = PlanResult::with_changes(
            json!({"id": "123", "name": "new"}),
            vec![AttributeChange::modified("name", json!("old"), json!("new"))],
            false,
        );
        assert_eq!(with_changes.changes.len(), 1);
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new("orynetwork_project", json!({"id": "abc"}));
        assert_eq!(imported.resource_type, "orynetwork_project");
        assert_eq!(imported.state["id"], "abc");
    }
}
