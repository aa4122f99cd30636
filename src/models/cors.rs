//! CORS settings of the admin and public project APIs.

use serde::{Deserialize, Serialize};

use crate::api::ApiProjectCors;
use crate::types::AttrValue;

/// Declarative CORS block: `{ enabled, origins }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Whether CORS is enabled.
    pub enabled: AttrValue<bool>,
    /// Allowed origins, in configured order.
    pub origins: AttrValue<Vec<String>>,
}

impl CorsSettings {
    /// Settings with CORS turned off and no origins.
    pub fn disabled() -> Self {
        Self {
            enabled: AttrValue::known(false),
            origins: AttrValue::known(Vec::new()),
        }
    }

    /// Map the API representation; origins are never null.
    pub fn from_remote(cors: &ApiProjectCors) -> Self {
        Self {
            enabled: AttrValue::known(cors.enabled),
            origins: AttrValue::known(cors.origins.clone().unwrap_or_default()),
        }
    }

    /// Map to the API representation, defaulting unset fields.
    pub fn to_remote(&self) -> ApiProjectCors {
        ApiProjectCors {
            enabled: self.enabled.known_or(false),
            origins: Some(self.origins.known_or_default()),
        }
    }

    /// The configured settings, or `None` when the block is null or unknown.
    pub fn from_declared(value: &AttrValue<CorsSettings>) -> Option<CorsSettings> {
        value.as_known().cloned()
    }
}
