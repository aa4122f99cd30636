//! Provider configuration.
//!
//! Credentials come from the provider block and fall back to the
//! `ORY_NETWORK_EMAIL` / `ORY_NETWORK_PASSWORD` environment variables.
//! Problems are reported as attribute diagnostics rather than errors so the
//! operator sees all of them at once.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::schema::Diagnostic;
use crate::types::AttrValue;
use crate::validation::is_valid_email;

/// Environment variable holding the account email.
pub const EMAIL_ENV: &str = "ORY_NETWORK_EMAIL";
/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "ORY_NETWORK_PASSWORD";
/// Environment variable overriding the project API endpoint.
pub const API_URL_ENV: &str = "ORY_NETWORK_API_URL";
/// Environment variable overriding the console (login) endpoint.
pub const CONSOLE_URL_ENV: &str = "ORY_NETWORK_CONSOLE_URL";

/// Default project API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.console.ory.sh";
/// Default console endpoint used for login.
pub const DEFAULT_CONSOLE_URL: &str = "https://project.console.ory.sh";

/// The provider block as written by the operator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfigModel {
    /// Account email.
    pub email: AttrValue<String>,
    /// Account password.
    pub password: AttrValue<String>,
    /// Project API endpoint override.
    pub api_url: AttrValue<String>,
    /// Console endpoint override.
    pub console_url: AttrValue<String>,
}

/// Fully resolved provider configuration.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Project API endpoint.
    pub api_url: Url,
    /// Console endpoint used for login.
    pub console_url: Url,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("console_url", &self.console_url.as_str())
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve the provider block against the process environment.
    pub fn resolve(config: &serde_json::Value) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve the provider block using `env` to look up fallbacks.
    pub fn resolve_with<F>(config: &serde_json::Value, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model: ProviderConfigModel = match config {
            serde_json::Value::Null => ProviderConfigModel::default(),
            other => serde_json::from_value(other.clone()).map_err(|err| {
                vec![Diagnostic::error("Invalid Provider Configuration").with_detail(err.to_string())]
            })?,
        };

        let mut diagnostics = Vec::new();

        let email = credential(&model.email, "email", "Email", EMAIL_ENV, &env, &mut diagnostics);
        let password = credential(
            &model.password,
            "password",
            "Password",
            PASSWORD_ENV,
            &env,
            &mut diagnostics,
        );
        if let Some(email) = email.as_deref().filter(|e| !is_valid_email(e)) {
            diagnostics.push(
                Diagnostic::error("Invalid Ory Network Email")
                    .with_detail(format!("{:?} is not a valid email address.", email))
                    .with_attribute("email"),
            );
        }

        let api_url = endpoint(
            &model.api_url,
            "api_url",
            API_URL_ENV,
            DEFAULT_API_URL,
            &env,
            &mut diagnostics,
        );
        let console_url = endpoint(
            &model.console_url,
            "console_url",
            CONSOLE_URL_ENV,
            DEFAULT_CONSOLE_URL,
            &env,
            &mut diagnostics,
        );

        match (email, password, api_url, console_url) {
            (Some(email), Some(password), Some(api_url), Some(console_url))
                if diagnostics.is_empty() =>
            {
                Ok(Self {
                    email,
                    password,
                    api_url,
                    console_url,
                })
            }
            _ => Err(diagnostics),
        }
    }
}

fn credential<F>(
    value: &AttrValue<String>,
    attribute: &str,
    label: &str,
    env_name: &str,
    env: &F,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let resolved = match value {
        AttrValue::Unknown => {
            diagnostics.push(
                Diagnostic::error(format!("Unknown Ory Network {}", label))
                    .with_detail(format!(
                        "The provider cannot create the Ory Network API client as there is an \
                         unknown configuration value for the Ory Network {}. Either target apply \
                         the source of the value first, set the value statically in the \
                         configuration, or use the {} environment variable.",
                        label.to_lowercase(),
                        env_name
                    ))
                    .with_attribute(attribute),
            );
            return None;
        }
        AttrValue::Known(v) => Some(v.clone()),
        AttrValue::Null => env(env_name),
    };

    match resolved.filter(|v| !v.is_empty()) {
        Some(v) => Some(v),
        None => {
            diagnostics.push(
                Diagnostic::error(format!("Missing Ory Network {}", label))
                    .with_detail(format!(
                        "The provider cannot create the Ory Network API client as there is a \
                         missing or empty value for the Ory Network {}. Set the {} value in the \
                         configuration or use the {} environment variable.",
                        label.to_lowercase(),
                        attribute,
                        env_name
                    ))
                    .with_attribute(attribute),
            );
            None
        }
    }
}

fn endpoint<F>(
    value: &AttrValue<String>,
    attribute: &str,
    env_name: &str,
    default: &str,
    env: &F,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Url>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match value {
        AttrValue::Known(v) => v.clone(),
        _ => env(env_name).unwrap_or_else(|| default.to_string()),
    };

    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(err) => {
            diagnostics.push(
                Diagnostic::error("Invalid Ory Network Endpoint")
                    .with_detail(format!("{:?} is not a valid URL: {}", raw, err))
                    .with_attribute(attribute),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_VALUE;
    use serde_json::json;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_from_attributes() {
        let config = ProviderConfig::resolve_with(
            &json!({"email": "ops@example.com", "password": "hunter2"}),
            env_of(&[]),
        )
        .unwrap();

        assert_eq!(config.email, "ops@example.com");
        assert_eq!(config.api_url.as_str(), "https://api.console.ory.sh/");
        assert_eq!(config.console_url.as_str(), "https://project.console.ory.sh/");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_resolve_env_fallback() {
        let config = ProviderConfig::resolve_with(
            &json!({"email": null}),
            env_of(&[
                (EMAIL_ENV, "env@example.com"),
                (PASSWORD_ENV, "from-env"),
                (API_URL_ENV, "http://localhost:4000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.email, "env@example.com");
        assert_eq!(config.password, "from-env");
        assert_eq!(config.api_url.as_str(), "http://localhost:4000/");
    }

    #[test]
    fn test_attribute_wins_over_env() {
        let config = ProviderConfig::resolve_with(
            &json!({"email": "attr@example.com", "password": "attr"}),
            env_of(&[(EMAIL_ENV, "env@example.com"), (PASSWORD_ENV, "env")]),
        )
        .unwrap();

        assert_eq!(config.email, "attr@example.com");
        assert_eq!(config.password, "attr");
    }

    #[test]
    fn test_missing_credentials() {
        let diagnostics = ProviderConfig::resolve_with(&json!({}), env_of(&[])).unwrap_err();

        let summaries: Vec<_> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Missing Ory Network Email", "Missing Ory Network Password"]
        );
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("email"));
    }

    #[test]
    fn test_unknown_credentials() {
        let diagnostics = ProviderConfig::resolve_with(
            &json!({"email": UNKNOWN_VALUE, "password": "x"}),
            env_of(&[(EMAIL_ENV, "env@example.com")]),
        )
        .unwrap_err();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Unknown Ory Network Email");
    }

    #[test]
    fn test_invalid_email_and_endpoint() {
        let diagnostics = ProviderConfig::resolve_with(
            &json!({"email": "not-an-email", "password": "x", "api_url": "::"}),
            env_of(&[]),
        )
        .unwrap_err();

        let summaries: Vec<_> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Invalid Ory Network Email", "Invalid Ory Network Endpoint"]
        );
    }
}
