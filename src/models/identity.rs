//! Identity service: identity schemas plus self-service methods and flows.
//!
//! The declarative tree mirrors the remote `services.identity.config`
//! object key for key. Decoding substitutes a zero-value object for every
//! nested object the server leaves out, so the state keeps the same shape
//! across reads. Encoding leaves out null, unknown and empty-string leaves
//! so the server keeps its defaults for them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::remote::{DecodeError, FromRemote, Lens, RemoteObject, ToRemote};
use crate::types::AttrValue;

/// `services.identity`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityService {
    /// The service configuration.
    pub config: AttrValue<IdentityConfig>,
}

/// `services.identity.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity schemas.
    pub identity: AttrValue<IdentitySchemas>,
    /// Self-service methods and flows.
    pub selfservice: AttrValue<SelfService>,
}

impl IdentityConfig {
    /// Decode the raw `config` object.
    pub fn from_remote(config: &Map<String, Json>) -> Result<Self, DecodeError> {
        let raw = Json::Object(config.clone());
        <Self as FromRemote>::from_remote(&Lens::root(&raw))
    }

    /// Encode as the raw `config` object.
    pub fn to_remote(&self) -> Map<String, Json> {
        <Self as ToRemote>::to_remote(self)
    }
}

impl FromRemote for IdentityConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            identity: lens.get("identity")?.object()?,
            selfservice: lens.get("selfservice")?.object()?,
        })
    }
}

impl ToRemote for IdentityConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .object("identity", &self.identity)
            .object("selfservice", &self.selfservice)
            .build()
    }
}

/// `config.identity`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySchemas {
    /// Schema used for new identities.
    pub default_schema_id: AttrValue<String>,
    /// Available schemas.
    pub schemas: AttrValue<Vec<IdentitySchema>>,
}

/// One identity schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySchema {
    /// Schema id, e.g. `preset://email`.
    pub id: AttrValue<String>,
    /// Where the schema document lives.
    pub url: AttrValue<String>,
}

impl FromRemote for IdentitySchemas {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            default_schema_id: lens.get("default_schema_id")?.string()?,
            schemas: lens.get("schemas")?.objects()?,
        })
    }
}

impl ToRemote for IdentitySchemas {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("default_schema_id", &self.default_schema_id)
            .objects("schemas", &self.schemas)
            .build()
    }
}

impl FromRemote for IdentitySchema {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: lens.get("id")?.string()?,
            url: lens.get("url")?.string()?,
        })
    }
}

impl ToRemote for IdentitySchema {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("id", &self.id)
            .string("url", &self.url)
            .build()
    }
}

/// `config.selfservice`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfService {
    /// Where browsers land after a flow by default.
    pub default_browser_return_url: AttrValue<String>,
    /// Additional allowed return URLs.
    pub allowed_return_urls: AttrValue<Vec<String>>,
    /// Authentication methods.
    pub methods: AttrValue<SelfServiceMethods>,
    /// User-facing flows.
    pub flows: AttrValue<SelfServiceFlows>,
}

impl FromRemote for SelfService {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            default_browser_return_url: lens.get("default_browser_return_url")?.string()?,
            allowed_return_urls: lens.get("allowed_return_urls")?.strings()?,
            methods: lens.get("methods")?.object()?,
            flows: lens.get("flows")?.object()?,
        })
    }
}

impl ToRemote for SelfService {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("default_browser_return_url", &self.default_browser_return_url)
            .strings("allowed_return_urls", &self.allowed_return_urls)
            .object("methods", &self.methods)
            .object("flows", &self.flows)
            .build()
    }
}

// Methods

/// `selfservice.methods`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfServiceMethods {
    /// Magic link.
    pub link: AttrValue<LinkMethod>,
    /// One-time code.
    pub code: AttrValue<CodeMethod>,
    /// Password.
    pub password: AttrValue<PasswordMethod>,
    /// Time-based one-time password.
    pub totp: AttrValue<TotpMethod>,
    /// Recovery codes.
    pub lookup_secret: AttrValue<ToggleMethod>,
    /// Profile updates.
    pub profile: AttrValue<ToggleMethod>,
    /// WebAuthn.
    pub webauthn: AttrValue<WebAuthnMethod>,
    /// Social sign-in.
    pub oidc: AttrValue<OidcMethod>,
}

impl FromRemote for SelfServiceMethods {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            link: lens.get("link")?.object()?,
            code: lens.get("code")?.object()?,
            password: lens.get("password")?.object()?,
            totp: lens.get("totp")?.object()?,
            lookup_secret: lens.get("lookup_secret")?.object()?,
            profile: lens.get("profile")?.object()?,
            webauthn: lens.get("webauthn")?.object()?,
            oidc: lens.get("oidc")?.object()?,
        })
    }
}

impl ToRemote for SelfServiceMethods {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .object("link", &self.link)
            .object("code", &self.code)
            .object("password", &self.password)
            .object("totp", &self.totp)
            .object("lookup_secret", &self.lookup_secret)
            .object("profile", &self.profile)
            .object("webauthn", &self.webauthn)
            .object("oidc", &self.oidc)
            .build()
    }
}

/// A method with only an `enabled` switch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
}

impl FromRemote for ToggleMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
        })
    }
}

impl ToRemote for ToggleMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new().flag("enabled", &self.enabled).build()
    }
}

/// `methods.link`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Method settings.
    pub config: AttrValue<LinkMethodConfig>,
}

/// `methods.link.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkMethodConfig {
    /// How long a link stays valid, e.g. `15m0s`.
    pub lifespan: AttrValue<String>,
    /// Base URL used in links.
    pub base_url: AttrValue<String>,
}

impl FromRemote for LinkMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for LinkMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for LinkMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            lifespan: lens.get("lifespan")?.string()?,
            base_url: lens.get("base_url")?.string()?,
        })
    }
}

impl ToRemote for LinkMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("lifespan", &self.lifespan)
            .string("base_url", &self.base_url)
            .build()
    }
}

/// `methods.code`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Whether codes can be used to sign in without a password.
    pub passwordless_enabled: AttrValue<bool>,
    /// Method settings.
    pub config: AttrValue<CodeMethodConfig>,
}

/// `methods.code.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeMethodConfig {
    /// How long a code stays valid.
    pub lifespan: AttrValue<String>,
}

impl FromRemote for CodeMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            passwordless_enabled: lens.get("passwordless_enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for CodeMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .flag("passwordless_enabled", &self.passwordless_enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for CodeMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            lifespan: lens.get("lifespan")?.string()?,
        })
    }
}

impl ToRemote for CodeMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("lifespan", &self.lifespan)
            .build()
    }
}

/// `methods.password`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Password policy.
    pub config: AttrValue<PasswordMethodConfig>,
}

/// `methods.password.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordMethodConfig {
    /// Check passwords against known breaches.
    pub haveibeenpwned_enabled: AttrValue<bool>,
    /// Breaches a password may appear in before it is rejected.
    pub max_breaches: AttrValue<i64>,
    /// Accept passwords when the breach check cannot be reached.
    pub ignore_network_errors: AttrValue<bool>,
    /// Minimum password length.
    pub min_password_length: AttrValue<i64>,
    /// Reject passwords too similar to the identifier.
    pub identifier_similarity_check_enabled: AttrValue<bool>,
}

impl FromRemote for PasswordMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for PasswordMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for PasswordMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            haveibeenpwned_enabled: lens.get("haveibeenpwned_enabled")?.flag()?,
            max_breaches: lens.get("max_breaches")?.int()?,
            ignore_network_errors: lens.get("ignore_network_errors")?.flag()?,
            min_password_length: lens.get("min_password_length")?.int()?,
            identifier_similarity_check_enabled: lens
                .get("identifier_similarity_check_enabled")?
                .flag()?,
        })
    }
}

impl ToRemote for PasswordMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("haveibeenpwned_enabled", &self.haveibeenpwned_enabled)
            .int("max_breaches", &self.max_breaches)
            .flag("ignore_network_errors", &self.ignore_network_errors)
            .int("min_password_length", &self.min_password_length)
            .flag(
                "identifier_similarity_check_enabled",
                &self.identifier_similarity_check_enabled,
            )
            .build()
    }
}

/// `methods.totp`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Method settings.
    pub config: AttrValue<TotpMethodConfig>,
}

/// `methods.totp.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpMethodConfig {
    /// Issuer shown in authenticator apps.
    pub issuer: AttrValue<String>,
}

impl FromRemote for TotpMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for TotpMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for TotpMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            issuer: lens.get("issuer")?.string()?,
        })
    }
}

impl ToRemote for TotpMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new().string("issuer", &self.issuer).build()
    }
}

/// `methods.webauthn`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebAuthnMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Method settings.
    pub config: AttrValue<WebAuthnMethodConfig>,
}

/// `methods.webauthn.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebAuthnMethodConfig {
    /// Allow passkey sign-in without a password.
    pub passwordless: AttrValue<bool>,
    /// Relying party.
    pub rp: AttrValue<RelyingParty>,
}

/// `methods.webauthn.config.rp`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelyingParty {
    /// Relying party id, usually the domain.
    pub id: AttrValue<String>,
    /// Name shown to users.
    pub display_name: AttrValue<String>,
}

impl FromRemote for WebAuthnMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for WebAuthnMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for WebAuthnMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            passwordless: lens.get("passwordless")?.flag()?,
            rp: lens.get("rp")?.object()?,
        })
    }
}

impl ToRemote for WebAuthnMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("passwordless", &self.passwordless)
            .object("rp", &self.rp)
            .build()
    }
}

impl FromRemote for RelyingParty {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: lens.get("id")?.string()?,
            display_name: lens.get("display_name")?.string()?,
        })
    }
}

impl ToRemote for RelyingParty {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("id", &self.id)
            .string("display_name", &self.display_name)
            .build()
    }
}

/// `methods.oidc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcMethod {
    /// Whether the method is enabled.
    pub enabled: AttrValue<bool>,
    /// Method settings.
    pub config: AttrValue<OidcMethodConfig>,
}

/// `methods.oidc.config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcMethodConfig {
    /// Base of the redirect URIs registered with providers.
    pub base_redirect_uri: AttrValue<String>,
    /// Configured social sign-in providers.
    pub providers: AttrValue<Vec<OidcProvider>>,
}

/// One social sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcProvider {
    /// Provider id used in callback URLs.
    pub id: AttrValue<String>,
    /// Provider kind, e.g. `google` or `generic`.
    pub provider: AttrValue<String>,
    /// OAuth2 client id.
    pub client_id: AttrValue<String>,
    /// Jsonnet claims mapper.
    pub mapper_url: AttrValue<String>,
    /// OAuth2 client secret.
    pub client_secret: AttrValue<String>,
    /// Issuer for generic providers.
    pub issuer_url: AttrValue<String>,
    /// Authorization endpoint for generic providers.
    pub auth_url: AttrValue<String>,
    /// Token endpoint for generic providers.
    pub token_url: AttrValue<String>,
    /// Requested scopes.
    pub scope: AttrValue<Vec<String>>,
    /// Azure AD tenant.
    pub microsoft_tenant: AttrValue<String>,
    /// Where the subject id comes from.
    pub subject_source: AttrValue<String>,
    /// Apple developer team id.
    pub apple_team_id: AttrValue<String>,
    /// Apple private key id.
    pub apple_private_key_id: AttrValue<String>,
    /// Apple private key.
    pub apple_private_key: AttrValue<String>,
    /// Requested claims.
    pub requested_claims: AttrValue<RequestedClaims>,
    /// Organization the provider is scoped to.
    pub organization_id: AttrValue<String>,
    /// Button label.
    pub label: AttrValue<String>,
    /// Extra audiences accepted in ID tokens.
    pub additional_id_token_audiences: AttrValue<Vec<String>>,
}

/// `providers[].requested_claims`.
///
/// Remotely `id_token` is an object keyed by claim name; declaratively it
/// is the sorted list of those names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedClaims {
    /// Claims requested in the ID token.
    pub id_token: AttrValue<Vec<String>>,
}

impl FromRemote for OidcMethod {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: lens.get("enabled")?.flag()?,
            config: lens.get("config")?.object()?,
        })
    }
}

impl ToRemote for OidcMethod {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("enabled", &self.enabled)
            .object("config", &self.config)
            .build()
    }
}

impl FromRemote for OidcMethodConfig {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            base_redirect_uri: lens.get("base_redirect_uri")?.string()?,
            providers: lens.get("providers")?.objects()?,
        })
    }
}

impl ToRemote for OidcMethodConfig {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("base_redirect_uri", &self.base_redirect_uri)
            .objects("providers", &self.providers)
            .build()
    }
}

impl FromRemote for OidcProvider {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: lens.get("id")?.string()?,
            provider: lens.get("provider")?.string()?,
            client_id: lens.get("client_id")?.string()?,
            mapper_url: lens.get("mapper_url")?.string()?,
            client_secret: lens.get("client_secret")?.string()?,
            issuer_url: lens.get("issuer_url")?.string()?,
            auth_url: lens.get("auth_url")?.string()?,
            token_url: lens.get("token_url")?.string()?,
            scope: lens.get("scope")?.strings()?,
            microsoft_tenant: lens.get("microsoft_tenant")?.string()?,
            subject_source: lens.get("subject_source")?.string()?,
            apple_team_id: lens.get("apple_team_id")?.string()?,
            apple_private_key_id: lens.get("apple_private_key_id")?.string()?,
            apple_private_key: lens.get("apple_private_key")?.string()?,
            requested_claims: lens.get("requested_claims")?.object()?,
            organization_id: lens.get("organization_id")?.string()?,
            label: lens.get("label")?.string()?,
            additional_id_token_audiences: lens.get("additional_id_token_audiences")?.strings()?,
        })
    }
}

impl ToRemote for OidcProvider {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("id", &self.id)
            .string("provider", &self.provider)
            .string("client_id", &self.client_id)
            .string("mapper_url", &self.mapper_url)
            .string("client_secret", &self.client_secret)
            .string("issuer_url", &self.issuer_url)
            .string("auth_url", &self.auth_url)
            .string("token_url", &self.token_url)
            .strings("scope", &self.scope)
            .string("microsoft_tenant", &self.microsoft_tenant)
            .string("subject_source", &self.subject_source)
            .string("apple_team_id", &self.apple_team_id)
            .string("apple_private_key_id", &self.apple_private_key_id)
            .string("apple_private_key", &self.apple_private_key)
            .object("requested_claims", &self.requested_claims)
            .string("organization_id", &self.organization_id)
            .string("label", &self.label)
            .strings(
                "additional_id_token_audiences",
                &self.additional_id_token_audiences,
            )
            .build()
    }
}

impl FromRemote for RequestedClaims {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id_token: lens.get("id_token")?.keys()?,
        })
    }
}

impl ToRemote for RequestedClaims {
    fn to_remote(&self) -> Map<String, Json> {
        let claims: Map<String, Json> = self
            .id_token
            .known_or_default()
            .into_iter()
            .map(|claim| (claim, Json::Object(Map::new())))
            .collect();
        RemoteObject::new()
            .raw("id_token", Json::Object(claims))
            .build()
    }
}

// Flows

/// `selfservice.flows`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfServiceFlows {
    /// Logout.
    pub logout: AttrValue<LogoutFlow>,
    /// Error page.
    pub error: AttrValue<ErrorFlow>,
    /// Registration.
    pub registration: AttrValue<RegistrationFlow>,
    /// Login.
    pub login: AttrValue<LoginFlow>,
    /// Address verification.
    pub verification: AttrValue<VerificationFlow>,
    /// Account recovery.
    pub recovery: AttrValue<RecoveryFlow>,
    /// Account settings.
    pub settings: AttrValue<SettingsFlow>,
}

impl FromRemote for SelfServiceFlows {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            logout: lens.get("logout")?.object()?,
            error: lens.get("error")?.object()?,
            registration: lens.get("registration")?.object()?,
            login: lens.get("login")?.object()?,
            verification: lens.get("verification")?.object()?,
            recovery: lens.get("recovery")?.object()?,
            settings: lens.get("settings")?.object()?,
        })
    }
}

impl ToRemote for SelfServiceFlows {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .object("logout", &self.logout)
            .object("error", &self.error)
            .object("registration", &self.registration)
            .object("login", &self.login)
            .object("verification", &self.verification)
            .object("recovery", &self.recovery)
            .object("settings", &self.settings)
            .build()
    }
}

/// `flows.logout`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutFlow {
    /// What happens after logout.
    pub after: AttrValue<LogoutAfter>,
}

/// `flows.logout.after`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutAfter {
    /// Where browsers land after logout.
    pub default_browser_return_url: AttrValue<String>,
}

impl FromRemote for LogoutFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            after: lens.get("after")?.object()?,
        })
    }
}

impl ToRemote for LogoutFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new().object("after", &self.after).build()
    }
}

impl FromRemote for LogoutAfter {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            default_browser_return_url: lens.get("default_browser_return_url")?.string()?,
        })
    }
}

impl ToRemote for LogoutAfter {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("default_browser_return_url", &self.default_browser_return_url)
            .build()
    }
}

/// `flows.error`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorFlow {
    /// Error page URL.
    pub ui_url: AttrValue<String>,
}

impl FromRemote for ErrorFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ui_url: lens.get("ui_url")?.string()?,
        })
    }
}

impl ToRemote for ErrorFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new().string("ui_url", &self.ui_url).build()
    }
}

/// `flows.registration`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationFlow {
    /// Suggest sign-in methods when an account already exists.
    pub login_hints: AttrValue<bool>,
    /// Registration page URL.
    pub ui_url: AttrValue<String>,
    /// How long a flow stays valid.
    pub lifespan: AttrValue<String>,
    /// Whether registration is open.
    pub enabled: AttrValue<bool>,
}

impl FromRemote for RegistrationFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            login_hints: lens.get("login_hints")?.flag()?,
            ui_url: lens.get("ui_url")?.string()?,
            lifespan: lens.get("lifespan")?.string()?,
            enabled: lens.get("enabled")?.flag()?,
        })
    }
}

impl ToRemote for RegistrationFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .flag("login_hints", &self.login_hints)
            .string("ui_url", &self.ui_url)
            .string("lifespan", &self.lifespan)
            .flag("enabled", &self.enabled)
            .build()
    }
}

/// `flows.login`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginFlow {
    /// Login page URL.
    pub ui_url: AttrValue<String>,
    /// How long a flow stays valid.
    pub lifespan: AttrValue<String>,
}

impl FromRemote for LoginFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ui_url: lens.get("ui_url")?.string()?,
            lifespan: lens.get("lifespan")?.string()?,
        })
    }
}

impl ToRemote for LoginFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("ui_url", &self.ui_url)
            .string("lifespan", &self.lifespan)
            .build()
    }
}

/// `flows.verification`; `flows.recovery` has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationFlow {
    /// Flow page URL.
    pub ui_url: AttrValue<String>,
    /// How long a flow stays valid.
    pub lifespan: AttrValue<String>,
    /// Strategy, `code` or `link`.
    #[serde(rename = "use")]
    pub use_strategy: AttrValue<String>,
    /// Send messages to addresses without an account.
    pub notify_unknown_recipients: AttrValue<bool>,
    /// Whether the flow is enabled.
    pub enabled: AttrValue<bool>,
}

/// `flows.recovery`.
pub type RecoveryFlow = VerificationFlow;

impl FromRemote for VerificationFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ui_url: lens.get("ui_url")?.string()?,
            lifespan: lens.get("lifespan")?.string()?,
            use_strategy: lens.get("use")?.string()?,
            notify_unknown_recipients: lens.get("notify_unknown_recipients")?.flag()?,
            enabled: lens.get("enabled")?.flag()?,
        })
    }
}

impl ToRemote for VerificationFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("ui_url", &self.ui_url)
            .string("lifespan", &self.lifespan)
            .string("use", &self.use_strategy)
            .flag("notify_unknown_recipients", &self.notify_unknown_recipients)
            .flag("enabled", &self.enabled)
            .build()
    }
}

/// `flows.settings`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFlow {
    /// Settings page URL.
    pub ui_url: AttrValue<String>,
    /// How long a flow stays valid.
    pub lifespan: AttrValue<String>,
    /// How long after login sensitive settings may change without re-auth.
    pub privileged_session_max_age: AttrValue<String>,
    /// Authenticator assurance level required, e.g. `highest_available`.
    pub required_aal: AttrValue<String>,
}

impl FromRemote for SettingsFlow {
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ui_url: lens.get("ui_url")?.string()?,
            lifespan: lens.get("lifespan")?.string()?,
            privileged_session_max_age: lens.get("privileged_session_max_age")?.string()?,
            required_aal: lens.get("required_aal")?.string()?,
        })
    }
}

impl ToRemote for SettingsFlow {
    fn to_remote(&self) -> Map<String, Json> {
        RemoteObject::new()
            .string("ui_url", &self.ui_url)
            .string("lifespan", &self.lifespan)
            .string("privileged_session_max_age", &self.privileged_session_max_age)
            .string("required_aal", &self.required_aal)
            .build()
    }
}
