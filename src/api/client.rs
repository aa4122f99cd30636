//! HTTP implementation of [`ProjectApi`] backed by `reqwest`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::models::{LoginFlow, LoginSuccess, PasswordLogin};
use super::{ApiError, ApiProject, CreateProjectBody, ProjectApi, SetProject, SetProjectResponse};
use crate::config::ProviderConfig;
use crate::models::{FromRemote, Lens};

const USER_AGENT: &str = concat!("orynetwork-provider/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct Credentials {
    email: String,
    password: String,
}

/// Client for the Ory Network console API.
///
/// Project calls go to the API endpoint with the session token as bearer.
/// The session is obtained through a native password login flow on the
/// console endpoint. When a project call is rejected with `401` the client
/// signs in again with the stored credentials and retries that call once.
pub struct OryNetworkClient {
    http: Client,
    api_url: Url,
    console_url: Url,
    credentials: RwLock<Option<Credentials>>,
    session_token: RwLock<Option<String>>,
}

impl fmt::Debug for OryNetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OryNetworkClient")
            .field("api_url", &self.api_url.as_str())
            .field("console_url", &self.console_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OryNetworkClient {
    /// Create a client for the given API and console endpoints.
    pub fn new(api_url: Url, console_url: Url) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            api_url,
            console_url,
            credentials: RwLock::new(None),
            session_token: RwLock::new(None),
        })
    }

    /// Create a client for the endpoints of a resolved provider config.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), config.console_url.clone())
    }

    /// Use an existing session token instead of signing in.
    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        Self {
            session_token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    /// Sign in with email and password and keep the session token.
    ///
    /// The credentials are remembered so the session can be renewed.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        *self.credentials.write().await = Some(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.renew_session().await.map(|_| ())
    }

    async fn renew_session(&self) -> Result<String, ApiError> {
        let credentials = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(ApiError::NotSignedIn)?;

        let flow_url = endpoint(&self.console_url, &["self-service", "login", "api"])?;
        let response = self
            .send(Method::GET, &flow_url, None::<&()>, None)
            .await?;
        let flow: LoginFlow = read_json(&Method::GET, &flow_url, response).await?;
        debug!(flow_id = %flow.id, "Created native login flow");

        let mut login_url = endpoint(&self.console_url, &["self-service", "login"])?;
        login_url.query_pairs_mut().append_pair("flow", &flow.id);
        let body = PasswordLogin {
            method: "password",
            identifier: &credentials.email,
            password: &credentials.password,
        };
        let response = self
            .send(Method::POST, &login_url, Some(&body), None)
            .await?;
        let success: LoginSuccess = read_json(&Method::POST, &login_url, response).await?;

        *self.session_token.write().await = Some(success.session_token.clone());
        info!("Signed in to Ory Network");
        Ok(success.session_token)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, url = %url, "Sending request");
        request.send().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })
    }

    async fn authorized<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let token = self.session_token.read().await.clone();
        let response = self
            .send(method.clone(), url, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || self.credentials.read().await.is_none()
        {
            return Ok(response);
        }

        warn!(method = %method, url = %url, "Session rejected, signing in again");
        let token = self.renew_session().await?;
        self.send(method, url, body, Some(&token)).await
    }

    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let response = self.authorized(method.clone(), &url, body).await?;
        read_json(&method, &url, response).await
    }

    /// Like `call`, decoding the payload with its key paths tracked.
    async fn call_remote<T: FromRemote, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let document: Json = self.call(method.clone(), url.clone(), body).await?;
        T::from_remote(&Lens::root(&document)).map_err(|source| ApiError::Decode {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })
    }
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_text(method: &Method, url: &Url, response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        return Err(ApiError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(
    method: &Method,
    url: &Url,
    response: Response,
) -> Result<T, ApiError> {
    let body = read_text(method, url, response).await?;
    serde_json::from_str(&body).map_err(|source| ApiError::InvalidBody {
        method: method.to_string(),
        url: url.to_string(),
        body,
        source,
    })
}

#[async_trait]
impl ProjectApi for OryNetworkClient {
    #[instrument(skip(self, body), fields(name = %body.name))]
    async fn create_project(&self, body: &CreateProjectBody) -> Result<ApiProject, ApiError> {
        let url = endpoint(&self.api_url, &["projects"])?;
        self.call_remote(Method::POST, url, Some(body)).await
    }

    #[instrument(skip(self))]
    async fn get_project(&self, id: &str) -> Result<ApiProject, ApiError> {
        let url = endpoint(&self.api_url, &["projects", id])?;
        self.call_remote(Method::GET, url, None::<&()>).await
    }

    #[instrument(skip(self, body))]
    async fn set_project(
        &self,
        id: &str,
        body: &SetProject,
    ) -> Result<SetProjectResponse, ApiError> {
        let url = endpoint(&self.api_url, &["projects", id])?;
        let response: SetProjectResponse = self.call_remote(Method::PUT, url, Some(body)).await?;
        for warning in &response.warnings {
            warn!(project_id = %id, message = %warning.message, "Project configuration warning");
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn purge_project(&self, id: &str) -> Result<(), ApiError> {
        let url = endpoint(&self.api_url, &["projects", id])?;
        let response = self.authorized(Method::DELETE, &url, None::<&()>).await?;
        read_text(&Method::DELETE, &url, response).await.map(|_| ())
    }
}
