//! Test support for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] through the same
//! operation sequences the orchestrating framework uses, and
//! [`FakeProjectApi`] is an in-memory Ory Network that behaves like the real
//! project API: creation fills server defaults and set-project replaces the
//! whole configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orynetwork_provider::provider::OryNetworkProvider;
//! use orynetwork_provider::testing::{assert_attr, FakeProjectApi, ProviderTester};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_project() {
//!     let api = Arc::new(FakeProjectApi::new());
//!     let tester = ProviderTester::new(OryNetworkProvider::with_client(api));
//!
//!     let state = tester
//!         .lifecycle_create("orynetwork_project", json!({"name": "Test"}))
//!         .await
//!         .unwrap();
//!
//!     assert_attr(&state, "services.permission.config.namespaces", json!([]));
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::api::{
    ApiError, ApiProject, ApiProjectCors, ApiProjectServices, ApiServiceConfig,
    CreateProjectBody, ProjectApi, SetProject, SetProjectResponse,
};
use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Drives a provider through framework operations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate provider configuration; error diagnostics become `Err`.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider; error diagnostics become `Err`.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration; error diagnostics become `Err`.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a creation from `config`.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan an update of `prior_state` to `config`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), config.clone(), config)
            .await
    }

    /// Plan the deletion of `prior_state`.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a resource from a planned state.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update a resource to a planned state.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Validate a data source configuration; error diagnostics become `Err`.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Plan, create, then read back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Plan, update, then read back.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// Plan the deletion, then delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// Create, update and delete; returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone())
            .await?;
        Ok(updated)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// State and Plan Assertions
// =========================================================================

/// Look up a dotted path in a state; list items are addressed by index.
///
/// `attr_at(&state, "services.identity.config.identity.schemas.0.id")`
pub fn attr_at<'a>(state: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(state, |value, segment| match value {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => value.get(segment),
    })
}

/// Assert that the state has `expected` at `path`.
///
/// # Panics
///
/// Panics if the path is missing or holds another value.
pub fn assert_attr(state: &Value, path: &str, expected: Value) {
    match attr_at(state, path) {
        Some(actual) => assert_eq!(
            actual, &expected,
            "Unexpected value at '{}'",
            path
        ),
        None => panic!("Expected a value at '{}', but the path does not exist", path),
    }
}

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan changes the top-level attribute `path`.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error whose summary contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

// =========================================================================
// In-memory Project API
// =========================================================================

/// Calls of [`FakeProjectApi`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCall {
    /// `POST /projects`.
    Create,
    /// `GET /projects/{id}`.
    Get,
    /// `PUT /projects/{id}`.
    Set,
    /// `DELETE /projects/{id}`.
    Purge,
}

impl FakeCall {
    fn method(self) -> &'static str {
        match self {
            Self::Create => "POST",
            Self::Get => "GET",
            Self::Set => "PUT",
            Self::Purge => "DELETE",
        }
    }
}

#[derive(Default)]
struct FakeState {
    projects: BTreeMap<String, ApiProject>,
    created: u64,
    failures: Vec<(FakeCall, u16)>,
    calls: Vec<String>,
}

impl FakeState {
    fn record(&mut self, call: FakeCall, path: &str) -> Result<(), ApiError> {
        self.calls.push(format!("{} {}", call.method(), path));
        match self.failures.iter().position(|(c, _)| *c == call) {
            Some(index) => {
                let (_, status) = self.failures.remove(index);
                Err(status_error(call, path, status, "injected failure"))
            }
            None => Ok(()),
        }
    }

    fn existing(&self, call: FakeCall, path: &str, id: &str) -> Result<ApiProject, ApiError> {
        self.projects
            .get(id)
            .cloned()
            .ok_or_else(|| status_error(call, path, 404, "project not found"))
    }
}

fn status_error(call: FakeCall, path: &str, status: u16, message: &str) -> ApiError {
    ApiError::Status {
        method: call.method().to_string(),
        url: format!("https://api.console.ory.sh{}", path),
        status,
        body: json!({"error": {"code": status, "message": message}}).to_string(),
    }
}

fn config(value: Value) -> Option<ApiServiceConfig> {
    match value {
        Value::Object(map) => Some(ApiServiceConfig::new(map)),
        _ => Some(ApiServiceConfig::new(Map::new())),
    }
}

/// An in-memory Ory Network project API.
#[derive(Default)]
pub struct FakeProjectApi {
    state: Mutex<FakeState>,
}

impl FakeProjectApi {
    /// An API without projects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Services a freshly created project starts with.
    pub fn default_services() -> ApiProjectServices {
        ApiProjectServices {
            identity: config(json!({
                "identity": {
                    "default_schema_id": "preset://username",
                    "schemas": [
                        {"id": "preset://username", "url": "base64://eyJ0eXBlIjoib2JqZWN0In0="}
                    ]
                },
                "selfservice": {
                    "default_browser_return_url": "/ui/welcome",
                    "allowed_return_urls": [],
                    "methods": {
                        "password": {
                            "enabled": true,
                            "config": {
                                "haveibeenpwned_enabled": true,
                                "max_breaches": 0,
                                "ignore_network_errors": true,
                                "min_password_length": 8,
                                "identifier_similarity_check_enabled": true
                            }
                        },
                        "profile": {"enabled": true},
                        "lookup_secret": {"enabled": false}
                    },
                    "flows": {
                        "error": {"ui_url": "/ui/error"},
                        "login": {"ui_url": "/ui/login", "lifespan": "30m0s"},
                        "registration": {
                            "enabled": true,
                            "login_hints": false,
                            "ui_url": "/ui/registration",
                            "lifespan": "30m0s"
                        }
                    }
                }
            })),
            permission: config(json!({"namespaces": []})),
            oauth2: config(json!({"ttl": {"access_token": "1h0m0s"}})),
        }
    }

    /// Make the next `call` fail with `status`.
    pub async fn fail_next(&self, call: FakeCall, status: u16) {
        self.state.lock().await.failures.push((call, status));
    }

    /// A stored project.
    pub async fn project(&self, id: &str) -> Option<ApiProject> {
        self.state.lock().await.projects.get(id).cloned()
    }

    /// Store a project as if it had been created elsewhere.
    pub async fn insert(&self, project: ApiProject) {
        self.state
            .lock()
            .await
            .projects
            .insert(project.id.clone(), project);
    }

    /// Requests received so far, as `METHOD /path`.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl ProjectApi for FakeProjectApi {
    async fn create_project(&self, body: &CreateProjectBody) -> Result<ApiProject, ApiError> {
        let mut state = self.state.lock().await;
        state.record(FakeCall::Create, "/projects")?;

        state.created += 1;
        let n = state.created;
        let project = ApiProject {
            id: format!("00000000-0000-4000-8000-{:012}", n),
            name: body.name.clone(),
            slug: format!("project-{}", n),
            revision_id: Some(format!("{}-rev-1", n)),
            state: Some("running".to_string()),
            workspace_id: body.workspace_id.clone(),
            cors_admin: Some(ApiProjectCors::default()),
            cors_public: Some(ApiProjectCors::default()),
            services: Self::default_services(),
        };
        state.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: &str) -> Result<ApiProject, ApiError> {
        let path = format!("/projects/{}", id);
        let mut state = self.state.lock().await;
        state.record(FakeCall::Get, &path)?;
        state.existing(FakeCall::Get, &path, id)
    }

    async fn set_project(
        &self,
        id: &str,
        body: &SetProject,
    ) -> Result<SetProjectResponse, ApiError> {
        let path = format!("/projects/{}", id);
        let mut state = self.state.lock().await;
        state.record(FakeCall::Set, &path)?;
        let mut project = state.existing(FakeCall::Set, &path, id)?;

        let revisions = state.calls.iter().filter(|c| c.starts_with("PUT")).count();
        project.name = body.name.clone();
        project.cors_admin = Some(body.cors_admin.clone());
        project.cors_public = Some(body.cors_public.clone());
        project.services = body.services.clone();
        project.revision_id = Some(format!("{}-rev-{}", id, revisions + 1));

        state.projects.insert(id.to_string(), project.clone());
        Ok(SetProjectResponse {
            project,
            warnings: Vec::new(),
        })
    }

    async fn purge_project(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/projects/{}", id);
        let mut state = self.state.lock().await;
        state.record(FakeCall::Purge, &path)?;
        state.existing(FakeCall::Purge, &path, id)?;
        state.projects.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OryNetworkProvider;
    use std::sync::Arc;

    const PROJECT: &str = "orynetwork_project";

    fn tester() -> (Arc<FakeProjectApi>, ProviderTester<OryNetworkProvider>) {
        let api = Arc::new(FakeProjectApi::new());
        let tester = ProviderTester::new(OryNetworkProvider::with_client(api.clone()));
        (api, tester)
    }

    #[tokio::test]
    async fn test_tester_schema() {
        let (_, tester) = tester();
        assert!(tester.schema().resources.contains_key(PROJECT));
        assert_eq!(tester.resource_types(), vec![PROJECT.to_string()]);
        assert_eq!(tester.data_source_types(), vec![PROJECT.to_string()]);
    }

    #[tokio::test]
    async fn test_tester_plan_create() {
        let (_, tester) = tester();
        let plan = tester
            .plan_create(PROJECT, json!({"name": "Test"}))
            .await
            .unwrap();

        assert_plan_creates(&plan);
        assert_plan_changes_attribute(&plan, "name");
    }

    #[tokio::test]
    async fn test_tester_lifecycle_crud() {
        let (api, tester) = tester();
        let state = tester
            .lifecycle_crud(PROJECT, json!({"name": "Initial"}), json!({"name": "Updated"}))
            .await
            .unwrap();

        assert_attr(&state, "name", json!("Updated"));
        let id = state["id"].as_str().unwrap();
        assert!(api.project(id).await.is_none());
        assert_eq!(
            api.calls().await,
            vec![
                "POST /projects".to_string(),
                format!("GET /projects/{}", id),
                format!("PUT /projects/{}", id),
                format!("GET /projects/{}", id),
                format!("PUT /projects/{}", id),
                format!("GET /projects/{}", id),
                format!("DELETE /projects/{}", id),
            ]
        );
    }

    #[tokio::test]
    async fn test_fake_fails_next_call_once() {
        let api = FakeProjectApi::new();
        api.fail_next(FakeCall::Get, 500).await;

        let err = api.get_project("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let err = api.get_project("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("project not found"));
    }

    #[test]
    fn test_attr_at() {
        let state = json!({"services": {"namespaces": [{"id": 1}, {"id": 2}]}});

        assert_eq!(attr_at(&state, "services.namespaces.1.id"), Some(&json!(2)));
        assert_eq!(attr_at(&state, "services.namespaces.2.id"), None);
        assert_eq!(attr_at(&state, "services.missing"), None);
        assert_attr(&state, "services.namespaces.0", json!({"id": 1}));
    }

    #[test]
    #[should_panic(expected = "path does not exist")]
    fn test_assert_attr_missing_path() {
        assert_attr(&json!({}), "name", json!("Test"));
    }

    #[test]
    fn test_assert_no_errors() {
        let diagnostics = vec![Diagnostic::warning("Deprecated attribute")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        let diagnostics = vec![Diagnostic::error("Missing Ory Network Email")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Invalid Ory Network Email")];
        assert_error_contains(&diagnostics, "Invalid");
        assert_error_contains(&diagnostics, "Email");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing Ory Network Email").with_attribute("email"),
            Diagnostic::error("Client Error").with_detail("GET /projects/p1 failed"),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("Missing Ory Network Email"));
        assert!(display.contains("(at email)"));
        assert!(display.contains("GET /projects/p1 failed"));
    }
}
