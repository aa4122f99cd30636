//! Project lifecycle against the in-memory Ory Network.

use std::sync::Arc;

use serde_json::{json, Value};

use orynetwork_provider::service::ProviderServer;
use orynetwork_provider::testing::{
    assert_attr, assert_error_contains, assert_plan_changes_attribute, assert_plan_creates,
    assert_plan_no_changes, assert_plan_replaces, assert_plan_updates_in_place, attr_at,
    FakeCall, FakeProjectApi, ProviderTester,
};
use orynetwork_provider::{OryNetworkProvider, ProviderError, UNKNOWN_VALUE};

const PROJECT: &str = "orynetwork_project";

fn setup() -> (Arc<FakeProjectApi>, ProviderTester<OryNetworkProvider>) {
    let api = Arc::new(FakeProjectApi::new());
    let tester = ProviderTester::new(OryNetworkProvider::with_client(api.clone()));
    (api, tester)
}

async fn assert_settled(tester: &ProviderTester<OryNetworkProvider>, state: &Value, config: Value) {
    let plan = tester
        .plan_update(PROJECT, state.clone(), config)
        .await
        .unwrap();
    assert_plan_no_changes(&plan);
    assert_eq!(&plan.planned_state, state);
}

fn with_namespaces(namespaces: Value) -> Value {
    json!({
        "name": "Test",
        "services": {"permission": {"config": {"namespaces": namespaces}}}
    })
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_without_services_uses_server_defaults() {
    let (_, tester) = setup();

    let state = tester
        .lifecycle_create(PROJECT, json!({"name": "Test"}))
        .await
        .unwrap();

    assert_attr(&state, "name", json!("Test"));
    assert_attr(&state, "state", json!("running"));
    assert_attr(&state, "services.permission.config.namespaces", json!([]));
    assert_attr(
        &state,
        "services.identity.config.identity.default_schema_id",
        json!("preset://username"),
    );
    assert_attr(
        &state,
        "services.identity.config.identity.schemas.0.id",
        json!("preset://username"),
    );
    assert_attr(
        &state,
        "services.identity.config.selfservice.methods.password.config.min_password_length",
        json!(8),
    );
    assert_attr(
        &state,
        "services.oauth2.config",
        json!(r#"{"ttl":{"access_token":"1h0m0s"}}"#),
    );
    assert_attr(&state, "cors_admin", json!({"enabled": false, "origins": []}));
    assert_settled(&tester, &state, json!({"name": "Test"})).await;
}

#[tokio::test]
async fn test_create_with_namespaces_and_cors() {
    let (api, tester) = setup();
    let mut config = with_namespaces(json!([{"id": 1, "name": "Test"}]));
    config["cors_admin"] = json!({"enabled": true, "origins": ["https://google.com"]});

    let state = tester.lifecycle_create(PROJECT, config.clone()).await.unwrap();
    assert_settled(&tester, &state, config).await;

    assert_attr(
        &state,
        "services.permission.config.namespaces",
        json!([{"id": 1, "name": "Test"}]),
    );
    assert_attr(
        &state,
        "cors_admin",
        json!({"enabled": true, "origins": ["https://google.com"]}),
    );
    assert_attr(&state, "cors_public", json!({"enabled": false, "origins": []}));
    assert_attr(
        &state,
        "services.identity.config.identity.default_schema_id",
        json!("preset://username"),
    );

    let id = state["id"].as_str().unwrap();
    let stored = api.project(id).await.unwrap();
    assert!(stored.services.oauth2.is_some());
}

#[tokio::test]
async fn test_create_in_workspace() {
    let (api, tester) = setup();

    let state = tester
        .lifecycle_create(PROJECT, json!({"name": "Test", "workspace_id": "ws-1"}))
        .await
        .unwrap();

    assert_attr(&state, "workspace_id", json!("ws-1"));
    assert_settled(&tester, &state, json!({"name": "Test", "workspace_id": "ws-1"})).await;
    let stored = api.project(state["id"].as_str().unwrap()).await.unwrap();
    assert_eq!(stored.workspace_id.as_deref(), Some("ws-1"));
}

#[tokio::test]
async fn test_plan_create() {
    let (_, tester) = setup();

    let plan = tester
        .plan_create(PROJECT, json!({"name": "Test"}))
        .await
        .unwrap();

    assert_plan_creates(&plan);
    assert_plan_changes_attribute(&plan, "id");
    assert_eq!(plan.planned_state["services"], UNKNOWN_VALUE);
    assert_eq!(plan.planned_state["cors_public"], UNKNOWN_VALUE);
}

#[tokio::test]
async fn test_create_fails_before_project_exists() {
    let (api, tester) = setup();
    api.fail_next(FakeCall::Create, 400).await;

    let err = tester
        .create(PROJECT, json!({"name": "Test"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Client(_)));
    assert!(err.persisted_state().is_none());
}

#[tokio::test]
async fn test_create_keeps_state_when_configuration_fails() {
    let (api, tester) = setup();
    api.fail_next(FakeCall::Set, 500).await;

    let err = tester
        .create(PROJECT, with_namespaces(json!([{"id": 1, "name": "Test"}])))
        .await
        .unwrap_err();

    let state = err.persisted_state().cloned().unwrap();
    assert!(matches!(err, ProviderError::PartiallyCreated { .. }));
    assert!(err.to_string().contains("re-apply"));
    assert!(err.to_string().contains("injected failure"));
    // Still the server defaults, not the configured namespaces
    assert_attr(&state, "services.permission.config.namespaces", json!([]));

    let id = state["id"].as_str().unwrap();
    assert!(api.project(id).await.is_some());

    // Applying again finishes the configuration
    let plan = tester
        .plan_update(
            PROJECT,
            state.clone(),
            with_namespaces(json!([{"id": 1, "name": "Test"}])),
        )
        .await
        .unwrap();
    assert_plan_updates_in_place(&plan);
    let updated = tester
        .update(PROJECT, state, plan.planned_state)
        .await
        .unwrap();
    assert_attr(
        &updated,
        "services.permission.config.namespaces",
        json!([{"id": 1, "name": "Test"}]),
    );
}

#[tokio::test]
async fn test_server_reports_partial_create_state() {
    let api = Arc::new(FakeProjectApi::new());
    let server = ProviderServer::new(OryNetworkProvider::with_client(api.clone()));
    api.fail_next(FakeCall::Get, 503).await;

    let response = server.create(PROJECT, json!({"name": "Test"})).await;

    let state = response.state.unwrap();
    assert_attr(&state, "name", json!("Test"));
    assert!(attr_at(&state, "id").and_then(Value::as_str).is_some());
    assert_error_contains(&response.diagnostics, "Update Error");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_appends_namespace() {
    let (_, tester) = setup();

    let state = tester
        .lifecycle_create(PROJECT, with_namespaces(json!([{"id": 1, "name": "Test"}])))
        .await
        .unwrap();

    let config = with_namespaces(json!([{"id": 1, "name": "Test"}, {"id": 2, "name": "Test2"}]));
    let updated = tester
        .lifecycle_update(PROJECT, state.clone(), config.clone())
        .await
        .unwrap();

    assert_attr(
        &updated,
        "services.permission.config.namespaces",
        json!([{"id": 1, "name": "Test"}, {"id": 2, "name": "Test2"}]),
    );
    assert_attr(&updated, "id", state["id"].clone());
    assert_ne!(updated["revision_id"], state["revision_id"]);
    // Left out of the configuration, so kept from the prior state
    assert_attr(
        &updated,
        "services.identity.config.identity.default_schema_id",
        json!("preset://username"),
    );
    assert_settled(&tester, &updated, config).await;
}

#[tokio::test]
async fn test_update_disables_cors() {
    let (_, tester) = setup();

    let state = tester
        .lifecycle_create(
            PROJECT,
            json!({
                "name": "Test",
                "cors_public": {"enabled": true, "origins": ["https://example.org", "https://example.com"]}
            }),
        )
        .await
        .unwrap();
    assert_attr(&state, "cors_public.origins.1", json!("https://example.com"));

    let config = json!({"name": "Test", "cors_public": {"enabled": false}});
    let plan = tester
        .plan_update(PROJECT, state.clone(), config.clone())
        .await
        .unwrap();
    assert_attr(&plan.planned_state, "cors_public.origins", json!(UNKNOWN_VALUE));

    let updated = tester
        .lifecycle_update(PROJECT, state, config.clone())
        .await
        .unwrap();

    assert_attr(&updated, "cors_public", json!({"enabled": false, "origins": []}));
    assert_settled(&tester, &updated, config).await;
}

#[tokio::test]
async fn test_partial_cors_settles() {
    let (_, tester) = setup();
    let config = json!({"name": "Test", "cors_admin": {"enabled": true}});

    let state = tester.lifecycle_create(PROJECT, config.clone()).await.unwrap();

    assert_attr(&state, "cors_admin", json!({"enabled": true, "origins": []}));
    assert_settled(&tester, &state, config).await;
}

#[tokio::test]
async fn test_partial_identity_settles() {
    let (_, tester) = setup();
    let config = json!({
        "name": "Test",
        "services": {"identity": {"config": {"selfservice": {"methods": {"totp": {"enabled": true}}}}}}
    });

    let state = tester.lifecycle_create(PROJECT, config.clone()).await.unwrap();

    assert_attr(
        &state,
        "services.identity.config.selfservice.methods.totp.enabled",
        json!(true),
    );
    assert_settled(&tester, &state, config).await;

    // Changing one leaf plans only that change
    let config = json!({
        "name": "Test",
        "services": {"identity": {"config": {"selfservice": {"methods": {"totp": {"enabled": false}}}}}}
    });
    let updated = tester
        .lifecycle_update(PROJECT, state, config.clone())
        .await
        .unwrap();
    assert_attr(
        &updated,
        "services.identity.config.selfservice.methods.totp.enabled",
        json!(false),
    );
    assert_settled(&tester, &updated, config).await;
}

#[tokio::test]
async fn test_formatted_oauth2_document_settles() {
    let (_, tester) = setup();
    let config = json!({
        "name": "Test",
        "services": {"oauth2": {"config": "{\n  \"ttl\": {\"access_token\": \"2h\"}\n}"}}
    });

    let state = tester.lifecycle_create(PROJECT, config.clone()).await.unwrap();

    assert_attr(
        &state,
        "services.oauth2.config",
        json!(r#"{"ttl":{"access_token":"2h"}}"#),
    );
    assert_settled(&tester, &state, config).await;
}

#[tokio::test]
async fn test_plan_update_without_changes() {
    let (_, tester) = setup();
    let state = tester
        .lifecycle_create(PROJECT, json!({"name": "Test"}))
        .await
        .unwrap();

    let plan = tester
        .plan_update(PROJECT, state.clone(), json!({"name": "Test"}))
        .await
        .unwrap();

    assert_plan_no_changes(&plan);
    assert_eq!(plan.planned_state, state);
}

#[tokio::test]
async fn test_plan_workspace_change_replaces() {
    let (_, tester) = setup();
    let state = tester
        .lifecycle_create(PROJECT, json!({"name": "Test", "workspace_id": "ws-1"}))
        .await
        .unwrap();

    let plan = tester
        .plan_update(PROJECT, state, json!({"name": "Test", "workspace_id": "ws-2"}))
        .await
        .unwrap();

    assert_plan_replaces(&plan);
    assert_plan_changes_attribute(&plan, "workspace_id");
}

// =============================================================================
// Read, Import, Delete
// =============================================================================

#[tokio::test]
async fn test_import_reads_full_state() {
    let (_, tester) = setup();
    let state = tester
        .lifecycle_create(PROJECT, with_namespaces(json!([{"id": 3, "name": "Docs"}])))
        .await
        .unwrap();
    let id = state["id"].as_str().unwrap();

    let imported = tester.import_resource(PROJECT, id).await.unwrap();

    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, PROJECT);
    assert_eq!(imported[0].state, state);
}

#[tokio::test]
async fn test_read_requires_id() {
    let (_, tester) = setup();

    let err = tester.read(PROJECT, json!({"name": "Test"})).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Validation error: project ID must be set and a known value"
    );
}

#[tokio::test]
async fn test_read_missing_project() {
    let (_, tester) = setup();

    let err = tester
        .read(PROJECT, json!({"id": "gone"}))
        .await
        .unwrap_err();

    assert_eq!(err.summary(), "Client Error");
    assert!(err.to_string().contains("project not found"));
}

#[tokio::test]
async fn test_delete_purges_project() {
    let (api, tester) = setup();
    let state = tester
        .lifecycle_create(PROJECT, json!({"name": "Test"}))
        .await
        .unwrap();
    let id = state["id"].as_str().unwrap().to_string();

    tester.lifecycle_delete(PROJECT, state).await.unwrap();

    assert!(api.project(&id).await.is_none());
    assert!(api.calls().await.contains(&format!("DELETE /projects/{}", id)));
}

// =============================================================================
// Data Source
// =============================================================================

#[tokio::test]
async fn test_data_source_reads_project() {
    let (_, tester) = setup();
    let state = tester
        .lifecycle_create(PROJECT, with_namespaces(json!([{"id": 1, "name": "Test"}])))
        .await
        .unwrap();

    tester
        .validate_data_source_config(PROJECT, json!({"id": state["id"]}))
        .await
        .unwrap();
    let data = tester
        .read_data_source(PROJECT, json!({"id": state["id"]}))
        .await
        .unwrap();

    assert_eq!(data, state);
}

#[tokio::test]
async fn test_data_source_requires_id() {
    let (_, tester) = setup();

    assert!(tester
        .validate_data_source_config(PROJECT, json!({}))
        .await
        .is_err());
    let err = tester
        .read_data_source(PROJECT, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Validation(_)));
}
