//! Declarative schemas of the provider, the project resource and the project
//! data source.
//!
//! The service trees are described once, with configurable leaves, and
//! turned read-only for the data source by [`computed_only`].

use std::collections::HashMap;

use crate::schema::{
    Attribute, AttributeFlags, AttributeType, AttributeValidator, Block, NestedBlock, Schema,
};

fn string() -> Attribute {
    Attribute::optional_string()
}

fn int() -> Attribute {
    Attribute::optional_int64()
}

fn flag() -> Attribute {
    Attribute::optional_bool()
}

fn strings() -> Attribute {
    Attribute::optional_string_list()
}

fn single(block: Block) -> NestedBlock {
    NestedBlock::single(block)
}

fn cors() -> Attribute {
    let mut fields = HashMap::new();
    fields.insert("enabled".to_string(), AttributeType::Bool);
    fields.insert(
        "origins".to_string(),
        AttributeType::list(AttributeType::String),
    );
    Attribute::new(AttributeType::object(fields), AttributeFlags::optional_computed())
}

fn enabled_with_config(config: Block) -> Block {
    Block::new()
        .with_attribute("enabled", flag())
        .with_block("config", single(config))
}

fn methods_block() -> Block {
    let link = enabled_with_config(
        Block::new()
            .with_attribute("lifespan", string())
            .with_attribute("base_url", string()),
    );

    let code = enabled_with_config(Block::new().with_attribute("lifespan", string()))
        .with_attribute("passwordless_enabled", flag());

    let password = enabled_with_config(
        Block::new()
            .with_attribute("haveibeenpwned_enabled", flag())
            .with_attribute("max_breaches", int())
            .with_attribute("ignore_network_errors", flag())
            .with_attribute("min_password_length", int())
            .with_attribute("identifier_similarity_check_enabled", flag()),
    );

    let totp = enabled_with_config(Block::new().with_attribute("issuer", string()));

    let webauthn = enabled_with_config(
        Block::new()
            .with_attribute("passwordless", flag())
            .with_block(
                "rp",
                single(
                    Block::new()
                        .with_attribute("id", string())
                        .with_attribute("display_name", string()),
                ),
            ),
    );

    let provider = Block::new()
        .with_attribute("id", Attribute::required_string())
        .with_attribute("provider", Attribute::required_string())
        .with_attribute("client_id", string())
        .with_attribute("mapper_url", string())
        .with_attribute("client_secret", string().sensitive())
        .with_attribute("issuer_url", string())
        .with_attribute("auth_url", string())
        .with_attribute("token_url", string())
        .with_attribute("scope", strings())
        .with_attribute("microsoft_tenant", string())
        .with_attribute("subject_source", string())
        .with_attribute("apple_team_id", string())
        .with_attribute("apple_private_key_id", string())
        .with_attribute("apple_private_key", string().sensitive())
        .with_block(
            "requested_claims",
            single(Block::new().with_attribute("id_token", strings())),
        )
        .with_attribute("organization_id", string())
        .with_attribute("label", string())
        .with_attribute("additional_id_token_audiences", strings());

    let oidc = enabled_with_config(
        Block::new()
            .with_attribute("base_redirect_uri", string())
            .with_block("providers", NestedBlock::list(provider)),
    );

    let toggle = || Block::new().with_attribute("enabled", flag());

    Block::new()
        .with_block("link", single(link))
        .with_block("code", single(code))
        .with_block("password", single(password))
        .with_block("totp", single(totp))
        .with_block("lookup_secret", single(toggle()))
        .with_block("profile", single(toggle()))
        .with_block("webauthn", single(webauthn))
        .with_block("oidc", single(oidc))
}

fn flows_block() -> Block {
    let ui_and_lifespan = || {
        Block::new()
            .with_attribute("ui_url", string())
            .with_attribute("lifespan", string())
    };
    let verification = || {
        ui_and_lifespan()
            .with_attribute("use", string())
            .with_attribute("notify_unknown_recipients", flag())
            .with_attribute("enabled", flag())
    };

    Block::new()
        .with_block(
            "logout",
            single(Block::new().with_block(
                "after",
                single(Block::new().with_attribute("default_browser_return_url", string())),
            )),
        )
        .with_block("error", single(Block::new().with_attribute("ui_url", string())))
        .with_block(
            "registration",
            single(
                ui_and_lifespan()
                    .with_attribute("login_hints", flag())
                    .with_attribute("enabled", flag()),
            ),
        )
        .with_block("login", single(ui_and_lifespan()))
        .with_block("verification", single(verification()))
        .with_block("recovery", single(verification()))
        .with_block(
            "settings",
            single(
                ui_and_lifespan()
                    .with_attribute("privileged_session_max_age", string())
                    .with_attribute("required_aal", string()),
            ),
        )
}

fn identity_config_block() -> Block {
    let schemas = Block::new()
        .with_attribute("default_schema_id", string())
        .with_block(
            "schemas",
            NestedBlock::list(
                Block::new()
                    .with_attribute("id", Attribute::required_string())
                    .with_attribute("url", Attribute::required_string()),
            ),
        );

    let selfservice = Block::new()
        .with_attribute("default_browser_return_url", string())
        .with_attribute("allowed_return_urls", strings())
        .with_block("methods", single(methods_block()))
        .with_block("flows", single(flows_block()));

    Block::new()
        .with_block("identity", single(schemas))
        .with_block("selfservice", single(selfservice))
}

fn permission_config_block() -> Block {
    Block::new().with_block(
        "namespaces",
        NestedBlock::list(
            Block::new()
                .with_attribute("id", Attribute::required_int64())
                .with_attribute("name", Attribute::required_string()),
        ),
    )
}

/// The `services` block of the project resource.
///
/// Each service and its `config` are filled from the server when left out.
pub fn services_block() -> Block {
    let service = |config: Block| Block::new().with_block("config", single(config).computed());

    let oauth2 = Block::new().with_attribute(
        "config",
        Attribute::new(AttributeType::String, AttributeFlags::optional_computed())
            .with_description("OAuth2 server configuration as a JSON object"),
    );

    Block::new()
        .with_block(
            "permission",
            single(service(permission_config_block())).computed(),
        )
        .with_block(
            "identity",
            single(service(identity_config_block())).computed(),
        )
        .with_block("oauth2", single(oauth2).computed())
}

/// Schema of the `orynetwork_project` resource.
pub fn project_resource_schema() -> Schema {
    Schema::v0()
        .with_description("An Ory Network project and its service configuration.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("Display name of the project"),
        )
        .with_attribute("slug", Attribute::computed_string())
        .with_attribute("revision_id", Attribute::computed_string())
        .with_attribute("state", Attribute::computed_string())
        .with_attribute(
            "workspace_id",
            Attribute::optional_string()
                .computed()
                .with_force_new()
                .with_description("Workspace to create the project in"),
        )
        .with_attribute("cors_admin", cors())
        .with_attribute("cors_public", cors())
        .with_block("services", single(services_block()).computed())
}

/// Schema of the `orynetwork_project` data source.
pub fn project_data_source_schema() -> Schema {
    let resource = project_resource_schema();
    let mut block = computed_only(resource.block);
    block.attributes.insert(
        "id".to_string(),
        Attribute::required_string().with_description("Id of the project to read"),
    );
    block.description = Some("Reads an existing Ory Network project.".to_string());
    Schema { version: 0, block }
}

/// Schema of the provider block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "email",
            Attribute::optional_string()
                .with_validator(AttributeValidator::Email)
                .with_description("Ory Network account email, or ORY_NETWORK_EMAIL"),
        )
        .with_attribute(
            "password",
            Attribute::optional_string()
                .sensitive()
                .with_description("Ory Network account password, or ORY_NETWORK_PASSWORD"),
        )
        .with_attribute(
            "api_url",
            Attribute::optional_string().with_description("Project API endpoint"),
        )
        .with_attribute(
            "console_url",
            Attribute::optional_string().with_description("Console endpoint used to sign in"),
        )
}

/// Turn every attribute and block of `block` into a read-only one.
pub fn computed_only(block: Block) -> Block {
    let attributes = block
        .attributes
        .into_iter()
        .map(|(name, mut attr)| {
            attr.flags = AttributeFlags {
                sensitive: attr.flags.sensitive,
                ..AttributeFlags::computed()
            };
            attr.force_new = false;
            (name, attr)
        })
        .collect();
    let blocks = block
        .blocks
        .into_iter()
        .map(|(name, mut nested)| {
            nested.block = computed_only(nested.block);
            nested.min_items = 0;
            nested.computed = true;
            (name, nested)
        })
        .collect();
    Block {
        attributes,
        blocks,
        description: block.description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    fn nested<'a>(block: &'a Block, path: &[&str]) -> &'a Block {
        path.iter()
            .fold(block, |block, name| &block.blocks[*name].block)
    }

    #[test]
    fn test_resource_schema_shape() {
        let schema = project_resource_schema();

        assert!(schema.block.attributes["name"].flags.required);
        assert!(schema.block.attributes["id"].flags.computed);
        assert_eq!(schema.force_new_attributes(), vec!["workspace_id"]);
        assert!(schema.block.blocks["services"].computed);

        let password = nested(
            &schema.block,
            &["services", "identity", "config", "selfservice", "methods", "password", "config"],
        );
        assert_eq!(
            password.attributes["min_password_length"].attr_type,
            AttributeType::Int64
        );

        let flows = nested(
            &schema.block,
            &["services", "identity", "config", "selfservice", "flows"],
        );
        assert!(flows.blocks["recovery"].block.attributes.contains_key("use"));
    }

    #[test]
    fn test_resource_schema_accepts_config() {
        let schema = project_resource_schema();
        let config = json!({
            "name": "Test",
            "cors_public": {"enabled": true, "origins": ["https://example.org"]},
            "services": {
                "permission": {"config": {"namespaces": [{"id": 1, "name": "Test"}]}},
                "identity": {"config": {
                    "identity": {"schemas": [{"id": "preset://email", "url": "base64://e30="}]},
                    "selfservice": {"methods": {"password": {"config": {"min_password_length": 10}}}}
                }},
                "oauth2": {"config": "{}"}
            }
        });

        assert!(validate(&schema, &config).is_empty());
    }

    #[test]
    fn test_resource_schema_rejects_bad_namespace() {
        let schema = project_resource_schema();
        let config = json!({
            "name": "Test",
            "services": {"permission": {"config": {"namespaces": [{"id": "one", "name": "Test"}]}}}
        });

        let diagnostics = validate(&schema, &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("services.permission.config.namespaces.0.id")
        );
    }

    #[test]
    fn test_data_source_schema_is_read_only() {
        let schema = project_data_source_schema();

        assert!(schema.block.attributes["id"].flags.required);
        assert!(!schema.block.attributes["name"].flags.required);
        assert!(schema.block.attributes["name"].flags.computed);
        assert!(schema.force_new_attributes().is_empty());

        let provider = nested(
            &schema.block,
            &["services", "identity", "config", "selfservice", "methods", "oidc", "config", "providers"],
        );
        assert!(provider.attributes["client_secret"].flags.sensitive);
        assert!(!provider.attributes["id"].flags.required);

        assert!(validate(&schema, &json!({"id": "p1"})).is_empty());
        assert!(!validate(&schema, &json!({})).is_empty());
    }

    #[test]
    fn test_provider_schema_validates_email() {
        let schema = provider_config_schema();

        assert!(validate(&schema, &json!({"email": "ops@example.org"})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());
        assert_eq!(validate(&schema, &json!({"email": "ops"})).len(), 1);
        assert!(schema.block.attributes["password"].flags.sensitive);
    }
}
