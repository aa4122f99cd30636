//! Schema-driven planning.
//!
//! Computed attributes and computed blocks left out of the configuration
//! keep their prior value, or become unknown when creating. Inside a
//! configured object, optional leaves and blocks left out keep their prior
//! value as well; when another configured attribute of that object changes,
//! the kept leaves become unknown since the server settles them again. A
//! change of a `force_new` attribute plans a replacement, in which case
//! nothing is carried over from the prior state.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::schema::{AttributeType, Block, BlockNestingMode, Schema};
use crate::types::{diff_attributes, is_unknown, PlanResult, UNKNOWN_VALUE};

/// Plan the transition from `prior` to `proposed`.
///
/// A null `proposed` state plans a deletion.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: Value) -> PlanResult {
    let prior = prior.filter(|p| !p.is_null());

    if proposed.is_null() {
        let changes = diff_attributes(prior, &Value::Object(Map::new()));
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let requires_replace = prior.is_some_and(|prior| {
        schema
            .force_new_attributes()
            .into_iter()
            .any(|name| replaced(prior.get(name), proposed.get(name)))
    });

    let mut planned = proposed;
    if let Value::Object(map) = &mut planned {
        let carried = if requires_replace {
            None
        } else {
            prior.and_then(Value::as_object)
        };
        fill_block(&schema.block, map, carried);
    }

    let changes = diff_attributes(prior, &planned);
    PlanResult::with_changes(planned, changes, requires_replace)
}

fn replaced(prior: Option<&Value>, proposed: Option<&Value>) -> bool {
    match (prior, proposed) {
        (_, None) | (_, Some(Value::Null)) => false,
        (_, Some(v)) if is_unknown(v) => true,
        (Some(before), Some(after)) => !before.is_null() && before != after,
        (None, Some(_)) => false,
    }
}

fn is_unset(planned: &Map<String, Value>, name: &str) -> bool {
    planned.get(name).map_or(true, Value::is_null)
}

fn prior_value(prior: &Map<String, Value>, name: &str) -> Value {
    prior.get(name).cloned().unwrap_or(Value::Null)
}

fn fill_block(block: &Block, planned: &mut Map<String, Value>, prior: Option<&Map<String, Value>>) {
    // Without a prior object the value is only known after apply.
    let carried = |name: &str| match prior {
        Some(p) => prior_value(p, name),
        None => Value::from(UNKNOWN_VALUE),
    };
    let mut kept = Vec::new();

    for (name, attr) in &block.attributes {
        if attr.flags.computed {
            if is_unset(planned, name) {
                planned.insert(name.clone(), carried(name));
            }
        } else if !attr.flags.required && is_unset(planned, name) {
            if let Some(p) = prior {
                planned.insert(name.clone(), prior_value(p, name));
                kept.push(name.as_str());
            }
        }

        if let AttributeType::Object(fields) = &attr.attr_type {
            if let Some(Value::Object(inner)) = planned.get_mut(name) {
                let prior_inner = prior.and_then(|p| p.get(name)).and_then(Value::as_object);
                fill_fields(fields, inner, prior_inner);
            }
        }
    }

    for (name, nested) in &block.blocks {
        let prior_nested = prior.and_then(|p| p.get(name));
        let mode = nested.nesting_mode;
        match planned.get_mut(name) {
            Some(Value::Object(inner)) if mode == BlockNestingMode::Single => {
                fill_block(&nested.block, inner, prior_nested.and_then(Value::as_object));
            }
            Some(Value::Array(items)) if mode == BlockNestingMode::List => {
                let prior_items = prior_nested.and_then(Value::as_array);
                for (index, item) in items.iter_mut().enumerate() {
                    if let Value::Object(inner) = item {
                        let prior_item = prior_items
                            .and_then(|p| p.get(index))
                            .and_then(Value::as_object);
                        fill_block(&nested.block, inner, prior_item);
                    }
                }
            }
            None | Some(Value::Null) => {
                if nested.computed {
                    planned.insert(name.clone(), carried(name));
                } else if let Some(p) = prior {
                    planned.insert(name.clone(), prior_value(p, name));
                }
            }
            _ => {}
        }
    }

    if let Some(p) = prior {
        let reconfigured = block.attributes.iter().any(|(name, attr)| {
            !attr.flags.computed
                && !kept.contains(&name.as_str())
                && planned.get(name) != p.get(name)
        });
        if reconfigured {
            for name in kept {
                planned.insert(name.to_string(), Value::from(UNKNOWN_VALUE));
            }
        }
    }
}

fn fill_fields(
    fields: &HashMap<String, AttributeType>,
    planned: &mut Map<String, Value>,
    prior: Option<&Map<String, Value>>,
) {
    let Some(prior) = prior else {
        return;
    };

    let mut kept = Vec::new();
    for name in fields.keys() {
        if is_unset(planned, name) {
            planned.insert(name.clone(), prior_value(prior, name));
            kept.push(name.as_str());
        }
    }

    let reconfigured = fields
        .keys()
        .any(|name| !kept.contains(&name.as_str()) && planned.get(name) != prior.get(name));
    if reconfigured {
        for name in kept {
            planned.insert(name.to_string(), Value::from(UNKNOWN_VALUE));
        }
    }
}
