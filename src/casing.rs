//! Snake_case/camelCase conversion at the network boundary.
//!
//! The gateway speaks snake_case; domain types are defined once in camelCase.
//! These converters rewrite every object key recursively (nested objects and
//! arrays included) and never touch values. Keys without underscores or
//! uppercase letters, such as UUID map keys, come through unchanged; nested
//! free-form objects like custom parameters get the same key rewriting as
//! any other map, and the two directions round-trip.
//!
//! Underscores are only folded when followed by a lowercase ASCII letter,
//! matching the original converter, so keys like `context_over_200k` survive
//! a round trip.

use serde_json::{Map, Value};

/// `base_url` -> `baseUrl`
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.peek() {
                Some(&next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `baseUrl` -> `base_url`
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rewrite all object keys in `value` from snake_case to camelCase.
pub fn value_to_camel(value: Value) -> Value {
    convert(value, &snake_to_camel)
}

/// Rewrite all object keys in `value` from camelCase to snake_case.
pub fn value_to_snake(value: Value) -> Value {
    convert(value, &camel_to_snake)
}

fn convert(value: Value, key_fn: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(key_fn(&k), convert(v, key_fn));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| convert(v, key_fn)).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_key_conversion() {
        assert_eq!(snake_to_camel("base_url"), "baseUrl");
        assert_eq!(snake_to_camel("model_implementation_id"), "modelImplementationId");
        assert_eq!(camel_to_snake("baseUrl"), "base_url");
        assert_eq!(camel_to_snake("topP"), "top_p");
        assert_eq!(snake_to_camel("id"), "id");
    }

    #[test]
    fn test_underscore_before_digit_survives() {
        let camel = snake_to_camel("context_over_200k");
        assert_eq!(camel_to_snake(&camel), "context_over_200k");
    }

    #[test]
    fn test_recursive_conversion() {
        let wire = json!({
            "id": "p1",
            "base_url": "https://api.example.com",
            "free_quota": {"reset_period": "DAILY", "amount": 10},
            "api_keys": [{"key_preview": "sk-...abc", "sort_order": 0}],
        });
        let ui = value_to_camel(wire.clone());
        assert_eq!(
            ui,
            json!({
                "id": "p1",
                "baseUrl": "https://api.example.com",
                "freeQuota": {"resetPeriod": "DAILY", "amount": 10},
                "apiKeys": [{"keyPreview": "sk-...abc", "sortOrder": 0}],
            })
        );
        // Round trip reproduces the original key set and values.
        assert_eq!(value_to_snake(ui), wire);
    }

    #[test]
    fn test_values_untouched() {
        let wire = json!({"capabilities": ["text-generation", "function_calling_v2"]});
        let ui = value_to_camel(wire.clone());
        assert_eq!(ui["capabilities"], wire["capabilities"]);
    }

    #[test]
    fn test_uuid_map_keys_pass_through() {
        let order = json!({"4a3c9b1e-0000-0000-0000-000000000001": 0});
        assert_eq!(value_to_snake(order.clone()), order);
    }
}
