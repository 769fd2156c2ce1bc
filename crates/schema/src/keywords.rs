//! Structural keyword checks
//!
//! Supported: type, required, properties, additionalProperties (false only),
//! items, enum, const, minLength, maxLength, minimum, maximum, minItems.
//! Unknown keywords are ignored.

use serde_json::{Map, Value};

/// Check `value` against `schema`, appending one message per violation
pub(crate) fn check(schema: &Value, value: &Value, path: &str, violations: &mut Vec<String>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        if !type_matches(expected, value) {
            violations.push(format!(
                "{path}: expected {}, got {}",
                describe_type(expected),
                json_type(value)
            ));
            // Further keywords assume the right shape
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let allowed = Value::Array(allowed.clone());
            violations.push(format!("{path}: value {value} is not one of {allowed}"));
        }
    }

    if let Some(constant) = schema.get("const") {
        if constant != value {
            violations.push(format!("{path}: expected constant {constant}, got {value}"));
        }
    }

    match value {
        Value::Object(object) => check_object(schema, object, path, violations),
        Value::Array(items) => check_array(schema, items, path, violations),
        Value::String(text) => check_string(schema, text, path, violations),
        Value::Number(_) => check_number(schema, value, path, violations),
        _ => {}
    }
}

fn check_object(
    schema: &Map<String, Value>,
    object: &Map<String, Value>,
    path: &str,
    violations: &mut Vec<String>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                violations.push(format!("{path}.{field}: required field missing"));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    if let Some(properties) = properties {
        for (name, property_schema) in properties {
            if let Some(property) = object.get(name) {
                check(property_schema, property, &format!("{path}.{name}"), violations);
            }
        }
    }

    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
        for name in object.keys() {
            let declared = properties.is_some_and(|p| p.contains_key(name));
            if !declared {
                violations.push(format!("{path}.{name}: additional property not allowed"));
            }
        }
    }
}

fn check_array(
    schema: &Map<String, Value>,
    items: &[Value],
    path: &str,
    violations: &mut Vec<String>,
) {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            violations.push(format!("{path}: expected at least {min} items, got {}", items.len()));
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (idx, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{path}[{idx}]"), violations);
        }
    }
}

fn check_string(schema: &Map<String, Value>, text: &str, path: &str, violations: &mut Vec<String>) {
    let length = text.chars().count() as u64;

    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            violations.push(format!("{path}: length {length} is shorter than {min}"));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            violations.push(format!("{path}: length {length} is longer than {max}"));
        }
    }
}

fn check_number(schema: &Map<String, Value>, value: &Value, path: &str, violations: &mut Vec<String>) {
    let Some(number) = value.as_f64() else {
        return;
    };

    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if number < min {
            violations.push(format!("{path}: {value} is less than minimum {min}"));
        }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if number > max {
            violations.push(format!("{path}: {value} is greater than maximum {max}"));
        }
    }
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        // Malformed `type` keyword: nothing to enforce
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
