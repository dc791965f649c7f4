//! Response validation against an endpoint's response schema
//!
//! Violations accumulate; nothing here fails fast.

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::schema::{EndpointDescriptor, NumberRules, SchemaKind, StringRules};

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

fn child_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

/// Validate a response status and body, returning every violation found
///
/// A body is only parsed when the descriptor declares a response schema.
pub fn validate_response(status: u16, body: &str, descriptor: &EndpointDescriptor) -> Vec<String> {
    let mut errors = Vec::new();

    if !(200..300).contains(&status) {
        errors.push(format!("Expected 2xx status, got: {}", status));
    }

    if let Some(schema) = descriptor.response_kind() {
        if body.trim().is_empty() {
            errors.push("Expected response body but got empty response".to_string());
        } else {
            match serde_json::from_str::<Value>(body) {
                Ok(json) => validate_root(&json, &schema, &mut errors),
                Err(e) => errors.push(format!("Invalid JSON response: {}", e)),
            }
        }
    }

    if !errors.is_empty() {
        warn!(
            method = %descriptor.method,
            path = %descriptor.path,
            errors = ?errors,
            "Response validation failed"
        );
    }
    errors
}

/// Validate a parsed value against a schema, starting at the document root
pub fn validate_value(value: &Value, schema: &SchemaKind) -> Vec<String> {
    let mut errors = Vec::new();
    validate_root(value, schema, &mut errors);
    errors
}

fn validate_root(value: &Value, schema: &SchemaKind, errors: &mut Vec<String>) {
    match schema {
        SchemaKind::Object { .. } => validate_field(value, schema, "", errors),
        _ => validate_field(value, schema, "response", errors),
    }
}

fn validate_field(value: &Value, schema: &SchemaKind, path: &str, errors: &mut Vec<String>) {
    let type_error = |errors: &mut Vec<String>| {
        let label = if path.is_empty() { "response" } else { path };
        errors.push(format!(
            "{}: expected {}, got {}",
            label,
            schema.type_name(),
            json_type(value)
        ));
    };

    match schema {
        SchemaKind::Any => {}
        SchemaKind::String(rules) => match value.as_str() {
            Some(s) => check_string(s, rules, path, errors),
            None => type_error(errors),
        },
        SchemaKind::Integer(rules) => {
            if value.is_i64() || value.is_u64() {
                check_number(value, rules, path, errors);
            } else {
                type_error(errors);
            }
        }
        SchemaKind::Number(rules) => {
            if value.is_number() {
                check_number(value, rules, path, errors);
            } else {
                type_error(errors);
            }
        }
        SchemaKind::Boolean => {
            if !value.is_boolean() {
                type_error(errors);
            }
        }
        SchemaKind::Array { min_items, max_items, items } => match value.as_array() {
            Some(array) => {
                if let Some(min) = min_items {
                    if array.len() < *min {
                        errors.push(format!("{}: array size {} < minimum {}", path, array.len(), min));
                    }
                }
                if let Some(max) = max_items {
                    if array.len() > *max {
                        errors.push(format!("{}: array size {} > maximum {}", path, array.len(), max));
                    }
                }
                if let Some(item_schema) = items {
                    for (i, item) in array.iter().enumerate() {
                        validate_field(item, item_schema, &format!("{}[{}]", path, i), errors);
                    }
                }
            }
            None => type_error(errors),
        },
        SchemaKind::Object { properties, required } => match value.as_object() {
            Some(object) => {
                for field in required {
                    if !object.contains_key(field) {
                        errors.push(format!("Required field missing: {}", child_path(path, field)));
                    }
                }
                for (name, field_schema) in properties {
                    if let Some(field_value) = object.get(name) {
                        validate_field(field_value, field_schema, &child_path(path, name), errors);
                    }
                }
            }
            None => type_error(errors),
        },
    }
}

fn check_string(s: &str, rules: &StringRules, path: &str, errors: &mut Vec<String>) {
    let len = s.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            errors.push(format!("{}: length {} < minimum {}", path, len, min));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            errors.push(format!("{}: length {} > maximum {}", path, len, max));
        }
    }
    if let Some(pattern) = rules.pattern.as_deref() {
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(re) if !re.is_match(s) => {
                errors.push(format!("{}: value does not match pattern {}", path, pattern));
            }
            Ok(_) => {}
            Err(_) => errors.push(format!("{}: invalid pattern {}", path, pattern)),
        }
    }
    if !rules.enum_values.is_empty() && !rules.enum_values.iter().any(|v| v == s) {
        errors.push(format!(
            "{}: value not in allowed values [{}]",
            path,
            rules.enum_values.join(", ")
        ));
    }
}

fn check_number(value: &Value, rules: &NumberRules, path: &str, errors: &mut Vec<String>) {
    let Some(n) = value.as_f64() else {
        return;
    };
    if let Some(min) = rules.minimum {
        if n < min {
            errors.push(format!("{}: value {} < minimum {}", path, value, min));
        }
    }
    if let Some(max) = rules.maximum {
        if n > max {
            errors.push(format!("{}: value {} > maximum {}", path, value, max));
        }
    }
}
