//! Endpoint descriptors and body schemas
//!
//! Schemas arrive as loose JSON-Schema-like values and are turned into a
//! closed [`SchemaKind`] so validation and data generation can match on
//! the variant.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::http::HttpMethod;
use crate::process::Step;

/// Path used when a step has no endpoint at all
pub const UNKNOWN_PATH: &str = "/unknown";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub enum_values: Vec<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// A body schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String(StringRules),
    Integer(NumberRules),
    Number(NumberRules),
    Boolean,
    Array {
        min_items: Option<usize>,
        max_items: Option<usize>,
        items: Option<Box<SchemaKind>>,
    },
    Object {
        properties: IndexMap<String, SchemaKind>,
        required: Vec<String>,
    },
    /// No `type` given; accepts anything
    Any,
}

fn as_usize(value: &Value, key: &str) -> Option<usize> {
    value.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

fn as_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl SchemaKind {
    /// Parse a schema value; `null` and `{}` mean "no contract"
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) if map.is_empty() => None,
            Value::Object(_) => Some(Self::parse_node(value)),
            _ => None,
        }
    }

    fn parse_node(value: &Value) -> Self {
        let declared = value.get("type").and_then(Value::as_str);
        let kind = match declared {
            Some(t) => t,
            None if value.get("properties").is_some() => "object",
            None if value.get("items").is_some() => "array",
            None => return SchemaKind::Any,
        };

        match kind {
            "string" => SchemaKind::String(StringRules {
                min_length: as_usize(value, "minLength"),
                max_length: as_usize(value, "maxLength"),
                pattern: value.get("pattern").and_then(Value::as_str).map(str::to_string),
                enum_values: string_list(value, "enum"),
                format: value.get("format").and_then(Value::as_str).map(str::to_string),
            }),
            "integer" => SchemaKind::Integer(NumberRules {
                minimum: as_f64(value, "minimum"),
                maximum: as_f64(value, "maximum"),
            }),
            "number" => SchemaKind::Number(NumberRules {
                minimum: as_f64(value, "minimum"),
                maximum: as_f64(value, "maximum"),
            }),
            "boolean" => SchemaKind::Boolean,
            "array" => SchemaKind::Array {
                min_items: as_usize(value, "minItems"),
                max_items: as_usize(value, "maxItems"),
                items: value
                    .get("items")
                    .filter(|v| v.is_object())
                    .map(|v| Box::new(Self::parse_node(v))),
            },
            "object" => {
                let properties = value
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, schema)| (name.clone(), Self::parse_node(schema)))
                            .collect()
                    })
                    .unwrap_or_default();
                SchemaKind::Object {
                    properties,
                    required: string_list(value, "required"),
                }
            }
            other => {
                warn!(schema_type = other, "Unknown schema type, accepting any value");
                SchemaKind::Any
            }
        }
    }

    /// Type name used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::String(_) => "string",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Any => "any",
        }
    }
}

/// What a step's HTTP call looks like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_schema: Value,
    #[serde(default)]
    pub response_schema: Value,
    #[serde(default)]
    pub required_fields: Vec<String>,
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

impl EndpointDescriptor {
    /// Minimal descriptor: no schemas, no required fields
    pub fn minimal(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            operation_id: None,
            summary: None,
            description: None,
            request_schema: Value::Null,
            response_schema: Value::Null,
            required_fields: Vec::new(),
        }
    }

    /// Descriptor for a step, from its attached `api.spec` blob when it parses
    pub fn from_step(step: &Step) -> Self {
        let path = step.endpoint.clone().unwrap_or_else(|| UNKNOWN_PATH.to_string());
        let method = step.method.unwrap_or(HttpMethod::Get);

        let Some(blob) = step.schema.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Self::minimal(path, method);
        };

        match serde_json::from_str::<EndpointDescriptor>(blob) {
            Ok(mut descriptor) => {
                if descriptor.path.is_empty() {
                    descriptor.path = path;
                }
                descriptor
            }
            Err(e) => {
                warn!(step = %step.id, error = %e, "Unreadable api.spec, using minimal descriptor");
                Self::minimal(path, method)
            }
        }
    }

    pub fn request_kind(&self) -> Option<SchemaKind> {
        SchemaKind::from_value(&self.request_schema)
    }

    pub fn response_kind(&self) -> Option<SchemaKind> {
        SchemaKind::from_value(&self.response_schema)
    }
}
