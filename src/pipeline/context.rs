//! Per-execution variable store
//!
//! Values only ever get added or overwritten, never removed. Step-scoped
//! `<stepId>_<field>` entries live apart from the named fields so they
//! never leak into request bodies.

use serde_json::{Map, Value};

/// Context key the bearer token is exposed under
pub const ACCESS_TOKEN: &str = "access_token";

pub const ACCOUNT_ID: &str = "accountId";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    access_token: Option<String>,
    fields: Map<String, Value>,
    step_fields: Map<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from caller-supplied values
    pub fn with_initial(initial: Map<String, Value>) -> Self {
        let mut ctx = Self::new();
        for (key, value) in initial {
            ctx.insert(key, value);
        }
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key == ACCESS_TOKEN {
            self.access_token = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(key, value);
        }
    }

    /// Record one top-level response field under `<step_id>_<field>`
    pub fn insert_step_field(&mut self, step_id: &str, field: &str, value: Value) {
        self.step_fields.insert(format!("{}_{}", step_id, field), value);
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn account_id(&self) -> Option<String> {
        self.get_string(ACCOUNT_ID)
    }

    /// Look a key up across named fields, then step-scoped fields
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).or_else(|| self.step_fields.get(key))
    }

    /// Value rendered for use in a URL or log line
    pub fn get_string(&self, key: &str) -> Option<String> {
        if key == ACCESS_TOKEN {
            return self.access_token.clone();
        }
        self.get(key).map(value_to_string)
    }

    pub fn contains(&self, key: &str) -> bool {
        (key == ACCESS_TOKEN && self.access_token.is_some()) || self.get(key).is_some()
    }

    /// Named fields, as merged into request payloads
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn step_fields(&self) -> &Map<String, Value> {
        &self.step_fields
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.step_fields.len() + usize::from(self.access_token.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strings are used verbatim; everything else as compact JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
