//! Request payload generation
//!
//! [`TestDataSource`] is the seam for anything that can propose a request
//! body for an endpoint. [`SchemaDataGenerator`] fills fields from the
//! request schema, preferring values already present in the context.

use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::http::HttpMethod;
use crate::pipeline::ExecutionContext;
use crate::schema::{EndpointDescriptor, NumberRules, SchemaKind, StringRules};

/// Produces a request field map for an endpoint
pub trait TestDataSource: Send + Sync {
    fn generate(&self, descriptor: &EndpointDescriptor, context: &ExecutionContext) -> Map<String, Value>;
}

/// Rule-based generator driven by the request schema
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaDataGenerator;

fn digits(rng: &mut impl Rng, width: usize) -> String {
    (0..width).map(|_| char::from(b'0' + rng.random_range(0..10u8))).collect()
}

fn account_number(rng: &mut impl Rng) -> String {
    format!("40817810{}", digits(rng, 12))
}

impl SchemaDataGenerator {
    pub fn new() -> Self {
        Self
    }

    fn value_for(&self, field: &str, schema: &SchemaKind, rng: &mut impl Rng) -> Value {
        match schema {
            SchemaKind::String(rules) => Value::String(self.string_value(field, rules, rng)),
            SchemaKind::Integer(rules) => json!(self.integer_value(rules, rng)),
            SchemaKind::Number(rules) => json!(self.number_value(rules, rng)),
            SchemaKind::Boolean => Value::Bool(rng.random::<bool>()),
            SchemaKind::Array { items, .. } => match items {
                Some(item) => Value::Array(vec![self.value_for(field, item, rng)]),
                None => Value::Array(Vec::new()),
            },
            SchemaKind::Object { properties, .. } => {
                let mut object = Map::new();
                for (name, prop) in properties {
                    object.insert(name.clone(), self.value_for(name, prop, rng));
                }
                Value::Object(object)
            }
            SchemaKind::Any => Value::String(self.string_value(field, &StringRules::default(), rng)),
        }
    }

    fn string_value(&self, field: &str, rules: &StringRules, rng: &mut impl Rng) -> String {
        let lower = field.to_lowercase();

        if lower.contains("account") && lower.contains("id") {
            return account_number(rng);
        }
        if lower.contains("card") && lower.contains("number") {
            return format!("4276{}", digits(rng, 12));
        }
        if lower.contains("phone") {
            return format!("+7{}", digits(rng, 10));
        }
        if lower.contains("email") {
            return format!("test{}@example.com", rng.random_range(0..1000));
        }
        if lower.contains("amount") || lower.contains("sum") {
            return rng.random_range(100..100_100).to_string();
        }

        match rules.format.as_deref() {
            Some("date") => return chrono::Utc::now().format("%Y-%m-%d").to_string(),
            Some("date-time") => return chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            Some("uuid") => return uuid::Uuid::new_v4().to_string(),
            _ => {}
        }

        if !rules.enum_values.is_empty() {
            let i = rng.random_range(0..rules.enum_values.len());
            return rules.enum_values[i].clone();
        }

        let mut value = format!("test_{}_{}", field, rng.random_range(0..1000));
        if let Some(max) = rules.max_length {
            value = value.chars().take(max.max(1)).collect();
        }
        if let Some(min) = rules.min_length {
            while value.chars().count() < min {
                value.push('x');
            }
        }
        value
    }

    fn integer_value(&self, rules: &NumberRules, rng: &mut impl Rng) -> i64 {
        let min = rules.minimum.map(|m| m.ceil() as i64).unwrap_or(0);
        let max = rules.maximum.map(|m| m.floor() as i64).unwrap_or(min.max(0).saturating_add(10_000));
        if max <= min {
            return min;
        }
        rng.random_range(min..=max)
    }

    fn number_value(&self, rules: &NumberRules, rng: &mut impl Rng) -> f64 {
        let min = rules.minimum.filter(|m| m.is_finite()).unwrap_or(0.0);
        let max = rules
            .maximum
            .filter(|m| m.is_finite())
            .unwrap_or(min.max(0.0) + 10_000.0);
        // Also rejects spans too wide for a uniform float range
        if max <= min || !(max - min).is_finite() {
            return min;
        }
        let raw = rng.random_range(min..max);
        (raw * 100.0).round() / 100.0
    }

    /// Payload for endpoints without a request schema
    fn default_data(&self, descriptor: &EndpointDescriptor, rng: &mut impl Rng) -> Map<String, Value> {
        let mut data = Map::new();
        let path = descriptor.path.as_str();

        if path.contains("{externalAccountID}") {
            data.insert("externalAccountID".into(), Value::String(account_number(rng)));
        }
        if path.contains("{accountId}") {
            data.insert("accountId".into(), Value::String(account_number(rng)));
        }
        if path.contains("{cardId}") {
            data.insert("cardId".into(), Value::String(format!("4276{}", digits(rng, 12))));
        }
        if path.contains("{transactionId}") {
            data.insert("transactionId".into(), Value::String(format!("TXN{}", digits(rng, 15))));
        }

        if matches!(descriptor.method, HttpMethod::Post | HttpMethod::Put) {
            data.insert("amount".into(), json!(rng.random_range(100..10_100)));
            data.insert("currency".into(), json!("RUB"));
            data.insert("description".into(), json!("Test transaction"));
        }
        data
    }
}

impl TestDataSource for SchemaDataGenerator {
    fn generate(&self, descriptor: &EndpointDescriptor, context: &ExecutionContext) -> Map<String, Value> {
        let mut rng = rand::rng();

        let properties = match descriptor.request_kind() {
            Some(SchemaKind::Object { properties, .. }) if !properties.is_empty() => properties,
            _ => {
                debug!(path = %descriptor.path, "Generated default request data");
                return self.default_data(descriptor, &mut rng);
            }
        };

        let mut data = Map::new();
        for (field, schema) in &properties {
            let value = match context.get(field) {
                Some(existing) => existing.clone(),
                None => self.value_for(field, schema, &mut rng),
            };
            data.insert(field.clone(), value);
        }
        debug!(path = %descriptor.path, fields = data.len(), "Generated request data from schema");
        data
    }
}
