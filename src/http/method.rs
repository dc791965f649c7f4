//! HTTP methods a process step may call

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::errors::FlowpulseError;

/// HTTP GET method
pub const GET: &str = "GET";

/// HTTP POST method
pub const POST: &str = "POST";

/// HTTP PUT method
pub const PUT: &str = "PUT";

/// HTTP PATCH method
pub const PATCH: &str = "PATCH";

/// HTTP DELETE method
pub const DELETE: &str = "DELETE";

/// Methods recognised in diagram text
pub const STEP_METHODS: &[&str] = &[GET, POST, PUT, DELETE, PATCH];

/// The closed set of methods a step can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => GET,
            HttpMethod::Post => POST,
            HttpMethod::Put => PUT,
            HttpMethod::Delete => DELETE,
            HttpMethod::Patch => PATCH,
        }
    }

    /// Whether the request carries a JSON body built from the payload
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = FlowpulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            GET => Ok(HttpMethod::Get),
            POST => Ok(HttpMethod::Post),
            PUT => Ok(HttpMethod::Put),
            DELETE => Ok(HttpMethod::Delete),
            PATCH => Ok(HttpMethod::Patch),
            other => Err(FlowpulseError::Argument(format!("Unsupported HTTP method '{}'", other))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a string is one of the step methods
pub fn is_step_method(method: &str) -> bool {
    STEP_METHODS.iter().any(|&m| m.eq_ignore_ascii_case(method))
}
