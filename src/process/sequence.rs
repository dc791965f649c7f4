//! Arrow-dialect (sequence diagram) parser
//!
//! Scans `Source -> Target: ACTION` lines in file order. When `ACTION`
//! embeds `METHOD /path(params)` the step is an API call, otherwise it is
//! recorded as a named marker with no endpoint.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::errors::FlowpulseError;
use crate::http::HttpMethod;
use super::model::{ProcessDefinition, Step};

/// Default process name when the caller supplies none
pub const DEFAULT_NAME: &str = "Sequence Diagram Process";

static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(.+?)\s*->\s*(.+?)\s*:\s*(.+)$").expect("Invalid arrow regex")
});
static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(GET|POST|PUT|DELETE|PATCH)\s+([^\s(]+)").expect("Invalid action regex")
});

/// Line prefixes that carry diagram metadata rather than messages
const META_PREFIXES: &[&str] = &[
    "@", "title", "participant", "actor", "//", "activate", "deactivate",
];

/// A parsed `Source -> Target: ACTION` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrow<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub action: &'a str,
}

/// API call embedded in an arrow's action text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub method: HttpMethod,
    pub endpoint: String,
    /// Text inside the parentheses following the path, if any
    pub params: Option<String>,
}

/// Blank lines and metadata lines are not messages
pub fn is_meta_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || META_PREFIXES.iter().any(|p| line.starts_with(p))
}

pub fn match_arrow(line: &str) -> Option<Arrow<'_>> {
    let caps = ARROW_RE.captures(line)?;
    Some(Arrow {
        source: caps.get(1)?.as_str().trim(),
        target: caps.get(2)?.as_str().trim(),
        action: caps.get(3)?.as_str().trim(),
    })
}

pub fn match_action(action: &str) -> Option<ActionCall> {
    let caps = ACTION_RE.captures(action)?;
    let method: HttpMethod = caps.get(1)?.as_str().parse().ok()?;
    let endpoint = caps.get(2)?;

    let rest = &action[endpoint.end()..];
    let params = match (rest.find('('), rest.rfind(')')) {
        (Some(start), Some(end)) if end > start => Some(rest[start + 1..end].trim().to_string()),
        _ => None,
    };

    Some(ActionCall {
        method,
        endpoint: endpoint.as_str().to_string(),
        params: params.filter(|p| !p.is_empty()),
    })
}

/// Reject text that cannot be an arrow diagram
pub fn validate(text: &str) -> Result<(), FlowpulseError> {
    if text.trim().is_empty() {
        return Err(FlowpulseError::Parse("Sequence diagram cannot be empty".to_string()));
    }
    if !text.contains("->") {
        return Err(FlowpulseError::Parse(
            "Invalid sequence diagram format: no arrows found".to_string(),
        ));
    }
    Ok(())
}

pub fn parse(text: &str, name: Option<&str>) -> Result<ProcessDefinition, FlowpulseError> {
    validate(text)?;

    let mut steps = Vec::new();
    for line in text.lines() {
        if is_meta_line(line) {
            continue;
        }
        let Some(arrow) = match_arrow(line) else {
            continue;
        };

        let order = steps.len();
        let step = match match_action(arrow.action) {
            Some(call) => {
                let display = match call.params {
                    Some(ref params) => format!("{} {} ({})", call.method, call.endpoint, params),
                    None => format!("{} {}", call.method, call.endpoint),
                };
                debug!(method = %call.method, endpoint = %call.endpoint, "Extracted arrow step");
                Step::new(format!("step_{}", order), display).with_call(call.method, call.endpoint)
            }
            None => {
                debug!(source = arrow.source, target = arrow.target, "Extracted non-API arrow step");
                Step::new(format!("step_{}", order), arrow.action)
            }
        };
        steps.push(step);
    }

    if steps.is_empty() {
        return Err(FlowpulseError::Parse(
            "Sequence diagram contains no `Source -> Target: action` lines".to_string(),
        ));
    }

    info!(steps = steps.len(), "Parsed sequence diagram");
    Ok(ProcessDefinition::new(
        name.unwrap_or(DEFAULT_NAME),
        Some("Parsed from sequence diagram".to_string()),
        text,
        steps,
    ))
}
