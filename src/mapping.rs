//! Endpoint path resolution
//!
//! Maps a logical path from a diagram to the real API path. Exact entries
//! win; otherwise pattern entries are tried in insertion order, and values
//! captured from `{name}` segments are substituted into the target.

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::errors::FlowpulseError;

/// One configured `from -> to` pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
struct PathPattern {
    regex: Regex,
    target: String,
}

/// Resolves logical paths to real ones
///
/// Read-only after construction, so it can be shared across steps freely.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    exact: IndexMap<String, String>,
    patterns: Vec<PathPattern>,
}

/// Compile a path template into an anchored regex
///
/// Literal text is escaped and each `{name}` matches one path segment.
pub(crate) fn compile_path_pattern(pattern: &str) -> Result<Regex, FlowpulseError> {
    let mut regex_str = String::from("^");
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            return Err(FlowpulseError::Config(format!(
                "Unclosed placeholder in mapping '{}'",
                pattern
            )));
        };
        regex_str.push_str(&regex::escape(&rest[..open]));
        regex_str.push_str("([^/]+)");
        rest = &rest[close + 1..];
    }
    regex_str.push_str(&regex::escape(rest));
    regex_str.push('$');

    Regex::new(&regex_str)
        .map_err(|e| FlowpulseError::Config(format!("Invalid mapping pattern '{}': {}", pattern, e)))
}

/// Replace each `{..}` in `target` with the next captured value, left to right
fn substitute_positional(target: &str, values: &[&str]) -> String {
    let mut out = String::with_capacity(target.len());
    let mut values = values.iter();
    let mut rest = target;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        out.push_str(&rest[..open]);
        match values.next() {
            Some(v) => out.push_str(v),
            None => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

impl EndpointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured pairs; entries containing `{` become patterns
    pub fn from_mappings(mappings: &[EndpointMapping]) -> Result<Self, FlowpulseError> {
        let mut resolver = Self::new();
        for m in mappings {
            resolver.add(&m.from, &m.to)?;
        }
        Ok(resolver)
    }

    fn add(&mut self, from: &str, to: &str) -> Result<(), FlowpulseError> {
        if from.contains('{') {
            let regex = compile_path_pattern(from)?;
            self.patterns.push(PathPattern {
                regex,
                target: to.to_string(),
            });
        } else {
            self.exact.insert(from.to_string(), to.to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a logical path; unknown paths come back unchanged
    pub fn resolve(&self, path: &str) -> String {
        if let Some(target) = self.exact.get(path) {
            debug!(from = path, to = %target, "Resolved endpoint (exact)");
            return target.clone();
        }

        for pattern in &self.patterns {
            if let Some(caps) = pattern.regex.captures(path) {
                let values: Vec<&str> = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str())
                    .collect();
                let resolved = substitute_positional(&pattern.target, &values);
                debug!(from = path, to = %resolved, "Resolved endpoint (pattern)");
                return resolved;
            }
        }

        trace!(path, "No endpoint mapping, using path as-is");
        path.to_string()
    }
}
