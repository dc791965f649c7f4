//! Per-endpoint payload overrides
//!
//! An override replaces the generic "merge the context into the body"
//! behaviour for matching endpoints with a fixed payload.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::FlowpulseError;
use crate::mapping::compile_path_pattern;

/// One `[[overrides]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadOverride {
    /// Exact path or `{var}` template
    pub endpoint: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Keep context values for keys the payload does not set
    #[serde(default)]
    pub merge_context: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: Vec<(PayloadOverride, Option<Regex>)>,
}

impl OverrideTable {
    pub fn new(overrides: Vec<PayloadOverride>) -> Result<Self, FlowpulseError> {
        let entries = overrides
            .into_iter()
            .map(|o| {
                let regex = if o.endpoint.contains('{') {
                    Some(compile_path_pattern(&o.endpoint)?)
                } else {
                    None
                };
                Ok((o, regex))
            })
            .collect::<Result<Vec<_>, FlowpulseError>>()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First override whose endpoint equals any candidate path, else the first pattern match
    pub fn find(&self, candidates: &[&str]) -> Option<&PayloadOverride> {
        self.entries
            .iter()
            .find(|(o, _)| candidates.iter().any(|c| *c == o.endpoint))
            .or_else(|| {
                self.entries.iter().find(|(_, regex)| {
                    regex
                        .as_ref()
                        .is_some_and(|re| candidates.iter().any(|c| re.is_match(c)))
                })
            })
            .map(|(o, _)| o)
    }
}
