//! Process definition and step types produced by the parsers

use serde::Serialize;
use crate::http::HttpMethod;

/// Kind of work a step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    ServiceCall,
}

/// One API call (or non-API marker) in a process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Stable identifier (BPMN element id, or `step_<n>` for arrow diagrams)
    pub id: String,
    /// Display name
    pub name: String,
    /// Position in the process, 0-based and gapless
    pub order: usize,
    pub kind: StepKind,
    pub method: Option<HttpMethod>,
    /// Endpoint path template, may contain `{name}` placeholders
    pub endpoint: Option<String>,
    /// Inline endpoint descriptor blob (`api.spec`)
    pub schema: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order: 0,
            kind: StepKind::ServiceCall,
            method: None,
            endpoint: None,
            schema: None,
        }
    }

    pub fn with_call(mut self, method: HttpMethod, endpoint: impl Into<String>) -> Self {
        self.method = Some(method);
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Whether the step carries anything that can be turned into an HTTP call
    pub fn is_api_call(&self) -> bool {
        self.method.is_some() || self.endpoint.is_some()
    }
}

/// An ordered list of steps derived from a diagram
///
/// Immutable once built: steps are only handed out by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessDefinition {
    name: String,
    description: Option<String>,
    #[serde(skip)]
    source: String,
    steps: Vec<Step>,
}

impl ProcessDefinition {
    /// Build a definition, reassigning step order as 0..N-1 in the given sequence
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        source: impl Into<String>,
        mut steps: Vec<Step>,
    ) -> Self {
        for (i, step) in steps.iter_mut().enumerate() {
            step.order = i;
        }
        Self {
            name: name.into(),
            description,
            source: source.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same definition under another name
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Raw diagram text the definition was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
