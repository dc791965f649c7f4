//! Process definition parsing
//!
//! Two diagram dialects are accepted: BPMN XML and arrow-style sequence
//! diagrams. Both produce the same [`ProcessDefinition`].

pub mod bpmn;
mod model;
pub mod sequence;

pub use model::{ProcessDefinition, Step, StepKind};

use clap::ValueEnum;
use crate::errors::FlowpulseError;

/// Diagram dialect selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    /// Detect from content
    #[default]
    Auto,
    /// BPMN 2.0 XML
    Bpmn,
    /// Arrow-style sequence diagram
    Sequence,
}

/// Markup starts with `<`; everything else is treated as an arrow diagram
pub fn detect_dialect(text: &str) -> Dialect {
    match text.trim_start().chars().next() {
        Some('<') => Dialect::Bpmn,
        _ => Dialect::Sequence,
    }
}

fn resolve(text: &str, dialect: Dialect) -> Dialect {
    match dialect {
        Dialect::Auto => detect_dialect(text),
        other => other,
    }
}

/// Parse diagram text into a process definition
pub fn parse_process(
    text: &str,
    name: Option<&str>,
    dialect: Dialect,
) -> Result<ProcessDefinition, FlowpulseError> {
    match resolve(text, dialect) {
        Dialect::Bpmn => bpmn::parse(text, name),
        _ => sequence::parse(text, name),
    }
}

/// Check that diagram text is well-formed without building a definition
pub fn validate_process(text: &str, dialect: Dialect) -> Result<(), FlowpulseError> {
    match resolve(text, dialect) {
        Dialect::Bpmn => bpmn::validate(text),
        _ => sequence::validate(text),
    }
}
