//! Process execution
//!
//! - [`context`]: the per-execution variable store
//! - [`overrides`]: fixed payloads for specific endpoints
//! - [`execution`]: execution and step result records
//! - [`runner`]: the step loop
//! - [`report`]: console and JSON-lines output

pub mod context;
pub mod execution;
pub mod overrides;
pub mod report;
pub mod runner;

pub use context::ExecutionContext;
pub use execution::{Execution, ExecutionMode, ExecutionStatus, StepResult, StepStatus};
pub use overrides::{OverrideTable, PayloadOverride};
pub use report::{format_execution_json, format_execution_results, format_plan};
pub use runner::{ExecutionEngine, PlannedStep, DEFAULT_EXTRACT_FIELDS, DEFAULT_TIMEOUT};
