//! Execution and step result records

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::http::HttpMethod;
use crate::process::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Success,
    Failed,
    /// The call completed but the response broke its schema
    ValidationError,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepStatus::Success => "SUCCESS",
            StepStatus::Failed => "FAILED",
            StepStatus::ValidationError => "VALIDATION_ERROR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Failed => "FAILED",
        })
    }
}

/// Which API environment a run targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    /// Plain TLS against the standard base URL
    #[default]
    Standard,
    /// Client-certificate TLS against the GOST base URL
    Gost,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Standard => "STANDARD",
            ExecutionMode::Gost => "GOST",
        })
    }
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step_id: String,
    pub step_name: String,
    pub order: usize,
    pub status: StepStatus,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub request_payload: Option<Value>,
    pub response_payload: Option<String>,
    pub http_status: Option<u16>,
    pub error: Option<String>,
    pub validation_errors: Vec<String>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl StepResult {
    /// Empty successful result for a step
    pub fn for_step(step: &Step) -> Self {
        Self {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            order: step.order,
            status: StepStatus::Success,
            method: step.method,
            url: None,
            request_payload: None,
            response_payload: None,
            http_status: None,
            error: None,
            validation_errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// One run of a process definition
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub id: Uuid,
    pub process_name: String,
    pub mode: ExecutionMode,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub step_results: Vec<StepResult>,
    pub error_summary: Option<String>,
}

impl Execution {
    pub fn start(process_name: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_name: process_name.into(),
            mode,
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            step_results: Vec::new(),
            error_summary: None,
        }
    }

    pub fn record(&mut self, result: StepResult) {
        self.step_results.push(result);
    }

    /// Settle the status from the recorded results
    pub fn finish(&mut self) {
        let all_passed = self.step_results.iter().all(StepResult::passed);
        self.status = if all_passed {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        if !all_passed {
            self.error_summary = Some(self.failure_summary());
        }
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run failed for a reason outside any single step
    pub fn abort(&mut self, message: impl fmt::Display) {
        self.status = ExecutionStatus::Failed;
        self.error_summary = Some(format!("Execution failed: {}", message));
        self.completed_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    fn failure_summary(&self) -> String {
        let mut summary = String::from("Execution failed with the following errors:\n\n");
        for result in self.step_results.iter().filter(|r| !r.passed()) {
            summary.push_str(&format!("Step: {}\n", result.step_name));
            summary.push_str(&format!("Status: {}\n", result.status));
            if let Some(ref error) = result.error {
                summary.push_str(&format!("Error: {}\n", error));
            }
            for violation in &result.validation_errors {
                summary.push_str(&format!("Validation: {}\n", violation));
            }
            summary.push('\n');
        }
        summary
    }
}
