//! Human and machine readable execution output

use crate::output::Painter;
use crate::process::ProcessDefinition;

use super::execution::{Execution, ExecutionStatus, StepStatus};
use super::runner::{join_url, PlannedStep};

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────────";

/// Longest response body excerpt shown for a failed step
const BODY_EXCERPT_CHARS: usize = 200;

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Boxed summary of an execution
pub fn format_execution_results(execution: &Execution, painter: Painter) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", painter.muted(HEAVY_RULE)));
    output.push_str(&format!("{}\n", painter.title("                        EXECUTION RESULTS")));
    output.push_str(&format!("{}\n\n", painter.muted(HEAVY_RULE)));
    output.push_str(&format!(
        "  {} {} {}\n\n",
        painter.label("Process:"),
        execution.process_name,
        painter.muted(&format!("({} mode)", execution.mode))
    ));

    for result in &execution.step_results {
        let icon = match result.status {
            StepStatus::Success => painter.success("✓"),
            StepStatus::ValidationError => painter.warning("!"),
            StepStatus::Failed => painter.error("✗"),
        };
        let method = result.method.map(|m| m.as_str()).unwrap_or("---");
        let code = match result.http_status {
            Some(code) => painter.status(code),
            None => "---".to_string(),
        };

        output.push_str(&format!(
            "  {} Step {}: {} ({} {})\n",
            icon,
            result.order + 1,
            result.step_name,
            painter.method(method),
            code
        ));

        if let Some(ref url) = result.url {
            output.push_str(&format!("      URL: {}\n", url));
        }
        output.push_str(&format!("      Time: {:?}\n", result.duration));

        if let Some(ref error) = result.error {
            output.push_str(&format!("      Error: {}\n", painter.error(error)));
            if let Some(ref body) = result.response_payload {
                if !body.trim().is_empty() {
                    output.push_str(&format!("      Body: {}\n", painter.muted(&excerpt(body))));
                }
            }
        }

        for violation in &result.validation_errors {
            output.push_str(&format!("        {} {}\n", painter.warning("✗"), violation));
        }

        output.push('\n');
    }

    let total = execution.step_results.len();
    let passed = execution.step_results.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    output.push_str(&format!("{}\n", painter.muted(LIGHT_RULE)));
    output.push_str(&format!(
        "  Total: {} | Passed: {} | Failed: {} | Status: {}\n",
        total,
        passed,
        failed,
        match execution.status {
            ExecutionStatus::Completed => painter.success("COMPLETED"),
            other => painter.error(&other.to_string()),
        }
    ));
    if let Some(duration) = execution.duration() {
        output.push_str(&format!("  Duration: {} ms\n", duration.num_milliseconds()));
    }
    if let Some(ref summary) = execution.error_summary {
        output.push('\n');
        for line in summary.lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }
    output.push_str(&format!("{}\n", painter.muted(HEAVY_RULE)));

    output
}

/// Execution as JSON lines: one `step_result` per step, then an `execution_summary`
pub fn format_execution_json(execution: &Execution) -> String {
    let mut output = String::new();

    for result in &execution.step_results {
        let json = serde_json::json!({
            "level": if result.passed() { "info" } else { "error" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "event": "step_result",
            "execution_id": execution.id,
            "step_id": result.step_id,
            "step_name": result.step_name,
            "order": result.order,
            "status": result.status,
            "method": result.method,
            "url": result.url,
            "http_status": result.http_status,
            "duration_ms": result.duration.as_millis() as u64,
            "error": result.error,
            "validation_errors": result.validation_errors,
            "request_payload": result.request_payload,
            "response_payload": result.response_payload,
        });
        output.push_str(&serde_json::to_string(&json).unwrap_or_default());
        output.push('\n');
    }

    let total = execution.step_results.len();
    let passed = execution.step_results.iter().filter(|r| r.passed()).count();

    let summary = serde_json::json!({
        "level": if passed == total && execution.error_summary.is_none() { "info" } else { "error" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "event": "execution_summary",
        "execution_id": execution.id,
        "process": execution.process_name,
        "mode": execution.mode,
        "status": execution.status,
        "started_at": execution.started_at,
        "completed_at": execution.completed_at,
        "total": total,
        "passed": passed,
        "failed": total - passed,
        "error_summary": execution.error_summary,
    });
    output.push_str(&serde_json::to_string(&summary).unwrap_or_default());
    output.push('\n');

    output
}

/// Ordered step plan, optionally with resolved URLs
pub fn format_plan(
    process: &ProcessDefinition,
    plan: &[PlannedStep],
    base_url: Option<&str>,
    painter: Painter,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", painter.muted(HEAVY_RULE)));
    output.push_str(&format!("{}\n", painter.title("                         EXECUTION PLAN")));
    output.push_str(&format!("{}\n\n", painter.muted(HEAVY_RULE)));
    output.push_str(&format!("{} {}\n", painter.label("Process:"), process.name()));
    if let Some(description) = process.description() {
        output.push_str(&format!("  {}\n", painter.muted(description)));
    }
    output.push_str(&format!(
        "\n{} ({} steps):\n",
        painter.label("Execution Order"),
        painter.number(&plan.len().to_string())
    ));
    output.push_str(&format!("{}\n", painter.muted(LIGHT_RULE)));

    for step in plan {
        output.push_str(&format!(
            "\n{}{}{} {} {}\n",
            painter.muted("["),
            painter.number(&(step.order + 1).to_string()),
            painter.muted("]"),
            step.name,
            painter.muted(&format!("({})", step.id))
        ));

        if step.auth {
            output.push_str(&format!("    {}\n", painter.warning("credential request (no API call)")));
            continue;
        }

        match (&step.method, &step.endpoint) {
            (None, None) => {
                output.push_str(&format!("    {}\n", painter.muted("no API call")));
            }
            (method, endpoint) => {
                let method = method.map(|m| m.as_str()).unwrap_or("GET");
                let endpoint = endpoint.as_deref().unwrap_or(crate::schema::UNKNOWN_PATH);
                output.push_str(&format!("    {} {}\n", painter.method(method), endpoint));
                if let Some(resolved) = step.resolved.as_deref() {
                    if let Some(base) = base_url {
                        output.push_str(&format!("    {} {}\n", painter.muted("->"), join_url(base, resolved)));
                    } else if resolved != endpoint {
                        output.push_str(&format!("    {} {}\n", painter.muted("->"), resolved));
                    }
                }
            }
        }
    }

    output.push_str(&format!("\n{}\n", painter.muted(LIGHT_RULE)));
    if base_url.is_some() {
        output.push_str(&format!("{}\n", painter.muted("End of dry run. No requests were sent.")));
    }

    output
}
