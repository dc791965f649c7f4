//! Process execution engine
//!
//! Runs the steps of a [`ProcessDefinition`] strictly in order against one
//! [`ExecutionContext`], halting at the first step that does not succeed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::auth::{bearer_headers, AuthStepMatcher, CredentialProvider};
use crate::errors::FlowpulseError;
use crate::http::HttpMethod;
use crate::mapping::EndpointResolver;
use crate::process::{ProcessDefinition, Step};
use crate::schema::EndpointDescriptor;
use crate::testdata::TestDataSource;
use crate::validation::validate_response;

use super::context::{value_to_string, ExecutionContext};
use super::execution::{Execution, ExecutionMode, StepResult, StepStatus};
use super::overrides::OverrideTable;

/// Response fields copied into the context after a successful step
pub const DEFAULT_EXTRACT_FIELDS: &[&str] = &[
    "id",
    "accountId",
    "orderId",
    "transactionId",
    "externalAccountId",
    "externalAccountID",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shown instead of the client secret in auth step records
const HIDDEN_SECRET: &str = "***hidden***";

/// Length of the token prefix kept in auth step records
const TOKEN_PREVIEW_CHARS: usize = 50;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^{}/]+)\}").expect("Invalid placeholder regex")
});

/// Characters escaped when a value is placed into a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Stand-in for a path variable nothing supplied, stable for a given name
pub fn placeholder_filler(name: &str) -> String {
    let digest = hex::encode(Sha256::digest(name.as_bytes()));
    format!("{}-{}", name, &digest[..8])
}

/// Substitute every `{name}` in `path`
///
/// Values come from the payload, then the context. Names found in neither
/// get a [`placeholder_filler`], which is written back to both.
pub fn fill_path(path: &str, payload: &mut Map<String, Value>, ctx: &mut ExecutionContext) -> String {
    let names: Vec<String> = PLACEHOLDER_RE
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect();

    let mut filled = path.to_string();
    for name in names {
        let value = match payload.get(&name) {
            Some(v) => value_to_string(v),
            None => match ctx.get_string(&name) {
                Some(v) => v,
                None => {
                    let filler = placeholder_filler(&name);
                    warn!(placeholder = %name, value = %filler, "No value for path variable, using filler");
                    payload.insert(name.clone(), Value::String(filler.clone()));
                    ctx.insert(name.clone(), Value::String(filler.clone()));
                    filler
                }
            },
        };
        let encoded = utf8_percent_encode(&value, PATH_SEGMENT).to_string();
        filled = filled.replace(&format!("{{{}}}", name), &encoded);
    }
    filled
}

/// Join a base URL and a path; absolute paths are returned as-is
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

/// What a step would do, without running it
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub order: usize,
    pub id: String,
    pub name: String,
    pub method: Option<HttpMethod>,
    pub endpoint: Option<String>,
    pub resolved: Option<String>,
    pub auth: bool,
}

/// Runs process definitions
///
/// One engine can serve several concurrent executions; each call to
/// [`ExecutionEngine::execute`] owns its own context and results.
pub struct ExecutionEngine {
    client: Client,
    base_url: String,
    mode: ExecutionMode,
    timeout: Duration,
    resolver: Arc<EndpointResolver>,
    credentials: Option<Arc<CredentialProvider>>,
    auth_matcher: AuthStepMatcher,
    data_source: Option<Arc<dyn TestDataSource>>,
    overrides: OverrideTable,
    extract_fields: Vec<String>,
}

impl ExecutionEngine {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            mode: ExecutionMode::Standard,
            timeout: DEFAULT_TIMEOUT,
            resolver: Arc::new(EndpointResolver::new()),
            credentials: None,
            auth_matcher: AuthStepMatcher::default(),
            data_source: None,
            overrides: OverrideTable::default(),
            extract_fields: DEFAULT_EXTRACT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<EndpointResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_auth_matcher(mut self, matcher: AuthStepMatcher) -> Self {
        self.auth_matcher = matcher;
        self
    }

    pub fn with_data_source(mut self, source: Arc<dyn TestDataSource>) -> Self {
        self.data_source = Some(source);
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_extract_fields(mut self, fields: Vec<String>) -> Self {
        self.extract_fields = fields;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolved plan for each step, in execution order
    pub fn plan(&self, process: &ProcessDefinition) -> Vec<PlannedStep> {
        process
            .steps()
            .iter()
            .map(|step| PlannedStep {
                order: step.order,
                id: step.id.clone(),
                name: step.name.clone(),
                method: step.method,
                endpoint: step.endpoint.clone(),
                resolved: step.endpoint.as_deref().map(|e| self.resolver.resolve(e)),
                auth: self.auth_matcher.is_auth_step(step),
            })
            .collect()
    }

    /// Run every step in order and return the settled execution
    ///
    /// Never returns an error: engine-level faults end the execution as
    /// FAILED with whatever results were recorded up to that point.
    pub async fn execute(&self, process: &ProcessDefinition, initial: Map<String, Value>) -> Execution {
        let mut execution = Execution::start(process.name(), self.mode);
        info!(
            process = %process.name(),
            mode = %self.mode,
            steps = process.len(),
            execution = %execution.id,
            "Starting execution"
        );

        let mut ctx = ExecutionContext::with_initial(initial);
        match self.run_steps(process, &mut ctx, &mut execution).await {
            Ok(()) => execution.finish(),
            Err(e) => {
                error!(error = %e, "Execution aborted");
                execution.abort(&e);
            }
        }

        info!(
            status = %execution.status,
            recorded = execution.step_results.len(),
            "Execution finished"
        );
        execution
    }

    async fn run_steps(
        &self,
        process: &ProcessDefinition,
        ctx: &mut ExecutionContext,
        execution: &mut Execution,
    ) -> Result<(), FlowpulseError> {
        url::Url::parse(&self.base_url).map_err(|e| {
            FlowpulseError::Pipeline(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        for step in process.steps() {
            let result = self.run_step(step, ctx).await;
            let passed = result.passed();
            execution.record(result);

            if !passed {
                warn!(step = %step.name, "Step did not succeed, stopping execution");
                break;
            }
        }
        Ok(())
    }

    async fn run_step(&self, step: &Step, ctx: &mut ExecutionContext) -> StepResult {
        let started = Instant::now();
        info!(
            step = %step.name,
            order = step.order,
            method = step.method.map(|m| m.as_str()).unwrap_or("-"),
            endpoint = step.endpoint.as_deref().unwrap_or("-"),
            "Executing step"
        );

        let mut result = if self.auth_matcher.is_auth_step(step) {
            self.run_auth_step(step, ctx).await
        } else if !step.is_api_call() {
            debug!(step = %step.name, "No API call attached, recording marker");
            StepResult::for_step(step)
        } else {
            self.run_api_step(step, ctx).await
        };

        result.duration = started.elapsed();
        match result.status {
            StepStatus::Success => info!(step = %step.name, status = ?result.http_status, "Step succeeded"),
            _ => warn!(
                step = %step.name,
                status = %result.status,
                error = result.error.as_deref().unwrap_or("-"),
                "Step did not succeed"
            ),
        }
        result
    }

    async fn run_auth_step(&self, step: &Step, ctx: &mut ExecutionContext) -> StepResult {
        let mut result = StepResult::for_step(step);

        let Some(provider) = self.credentials.as_ref() else {
            return result.fail("Authentication failed: no credentials configured");
        };

        let token = match provider.get_token().await {
            Ok(token) => token,
            Err(e) => return result.fail(format!("Authentication failed: {}", e)),
        };

        let preview: String = token.access_token.chars().take(TOKEN_PREVIEW_CHARS).collect();
        result.url = Some(provider.config().token_url.clone());
        result.request_payload = Some(json!({
            "grant_type": "client_credentials",
            "client_id": provider.config().client_id,
            "client_secret": HIDDEN_SECRET,
        }));
        result.response_payload = Some(
            json!({
                "access_token": format!("{}...", preview),
                "token_type": "Bearer",
                "expires_in": token.expires_in,
            })
            .to_string(),
        );
        result.http_status = Some(200);

        ctx.set_access_token(token.access_token);
        info!(step = %step.name, "Authentication step succeeded");
        result
    }

    /// Build the request body for a step
    fn compose_payload(
        &self,
        descriptor: &EndpointDescriptor,
        candidates: &[&str],
        ctx: &ExecutionContext,
    ) -> Map<String, Value> {
        let mut payload = Map::new();

        if let Some(ref source) = self.data_source {
            payload.extend(source.generate(descriptor, ctx));
        }

        let context_fields = ctx.fields().iter().map(|(k, v)| (k.clone(), v.clone()));
        match self.overrides.find(candidates) {
            Some(o) => {
                debug!(endpoint = %o.endpoint, "Applying payload override");
                if o.merge_context {
                    payload.extend(context_fields);
                }
                payload.extend(o.payload.clone());
            }
            None => payload.extend(context_fields),
        }
        payload
    }

    async fn headers(&self, ctx: &ExecutionContext) -> Result<HeaderMap, FlowpulseError> {
        if let Some(ref provider) = self.credentials {
            return provider.auth_headers().await;
        }
        if let Some(token) = ctx.access_token() {
            return bearer_headers(token);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn run_api_step(&self, step: &Step, ctx: &mut ExecutionContext) -> StepResult {
        let mut result = StepResult::for_step(step);

        let descriptor = EndpointDescriptor::from_step(step);
        let method = step.method.unwrap_or(descriptor.method);
        result.method = Some(method);

        let logical = step.endpoint.clone().unwrap_or_else(|| descriptor.path.clone());
        let resolved = self.resolver.resolve(&logical);
        if resolved != logical {
            info!(from = %logical, to = %resolved, "Endpoint mapped");
        }

        let mut payload = self.compose_payload(&descriptor, &[logical.as_str(), resolved.as_str()], ctx);
        let url = join_url(&self.base_url, &fill_path(&resolved, &mut payload, ctx));
        result.url = Some(url.clone());

        let headers = match self.headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return result.fail(format!("Authentication failed: {}", e)),
        };

        let mut request = self
            .client
            .request(method.to_reqwest(), &url)
            .headers(headers)
            .timeout(self.timeout);
        if method.has_body() {
            request = request.json(&payload);
            result.request_payload = Some(Value::Object(payload));
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = FlowpulseError::from_transport(e, self.timeout);
                return result.fail(err.to_string());
            }
        };

        let status = response.status();
        result.http_status = Some(status.as_u16());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let err = FlowpulseError::from_transport(e, self.timeout);
                return result.fail(err.to_string());
            }
        };
        result.response_payload = Some(body.clone());

        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(|r| format!(" {}", r))
                .unwrap_or_default();
            return result.fail(format!("HTTP {}{}", status.as_u16(), reason));
        }

        let violations = validate_response(status.as_u16(), &body, &descriptor);
        if !violations.is_empty() {
            result.status = StepStatus::ValidationError;
            result.validation_errors = violations;
            return result;
        }

        self.extract(step, &body, ctx);
        result
    }

    /// Copy well-known fields and every `<stepId>_<field>` into the context
    fn extract(&self, step: &Step, body: &str, ctx: &mut ExecutionContext) {
        if body.trim().is_empty() {
            return;
        }
        let object = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return,
            Err(e) => {
                debug!(step = %step.name, error = %e, "Response is not JSON, nothing to extract");
                return;
            }
        };

        for field in &self.extract_fields {
            if let Some(value) = object.get(field) {
                debug!(field = %field, value = %value, "Extracted field");
                ctx.insert(field.clone(), value.clone());
            }
        }
        for (key, value) in object {
            ctx.insert_step_field(&step.id, &key, value);
        }
    }
}
