use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::Map;
use tracing::{debug, info};

use crate::auth::{AuthStepMatcher, CredentialProvider};
use crate::cli::Args;
use crate::config::{Config, EnvVars};
use crate::errors::FlowpulseError;
use crate::http::{build_client, TlsOptions};
use crate::logging;
use crate::mapping::EndpointResolver;
use crate::output::Painter;
use crate::pipeline::{
    format_execution_json, format_execution_results, format_plan, ExecutionEngine, ExecutionMode,
    OverrideTable,
};
use crate::process::{bpmn, detect_dialect, parse_process, sequence, Dialect, ProcessDefinition};
use crate::status::ExitStatus;
use crate::testdata::SchemaDataGenerator;

/// Main entry point for the CLI.
///
/// Parses arguments, sets up logging and drives [`program`] on a tokio runtime.
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    logging::init(parsed.verbose, parsed.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(FlowpulseError::Io(e)),
    };

    match runtime.block_on(program(parsed)) {
        Ok(status) => status,
        Err(e) => handle_error(e),
    }
}

pub async fn program(args: Args) -> Result<ExitStatus, FlowpulseError> {
    let config = load_config(&args)?;
    let process = load_process(&args)?;
    info!(process = %process.name(), steps = process.len(), "Parsed diagram");

    let timeout = match args.timeout {
        Some(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
        Some(secs) => {
            return Err(FlowpulseError::Argument(format!("Invalid timeout: {}", secs)));
        }
        None => config.timeout()?,
    };
    let base_url = config.base_url_for(args.mode).map(str::to_string);
    let painter = Painter::for_stdout();

    if args.validate || args.dry_run {
        let client = build_client(timeout, &TlsOptions::default())?;
        let engine = configure(ExecutionEngine::new(client, base_url.clone().unwrap_or_default()), &config)?;
        let plan = engine.plan(&process);
        let shown_base = if args.dry_run {
            Some(base_url.as_deref().unwrap_or(""))
        } else {
            None
        };
        print!("{}", format_plan(&process, &plan, shown_base, painter));
        return Ok(ExitStatus::Success);
    }

    let base_url = base_url.ok_or_else(|| {
        FlowpulseError::Config(format!(
            "No base URL configured for {} mode (use --base-url or FLOWPULSE_BASE_URL)",
            args.mode
        ))
    })?;

    let tls = match args.mode {
        ExecutionMode::Gost => config.tls_options(),
        ExecutionMode::Standard => TlsOptions::default(),
    };
    let client = build_client(timeout, &tls)?;

    let mut engine = configure(ExecutionEngine::new(client, base_url), &config)?
        .with_mode(args.mode)
        .with_timeout(timeout);

    if let Some(credentials) = config.credential_config() {
        let token_client = build_client(timeout, &TlsOptions::default())?;
        engine = engine.with_credentials(Arc::new(CredentialProvider::new(credentials, token_client)));
    } else {
        debug!("No token URL configured, auth steps will fail");
    }

    if args.generate_data {
        engine = engine.with_data_source(Arc::new(SchemaDataGenerator::new()));
    }

    let initial: Map<String, serde_json::Value> = args.vars.iter().cloned().collect();
    let execution = engine.execute(&process, initial).await;

    if args.json {
        print!("{}", format_execution_json(&execution));
    } else {
        print!("{}", format_execution_results(&execution, painter));
    }

    Ok(ExitStatus::from_execution(execution.status))
}

/// File config, then `.env` / environment, then CLI flags
fn load_config(args: &Args) -> Result<Config, FlowpulseError> {
    let env = EnvVars::load_default()?;
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env(&env);

    if let Some(ref url) = args.base_url {
        match args.mode {
            ExecutionMode::Standard => config.api.base_url = Some(url.clone()),
            ExecutionMode::Gost => config.api.gost_base_url = Some(url.clone()),
        }
    }
    if let Some(ref url) = args.auth_url {
        config.auth.token_url = Some(url.clone());
    }
    if let Some(ref id) = args.client_id {
        config.auth.client_id = Some(id.clone());
    }
    if let Some(ref secret) = args.client_secret {
        config.auth.client_secret = Some(secret.as_str().to_string());
    }

    Ok(config)
}

fn load_process(args: &Args) -> Result<ProcessDefinition, FlowpulseError> {
    let text = std::fs::read_to_string(&args.diagram).map_err(|e| {
        FlowpulseError::Argument(format!("Cannot read diagram {}: {}", args.diagram.display(), e))
    })?;

    let dialect = match args.dialect {
        Dialect::Auto => detect_dialect(&text),
        other => other,
    };
    debug!(?dialect, path = %args.diagram.display(), "Parsing diagram");

    let process = parse_process(&text, args.name.as_deref(), dialect)?;
    if args.name.is_some() {
        return Ok(process);
    }

    let fallback = match dialect {
        Dialect::Bpmn => bpmn::DEFAULT_NAME,
        _ => sequence::DEFAULT_NAME,
    };
    match file_stem(&args.diagram) {
        Some(stem) if process.name() == fallback => Ok(process.renamed(stem)),
        _ => Ok(process),
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

/// Shared engine wiring for planning and execution
fn configure(engine: ExecutionEngine, config: &Config) -> Result<ExecutionEngine, FlowpulseError> {
    let resolver = EndpointResolver::from_mappings(&config.mappings)?;
    let overrides = OverrideTable::new(config.overrides.clone())?;
    let matcher = AuthStepMatcher::new(
        config.auth.endpoint_patterns.clone(),
        config.auth.name_patterns.clone(),
    );

    Ok(engine
        .with_resolver(Arc::new(resolver))
        .with_overrides(overrides)
        .with_auth_matcher(matcher)
        .with_extract_fields(config.extract.fields.clone()))
}

fn handle_error(error: FlowpulseError) -> ExitStatus {
    eprintln!("Error: {}", error);
    ExitStatus::Error
}
