//! CLI command implementations
//!
//! Each command reads one JSON request from stdin and writes one envelope
//! to stdout. The request handlers themselves are pure so they can be
//! driven without a process around them.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::assembly::{
    find_missing_params, is_debug_requested, DoneResourceOptions, ResponseAssembler,
};
use crate::config::GatewayConfig;
use crate::domain::{
    HttpRequest, HttpResponse, Query, QueryContext, QueryInput, Resources, ResponseBody, Statement,
};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::projection::{apply_filters, apply_hidden};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Input of the `filter` command
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub query: Query,
    #[serde(default)]
    pub resources: Resources,
}

/// Input of the `assemble` command
#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    pub statement: Statement,
    #[serde(default)]
    pub context: QueryInput,
    #[serde(default)]
    pub request: HttpRequest,
    #[serde(default)]
    pub response: ResponseInput,
    /// Transport failure reported for the call
    #[serde(default)]
    pub error: Option<String>,
}

/// Response half of an exchange as it arrives on the wire
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInput {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub duration_ms: u64,
}

impl From<ResponseInput> for HttpResponse {
    fn from(input: ResponseInput) -> Self {
        HttpResponse {
            status_code: input.status_code,
            url: input.url,
            headers: input.headers,
            body: ResponseBody::Value(input.body),
            duration: Duration::from_millis(input.duration_ms),
        }
    }
}

/// Parse CLI arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command, cli.config.as_deref())
}

/// Run a command against stdin/stdout
///
/// Failures after the configuration is loaded are also reported as an
/// error envelope on stdout.
pub fn run_command(command: Command, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let scope = ObservationScope::new(command.scope_name());

    let outcome = read_request().and_then(|request| match command {
        Command::Filter => filter(request),
        Command::Assemble => assemble(request, &config),
    });

    match outcome {
        Ok(data) => {
            write_response(data)?;
            scope.complete();
            Ok(())
        }
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            scope.fail(e.code_str());
            Err(e)
        }
    }
}

/// Load the gateway configuration, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<GatewayConfig> {
    let Some(path) = path else {
        return Ok(GatewayConfig::default());
    };

    let config = GatewayConfig::load(path)?;
    let debug_enabled = config.debug_enabled.to_string();
    let location = path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("debug_enabled", debug_enabled.as_str()),
            ("path", location.as_str()),
        ],
    );

    Ok(config)
}

/// Apply a query's `only` and `hidden` clauses to its resolved results
pub fn filter(request: Value) -> CliResult<Value> {
    let FilterRequest { query, resources } = serde_json::from_value(request)
        .map_err(|e| CliError::invalid_request(format!("Invalid filter request: {}", e)))?;

    let filtered = apply_filters(&query, &resources)?;
    let visible = apply_hidden(&query, filtered);

    Ok(serde_json::to_value(visible)?)
}

/// Build the result record of one call
pub fn assemble(request: Value, config: &GatewayConfig) -> CliResult<Value> {
    let AssembleRequest {
        statement,
        context,
        request,
        response,
        error,
    } = serde_json::from_value(request)
        .map_err(|e| CliError::invalid_request(format!("Invalid assemble request: {}", e)))?;

    let ctx = QueryContext { input: context };
    let options = DoneResourceOptions::resolve(&statement, config, is_debug_requested(&ctx));

    let missing = find_missing_params(&statement);
    let record = if !missing.is_empty() {
        ResponseAssembler::build_skipped_result(&missing, &options)
    } else {
        let assembler = ResponseAssembler::new();
        let response = HttpResponse::from(response);

        match error {
            Some(message) => assembler.build_error_result(&message, &request, &response, &options),
            None => assembler.build_result(&request, &response, &options),
        }
    };

    Ok(serde_json::to_value(record)?)
}
