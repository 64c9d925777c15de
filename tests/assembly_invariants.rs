//! Assembly Invariant Tests
//!
//! Tests for result record assembly:
//! - Success is derived from the status code
//! - Cache policies merge, most restrictive wins
//! - Statement directives override configured defaults
//! - Calls with empty chained parameters are skipped, not failed
//! - Debug snapshots follow the `_debug` parameter and configuration

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use restgate::assembly::{
    find_missing_params, is_debug_requested, merge, DoneResourceOptions, ResponseAssembler,
    DEBUG_PARAM, SKIPPED_STATUS,
};
use restgate::config::GatewayConfig;
use restgate::domain::{
    HttpRequest, HttpResponse, ParamValue, QueryContext, ResourceCacheControl, ResponseBody,
    Statement,
};
use serde_json::json;
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn request() -> HttpRequest {
    HttpRequest {
        method: "GET".to_string(),
        url: "http://heroes/api".to_string(),
        ..Default::default()
    }
}

fn response(status: u16, cache_control: Option<&str>) -> HttpResponse {
    let mut headers = HashMap::new();
    if let Some(value) = cache_control {
        headers.insert("Cache-Control".to_string(), value.to_string());
    }

    HttpResponse {
        status_code: status,
        url: "http://heroes/api".to_string(),
        headers,
        body: ResponseBody::raw(r#"{"name": "batman"}"#),
        duration: Duration::from_millis(42),
    }
}

fn cc(no_cache: bool, max_age: Option<i64>, s_max_age: Option<i64>) -> ResourceCacheControl {
    ResourceCacheControl {
        no_cache,
        max_age,
        s_max_age,
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// =============================================================================
// Status Tests
// =============================================================================

/// 2xx and 3xx are successful, everything else is not.
#[test]
fn test_status_classification() {
    let assembler = ResponseAssembler::new();
    let options = DoneResourceOptions::default();

    for (status, success) in [(204, true), (302, true), (404, false), (502, false)] {
        let done = assembler.build_result(&request(), &response(status, None), &options);
        assert_eq!(done.details.status, status);
        assert_eq!(done.details.success, success, "status {}", status);
    }
}

// =============================================================================
// Cache-Control Tests
// =============================================================================

/// Merge precedence over header and default policies.
#[test]
fn test_cache_control_precedence() {
    assert_eq!(
        merge(Some(cc(true, None, None)), Some(cc(false, Some(60), None))),
        cc(true, None, None)
    );
    assert_eq!(
        merge(Some(cc(false, Some(120), None)), Some(cc(false, Some(30), None))),
        cc(false, Some(30), None)
    );
    assert_eq!(merge(None, Some(cc(false, None, Some(10)))), cc(false, None, Some(10)));
    assert_eq!(merge(None, None), ResourceCacheControl::default());
}

/// A `no-cache` header beats any configured age.
#[test]
fn test_no_cache_header_wins_over_defaults() {
    let config = GatewayConfig::from_json(r#"{"cacheControl": {"maxAge": 60}}"#).unwrap();
    let options = DoneResourceOptions::resolve(&Statement::new("heroes"), &config, false);

    let done = ResponseAssembler::new().build_result(
        &request(),
        &response(200, Some("no-cache")),
        &options,
    );
    assert_eq!(done.details.cache_control, ResourceCacheControl::no_cache());
}

/// Statement directives take precedence over configured defaults.
#[test]
fn test_statement_directive_overrides_config() {
    let config = GatewayConfig::from_json(r#"{"cacheControl": {"maxAge": 600, "sMaxAge": 60}}"#)
        .unwrap();
    let statement: Statement = serde_json::from_value(json!({
        "resource": "heroes",
        "cacheControl": {"maxAge": 900}
    }))
    .unwrap();

    let options = DoneResourceOptions::resolve(&statement, &config, false);
    assert_eq!(options.max_age, Some(json!(900)));
    assert_eq!(options.s_max_age, Some(json!(60)));

    let done = ResponseAssembler::new().build_result(&request(), &response(200, None), &options);
    assert_eq!(done.details.cache_control, cc(false, Some(900), Some(60)));
}

/// Non-integer directives are ignored.
#[test]
fn test_non_integer_directive_ignored() {
    let options = DoneResourceOptions {
        max_age: Some(json!("sixty")),
        ..Default::default()
    };

    let done = ResponseAssembler::new().build_result(&request(), &response(200, None), &options);
    assert!(done.details.cache_control.is_empty());
}

// =============================================================================
// Skipped Call Tests
// =============================================================================

/// Only parameters holding the sentinel are reported missing.
#[test]
fn test_find_missing_params() {
    let statement = Statement::new("heroes")
        .with_param("id", ParamValue::EmptyChained)
        .with_param("name", json!("x"));

    assert_eq!(find_missing_params(&statement), vec!["id".to_string()]);
}

/// A skipped call is a well-formed 400 record.
#[test]
fn test_skipped_record() {
    let statement = Statement::new("heroes")
        .with_param("id", ParamValue::EmptyChained)
        .with_param("name", ParamValue::EmptyChained)
        .ignoring_errors();
    let options = DoneResourceOptions::resolve(&statement, &GatewayConfig::default(), true);

    let missing = find_missing_params(&statement);
    let done = ResponseAssembler::build_skipped_result(&missing, &options);

    assert_eq!(done.details.status, SKIPPED_STATUS);
    assert!(!done.details.success);
    assert!(done.details.ignore_errors);
    assert!(done.details.debug.is_none());
    assert_eq!(
        done.result.unmarshal(),
        json!("The request was skipped due to missing { :id :name } param value")
    );
}

// =============================================================================
// Debug Tests
// =============================================================================

/// `_debug=true` attaches a snapshot of the exchange.
#[test]
fn test_debug_snapshot_attached() {
    let mut params = HashMap::new();
    params.insert(DEBUG_PARAM.to_string(), json!("true"));
    let ctx = QueryContext::with_params(params);
    assert!(is_debug_requested(&ctx));

    let options = DoneResourceOptions::resolve(
        &Statement::new("heroes"),
        &GatewayConfig::default(),
        is_debug_requested(&ctx),
    );
    let done = ResponseAssembler::new().build_result(&request(), &response(200, None), &options);

    let debug = done.details.debug.unwrap();
    assert_eq!(debug.method, "GET");
    assert_eq!(debug.url, "http://heroes/api");
    assert_eq!(debug.response_time, 42);
}

/// Configuration can switch debug output off.
#[test]
fn test_debug_disabled_by_config() {
    let config = GatewayConfig::from_json(r#"{"debugEnabled": false}"#).unwrap();
    let options = DoneResourceOptions::resolve(&Statement::new("heroes"), &config, true);

    let done = ResponseAssembler::new().build_result(&request(), &response(200, None), &options);
    assert!(done.details.debug.is_none());
}

// =============================================================================
// Configuration Tests
// =============================================================================

/// Configuration loads from a file.
#[test]
fn test_config_from_file() {
    let file = config_file(r#"{"debugEnabled": false, "cacheControl": {"sMaxAge": 5}}"#);

    let config = GatewayConfig::load(file.path()).unwrap();
    assert!(!config.debug_enabled);
    assert_eq!(config.cache_control.s_max_age, Some(json!(5)));
}

/// The CLI falls back to defaults without a config path.
#[test]
fn test_cli_config_defaults() {
    let config = restgate::cli::load_config(None).unwrap();
    assert_eq!(config, GatewayConfig::default());

    let file = config_file("{broken");
    let err = restgate::cli::load_config(Some(file.path())).unwrap_err();
    assert_eq!(err.code_str(), "GATE_CLI_CONFIG_ERROR");
}
