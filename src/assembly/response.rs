//! Result record assembly
//!
//! Every call ends in exactly one [`DoneResource`]: a success record built
//! from the response, an error record when the transport failed, or a
//! skipped record when chained parameters were unavailable. Failures of one
//! call are recorded here and never propagate to sibling resources.

use std::fmt;

use serde_json::Value;

use crate::config::GatewayConfig;
use crate::domain::{Details, DoneResource, HttpRequest, HttpResponse, ResponseBody, Statement};
use crate::observability::{log_event_with_fields, Event};

use super::cache_control::{self, CacheControlParser};
use super::debug;

/// Status of a call skipped for missing parameters
pub const SKIPPED_STATUS: u16 = 400;

/// Per-call options merged from statement and configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoneResourceOptions {
    pub debugging: bool,
    pub ignore_errors: bool,
    pub max_age: Option<Value>,
    pub s_max_age: Option<Value>,
}

impl DoneResourceOptions {
    /// Options for one call of `statement`
    ///
    /// Statement directives take precedence over configured defaults. A
    /// directive that is not an integer falls back to the default.
    pub fn resolve(statement: &Statement, config: &GatewayConfig, debugging: bool) -> Self {
        let directive = &statement.cache_control;
        let defaults = &config.cache_control;

        Self {
            debugging: debugging && config.debug_enabled,
            ignore_errors: statement.ignore_errors,
            max_age: integer_or(directive.max_age.as_ref(), defaults.max_age.as_ref()),
            s_max_age: integer_or(directive.s_max_age.as_ref(), defaults.s_max_age.as_ref()),
        }
    }
}

fn integer_or(directive: Option<&Value>, default: Option<&Value>) -> Option<Value> {
    directive
        .filter(|value| value.is_i64())
        .or(default)
        .cloned()
}

/// Returns true for statuses counted as a successful call
pub fn is_success(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Builds result records from completed exchanges
#[derive(Debug, Clone, Default)]
pub struct ResponseAssembler {
    cache_control: CacheControlParser,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a call that produced a response
    pub fn build_result(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
        options: &DoneResourceOptions,
    ) -> DoneResource {
        let header = self.cache_control.from_response(response);
        let defaults =
            cache_control::from_options(options.max_age.as_ref(), options.s_max_age.as_ref());

        let details = Details {
            status: response.status_code,
            success: is_success(response.status_code),
            ignore_errors: options.ignore_errors,
            cache_control: cache_control::merge(header, defaults),
            debug: options
                .debugging
                .then(|| debug::snapshot(request, response)),
        };

        let status = response.status_code.to_string();
        log_event_with_fields(
            Event::ResourceAssembled,
            &[("status", status.as_str()), ("url", response.url.as_str())],
        );

        DoneResource::new(details, response.body.clone())
    }

    /// Record for a call whose transport failed
    pub fn build_error_result(
        &self,
        err: &dyn fmt::Display,
        request: &HttpRequest,
        response: &HttpResponse,
        options: &DoneResourceOptions,
    ) -> DoneResource {
        let message = err.to_string();

        let details = Details {
            status: response.status_code,
            success: false,
            ignore_errors: options.ignore_errors,
            cache_control: Default::default(),
            debug: options
                .debugging
                .then(|| debug::snapshot(request, response)),
        };

        log_event_with_fields(
            Event::ResourceFailed,
            &[("error", message.as_str()), ("url", response.url.as_str())],
        );

        DoneResource::new(details, ResponseBody::Value(Value::String(message)))
    }

    /// Record for a call skipped because chained parameters were empty
    pub fn build_skipped_result(missing: &[String], options: &DoneResourceOptions) -> DoneResource {
        let message = skipped_message(missing);

        let details = Details {
            status: SKIPPED_STATUS,
            success: false,
            ignore_errors: options.ignore_errors,
            cache_control: Default::default(),
            debug: None,
        };

        let params = missing.join(",");
        log_event_with_fields(Event::ResourceSkipped, &[("params", params.as_str())]);

        DoneResource::new(details, ResponseBody::Value(Value::String(message)))
    }
}

fn skipped_message(missing: &[String]) -> String {
    let mut message = String::from("The request was skipped due to missing { ");
    for param in missing {
        message.push(':');
        message.push_str(param);
        message.push(' ');
    }
    message.push_str("} param value");
    message
}
