//! Debug snapshots of resource calls
//!
//! A query asks for debug output with the `_debug` input parameter. When
//! enabled, every result record carries the request/response metadata of
//! its call.

use serde_json::Value;

use crate::domain::{Debugging, HttpRequest, HttpResponse, QueryContext};

/// Query parameter that requests debug output
pub const DEBUG_PARAM: &str = "_debug";

/// Returns true when the query's input asks for debug output
///
/// The parameter must be a string holding a boolean literal. Anything else
/// reads as "not requested".
pub fn is_debug_requested(ctx: &QueryContext) -> bool {
    match ctx.input.params.get(DEBUG_PARAM) {
        Some(Value::String(flag)) => parse_bool(flag).unwrap_or(false),
        _ => false,
    }
}

fn parse_bool(flag: &str) -> Option<bool> {
    match flag {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Capture the metadata of one exchange
pub fn snapshot(request: &HttpRequest, response: &HttpResponse) -> Debugging {
    Debugging {
        method: request.method.clone(),
        url: response.url.clone(),
        params: request.query.clone(),
        request_body: request.body.clone(),
        request_headers: request.headers.clone(),
        response_headers: response.headers.clone(),
        response_time: u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
    }
}
