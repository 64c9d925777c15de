//! Cache-Control merging
//!
//! A result's cache policy comes from two independent sources: the
//! backend's `Cache-Control` response header and the call-level defaults
//! (statement directive or gateway configuration). When both are present
//! the most restrictive directive wins.

use regex::Regex;
use serde_json::Value;

use crate::domain::{HttpResponse, ResourceCacheControl};

/// Response header carrying the backend's cache policy
pub const CACHE_CONTROL_HEADER: &str = "Cache-Control";

/// Parser for `Cache-Control` header values
///
/// Token patterns are compiled once, on construction.
#[derive(Debug, Clone)]
pub struct CacheControlParser {
    max_age: Regex,
    s_max_age: Regex,
    no_cache: Regex,
}

impl CacheControlParser {
    pub fn new() -> Self {
        Self {
            max_age: token_pattern(r"max-age=(\d+)"),
            s_max_age: token_pattern(r"s-maxage=(\d+)"),
            no_cache: token_pattern(r"no-cache"),
        }
    }

    /// Policy declared by a response, if it carries any directive
    pub fn from_response(&self, response: &HttpResponse) -> Option<ResourceCacheControl> {
        response
            .header(CACHE_CONTROL_HEADER)
            .and_then(|value| self.from_header(value))
    }

    /// Parse a header value
    ///
    /// `no-cache` overrides any age directive. Returns `None` when no
    /// recognized directive is present.
    pub fn from_header(&self, value: &str) -> Option<ResourceCacheControl> {
        if self.no_cache.is_match(value) {
            return Some(ResourceCacheControl::no_cache());
        }

        let cc = ResourceCacheControl {
            no_cache: false,
            max_age: first_seconds(&self.max_age, value),
            s_max_age: first_seconds(&self.s_max_age, value),
        };

        if cc.is_empty() {
            None
        } else {
            Some(cc)
        }
    }
}

impl Default for CacheControlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn token_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("cache-control token pattern is a valid regex")
}

fn first_seconds(pattern: &Regex, value: &str) -> Option<i64> {
    pattern
        .captures(value)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Policy declared by call options
///
/// Each directive counts only when it is an integer.
pub fn from_options(
    max_age: Option<&Value>,
    s_max_age: Option<&Value>,
) -> Option<ResourceCacheControl> {
    let cc = ResourceCacheControl {
        no_cache: false,
        max_age: max_age.and_then(Value::as_i64),
        s_max_age: s_max_age.and_then(Value::as_i64),
    };

    if cc.is_empty() {
        None
    } else {
        Some(cc)
    }
}

/// Merge header and default policies, most restrictive wins
pub fn merge(
    header: Option<ResourceCacheControl>,
    defaults: Option<ResourceCacheControl>,
) -> ResourceCacheControl {
    match (header, defaults) {
        (None, None) => ResourceCacheControl::default(),
        (Some(cc), None) | (None, Some(cc)) => cc,
        (Some(first), Some(second)) => most_restrictive(first, second),
    }
}

fn most_restrictive(
    first: ResourceCacheControl,
    second: ResourceCacheControl,
) -> ResourceCacheControl {
    if first.no_cache || second.no_cache {
        return ResourceCacheControl::no_cache();
    }

    ResourceCacheControl {
        no_cache: false,
        max_age: shortest(first.max_age, second.max_age),
        s_max_age: shortest(first.s_max_age, second.s_max_age),
    }
}

fn shortest(first: Option<i64>, second: Option<i64>) -> Option<i64> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
