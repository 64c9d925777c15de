//! Per-resource result records
//!
//! A [`DoneResource`] is the normalized outcome of one backend call. The
//! scheduler stores them in [`Resources`] keyed by [`ResourceId`]; a
//! multiplexed statement stores an ordered list instead.

use std::collections::HashMap;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::query::{ResourceId, Statement};

/// Resolved results keyed by statement identity
pub type Resources = HashMap<ResourceId, ResourceValue>;

/// Cache policy attached to a result record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCacheControl {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s_max_age: Option<i64>,
}

impl ResourceCacheControl {
    /// Policy that forbids caching
    pub fn no_cache() -> Self {
        Self {
            no_cache: true,
            ..Self::default()
        }
    }

    /// Returns true when no directive is set
    pub fn is_empty(&self) -> bool {
        !self.no_cache && self.max_age.is_none() && self.s_max_age.is_none()
    }
}

/// Request/response metadata captured for `_debug` queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debugging {
    pub method: String,
    pub url: String,
    #[serde(default, rename = "queryParams")]
    pub params: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub request_headers: HashMap<String, String>,
    #[serde(default)]
    pub response_headers: HashMap<String, String>,
    #[serde(default, rename = "responseTimeMillis")]
    pub response_time: u64,
}

/// Status and policy metadata of a result record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub status: u16,
    pub success: bool,
    #[serde(default)]
    pub ignore_errors: bool,
    #[serde(default, skip_serializing_if = "ResourceCacheControl::is_empty")]
    pub cache_control: ResourceCacheControl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<Debugging>,
}

/// Body of a backend response
///
/// Bodies arrive as raw bytes and are decoded lazily, the first time a
/// stage needs to look inside them.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Bytes as received from the backend
    Raw(Vec<u8>),
    /// Decoded or synthesized JSON value
    Value(Value),
}

impl ResponseBody {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        ResponseBody::Raw(bytes.into())
    }

    /// Decode the body into a JSON value
    ///
    /// Empty bodies decode to `null`, non-JSON bodies to their text.
    pub fn unmarshal(&self) -> Value {
        match self {
            ResponseBody::Value(value) => value.clone(),
            ResponseBody::Raw(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Value::Null,
            ResponseBody::Raw(bytes) => serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
        }
    }

    /// Replace the body with a decoded value
    pub fn set_value(&mut self, value: Value) {
        *self = ResponseBody::Value(value);
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Value(Value::Null)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Value(value)
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseBody::Value(value) => value.serialize(serializer),
            ResponseBody::Raw(_) => self.unmarshal().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ResponseBody::Value)
    }
}

/// Normalized result of one backend call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoneResource {
    pub details: Details,
    #[serde(default)]
    pub result: ResponseBody,
}

impl DoneResource {
    pub fn new(details: Details, result: impl Into<ResponseBody>) -> Self {
        Self {
            details,
            result: result.into(),
        }
    }
}

/// Entry of [`Resources`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    /// Result of a single call
    Done(DoneResource),
    /// Results of a multiplexed statement, in call order
    Multiplexed(Vec<ResourceValue>),
    /// Statement the scheduler has not resolved
    Pending(Statement),
}

impl ResourceValue {
    /// Variant name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceValue::Done(_) => "DoneResource",
            ResourceValue::Multiplexed(_) => "DoneResources",
            ResourceValue::Pending(_) => "Statement",
        }
    }

    /// Returns the record when this is a single result
    pub fn as_done(&self) -> Option<&DoneResource> {
        match self {
            ResourceValue::Done(done) => Some(done),
            _ => None,
        }
    }
}

impl From<DoneResource> for ResourceValue {
    fn from(done: DoneResource) -> Self {
        ResourceValue::Done(done)
    }
}

impl Serialize for ResourceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResourceValue::Done(done) => done.serialize(serializer),
            ResourceValue::Multiplexed(list) => list.serialize(serializer),
            ResourceValue::Pending(_) => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for ResourceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        resource_value_from_json(Value::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

fn resource_value_from_json(value: Value) -> Result<ResourceValue, String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(resource_value_from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(ResourceValue::Multiplexed),
        Value::Object(_) => serde_json::from_value(value)
            .map(ResourceValue::Done)
            .map_err(|e| format!("invalid resource result: {}", e)),
        other => Err(format!("invalid resource result: {}", other)),
    }
}
