//! Query structures handed over by the parser
//!
//! A query is an ordered list of statements. Each statement names the
//! resource it calls, its call parameters, and the `only`/`hidden`
//! clauses consumed by the projection stage.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Selector token that keeps a whole subtree before refinements
pub const SELECT_ALL: &str = "*";

/// Regex argument of a `matches` selector
#[derive(Debug, Clone)]
pub enum MatchArg {
    /// Pattern source, compiled when the filter is applied
    Source(String),
    /// Pattern compiled ahead of time by the parser
    Compiled(Regex),
}

impl MatchArg {
    /// Returns the pattern source text
    pub fn as_str(&self) -> &str {
        match self {
            MatchArg::Source(source) => source,
            MatchArg::Compiled(regex) => regex.as_str(),
        }
    }

    /// Returns a compiled regex, compiling the source form on demand
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        match self {
            MatchArg::Source(source) => Regex::new(source),
            MatchArg::Compiled(regex) => Ok(regex.clone()),
        }
    }
}

impl PartialEq for MatchArg {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A leaf constraint: keep the target field only where it matches a regex
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Field path ending at the constrained field
    pub path: Vec<String>,
    /// Regex the rendered field value must match
    pub arg: MatchArg,
}

impl Match {
    /// Create a match over a dotted path with a pattern source
    pub fn new(dotted: &str, pattern: impl Into<String>) -> Self {
        Self {
            path: split_path(dotted),
            arg: MatchArg::Source(pattern.into()),
        }
    }

    /// Create a match with a pre-compiled regex
    pub fn compiled(dotted: &str, regex: Regex) -> Self {
        Self {
            path: split_path(dotted),
            arg: MatchArg::Compiled(regex),
        }
    }

    /// Returns the field path this match constrains
    pub fn target(&self) -> &[String] {
        &self.path
    }
}

/// One entry of a statement's `only` clause
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Plain field path, e.g. `address.city`
    Path(Vec<String>),
    /// Field path whose leaf carries a regex constraint
    Match(Match),
}

impl Selector {
    /// Plain selector from a dotted path
    pub fn path(dotted: &str) -> Self {
        Selector::Path(split_path(dotted))
    }

    /// Match selector from a dotted path and a pattern source
    pub fn matching(dotted: &str, pattern: impl Into<String>) -> Self {
        Selector::Match(Match::new(dotted, pattern))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Path(String),
    Match {
        path: String,
        #[serde(rename = "match")]
        pattern: String,
    },
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSelector::deserialize(deserializer)? {
            RawSelector::Path(path) => Selector::path(&path),
            RawSelector::Match { path, pattern } => Selector::matching(&path, pattern),
        })
    }
}

fn split_path(dotted: &str) -> Vec<String> {
    dotted
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of a call parameter
///
/// Chained parameters are resolved by the scheduler before the call; when
/// the source statement produced nothing usable the slot holds
/// [`ParamValue::EmptyChained`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ParamValue {
    /// Resolved scalar or opaque JSON value
    Value(Value),
    /// List of parameter values
    List(Vec<ParamValue>),
    /// Nested keyed parameter values
    Object(BTreeMap<String, ParamValue>),
    /// A chained value whose source produced nothing
    EmptyChained,
}

/// Wire marker for [`ParamValue::EmptyChained`]: `{"$emptyChained": true}`
pub const EMPTY_CHAINED_MARKER: &str = "$emptyChained";

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) if is_empty_chained_marker(&map) => ParamValue::EmptyChained,
            Value::Object(map) => {
                ParamValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            other => ParamValue::Value(other),
        }
    }
}

fn is_empty_chained_marker(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 1 && map.get(EMPTY_CHAINED_MARKER) == Some(&Value::Bool(true))
}

/// Cache directives declared on a statement (`use max-age = ...`)
///
/// Values stay dynamically typed; only well-formed integers take effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementCacheControl {
    #[serde(default)]
    pub max_age: Option<Value>,
    #[serde(default)]
    pub s_max_age: Option<Value>,
}

/// One clause of a query
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Target resource name
    pub resource: String,
    /// Alias disambiguating repeated calls to the same resource
    #[serde(default)]
    pub alias: Option<String>,
    /// Call parameters in declaration order
    #[serde(default, deserialize_with = "deserialize_params")]
    pub with: Vec<(String, ParamValue)>,
    /// Projection selectors; empty keeps the whole body
    #[serde(default)]
    pub only: Vec<Selector>,
    /// Exclude this statement's result from the response
    #[serde(default)]
    pub hidden: bool,
    /// Failures of this call do not fail the query
    #[serde(default)]
    pub ignore_errors: bool,
    #[serde(default)]
    pub cache_control: StatementCacheControl,
}

fn deserialize_params<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, ParamValue)>, D::Error> {
    let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    Ok(map.into_iter().map(|(k, v)| (k, v.into())).collect())
}

impl Statement {
    /// Create a statement calling `resource` with no clauses
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            alias: None,
            with: Vec::new(),
            only: Vec::new(),
            hidden: false,
            ignore_errors: false,
            cache_control: StatementCacheControl::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.with.push((name.into(), value.into()));
        self
    }

    pub fn with_only(mut self, selectors: Vec<Selector>) -> Self {
        self.only = selectors;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn ignoring_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }

    /// Returns the identity under which this statement's result is stored
    pub fn resource_id(&self) -> ResourceId {
        ResourceId::of(self)
    }
}

/// Identity of a statement's result inside [`Resources`](super::Resources)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Alias when present, resource name otherwise
    pub fn of(statement: &Statement) -> Self {
        match &statement.alias {
            Some(alias) if !alias.is_empty() => ResourceId(alias.clone()),
            _ => ResourceId(statement.resource.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId(id.to_string())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed query
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Query {
    pub statements: Vec<Statement>,
}

impl Query {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// Input of the HTTP call that carried the query
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryInput {
    #[serde(default)]
    pub params: HashMap<String, Value>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Per-query evaluation context
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryContext {
    #[serde(default)]
    pub input: QueryInput,
}

impl QueryContext {
    /// Context whose input carries the given query parameters
    pub fn with_params(params: HashMap<String, Value>) -> Self {
        Self {
            input: QueryInput {
                params,
                headers: HashMap::new(),
            },
        }
    }
}
