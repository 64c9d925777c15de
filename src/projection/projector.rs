//! Projection of a decoded body through a filter tree
//!
//! The input value is only read. Output nodes are built fresh; under the
//! select-all marker a node starts as a copy of the source node and named
//! rules are applied to the copy. The marker covers only the node it sits
//! on: array elements are projected with the named rules alone.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::domain::Match;

use super::errors::{FilterError, FilterResult};
use super::tree::{FilterNode, FilterTree};

/// Project `value` through `tree`
///
/// Objects keep the fields named by the tree (all fields under `*`),
/// arrays apply the named rules to every element, and scalars are returned
/// unchanged.
pub fn project(tree: &FilterTree, value: &Value) -> FilterResult<Value> {
    let (select_all, rules) = tree.split_select_all();

    match value {
        Value::Object(object) => {
            let mut node = if select_all {
                object.clone()
            } else {
                Map::new()
            };

            for (field, rule) in rules.iter() {
                let Some(field_value) = object.get(field) else {
                    continue;
                };

                match rule {
                    FilterNode::Include => {
                        node.insert(field.clone(), field_value.clone());
                    }
                    FilterNode::Match(m) => apply_match(m, field, field_value, &mut node)?,
                    FilterNode::Tree(subtree) => {
                        node.insert(field.clone(), project(subtree, field_value)?);
                    }
                }
            }

            Ok(Value::Object(node))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| project(&rules, item))
            .collect::<FilterResult<Vec<_>>>()
            .map(Value::Array),
        scalar => Ok(scalar.clone()),
    }
}

/// Apply a match rule to one field, writing into `node`
///
/// Arrays keep their matching elements; an array with no match leaves
/// `node` untouched. Other values are kept when they match and removed
/// from `node` otherwise.
fn apply_match(
    rule: &Match,
    field: &str,
    value: &Value,
    node: &mut Map<String, Value>,
) -> FilterResult<()> {
    let regex = rule
        .arg
        .compile()
        .map_err(|source| FilterError::InvalidMatchArg {
            pattern: rule.arg.as_str().to_string(),
            source,
        })?;

    match value {
        Value::Array(items) => {
            let matched: Vec<Value> = items
                .iter()
                .filter(|item| regex.is_match(&render(item)))
                .cloned()
                .collect();

            if !matched.is_empty() {
                node.insert(field.to_string(), Value::Array(matched));
            }
        }
        other => {
            if regex.is_match(&render(other)) {
                node.insert(field.to_string(), other.clone());
            } else {
                node.remove(field);
            }
        }
    }

    Ok(())
}

/// Text a value is matched against: strings unquoted, everything else as JSON
fn render(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}
