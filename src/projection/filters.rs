//! Query-level `only` and `hidden` handling

use crate::domain::{
    DoneResource, Query, ResourceId, ResourceValue, Resources, ResponseBody, Statement,
};
use crate::observability::{log_event_with_fields, Event};

use super::errors::{FilterError, FilterResult, ProjectionError, ProjectionResult};
use super::projector::project;
use super::tree::FilterTree;

/// Apply every statement's `only` clause to its resolved result
///
/// Statements without `only` pass through unchanged. The first failure
/// aborts the whole query; no partially filtered resources are returned.
pub fn apply_filters(query: &Query, resources: &Resources) -> ProjectionResult<Resources> {
    let mut result = Resources::with_capacity(query.statements.len());

    for statement in &query.statements {
        let resource_id = statement.resource_id();
        let resource = resources.get(&resource_id);

        match filter_statement(statement, &resource_id, resource) {
            Ok(Some(filtered)) => {
                result.insert(resource_id, filtered);
            }
            Ok(None) => {}
            Err(cause) => {
                log_failure(statement, &resource_id, resource, &cause);
                return Err(ProjectionError {
                    resource_id,
                    statement: Box::new(statement.clone()),
                    resource: resource.cloned().map(Box::new),
                    cause,
                });
            }
        }
    }

    Ok(result)
}

fn filter_statement(
    statement: &Statement,
    resource_id: &ResourceId,
    resource: Option<&ResourceValue>,
) -> FilterResult<Option<ResourceValue>> {
    if statement.only.is_empty() {
        return Ok(resource.cloned());
    }

    let resource = resource.ok_or_else(|| FilterError::MissingResult(resource_id.clone()))?;
    let tree = FilterTree::build(&statement.only)?;
    let filtered = apply_only_filters(&tree, resource)?;

    log_event_with_fields(Event::FilterApplied, &[("resource", resource_id.as_str())]);
    Ok(Some(filtered))
}

/// Project the body of a result, or of every result of a multiplexed call
///
/// Record metadata is carried over untouched.
pub fn apply_only_filters(
    tree: &FilterTree,
    resource: &ResourceValue,
) -> FilterResult<ResourceValue> {
    match resource {
        ResourceValue::Done(done) => {
            let body = done.result.unmarshal();
            let projected = project(tree, &body)?;

            Ok(ResourceValue::Done(DoneResource {
                details: done.details.clone(),
                result: ResponseBody::Value(projected),
            }))
        }
        ResourceValue::Multiplexed(list) => list
            .iter()
            .map(|item| apply_only_filters(tree, item))
            .collect::<FilterResult<Vec<_>>>()
            .map(ResourceValue::Multiplexed),
        other => Err(FilterError::unknown_shape(other)),
    }
}

fn log_failure(
    statement: &Statement,
    resource_id: &ResourceId,
    resource: Option<&ResourceValue>,
    cause: &FilterError,
) {
    let statement = format!("{:?}", statement);
    let done_resource = format!("{:?}", resource);
    let error = cause.to_string();

    log_event_with_fields(
        Event::FilterApplyFailed,
        &[
            ("code", cause.code().code()),
            ("done_resource", done_resource.as_str()),
            ("error", error.as_str()),
            ("resource", resource_id.as_str()),
            ("statement", statement.as_str()),
        ],
    );
}

/// Remove the results of hidden statements
///
/// Only results of the query's non-hidden statements are kept.
pub fn apply_hidden(query: &Query, mut resources: Resources) -> Resources {
    let visible: Resources = query
        .statements
        .iter()
        .filter(|statement| !statement.hidden)
        .filter_map(|statement| {
            let resource_id = statement.resource_id();
            resources
                .remove(&resource_id)
                .map(|resource| (resource_id, resource))
        })
        .collect();

    let hidden = query.statements.iter().filter(|s| s.hidden).count().to_string();
    log_event_with_fields(Event::HiddenApplied, &[("hidden", hidden.as_str())]);

    visible
}
