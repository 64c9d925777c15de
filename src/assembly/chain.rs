//! Detection of unresolved chained parameters

use crate::domain::{ParamValue, Statement};

/// Names of the statement's parameters that hold an empty chained value
///
/// A parameter counts as missing when the sentinel appears anywhere inside
/// its value. Names are returned in declaration order.
pub fn find_missing_params(statement: &Statement) -> Vec<String> {
    statement
        .with
        .iter()
        .filter(|(_, value)| contains_empty_chained(value))
        .map(|(name, _)| name.clone())
        .collect()
}

fn contains_empty_chained(value: &ParamValue) -> bool {
    match value {
        ParamValue::EmptyChained => true,
        ParamValue::List(items) => items.iter().any(contains_empty_chained),
        ParamValue::Object(fields) => fields.values().any(contains_empty_chained),
        ParamValue::Value(_) => false,
    }
}
