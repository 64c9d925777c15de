//! Projection of resolved results
//!
//! Rewrites the resolved result tree according to each statement's
//! `only` and `hidden` clauses before it is returned to the caller.
//!
//! # Flow
//!
//! 1. [`FilterTree::build`] compiles a statement's `only` selectors
//! 2. [`apply_filters`] projects each statement's result body
//! 3. [`apply_hidden`] drops the results of hidden statements
//!
//! Any projection fault aborts the whole query.

mod errors;
mod filters;
mod projector;
mod tree;

pub use errors::{
    FilterError, FilterErrorCode, FilterResult, ProjectionError, ProjectionResult,
};
pub use filters::{apply_filters, apply_hidden, apply_only_filters};
pub use projector::project;
pub use tree::{FilterNode, FilterTree};
