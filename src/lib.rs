//! restgate - result assembly and projection for a REST aggregation gateway
//!
//! - `assembly`: turns each completed HTTP exchange into a result record
//! - `projection`: applies a query's `only` and `hidden` clauses
//! - `cli`: stdin/stdout driver for both stages

pub mod assembly;
pub mod cli;
pub mod config;
pub mod domain;
pub mod observability;
pub mod projection;
