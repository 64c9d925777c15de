//! Domain model shared by the assembly and projection stages
//!
//! These types are produced by collaborators outside this crate (the query
//! parser, the scheduler and the HTTP transport) and only read here.

mod http;
mod query;
mod resource;

pub use http::{HttpRequest, HttpResponse};
pub use query::{
    Match, MatchArg, ParamValue, Query, QueryContext, QueryInput, ResourceId, Selector, Statement,
    StatementCacheControl, EMPTY_CHAINED_MARKER, SELECT_ALL,
};
pub use resource::{
    Debugging, Details, DoneResource, ResourceCacheControl, ResourceValue, Resources,
    ResponseBody,
};
