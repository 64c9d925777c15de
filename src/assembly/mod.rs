//! Response assembly
//!
//! Turns one completed HTTP exchange into a normalized result record.
//!
//! # Flow
//!
//! 1. [`find_missing_params`] decides whether the call had to be skipped
//! 2. [`ResponseAssembler`] builds the success, error or skipped record
//! 3. [`CacheControlParser`] and [`merge`] produce the record's cache policy
//! 4. [`is_debug_requested`] gates the attached debug snapshot

mod cache_control;
mod chain;
mod debug;
mod response;

pub use cache_control::{from_options, merge, CacheControlParser, CACHE_CONTROL_HEADER};
pub use chain::find_missing_params;
pub use debug::{is_debug_requested, snapshot, DEBUG_PARAM};
pub use response::{is_success, DoneResourceOptions, ResponseAssembler, SKIPPED_STATUS};
