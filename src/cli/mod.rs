//! CLI module for restgate
//!
//! Provides a command-line interface for:
//! - filter: project resolved results through a query's `only`/`hidden`
//! - assemble: build the result record of one call

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    assemble, filter, load_config, run, run_command, AssembleRequest, FilterRequest,
    ResponseInput,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, ok_envelope, parse_request, read_request, write_error, write_response};
