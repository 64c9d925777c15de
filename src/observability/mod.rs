//! Observability for restgate
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Observation scopes for CLI commands
//!
//! Observability is read-only: nothing logged here changes a result.
//!
//! ```ignore
//! use restgate::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ResourceSkipped, &[("resource", "heroes")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

fn severity_of(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else if event.is_detail() {
        Severity::Trace
    } else {
        Severity::Info
    }
}
