//! Observable events of the assembly and projection stages

use std::fmt;

/// Typed log events with stable names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Gateway configuration loaded
    ConfigLoaded,

    // Response assembly
    /// Result record built from a completed exchange
    ResourceAssembled,
    /// Result record built from a failed exchange
    ResourceFailed,
    /// Call skipped for missing chained parameters
    ResourceSkipped,

    // Projection
    /// `only` filters applied to a statement's result
    FilterApplied,
    /// Projection aborted the query
    FilterApplyFailed,
    /// Hidden statements removed from the response
    HiddenApplied,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ResourceAssembled => "RESOURCE_ASSEMBLED",
            Event::ResourceFailed => "RESOURCE_FAILED",
            Event::ResourceSkipped => "RESOURCE_SKIPPED",
            Event::FilterApplied => "FILTER_APPLIED",
            Event::FilterApplyFailed => "FILTER_APPLY_FAILED",
            Event::HiddenApplied => "HIDDEN_APPLIED",
        }
    }

    /// Returns true if the event reports a failed query evaluation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::FilterApplyFailed)
    }

    /// Returns true for high-volume per-statement events
    pub fn is_detail(&self) -> bool {
        matches!(
            self,
            Event::ResourceAssembled | Event::FilterApplied | Event::HiddenApplied
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::FilterApplyFailed.as_str(), "FILTER_APPLY_FAILED");
        assert_eq!(Event::ResourceSkipped.to_string(), "RESOURCE_SKIPPED");
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::FilterApplyFailed.is_failure());
        assert!(!Event::ResourceFailed.is_failure());
        assert!(!Event::FilterApplied.is_failure());
    }
}
