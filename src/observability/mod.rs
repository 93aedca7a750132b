//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines)
//! - Typed lifecycle and search events
//! - Atomic counters
//!
//! Observability is read-only: it never changes the outcome of a search.
//!
//! # Usage
//!
//! ```ignore
//! use searchx::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::SearchPlanned, &[("partitions", "4")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_searches_executed();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Severity an event is logged at when emitted through [`log_event`]
pub fn event_severity(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else if event.is_degraded() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
