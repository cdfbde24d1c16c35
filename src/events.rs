//! Event logging for entry-point synthesis.
//!
//! Every decision the coordinator, the role drivers and the cleanup passes take is
//! recorded here: which instances were materialized, which constructions failed,
//! which fields were allocated, which branches were swept away. Events can be
//! inspected by tests and callers or safely ignored.
//!
//! # Architecture
//!
//! - [`Event`] - A single recorded event
//! - [`EventLog`] - Append-only collection of events with query helpers
//! - [`EventBuilder`] - Fluent API for creating events
//! - [`DerivedStats`] - Counters computed from a log after the fact
//!
//! # Example
//!
//! ```rust
//! use rootsynth::events::{EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::InstanceMaterialized)
//!     .procedure("dummyMainMethod")
//!     .class("com.example.MainActivity");
//! log.record(EventKind::Warning)
//!     .class("com.example.Broken")
//!     .message("no usable constructor");
//!
//! assert_eq!(log.len(), 2);
//! assert!(log.has(EventKind::InstanceMaterialized));
//! ```

use std::{collections::HashMap, fmt};

use crate::model::ClassName;

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A component was left out of the root procedure.
    ComponentSkipped,
    /// A new instance of a class was allocated in a procedure.
    InstanceMaterialized,
    /// No usable constructor was found for a class.
    ConstructionFailed,
    /// A class-level callback field was allocated.
    FieldAllocated,
    /// A per-component driver procedure was generated.
    DriverCreated,
    /// A callback invocation was wrapped in an independent guard.
    CallbackGuarded,
    /// A degenerate branch was removed by cleanup.
    BranchRemoved,
    /// An unreferenced or redundant marker was removed by cleanup.
    MarkerRemoved,

    /// Warning (something unexpected but recoverable).
    Warning,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ComponentSkipped => "component skipped",
            Self::InstanceMaterialized => "instance materialized",
            Self::ConstructionFailed => "construction failed",
            Self::FieldAllocated => "field allocated",
            Self::DriverCreated => "driver created",
            Self::CallbackGuarded => "callback guarded",
            Self::BranchRemoved => "branch removed",
            Self::MarkerRemoved => "marker removed",
            Self::Warning => "warning",
        }
    }

    /// Returns true if this event was produced by a cleanup pass.
    #[must_use]
    pub fn is_cleanup(&self) -> bool {
        matches!(self, Self::BranchRemoved | Self::MarkerRemoved)
    }

    /// Returns true if this is a diagnostic event.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Warning)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// The procedure being built or cleaned when the event occurred.
    pub procedure: Option<String>,
    /// The class the event is about (component, listener, callback class).
    pub class: Option<ClassName>,
    /// Human-readable description.
    pub message: String,
    /// Associated cleanup pass name (if from a pass).
    pub pass: Option<&'static str>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is added to the log when the
/// builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    procedure: Option<String>,
    class: Option<ClassName>,
    message: Option<String>,
    pass: Option<&'static str>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            procedure: None,
            class: None,
            message: None,
            pass: None,
        }
    }

    /// Sets the procedure the event belongs to.
    pub fn procedure(mut self, name: impl Into<String>) -> Self {
        self.procedure = Some(name.into());
        self
    }

    /// Sets the class the event is about.
    pub fn class(mut self, class: impl Into<ClassName>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Associates this event with a specific cleanup pass.
    pub fn pass(mut self, pass_name: &'static str) -> Self {
        self.pass = Some(pass_name);
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        let event = Event {
            kind: self.kind,
            procedure: self.procedure.take(),
            class: self.class.take(),
            message,
            pass: self.pass.take(),
        };

        self.log.events.push(event);
    }
}

/// Collection of events from one synthesis run.
///
/// Recording only needs a shared reference, so the log can be handed to role drivers
/// and cleanup passes while the coordinator still owns it.
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventLog {
    fn clone(&self) -> Self {
        let new_log = Self::new();
        for (_, event) in &self.events {
            new_log.events.push(event.clone());
        }
        new_log
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    ///
    /// The event is added when the builder is dropped.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.events.iter().any(|(_, e)| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|(_, e)| e.kind == kind).count()
    }

    /// Returns an iterator over all events in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.events
            .iter()
            .filter_map(move |(_, e)| if e.kind == kind { Some(e) } else { None })
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for (_, event) in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Generates a human-readable summary of all events.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no events".to_string();
        }

        let mut parts: Vec<String> = self
            .count_by_kind()
            .iter()
            .filter(|(k, _)| !k.is_diagnostic())
            .map(|(kind, count)| format!("{} {}", count, kind.description()))
            .collect();

        if parts.is_empty() {
            return format!("{} events", self.len());
        }

        parts.sort();
        parts.join(", ")
    }
}

/// Iterator wrapper for EventLog that yields &Event
pub struct EventLogIter<'a> {
    inner: boxcar::Iter<'a, Event>,
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| e)
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = EventLogIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        EventLogIter {
            inner: self.events.iter(),
        }
    }
}

/// Statistics derived from an EventLog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedStats {
    /// Number of component drivers generated.
    pub drivers: usize,
    /// Number of components left out of the root procedure.
    pub components_skipped: usize,
    /// Number of instances allocated across all procedures.
    pub instances: usize,
    /// Number of failed constructions.
    pub construction_failures: usize,
    /// Number of callback fields allocated.
    pub fields: usize,
    /// Number of guarded callback invocations.
    pub guarded_callbacks: usize,
    /// Number of branches removed by cleanup.
    pub branches_removed: usize,
    /// Number of markers removed by cleanup.
    pub markers_removed: usize,
    /// Number of warnings.
    pub warnings: usize,
}

impl DerivedStats {
    /// Computes statistics from an event log.
    #[must_use]
    pub fn from_log(log: &EventLog) -> Self {
        let counts = log.count_by_kind();
        let get = |kind: EventKind| counts.get(&kind).copied().unwrap_or(0);

        Self {
            drivers: get(EventKind::DriverCreated),
            components_skipped: get(EventKind::ComponentSkipped),
            instances: get(EventKind::InstanceMaterialized),
            construction_failures: get(EventKind::ConstructionFailed),
            fields: get(EventKind::FieldAllocated),
            guarded_callbacks: get(EventKind::CallbackGuarded),
            branches_removed: get(EventKind::BranchRemoved),
            markers_removed: get(EventKind::MarkerRemoved),
            warnings: get(EventKind::Warning),
        }
    }

    /// Generates a human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.drivers > 0 {
            parts.push(format!("{} drivers", self.drivers));
        }
        if self.instances > 0 {
            parts.push(format!("{} instances", self.instances));
        }
        if self.fields > 0 {
            parts.push(format!("{} fields", self.fields));
        }
        if self.guarded_callbacks > 0 {
            parts.push(format!("{} guarded callbacks", self.guarded_callbacks));
        }

        // Cleanup
        let removed = self.branches_removed + self.markers_removed;
        if removed > 0 {
            parts.push(format!("{removed} instructions removed"));
        }

        if self.components_skipped > 0 {
            parts.push(format!("{} skipped", self.components_skipped));
        }
        if self.construction_failures > 0 {
            parts.push(format!(
                "{} construction failures",
                self.construction_failures
            ));
        }
        if self.warnings > 0 {
            parts.push(format!("{} warnings", self.warnings));
        }

        if parts.is_empty() {
            "nothing synthesized".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for DerivedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert_eq!(log.summary(), "no events");
    }

    #[test]
    fn test_record_event() {
        let log = EventLog::new();

        log.record(EventKind::InstanceMaterialized)
            .procedure("dummyMainMethod")
            .class("com.example.Main")
            .message("new com.example.Main");

        assert_eq!(log.len(), 1);
        let event = log.iter().next().unwrap();
        assert_eq!(event.procedure.as_deref(), Some("dummyMainMethod"));
        assert_eq!(event.class, Some(ClassName::new("com.example.Main")));
        assert_eq!(event.message, "new com.example.Main");
    }

    #[test]
    fn test_default_message() {
        let log = EventLog::new();
        log.record(EventKind::FieldAllocated);

        let event = log.iter().next().unwrap();
        assert_eq!(event.message, "field allocated");
    }

    #[test]
    fn test_clone_keeps_pass() {
        let log = EventLog::new();
        log.record(EventKind::BranchRemoved).pass("FallthroughElimination");

        let copy = log.clone();
        assert_eq!(copy.len(), 1);
        assert_eq!(
            copy.filter_kind(EventKind::BranchRemoved).next().unwrap().pass,
            Some("FallthroughElimination")
        );
    }

    #[test]
    fn test_summary_skips_diagnostics() {
        let log = EventLog::new();
        log.record(EventKind::MarkerRemoved);
        log.record(EventKind::MarkerRemoved);
        log.record(EventKind::Warning).message("careful");

        assert_eq!(log.summary(), "2 marker removed");
    }

    #[test]
    fn test_derived_stats() {
        let log = EventLog::new();
        log.record(EventKind::DriverCreated).class("a.Main");
        log.record(EventKind::InstanceMaterialized).class("a.Main");
        log.record(EventKind::BranchRemoved);
        log.record(EventKind::MarkerRemoved);
        log.record(EventKind::Warning).message("a warning");

        let stats = DerivedStats::from_log(&log);
        assert_eq!(stats.drivers, 1);
        assert_eq!(stats.instances, 1);
        assert_eq!(stats.warnings, 1);
        assert!(stats.summary().contains("2 instructions removed"));
    }

    #[test]
    fn test_thread_safe_append() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(EventLog::new());
        let mut handles = vec![];

        for i in 0..4 {
            let log_clone = Arc::clone(&log);
            handles.push(thread::spawn(move || {
                for j in 0..50 {
                    log_clone
                        .record(EventKind::InstanceMaterialized)
                        .message(format!("thread {i} event {j}"));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 200);
    }
}
