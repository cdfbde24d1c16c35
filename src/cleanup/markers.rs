//! Marker elimination pass.
//!
//! Removes markers that no branch targets and merges runs of adjacent markers into
//! the first marker of the run.
//!
//! # Example
//!
//! Before:
//! ```text
//! label0:
//! label1:
//!     if * goto label1
//! label2:
//!     return
//! ```
//!
//! After:
//! ```text
//! label0:
//!     if * goto label0
//!     return
//! ```
//!
//! # Algorithm
//!
//! 1. For every marker directly followed by another marker, retarget all branches
//!    to the second label onto the first and drop the second marker
//! 2. Drop every marker whose label is no longer referenced by any branch

use crate::{
    cleanup::CleanupPass,
    events::{EventKind, EventLog},
    ir::Procedure,
};

/// Removes markers that carry no control flow.
pub struct MarkerEliminationPass;

impl Default for MarkerEliminationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerEliminationPass {
    /// Creates a new marker elimination pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Merges adjacent markers. Returns the number of markers removed.
    fn coalesce(&self, procedure: &mut Procedure, events: &EventLog) -> usize {
        let mut removed = 0;
        let mut idx = 0;
        while idx + 1 < procedure.len() {
            let body = procedure.instructions();
            let (Some(keep), Some(drop)) = (body[idx].marker_label(), body[idx + 1].marker_label())
            else {
                idx += 1;
                continue;
            };

            let retargeted = procedure.retarget_all(drop, keep);
            procedure.remove(idx + 1);
            events
                .record(EventKind::MarkerRemoved)
                .procedure(procedure.name())
                .pass(self.name())
                .message(format!("merged {drop} into {keep}, {retargeted} branches retargeted"));
            removed += 1;
        }
        removed
    }

    /// Drops unreferenced markers. Returns the number removed.
    fn sweep(&self, procedure: &mut Procedure, events: &EventLog) -> usize {
        let mut removed = 0;
        let mut idx = 0;
        while idx < procedure.len() {
            match procedure.instructions()[idx].marker_label() {
                Some(label) if !procedure.is_referenced(label) => {
                    procedure.remove(idx);
                    events
                        .record(EventKind::MarkerRemoved)
                        .procedure(procedure.name())
                        .pass(self.name())
                        .message(format!("removed unreferenced {label}"));
                    removed += 1;
                }
                _ => idx += 1,
            }
        }
        removed
    }
}

impl CleanupPass for MarkerEliminationPass {
    fn name(&self) -> &'static str {
        "marker-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes unreferenced markers and merges adjacent ones"
    }

    fn run(&self, procedure: &mut Procedure, events: &EventLog) -> bool {
        let merged = self.coalesce(procedure, events);
        let swept = self.sweep(procedure, events);
        merged + swept > 0
    }
}
