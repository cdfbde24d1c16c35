//! Fall-through branch elimination pass.
//!
//! A branch whose target marker follows it with nothing but markers in between
//! reaches the same place whether it is taken or not.
//!
//! # Example
//!
//! Before:
//! ```text
//!     if * goto label7
//! label7:
//!     return
//! ```
//!
//! After:
//! ```text
//! label7:
//!     return
//! ```
//!
//! # Algorithm
//!
//! Scan the sequence front to back and remove the first fall-through branch found,
//! then rescan from the start. One removal can turn an earlier branch into a
//! fall-through (its target is now only separated by markers), so the scan repeats
//! until a full pass finds nothing.

use crate::{
    cleanup::{only_markers_between, CleanupPass},
    events::{EventKind, EventLog},
    ir::Procedure,
};

/// Removes branches that fall through to their own target.
pub struct FallthroughEliminationPass;

impl Default for FallthroughEliminationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl FallthroughEliminationPass {
    /// Creates a new fall-through elimination pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn find_fallthrough(procedure: &Procedure) -> Option<usize> {
        procedure
            .instructions()
            .iter()
            .enumerate()
            .find_map(|(idx, instruction)| {
                let target = instruction.branch_target()?;
                let pos = procedure.position_of(target)?;
                (pos > idx && only_markers_between(procedure, idx, pos)).then_some(idx)
            })
    }
}

impl CleanupPass for FallthroughEliminationPass {
    fn name(&self) -> &'static str {
        "fallthrough-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes branches whose target directly follows them"
    }

    fn run(&self, procedure: &mut Procedure, events: &EventLog) -> bool {
        let mut changed = false;
        while let Some(idx) = Self::find_fallthrough(procedure) {
            let removed = procedure.remove(idx);
            events
                .record(EventKind::BranchRemoved)
                .procedure(procedure.name())
                .pass(self.name())
                .message(format!("removed fall-through `{removed}` at {idx}"));
            changed = true;
        }
        changed
    }
}
