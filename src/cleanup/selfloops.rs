//! Self-loop elimination pass.
//!
//! A non-deterministic branch whose target marker precedes it with nothing but
//! markers in between loops onto itself. Taking it changes nothing, so it is removed.
//!
//! # Example
//!
//! Before:
//! ```text
//! label3:
//! label4:
//!     if * goto label3
//!     return
//! ```
//!
//! After:
//! ```text
//! label3:
//! label4:
//!     return
//! ```
//!
//! Unconditional `goto` self-loops are left alone: they never terminate, and removing
//! them would make the code after them reachable.

use crate::{
    cleanup::{only_markers_between, CleanupPass},
    events::{EventKind, EventLog},
    ir::{BranchKind, Instruction, Procedure},
};

/// Removes non-deterministic branches that only loop onto themselves.
pub struct SelfLoopEliminationPass;

impl Default for SelfLoopEliminationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl SelfLoopEliminationPass {
    /// Creates a new self-loop elimination pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_self_loop(procedure: &Procedure, index: usize) -> bool {
        let Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target,
        } = procedure.instructions()[index]
        else {
            return false;
        };
        procedure
            .position_of(target)
            .is_some_and(|pos| pos < index && only_markers_between(procedure, pos, index))
    }
}

impl CleanupPass for SelfLoopEliminationPass {
    fn name(&self) -> &'static str {
        "self-loop-elimination"
    }

    fn description(&self) -> &'static str {
        "Removes non-deterministic branches looping onto themselves"
    }

    fn run(&self, procedure: &mut Procedure, events: &EventLog) -> bool {
        let mut changed = false;
        let mut idx = 0;
        while idx < procedure.len() {
            if Self::is_self_loop(procedure, idx) {
                let removed = procedure.remove(idx);
                events
                    .record(EventKind::BranchRemoved)
                    .procedure(procedure.name())
                    .pass(self.name())
                    .message(format!("removed self-loop `{removed}` at {idx}"));
                changed = true;
            } else {
                idx += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    #[test]
    fn test_removes_nondeterministic_self_loop() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let (a, b) = (proc.new_label(), proc.new_label());
        proc.place(a)?;
        proc.place(b)?;
        proc.push(Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target: a,
        })?;
        proc.push(Instruction::Return(None))?;

        let events = EventLog::new();
        assert!(SelfLoopEliminationPass::new().run(&mut proc, &events));
        assert_eq!(proc.len(), 3);
        assert!(!proc.is_referenced(a));
        assert_eq!(events.count_kind(EventKind::BranchRemoved), 1);
        Ok(())
    }

    #[test]
    fn test_keeps_loops_with_a_body_and_gotos() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let a = proc.new_label();
        let local = proc.new_local("int");
        proc.place(a)?;
        proc.push(Instruction::Assign {
            dest: local,
            value: crate::ir::Operand::Int(0),
        })?;
        proc.push(Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target: a,
        })?;
        let b = proc.new_label();
        proc.place(b)?;
        proc.push(Instruction::Branch {
            kind: BranchKind::Goto,
            target: b,
        })?;

        assert!(!SelfLoopEliminationPass::new().run(&mut proc, &EventLog::new()));
        assert_eq!(proc.len(), 5);
        Ok(())
    }
}
