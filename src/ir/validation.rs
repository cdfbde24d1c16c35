//! Structural validation of synthesized procedures.
//!
//! The validator checks the properties a downstream analysis silently relies on:
//!
//! - every branch targets a label that is placed exactly once
//! - every local read is written somewhere (flow-insensitive) or is a parameter
//! - the procedure ends in a return matching its return type
//! - no instruction other than a marker follows a terminator
//!
//! Validation is flow-insensitive on purpose: a synthesized driver guards most of its
//! instructions behind non-deterministic branches, so a local may be written on one
//! path and read on another. Only a local that is never written at all is a defect.

use std::{collections::BTreeSet, fmt};

use crate::{
    ir::{Instruction, Label, Local, Procedure},
    Error, Result,
};

/// A structural defect found in a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    /// A branch targets a label with no marker in the procedure.
    DanglingTarget {
        /// Index of the branch
        index: usize,
        /// The missing target
        target: Label,
    },
    /// The same label is placed by more than one marker.
    DuplicateMarker(Label),
    /// A local is read but never written and is not a parameter.
    UndefinedLocal {
        /// Index of the reading instruction
        index: usize,
        /// The undefined local
        local: Local,
    },
    /// A local is used that the procedure never declared.
    UndeclaredLocal {
        /// Index of the instruction
        index: usize,
        /// The undeclared local
        local: Local,
    },
    /// The last non-marker instruction is not a return.
    MissingReturn,
    /// A return does not match the declared return type.
    ReturnMismatch {
        /// Index of the return
        index: usize,
    },
    /// A non-marker instruction directly follows a terminator and can never execute.
    Unreachable {
        /// Index of the unreachable instruction
        index: usize,
    },
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingTarget { index, target } => {
                write!(f, "branch at {index} targets unplaced {target}")
            }
            Self::DuplicateMarker(label) => write!(f, "{label} placed more than once"),
            Self::UndefinedLocal { index, local } => {
                write!(f, "instruction {index} reads {local} which is never written")
            }
            Self::UndeclaredLocal { index, local } => {
                write!(f, "instruction {index} uses undeclared {local}")
            }
            Self::MissingReturn => f.write_str("procedure does not end in a return"),
            Self::ReturnMismatch { index } => {
                write!(f, "return at {index} does not match the return type")
            }
            Self::Unreachable { index } => write!(f, "instruction {index} is unreachable"),
        }
    }
}

/// Stateless structural validator for [`Procedure`]s.
pub struct ProcedureValidator;

impl ProcedureValidator {
    /// Returns every defect of the procedure. An empty vector means it is well formed.
    #[must_use]
    pub fn validate(procedure: &Procedure) -> Vec<Defect> {
        let mut defects = Vec::new();
        let body = procedure.instructions();

        // Markers
        let mut placed = BTreeSet::new();
        for instruction in body {
            if let Some(label) = instruction.marker_label() {
                if !placed.insert(label) {
                    defects.push(Defect::DuplicateMarker(label));
                }
            }
        }

        // Locals
        let mut written: BTreeSet<Local> = procedure.params().iter().copied().collect();
        written.extend(body.iter().filter_map(Instruction::defined_local));
        let declared = procedure.local_count();

        for (index, instruction) in body.iter().enumerate() {
            if let Some(target) = instruction.branch_target() {
                if !placed.contains(&target) {
                    defects.push(Defect::DanglingTarget { index, target });
                }
            }

            let touched = instruction
                .used_locals()
                .into_iter()
                .chain(instruction.defined_local());
            for local in touched {
                if local.index() as usize >= declared {
                    defects.push(Defect::UndeclaredLocal { index, local });
                }
            }
            for local in instruction.used_locals() {
                if !written.contains(&local) {
                    defects.push(Defect::UndefinedLocal { index, local });
                }
            }

            if let Instruction::Return(value) = instruction {
                if value.is_some() == procedure.is_void() {
                    defects.push(Defect::ReturnMismatch { index });
                }
            }

            if index > 0 && body[index - 1].is_terminator() && !instruction.is_marker() {
                defects.push(Defect::Unreachable { index });
            }
        }

        let last = body.iter().rev().find(|i| !i.is_marker());
        if !matches!(last, Some(Instruction::Return(_))) {
            defects.push(Defect::MissingReturn);
        }

        defects
    }

    /// Validates the procedure and converts defects into an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every defect if the procedure is malformed.
    pub fn check(procedure: &Procedure) -> Result<()> {
        let defects = Self::validate(procedure);
        if defects.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                procedure: procedure.name().to_string(),
                defects,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BranchKind, Operand};

    fn nondet(target: Label) -> Instruction {
        Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target,
        }
    }

    #[test]
    fn test_well_formed() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let start = proc.new_label();
        proc.place(start)?;
        proc.push(nondet(start))?;
        proc.push(Instruction::Return(None))?;

        assert!(ProcedureValidator::validate(&proc).is_empty());
        ProcedureValidator::check(&proc)
    }

    #[test]
    fn test_dangling_and_missing_return() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let nowhere = proc.new_label();
        proc.push(nondet(nowhere))?;

        let defects = ProcedureValidator::validate(&proc);
        assert!(defects.contains(&Defect::DanglingTarget {
            index: 0,
            target: nowhere
        }));
        assert!(defects.contains(&Defect::MissingReturn));
        Ok(())
    }

    #[test]
    fn test_undefined_local() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "driver", "a.Main");
        let local = proc.new_local("a.Main");
        proc.push(Instruction::Return(Some(Operand::Local(local))))?;

        assert_eq!(
            ProcedureValidator::validate(&proc),
            vec![Defect::UndefinedLocal { index: 0, local }]
        );
        Ok(())
    }

    #[test]
    fn test_return_mismatch_and_unreachable() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        proc.push(Instruction::Return(Some(Operand::Null)))?;
        proc.push(Instruction::Return(None))?;

        let defects = ProcedureValidator::validate(&proc);
        assert!(defects.contains(&Defect::ReturnMismatch { index: 0 }));
        assert!(defects.contains(&Defect::Unreachable { index: 1 }));
        Ok(())
    }

    #[test]
    fn test_check_reports_all_defects() {
        let proc = Procedure::new("dummyMainClass", "empty", "void");
        match ProcedureValidator::check(&proc) {
            Err(Error::Validation { procedure, defects }) => {
                assert_eq!(procedure, "empty");
                assert_eq!(defects, vec![Defect::MissingReturn]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
