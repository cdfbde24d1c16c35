//! IR construction toolkit.
//!
//! Synthesized drivers are expressed in a small label-based IR:
//!
//! - [`Instruction`], [`Label`], [`Local`], [`Operand`] - the instruction set
//! - [`Procedure`] - an instruction sequence with its label, local and instance arenas
//! - [`ProcedureBuilder`] - materialize, call, guard, branch and block primitives
//! - [`FieldPool`] - class-level fields allocated on the synthetic class
//! - [`ProcedureValidator`] - structural checks reporting [`Defect`]s

mod builder;
mod field;
mod instruction;
mod procedure;
mod validation;

pub use builder::ProcedureBuilder;
pub use field::FieldPool;
pub use instruction::{BranchKind, FieldRef, Instruction, Label, Local, Operand};
pub use procedure::Procedure;
pub use validation::{Defect, ProcedureValidator};
