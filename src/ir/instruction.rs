//! Instruction set of synthesized procedures.
//!
//! The IR is deliberately tiny. A driver procedure only allocates objects, calls
//! methods, moves references through static fields and branches. Branch targets are
//! [`Label`]s, stable ids that a [`Instruction::Marker`] places into the instruction
//! sequence, so instructions can be inserted or removed without patching offsets.

use std::fmt;

use crate::model::{ClassName, MethodRef};

/// Stable id of a branch target inside one procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub(crate) u32);

impl Label {
    /// Returns the raw id.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label{}", self.0)
    }
}

/// A local variable slot of one procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Local(pub(crate) u32);

impl Local {
    /// Returns the raw slot index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Value read by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Contents of a local
    Local(Local),
    /// The null reference
    Null,
    /// Integer constant, also used as default for every primitive type
    Int(i64),
}

impl Operand {
    /// Returns the local read by this operand, if any.
    #[must_use]
    pub fn as_local(&self) -> Option<Local> {
        match self {
            Self::Local(local) => Some(*local),
            _ => None,
        }
    }
}

impl From<Local> for Operand {
    fn from(value: Local) -> Self {
        Self::Local(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{local}"),
            Self::Null => f.write_str("null"),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// How a branch decides whether it is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Taken or not, arbitrarily. Models choices the analysis cannot know.
    NonDeterministic,
    /// Always taken.
    Goto,
}

/// A class-level (static) field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    owner: ClassName,
    name: String,
    ty: ClassName,
}

impl FieldRef {
    /// Creates a field reference.
    #[must_use]
    pub fn new(owner: impl Into<ClassName>, name: impl Into<String>, ty: impl Into<ClassName>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// The declaring class.
    #[must_use]
    pub fn owner(&self) -> &ClassName {
        &self.owner
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &ClassName {
        &self.ty
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.owner, self.ty, self.name)
    }
}

/// A single IR instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// No-op placing a label. Branches jump here.
    Marker(Label),
    /// Transfer control to the marker of `target`.
    Branch {
        /// Deterministic or not
        kind: BranchKind,
        /// Jump target
        target: Label,
    },
    /// Allocate and construct an instance.
    New {
        /// Local receiving the instance
        dest: Local,
        /// Instantiated class
        class: ClassName,
        /// Constructor invoked on the fresh instance
        constructor: MethodRef,
        /// Constructor arguments
        args: Vec<Operand>,
    },
    /// Call a method of the analysed program.
    Invoke {
        /// Receiver, `None` for static methods
        receiver: Option<Local>,
        /// Called method
        method: MethodRef,
        /// Call arguments
        args: Vec<Operand>,
    },
    /// Call another synthesized procedure.
    CallProcedure {
        /// Name of the callee
        procedure: String,
        /// Call arguments
        args: Vec<Operand>,
    },
    /// Write a static field.
    StoreStatic {
        /// Written field
        field: FieldRef,
        /// Stored value
        value: Operand,
    },
    /// Read a static field.
    LoadStatic {
        /// Local receiving the value
        dest: Local,
        /// Read field
        field: FieldRef,
    },
    /// Copy a value into a local.
    Assign {
        /// Target local
        dest: Local,
        /// Copied value
        value: Operand,
    },
    /// Leave the procedure.
    Return(Option<Operand>),
}

impl Instruction {
    /// Returns true for markers.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Marker(_))
    }

    /// Returns the label placed by a marker.
    #[must_use]
    pub fn marker_label(&self) -> Option<Label> {
        match self {
            Self::Marker(label) => Some(*label),
            _ => None,
        }
    }

    /// Returns the target of a branch.
    #[must_use]
    pub fn branch_target(&self) -> Option<Label> {
        match self {
            Self::Branch { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Redirects a branch to a new target. Returns false for non-branches.
    pub fn retarget(&mut self, new_target: Label) -> bool {
        match self {
            Self::Branch { target, .. } => {
                *target = new_target;
                true
            }
            _ => false,
        }
    }

    /// Returns true for instructions after which control never falls through.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Self::Return(_)
                | Self::Branch {
                    kind: BranchKind::Goto,
                    ..
                }
        )
    }

    /// Returns the local written by this instruction.
    #[must_use]
    pub fn defined_local(&self) -> Option<Local> {
        match self {
            Self::New { dest, .. } | Self::LoadStatic { dest, .. } | Self::Assign { dest, .. } => {
                Some(*dest)
            }
            _ => None,
        }
    }

    /// Returns every local read by this instruction.
    #[must_use]
    pub fn used_locals(&self) -> Vec<Local> {
        let from_operands = |ops: &[Operand]| ops.iter().filter_map(Operand::as_local).collect::<Vec<_>>();
        match self {
            Self::New { args, .. } | Self::CallProcedure { args, .. } => from_operands(args),
            Self::Invoke { receiver, args, .. } => {
                let mut used = from_operands(args);
                used.extend(receiver);
                used
            }
            Self::StoreStatic { value, .. } | Self::Assign { value, .. } => {
                value.as_local().into_iter().collect()
            }
            Self::Return(value) => value.as_ref().and_then(Operand::as_local).into_iter().collect(),
            Self::Marker(_) | Self::Branch { .. } | Self::LoadStatic { .. } => Vec::new(),
        }
    }
}

fn join(args: &[Operand]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(label) => write!(f, "{label}:"),
            Self::Branch {
                kind: BranchKind::NonDeterministic,
                target,
            } => write!(f, "if * goto {target}"),
            Self::Branch {
                kind: BranchKind::Goto,
                target,
            } => write!(f, "goto {target}"),
            Self::New {
                dest,
                class,
                constructor,
                args,
            } => write!(f, "{dest} = new {class} via {constructor}({})", join(args)),
            Self::Invoke {
                receiver: Some(receiver),
                method,
                args,
            } => write!(f, "invoke {receiver}.{method}({})", join(args)),
            Self::Invoke {
                receiver: None,
                method,
                args,
            } => write!(f, "invoke static {method}({})", join(args)),
            Self::CallProcedure { procedure, args } => {
                write!(f, "call {procedure}({})", join(args))
            }
            Self::StoreStatic { field, value } => write!(f, "{field} = {value}"),
            Self::LoadStatic { dest, field } => write!(f, "{dest} = {field}"),
            Self::Assign { dest, value } => write!(f, "{dest} = {value}"),
            Self::Return(Some(value)) => write!(f, "return {value}"),
            Self::Return(None) => f.write_str("return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    #[test]
    fn test_branch_helpers() {
        let mut branch = Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target: Label(1),
        };
        assert_eq!(branch.branch_target(), Some(Label(1)));
        assert!(!branch.is_terminator());
        assert!(branch.retarget(Label(7)));
        assert_eq!(branch.branch_target(), Some(Label(7)));

        let mut marker = Instruction::Marker(Label(2));
        assert!(!marker.retarget(Label(3)));
        assert_eq!(marker.marker_label(), Some(Label(2)));
    }

    #[test]
    fn test_locals_of_invoke() -> Result<()> {
        let invoke = Instruction::Invoke {
            receiver: Some(Local(0)),
            method: MethodRef::new("a.B", "void f(a.C,int)")?,
            args: vec![Operand::Local(Local(3)), Operand::Int(0)],
        };
        assert_eq!(invoke.used_locals(), vec![Local(3), Local(0)]);
        assert_eq!(invoke.defined_local(), None);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        let ret = Instruction::Return(Some(Operand::Null));
        assert_eq!(ret.to_string(), "return null");
        assert!(ret.is_terminator());

        let branch = Instruction::Branch {
            kind: BranchKind::NonDeterministic,
            target: Label(4),
        };
        assert_eq!(branch.to_string(), "if * goto label4");

        let store = Instruction::StoreStatic {
            field: FieldRef::new("dummyMainClass", "Tracker", "a.Tracker"),
            value: Operand::Local(Local(1)),
        };
        assert_eq!(store.to_string(), "<dummyMainClass: a.Tracker Tracker> = $1");
        Ok(())
    }
}
