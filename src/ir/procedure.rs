//! Synthesized procedures.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{
    ir::{Instruction, Label, Local},
    model::{ClassHierarchy, ClassName},
    Result,
};

/// A synthesized procedure: signature, locals, labels and an instruction sequence.
///
/// Instructions live in an append-mostly vector. Labels and locals are arena ids owned
/// by the procedure, so removing an instruction never invalidates another instruction.
/// The instance pool maps a class to the one local holding its instance; materializing
/// the same class twice reuses that local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    owner: ClassName,
    name: String,
    return_type: String,
    params: Vec<Local>,
    locals: Vec<String>,
    body: Vec<Instruction>,
    next_label: u32,
    placed: BTreeSet<Label>,
    instances: BTreeMap<ClassName, Local>,
}

impl Procedure {
    /// Creates an empty procedure `owner.name` returning `return_type`.
    #[must_use]
    pub fn new(owner: impl Into<ClassName>, name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            return_type: return_type.into(),
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
            next_label: 0,
            placed: BTreeSet::new(),
            instances: BTreeMap::new(),
        }
    }

    /// The class the procedure is attached to.
    #[must_use]
    pub fn owner(&self) -> &ClassName {
        &self.owner
    }

    /// The procedure name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the procedure.
    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The declared return type.
    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    /// Returns true if the procedure returns nothing.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Locals bound to the parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[Local] {
        &self.params
    }

    /// Declares a new parameter of the given type.
    pub fn add_param(&mut self, ty: impl Into<String>) -> Local {
        let local = self.new_local(ty);
        self.params.push(local);
        local
    }

    /// Declares a new local of the given type.
    pub fn new_local(&mut self, ty: impl Into<String>) -> Local {
        let local = Local(self.locals.len() as u32);
        self.locals.push(ty.into());
        local
    }

    /// Returns the declared type of a local.
    #[must_use]
    pub fn local_type(&self, local: Local) -> Option<&str> {
        self.locals.get(local.0 as usize).map(String::as_str)
    }

    /// Number of declared locals, parameters included.
    #[must_use]
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Returns the first local (in declaration order) whose type can be stored in a
    /// slot of type `ty`.
    #[must_use]
    pub fn find_compatible(&self, ty: &ClassName, hierarchy: &dyn ClassHierarchy) -> Option<Local> {
        self.locals
            .iter()
            .enumerate()
            .find(|(_, declared)| hierarchy.is_assignable_to(&ClassName::new(declared.as_str()), ty))
            .map(|(idx, _)| Local(idx as u32))
    }

    /// Allocates a fresh label. It becomes a valid branch target once placed.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Appends a marker placing `label` at the current end of the procedure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Synthesis`] if the label has already been placed.
    pub fn place(&mut self, label: Label) -> Result<()> {
        if !self.placed.insert(label) {
            return Err(synthesis_error!(
                "{} placed twice in {}",
                label,
                self.name
            ));
        }
        self.body.push(Instruction::Marker(label));
        Ok(())
    }

    /// Appends an instruction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Synthesis`] if the instruction is a marker for a label
    /// that has already been placed.
    pub fn push(&mut self, instruction: Instruction) -> Result<()> {
        match instruction {
            Instruction::Marker(label) => self.place(label),
            other => {
                self.body.push(other);
                Ok(())
            }
        }
    }

    /// Appends a non-marker instruction.
    pub(crate) fn emit(&mut self, instruction: Instruction) {
        debug_assert!(!instruction.is_marker(), "markers go through place()");
        self.body.push(instruction);
    }

    /// Removes and returns the instruction at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Instruction {
        let removed = self.body.remove(index);
        if let Instruction::Marker(label) = &removed {
            self.placed.remove(label);
        }
        removed
    }

    /// Redirects every branch targeting `from` to `to`. Returns the number of branches changed.
    pub fn retarget_all(&mut self, from: Label, to: Label) -> usize {
        let mut changed = 0;
        for instruction in &mut self.body {
            if instruction.branch_target() == Some(from) && instruction.retarget(to) {
                changed += 1;
            }
        }
        changed
    }

    /// The instruction sequence.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.body
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true if the procedure has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the index of the marker placing `label`.
    #[must_use]
    pub fn position_of(&self, label: Label) -> Option<usize> {
        if !self.placed.contains(&label) {
            return None;
        }
        self.body
            .iter()
            .position(|i| i.marker_label() == Some(label))
    }

    /// Returns true if some branch targets `label`.
    #[must_use]
    pub fn is_referenced(&self, label: Label) -> bool {
        self.body.iter().any(|i| i.branch_target() == Some(label))
    }

    /// The local holding the instance of `class`, if one was materialized.
    #[must_use]
    pub fn instance_of(&self, class: &ClassName) -> Option<Local> {
        self.instances.get(class).copied()
    }

    /// Records `local` as the instance of `class`.
    pub fn bind_instance(&mut self, class: ClassName, local: Local) {
        self.instances.insert(class, local);
    }

    /// All materialized instances, by class.
    pub fn instances(&self) -> impl Iterator<Item = (&ClassName, Local)> {
        self.instances.iter().map(|(class, local)| (class, *local))
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .filter_map(|p| self.local_type(*p))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            f,
            "<{}: {} {}({})>",
            self.owner, self.return_type, self.name, params
        )?;
        for instruction in &self.body {
            match instruction {
                Instruction::Marker(_) => writeln!(f, "  {instruction}")?,
                _ => writeln!(f, "    {instruction}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{BranchKind, Operand},
        Error,
    };

    #[test]
    fn test_place_twice_is_an_error() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let label = proc.new_label();
        proc.place(label)?;
        assert!(matches!(proc.place(label), Err(Error::Synthesis { .. })));
        assert!(matches!(
            proc.push(Instruction::Marker(label)),
            Err(Error::Synthesis { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_remove_unplaces_marker() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let label = proc.new_label();
        proc.place(label)?;
        assert_eq!(proc.position_of(label), Some(0));

        proc.remove(0);
        assert_eq!(proc.position_of(label), None);
        proc.place(label)?;
        Ok(())
    }

    #[test]
    fn test_retarget_all() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "main", "void");
        let (a, b) = (proc.new_label(), proc.new_label());
        proc.place(a)?;
        proc.place(b)?;
        for _ in 0..2 {
            proc.push(Instruction::Branch {
                kind: BranchKind::NonDeterministic,
                target: b,
            })?;
        }

        assert_eq!(proc.retarget_all(b, a), 2);
        assert!(proc.is_referenced(a));
        assert!(!proc.is_referenced(b));
        Ok(())
    }

    #[test]
    fn test_locals_and_display() -> Result<()> {
        let mut proc = Procedure::new("dummyMainClass", "driver", "a.Main");
        let intent = proc.add_param("android.content.Intent");
        let local = proc.new_local("a.Main");
        proc.bind_instance("a.Main".into(), local);
        proc.push(Instruction::Return(Some(Operand::Local(local))))?;

        assert_eq!(proc.params(), &[intent]);
        assert_eq!(proc.local_type(local), Some("a.Main"));
        assert_eq!(proc.instance_of(&"a.Main".into()), Some(local));

        let text = proc.to_string();
        assert!(text.starts_with("<dummyMainClass: a.Main driver(android.content.Intent)>"));
        assert!(text.contains("return $1"));
        Ok(())
    }
}
