//! Instruction-level construction primitives.
//!
//! [`ProcedureBuilder`] wraps a [`Procedure`] together with the class model and the
//! event log, and offers the handful of operations every driver is assembled from:
//! materializing instances, plain and guarded calls, markers and branches, static
//! field traffic, and the two block shapes used to model non-determinism.
//!
//! # Block shapes
//!
//! ```text
//! nondet_block:            optional_block:
//!   start:                   if * goto skip
//!     <body>                   <body>
//!   if * goto start          skip:
//! ```
//!
//! A non-deterministic block repeats its body any number of times, so any interleaving
//! of the calls inside it is reachable. An optional block may be skipped entirely.

use crate::{
    events::{EventKind, EventLog},
    ir::{BranchKind, FieldRef, Instruction, Label, Local, Operand, Procedure},
    model::{is_array_type, is_primitive_type, ClassHierarchy, ClassName, MethodRef},
    Result,
};

/// Builds instructions into a borrowed [`Procedure`].
pub struct ProcedureBuilder<'a> {
    procedure: &'a mut Procedure,
    hierarchy: &'a dyn ClassHierarchy,
    events: &'a EventLog,
}

impl<'a> ProcedureBuilder<'a> {
    /// Creates a builder appending to `procedure`.
    pub fn new(
        procedure: &'a mut Procedure,
        hierarchy: &'a dyn ClassHierarchy,
        events: &'a EventLog,
    ) -> Self {
        Self {
            procedure,
            hierarchy,
            events,
        }
    }

    /// The procedure under construction.
    #[must_use]
    pub fn procedure(&self) -> &Procedure {
        self.procedure
    }

    /// Mutable access to the procedure under construction.
    pub fn procedure_mut(&mut self) -> &mut Procedure {
        self.procedure
    }

    /// The class model used for resolution.
    #[must_use]
    pub fn hierarchy(&self) -> &'a dyn ClassHierarchy {
        self.hierarchy
    }

    /// The event log receiving construction events.
    #[must_use]
    pub fn events(&self) -> &'a EventLog {
        self.events
    }

    /// Allocates a label that can be branched to before it is placed.
    pub fn new_marker(&mut self) -> Label {
        self.procedure.new_label()
    }

    /// Places a previously allocated label at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Synthesis`] if the label was already placed.
    pub fn place(&mut self, label: Label) -> Result<()> {
        self.procedure.place(label)
    }

    /// Allocates a label and places it at the current position.
    ///
    /// # Errors
    ///
    /// Never fails for a fresh label; the error type is shared with [`Self::place`].
    pub fn marker(&mut self) -> Result<Label> {
        let label = self.new_marker();
        self.place(label)?;
        Ok(label)
    }

    /// Emits a branch to `target`.
    pub fn branch(&mut self, kind: BranchKind, target: Label) {
        self.procedure.emit(Instruction::Branch { kind, target });
    }

    /// Returns a local holding an instance of `class`, allocating one if needed.
    ///
    /// An instance already materialized in this procedure is reused. Returns `None` and
    /// records a [`EventKind::ConstructionFailed`] event if the class has no usable
    /// constructor; that condition is never an error.
    pub fn materialize(&mut self, class: &ClassName) -> Option<Local> {
        if let Some(existing) = self.procedure.instance_of(class) {
            return Some(existing);
        }

        let Some(constructor) = self.hierarchy.constructor(class) else {
            log::warn!(
                "no usable constructor for {} in {}",
                class,
                self.procedure.name()
            );
            self.events
                .record(EventKind::ConstructionFailed)
                .procedure(self.procedure.name())
                .class(class)
                .message(format!("no usable constructor for {class}"));
            return None;
        };

        let args = self.arguments(constructor.signature().params());
        let dest = self.procedure.new_local(class.as_str());
        self.procedure.emit(Instruction::New {
            dest,
            class: class.clone(),
            constructor,
            args,
        });
        self.procedure.bind_instance(class.clone(), dest);

        log::debug!("materialized {} as {} in {}", class, dest, self.procedure.name());
        self.events
            .record(EventKind::InstanceMaterialized)
            .procedure(self.procedure.name())
            .class(class);
        Some(dest)
    }

    /// Emits an unconditional call. Static methods ignore `receiver`.
    pub fn call(&mut self, receiver: Option<Local>, method: &MethodRef) {
        let args = self.arguments(method.signature().params());
        let receiver = if method.is_static() { None } else { receiver };
        self.procedure.emit(Instruction::Invoke {
            receiver,
            method: method.clone(),
            args,
        });
    }

    /// Emits a call that may or may not happen, independently of every other guard.
    ///
    /// # Errors
    ///
    /// Propagates label placement failures.
    pub fn guarded_call(&mut self, receiver: Option<Local>, method: &MethodRef) -> Result<()> {
        let skip = self.new_marker();
        self.branch(BranchKind::NonDeterministic, skip);
        self.call(receiver, method);
        self.place(skip)?;

        self.events
            .record(EventKind::CallbackGuarded)
            .procedure(self.procedure.name())
            .class(method.class())
            .message(method.to_string());
        Ok(())
    }

    /// Resolves `subsignature` on `class` and calls it on `receiver`.
    ///
    /// Nothing is emitted if the method does not resolve, resolves into a system class
    /// (the framework's own default implementation) or is abstract. Returns the called
    /// method.
    pub fn search_and_call(
        &mut self,
        subsignature: &str,
        class: &ClassName,
        receiver: Local,
    ) -> Option<MethodRef> {
        let method = self.resolve(subsignature, class)?;
        self.call(Some(receiver), &method);
        Some(method)
    }

    /// Like [`Self::search_and_call`], but the call is wrapped in an independent guard.
    ///
    /// # Errors
    ///
    /// Propagates label placement failures.
    pub fn search_and_guarded_call(
        &mut self,
        subsignature: &str,
        class: &ClassName,
        receiver: Local,
    ) -> Result<Option<MethodRef>> {
        let Some(method) = self.resolve(subsignature, class) else {
            return Ok(None);
        };
        self.guarded_call(Some(receiver), &method)?;
        Ok(Some(method))
    }

    /// Resolves a callable, non-system implementation of `subsignature` on `class`.
    #[must_use]
    pub fn resolve(&self, subsignature: &str, class: &ClassName) -> Option<MethodRef> {
        let method = self.hierarchy.find_method(class, subsignature)?;
        if method.is_abstract() || self.hierarchy.is_system_class(method.class()) {
            return None;
        }
        Some(method)
    }

    /// Emits a call into another synthesized procedure.
    pub fn call_procedure(&mut self, procedure: impl Into<String>, args: Vec<Operand>) {
        self.procedure.emit(Instruction::CallProcedure {
            procedure: procedure.into(),
            args,
        });
    }

    /// Emits a store of `value` into a static field.
    pub fn assign_field(&mut self, field: &FieldRef, value: Operand) {
        self.procedure.emit(Instruction::StoreStatic {
            field: field.clone(),
            value,
        });
    }

    /// Emits a load of a static field into a fresh local of the field's type.
    pub fn load_field(&mut self, field: &FieldRef) -> Local {
        let dest = self.procedure.new_local(field.ty().as_str());
        self.procedure.emit(Instruction::LoadStatic {
            dest,
            field: field.clone(),
        });
        dest
    }

    /// Emits a copy into a local.
    pub fn assign(&mut self, dest: Local, value: Operand) {
        self.procedure.emit(Instruction::Assign { dest, value });
    }

    /// Emits a return.
    pub fn ret(&mut self, value: Option<Operand>) {
        self.procedure.emit(Instruction::Return(value));
    }

    /// Wraps the instructions emitted by `body` in a backward branch taken arbitrarily.
    ///
    /// The back branch is only emitted if `body` produced at least one instruction
    /// other than a marker. Returns whether it was emitted.
    ///
    /// # Errors
    ///
    /// Propagates errors from `body`.
    pub fn nondet_block<F>(&mut self, body: F) -> Result<bool>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.marker()?;
        let before = self.procedure.len();
        body(self)?;

        let emitted = self.procedure.instructions()[before..]
            .iter()
            .any(|i| !i.is_marker());
        if emitted {
            self.branch(BranchKind::NonDeterministic, start);
        }
        Ok(emitted)
    }

    /// Wraps the instructions emitted by `body` in a forward branch that skips them.
    ///
    /// # Errors
    ///
    /// Propagates errors from `body`.
    pub fn optional_block<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let skip = self.new_marker();
        self.branch(BranchKind::NonDeterministic, skip);
        body(self)?;
        self.place(skip)
    }

    /// Synthesizes argument values for the given parameter types.
    ///
    /// Primitives get a zero constant, reference types the first compatible local of
    /// the procedure, anything else `null`.
    fn arguments(&self, params: &[String]) -> Vec<Operand> {
        params
            .iter()
            .map(|ty| {
                if is_primitive_type(ty) {
                    Operand::Int(0)
                } else if is_array_type(ty) {
                    Operand::Null
                } else {
                    self.procedure
                        .find_compatible(&ClassName::new(ty), self.hierarchy)
                        .map_or(Operand::Null, Operand::Local)
                }
            })
            .collect()
    }
}
