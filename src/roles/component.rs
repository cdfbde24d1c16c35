//! Driver skeleton shared by every role.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    events::EventKind,
    ir::{BranchKind, Local, Operand, Procedure, ProcedureBuilder},
    model::{constants, ClassName, Component, ComponentRole, MethodRef},
    roles::DriverEnv,
    synth::SynthesisConfig,
    Result,
};

/// Common state and construction steps of a component driver.
///
/// Every driver procedure has the same outer shape:
///
/// ```text
/// <dummy_class: C dummyMainMethod_a_b_C(android.content.Intent, ...)>
///   before:
///     if * goto end
///     $c = new C(...)
///     <role lifecycle>
///     if * goto before
///   end:
///     return $c
/// ```
///
/// Role drivers supply the lifecycle part through [`ComponentDriver::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDriver {
    component: Component,
    application: Option<ClassName>,
    callbacks: BTreeSet<MethodRef>,
}

impl ComponentDriver {
    /// Creates the skeleton for `component`.
    #[must_use]
    pub fn new(component: Component, application: Option<&Component>) -> Self {
        Self {
            component,
            application: application.map(|app| app.class().clone()),
            callbacks: BTreeSet::new(),
        }
    }

    /// The component being driven.
    #[must_use]
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// The component's class.
    #[must_use]
    pub fn class(&self) -> &ClassName {
        self.component.class()
    }

    /// The application class, if the app has one.
    #[must_use]
    pub fn application(&self) -> Option<&ClassName> {
        self.application.as_ref()
    }

    /// Callbacks registered for the component.
    #[must_use]
    pub fn callbacks(&self) -> &BTreeSet<MethodRef> {
        &self.callbacks
    }

    /// Replaces the registered callbacks.
    pub fn set_callbacks(&mut self, callbacks: BTreeSet<MethodRef>) {
        self.callbacks = callbacks;
    }

    /// Name of the driver procedure: the dummy method name followed by the mangled
    /// class name.
    #[must_use]
    pub fn procedure_name(&self, config: &SynthesisConfig) -> String {
        driver_name(config, self.class())
    }

    /// Builds the driver procedure around `lifecycle`.
    ///
    /// The procedure takes an intent followed by `extra_params` and returns the
    /// component instance. If the component cannot be constructed the lifecycle is
    /// skipped and the procedure returns `null`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `lifecycle` and label placement.
    pub fn build<F>(&self, env: &DriverEnv<'_>, extra_params: &[&str], lifecycle: F) -> Result<Procedure>
    where
        F: FnOnce(&mut ProcedureBuilder<'_>, Local) -> Result<()>,
    {
        let class = self.class();
        let mut procedure = Procedure::new(
            env.config.dummy_class.clone(),
            self.procedure_name(env.config),
            class.as_str(),
        );
        procedure.add_param(constants::INTENT_CLASS);
        for param in extra_params {
            procedure.add_param(*param);
        }

        let mut b = ProcedureBuilder::new(&mut procedure, env.hierarchy, env.events);
        let before = b.marker()?;
        let end = b.new_marker();
        b.branch(BranchKind::NonDeterministic, end);

        let instance = b.materialize(class);
        if let Some(this) = instance {
            lifecycle(&mut b, this)?;
        }

        b.branch(BranchKind::NonDeterministic, before);
        b.place(end)?;
        b.ret(Some(instance.map_or(Operand::Null, Operand::Local)));

        log::debug!(
            "built driver {} for {} ({} instructions)",
            procedure.name(),
            class,
            procedure.len()
        );
        env.events
            .record(EventKind::DriverCreated)
            .procedure(procedure.name())
            .class(class)
            .message(format!("{} driver", self.component.kind()));
        Ok(procedure)
    }

    /// Returns true if `method` is one of the lifecycle methods the role driver places
    /// itself, declared somewhere in the component's own hierarchy.
    #[must_use]
    pub fn is_lifecycle_method(&self, env: &DriverEnv<'_>, method: &MethodRef) -> bool {
        let subsignature = method.subsignature();
        let mut lifecycle = self.component.kind().lifecycle_methods().iter();
        let listed = lifecycle.any(|m| *m == subsignature)
            || (self.component.role() == Some(ComponentRole::Service)
                && constants::SERVICE_LIFECYCLE_METHODS.contains(&subsignature.as_str()));
        listed && env.hierarchy.is_assignable_to(self.class(), method.class())
    }

    /// Emits a non-deterministic block with one guarded call per registered callback.
    ///
    /// Lifecycle methods are left out. Callbacks are grouped by declaring class; each
    /// group is called on the first of `references` assignable to the declaring class,
    /// or on a freshly materialized instance otherwise. Groups whose class cannot be
    /// constructed are dropped. Returns true if at least one call was emitted.
    ///
    /// # Errors
    ///
    /// Propagates label placement failures.
    pub fn add_callbacks(
        &self,
        b: &mut ProcedureBuilder<'_>,
        env: &DriverEnv<'_>,
        references: &[(ClassName, Local)],
    ) -> Result<bool> {
        let mut groups: BTreeMap<&ClassName, Vec<&MethodRef>> = BTreeMap::new();
        for method in &self.callbacks {
            if !self.is_lifecycle_method(env, method) {
                groups.entry(method.class()).or_default().push(method);
            }
        }
        if groups.is_empty() {
            return Ok(false);
        }

        b.nondet_block(|b| {
            for (class, methods) in groups {
                let receiver = references
                    .iter()
                    .find(|(reference, _)| env.hierarchy.is_assignable_to(reference, class))
                    .map(|(_, local)| *local)
                    .or_else(|| b.materialize(class));
                let Some(receiver) = receiver else {
                    continue;
                };
                for method in methods {
                    b.guarded_call(Some(receiver), method)?;
                }
            }
            Ok(())
        })
    }
}

/// Name of the driver procedure generated for `class`.
pub(crate) fn driver_name(config: &SynthesisConfig, class: &ClassName) -> String {
    format!("{}_{}", config.dummy_method, class.mangled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::EventLog,
        ir::{Instruction, ProcedureValidator},
        model::{ClassTable, ComponentKind},
    };

    fn table() -> Result<ClassTable> {
        ClassTable::builder()
            .framework()
            .class("a.b.Main_Activity", |c| {
                c.extends("android.app.Activity")
                    .constructor(&[])
                    .method("void onCreate(android.os.Bundle)")
                    .method("void onClick(android.view.View)")
            })
            .class("a.b.Listener", |c| c.constructor(&[]).method("void onEvent()"))
            .class("a.b.Abstract", |c| {
                c.extends("android.app.Activity").abstract_class()
            })
            .build()
    }

    #[test]
    fn test_procedure_name_and_shape() -> Result<()> {
        let table = table()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let driver = ComponentDriver::new(
            Component::new("a.b.Main_Activity", ComponentKind::Activity),
            None,
        );
        let proc = driver.build(&env, &[], |_, _| Ok(()))?;

        assert_eq!(proc.name(), "dummyMainMethod_a_b_Main__Activity");
        assert_eq!(proc.return_type(), "a.b.Main_Activity");
        assert_eq!(proc.params().len(), 1);
        assert!(matches!(
            proc.instructions().last(),
            Some(Instruction::Return(Some(Operand::Local(_))))
        ));
        assert!(ProcedureValidator::validate(&proc).is_empty());
        assert_eq!(events.count_kind(EventKind::DriverCreated), 1);
        Ok(())
    }

    #[test]
    fn test_unconstructible_component_returns_null() -> Result<()> {
        let table = table()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let driver = ComponentDriver::new(Component::new("a.b.Abstract", ComponentKind::Activity), None);
        let mut ran = false;
        let proc = driver.build(&env, &[], |_, _| {
            ran = true;
            Ok(())
        })?;

        assert!(!ran);
        assert!(matches!(
            proc.instructions().last(),
            Some(Instruction::Return(Some(Operand::Null)))
        ));
        assert!(ProcedureValidator::validate(&proc).is_empty());
        Ok(())
    }

    #[test]
    fn test_callbacks_skip_lifecycle_and_reuse_references() -> Result<()> {
        let table = table()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let mut driver = ComponentDriver::new(
            Component::new("a.b.Main_Activity", ComponentKind::Activity),
            None,
        );
        driver.set_callbacks(
            [
                MethodRef::new("a.b.Main_Activity", "void onCreate(android.os.Bundle)")?,
                MethodRef::new("a.b.Main_Activity", "void onClick(android.view.View)")?,
                MethodRef::new("a.b.Listener", "void onEvent()")?,
            ]
            .into_iter()
            .collect(),
        );

        let proc = driver.build(&env, &[], |b, this| {
            let class = driver.class().clone();
            assert!(driver.add_callbacks(b, &env, &[(class, this)])?);
            Ok(())
        })?;

        let calls: Vec<_> = proc
            .instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Invoke { method, .. } => Some(method.signature().name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(calls, ["onEvent", "onClick"]);
        assert_eq!(events.count_kind(EventKind::CallbackGuarded), 2);
        // component plus the listener
        assert_eq!(proc.instances().count(), 2);
        Ok(())
    }
}
