//! Activity lifecycle driver.
//!
//! ```text
//!   load application and lifecycle listeners from their fields
//!   construct hosted fragments (any order, any number of times)
//!   onCreate                      listeners: onActivityCreated
//!   per fragment: [onAttachFragment] fragment driver
//! start:
//!   onStart                       listeners: onActivityStarted
//!   [onRestoreInstanceState]
//!   onPostCreate
//! resume:
//!   onResume                      listeners: onActivityResumed
//!   onPostResume
//!   callbacks
//!   onPause                       listeners: onActivityPaused
//!   onCreateDescription
//!   onSaveInstanceState           listeners: onActivitySaveInstanceState
//!   if * goto resume
//! stop:
//!   onStop                        listeners: onActivityStopped
//!   if * goto destroy
//!   onRestart
//!   if * goto start
//! destroy:
//!   onDestroy                     listeners: onActivityDestroyed
//! ```

use std::collections::BTreeSet;

use crate::{
    ir::{BranchKind, Local, Operand, Procedure, ProcedureBuilder},
    model::{constants::*, ClassName, Component, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleAux, RoleDriver},
    Result,
};

/// Driver for activities, including the fragments they host.
pub struct ActivityDriver {
    base: ComponentDriver,
    aux: RoleAux,
}

impl ActivityDriver {
    /// Creates the driver. `aux` carries hosted fragments and lifecycle listeners.
    #[must_use]
    pub fn new(base: ComponentDriver, aux: RoleAux) -> Self {
        Self { base, aux }
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();
        let mut references = vec![(class.clone(), this)];

        if let Some(app) = self.base.application() {
            let local = b.load_field(&env.config.application_holder);
            references.push((app.clone(), local));
        }

        let mut listeners = Vec::with_capacity(self.aux.listeners.len());
        for (listener, field) in &self.aux.listeners {
            let local = b.load_field(field);
            listeners.push((listener.clone(), local));
            references.push((listener.clone(), local));
        }

        if !self.aux.fragments.is_empty() {
            b.nondet_block(|b| {
                for (fragment, _) in &self.aux.fragments {
                    b.materialize(fragment);
                }
                Ok(())
            })?;
        }

        b.search_and_call(ACTIVITY_ONCREATE, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYCREATED);

        for (fragment, driver) in &self.aux.fragments {
            if b.procedure().instance_of(fragment).is_none() {
                continue;
            }
            b.optional_block(|b| {
                b.search_and_call(ACTIVITY_ONATTACHFRAGMENT, class, this);
                Ok(())
            })?;
            b.call_procedure(driver.as_str(), vec![Operand::Null, Operand::Local(this)]);
        }

        let on_start = b.marker()?;
        b.search_and_call(ACTIVITY_ONSTART, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTARTED);
        b.optional_block(|b| {
            b.search_and_call(ACTIVITY_ONRESTOREINSTANCESTATE, class, this);
            Ok(())
        })?;
        b.search_and_call(ACTIVITY_ONPOSTCREATE, class, this);

        let on_resume = b.marker()?;
        b.search_and_call(ACTIVITY_ONRESUME, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYRESUMED);
        b.search_and_call(ACTIVITY_ONPOSTRESUME, class, this);

        self.base.add_callbacks(b, env, &references)?;

        b.search_and_call(ACTIVITY_ONPAUSE, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYPAUSED);
        b.search_and_call(ACTIVITY_ONCREATEDESCRIPTION, class, this);
        b.search_and_call(ACTIVITY_ONSAVEINSTANCESTATE, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSAVEINSTANCESTATE);
        b.branch(BranchKind::NonDeterministic, on_resume);

        // the activity and its listeners may observe the stop in any order
        let on_stop = b.marker()?;
        let stopped = b.search_and_call(ACTIVITY_ONSTOP, class, this).is_some();
        let listeners_stopped = notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTOPPED);
        if stopped && listeners_stopped > 0 {
            b.branch(BranchKind::NonDeterministic, on_stop);
        }

        let on_destroy = b.new_marker();
        b.branch(BranchKind::NonDeterministic, on_destroy);
        b.search_and_call(ACTIVITY_ONRESTART, class, this);
        b.branch(BranchKind::NonDeterministic, on_start);

        b.place(on_destroy)?;
        b.search_and_call(ACTIVITY_ONDESTROY, class, this);
        notify(b, &listeners, ACTIVITYLIFECYCLECALLBACK_ONACTIVITYDESTROYED);
        Ok(())
    }
}

/// Calls `subsignature` on every listener implementing it. Returns the number of calls.
fn notify(b: &mut ProcedureBuilder<'_>, listeners: &[(ClassName, Local)], subsignature: &str) -> usize {
    listeners
        .iter()
        .filter(|(class, local)| b.search_and_call(subsignature, class, *local).is_some())
        .count()
}

impl RoleDriver for ActivityDriver {
    fn component(&self) -> &Component {
        self.base.component()
    }

    fn set_callbacks(&mut self, callbacks: BTreeSet<MethodRef>) {
        self.base.set_callbacks(callbacks);
    }

    fn create_driver(&mut self, env: &DriverEnv<'_>) -> Result<Procedure> {
        self.base.build(env, &[], |b, this| self.lifecycle(b, env, this))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        events::EventLog,
        ir::{FieldRef, Instruction, ProcedureValidator},
        model::{ClassTable, ComponentKind},
        synth::SynthesisConfig,
    };

    fn table() -> Result<ClassTable> {
        ClassTable::builder()
            .framework()
            .class("a.Main", |c| {
                c.extends(ACTIVITY_CLASS)
                    .constructor(&[])
                    .method(ACTIVITY_ONCREATE)
                    .method(ACTIVITY_ONRESUME)
                    .method(ACTIVITY_ONSTOP)
                    .method(ACTIVITY_ONATTACHFRAGMENT)
                    .method("void onClick(android.view.View)")
            })
            .class("a.Frag", |c| c.extends(FRAGMENT_CLASS).constructor(&[]))
            .class("a.Tracker", |c| {
                c.implements(ACTIVITY_LIFECYCLE_CALLBACKS_INTERFACE)
                    .constructor(&[])
                    .method(ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTOPPED)
                    .method(ACTIVITYLIFECYCLECALLBACK_ONACTIVITYCREATED)
            })
            .build()
    }

    fn invoked(proc: &Procedure) -> Vec<String> {
        proc.instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Invoke { method, .. } => Some(method.signature().name().to_string()),
                Instruction::CallProcedure { procedure, .. } => Some(procedure.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lifecycle_order() -> Result<()> {
        let table = table()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let tracker = FieldRef::new("dummyMainClass", "Tracker", "a.Tracker");
        let aux = RoleAux {
            fragments: vec![("a.Frag".into(), "dummyMainMethod_a_Frag".to_string())],
            listeners: BTreeMap::from([("a.Tracker".into(), tracker)]),
        };
        let mut driver = ActivityDriver::new(
            ComponentDriver::new(Component::new("a.Main", ComponentKind::Activity), None),
            aux,
        );
        driver.set_callbacks(
            [MethodRef::new("a.Main", "void onClick(android.view.View)")?]
                .into_iter()
                .collect(),
        );

        let proc = driver.create_driver(&env)?;
        assert_eq!(
            invoked(&proc),
            [
                "onCreate",
                "onActivityCreated",
                "onAttachFragment",
                "dummyMainMethod_a_Frag",
                "onResume",
                "onClick",
                "onStop",
                "onActivityStopped",
            ]
        );
        assert!(ProcedureValidator::validate(&proc).is_empty());
        Ok(())
    }

    #[test]
    fn test_application_loaded_from_holder() -> Result<()> {
        let table = table()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let app = Component::new("a.App", ComponentKind::Application);
        let mut driver = ActivityDriver::new(
            ComponentDriver::new(Component::new("a.Main", ComponentKind::Activity), Some(&app)),
            RoleAux::default(),
        );
        let proc = driver.create_driver(&env)?;

        assert!(proc.instructions().iter().any(|i| matches!(
            i,
            Instruction::LoadStatic { field, .. } if field == &config.application_holder
        )));
        Ok(())
    }
}
