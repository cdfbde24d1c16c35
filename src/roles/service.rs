//! Service lifecycle driver, including the two cloud-messaging service variants.
//!
//! ```text
//!   onCreate
//!   onStart
//!   [onStartCommand]*
//!   [messaging methods, callbacks]*
//!   onBind
//! bound:
//!   [messaging methods, callbacks]*
//!   onUnbind
//!   if * goto destroy
//!   onRebind
//!   if * goto bound
//! destroy:
//!   onDestroy
//! ```

use std::collections::BTreeSet;

use crate::{
    ir::{BranchKind, Local, Procedure, ProcedureBuilder},
    model::{constants::*, Component, ComponentKind, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleDriver},
    Result,
};

/// Driver for services.
pub struct ServiceDriver {
    base: ComponentDriver,
}

impl ServiceDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new(base: ComponentDriver) -> Self {
        Self { base }
    }

    /// Messaging methods the framework calls on the cloud-messaging variants.
    fn messaging_methods(&self) -> &'static [&'static str] {
        match self.base.component().kind() {
            ComponentKind::GcmBaseIntentService => GCM_INTENT_SERVICE_METHODS,
            ComponentKind::GcmListenerService => GCM_LISTENER_SERVICE_METHODS,
            _ => &[],
        }
    }

    /// One "running" phase: messaging methods and callbacks in any order, any number
    /// of times, possibly none.
    fn running(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();
        b.optional_block(|b| {
            b.nondet_block(|b| {
                for subsignature in self.messaging_methods() {
                    if let Some(method) = b.resolve(subsignature, class) {
                        b.guarded_call(Some(this), &method)?;
                    }
                }
                self.base.add_callbacks(b, env, &[(class.clone(), this)])?;
                Ok(())
            })?;
            Ok(())
        })
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();

        b.search_and_call(SERVICE_ONCREATE, class, this);
        b.search_and_call(SERVICE_ONSTART, class, this);

        b.optional_block(|b| {
            b.nondet_block(|b| {
                b.search_and_call(SERVICE_ONSTARTCOMMAND, class, this);
                Ok(())
            })?;
            Ok(())
        })?;

        self.running(b, env, this)?;
        b.search_and_call(SERVICE_ONBIND, class, this);

        let bound = b.marker()?;
        self.running(b, env, this)?;

        let on_destroy = b.new_marker();
        b.search_and_call(SERVICE_ONUNBIND, class, this);
        b.branch(BranchKind::NonDeterministic, on_destroy);
        b.search_and_call(SERVICE_ONREBIND, class, this);
        b.branch(BranchKind::NonDeterministic, bound);

        b.place(on_destroy)?;
        b.search_and_call(SERVICE_ONDESTROY, class, this);
        Ok(())
    }
}

impl RoleDriver for ServiceDriver {
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
    use super::*;
    use crate::{
        events::{EventKind, EventLog},
        ir::{Instruction, ProcedureValidator},
        model::ClassTable,
        synth::SynthesisConfig,
    };

    fn calls(proc: &Procedure) -> Vec<String> {
        proc.instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Invoke { method, .. } => Some(method.signature().name().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_service() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class("a.Sync", |c| {
                c.extends(SERVICE_CLASS)
                    .constructor(&[])
                    .method(SERVICE_ONCREATE)
                    .method(SERVICE_ONSTARTCOMMAND)
                    .method(SERVICE_ONBIND)
                    .method(SERVICE_ONDESTROY)
            })
            .build()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let mut driver = ServiceDriver::new(ComponentDriver::new(
            Component::new("a.Sync", ComponentKind::Service),
            None,
        ));
        driver.set_callbacks(
            [MethodRef::new("a.Sync", SERVICE_ONBIND)?].into_iter().collect(),
        );
        let proc = driver.create_driver(&env)?;

        // onBind is a lifecycle method, never dispatched as a callback
        assert_eq!(calls(&proc), ["onCreate", "onStartCommand", "onBind", "onDestroy"]);
        assert_eq!(events.count_kind(EventKind::CallbackGuarded), 0);
        assert!(ProcedureValidator::validate(&proc).is_empty());
        Ok(())
    }

    #[test]
    fn test_messaging_methods_run_in_both_phases() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class(GCM_LISTENER_SERVICE_CLASS, |c| {
                c.extends(SERVICE_CLASS)
                    .abstract_class()
                    .method("void onMessageReceived(java.lang.String,android.os.Bundle)")
                    .method("void onDeletedMessages()")
            })
            .class("a.Push", |c| {
                c.extends(GCM_LISTENER_SERVICE_CLASS)
                    .constructor(&[])
                    .method("void onMessageReceived(java.lang.String,android.os.Bundle)")
            })
            .build()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let mut driver = ServiceDriver::new(ComponentDriver::new(
            Component::new("a.Push", ComponentKind::GcmListenerService),
            None,
        ));
        let proc = driver.create_driver(&env)?;

        assert_eq!(calls(&proc), ["onMessageReceived", "onMessageReceived"]);
        assert_eq!(events.count_kind(EventKind::CallbackGuarded), 2);
        assert!(ProcedureValidator::validate(&proc).is_empty());
        Ok(())
    }
}
