//! Fragment lifecycle driver.
//!
//! A fragment driver is generated once per fragment class and called by every
//! activity hosting it. The hosting activity is passed as a second parameter.
//!
//! ```text
//! attach:
//!   onAttach
//!   onCreate
//! create_view:
//!   onCreateView
//!   onViewCreated
//!   onActivityCreated
//! start:
//!   onStart
//! resume:
//!   onResume
//!   callbacks
//!   onPause               if * goto resume
//!   onSaveInstanceState
//!   onStop                if * goto create_view, if * goto start
//!   onDestroyView         if * goto create_view
//!   onDestroy
//!   onDetach              if * goto attach
//! ```

use std::collections::BTreeSet;

use crate::{
    ir::{BranchKind, Local, Procedure, ProcedureBuilder},
    model::{constants::*, Component, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleDriver},
    Result,
};

/// Driver for fragments.
pub struct FragmentDriver {
    base: ComponentDriver,
}

impl FragmentDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new(base: ComponentDriver) -> Self {
        Self { base }
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();

        let on_attach = b.marker()?;
        b.search_and_call(FRAGMENT_ONATTACH, class, this);
        b.search_and_call(FRAGMENT_ONCREATE, class, this);

        let on_create_view = b.marker()?;
        b.search_and_call(FRAGMENT_ONCREATEVIEW, class, this);
        b.search_and_call(FRAGMENT_ONVIEWCREATED, class, this);
        b.search_and_call(FRAGMENT_ONACTIVITYCREATED, class, this);

        let on_start = b.marker()?;
        b.search_and_call(FRAGMENT_ONSTART, class, this);

        let on_resume = b.marker()?;
        b.search_and_call(FRAGMENT_ONRESUME, class, this);
        self.base.add_callbacks(b, env, &[(class.clone(), this)])?;

        b.search_and_call(FRAGMENT_ONPAUSE, class, this);
        b.branch(BranchKind::NonDeterministic, on_resume);

        b.search_and_call(FRAGMENT_ONSAVEINSTANCESTATE, class, this);

        b.search_and_call(FRAGMENT_ONSTOP, class, this);
        b.branch(BranchKind::NonDeterministic, on_create_view);
        b.branch(BranchKind::NonDeterministic, on_start);

        b.search_and_call(FRAGMENT_ONDESTROYVIEW, class, this);
        b.branch(BranchKind::NonDeterministic, on_create_view);

        b.search_and_call(FRAGMENT_ONDESTROY, class, this);
        b.search_and_call(FRAGMENT_ONDETACH, class, this);
        b.branch(BranchKind::NonDeterministic, on_attach);
        Ok(())
    }
}

impl RoleDriver for FragmentDriver {
    fn component(&self) -> &Component {
        self.base.component()
    }

    fn set_callbacks(&mut self, callbacks: BTreeSet<MethodRef>) {
        self.base.set_callbacks(callbacks);
    }

    fn create_driver(&mut self, env: &DriverEnv<'_>) -> Result<Procedure> {
        self.base
            .build(env, &[ACTIVITY_CLASS], |b, this| self.lifecycle(b, env, this))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::EventLog,
        ir::{Instruction, Operand, ProcedureValidator},
        model::{ClassTable, ComponentKind},
        synth::SynthesisConfig,
    };

    #[test]
    fn test_activity_parameter_feeds_on_attach() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class("a.Frag", |c| {
                c.extends(FRAGMENT_CLASS)
                    .constructor(&[])
                    .method(FRAGMENT_ONATTACH)
                    .method(FRAGMENT_ONRESUME)
            })
            .build()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let mut driver = FragmentDriver::new(ComponentDriver::new(
            Component::new("a.Frag", ComponentKind::Fragment),
            None,
        ));
        let proc = driver.create_driver(&env)?;

        assert_eq!(proc.params().len(), 2);
        let activity = proc.params()[1];
        assert_eq!(proc.local_type(activity), Some(ACTIVITY_CLASS));

        let on_attach = proc
            .instructions()
            .iter()
            .find_map(|i| match i {
                Instruction::Invoke { method, args, .. } if method.signature().name() == "onAttach" => {
                    Some(args.clone())
                }
                _ => None,
            })
            .expect("onAttach is called");
        assert_eq!(on_attach, vec![Operand::Local(activity)]);
        assert!(ProcedureValidator::validate(&proc).is_empty());
        Ok(())
    }
}
