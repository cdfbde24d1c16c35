//! Broadcast receiver driver: `onReceive`, then the registered callbacks.

use std::collections::BTreeSet;

use crate::{
    ir::{Local, Procedure, ProcedureBuilder},
    model::{constants::BROADCAST_ONRECEIVE, Component, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleDriver},
    Result,
};

/// Driver for broadcast receivers.
pub struct BroadcastReceiverDriver {
    base: ComponentDriver,
}

impl BroadcastReceiverDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new(base: ComponentDriver) -> Self {
        Self { base }
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();
        b.search_and_call(BROADCAST_ONRECEIVE, class, this);
        self.base.add_callbacks(b, env, &[(class.clone(), this)])?;
        Ok(())
    }
}

impl RoleDriver for BroadcastReceiverDriver {
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
        events::EventLog,
        ir::{Instruction, Operand},
        model::{constants::BROADCAST_RECEIVER_CLASS, ClassTable, ComponentKind},
        synth::SynthesisConfig,
    };

    #[test]
    fn test_on_receive_gets_the_intent() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class("a.Boot", |c| {
                c.extends(BROADCAST_RECEIVER_CLASS)
                    .constructor(&[])
                    .method(BROADCAST_ONRECEIVE)
            })
            .build()?;
        let events = EventLog::new();
        let config = SynthesisConfig::default();
        let env = DriverEnv::new(&table, &events, &config);

        let mut driver = BroadcastReceiverDriver::new(ComponentDriver::new(
            Component::new("a.Boot", ComponentKind::BroadcastReceiver),
            None,
        ));
        let proc = driver.create_driver(&env)?;
        let intent = proc.params()[0];

        let args = proc.instructions().iter().find_map(|i| match i {
            Instruction::Invoke { args, .. } => Some(args.clone()),
            _ => None,
        });
        // no local is a Context, so the context argument is null
        assert_eq!(args, Some(vec![Operand::Null, Operand::Local(intent)]));
        Ok(())
    }
}
