//! Service connection driver.

use std::collections::BTreeSet;

use crate::{
    ir::{Local, Procedure, ProcedureBuilder},
    model::{constants::*, Component, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleDriver},
    Result,
};

/// Driver for service connections: connect, callbacks, disconnect.
pub struct ServiceConnectionDriver {
    base: ComponentDriver,
}

impl ServiceConnectionDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new(base: ComponentDriver) -> Self {
        Self { base }
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();
        b.search_and_call(SERVICECONNECTION_ONSERVICECONNECTED, class, this);
        self.base.add_callbacks(b, env, &[(class.clone(), this)])?;
        b.search_and_call(SERVICECONNECTION_ONSERVICEDISCONNECTED, class, this);
        Ok(())
    }
}

impl RoleDriver for ServiceConnectionDriver {
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
