//! Content provider driver.
//!
//! `onCreate`, then any sequence of data accesses and callbacks.

use std::collections::BTreeSet;

use crate::{
    ir::{Local, Procedure, ProcedureBuilder},
    model::{constants::*, Component, MethodRef},
    roles::{ComponentDriver, DriverEnv, RoleDriver},
    Result,
};

const DATA_ACCESS_METHODS: &[&str] = &[
    CONTENTPROVIDER_INSERT,
    CONTENTPROVIDER_QUERY,
    CONTENTPROVIDER_UPDATE,
    CONTENTPROVIDER_DELETE,
    CONTENTPROVIDER_GETTYPE,
];

/// Driver for content providers.
pub struct ContentProviderDriver {
    base: ComponentDriver,
}

impl ContentProviderDriver {
    /// Creates the driver.
    #[must_use]
    pub fn new(base: ComponentDriver) -> Self {
        Self { base }
    }

    fn lifecycle(&self, b: &mut ProcedureBuilder<'_>, env: &DriverEnv<'_>, this: Local) -> Result<()> {
        let class = self.base.class();
        b.search_and_call(CONTENTPROVIDER_ONCREATE, class, this);

        b.nondet_block(|b| {
            for subsignature in DATA_ACCESS_METHODS {
                b.search_and_guarded_call(subsignature, class, this)?;
            }
            Ok(())
        })?;

        self.base.add_callbacks(b, env, &[(class.clone(), this)])?;
        Ok(())
    }
}

impl RoleDriver for ContentProviderDriver {
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
