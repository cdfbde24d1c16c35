//! Per-role lifecycle drivers.
//!
//! Every component the coordinator visits gets its own driver procedure, built by a
//! [`RoleDriver`] matching the component's role. The coordinator never looks inside
//! these procedures: it only calls them. Drivers are created through a
//! [`RoleDriverFactory`], so callers can replace the lifecycle model of any role.
//!
//! # Architecture
//!
//! - [`ComponentDriver`] - the skeleton shared by all roles (procedure signature,
//!   optional skip, instance creation, re-entry, return) plus generic callback
//!   dispatch
//! - [`ActivityDriver`], [`FragmentDriver`], [`ServiceDriver`],
//!   [`BroadcastReceiverDriver`], [`ContentProviderDriver`],
//!   [`ServiceConnectionDriver`] - role lifecycles
//! - [`DefaultRoleDriverFactory`] - dispatches on [`ComponentKind`]

mod activity;
mod component;
mod connection;
mod fragment;
mod provider;
mod receiver;
mod service;

pub use activity::ActivityDriver;
pub use component::ComponentDriver;
pub use connection::ServiceConnectionDriver;
pub use fragment::FragmentDriver;
pub use provider::ContentProviderDriver;
pub use receiver::BroadcastReceiverDriver;
pub use service::ServiceDriver;

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    events::EventLog,
    ir::{FieldRef, Procedure},
    model::{ClassHierarchy, ClassName, Component, ComponentKind, MethodRef},
    synth::SynthesisConfig,
    Result,
};

/// Shared, read-only context handed to every role driver.
#[derive(Clone, Copy)]
pub struct DriverEnv<'a> {
    /// Class model used for resolution and construction
    pub hierarchy: &'a dyn ClassHierarchy,
    /// Event log of the current run
    pub events: &'a EventLog,
    /// Configuration of the current run
    pub config: &'a SynthesisConfig,
}

impl<'a> DriverEnv<'a> {
    /// Bundles the context of one synthesis run.
    pub fn new(
        hierarchy: &'a dyn ClassHierarchy,
        events: &'a EventLog,
        config: &'a SynthesisConfig,
    ) -> Self {
        Self {
            hierarchy,
            events,
            config,
        }
    }
}

/// Role-specific data computed by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAux {
    /// Fragments hosted by the component, each with the name of its driver procedure
    pub fragments: Vec<(ClassName, String)>,
    /// Activity-lifecycle listener classes and the fields holding their instances
    pub listeners: BTreeMap<ClassName, FieldRef>,
}

impl RoleAux {
    /// Returns true if there is nothing role-specific to pass on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.listeners.is_empty()
    }
}

/// Builds the driver procedure of one component.
pub trait RoleDriver {
    /// The component the driver is for.
    fn component(&self) -> &Component;

    /// Hands over the callbacks registered for the component.
    fn set_callbacks(&mut self, callbacks: BTreeSet<MethodRef>);

    /// Produces the driver procedure.
    ///
    /// # Errors
    ///
    /// Returns an error only if an internal construction invariant is broken.
    /// A missing constructor or lifecycle method is not an error.
    fn create_driver(&mut self, env: &DriverEnv<'_>) -> Result<Procedure>;
}

/// Creates role drivers for components.
pub trait RoleDriverFactory: Send + Sync {
    /// Returns the driver for `component`, or `None` if its role has no driver.
    fn create(
        &self,
        component: &Component,
        application: Option<&Component>,
        aux: &RoleAux,
    ) -> Option<Box<dyn RoleDriver>>;
}

/// The built-in lifecycle model of every role.
///
/// Application components and unclassified classes get no driver: the application
/// lifecycle is part of the root procedure itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRoleDriverFactory;

impl RoleDriverFactory for DefaultRoleDriverFactory {
    fn create(
        &self,
        component: &Component,
        application: Option<&Component>,
        aux: &RoleAux,
    ) -> Option<Box<dyn RoleDriver>> {
        let base = ComponentDriver::new(component.clone(), application);
        match component.kind() {
            ComponentKind::Activity => Some(Box::new(ActivityDriver::new(base, aux.clone()))),
            ComponentKind::Fragment => Some(Box::new(FragmentDriver::new(base))),
            ComponentKind::Service
            | ComponentKind::GcmBaseIntentService
            | ComponentKind::GcmListenerService => Some(Box::new(ServiceDriver::new(base))),
            ComponentKind::BroadcastReceiver => Some(Box::new(BroadcastReceiverDriver::new(base))),
            ComponentKind::ContentProvider => Some(Box::new(ContentProviderDriver::new(base))),
            ComponentKind::ServiceConnection => Some(Box::new(ServiceConnectionDriver::new(base))),
            ComponentKind::Application | ComponentKind::Plain => None,
        }
    }
}
