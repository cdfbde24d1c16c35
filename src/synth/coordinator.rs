//! The root procedure builder.
//!
//! [`DriverCoordinator`] emits the root procedure in a fixed sequence of phases and
//! collects one driver procedure per component on the way:
//!
//! ```text
//!   [new P; P.onCreate?]*                 content providers
//!   new App
//!   [new Generic?, new Listener?, Listener -> field]*
//!   App.onCreate
//!   App -> holder field
//! outer:
//!   per component:
//! before:
//!     if * goto after
//!     call driver(null)
//!     if * goto before
//! after:
//!   [App callbacks?]*
//!   if * goto outer
//!   App.onTerminate
//!   return
//! ```
//!
//! The whole run is computed on local state and only committed to the coordinator
//! once every phase, the cleanup and the optional validation succeeded. A failed run
//! leaves no partial procedure behind.

use std::collections::BTreeMap;

use crate::{
    cleanup::CleanupPipeline,
    events::{DerivedStats, EventKind, EventLog},
    ir::{BranchKind, FieldPool, FieldRef, Operand, Procedure, ProcedureBuilder, ProcedureValidator},
    model::{
        constants::{
            ACTIVITY_LIFECYCLE_CALLBACK_METHODS, APPLICATION_LIFECYCLE_METHODS, APPLICATION_ONCREATE,
            APPLICATION_ONTERMINATE, CONTENTPROVIDER_ONCREATE,
        },
        ApplicationCallbacks, ClassHierarchy, ClassName, Component, ComponentKind, ComponentRegistry,
        ComponentRole,
    },
    roles::{DefaultRoleDriverFactory, DriverEnv, RoleAux, RoleDriverFactory},
    synth::{ComponentDriverMap, SynthesisConfig, SynthesisInput, SynthesisOutput},
    Error, Result,
};

/// Synthesizes the root procedure and the component drivers.
///
/// A coordinator can be reused: every [`DriverCoordinator::synthesize`] call starts
/// from a clean slate.
pub struct DriverCoordinator<'a> {
    hierarchy: &'a dyn ClassHierarchy,
    config: SynthesisConfig,
    factory: Box<dyn RoleDriverFactory>,
    cleanup: CleanupPipeline,
    main: Option<Procedure>,
    drivers: ComponentDriverMap,
    fields: FieldPool,
    events: EventLog,
}

/// The state produced by one run before it is committed.
struct Run {
    main: Procedure,
    drivers: ComponentDriverMap,
    fields: FieldPool,
}

impl<'a> DriverCoordinator<'a> {
    /// Creates a coordinator with the default configuration.
    #[must_use]
    pub fn new(hierarchy: &'a dyn ClassHierarchy) -> Self {
        Self::with_config(hierarchy, SynthesisConfig::default())
    }

    /// Creates a coordinator with the given configuration.
    #[must_use]
    pub fn with_config(hierarchy: &'a dyn ClassHierarchy, config: SynthesisConfig) -> Self {
        Self {
            hierarchy,
            cleanup: CleanupPipeline::new(config.cleanup),
            fields: FieldPool::new(config.dummy_class.clone()),
            config,
            factory: Box::new(DefaultRoleDriverFactory),
            main: None,
            drivers: ComponentDriverMap::new(),
            events: EventLog::new(),
        }
    }

    /// Replaces the role driver factory.
    #[must_use]
    pub fn with_factory(mut self, factory: impl RoleDriverFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesizes the root procedure for `input`.
    ///
    /// Any state of a previous run is discarded first.
    ///
    /// # Errors
    ///
    /// - [`Error::MultipleApplications`] if the registry holds two application components
    /// - [`Error::Validation`] if validation is enabled and a procedure is malformed
    /// - [`Error::Synthesis`] if an internal invariant is broken
    ///
    /// Missing constructors and lifecycle methods are never errors; they are recorded
    /// in [`DriverCoordinator::events`].
    pub fn synthesize(&mut self, input: &SynthesisInput) -> Result<&Procedure> {
        self.reset();
        log::info!(
            "synthesizing {}.{} for {} components",
            self.config.dummy_class,
            self.config.dummy_method,
            input.components.len()
        );

        let events = EventLog::new();
        let result = self.run(input, &events);
        self.events = events;

        let run = result?;
        self.fields = run.fields;
        self.drivers = run.drivers;

        log::info!(
            "synthesized {} with {} drivers: {}",
            run.main.name(),
            self.drivers.len(),
            DerivedStats::from_log(&self.events)
        );
        Ok(self.main.insert(run.main))
    }

    /// Discards the procedures, fields and events of the last run.
    pub fn reset(&mut self) {
        self.main = None;
        self.drivers.clear();
        self.fields.clear();
        self.events = EventLog::new();
    }

    /// The driver procedure generated for `component` in the last run.
    #[must_use]
    pub fn driver_for(&self, component: &Component) -> Option<&Procedure> {
        self.drivers.get(component)
    }

    /// Every driver procedure generated in the last run.
    #[must_use]
    pub fn component_drivers(&self) -> &ComponentDriverMap {
        &self.drivers
    }

    /// Fields allocated on the dummy class in the last run.
    #[must_use]
    pub fn fields(&self) -> &FieldPool {
        &self.fields
    }

    /// Events of the last run, including a failed one.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The root procedure of the last successful run.
    #[must_use]
    pub fn main_procedure(&self) -> Option<&Procedure> {
        self.main.as_ref()
    }

    /// Consumes the coordinator, returning the result of the last run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if no run succeeded.
    pub fn into_output(self) -> Result<SynthesisOutput> {
        let Some(main) = self.main else {
            return Err(synthesis_error!("no root procedure has been synthesized"));
        };
        Ok(SynthesisOutput {
            main,
            drivers: self.drivers,
            fields: self.fields,
            events: self.events,
        })
    }

    fn run(&self, input: &SynthesisInput, events: &EventLog) -> Result<Run> {
        // Checked before anything is emitted.
        let application = find_application(&input.components)?;

        let mut run = Run {
            main: Procedure::new(
                self.config.dummy_class.clone(),
                self.config.dummy_method.clone(),
                "void",
            ),
            drivers: ComponentDriverMap::new(),
            fields: FieldPool::new(self.config.dummy_class.clone()),
        };
        let env = DriverEnv::new(self.hierarchy, events, &self.config);

        {
            let mut b = ProcedureBuilder::new(&mut run.main, self.hierarchy, events);

            self.emit_content_providers(&mut b, &input.components)?;

            let partition = application.map(|app| match &input.application_callbacks {
                Some(partition) => partition.clone(),
                None => ApplicationCallbacks::partition(
                    input.callbacks.get(app.class()).into_iter().flatten(),
                    &self.config.lifecycle_listener_capability,
                    self.hierarchy,
                ),
            });
            let app_local = application.and_then(|app| b.materialize(app.class()));

            // Allocated even if the application cannot be constructed; activities read them.
            let mut listener_fields = BTreeMap::new();
            if let Some(partition) = &partition {
                listener_fields = self.allocate_listener_fields(partition, &mut run.fields, events);
                self.emit_callback_instances(&mut b, partition, &listener_fields)?;
            }

            if let (Some(app), Some(local)) = (application, app_local) {
                b.search_and_call(APPLICATION_ONCREATE, app.class(), local);
                b.assign_field(&self.config.application_holder, Operand::Local(local));
            }

            let outer = b.marker()?;
            self.emit_components(&mut b, &env, input, application, &listener_fields, &mut run.drivers)?;

            if let (Some(app), Some(partition), Some(_)) = (application, &partition, app_local) {
                self.emit_application_callbacks(&mut b, app, partition)?;
            }

            b.branch(BranchKind::NonDeterministic, outer);

            if let (Some(app), Some(local)) = (application, app_local) {
                b.search_and_call(APPLICATION_ONTERMINATE, app.class(), local);
            }
            b.ret(None);
        }

        self.cleanup.run(&mut run.main, events);
        for procedure in run.drivers.procedures_mut() {
            self.cleanup.run(procedure, events);
        }

        if self.config.validate {
            ProcedureValidator::check(&run.main)?;
            for (_, procedure) in &run.drivers {
                ProcedureValidator::check(procedure)?;
            }
        }

        Ok(run)
    }

    /// Content providers are created before the application, in any order.
    fn emit_content_providers(&self, b: &mut ProcedureBuilder<'_>, components: &ComponentRegistry) -> Result<()> {
        b.nondet_block(|b| {
            for provider in components.with_role(ComponentRole::ContentProvider) {
                let Some(local) = b.materialize(provider.class()) else {
                    continue;
                };
                b.search_and_guarded_call(CONTENTPROVIDER_ONCREATE, provider.class(), local)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    fn allocate_listener_fields(
        &self,
        partition: &ApplicationCallbacks,
        fields: &mut FieldPool,
        events: &EventLog,
    ) -> BTreeMap<ClassName, FieldRef> {
        let mut allocated = BTreeMap::new();
        for listener in partition.listeners.keys() {
            let (field, fresh) = fields.declare(listener, self.hierarchy);
            if fresh {
                log::debug!("allocated {} for listener {}", field, listener);
                events
                    .record(EventKind::FieldAllocated)
                    .procedure(self.config.dummy_method.as_str())
                    .class(listener)
                    .message(field.to_string());
            }
            allocated.insert(listener.clone(), field);
        }
        allocated
    }

    /// Constructs the application callback classes and publishes the listeners.
    fn emit_callback_instances(
        &self,
        b: &mut ProcedureBuilder<'_>,
        partition: &ApplicationCallbacks,
        listener_fields: &BTreeMap<ClassName, FieldRef>,
    ) -> Result<()> {
        b.nondet_block(|b| {
            for class in partition.generic.keys().chain(partition.listeners.keys()) {
                b.optional_block(|b| {
                    b.materialize(class);
                    Ok(())
                })?;
            }
            for (listener, field) in listener_fields {
                if let Some(local) = b.procedure().instance_of(listener) {
                    b.assign_field(field, Operand::Local(local));
                }
            }
            Ok(())
        })?;
        Ok(())
    }

    fn emit_components(
        &self,
        b: &mut ProcedureBuilder<'_>,
        env: &DriverEnv<'_>,
        input: &SynthesisInput,
        application: Option<&Component>,
        listener_fields: &BTreeMap<ClassName, FieldRef>,
        drivers: &mut ComponentDriverMap,
    ) -> Result<()> {
        let mut fragment_drivers = BTreeMap::new();
        for fragment in input.fragments.all_fragments() {
            let component = Component::new(fragment, ComponentKind::Fragment);
            if let Some(name) =
                self.create_driver(env, &component, application, &RoleAux::default(), input, drivers)?
            {
                fragment_drivers.insert(fragment.clone(), name);
            }
        }

        for component in &input.components {
            if component.kind() == ComponentKind::Fragment {
                log::debug!("{} is driven by its hosting activities", component);
                continue;
            }

            let aux = RoleAux {
                fragments: input
                    .fragments
                    .fragments_of(component.class())
                    .filter_map(|f| fragment_drivers.get(f).map(|name| (f.clone(), name.clone())))
                    .collect(),
                listeners: listener_fields.clone(),
            };
            let Some(name) = self.create_driver(env, component, application, &aux, input, drivers)? else {
                continue;
            };
            if !self.config.emit_component_calls {
                continue;
            }

            let before = b.marker()?;
            let after = b.new_marker();
            b.branch(BranchKind::NonDeterministic, after);
            b.call_procedure(name, vec![Operand::Null]);
            b.branch(BranchKind::NonDeterministic, before);
            b.place(after)?;
        }
        Ok(())
    }

    /// Generates and records the driver of one component. Returns its procedure name,
    /// or `None` if the component is left out.
    fn create_driver(
        &self,
        env: &DriverEnv<'_>,
        component: &Component,
        application: Option<&Component>,
        aux: &RoleAux,
        input: &SynthesisInput,
        drivers: &mut ComponentDriverMap,
    ) -> Result<Option<String>> {
        let Some(mut driver) = self.factory.create(component, application, aux) else {
            log::debug!("{} has no role driver", component);
            return Ok(None);
        };

        if self.hierarchy.constructor(component.class()).is_none() {
            log::warn!("skipping {}: no usable constructor", component);
            env.events
                .record(EventKind::ComponentSkipped)
                .class(component.class())
                .message(format!("no usable constructor for {component}"));
            return Ok(None);
        }

        driver.set_callbacks(input.callbacks.callbacks_of(component.class()));
        let procedure = driver.create_driver(env)?;
        drivers.insert(component.clone(), procedure);
        let name = drivers
            .name_of(component)
            .ok_or_else(|| synthesis_error!("driver of {} was not recorded", component))?;
        Ok(Some(name.to_string()))
    }

    /// Application-level callbacks, each independently guarded, in any order.
    fn emit_application_callbacks(
        &self,
        b: &mut ProcedureBuilder<'_>,
        app: &Component,
        partition: &ApplicationCallbacks,
    ) -> Result<()> {
        b.nondet_block(|b| {
            for (class, methods) in &partition.generic {
                for method in methods {
                    let subsignature = method.subsignature();
                    if class == app.class() && APPLICATION_LIFECYCLE_METHODS.contains(&subsignature.as_str()) {
                        continue;
                    }
                    if partition.listeners.contains_key(class)
                        && ACTIVITY_LIFECYCLE_CALLBACK_METHODS.contains(&subsignature.as_str())
                    {
                        continue;
                    }
                    let Some(resolved) = b.resolve(&subsignature, class) else {
                        continue;
                    };
                    let Some(receiver) = b.procedure().instance_of(class) else {
                        log::warn!("no instance of {} for application callback {}", class, resolved);
                        b.events()
                            .record(EventKind::Warning)
                            .procedure(b.procedure().name())
                            .class(class)
                            .message(format!("no receiver for {resolved}"));
                        continue;
                    };
                    b.guarded_call(Some(receiver), &resolved)?;
                }
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// The single application component of the registry, if any.
fn find_application(components: &ComponentRegistry) -> Result<Option<&Component>> {
    let mut found: Option<&Component> = None;
    for component in components.with_role(ComponentRole::Application) {
        if let Some(first) = found {
            return Err(Error::MultipleApplications {
                first: first.class().clone(),
                second: component.class().clone(),
            });
        }
        found = Some(component);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::Instruction,
        model::{constants::*, CallbackRegistry, ClassTable, MethodRef},
    };

    fn table() -> Result<ClassTable> {
        ClassTable::builder()
            .framework()
            .class("a.App", |c| {
                c.extends(APPLICATION_CLASS)
                    .constructor(&[])
                    .method(APPLICATION_ONCREATE)
                    .method(APPLICATION_ONTERMINATE)
                    .method("void onLowMemory()")
            })
            .class("a.Other", |c| c.extends(APPLICATION_CLASS).constructor(&[]))
            .class("a.Main", |c| {
                c.extends(ACTIVITY_CLASS)
                    .constructor(&[])
                    .method(ACTIVITY_ONCREATE)
            })
            .build()
    }

    #[test]
    fn test_second_application_aborts_without_output() -> Result<()> {
        let table = table()?;
        let components = ComponentRegistry::new()
            .with("a.App", ComponentKind::Application)
            .with("a.Main", ComponentKind::Activity)
            .with("a.Other", ComponentKind::Application);
        let input = SynthesisInput::new(components, CallbackRegistry::new());

        let mut coordinator = DriverCoordinator::new(&table);
        let err = coordinator.synthesize(&input).unwrap_err();
        assert!(matches!(
            err,
            Error::MultipleApplications { ref first, ref second }
                if first.as_str() == "a.App" && second.as_str() == "a.Other"
        ));
        assert!(coordinator.main_procedure().is_none());
        assert!(coordinator.component_drivers().is_empty());
        Ok(())
    }

    #[test]
    fn test_application_frame() -> Result<()> {
        let table = table()?;
        let components = ComponentRegistry::new().with("a.App", ComponentKind::Application);
        let callbacks = CallbackRegistry::new().with("a.App", MethodRef::new("a.App", "void onLowMemory()")?);
        let input = SynthesisInput::new(components, callbacks);

        let mut coordinator = DriverCoordinator::new(&table);
        let main = coordinator.synthesize(&input)?.clone();

        let calls: Vec<_> = main
            .instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Invoke { method, .. } => Some(method.signature().name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(calls, ["onCreate", "onLowMemory", "onTerminate"]);
        assert!(main.instructions().iter().any(|i| matches!(
            i,
            Instruction::StoreStatic { field, .. } if field == &coordinator.config().application_holder
        )));
        assert!(matches!(main.instructions().last(), Some(Instruction::Return(None))));
        assert!(coordinator.component_drivers().is_empty());
        Ok(())
    }

    #[test]
    fn test_reset_discards_previous_run() -> Result<()> {
        let table = table()?;
        let components = ComponentRegistry::new().with("a.Main", ComponentKind::Activity);
        let input = SynthesisInput::new(components, CallbackRegistry::new());

        let mut coordinator = DriverCoordinator::new(&table);
        coordinator.synthesize(&input)?;
        assert_eq!(coordinator.component_drivers().len(), 1);
        assert!(!coordinator.events().is_empty());

        coordinator.reset();
        assert!(coordinator.main_procedure().is_none());
        assert!(coordinator.component_drivers().is_empty());
        assert!(coordinator.events().is_empty());
        Ok(())
    }

    #[test]
    fn test_into_output_requires_a_run() {
        let table = ClassTable::builder().framework().build().unwrap();
        let coordinator = DriverCoordinator::new(&table);
        assert!(matches!(coordinator.into_output(), Err(Error::Synthesis { .. })));
    }
}
