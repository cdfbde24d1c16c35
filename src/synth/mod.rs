//! Root procedure synthesis.
//!
//! [`DriverCoordinator`] turns the discovered components and callbacks into one root
//! procedure that over-approximates every order in which the framework may enter the
//! application, plus one driver procedure per component.
//!
//! # Example
//!
//! ```rust
//! use rootsynth::{
//!     model::{CallbackRegistry, ClassTable, ComponentKind, ComponentRegistry},
//!     synth::{DriverCoordinator, SynthesisInput},
//! };
//!
//! let table = ClassTable::builder()
//!     .framework()
//!     .class("com.example.Main", |c| {
//!         c.extends("android.app.Activity").constructor(&[])
//!     })
//!     .build()?;
//! let components = ComponentRegistry::new().with("com.example.Main", ComponentKind::Activity);
//! let input = SynthesisInput::new(components, CallbackRegistry::new());
//!
//! let mut coordinator = DriverCoordinator::new(&table);
//! let root = coordinator.synthesize(&input)?;
//! assert_eq!(root.name(), "dummyMainMethod");
//! assert_eq!(coordinator.component_drivers().len(), 1);
//! # Ok::<(), rootsynth::Error>(())
//! ```

mod batch;
mod config;
mod coordinator;

pub use batch::synthesize_batch;
pub use config::{SynthesisConfig, DEFAULT_DUMMY_CLASS, DEFAULT_DUMMY_METHOD};
pub use coordinator::DriverCoordinator;

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::{
    events::{DerivedStats, EventLog},
    ir::{FieldPool, Procedure},
    model::{ApplicationCallbacks, CallbackRegistry, ClassName, Component, ComponentRegistry, FragmentMap},
};

/// Everything the coordinator consumes in one run.
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput {
    /// Discovered components, in visiting order
    pub components: ComponentRegistry,
    /// Callbacks per component; application callbacks live under the application class
    pub callbacks: CallbackRegistry,
    /// Fragments hosted by each activity
    pub fragments: FragmentMap,
    /// Precomputed split of the application callbacks. Computed from `callbacks`
    /// when absent.
    pub application_callbacks: Option<ApplicationCallbacks>,
}

impl SynthesisInput {
    /// Creates an input without fragments or precomputed application partitions.
    #[must_use]
    pub fn new(components: ComponentRegistry, callbacks: CallbackRegistry) -> Self {
        Self {
            components,
            callbacks,
            fragments: FragmentMap::default(),
            application_callbacks: None,
        }
    }

    /// Adds the fragment containment map.
    #[must_use]
    pub fn with_fragments(mut self, fragments: FragmentMap) -> Self {
        self.fragments = fragments;
        self
    }

    /// Supplies a precomputed application-callback partition.
    #[must_use]
    pub fn with_application_callbacks(mut self, partition: ApplicationCallbacks) -> Self {
        self.application_callbacks = Some(partition);
        self
    }
}

/// Component driver procedures, keyed by component.
///
/// Driver names are unique within a map: a procedure whose name is already taken is
/// renamed with a counter suffix on insertion (`..._A`, `..._A_0`, `..._A_1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDriverMap {
    drivers: BTreeMap<Component, Procedure>,
    names: BTreeSet<String>,
}

impl ComponentDriverMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the driver of a component, replacing any earlier one.
    ///
    /// Returns the replaced driver. If another component's driver already uses the
    /// procedure name, the new driver is renamed first; see [`ComponentDriverMap::name_of`].
    pub fn insert(&mut self, component: Component, mut procedure: Procedure) -> Option<Procedure> {
        if let Some(previous) = self.drivers.get(&component) {
            self.names.remove(previous.name());
        }

        let base = procedure.name().to_string();
        let mut name = base.clone();
        let mut idx = 0usize;
        while self.names.contains(&name) {
            name = format!("{base}_{idx}");
            idx += 1;
        }
        if name != base {
            log::debug!("driver name {} is taken, using {}", base, name);
            procedure.rename(name.clone());
        }

        self.names.insert(name);
        self.drivers.insert(component, procedure)
    }

    /// The procedure name of the component's driver.
    #[must_use]
    pub fn name_of(&self, component: &Component) -> Option<&str> {
        self.drivers.get(component).map(Procedure::name)
    }

    /// The driver of a component.
    #[must_use]
    pub fn get(&self, component: &Component) -> Option<&Procedure> {
        self.drivers.get(component)
    }

    /// The driver of the component with the given class, whatever its kind.
    #[must_use]
    pub fn get_by_class(&self, class: &ClassName) -> Option<&Procedure> {
        self.drivers
            .iter()
            .find(|(component, _)| component.class() == class)
            .map(|(_, procedure)| procedure)
    }

    /// Returns true if the component has a driver.
    #[must_use]
    pub fn contains(&self, component: &Component) -> bool {
        self.drivers.contains_key(component)
    }

    /// Number of drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Returns true if no driver was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Iterates over components and their drivers in component order.
    pub fn iter(&self) -> btree_map::Iter<'_, Component, Procedure> {
        self.drivers.iter()
    }

    /// Mutable access to every driver procedure.
    pub(crate) fn procedures_mut(&mut self) -> btree_map::ValuesMut<'_, Component, Procedure> {
        self.drivers.values_mut()
    }

    /// Drops every driver.
    pub fn clear(&mut self) {
        self.drivers.clear();
        self.names.clear();
    }
}

impl<'a> IntoIterator for &'a ComponentDriverMap {
    type Item = (&'a Component, &'a Procedure);
    type IntoIter = btree_map::Iter<'a, Component, Procedure>;

    fn into_iter(self) -> Self::IntoIter {
        self.drivers.iter()
    }
}

/// The owned result of one synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// The root procedure
    pub main: Procedure,
    /// Driver procedure per component
    pub drivers: ComponentDriverMap,
    /// Fields allocated on the dummy class
    pub fields: FieldPool,
    /// Every decision taken during the run
    pub events: EventLog,
}

impl SynthesisOutput {
    /// Statistics of the run.
    #[must_use]
    pub fn stats(&self) -> DerivedStats {
        DerivedStats::from_log(&self.events)
    }
}
