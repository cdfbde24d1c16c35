//! Callback registry, fragment containment and application-callback partitions.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::model::{ClassHierarchy, ClassName, MethodRef};

/// Multimap from a component class to the callback methods discovered for it.
///
/// Callbacks of the application singleton are registered under the application class,
/// even when they are declared by separate listener classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackRegistry {
    callbacks: BTreeMap<ClassName, BTreeSet<MethodRef>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for a component. Returns false if it was already present.
    pub fn add(&mut self, owner: impl Into<ClassName>, method: MethodRef) -> bool {
        self.callbacks.entry(owner.into()).or_default().insert(method)
    }

    /// Registers a callback, builder style.
    #[must_use]
    pub fn with(mut self, owner: impl Into<ClassName>, method: MethodRef) -> Self {
        self.add(owner, method);
        self
    }

    /// Returns the callbacks of a component, if any were registered.
    #[must_use]
    pub fn get(&self, owner: &ClassName) -> Option<&BTreeSet<MethodRef>> {
        self.callbacks.get(owner)
    }

    /// Returns a copy of the callbacks of a component (empty if none).
    #[must_use]
    pub fn callbacks_of(&self, owner: &ClassName) -> BTreeSet<MethodRef> {
        self.callbacks.get(owner).cloned().unwrap_or_default()
    }

    /// Iterates over all owners and their callbacks.
    pub fn iter(&self) -> btree_map::Iter<'_, ClassName, BTreeSet<MethodRef>> {
        self.callbacks.iter()
    }

    /// Number of owners with at least one callback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Returns true if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Activities and the fragment classes each of them may host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentMap {
    hosts: BTreeMap<ClassName, BTreeSet<ClassName>>,
}

impl FragmentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `activity` may host `fragment`.
    pub fn add(&mut self, activity: impl Into<ClassName>, fragment: impl Into<ClassName>) {
        self.hosts
            .entry(activity.into())
            .or_default()
            .insert(fragment.into());
    }

    /// Builder-style [`FragmentMap::add`].
    #[must_use]
    pub fn with(mut self, activity: impl Into<ClassName>, fragment: impl Into<ClassName>) -> Self {
        self.add(activity, fragment);
        self
    }

    /// Fragments hosted by an activity.
    pub fn fragments_of(&self, activity: &ClassName) -> impl Iterator<Item = &ClassName> {
        self.hosts.get(activity).into_iter().flatten()
    }

    /// Every distinct fragment class, each exactly once, in name order.
    #[must_use]
    pub fn all_fragments(&self) -> BTreeSet<&ClassName> {
        self.hosts.values().flatten().collect()
    }

    /// Returns true if no activity hosts a fragment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.values().all(BTreeSet::is_empty)
    }
}

/// Callbacks of the application singleton split by declaring class.
///
/// `listeners` holds classes implementing the activity-lifecycle listener capability;
/// they are notified by every activity driver. `generic` holds every other class with
/// application-level callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationCallbacks {
    /// Activity-lifecycle listener classes and their callbacks
    pub listeners: BTreeMap<ClassName, BTreeSet<MethodRef>>,
    /// Remaining callback classes and their callbacks
    pub generic: BTreeMap<ClassName, BTreeSet<MethodRef>>,
}

impl ApplicationCallbacks {
    /// Partitions the given callbacks by whether their declaring class is assignable
    /// to `capability`.
    #[must_use]
    pub fn partition<'a, I>(callbacks: I, capability: &ClassName, hierarchy: &dyn ClassHierarchy) -> Self
    where
        I: IntoIterator<Item = &'a MethodRef>,
    {
        let mut result = Self::default();
        for method in callbacks {
            let class = method.class().clone();
            let bucket = if hierarchy.is_assignable_to(&class, capability) {
                &mut result.listeners
            } else {
                &mut result.generic
            };
            bucket.entry(class).or_default().insert(method.clone());
        }
        result
    }

    /// Returns true if neither partition holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.generic.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ClassTable, Result};

    #[test]
    fn test_registry_is_ordered_and_deduped() -> Result<()> {
        let mut registry = CallbackRegistry::new();
        assert!(registry.add("a.Main", MethodRef::new("a.Main", "void onClick(android.view.View)")?));
        assert!(!registry.add("a.Main", MethodRef::new("a.Main", "void onClick(android.view.View)")?));
        registry.add("a.Main", MethodRef::new("a.Main", "void b()")?);
        registry.add("a.Main", MethodRef::new("a.Main", "void a()")?);

        let names: Vec<_> = registry
            .get(&"a.Main".into())
            .unwrap()
            .iter()
            .map(|m| m.signature().name().to_string())
            .collect();
        assert_eq!(names, ["a", "b", "onClick"]);
        assert!(registry.callbacks_of(&"a.Other".into()).is_empty());
        Ok(())
    }

    #[test]
    fn test_fragment_map_shares_fragments() {
        let map = FragmentMap::new()
            .with("a.One", "a.Frag")
            .with("a.Two", "a.Frag")
            .with("a.Two", "a.Other");

        assert_eq!(map.all_fragments().len(), 2);
        assert_eq!(map.fragments_of(&"a.Two".into()).count(), 2);
        assert_eq!(map.fragments_of(&"a.None".into()).count(), 0);
    }

    #[test]
    fn test_partition() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class("a.Tracker", |c| {
                c.implements("android.app.Application$ActivityLifecycleCallbacks")
            })
            .class("a.App", |c| c.extends("android.app.Application"))
            .build()?;

        let callbacks = [
            MethodRef::new("a.Tracker", "void onActivityStarted(android.app.Activity)")?,
            MethodRef::new("a.App", "void onLowMemory()")?,
        ];
        let parts = ApplicationCallbacks::partition(
            &callbacks,
            &"android.app.Application$ActivityLifecycleCallbacks".into(),
            &table,
        );

        assert_eq!(parts.listeners.len(), 1);
        assert!(parts.listeners.contains_key("a.Tracker"));
        assert_eq!(parts.generic.len(), 1);
        assert!(parts.generic.contains_key("a.App"));
        Ok(())
    }
}
