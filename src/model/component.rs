//! Components, their roles and the component registry.

use std::fmt;

use strum::{AsRefStr, Display, EnumCount, EnumIter};

use crate::model::{constants, ClassHierarchy, ClassName};

/// Upstream classification of a discovered class.
///
/// This is finer grained than [`ComponentRole`]: the two push-messaging service
/// variants keep their identity so that the service driver can call their messaging
/// methods, and fragments or plain classes are classified even though they have no
/// role of their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, Display, AsRefStr,
)]
pub enum ComponentKind {
    /// Subclass of `android.app.Activity`
    Activity,
    /// Subclass of `android.app.Service`
    Service,
    /// Legacy cloud-messaging intent service
    GcmBaseIntentService,
    /// Cloud-messaging listener service
    GcmListenerService,
    /// Subclass of `android.content.BroadcastReceiver`
    BroadcastReceiver,
    /// Subclass of `android.content.ContentProvider`
    ContentProvider,
    /// Implementation of `android.content.ServiceConnection`
    ServiceConnection,
    /// Subclass of `android.app.Application`
    Application,
    /// Fragment hosted by an activity
    Fragment,
    /// Anything else
    Plain,
}

/// Lifecycle state machine that applies to a component.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, Display, AsRefStr,
)]
pub enum ComponentRole {
    /// Create, start, resume, pause, stop, restart, destroy
    Activity,
    /// Create, start, bind, unbind, destroy
    Service,
    /// Single-shot receive
    BroadcastReceiver,
    /// Create, then data operations
    ContentProvider,
    /// Connected, disconnected
    ServiceConnection,
    /// The application singleton
    Application,
}

impl ComponentKind {
    /// Returns the normalized role, or `None` for fragments and plain classes.
    #[must_use]
    pub fn role(self) -> Option<ComponentRole> {
        match self {
            Self::Activity => Some(ComponentRole::Activity),
            Self::Service | Self::GcmBaseIntentService | Self::GcmListenerService => {
                Some(ComponentRole::Service)
            }
            Self::BroadcastReceiver => Some(ComponentRole::BroadcastReceiver),
            Self::ContentProvider => Some(ComponentRole::ContentProvider),
            Self::ServiceConnection => Some(ComponentRole::ServiceConnection),
            Self::Application => Some(ComponentRole::Application),
            Self::Fragment | Self::Plain => None,
        }
    }

    /// Returns the lifecycle subsignatures a driver for this kind places itself.
    #[must_use]
    pub fn lifecycle_methods(self) -> &'static [&'static str] {
        match self {
            Self::Activity => constants::ACTIVITY_LIFECYCLE_METHODS,
            Self::Service => constants::SERVICE_LIFECYCLE_METHODS,
            Self::GcmBaseIntentService => constants::GCM_INTENT_SERVICE_METHODS,
            Self::GcmListenerService => constants::GCM_LISTENER_SERVICE_METHODS,
            Self::BroadcastReceiver => constants::BROADCAST_LIFECYCLE_METHODS,
            Self::ContentProvider => constants::CONTENTPROVIDER_LIFECYCLE_METHODS,
            Self::ServiceConnection => constants::SERVICECONNECTION_LIFECYCLE_METHODS,
            Self::Application => constants::APPLICATION_LIFECYCLE_METHODS,
            Self::Fragment => constants::FRAGMENT_LIFECYCLE_METHODS,
            Self::Plain => &[],
        }
    }

    /// Classifies a class against the framework base types.
    ///
    /// Specialized types are checked before the generic ones they derive from, so a
    /// cloud-messaging service is never reported as a plain service.
    #[must_use]
    pub fn classify(class: &ClassName, hierarchy: &dyn ClassHierarchy) -> Self {
        use constants::*;

        let is = |base: &str| hierarchy.is_assignable_to(class, &ClassName::new(base));

        if is(FRAGMENT_CLASS) || is(SUPPORT_FRAGMENT_CLASS) || is(ANDROIDX_FRAGMENT_CLASS) {
            Self::Fragment
        } else if is(GCM_BASE_INTENT_SERVICE_CLASS) {
            Self::GcmBaseIntentService
        } else if is(GCM_LISTENER_SERVICE_CLASS) {
            Self::GcmListenerService
        } else if is(SERVICE_CONNECTION_INTERFACE) {
            Self::ServiceConnection
        } else if is(MAP_ACTIVITY_CLASS) || is(ACTIVITY_CLASS) {
            Self::Activity
        } else if is(APPLICATION_CLASS) {
            Self::Application
        } else if is(SERVICE_CLASS) {
            Self::Service
        } else if is(BROADCAST_RECEIVER_CLASS) {
            Self::BroadcastReceiver
        } else if is(CONTENT_PROVIDER_CLASS) {
            Self::ContentProvider
        } else {
            Self::Plain
        }
    }
}

/// A discovered class together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component {
    class: ClassName,
    kind: ComponentKind,
}

impl Component {
    /// Creates a component descriptor.
    #[must_use]
    pub fn new(class: impl Into<ClassName>, kind: ComponentKind) -> Self {
        Self {
            class: class.into(),
            kind,
        }
    }

    /// The component class.
    #[must_use]
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// The upstream classification.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The normalized role, if the kind has one.
    #[must_use]
    pub fn role(&self) -> Option<ComponentRole> {
        self.kind.role()
    }

    /// Returns true if this is the application singleton.
    #[must_use]
    pub fn is_application(&self) -> bool {
        self.kind == ComponentKind::Application
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.class, self.kind)
    }
}

/// Ordered, de-duplicated set of discovered components.
///
/// Insertion order is the order in which the synthesizer visits components, so two
/// registries built the same way always yield the same root procedure.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<Component>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies each class against the hierarchy and registers it.
    #[must_use]
    pub fn from_classes<I, C>(classes: I, hierarchy: &dyn ClassHierarchy) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ClassName>,
    {
        let mut registry = Self::new();
        for class in classes {
            let class = class.into();
            let kind = ComponentKind::classify(&class, hierarchy);
            registry.add(Component::new(class, kind));
        }
        registry
    }

    /// Registers a component.
    ///
    /// Returns false and keeps the first registration if the class is already present.
    pub fn add(&mut self, component: Component) -> bool {
        if self.contains(component.class()) {
            return false;
        }
        self.components.push(component);
        true
    }

    /// Registers a class with an explicit classification.
    #[must_use]
    pub fn with(mut self, class: impl Into<ClassName>, kind: ComponentKind) -> Self {
        self.add(Component::new(class, kind));
        self
    }

    /// Returns true if the class is registered.
    #[must_use]
    pub fn contains(&self, class: &ClassName) -> bool {
        self.components.iter().any(|c| c.class() == class)
    }

    /// Looks up the component of a class.
    #[must_use]
    pub fn get(&self, class: &ClassName) -> Option<&Component> {
        self.components.iter().find(|c| c.class() == class)
    }

    /// Iterates over components in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Iterates over the components with the given role.
    pub fn with_role(&self, role: ComponentRole) -> impl Iterator<Item = &Component> {
        self.components
            .iter()
            .filter(move |c| c.role() == Some(role))
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<'a> IntoIterator for &'a ComponentRegistry {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl FromIterator<Component> for ComponentRegistry {
    fn from_iter<T: IntoIterator<Item = Component>>(iter: T) -> Self {
        let mut registry = Self::new();
        for component in iter {
            registry.add(component);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{model::ClassTable, Result};

    #[test]
    fn test_push_messaging_services_normalize_to_service() {
        assert_eq!(ComponentKind::GcmBaseIntentService.role(), Some(ComponentRole::Service));
        assert_eq!(ComponentKind::GcmListenerService.role(), Some(ComponentRole::Service));
        assert_eq!(ComponentKind::Fragment.role(), None);
        assert_eq!(ComponentKind::Plain.role(), None);
    }

    #[test]
    fn test_every_role_is_reachable_from_a_kind() {
        for role in ComponentRole::iter() {
            assert!(
                ComponentKind::iter().any(|k| k.role() == Some(role)),
                "no kind maps to {role}"
            );
        }
        assert_eq!(ComponentRole::COUNT, 6);
    }

    #[test]
    fn test_classify() -> Result<()> {
        let table = ClassTable::builder()
            .framework()
            .class("a.Main", |c| c.extends("a.BaseActivity"))
            .class("a.BaseActivity", |c| c.extends("android.app.Activity"))
            .class("a.Push", |c| c.extends("com.google.android.gms.gcm.GcmListenerService"))
            .class("a.Sync", |c| c.extends("android.app.Service"))
            .class("a.Conn", |c| c.implements("android.content.ServiceConnection"))
            .class("a.App", |c| c.extends("android.app.Application"))
            .class("a.Frag", |c| c.extends("androidx.fragment.app.Fragment"))
            .class("a.Helper", |c| c)
            .build()?;

        let kind = |name: &str| ComponentKind::classify(&name.into(), &table);
        assert_eq!(kind("a.Main"), ComponentKind::Activity);
        assert_eq!(kind("a.Push"), ComponentKind::GcmListenerService);
        assert_eq!(kind("a.Sync"), ComponentKind::Service);
        assert_eq!(kind("a.Conn"), ComponentKind::ServiceConnection);
        assert_eq!(kind("a.App"), ComponentKind::Application);
        assert_eq!(kind("a.Frag"), ComponentKind::Fragment);
        assert_eq!(kind("a.Helper"), ComponentKind::Plain);
        Ok(())
    }

    #[test]
    fn test_registry_dedupes_and_keeps_order() {
        let mut registry = ComponentRegistry::new()
            .with("a.B", ComponentKind::Service)
            .with("a.A", ComponentKind::Activity);
        assert!(!registry.add(Component::new("a.B", ComponentKind::Activity)));

        let order: Vec<_> = registry.iter().map(|c| c.class().as_str()).collect();
        assert_eq!(order, ["a.B", "a.A"]);
        assert_eq!(registry.get(&"a.B".into()).unwrap().kind(), ComponentKind::Service);
    }

    #[test]
    fn test_with_role() {
        let registry = ComponentRegistry::new()
            .with("a.P1", ComponentKind::ContentProvider)
            .with("a.A", ComponentKind::Activity)
            .with("a.P2", ComponentKind::ContentProvider);
        assert_eq!(registry.with_role(ComponentRole::ContentProvider).count(), 2);
    }
}
