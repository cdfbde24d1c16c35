//! Class hierarchy capability and its in-memory implementation.
//!
//! The synthesizer never walks a bytecode front-end directly. Everything it needs to
//! know about classes (subtyping, constructors, method resolution, field names) goes
//! through the [`ClassHierarchy`] trait, so any front-end can plug in. [`ClassTable`]
//! is the implementation shipped with the crate, built with a closure-based builder:
//!
//! ```rust
//! use rootsynth::model::{ClassHierarchy, ClassTable};
//!
//! let table = ClassTable::builder()
//!     .framework()
//!     .class("com.example.MainActivity", |c| {
//!         c.extends("android.app.Activity")
//!             .constructor(&[])
//!             .method("void onCreate(android.os.Bundle)")
//!     })
//!     .build()?;
//!
//! assert!(table.is_assignable_to(&"com.example.MainActivity".into(), &"android.app.Activity".into()));
//! assert!(table.constructor(&"com.example.MainActivity".into()).is_some());
//! # Ok::<(), rootsynth::Error>(())
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bitflags::bitflags;

use crate::{
    model::{
        constants::{self, SYSTEM_PACKAGES},
        ClassName, MethodFlags, MethodRef, MethodSignature,
    },
    Result,
};

bitflags! {
    /// Class modifiers relevant to instantiation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        /// Class cannot be instantiated directly
        const ABSTRACT = 0x01;
        /// Type is an interface
        const INTERFACE = 0x02;
        /// Class is referenced but its definition is unavailable
        const PHANTOM = 0x04;
    }
}

/// Read-only view of the class model consumed by the synthesizer.
///
/// Implementors provide the primitive queries; subtyping, method resolution and
/// constructor selection have default implementations built on top of them.
pub trait ClassHierarchy: Send + Sync {
    /// Returns true if the class is known to the model.
    fn contains(&self, class: &ClassName) -> bool;

    /// Returns the direct superclass, if any.
    fn superclass(&self, class: &ClassName) -> Option<ClassName>;

    /// Returns the directly implemented interfaces.
    fn interfaces(&self, class: &ClassName) -> Vec<ClassName>;

    /// Returns the modifiers of a class. Unknown classes are reported as phantom.
    fn flags(&self, class: &ClassName) -> ClassFlags;

    /// Returns the methods declared by the class itself, constructors included.
    fn declared_methods(&self, class: &ClassName) -> Vec<MethodRef>;

    /// Returns true if the class declares a field with the given name.
    fn declares_field(&self, class: &ClassName, name: &str) -> bool;

    /// Returns true if a value of type `class` can be stored in a slot of type `target`.
    ///
    /// Walks superclasses and interfaces breadth-first. Every class is assignable to
    /// itself and to `java.lang.Object`.
    fn is_assignable_to(&self, class: &ClassName, target: &ClassName) -> bool {
        if class == target || target.as_str() == constants::OBJECT_CLASS {
            return true;
        }

        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([class.clone()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if &current == target {
                return true;
            }
            if let Some(parent) = self.superclass(&current) {
                queue.push_back(parent);
            }
            queue.extend(self.interfaces(&current));
        }
        false
    }

    /// Resolves a method by subsignature, starting at `class` and walking up the
    /// superclass chain.
    fn find_method(&self, class: &ClassName, subsignature: &str) -> Option<MethodRef> {
        let wanted = MethodSignature::parse(subsignature).ok()?;
        let mut current = Some(class.clone());
        let mut depth = 0;
        while let Some(cls) = current {
            if let Some(found) = self
                .declared_methods(&cls)
                .into_iter()
                .find(|m| m.signature() == &wanted)
            {
                return Some(found);
            }
            depth += 1;
            if depth > 256 {
                // cyclic hierarchy
                return None;
            }
            current = self.superclass(&cls);
        }
        None
    }

    /// Selects the constructor used to materialize an instance of `class`.
    ///
    /// Returns `None` for abstract classes, interfaces, phantom classes and classes
    /// without a declared constructor. Among several constructors the one with the
    /// fewest parameters wins, ties broken by signature order.
    fn constructor(&self, class: &ClassName) -> Option<MethodRef> {
        let flags = self.flags(class);
        if flags.intersects(ClassFlags::ABSTRACT | ClassFlags::INTERFACE | ClassFlags::PHANTOM) {
            return None;
        }
        self.declared_methods(class)
            .into_iter()
            .filter(|m| m.signature().is_constructor() && !m.is_static())
            .min_by(|a, b| {
                a.signature()
                    .params()
                    .len()
                    .cmp(&b.signature().params().len())
                    .then_with(|| a.signature().cmp(b.signature()))
            })
    }

    /// Returns true if the class belongs to the platform or a well-known library.
    fn is_system_class(&self, class: &ClassName) -> bool {
        class.in_package(SYSTEM_PACKAGES)
    }
}

/// Definition of one class inside a [`ClassTable`].
#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    superclass: Option<ClassName>,
    interfaces: Vec<ClassName>,
    flags: ClassFlags,
    methods: Vec<(String, MethodFlags)>,
    fields: BTreeSet<String>,
}

impl ClassDef {
    /// Sets the direct superclass.
    #[must_use]
    pub fn extends(mut self, superclass: impl Into<ClassName>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Adds a directly implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<ClassName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Marks the class abstract.
    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        self.flags |= ClassFlags::ABSTRACT;
        self
    }

    /// Marks the type as an interface.
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.flags |= ClassFlags::INTERFACE | ClassFlags::ABSTRACT;
        self
    }

    /// Marks the class as phantom (referenced, definition unavailable).
    #[must_use]
    pub fn phantom(mut self) -> Self {
        self.flags |= ClassFlags::PHANTOM;
        self
    }

    /// Declares an instance method by subsignature.
    #[must_use]
    pub fn method(self, subsignature: &str) -> Self {
        self.method_with_flags(subsignature, MethodFlags::empty())
    }

    /// Declares a static method by subsignature.
    #[must_use]
    pub fn static_method(self, subsignature: &str) -> Self {
        self.method_with_flags(subsignature, MethodFlags::STATIC)
    }

    /// Declares a method with explicit modifiers.
    #[must_use]
    pub fn method_with_flags(mut self, subsignature: &str, flags: MethodFlags) -> Self {
        self.methods.push((subsignature.to_string(), flags));
        self
    }

    /// Declares a constructor taking the given parameter types.
    #[must_use]
    pub fn constructor(self, params: &[&str]) -> Self {
        let subsignature = format!("void <init>({})", params.join(","));
        self.method(&subsignature)
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        self.fields.insert(name.to_string());
        self
    }
}

#[derive(Debug, Clone)]
struct ClassEntry {
    superclass: Option<ClassName>,
    interfaces: Vec<ClassName>,
    flags: ClassFlags,
    methods: Vec<MethodRef>,
    fields: BTreeSet<String>,
}

/// In-memory class model.
///
/// Lookups of classes the table does not contain behave like an empty phantom class:
/// no superclass, no methods, not instantiable.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: BTreeMap<ClassName, ClassEntry>,
}

impl ClassTable {
    /// Starts building a new table.
    #[must_use]
    pub fn builder() -> ClassTableBuilder {
        ClassTableBuilder::default()
    }

    /// Returns the number of classes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the table holds no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates over all class names in order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassName> {
        self.classes.keys()
    }
}

impl ClassHierarchy for ClassTable {
    fn contains(&self, class: &ClassName) -> bool {
        self.classes.contains_key(class)
    }

    fn superclass(&self, class: &ClassName) -> Option<ClassName> {
        self.classes.get(class).and_then(|c| c.superclass.clone())
    }

    fn interfaces(&self, class: &ClassName) -> Vec<ClassName> {
        self.classes
            .get(class)
            .map(|c| c.interfaces.clone())
            .unwrap_or_default()
    }

    fn flags(&self, class: &ClassName) -> ClassFlags {
        self.classes
            .get(class)
            .map_or(ClassFlags::PHANTOM, |c| c.flags)
    }

    fn declared_methods(&self, class: &ClassName) -> Vec<MethodRef> {
        self.classes
            .get(class)
            .map(|c| c.methods.clone())
            .unwrap_or_default()
    }

    fn declares_field(&self, class: &ClassName, name: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|c| c.fields.contains(name))
    }
}

/// Builder for [`ClassTable`].
#[derive(Debug, Default)]
pub struct ClassTableBuilder {
    defs: Vec<(ClassName, ClassDef)>,
}

impl ClassTableBuilder {
    /// Adds a class, configured by the closure.
    ///
    /// Adding the same class twice replaces the earlier definition.
    #[must_use]
    pub fn class<F>(mut self, name: impl Into<ClassName>, f: F) -> Self
    where
        F: FnOnce(ClassDef) -> ClassDef,
    {
        self.defs.push((name.into(), f(ClassDef::default())));
        self
    }

    /// Adds the framework base classes and interfaces the synthesizer classifies
    /// components against.
    #[must_use]
    pub fn framework(self) -> Self {
        use constants::*;

        self.class(OBJECT_CLASS, |c| c.constructor(&[]))
            .class("android.content.Context", |c| c.abstract_class().extends(OBJECT_CLASS))
            .class("android.content.ContextWrapper", |c| {
                c.extends("android.content.Context").constructor(&["android.content.Context"])
            })
            .class("android.view.ContextThemeWrapper", |c| {
                c.extends("android.content.ContextWrapper").constructor(&[])
            })
            .class(ACTIVITY_CLASS, |c| {
                c.extends("android.view.ContextThemeWrapper").constructor(&[])
            })
            .class(MAP_ACTIVITY_CLASS, |c| c.extends(ACTIVITY_CLASS).abstract_class())
            .class(SERVICE_CLASS, |c| {
                c.extends("android.content.ContextWrapper").abstract_class()
            })
            .class(GCM_BASE_INTENT_SERVICE_CLASS, |c| c.extends(SERVICE_CLASS).abstract_class())
            .class(GCM_LISTENER_SERVICE_CLASS, |c| c.extends(SERVICE_CLASS).abstract_class())
            .class(APPLICATION_CLASS, |c| {
                c.extends("android.content.ContextWrapper").constructor(&[])
            })
            .class(BROADCAST_RECEIVER_CLASS, |c| c.extends(OBJECT_CLASS).abstract_class())
            .class(CONTENT_PROVIDER_CLASS, |c| c.extends(OBJECT_CLASS).abstract_class())
            .class(FRAGMENT_CLASS, |c| c.extends(OBJECT_CLASS).constructor(&[]))
            .class(SUPPORT_FRAGMENT_CLASS, |c| c.extends(OBJECT_CLASS).constructor(&[]))
            .class(ANDROIDX_FRAGMENT_CLASS, |c| c.extends(OBJECT_CLASS).constructor(&[]))
            .class(SERVICE_CONNECTION_INTERFACE, |c| c.interface())
            .class(ACTIVITY_LIFECYCLE_CALLBACKS_INTERFACE, |c| c.interface())
            .class(INTENT_CLASS, |c| c.extends(OBJECT_CLASS).constructor(&[]))
            .class("android.os.Bundle", |c| c.extends(OBJECT_CLASS).constructor(&[]))
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidSignature`] if any declared method subsignature
    /// cannot be parsed.
    pub fn build(self) -> Result<ClassTable> {
        let mut classes = BTreeMap::new();
        for (name, def) in self.defs {
            let methods = def
                .methods
                .iter()
                .map(|(sig, flags)| {
                    MethodRef::new(name.clone(), sig).map(|m| m.with_flags(*flags))
                })
                .collect::<Result<Vec<_>>>()?;

            classes.insert(
                name,
                ClassEntry {
                    superclass: def.superclass,
                    interfaces: def.interfaces,
                    flags: def.flags,
                    methods,
                    fields: def.fields,
                },
            );
        }
        Ok(ClassTable { classes })
    }
}
