//! Class-level fields allocated during synthesis.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ir::FieldRef,
    model::{ClassHierarchy, ClassName},
};

/// Static fields allocated on the synthetic class, at most one per stored class.
///
/// A field is named after the simple name of the class it stores. When that name is
/// taken (by an earlier allocation or by a field the class model already declares on
/// the owner) a counter suffix is appended: `Tracker`, `Tracker_0`, `Tracker_1`, ...
/// The counter makes naming depend only on allocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPool {
    owner: ClassName,
    by_class: BTreeMap<ClassName, FieldRef>,
    order: Vec<ClassName>,
    names: BTreeSet<String>,
}

impl FieldPool {
    /// Creates an empty pool allocating fields on `owner`.
    #[must_use]
    pub fn new(owner: impl Into<ClassName>) -> Self {
        Self {
            owner: owner.into(),
            by_class: BTreeMap::new(),
            order: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    /// The class that receives the fields.
    #[must_use]
    pub fn owner(&self) -> &ClassName {
        &self.owner
    }

    /// Returns the field for `class`, allocating it on first use.
    ///
    /// The boolean is true if the field was newly allocated.
    pub fn declare(&mut self, class: &ClassName, hierarchy: &dyn ClassHierarchy) -> (FieldRef, bool) {
        if let Some(existing) = self.by_class.get(class) {
            return (existing.clone(), false);
        }

        let base = class.simple_name().to_string();
        let mut name = base.clone();
        let mut idx = 0usize;
        while self.names.contains(&name) || hierarchy.declares_field(&self.owner, &name) {
            name = format!("{base}_{idx}");
            idx += 1;
        }

        let field = FieldRef::new(self.owner.clone(), name.clone(), class.clone());
        self.names.insert(name);
        self.by_class.insert(class.clone(), field.clone());
        self.order.push(class.clone());
        (field, true)
    }

    /// The field allocated for `class`, if any.
    #[must_use]
    pub fn get(&self, class: &ClassName) -> Option<&FieldRef> {
        self.by_class.get(class)
    }

    /// All fields in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRef> {
        self.order.iter().filter_map(|class| self.by_class.get(class))
    }

    /// Mapping from stored class to field.
    #[must_use]
    pub fn by_class(&self) -> &BTreeMap<ClassName, FieldRef> {
        &self.by_class
    }

    /// Number of allocated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_class.len()
    }

    /// Returns true if nothing was allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Drops every allocated field.
    pub fn clear(&mut self) {
        self.by_class.clear();
        self.order.clear();
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ClassTable, Result};

    #[test]
    fn test_declare_reuses_per_class() -> Result<()> {
        let table = ClassTable::builder().build()?;
        let mut pool = FieldPool::new("dummyMainClass");

        let (first, fresh) = pool.declare(&"a.Tracker".into(), &table);
        assert!(fresh);
        assert_eq!(first.name(), "Tracker");

        let (again, fresh) = pool.declare(&"a.Tracker".into(), &table);
        assert!(!fresh);
        assert_eq!(again, first);
        assert_eq!(pool.len(), 1);
        Ok(())
    }

    #[test]
    fn test_collisions_get_counter_suffix() -> Result<()> {
        let table = ClassTable::builder()
            .class("dummyMainClass", |c| c.field("Tracker"))
            .build()?;
        let mut pool = FieldPool::new("dummyMainClass");

        let (a, _) = pool.declare(&"a.Tracker".into(), &table);
        let (b, _) = pool.declare(&"b.Tracker".into(), &table);
        let (c, _) = pool.declare(&"c.Tracker".into(), &table);
        assert_eq!(a.name(), "Tracker_0");
        assert_eq!(b.name(), "Tracker_1");
        assert_eq!(c.name(), "Tracker_2");

        let names: Vec<_> = pool.iter().map(FieldRef::name).collect();
        assert_eq!(names, ["Tracker_0", "Tracker_1", "Tracker_2"]);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let table = ClassTable::builder().build()?;
        let mut pool = FieldPool::new("dummyMainClass");
        pool.declare(&"a.Tracker".into(), &table);
        pool.clear();
        assert!(pool.is_empty());

        let (field, fresh) = pool.declare(&"a.Tracker".into(), &table);
        assert!(fresh);
        assert_eq!(field.name(), "Tracker");
        Ok(())
    }
}
