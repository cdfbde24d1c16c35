//! Input model of the synthesizer.
//!
//! Everything in here is produced upstream (by a manifest parser, a callback
//! analysis, a bytecode front-end) and is read-only during synthesis:
//!
//! - [`ClassName`], [`MethodSignature`] and [`MethodRef`] identify classes and methods
//! - [`Component`] and [`ComponentRegistry`] list the discovered components in visiting order
//! - [`CallbackRegistry`] and [`FragmentMap`] attach callbacks and hosted fragments
//! - [`ClassHierarchy`] answers subtyping and resolution queries, [`ClassTable`] implements it in memory
//! - [`constants`] names the framework classes and lifecycle subsignatures

mod callbacks;
mod component;
pub mod constants;
mod hierarchy;
mod names;

pub use callbacks::{ApplicationCallbacks, CallbackRegistry, FragmentMap};
pub use component::{Component, ComponentKind, ComponentRegistry, ComponentRole};
pub use hierarchy::{ClassDef, ClassFlags, ClassHierarchy, ClassTable, ClassTableBuilder};
pub use names::{is_array_type, is_primitive_type, ClassName, MethodFlags, MethodRef, MethodSignature};
