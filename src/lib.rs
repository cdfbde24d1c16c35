// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # rootsynth
//!
//! Synthesis of a single entry point for component-based applications whose runtime
//! calls into application code through lifecycle methods and registered callbacks.
//!
//! Static analyses need one procedure to start from. `rootsynth` builds it: a root
//! procedure that, for every discovered component, enters a per-component driver
//! procedure modelling the component's lifecycle, interleaved with the application
//! singleton's lifecycle and callbacks. Non-deterministic branches stand in for every
//! decision the framework takes, so the synthesized code over-approximates all
//! orders in which the framework may call the application.
//!
//! ## Quick Start
//!
//! ```rust
//! use rootsynth::prelude::*;
//!
//! let table = ClassTable::builder()
//!     .framework()
//!     .class("com.example.App", |c| {
//!         c.extends("android.app.Application")
//!             .constructor(&[])
//!             .method("void onCreate()")
//!     })
//!     .class("com.example.Main", |c| {
//!         c.extends("android.app.Activity")
//!             .constructor(&[])
//!             .method("void onCreate(android.os.Bundle)")
//!             .method("void onClick(android.view.View)")
//!     })
//!     .build()?;
//!
//! let components = ComponentRegistry::new()
//!     .with("com.example.App", ComponentKind::Application)
//!     .with("com.example.Main", ComponentKind::Activity);
//! let callbacks = CallbackRegistry::new().with(
//!     "com.example.Main",
//!     MethodRef::new("com.example.Main", "void onClick(android.view.View)")?,
//! );
//!
//! let mut coordinator = DriverCoordinator::new(&table);
//! let root = coordinator.synthesize(&SynthesisInput::new(components, callbacks))?;
//! println!("{root}");
//!
//! for (component, driver) in coordinator.component_drivers() {
//!     println!("{component}: {} instructions", driver.len());
//! }
//! # Ok::<(), rootsynth::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - Components, callbacks, fragments and the class hierarchy the synthesizer reads
//! - [`ir`] - The label-based IR the drivers are expressed in, with builder and validator
//! - [`roles`] - Per-role lifecycle drivers (activities, fragments, services, ...)
//! - [`synth`] - The coordinator emitting the root procedure, and batch synthesis
//! - [`cleanup`] - Passes removing degenerate branches and markers after synthesis
//! - [`events`] - Record of every decision taken during a run
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Only conditions that make the result unusable are errors. A class without a usable
//! constructor, a lifecycle method that does not resolve or a callback without a
//! receiver is logged through the `log` facade and recorded in the run's
//! [`events::EventLog`], and synthesis carries on:
//!
//! ```rust
//! use rootsynth::{prelude::*, Error};
//!
//! let table = ClassTable::builder()
//!     .framework()
//!     .class("a.App", |c| c.extends("android.app.Application").constructor(&[]))
//!     .class("b.App", |c| c.extends("android.app.Application").constructor(&[]))
//!     .build()?;
//! let components = ComponentRegistry::new()
//!     .with("a.App", ComponentKind::Application)
//!     .with("b.App", ComponentKind::Application);
//!
//! let mut coordinator = DriverCoordinator::new(&table);
//! match coordinator.synthesize(&SynthesisInput::new(components, CallbackRegistry::new())) {
//!     Err(Error::MultipleApplications { first, second }) => {
//!         println!("{first} and {second} both claim the application role")
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), rootsynth::Error>(())
//! ```
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use rootsynth::prelude::*;
///
/// let table = ClassTable::builder().framework().build()?;
/// let coordinator = DriverCoordinator::new(&table);
/// assert_eq!(coordinator.config().dummy_method, DEFAULT_DUMMY_METHOD);
/// # Ok::<(), rootsynth::Error>(())
/// ```
pub mod prelude;

/// Cleanup passes run over every synthesized procedure.
pub mod cleanup;

/// Recording of synthesis decisions.
pub mod events;

/// The intermediate representation of synthesized procedures.
///
/// # Key Types
///
/// - [`ir::Procedure`] - One synthesized procedure
/// - [`ir::ProcedureBuilder`] - Emission primitives used by the coordinator and role drivers
/// - [`ir::ProcedureValidator`] - Structural well-formedness checks
pub mod ir;

/// The read-only input model: components, callbacks and the class hierarchy.
pub mod model;

/// Lifecycle drivers for each component role.
pub mod roles;

/// Root procedure synthesis.
pub mod synth;

/// `rootsynth` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use rootsynth::{Result, model::MethodSignature};
///
/// fn parse(subsignature: &str) -> Result<MethodSignature> {
///     MethodSignature::parse(subsignature)
/// }
///
/// assert!(parse("void onCreate(android.os.Bundle)").is_ok());
/// assert!(parse("onCreate").is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `rootsynth` Error type
///
/// See [`Error`] for the full list of variants.
pub use error::Error;
