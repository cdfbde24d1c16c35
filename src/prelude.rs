//! # rootsynth Prelude
//!
//! The types needed to describe an application and synthesize its entry point.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all rootsynth operations
pub use crate::Error;

/// The result type used throughout rootsynth
pub use crate::Result;

// ================================================================================================
// Input Model
// ================================================================================================

/// Names and method references
pub use crate::model::{ClassName, MethodRef, MethodSignature};

/// Components and their registries
pub use crate::model::{
    ApplicationCallbacks, CallbackRegistry, Component, ComponentKind, ComponentRegistry, FragmentMap,
};

/// Class hierarchy queries and the in-memory implementation
pub use crate::model::{ClassHierarchy, ClassTable};

// ================================================================================================
// Synthesis
// ================================================================================================

/// The coordinator and its configuration
pub use crate::synth::{
    synthesize_batch, ComponentDriverMap, DriverCoordinator, SynthesisConfig, SynthesisInput,
    SynthesisOutput, DEFAULT_DUMMY_CLASS, DEFAULT_DUMMY_METHOD,
};

/// Cleanup configuration
pub use crate::cleanup::{CleanupConfig, CleanupPipeline};

// ================================================================================================
// Intermediate Representation
// ================================================================================================

/// Synthesized procedures and their instructions
pub use crate::ir::{BranchKind, Instruction, Procedure, ProcedureValidator};

/// Event recording
pub use crate::events::{EventKind, EventLog};
