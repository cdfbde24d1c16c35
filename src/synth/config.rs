//! Synthesis configuration.

use crate::{
    cleanup::CleanupConfig,
    ir::FieldRef,
    model::{constants, ClassName},
};

/// Default name of the class receiving the synthesized procedures and fields.
pub const DEFAULT_DUMMY_CLASS: &str = "dummyMainClass";

/// Default name of the root procedure. Component drivers append the mangled
/// component class name to it.
pub const DEFAULT_DUMMY_METHOD: &str = "dummyMainMethod";

/// Configuration for a [`crate::synth::DriverCoordinator`].
///
/// # Example
///
/// ```rust
/// use rootsynth::synth::SynthesisConfig;
///
/// let config = SynthesisConfig::default()
///     .with_dummy_class("com.example.Entry")
///     .with_validation(true);
/// assert_eq!(config.dummy_class.as_str(), "com.example.Entry");
/// assert!(config.validate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Class owning the root procedure, the component drivers and the listener fields
    pub dummy_class: ClassName,
    /// Name of the root procedure
    pub dummy_method: String,
    /// Run the structural validator over every synthesized procedure
    pub validate: bool,
    /// Cleanup passes run after synthesis
    pub cleanup: CleanupConfig,
    /// Externally visible field receiving the application instance
    pub application_holder: FieldRef,
    /// Listener capability whose implementors are notified of every activity
    /// lifecycle transition
    pub lifecycle_listener_capability: ClassName,
    /// Emit the call from the root procedure into each component driver
    pub emit_component_calls: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            dummy_class: ClassName::new(DEFAULT_DUMMY_CLASS),
            dummy_method: DEFAULT_DUMMY_METHOD.to_string(),
            validate: false,
            cleanup: CleanupConfig::default(),
            application_holder: FieldRef::new(
                constants::APPLICATION_HOLDER_CLASS,
                constants::APPLICATION_HOLDER_FIELD,
                constants::APPLICATION_CLASS,
            ),
            lifecycle_listener_capability: ClassName::new(
                constants::ACTIVITY_LIFECYCLE_CALLBACKS_INTERFACE,
            ),
            emit_component_calls: true,
        }
    }
}

impl SynthesisConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the class owning the synthesized code.
    #[must_use]
    pub fn with_dummy_class(mut self, class: impl Into<ClassName>) -> Self {
        self.dummy_class = class.into();
        self
    }

    /// Sets the name of the root procedure.
    #[must_use]
    pub fn with_dummy_method(mut self, name: impl Into<String>) -> Self {
        self.dummy_method = name.into();
        self
    }

    /// Enables or disables validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Replaces the cleanup configuration.
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: CleanupConfig) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Replaces the application sink field.
    #[must_use]
    pub fn with_application_holder(mut self, field: FieldRef) -> Self {
        self.application_holder = field;
        self
    }

    /// Replaces the activity-lifecycle listener capability.
    #[must_use]
    pub fn with_lifecycle_listener_capability(mut self, capability: impl Into<ClassName>) -> Self {
        self.lifecycle_listener_capability = capability.into();
        self
    }

    /// Controls whether the root procedure calls the component drivers.
    ///
    /// With calls disabled the drivers are still generated and recorded, so a
    /// downstream call graph can wire them up itself.
    #[must_use]
    pub fn with_component_calls(mut self, emit: bool) -> Self {
        self.emit_component_calls = emit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynthesisConfig::default();
        assert_eq!(config.dummy_class.as_str(), "dummyMainClass");
        assert_eq!(config.dummy_method, "dummyMainMethod");
        assert!(!config.validate);
        assert!(config.emit_component_calls);
        assert_eq!(
            config.application_holder.to_string(),
            "<il.ac.tau.MyApplicationHolder: android.app.Application application>"
        );
    }

    #[test]
    fn test_builders() {
        let config = SynthesisConfig::new()
            .with_dummy_method("entry")
            .with_cleanup(CleanupConfig::disabled())
            .with_component_calls(false);
        assert_eq!(config.dummy_method, "entry");
        assert!(!config.cleanup.any_enabled());
        assert!(!config.emit_component_calls);
    }
}
