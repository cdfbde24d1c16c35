use thiserror::Error;

use crate::{ir::Defect, model::ClassName};

macro_rules! synthesis_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Synthesis {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Synthesis {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only conditions that make the synthesized entry point unusable are errors. A component
/// or listener class that cannot be instantiated is *not* an error: it is logged, recorded
/// in the [`crate::events::EventLog`] and left out of the driver.
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::MultipleApplications`] - The registry holds more than one application singleton
/// - [`Error::InvalidSignature`] - A method subsignature could not be parsed
///
/// ## Internal Consistency Errors
/// - [`Error::Validation`] - The validator rejected a synthesized procedure
/// - [`Error::Synthesis`] - An invariant of the synthesis algorithm was broken
///
/// # Examples
///
/// ```rust
/// use rootsynth::{Error, model::ClassName};
///
/// let err = Error::MultipleApplications {
///     first: ClassName::new("com.example.App"),
///     second: ClassName::new("com.example.OtherApp"),
/// };
/// assert!(err.to_string().contains("com.example.OtherApp"));
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// More than one component with the application role was discovered.
    ///
    /// The framework instantiates exactly one application object per process, so the
    /// upstream registry is inconsistent. Synthesis aborts without producing a procedure.
    #[error("Multiple application classes in app - {first} and {second}")]
    MultipleApplications {
        /// The application component encountered first in registry order
        first: ClassName,
        /// The conflicting application component
        second: ClassName,
    },

    /// A method subsignature did not have the `ret name(params)` shape.
    #[error("Invalid method subsignature - {0}")]
    InvalidSignature(String),

    /// The structural validator found defects in a synthesized procedure.
    ///
    /// This is an internal-consistency failure of the synthesis itself; a malformed
    /// root procedure would make any downstream analysis silently unsound.
    #[error("Procedure {procedure} failed validation with {} defect(s): {}", .defects.len(), .defects.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation {
        /// Name of the rejected procedure
        procedure: String,
        /// Every defect the validator reported
        defects: Vec<Defect>,
    },

    /// An invariant of the synthesis algorithm was violated.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the broken invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Synthesis - {file}:{line}: {message}")]
    Synthesis {
        /// The message to be printed for the Synthesis error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_error_macro() {
        let err = synthesis_error!("label {} placed twice", 3);
        match err {
            Error::Synthesis { message, file, .. } => {
                assert_eq!(message, "label 3 placed twice");
                assert!(file.ends_with("error.rs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_display_lists_defects() {
        let err = Error::Validation {
            procedure: "dummyMainMethod".to_string(),
            defects: vec![Defect::MissingReturn],
        };
        let text = err.to_string();
        assert!(text.contains("dummyMainMethod"));
        assert!(text.contains("1 defect"));
    }
}
