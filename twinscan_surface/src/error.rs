//! Error types for the Twinscan surface runtime
//!
//! This module defines the error taxonomy shared by the core and every
//! presentation backend: dimension validation, GPU memory allocation,
//! context creation, presentation interruption and fatal termination.

use std::fmt;

/// Result type for Twinscan surface operations
pub type Result<T> = std::result::Result<T, Error>;

/// Twinscan surface errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Zero or negative surface request (rejected before any allocation)
    InvalidDimensions {
        width: i64,
        height: i64,
    },

    /// A heap, texture or renderbuffer allocation was refused
    AllocationError(String),

    /// The native device went away
    DeviceLost(String),

    /// Native context or extension initialization failed (desktop)
    ContextCreationError(String),

    /// The host OS took the foreground away mid-session (console)
    ///
    /// Recovered internally by the presentation state machine; only
    /// surfaces to callers through logs.
    PresentationInterrupted,

    /// Unrecoverable teardown: the application loop must end the process
    FatalTermination(String),

    /// Backend-specific error
    BackendError(String),
}

impl Error {
    /// Whether the application loop must end the process after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FatalTermination(_) | Error::DeviceLost(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {}x{}", width, height)
            }
            Error::AllocationError(msg) => write!(f, "Allocation error: {}", msg),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
            Error::ContextCreationError(msg) => write!(f, "Context creation error: {}", msg),
            Error::PresentationInterrupted => write!(f, "Presentation interrupted"),
            Error::FatalTermination(msg) => write!(f, "Fatal termination: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build the given error value
///
/// # Example
///
/// ```no_run
/// # use twinscan_surface::surface_err;
/// # use twinscan_surface::twinscan::Error;
/// let err = surface_err!("twinscan::console", Error::AllocationError("MEM1 exhausted".into()));
/// ```
#[macro_export]
macro_rules! surface_err {
    ($source:expr, $error:expr) => {{
        let error = $error;
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!("{}", error),
            file!(),
            line!(),
        );
        error
    }};
}

/// Log an ERROR message and return the given error from the current function
#[macro_export]
macro_rules! surface_bail {
    ($source:expr, $error:expr) => {
        return Err($crate::surface_err!($source, $error))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
