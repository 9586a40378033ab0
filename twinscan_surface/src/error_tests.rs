//! Unit tests for error.rs
//!
//! Tests Error variants, Display output, and the logging error macros.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_invalid_dimensions_display() {
    let err = Error::InvalidDimensions { width: 0, height: -4 };
    assert_eq!(format!("{}", err), "Invalid dimensions: 0x-4");
}

#[test]
fn test_allocation_error_display() {
    let err = Error::AllocationError("MEM1 heap exhausted".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Allocation error"));
    assert!(display.contains("MEM1 heap exhausted"));
}

#[test]
fn test_context_creation_error_display() {
    let err = Error::ContextCreationError("no GL 3.3 core".to_string());
    assert!(format!("{}", err).starts_with("Context creation error"));
}

#[test]
fn test_presentation_interrupted_display() {
    assert_eq!(format!("{}", Error::PresentationInterrupted), "Presentation interrupted");
}

// ============================================================================
// FATALITY
// ============================================================================

#[test]
fn test_fatal_kinds() {
    assert!(Error::FatalTermination("reacquire failed".to_string()).is_fatal());
    assert!(Error::DeviceLost("gpu reset".to_string()).is_fatal());

    assert!(!Error::PresentationInterrupted.is_fatal());
    assert!(!Error::AllocationError("x".to_string()).is_fatal());
    assert!(!Error::InvalidDimensions { width: 0, height: 0 }.is_fatal());
}

#[test]
fn test_error_is_std_error() {
    let err = Error::BackendError("test".to_string());
    let _: &dyn std::error::Error = &err;
}

// ============================================================================
// MACROS
// ============================================================================

fn bails() -> Result<u32> {
    crate::surface_bail!("twinscan::tests", Error::AllocationError("refused".to_string()));
}

#[test]
fn test_surface_bail_returns_error() {
    let result = bails();
    assert_eq!(result, Err(Error::AllocationError("refused".to_string())));
}

#[test]
fn test_surface_err_passes_value_through() {
    let err = crate::surface_err!("twinscan::tests", Error::PresentationInterrupted);
    assert_eq!(err, Error::PresentationInterrupted);
}
