//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_unsupported_surface_display() {
    let err = Error::UnsupportedSurface("no present queue".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Unsupported surface"));
    assert!(display.contains("no present queue"));
}

#[test]
fn test_invalid_config_display() {
    let err = Error::InvalidConfig("width must be non-zero".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid surface config"));
    assert!(display.contains("width must be non-zero"));
}

#[test]
fn test_protocol_errors_display() {
    assert_eq!(format!("{}", Error::NotConfigured), "Surface is not configured");
    assert_eq!(format!("{}", Error::NotAcquired), "No surface image acquired");
    assert_eq!(format!("{}", Error::AlreadyAcquired), "A surface image is already acquired");
}

#[test]
fn test_out_of_date_display() {
    assert_eq!(format!("{}", Error::OutOfDateSurface), "Surface is out of date");
}

#[test]
fn test_construction_display() {
    let err = Error::Construction("window handle unavailable".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Surface construction failed"));
    assert!(display.contains("window handle unavailable"));
}

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueuePresentKHR failed".to_string());
    assert_eq!(format!("{}", err), "Backend error: vkQueuePresentKHR failed");
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::NotAcquired;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    assert!(format!("{:?}", Error::OutOfDateSurface).contains("OutOfDateSurface"));
    assert!(format!("{:?}", Error::InvalidConfig("x".to_string())).contains("InvalidConfig"));
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::UnsupportedSurface("test".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(Error::NotAcquired, Error::NotConfigured);
}

#[test]
fn test_only_out_of_date_is_recoverable() {
    assert!(Error::OutOfDateSurface.is_recoverable());
    assert!(!Error::NotConfigured.is_recoverable());
    assert!(!Error::NotAcquired.is_recoverable());
    assert!(!Error::AlreadyAcquired.is_recoverable());
    assert!(!Error::Construction("x".to_string()).is_recoverable());
    assert!(!Error::InvalidConfig("x".to_string()).is_recoverable());
}

// ============================================================================
// RESULT + MACROS
// ============================================================================

fn fails_with_bail(code: i32) -> Result<u32> {
    if code < 0 {
        crate::engine_bail!("galaxy3d::tests", "negative code {}", code);
    }
    Ok(code as u32)
}

#[test]
fn test_engine_bail_returns_backend_error() {
    assert_eq!(fails_with_bail(3), Ok(3));
    assert_eq!(
        fails_with_bail(-1),
        Err(Error::BackendError("negative code -1".to_string()))
    );
}

#[test]
fn test_engine_err_builds_backend_error() {
    let err = crate::engine_err!("galaxy3d::tests", "code {}", 7);
    assert_eq!(err, Error::BackendError("code 7".to_string()));
}

#[test]
fn test_result_question_mark_propagates() {
    fn inner() -> Result<()> {
        Err(Error::OutOfDateSurface)
    }
    fn outer() -> Result<()> {
        inner()?;
        Ok(())
    }
    assert_eq!(outer(), Err(Error::OutOfDateSurface));
}
