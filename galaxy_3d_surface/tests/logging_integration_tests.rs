//! Integration tests for the logging system
//!
//! These tests replace the global logger, so they run serially.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_surface::galaxy3d::log::{
    min_severity, reset_logger, set_logger, set_min_severity, LogEntry, LogSeverity, Logger,
};
use galaxy_3d_surface::galaxy3d::Error;
use galaxy_3d_surface::{engine_bail, engine_debug, engine_error, engine_info, engine_trace, engine_warn};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install() -> Arc<Mutex<Vec<LogEntry>>> {
    reset_logger();
    let (logger, entries) = TestLogger::new();
    set_logger(logger);
    entries
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
#[serial]
fn test_macros_reach_custom_logger() {
    let entries = install();

    engine_trace!("galaxy3d::tests", "trace {}", 1);
    engine_debug!("galaxy3d::tests", "debug {}", 2);
    engine_info!("galaxy3d::tests", "info {}", 3);
    engine_warn!("galaxy3d::tests", "warn {}", 4);
    engine_error!("galaxy3d::tests", "error {}", 5);

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[2].message, "info 3");
    assert_eq!(entries[3].severity, LogSeverity::Warn);
    assert_eq!(entries[4].source, "galaxy3d::tests");
    reset_logger();
}

#[test]
#[serial]
fn test_error_entries_carry_file_and_line() {
    let entries = install();

    engine_info!("galaxy3d::tests", "no location");
    engine_error!("galaxy3d::tests", "with location");

    let entries = entries.lock().unwrap();
    assert!(entries[0].file.is_none());
    assert!(entries[0].line.is_none());
    assert!(entries[1].file.unwrap().ends_with("logging_integration_tests.rs"));
    assert!(entries[1].line.unwrap() > 0);
    reset_logger();
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let entries = install();
    set_min_severity(LogSeverity::Warn);
    assert_eq!(min_severity(), LogSeverity::Warn);

    engine_trace!("galaxy3d::tests", "dropped");
    engine_info!("galaxy3d::tests", "dropped");
    engine_warn!("galaxy3d::tests", "kept");
    engine_error!("galaxy3d::tests", "kept");

    assert_eq!(entries.lock().unwrap().len(), 2);

    reset_logger();
    assert_eq!(min_severity(), LogSeverity::Trace);
}

#[test]
#[serial]
fn test_engine_bail_logs_before_returning() {
    let entries = install();

    fn failing() -> galaxy_3d_surface::galaxy3d::Result<()> {
        engine_bail!("galaxy3d::vulkan", "vkCreateSwapchainKHR failed: {}", -1000001004);
    }

    assert_eq!(
        failing(),
        Err(Error::BackendError("vkCreateSwapchainKHR failed: -1000001004".to_string()))
    );
    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert_eq!(entries[0].source, "galaxy3d::vulkan");
    reset_logger();
}
