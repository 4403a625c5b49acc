//! Error types for the Galaxy3D surface layer
//!
//! This module defines the error taxonomy used by the surface state machine,
//! the capability query, and presentation backends.

use std::fmt;

/// Result type for Galaxy3D surface operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D surface errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Capabilities cannot be queried (invalid window, or the device
    /// cannot present to it)
    UnsupportedSurface(String),

    /// Requested format, usage or size cannot be satisfied
    InvalidConfig(String),

    /// Operation requires a configured surface
    NotConfigured,

    /// `present()` called without a held image
    NotAcquired,

    /// `acquire_next_image()` called while an image is still held
    AlreadyAcquired,

    /// Native surface went stale (typically a resize). Reconfigure and retry.
    OutOfDateSurface,

    /// The surface cannot be created for this window/device pairing
    Construction(String),

    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,
}

impl Error {
    /// Returns true if the caller can recover by reconfiguring the surface
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::OutOfDateSurface)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedSurface(msg) => write!(f, "Unsupported surface: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid surface config: {}", msg),
            Error::NotConfigured => write!(f, "Surface is not configured"),
            Error::NotAcquired => write!(f, "No surface image acquired"),
            Error::AlreadyAcquired => write!(f, "A surface image is already acquired"),
            Error::OutOfDateSurface => write!(f, "Surface is out of date"),
            Error::Construction(msg) => write!(f, "Surface construction failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::BackendError` from the same message
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_surface::engine_err;
/// let code = -4;
/// let err = engine_err!("galaxy3d::vulkan", "Failed to present: {}", code);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR (with file:line) and return early with `Error::BackendError`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
