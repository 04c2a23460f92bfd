//! Global error handling for marktree
//!
//! Only request-level failures (bad configuration, malformed requests,
//! selections outside the workspace) travel through this type. Failures
//! tied to a single directory or file are absorbed into the scan result.

use std::io;
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for marktree operations
#[derive(Error, Debug)]
pub enum MarkTreeError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request failed validation at the execution boundary
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Selected path is not inside the workspace root
    #[error("Path is outside the workspace root: {0}")]
    OutsideWorkspace(String),

    /// Shell command errors
    #[error("Shell error: {0}")]
    Shell(String),

    /// Worker thread errors
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Specialized Result type for marktree operations
pub type Result<T> = std::result::Result<T, MarkTreeError>;

/// Creates a MarkTreeError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::MarkTreeError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
