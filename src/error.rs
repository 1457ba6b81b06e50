/// Error types for every layer of the application
///
/// None of these are fatal: the UI logs them and degrades
/// (empty lists, placeholder captures, in-memory storage).

use thiserror::Error;

use crate::flows::FlowKind;

/// Errors raised by the key-value store and its backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a data directory for the store")]
    NoDataDir,

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors raised by the capture state machine and camera devices
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no camera device available")]
    NoDevice,

    #[error("video stream is no longer active")]
    StreamEnded,

    #[error("cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("failed to encode captured frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised when starting or awaiting a simulated integration flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0} is already in progress")]
    Busy(FlowKind),

    #[error("{0}")]
    Invalid(&'static str),

    #[error("not connected to SuiteDash")]
    NotConnected,

    #[error("{0} was cancelled")]
    Cancelled(FlowKind),

    #[error("{kind} task failed: {reason}")]
    Failed { kind: FlowKind, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by OS-boundary capabilities
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("native share sheet is not supported on this platform")]
    ShareUnsupported,
}
