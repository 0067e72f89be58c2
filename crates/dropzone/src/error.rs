//! Error handling for the dropzone binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for dropzone commands.
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Engine, configuration or input source failure.
    #[error("{0}")]
    Core(#[from] dropzone_core::Error),
    /// A geometry argument could not be parsed.
    #[error("invalid {what} '{raw}': expected {expected}")]
    Geometry {
        /// Which argument was malformed.
        what: &'static str,
        /// The text as given.
        raw: String,
        /// Shape of a valid value.
        expected: &'static str,
    },
    /// No configuration path was given and none could be determined.
    #[error("no configuration directory available; pass --config")]
    NoConfigPath,
    /// Required permissions are missing.
    #[error("missing permissions: {0}")]
    MissingPermissions(String),
    /// Input watching must start on the main thread.
    #[error("must be started from the main thread")]
    NotMainThread,
    /// The command needs a platform adapter this build does not have.
    #[error("'{0}' is only supported on macOS")]
    Unsupported(&'static str),
}
