//! Error types and result alias for the mac-dropwatch crate.
use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to create the CGEventTap.
    #[error("failed to create event tap")]
    EventTapStart,

    /// Missing or denied system permission.
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    /// The tap thread could not be spawned.
    #[error("failed to spawn event tap thread: {0}")]
    ThreadSpawn(#[from] io::Error),

    /// The tap thread exited before reporting readiness.
    #[error("event tap thread exited unexpectedly")]
    TapThreadGone,

    /// The input source is already running.
    #[error("event tap already running")]
    AlreadyRunning,
}

impl From<Error> for dropzone_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::PermissionDenied(what) => Self::PermissionDenied(what),
            _ => Self::TapStart,
        }
    }
}
