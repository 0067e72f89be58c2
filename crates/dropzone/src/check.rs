//! Implementation for the `check` subcommand.

use tracing::info;

use crate::error::{Error, Result};

fn label(ok: bool) -> &'static str {
    if ok { "granted" } else { "missing" }
}

/// Report permission status; fails when input cannot be watched.
pub fn run() -> Result<()> {
    let status = permissions::check_permissions();
    println!("Input Monitoring: {}", label(status.input_ok));
    println!("Accessibility:    {}", label(status.accessibility_ok));
    if !status.accessibility_ok {
        info!("window anchoring falls back to the window list without Accessibility");
    }
    if status.can_watch_input() {
        Ok(())
    } else {
        Err(Error::MissingPermissions(status.missing().join(", ")))
    }
}
