//! Permission checks for dropzone.
//!
//! The event tap needs Input Monitoring; the precise frontmost window query
//! needs Accessibility. Neither is fatal on its own: without Accessibility
//! the window locator falls back to the window list scan. There is no
//! prompting logic here.
//!
//! On platforms other than macOS every check reports `true`.

use tracing::debug;

#[cfg(target_os = "macos")]
/// Platform permission checks.
mod sys {
    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrusted() -> bool;
        fn CGPreflightListenEventAccess() -> bool;
    }

    /// Accessibility trust state.
    pub(crate) fn accessibility() -> bool {
        unsafe { AXIsProcessTrusted() }
    }

    /// Input Monitoring grant state.
    pub(crate) fn input_monitoring() -> bool {
        unsafe { CGPreflightListenEventAccess() }
    }
}

#[cfg(not(target_os = "macos"))]
/// Platform permission checks.
mod sys {
    /// Accessibility trust state.
    pub(crate) fn accessibility() -> bool {
        true
    }

    /// Input Monitoring grant state.
    pub(crate) fn input_monitoring() -> bool {
        true
    }
}

/// True if the process is trusted for Accessibility.
pub fn accessibility_ok() -> bool {
    sys::accessibility()
}

/// Check if the application has the "Input Monitoring" permission.
///
/// Returns `true` when the process may install a listen-only CGEvent tap
/// for mouse and modifier events.
pub fn input_monitoring_ok() -> bool {
    sys::input_monitoring()
}

/// Current permission status for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionsStatus {
    /// Accessibility (AX) permission; `true` if granted.
    pub accessibility_ok: bool,
    /// Input Monitoring permission; `true` if granted.
    pub input_ok: bool,
}

impl PermissionsStatus {
    /// Human-readable names of the permissions that are missing.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.input_ok {
            out.push("Input Monitoring");
        }
        if !self.accessibility_ok {
            out.push("Accessibility");
        }
        out
    }

    /// True when the event tap can be installed.
    pub fn can_watch_input(&self) -> bool {
        self.input_ok
    }
}

/// Query both Accessibility and Input Monitoring permissions.
pub fn check_permissions() -> PermissionsStatus {
    let status = PermissionsStatus {
        accessibility_ok: accessibility_ok(),
        input_ok: input_monitoring_ok(),
    };
    debug!(
        accessibility = status.accessibility_ok,
        input = status.input_ok,
        "permissions_checked"
    );
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_input_before_accessibility() {
        let s = PermissionsStatus {
            accessibility_ok: false,
            input_ok: false,
        };
        assert_eq!(s.missing(), vec!["Input Monitoring", "Accessibility"]);
        assert!(!s.can_watch_input());

        let s = PermissionsStatus {
            accessibility_ok: false,
            input_ok: true,
        };
        assert_eq!(s.missing(), vec!["Accessibility"]);
        assert!(s.can_watch_input());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn non_mac_reports_granted() {
        assert!(check_permissions().missing().is_empty());
    }
}
