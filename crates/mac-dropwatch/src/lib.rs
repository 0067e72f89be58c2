//! macOS adapters for the dropzone engine.
//!
//! - [`MacInput`]: listen-only CGEventTap feeding raw events to the engine
//! - [`MacProbe`]: live mouse-button state and drag pasteboard inspection
//! - [`MacDesktop`]: displays, cursor, and the frontmost-window anchor
//!
//! All geometry handed to the engine is in the bottom-left-origin global
//! space used by AppKit.
#![cfg(target_os = "macos")]

mod ax;
mod cfutil;
mod error;
mod probe;
pub mod screen;
mod tap;
mod window;

use dropzone_core::{Anchor, Desktop, Display, Point, WindowLocator};

pub use ax::AxTier;
pub use objc2_foundation::MainThreadMarker;
pub use error::{Error, Result};
pub use probe::MacProbe;
pub use tap::MacInput;
pub use window::WindowListTier;

/// Desktop queries backed by AppKit, Accessibility and the window list.
///
/// Screen queries require the main thread, so this type is tied to it.
pub struct MacDesktop {
    /// Proof that we are on the main thread.
    mtm: MainThreadMarker,
    /// Accessibility first, window list second.
    locator: WindowLocator<AxTier, WindowListTier>,
}

impl MacDesktop {
    /// Create a desktop bound to the main thread.
    pub fn new(mtm: MainThreadMarker) -> Self {
        Self {
            mtm,
            locator: WindowLocator::new(AxTier, WindowListTier),
        }
    }
}

impl Desktop for MacDesktop {
    fn displays(&self) -> Vec<Display> {
        screen::displays(self.mtm)
    }

    fn cursor_location(&self) -> Point {
        screen::cursor_location()
    }

    fn current_anchor(&self) -> Option<Anchor> {
        let displays = self.displays();
        self.locator.current_anchor(&displays)
    }
}
