//! Live mouse button and drag pasteboard queries.

use dropzone_core::{InputProbe, LEFT_BUTTON};
use objc2_app_kit::{NSPasteboard, NSPasteboardNameDrag, NSPasteboardTypeFileURL};
use tracing::trace;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventSourceButtonState(state_id: i32, button: u32) -> bool;
}

const K_CG_EVENT_SOURCE_STATE_COMBINED_SESSION: i32 = 0;
const K_CG_MOUSE_BUTTON_LEFT: u32 = 0;
const K_CG_MOUSE_BUTTON_RIGHT: u32 = 1;
const K_CG_MOUSE_BUTTON_CENTER: u32 = 2;

/// [`InputProbe`] backed by CoreGraphics and the drag pasteboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacProbe;

impl MacProbe {
    /// A probe reading live session state.
    pub fn new() -> Self {
        Self
    }
}

impl InputProbe for MacProbe {
    fn pressed_buttons(&self) -> u32 {
        let mut mask = 0;
        for (bit, button) in [
            (LEFT_BUTTON, K_CG_MOUSE_BUTTON_LEFT),
            (1 << 1, K_CG_MOUSE_BUTTON_RIGHT),
            (1 << 2, K_CG_MOUSE_BUTTON_CENTER),
        ] {
            if unsafe { CGEventSourceButtonState(K_CG_EVENT_SOURCE_STATE_COMBINED_SESSION, button) } {
                mask |= bit;
            }
        }
        mask
    }

    fn drag_has_files(&self) -> bool {
        let pb = unsafe { NSPasteboard::pasteboardWithName(NSPasteboardNameDrag) };
        let Some(types) = pb.types() else {
            return false;
        };
        let file_url = unsafe { NSPasteboardTypeFileURL };
        let has = types.iter().any(|t| &*t == file_url);
        trace!(has, "drag_pasteboard_probe");
        has
    }
}
