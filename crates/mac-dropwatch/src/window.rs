//! Window list scan tier.
//!
//! Walks `CGWindowListCopyWindowInfo` (on-screen, no desktop elements) in
//! front-to-back order and takes the first layer-0 window owned by the
//! frontmost application. Works without Accessibility permission.

use std::ffi::c_void;

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFTypeRef, TCFType},
    dictionary::CFDictionaryRef,
};
use core_graphics::window as cgw;
use dropzone_core::{LocateError, Rect, WindowTier};
use objc2_app_kit::NSWorkspace;
use tracing::trace;

use crate::{
    cfutil::{dict_get_i32, dict_get_rect},
    screen,
};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowListCopyWindowInfo(option: u32, relativeToWindow: u32) -> CFTypeRef; // CFArrayRef
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFGetTypeID(cf: CFTypeRef) -> usize;
    fn CFDictionaryGetTypeID() -> usize;
}

const K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY: u32 = 1 << 0;
const K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS: u32 = 1 << 4;

/// Process identifier of the frontmost application.
pub(crate) fn frontmost_pid() -> Result<i32, LocateError> {
    let ws = NSWorkspace::sharedWorkspace();
    let app = ws.frontmostApplication().ok_or(LocateError::NoFrontmostApp)?;
    Ok(app.processIdentifier())
}

/// Bounds (top-left space) of the first on-screen layer-0 window of `pid`.
fn first_window_bounds(pid: i32) -> Option<Rect> {
    unsafe {
        let arr_ref = CGWindowListCopyWindowInfo(
            K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY
                | K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS,
            0,
        );
        if arr_ref.is_null() {
            trace!("window_list_null");
            return None;
        }
        let arr: CFArray<*const c_void> = CFArray::wrap_under_create_rule(arr_ref as _);
        for i in 0..CFArrayGetCount(arr.as_concrete_TypeRef()) {
            let item = CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) as CFTypeRef;
            if item.is_null() || CFGetTypeID(item) != CFDictionaryGetTypeID() {
                continue;
            }
            let d = item as CFDictionaryRef;
            if dict_get_i32(d, cgw::kCGWindowOwnerPID) != Some(pid) {
                continue;
            }
            if dict_get_i32(d, cgw::kCGWindowLayer) != Some(0) {
                continue;
            }
            if let Some(bounds) = dict_get_rect(d, cgw::kCGWindowBounds) {
                return Some(screen::to_global_rect(&bounds));
            }
        }
    }
    None
}

/// Fallback tier scanning the on-screen window list.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowListTier;

impl WindowTier for WindowListTier {
    fn name(&self) -> &'static str {
        "window_list"
    }

    fn frontmost_window(&self) -> Result<Rect, LocateError> {
        let pid = frontmost_pid()?;
        first_window_bounds(pid).ok_or(LocateError::NoWindow)
    }
}
