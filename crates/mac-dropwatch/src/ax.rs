//! Accessibility tier: focused (else main) window of the frontmost app.

use std::{ffi::c_void, ptr};

use core_foundation::{
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use dropzone_core::{LocateError, Rect, WindowTier};
use tracing::trace;

use crate::{screen, window::frontmost_pid};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXValueGetValue(theValue: CFTypeRef, theType: i32, valuePtr: *mut c_void) -> bool;
}

// AXValue type constants (per Apple docs)
const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
// AX error for invalid UI element (window closed / stale reference)
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;

/// Owned AXUIElementRef, released on drop.
struct AXElem(*mut c_void);

impl AXElem {
    fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Drop for AXElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

fn ax_error(err: i32) -> LocateError {
    if err == K_AX_ERROR_INVALID_UI_ELEMENT {
        LocateError::WindowGone
    } else {
        LocateError::Ax(err)
    }
}

/// Copy an attribute value; the caller owns the returned reference.
fn copy_attr(element: &AXElem, name: &'static str) -> Result<CFTypeRef, LocateError> {
    let attr = CFString::new(name);
    let mut v: CFTypeRef = ptr::null_mut();
    let err =
        unsafe { AXUIElementCopyAttributeValue(element.as_ptr(), attr.as_concrete_TypeRef(), &mut v) };
    if err != 0 {
        return Err(ax_error(err));
    }
    if v.is_null() {
        return Err(LocateError::NoWindow);
    }
    Ok(v)
}

/// Decode an AXValue of `ty` into `out`, releasing the value.
fn take_ax_value<T>(v: CFTypeRef, ty: i32, out: &mut T) -> Result<(), LocateError> {
    let ok = unsafe { AXValueGetValue(v, ty, out as *mut T as *mut c_void) };
    unsafe { CFRelease(v) };
    if ok { Ok(()) } else { Err(LocateError::Unsupported) }
}

fn focused_window(app: &AXElem) -> Result<AXElem, LocateError> {
    match copy_attr(app, "AXFocusedWindow") {
        Ok(w) => Ok(AXElem(w as *mut c_void)),
        Err(err) => {
            trace!(%err, "ax_focused_window_missing_trying_main");
            copy_attr(app, "AXMainWindow").map(|w| AXElem(w as *mut c_void))
        }
    }
}

fn window_frame(win: &AXElem) -> Result<CGRect, LocateError> {
    let mut pos = CGPoint::new(0.0, 0.0);
    take_ax_value(
        copy_attr(win, "AXPosition")?,
        K_AX_VALUE_CGPOINT_TYPE,
        &mut pos,
    )?;
    let mut size = CGSize::new(0.0, 0.0);
    take_ax_value(copy_attr(win, "AXSize")?, K_AX_VALUE_CGSIZE_TYPE, &mut size)?;
    Ok(CGRect::new(&pos, &size))
}

/// Precise tier using the Accessibility API.
#[derive(Debug, Default, Clone, Copy)]
pub struct AxTier;

impl WindowTier for AxTier {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn frontmost_window(&self) -> Result<Rect, LocateError> {
        if !permissions::accessibility_ok() {
            return Err(LocateError::Permission);
        }
        let pid = frontmost_pid()?;
        let app = unsafe { AXUIElementCreateApplication(pid) };
        if app.is_null() {
            return Err(LocateError::NoFrontmostApp);
        }
        let app = AXElem(app);
        let win = focused_window(&app)?;
        let frame = window_frame(&win)?;
        Ok(screen::to_global_rect(&frame))
    }
}
