use core_foundation::{
    base::{CFTypeRef, TCFType},
    dictionary::{CFDictionaryGetValue, CFDictionaryRef},
    number::CFNumber,
    string::CFStringRef,
};
use core_graphics::geometry::{CGPoint, CGRect, CGSize};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGRectMakeWithDictionaryRepresentation(dict: CFDictionaryRef, rect: *mut CGRect) -> bool;
}

/// Raw value for `key`, or `None` when absent.
fn dict_get(dict: CFDictionaryRef, key: CFStringRef) -> Option<CFTypeRef> {
    let value = unsafe { CFDictionaryGetValue(dict, key as *const core::ffi::c_void) };
    if value.is_null() { None } else { Some(value) }
}

/// Get a 32-bit integer from CFDictionary for the given key.
pub(crate) fn dict_get_i32(dict: CFDictionaryRef, key: CFStringRef) -> Option<i32> {
    let value = dict_get(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(value as _) };
    n.to_i64().map(|v| v as i32)
}

/// Get a CGRect stored as a dictionary representation (e.g. `kCGWindowBounds`).
pub(crate) fn dict_get_rect(dict: CFDictionaryRef, key: CFStringRef) -> Option<CGRect> {
    let value = dict_get(dict, key)?;
    let mut rect = CGRect::new(&CGPoint::new(0.0, 0.0), &CGSize::new(0.0, 0.0));
    let ok = unsafe { CGRectMakeWithDictionaryRepresentation(value as CFDictionaryRef, &mut rect) };
    ok.then_some(rect)
}
