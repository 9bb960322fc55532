use std::{cell::RefCell, collections::HashMap, ffi::c_void, fmt, ptr, thread_local};

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};

use crate::error::{Error, Result};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    pub(crate) fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXValueGetValue(theValue: CFTypeRef, theType: i32, valuePtr: *mut c_void) -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFBooleanGetValue(b: CFTypeRef) -> bool;
    fn CFEqual(a: CFTypeRef, b: CFTypeRef) -> bool;
    fn CFRetain(cf: CFTypeRef) -> CFTypeRef;
}

// AXValue type constants
const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
// Window closed or stale reference
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CGPoint {
    pub x: f64,
    pub y: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CGSize {
    pub width: f64,
    pub height: f64,
}

/// Owned reference to an `AXUIElement`.
///
/// Clones retain; equality is `CFEqual`, which is identity for AX elements.
pub(crate) struct AXElem(*mut c_void);

impl AXElem {
    /// Take ownership of a +1 reference from a Create/Copy call.
    pub(crate) fn from_create(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() { None } else { Some(Self(ptr)) }
    }

    /// Retain a borrowed reference (e.g. an element inside a CFArray).
    pub(crate) fn retain_from_borrowed(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        unsafe { CFRetain(ptr as CFTypeRef) };
        Some(Self(ptr))
    }

    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Clone for AXElem {
    fn clone(&self) -> Self {
        unsafe { CFRetain(self.0 as CFTypeRef) };
        Self(self.0)
    }
}

impl Drop for AXElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

impl PartialEq for AXElem {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || unsafe { CFEqual(self.0 as CFTypeRef, other.0 as CFTypeRef) }
    }
}

impl fmt::Debug for AXElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AXElem({:p})", self.0)
    }
}

thread_local! {
    static ATTR_STRINGS: RefCell<HashMap<&'static str, CFString>> = RefCell::new(HashMap::new());
}

/// A stable `CFStringRef` for an attribute or notification name. The string
/// lives for the rest of the thread.
pub(crate) fn cfstr(name: &'static str) -> CFStringRef {
    ATTR_STRINGS.with(|cell| {
        let mut m = cell.borrow_mut();
        let s = m.entry(name).or_insert_with(|| CFString::new(name));
        s.as_concrete_TypeRef()
    })
}

/// Copy an attribute value; the caller owns the returned reference.
fn copy_attr(element: *mut c_void, attr: CFStringRef) -> Result<CFTypeRef> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    match err {
        0 if v.is_null() => Err(Error::Unsupported),
        0 => Ok(v),
        K_AX_ERROR_INVALID_UI_ELEMENT => Err(Error::WindowGone),
        e => Err(Error::AxCode(e)),
    }
}

pub(crate) fn ax_bool(element: *mut c_void, attr: CFStringRef) -> Result<bool> {
    let v = copy_attr(element, attr)?;
    let b = unsafe { CFBooleanGetValue(v) };
    unsafe { CFRelease(v) };
    Ok(b)
}

pub(crate) fn ax_get_point(element: *mut c_void, attr: CFStringRef) -> Result<CGPoint> {
    let v = copy_attr(element, attr)?;
    let mut p = CGPoint::default();
    let ok =
        unsafe { AXValueGetValue(v, K_AX_VALUE_CGPOINT_TYPE, &mut p as *mut _ as *mut c_void) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(Error::Unsupported);
    }
    Ok(p)
}

pub(crate) fn ax_get_size(element: *mut c_void, attr: CFStringRef) -> Result<CGSize> {
    let v = copy_attr(element, attr)?;
    let mut s = CGSize::default();
    let ok = unsafe { AXValueGetValue(v, K_AX_VALUE_CGSIZE_TYPE, &mut s as *mut _ as *mut c_void) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(Error::Unsupported);
    }
    Ok(s)
}

/// The application element for `pid`.
pub(crate) fn app_element(pid: i32) -> Result<AXElem> {
    AXElem::from_create(unsafe { AXUIElementCreateApplication(pid) }).ok_or(Error::AppElement)
}

/// The application's `AXWindows`, in the order AX reports them (frontmost
/// first).
pub(crate) fn windows(app: &AXElem) -> Result<Vec<AXElem>> {
    let wins_ref = copy_attr(app.as_ptr(), cfstr("AXWindows"))?;
    let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(wins_ref as _) };
    let n = unsafe { CFArrayGetCount(arr.as_concrete_TypeRef()) };
    let mut out = Vec::with_capacity(n.max(0) as usize);
    for i in 0..n {
        let w = unsafe { CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) } as *mut c_void;
        if let Some(elem) = AXElem::retain_from_borrowed(w) {
            out.push(elem);
        }
    }
    Ok(out)
}

/// Position (top-left, AX space) and size of a window.
pub(crate) fn frame(window: &AXElem) -> Result<(CGPoint, CGSize)> {
    let p = ax_get_point(window.as_ptr(), cfstr("AXPosition"))?;
    let s = ax_get_size(window.as_ptr(), cfstr("AXSize"))?;
    Ok((p, s))
}

/// Unreadable or absent counts as not minimized.
pub(crate) fn is_minimized(window: &AXElem) -> bool {
    ax_bool(window.as_ptr(), cfstr("AXMinimized")).unwrap_or(false)
}
