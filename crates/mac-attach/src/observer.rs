//! Accessibility (AX) observers.
//!
//! An [`AxWatch`] subscribes one element to a fixed set of notifications.
//! Two kinds exist: [`AxWatch::window`] follows the target window's moves,
//! resizes and destruction, and [`AxWatch::app`] follows the owning
//! application's focused/main window. They are installed and dropped
//! independently, so closing the observed window does not silence the
//! application. The run loop source is added to the main run loop on install
//! and removed on drop, together with every notification registered.

use std::{ffi::c_void, ptr};

use core_foundation::{
    base::{CFRelease, CFTypeRef, TCFType},
    runloop::{CFRunLoopGetMain, CFRunLoopSourceRef, kCFRunLoopCommonModes},
    string::{CFString, CFStringRef},
};
use sidecar_attach::AttachEvent;
use tracing::{debug, trace, warn};

use crate::{
    ax::{self, AXElem, cfstr},
    error::{Error, Result},
    system::Sink,
};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXObserverCreate(
        pid: i32,
        callback: extern "C" fn(*mut c_void, *mut c_void, CFStringRef, *mut c_void),
        out: *mut *mut c_void,
    ) -> i32;
    fn AXObserverAddNotification(
        observer: *mut c_void,
        element: *mut c_void,
        notification: CFStringRef,
        refcon: *mut c_void,
    ) -> i32;
    fn AXObserverRemoveNotification(
        observer: *mut c_void,
        element: *mut c_void,
        notification: CFStringRef,
    ) -> i32;
    fn AXObserverGetRunLoopSource(observer: *mut c_void) -> *mut c_void;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFEqual(a: CFTypeRef, b: CFTypeRef) -> bool;
    fn CFRunLoopAddSource(rl: *mut c_void, source: CFRunLoopSourceRef, mode: CFStringRef);
    fn CFRunLoopRemoveSource(rl: *mut c_void, source: CFRunLoopSourceRef, mode: CFStringRef);
}

const NOTIFICATION_ALREADY_REGISTERED: i32 = -25209;

/// Notifications registered on the window element.
const WINDOW_NOTIFICATIONS: [&str; 3] = ["AXMoved", "AXResized", "AXUIElementDestroyed"];
/// Notifications registered on the application element.
const APP_NOTIFICATIONS: [&str; 2] = ["AXFocusedWindowChanged", "AXMainWindowChanged"];

/// CF-backed RAII for AXObserverRef.
struct AxObserver(*mut c_void);

impl Drop for AxObserver {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) }
    }
}

/// Context handed to the AX callback.
struct Ctx {
    sink: Sink,
    moved: CFString,
    resized: CFString,
    destroyed: CFString,
    focused_window: CFString,
    main_window: CFString,
}

impl Ctx {
    fn new(sink: Sink) -> Self {
        Self {
            sink,
            moved: CFString::from_static_string("AXMoved"),
            resized: CFString::from_static_string("AXResized"),
            destroyed: CFString::from_static_string("AXUIElementDestroyed"),
            focused_window: CFString::from_static_string("AXFocusedWindowChanged"),
            main_window: CFString::from_static_string("AXMainWindowChanged"),
        }
    }

    fn event_for(&self, notification: CFStringRef) -> Option<AttachEvent> {
        let is = |s: &CFString| unsafe {
            CFEqual(notification as CFTypeRef, s.as_concrete_TypeRef() as CFTypeRef)
        };
        if is(&self.moved) {
            Some(AttachEvent::WindowMoved)
        } else if is(&self.resized) {
            Some(AttachEvent::WindowResized)
        } else if is(&self.destroyed) {
            Some(AttachEvent::WindowDestroyed)
        } else if is(&self.focused_window) || is(&self.main_window) {
            Some(AttachEvent::FocusedWindowChanged)
        } else {
            None
        }
    }
}

extern "C" fn ax_callback(
    _observer: *mut c_void,
    _element: *mut c_void,
    notification: CFStringRef,
    refcon: *mut c_void,
) {
    if refcon.is_null() {
        return;
    }
    let ctx = unsafe { &*(refcon as *const Ctx) };
    match ctx.event_for(notification) {
        Some(ev) => {
            trace!("ax notification: {:?}", ev);
            (ctx.sink)(ev);
        }
        None => trace!("ax notification ignored"),
    }
}

/// An installed set of notifications on one element.
pub(crate) struct AxWatch {
    observer: AxObserver,
    element: AXElem,
    rl: *mut c_void,
    source: CFRunLoopSourceRef,
    subs: Vec<&'static str>,
    ctx: *mut Ctx,
}

impl AxWatch {
    /// Follow `window`, owned by process `pid`, for moves, resizes and
    /// destruction.
    pub(crate) fn window(pid: i32, window: &AXElem, sink: Sink) -> Result<Self> {
        Self::install(pid, window.clone(), &WINDOW_NOTIFICATIONS, sink)
    }

    /// Follow process `pid` for focused and main window changes.
    pub(crate) fn app(pid: i32, sink: Sink) -> Result<Self> {
        let app = ax::app_element(pid)?;
        Self::install(pid, app, &APP_NOTIFICATIONS, sink)
    }

    /// Fails only when the observer itself cannot be created or none of
    /// `names` could be registered.
    fn install(pid: i32, element: AXElem, names: &[&'static str], sink: Sink) -> Result<Self> {
        let mut obs_ptr: *mut c_void = ptr::null_mut();
        let err = unsafe { AXObserverCreate(pid, ax_callback, &mut obs_ptr) };
        if err != 0 || obs_ptr.is_null() {
            return Err(Error::ObserverCreate(err));
        }
        let observer = AxObserver(obs_ptr);
        let source = unsafe { AXObserverGetRunLoopSource(observer.0) } as CFRunLoopSourceRef;
        if source.is_null() {
            return Err(Error::Unsupported);
        }
        let rl = unsafe { CFRunLoopGetMain() } as *mut c_void;
        unsafe { CFRunLoopAddSource(rl, source, kCFRunLoopCommonModes) };
        let mut this = Self {
            observer,
            element,
            rl,
            source,
            subs: Vec::new(),
            ctx: Box::into_raw(Box::new(Ctx::new(sink))),
        };
        for &name in names {
            match this.add(name) {
                Ok(()) => this.subs.push(name),
                Err(e) => warn!("AXObserverAddNotification({}, pid={}) failed: {}", name, pid, e),
            }
        }
        if this.subs.is_empty() {
            // Dropping `this` tears down the run loop source.
            return Err(Error::Unsupported);
        }
        debug!(
            "observer installed pid={} element={:?} subs={:?}",
            pid, this.element, this.subs
        );
        Ok(this)
    }

    fn add(&self, name: &'static str) -> Result<()> {
        let err = unsafe {
            AXObserverAddNotification(
                self.observer.0,
                self.element.as_ptr(),
                cfstr(name),
                self.ctx.cast(),
            )
        };
        match err {
            0 | NOTIFICATION_ALREADY_REGISTERED => Ok(()),
            e => Err(Error::AxCode(e)),
        }
    }
}

impl Drop for AxWatch {
    fn drop(&mut self) {
        unsafe {
            for name in self.subs.drain(..) {
                let _ = AXObserverRemoveNotification(
                    self.observer.0,
                    self.element.as_ptr(),
                    cfstr(name),
                );
            }
            CFRunLoopRemoveSource(self.rl, self.source, kCFRunLoopCommonModes);
            drop(Box::from_raw(self.ctx));
        }
        trace!("observer removed element={:?}", self.element);
    }
}
