use std::ptr::NonNull;

use block2::RcBlock;
use objc2::{ClassType, msg_send, rc::Retained};
use objc2_app_kit::{NSAnimationContext, NSApplication, NSWindow};
use objc2_foundation::{MainThreadMarker, NSPoint, NSRect, NSSize};
use objc2_quartz_core::{CAMediaTimingFunction, kCAMediaTimingFunctionEaseOut};
use sidecar_attach::{AttachDelegate, Rect};
use tracing::{debug, trace};

use crate::app::Error;

/// Duration of an animated move, in seconds.
const ANIMATION_SECS: f64 = 0.12;

fn ns_rect(r: Rect) -> NSRect {
    NSRect::new(NSPoint::new(r.x, r.y), NSSize::new(r.w, r.h))
}

/// How the window gets to its new frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    /// Set the frame directly; order the window front if it was hidden.
    Snap,
    /// Short ease-out from the current frame.
    Ease,
}

/// A hidden window has nothing on screen to animate from.
fn motion(visible: bool, animated: bool) -> Motion {
    if visible && animated {
        Motion::Ease
    } else {
        Motion::Snap
    }
}

/// The sidebar's native window, driven by the attacher.
pub struct Companion {
    window: Retained<NSWindow>,
    width: f64,
}

impl Companion {
    /// Find our window by title. Requires the AppKit main thread.
    pub fn find(title: &str, width: f64) -> Result<Self, Error> {
        let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
        let app = NSApplication::sharedApplication(mtm);
        let window = app
            .windows()
            .iter()
            .find(|w| w.title().to_string() == title)
            .ok_or_else(|| Error::WindowMissing(title.to_string()))?;
        Ok(Self { window, width })
    }

    fn ease_to(&self, target: NSRect) {
        let window = self.window.clone();
        let timing =
            unsafe { CAMediaTimingFunction::functionWithName(kCAMediaTimingFunctionEaseOut) };
        let changes = RcBlock::new(move |ctx: NonNull<NSAnimationContext>| {
            let ctx = unsafe { ctx.as_ref() };
            ctx.setDuration(ANIMATION_SECS);
            ctx.setTimingFunction(Some(&timing));
            let proxy: Retained<NSWindow> = unsafe { msg_send![&*window, animator] };
            proxy.setFrame_display(target, true);
        });
        unsafe {
            let _: () = msg_send![NSAnimationContext::class(), runAnimationGroup: &*changes];
        }
    }
}

impl AttachDelegate for Companion {
    fn companion_width(&self) -> f64 {
        self.width
    }

    fn position_window(&mut self, frame: Rect, animated: bool) {
        let target = ns_rect(frame);
        let visible = self.window.isVisible();
        match motion(visible, animated) {
            Motion::Ease => {
                trace!("companion: ease to {:?}", frame);
                self.ease_to(target);
            }
            Motion::Snap => {
                trace!("companion: snap to {:?}", frame);
                self.window.setFrame_display(target, true);
                if !visible {
                    self.window.orderFrontRegardless();
                }
            }
        }
    }

    fn hide_window(&mut self) {
        if self.window.isVisible() {
            debug!("companion: hide");
            unsafe { self.window.orderOut(None) };
        }
    }

    fn show_window(&mut self) {
        debug!("companion: show");
        unsafe { self.window.makeKeyAndOrderFront(None) };
    }
}
