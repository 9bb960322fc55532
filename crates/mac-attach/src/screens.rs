//! `NSScreen` enumeration in AppKit coordinates (origin bottom-left of the
//! primary display).

use objc2_app_kit::NSScreen;
use objc2_foundation::{MainThreadMarker, NSNumber, NSRect, ns_string};
use sidecar_attach::{DisplayId, Rect, Screen};

fn rect(r: NSRect) -> Rect {
    Rect::new(r.origin.x, r.origin.y, r.size.width, r.size.height)
}

/// The CoreGraphics display number, when AppKit reports one.
fn display_id(screen: &NSScreen) -> Option<DisplayId> {
    let desc = screen.deviceDescription();
    let num = desc.objectForKey(ns_string!("NSScreenNumber"))?;
    num.downcast_ref::<NSNumber>().map(|n| n.unsignedIntValue())
}

fn to_screen(index: usize, screen: &NSScreen) -> Screen {
    Screen {
        id: display_id(screen).unwrap_or(index as DisplayId),
        frame: rect(screen.frame()),
        visible: rect(screen.visibleFrame()),
    }
}

/// All displays, primary first.
pub(crate) fn all(mtm: MainThreadMarker) -> Vec<Screen> {
    NSScreen::screens(mtm)
        .iter()
        .enumerate()
        .map(|(i, s)| to_screen(i, &s))
        .collect()
}

/// The display holding the key window.
pub(crate) fn main(mtm: MainThreadMarker) -> Option<Screen> {
    NSScreen::mainScreen(mtm).map(|s| to_screen(0, &s))
}

/// Height of the primary display, the reference for flipping AX
/// coordinates.
pub(crate) fn primary_height(mtm: MainThreadMarker) -> Option<f64> {
    let screens = NSScreen::screens(mtm);
    screens
        .iter()
        .next()
        .or_else(|| NSScreen::mainScreen(mtm))
        .map(|s| s.frame().size.height)
}
