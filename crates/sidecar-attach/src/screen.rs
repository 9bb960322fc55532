//! Display enumeration and the single-slot screen resolver.

use tracing::trace;

use crate::geom::Rect;

/// Identifier for a display, stable for the lifetime of a display configuration.
pub type DisplayId = u32;

/// One attached display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    pub id: DisplayId,
    /// Full bounds of the display.
    pub frame: Rect,
    /// Bounds excluding the menu bar and Dock.
    pub visible: Rect,
}

/// Source of display information.
pub trait Displays {
    /// Enumerate all attached displays, primary first.
    fn screens(&self) -> Vec<Screen>;
    /// The main display, used when a frame intersects no display at all.
    fn main_screen(&self) -> Option<Screen>;
}

/// Maps frames to the display holding most of their area.
///
/// Keeps the last answer and reuses it while the center of the queried frame
/// stays inside that display's bounds, so a window being dragged around one
/// display does not trigger an enumeration per move event. A window straddling
/// two displays can be attributed to the cached one even when most of its
/// area sits on the other.
#[derive(Debug, Default)]
pub struct ScreenResolver {
    cached: Option<Screen>,
}

impl ScreenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the display for `frame`.
    pub fn resolve<D: Displays + ?Sized>(&mut self, frame: &Rect, displays: &D) -> Option<Screen> {
        if let Some(cached) = self.cached
            && cached.frame.contains_point(frame.cx(), frame.cy())
        {
            return Some(cached);
        }
        let found = best_screen(frame, &displays.screens()).or_else(|| {
            trace!("no display intersects {:?}; using main display", frame);
            displays.main_screen()
        });
        self.cached = found;
        found
    }

    /// Drop the cached display.
    pub fn clear(&mut self) {
        self.cached = None;
    }

    /// The currently cached display, if any.
    pub fn cached(&self) -> Option<Screen> {
        self.cached
    }
}

/// The screen with the largest intersection with `frame`. Ties go to the
/// earlier screen. Returns `None` when nothing intersects.
pub fn best_screen(frame: &Rect, screens: &[Screen]) -> Option<Screen> {
    let mut best: Option<(Screen, f64)> = None;
    for s in screens {
        let area = frame.intersection_area(&s.frame);
        if area <= 0.0 {
            continue;
        }
        match best {
            Some((_, a)) if a >= area => {}
            _ => best = Some((*s, area)),
        }
    }
    best.map(|(s, _)| s)
}
