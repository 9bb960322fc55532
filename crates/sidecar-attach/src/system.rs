//! Boundary traits: what the engine needs from the OS, and what it commands.

use std::fmt::Debug;

use tracing::trace;

use crate::{geom::Rect, screen::Displays};

/// Run state of an application, as far as attachment cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    NotRunning,
    /// Running but not the foreground application.
    Background,
    /// Running and frontmost.
    Active,
}

/// Abstraction over the platform's window and accessibility services.
///
/// All methods are synchronous and are called from the host's main thread.
/// Failures surface as `None`/`false`; the engine answers every one of them
/// the same way (hide, then wait for the next event).
pub trait WindowSystem: Displays {
    /// Handle to another application's window. Equality is identity: two
    /// handles are equal when they refer to the same OS window.
    type Window: Clone + PartialEq + Debug;

    /// Whether this process may read and observe other applications' windows.
    /// Must not prompt.
    fn accessibility_ok(&self) -> bool;

    /// Ask the OS to show its consent dialog. Returns immediately; a grant,
    /// if any, shows up in a later [`WindowSystem::accessibility_ok`].
    fn request_accessibility(&self);

    /// Bundle identifier of this process.
    fn own_app_id(&self) -> Option<String>;

    /// Whether `app_id` is running, and whether it is frontmost.
    fn app_state(&self, app_id: &str) -> AppState;

    /// The application's windows, frontmost first. `None` when enumeration
    /// fails.
    fn app_windows(&self, app_id: &str) -> Option<Vec<Self::Window>>;

    /// Frame of `window` in the host coordinate space.
    fn window_frame(&self, window: &Self::Window) -> Option<Rect>;

    /// Whether `window` is minimized. Unreadable counts as not minimized.
    fn is_minimized(&self, window: &Self::Window) -> bool;

    /// Install system-wide subscriptions (activation, termination, launch,
    /// display changes). Returns `false` if nothing could be installed.
    fn subscribe_system(&mut self) -> bool;

    /// Remove everything installed by [`WindowSystem::subscribe_system`].
    fn unsubscribe_system(&mut self);

    /// Observe `window` for moves, resizes and destruction, replacing any
    /// previous window observation. Returns `false` if the OS refused.
    fn observe_window(&mut self, window: &Self::Window) -> bool;

    /// Tear down the current window observation, if any.
    fn unobserve_window(&mut self);

    /// Watch `app_id` for changes of its focused or main window, replacing any
    /// previous application watch. Independent of window observation, so a
    /// focus change still arrives after the observed window is destroyed.
    fn observe_app(&mut self, app_id: &str) -> bool;

    /// Remove the watch installed by [`WindowSystem::observe_app`], if any.
    fn unobserve_app(&mut self);
}

/// Receiver of the engine's commands; owns the companion window.
pub trait AttachDelegate {
    /// Width the companion window wants.
    fn companion_width(&self) -> f64;

    /// Move the companion to `frame`. When `animated`, a short ease-out is
    /// recommended; a window that is not currently visible should snap into
    /// place and be shown.
    fn position_window(&mut self, frame: Rect, animated: bool);

    fn hide_window(&mut self);

    fn show_window(&mut self);
}

/// Find the frontmost, non-minimized window of `app_id`.
///
/// Only the active application qualifies; background windows are never
/// returned. Side-effect free; callers re-run it whenever the frontmost
/// window may have changed.
pub fn find_frontmost_window<S: WindowSystem + ?Sized>(sys: &S, app_id: &str) -> Option<S::Window> {
    match sys.app_state(app_id) {
        AppState::Active => {}
        state => {
            trace!("discovery: {} is {:?}", app_id, state);
            return None;
        }
    }
    let first = sys.app_windows(app_id)?.into_iter().next()?;
    if sys.is_minimized(&first) {
        trace!("discovery: frontmost window of {} is minimized", app_id);
        return None;
    }
    Some(first)
}
