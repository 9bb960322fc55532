//! Events delivered to the attachment engine.

/// A tagged OS notification, as seen by the engine.
///
/// Window-scoped events refer to the window currently being observed; the
/// event source only emits them while an observation is installed.
/// Application events carry the identifier of the process involved: its
/// bundle identifier where it has one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachEvent {
    /// The observed window moved.
    WindowMoved,
    /// The observed window was resized.
    WindowResized,
    /// The observed window was closed.
    WindowDestroyed,
    /// The target application's focused or main window changed.
    FocusedWindowChanged,
    /// A process became the foreground application.
    AppActivated { app_id: Option<String> },
    /// A process exited.
    AppTerminated { app_id: Option<String> },
    /// A process launched.
    AppLaunched { app_id: Option<String> },
    /// Display configuration changed (added, removed, rearranged, resized).
    ScreensChanged,
}
