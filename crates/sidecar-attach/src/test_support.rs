//! Scriptable doubles for the engine's boundary traits.
//!
//! [`MockSystem`] and [`RecordingDelegate`] are cheap clonable handles over
//! shared state, so a test can hand one clone to an [`crate::Attacher`] and
//! keep another to script the world and inspect what happened.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    geom::Rect,
    screen::{Displays, Screen},
    system::{AppState, AttachDelegate, WindowSystem},
};

/// Handle to a mock window; equal ids are the same window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockWindow(pub u32);

#[derive(Default)]
struct MockApp {
    active: bool,
    /// Frontmost first.
    windows: Vec<MockWindow>,
}

/// Call counters exposed for assertions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockCounts {
    pub screen_enumerations: usize,
    pub frame_reads: usize,
    pub observes: usize,
    pub unobserves: usize,
    pub app_observes: usize,
    pub app_unobserves: usize,
    pub subscribes: usize,
    pub unsubscribes: usize,
    pub permission_prompts: usize,
}

#[derive(Default)]
struct MockState {
    trusted: bool,
    own_app: Option<String>,
    apps: HashMap<String, MockApp>,
    frames: HashMap<MockWindow, Rect>,
    minimized: Vec<MockWindow>,
    screens: Vec<Screen>,
    fail_enumeration: bool,
    fail_observe: bool,
    observed: Option<MockWindow>,
    observed_app: Option<String>,
    subscribed: bool,
    counts: MockCounts,
}

/// In-memory [`WindowSystem`] for tests.
#[derive(Clone, Default)]
pub struct MockSystem {
    inner: Arc<Mutex<MockState>>,
}

impl MockSystem {
    /// A trusted system with one 1920x1080 display and no applications.
    pub fn new() -> Self {
        let sys = Self::default();
        sys.set_trusted(true);
        sys.set_screens(vec![Screen {
            id: 1,
            frame: Rect::new(0.0, 0.0, 1920.0, 1080.0),
            visible: Rect::new(0.0, 0.0, 1920.0, 1080.0),
        }]);
        sys
    }

    pub fn set_trusted(&self, trusted: bool) {
        self.inner.lock().trusted = trusted;
    }

    pub fn set_own_app(&self, app_id: &str) {
        self.inner.lock().own_app = Some(app_id.to_string());
    }

    pub fn set_screens(&self, screens: Vec<Screen>) {
        self.inner.lock().screens = screens;
    }

    /// Start `app_id` in the background.
    pub fn launch(&self, app_id: &str) {
        self.inner.lock().apps.entry(app_id.to_string()).or_default();
    }

    /// Make `app_id` the only active application.
    pub fn activate(&self, app_id: &str) {
        let mut st = self.inner.lock();
        for app in st.apps.values_mut() {
            app.active = false;
        }
        st.apps.entry(app_id.to_string()).or_default().active = true;
    }

    pub fn quit(&self, app_id: &str) {
        let mut st = self.inner.lock();
        if let Some(app) = st.apps.remove(app_id) {
            for w in app.windows {
                st.frames.remove(&w);
            }
        }
    }

    /// Open `window` as the frontmost window of `app_id`.
    pub fn open_window(&self, app_id: &str, window: MockWindow, frame: Rect) {
        let mut st = self.inner.lock();
        st.apps
            .entry(app_id.to_string())
            .or_default()
            .windows
            .insert(0, window);
        st.frames.insert(window, frame);
    }

    pub fn close_window(&self, window: MockWindow) {
        let mut st = self.inner.lock();
        for app in st.apps.values_mut() {
            app.windows.retain(|w| *w != window);
        }
        st.frames.remove(&window);
    }

    pub fn set_frame(&self, window: MockWindow, frame: Rect) {
        self.inner.lock().frames.insert(window, frame);
    }

    /// Make the frame of `window` unreadable.
    pub fn clear_frame(&self, window: MockWindow) {
        self.inner.lock().frames.remove(&window);
    }

    pub fn set_minimized(&self, window: MockWindow, minimized: bool) {
        let mut st = self.inner.lock();
        st.minimized.retain(|w| *w != window);
        if minimized {
            st.minimized.push(window);
        }
    }

    pub fn set_fail_enumeration(&self, fail: bool) {
        self.inner.lock().fail_enumeration = fail;
    }

    pub fn set_fail_observe(&self, fail: bool) {
        self.inner.lock().fail_observe = fail;
    }

    pub fn counts(&self) -> MockCounts {
        self.inner.lock().counts
    }

    /// Window with an installed observation.
    pub fn observed(&self) -> Option<MockWindow> {
        self.inner.lock().observed
    }

    /// Application watched for focus changes.
    pub fn observed_app(&self) -> Option<String> {
        self.inner.lock().observed_app.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.lock().subscribed
    }
}

impl Displays for MockSystem {
    fn screens(&self) -> Vec<Screen> {
        let mut st = self.inner.lock();
        st.counts.screen_enumerations += 1;
        st.screens.clone()
    }

    fn main_screen(&self) -> Option<Screen> {
        self.inner.lock().screens.first().copied()
    }
}

impl WindowSystem for MockSystem {
    type Window = MockWindow;

    fn accessibility_ok(&self) -> bool {
        self.inner.lock().trusted
    }

    fn request_accessibility(&self) {
        self.inner.lock().counts.permission_prompts += 1;
    }

    fn own_app_id(&self) -> Option<String> {
        self.inner.lock().own_app.clone()
    }

    fn app_state(&self, app_id: &str) -> AppState {
        match self.inner.lock().apps.get(app_id) {
            None => AppState::NotRunning,
            Some(app) if app.active => AppState::Active,
            Some(_) => AppState::Background,
        }
    }

    fn app_windows(&self, app_id: &str) -> Option<Vec<MockWindow>> {
        let st = self.inner.lock();
        if st.fail_enumeration {
            return None;
        }
        st.apps.get(app_id).map(|a| a.windows.clone())
    }

    fn window_frame(&self, window: &MockWindow) -> Option<Rect> {
        let mut st = self.inner.lock();
        st.counts.frame_reads += 1;
        st.frames.get(window).copied()
    }

    fn is_minimized(&self, window: &MockWindow) -> bool {
        self.inner.lock().minimized.contains(window)
    }

    fn subscribe_system(&mut self) -> bool {
        let mut st = self.inner.lock();
        st.counts.subscribes += 1;
        st.subscribed = true;
        true
    }

    fn unsubscribe_system(&mut self) {
        let mut st = self.inner.lock();
        st.counts.unsubscribes += 1;
        st.subscribed = false;
    }

    fn observe_window(&mut self, window: &MockWindow) -> bool {
        let mut st = self.inner.lock();
        st.counts.observes += 1;
        if st.fail_observe {
            return false;
        }
        st.observed = Some(*window);
        true
    }

    fn unobserve_window(&mut self) {
        let mut st = self.inner.lock();
        st.counts.unobserves += 1;
        st.observed = None;
    }

    fn observe_app(&mut self, app_id: &str) -> bool {
        let mut st = self.inner.lock();
        st.counts.app_observes += 1;
        if st.fail_observe {
            return false;
        }
        st.observed_app = Some(app_id.to_string());
        true
    }

    fn unobserve_app(&mut self) {
        let mut st = self.inner.lock();
        st.counts.app_unobserves += 1;
        st.observed_app = None;
    }
}

/// A command issued to the delegate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Position { frame: Rect, animated: bool },
    Hide,
    Show,
}

/// [`AttachDelegate`] that records every command.
#[derive(Clone)]
pub struct RecordingDelegate {
    width: f64,
    commands: Arc<Mutex<Vec<Command>>>,
}

impl RecordingDelegate {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    /// Frames of all position commands, in order.
    pub fn positions(&self) -> Vec<Rect> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                Command::Position { frame, .. } => Some(*frame),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<Command> {
        self.commands.lock().last().copied()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }
}

impl AttachDelegate for RecordingDelegate {
    fn companion_width(&self) -> f64 {
        self.width
    }

    fn position_window(&mut self, frame: Rect, animated: bool) {
        self.commands
            .lock()
            .push(Command::Position { frame, animated });
    }

    fn hide_window(&mut self) {
        self.commands.lock().push(Command::Hide);
    }

    fn show_window(&mut self) {
        self.commands.lock().push(Command::Show);
    }
}
