//! The attachment state machine.
//!
//! [`Attacher`] owns the enablement state, the observed target window and the
//! single pending recomputation. It turns [`AttachEvent`]s into exactly three outbound
//! commands on its [`AttachDelegate`]: position, hide, show. Nothing here
//! returns an error; every failure path ends in a hide and waits for the next
//! event to try again.

use std::{
    fmt::Debug,
    mem,
    time::{Duration, Instant},
};

use tracing::{debug, info, trace, warn};

use crate::{
    config::AttachCfg,
    event::AttachEvent,
    frame::{Side, calculate_frame},
    geom::Rect,
    screen::ScreenResolver,
    system::{AppState, AttachDelegate, WindowSystem, find_frontmost_window},
    timer::Debounce,
};

/// What to attach to. Fixed for one enable/disable cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachConfig {
    /// Bundle identifier of the target application.
    pub app_id: String,
    pub side: Side,
}

/// Bundle identifiers compare case-insensitively.
fn same_app(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Mutable borrows of everything a session drives.
struct Env<'a, S, D> {
    sys: &'a mut S,
    delegate: &'a mut D,
    cfg: &'a AttachCfg,
}

/// State that only exists while attachment is enabled.
struct Session<W> {
    config: AttachConfig,
    /// Window with an installed observation.
    tracked: Option<W>,
    /// Whether the target application is watched for window focus changes.
    /// Outlives individual windows; released on termination and disable.
    app_observed: bool,
    last_target: Option<Rect>,
    last_companion: Option<Rect>,
    screens: ScreenResolver,
    /// Most recent foreground application other than ourselves.
    last_foreground: Option<String>,
    /// The one outstanding recomputation.
    pending: Debounce,
    /// The pending recomputation settles a display change and must reassert
    /// the position even when it is unchanged.
    pending_forced: bool,
    screen_debounce: Duration,
}

enum State<W> {
    Disabled,
    Enabled(Session<W>),
}

impl<W: Clone + PartialEq + Debug> Session<W> {
    fn new(config: AttachConfig, cfg: &AttachCfg) -> Self {
        Self {
            config,
            tracked: None,
            app_observed: false,
            last_target: None,
            last_companion: None,
            screens: ScreenResolver::new(),
            last_foreground: None,
            pending: Debounce::new(cfg.position_debounce),
            pending_forced: false,
            screen_debounce: cfg.screen_debounce,
        }
    }

    fn is_target(&self, app_id: Option<&str>) -> bool {
        app_id.is_some_and(|id| same_app(id, &self.config.app_id))
    }

    fn hide<S, D: AttachDelegate>(&mut self, env: &mut Env<'_, S, D>) {
        env.delegate.hide_window();
        // A hidden companion has no current frame; the next computation must
        // not be suppressed as a repeat.
        self.last_companion = None;
    }

    fn cancel_pending(&mut self) {
        self.pending.cancel();
        self.pending_forced = false;
    }

    /// Forget the tracked window and tear down its observation.
    fn drop_window<S: WindowSystem<Window = W>, D>(&mut self, env: &mut Env<'_, S, D>) {
        if let Some(w) = self.tracked.take() {
            debug!("releasing observed window {:?}", w);
            env.sys.unobserve_window();
        }
        self.last_target = None;
        self.cancel_pending();
    }

    /// Watch the target application for window focus changes, once per run
    /// of the application.
    fn observe_app<S: WindowSystem<Window = W>, D>(&mut self, env: &mut Env<'_, S, D>) {
        if self.app_observed {
            return;
        }
        if env.sys.observe_app(&self.config.app_id) {
            debug!("watching {} for focused window changes", self.config.app_id);
            self.app_observed = true;
        } else {
            warn!(
                "could not watch {} for focus changes; retrying on next attach",
                self.config.app_id
            );
        }
    }

    fn release_app<S: WindowSystem<Window = W>, D>(&mut self, env: &mut Env<'_, S, D>) {
        if mem::take(&mut self.app_observed) {
            env.sys.unobserve_app();
        }
    }

    fn attach<S, D>(&mut self, env: &mut Env<'_, S, D>)
    where
        S: WindowSystem<Window = W>,
        D: AttachDelegate,
    {
        let state = env.sys.app_state(&self.config.app_id);
        if state != AppState::Active {
            debug!("attach: {} is {:?}; hiding", self.config.app_id, state);
            self.hide(env);
            return;
        }
        self.last_foreground = Some(self.config.app_id.clone());
        self.observe_app(env);
        let Some(window) = find_frontmost_window(&*env.sys, &self.config.app_id) else {
            debug!("attach: no usable window for {}; hiding", self.config.app_id);
            self.hide(env);
            return;
        };
        if self.tracked.as_ref() == Some(&window) {
            trace!("attach: same window; reasserting position");
            self.update_position(env, true);
            return;
        }
        if let Some(prev) = self.tracked.take() {
            debug!("attach: switching away from {:?}", prev);
            env.sys.unobserve_window();
        }
        self.last_target = None;
        self.cancel_pending();
        if env.sys.observe_window(&window) {
            info!("attached to {:?} of {}", window, self.config.app_id);
            self.tracked = Some(window);
        } else {
            warn!("could not observe {:?}; positioning without tracking", window);
        }
        self.update_position(env, true);
    }

    fn update_position<S, D>(&mut self, env: &mut Env<'_, S, D>, force_show: bool)
    where
        S: WindowSystem<Window = W>,
        D: AttachDelegate,
    {
        let Some(window) = find_frontmost_window(&*env.sys, &self.config.app_id) else {
            debug!("update: target window unavailable; hiding");
            self.hide(env);
            return;
        };
        let Some(target) = env.sys.window_frame(&window) else {
            debug!("update: frame of {:?} unreadable; hiding", window);
            self.hide(env);
            return;
        };
        if self.last_target == Some(target) {
            // Equal target frames do not imply an equal companion frame (the
            // display may have changed), so carry on.
            trace!("update: target frame unchanged");
        }
        let width = env.delegate.companion_width();
        let Some(frame) = calculate_frame(
            &target,
            width,
            self.config.side,
            env.cfg.min_target_width,
            &mut self.screens,
            &*env.sys,
        ) else {
            debug!(
                "update: no room for {:.0}px companion on {:?} of {:?}; hiding",
                width, self.config.side, target
            );
            self.hide(env);
            return;
        };
        self.last_target = Some(target);
        if !force_show && self.last_companion == Some(frame) {
            trace!("update: companion frame unchanged; suppressed");
            return;
        }
        debug!("update: position companion at {:?}", frame);
        env.delegate.position_window(frame, true);
        self.last_companion = Some(frame);
    }

    fn on_activated<S, D>(&mut self, env: &mut Env<'_, S, D>, app_id: Option<String>)
    where
        S: WindowSystem<Window = W>,
        D: AttachDelegate,
    {
        if self.is_target(app_id.as_deref()) {
            self.last_foreground = app_id;
            self.attach(env);
            return;
        }
        let own = env.sys.own_app_id();
        let is_self = matches!((&app_id, &own), (Some(a), Some(b)) if same_app(a, b));
        if is_self {
            if self.is_target(self.last_foreground.as_deref()) {
                trace!("companion activated from target; staying put");
            } else {
                self.hide(env);
            }
            return;
        }
        debug!("foreground is now {:?}; hiding", app_id);
        self.hide(env);
        self.last_foreground = app_id;
    }

    fn handle<S, D>(&mut self, env: &mut Env<'_, S, D>, event: AttachEvent, now: Instant)
    where
        S: WindowSystem<Window = W>,
        D: AttachDelegate,
    {
        match event {
            AttachEvent::WindowMoved | AttachEvent::WindowResized => {
                if self.pending_forced && self.pending.is_armed() {
                    // The display settle recomputes anyway and reads the
                    // latest frame when it fires.
                    trace!("{:?}: absorbed by pending display settle", event);
                } else {
                    trace!("{:?}: rescheduling reposition", event);
                    self.pending.schedule(now);
                }
            }
            AttachEvent::WindowDestroyed => {
                debug!("observed window destroyed");
                self.hide(env);
                self.drop_window(env);
            }
            AttachEvent::FocusedWindowChanged => self.attach(env),
            AttachEvent::AppActivated { app_id } => self.on_activated(env, app_id),
            AttachEvent::AppTerminated { app_id } => {
                if self.is_target(app_id.as_deref()) {
                    debug!("target {} terminated", self.config.app_id);
                    self.hide(env);
                    self.drop_window(env);
                    self.release_app(env);
                }
            }
            AttachEvent::AppLaunched { app_id } => {
                if self.is_target(app_id.as_deref()) {
                    debug!("target {} launched", self.config.app_id);
                    self.attach(env);
                }
            }
            AttachEvent::ScreensChanged => {
                self.screens.clear();
                self.pending.schedule_after(now, self.screen_debounce);
                self.pending_forced = true;
            }
        }
    }

    fn fire_due<S, D>(&mut self, env: &mut Env<'_, S, D>, now: Instant)
    where
        S: WindowSystem<Window = W>,
        D: AttachDelegate,
    {
        if self.pending.take_due(now) {
            let force = mem::take(&mut self.pending_forced);
            self.update_position(env, force);
        }
    }
}

/// Keeps a companion window docked beside the frontmost window of a target
/// application.
///
/// The host constructs one `Attacher`, feeds it events with
/// [`Attacher::handle`], and drives its timers with
/// [`Attacher::next_deadline`] and [`Attacher::fire_due`]. Everything runs on
/// one thread; no call re-enters another.
pub struct Attacher<S: WindowSystem, D: AttachDelegate> {
    system: S,
    delegate: D,
    cfg: AttachCfg,
    state: State<S::Window>,
}

impl<S: WindowSystem, D: AttachDelegate> Attacher<S, D> {
    pub fn new(system: S, delegate: D, cfg: AttachCfg) -> Self {
        Self {
            system,
            delegate,
            cfg,
            state: State::Disabled,
        }
    }

    /// Start attaching to `app_id` on `side`.
    ///
    /// An already enabled attacher is disabled first. Without accessibility
    /// permission this then triggers the OS prompt and returns `false`,
    /// leaving the attacher disabled; the caller retries later.
    pub fn enable(&mut self, app_id: impl Into<String>, side: Side) -> bool {
        let app_id = app_id.into();
        self.disable();
        if !self.system.accessibility_ok() {
            info!("accessibility not granted; requesting before attaching to {}", app_id);
            self.system.request_accessibility();
            return false;
        }
        if !self.system.subscribe_system() {
            warn!("system notifications unavailable; attachment will not follow app switches");
        }
        info!("attachment enabled: {} ({:?})", app_id, side);
        self.state = State::Enabled(Session::new(AttachConfig { app_id, side }, &self.cfg));
        self.attach();
        true
    }

    /// Stop attaching; tear down every subscription and forget all cached state.
    pub fn disable(&mut self) {
        let State::Enabled(session) = mem::replace(&mut self.state, State::Disabled) else {
            return;
        };
        if session.tracked.is_some() {
            self.system.unobserve_window();
        }
        if session.app_observed {
            self.system.unobserve_app();
        }
        self.system.unsubscribe_system();
        info!("attachment disabled: {}", session.config.app_id);
    }

    /// Re-discover the target window and reassert the companion position.
    pub fn attach(&mut self) {
        self.with_session(|s, env| s.attach(env));
    }

    /// Recompute now and reposition even if nothing changed.
    pub fn force_update(&mut self) {
        self.with_session(|s, env| s.update_position(env, true));
    }

    /// Deliver one event.
    pub fn handle(&mut self, event: AttachEvent, now: Instant) {
        if !self.is_enabled() {
            trace!("disabled; ignoring {:?}", event);
            return;
        }
        self.with_session(|s, env| s.handle(env, event, now));
    }

    /// When the host should next call [`Attacher::fire_due`].
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            State::Enabled(s) => s.pending.deadline(),
            State::Disabled => None,
        }
    }

    /// Run any debounced recomputation whose deadline has passed.
    pub fn fire_due(&mut self, now: Instant) {
        self.with_session(|s, env| s.fire_due(env, now));
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, State::Enabled(_))
    }

    /// Current target and side, when enabled.
    pub fn config(&self) -> Option<&AttachConfig> {
        match &self.state {
            State::Enabled(s) => Some(&s.config),
            State::Disabled => None,
        }
    }

    /// The window currently under observation.
    pub fn tracked_window(&self) -> Option<&S::Window> {
        match &self.state {
            State::Enabled(s) => s.tracked.as_ref(),
            State::Disabled => None,
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.system
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    fn with_session(&mut self, f: impl FnOnce(&mut Session<S::Window>, &mut Env<'_, S, D>)) {
        let Self {
            system,
            delegate,
            cfg,
            state,
        } = self;
        if let State::Enabled(session) = state {
            let mut env = Env {
                sys: system,
                delegate,
                cfg,
            };
            f(session, &mut env);
        }
    }
}
