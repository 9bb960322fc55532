use std::{fmt, rc::Rc};

use objc2_foundation::MainThreadMarker;
use sidecar_attach::{AppState, AttachEvent, Displays, Rect, Screen, WindowSystem};
use tracing::{debug, trace, warn};

use crate::{
    apps, ax,
    ax::AXElem,
    error::{Error, Result},
    observer::AxWatch,
    screens,
    workspace::WorkspaceWatch,
};

/// Receiver for translated OS notifications. Called on the main thread from
/// inside AppKit/AX callbacks.
pub type Sink = Rc<dyn Fn(AttachEvent)>;

/// Another application's window, as seen through Accessibility.
#[derive(Clone, PartialEq)]
pub struct MacWindow {
    elem: AXElem,
    pid: i32,
}

impl MacWindow {
    /// Owning process.
    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl fmt::Debug for MacWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacWindow(pid={}, {:p})", self.pid, self.elem.as_ptr())
    }
}

/// [`WindowSystem`] backed by Accessibility, AppKit and NSWorkspace.
pub struct MacSystem {
    mtm: MainThreadMarker,
    sink: Sink,
    workspace: Option<WorkspaceWatch>,
    window: Option<AxWatch>,
    app: Option<AxWatch>,
}

impl MacSystem {
    /// Create the backend. Must be called on the main thread.
    pub fn new(sink: impl Fn(AttachEvent) + 'static) -> Result<Self> {
        let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
        Ok(Self {
            mtm,
            sink: Rc::new(sink),
            workspace: None,
            window: None,
            app: None,
        })
    }

    fn windows_of(&self, app_id: &str) -> Result<Vec<MacWindow>> {
        let app = apps::running(app_id).ok_or(Error::NotRunning)?;
        let pid = app.processIdentifier();
        let elem = ax::app_element(pid)?;
        Ok(ax::windows(&elem)?
            .into_iter()
            .map(|elem| MacWindow { elem, pid })
            .collect())
    }
}

impl Displays for MacSystem {
    fn screens(&self) -> Vec<Screen> {
        let all = screens::all(self.mtm);
        trace!("enumerated {} screens", all.len());
        all
    }

    fn main_screen(&self) -> Option<Screen> {
        screens::main(self.mtm)
    }
}

impl WindowSystem for MacSystem {
    type Window = MacWindow;

    fn accessibility_ok(&self) -> bool {
        permissions::accessibility_ok()
    }

    fn request_accessibility(&self) {
        let trusted = permissions::request_accessibility();
        debug!("accessibility prompt requested; trusted={}", trusted);
    }

    fn own_app_id(&self) -> Option<String> {
        Some(apps::own_identity())
    }

    fn app_state(&self, app_id: &str) -> AppState {
        apps::state(app_id)
    }

    fn app_windows(&self, app_id: &str) -> Option<Vec<MacWindow>> {
        self.windows_of(app_id)
            .map_err(|e| debug!("window enumeration for {} failed: {}", app_id, e))
            .ok()
    }

    fn window_frame(&self, window: &MacWindow) -> Option<Rect> {
        let (p, s) = ax::frame(&window.elem)
            .map_err(|e| debug!("frame read for {:?} failed: {}", window, e))
            .ok()?;
        let ref_height = screens::primary_height(self.mtm)?;
        Some(Rect::flip_from_top_left(p.x, p.y, s.width, s.height, ref_height))
    }

    fn is_minimized(&self, window: &MacWindow) -> bool {
        ax::is_minimized(&window.elem)
    }

    fn subscribe_system(&mut self) -> bool {
        self.workspace = None;
        self.workspace = Some(WorkspaceWatch::install(&self.sink));
        true
    }

    fn unsubscribe_system(&mut self) {
        self.workspace = None;
    }

    fn observe_window(&mut self, window: &MacWindow) -> bool {
        // Always release the previous observation before installing a new one.
        self.window = None;
        match AxWatch::window(window.pid, &window.elem, self.sink.clone()) {
            Ok(obs) => {
                debug!("observing {:?}", window);
                self.window = Some(obs);
                true
            }
            Err(e) => {
                warn!("could not observe {:?}: {}", window, e);
                false
            }
        }
    }

    fn unobserve_window(&mut self) {
        if self.window.take().is_some() {
            debug!("window observation removed");
        }
    }

    fn observe_app(&mut self, app_id: &str) -> bool {
        self.app = None;
        let installed = apps::running(app_id)
            .ok_or(Error::NotRunning)
            .and_then(|app| AxWatch::app(app.processIdentifier(), self.sink.clone()));
        match installed {
            Ok(watch) => {
                debug!("watching {} for window focus changes", app_id);
                self.app = Some(watch);
                true
            }
            Err(e) => {
                warn!("could not watch {}: {}", app_id, e);
                false
            }
        }
    }

    fn unobserve_app(&mut self) {
        if self.app.take().is_some() {
            debug!("application observation removed");
        }
    }
}
