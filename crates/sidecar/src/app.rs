use std::time::Instant;

use mac_attach::MacSystem;
use sidecar_attach::{AttachCfg, AttachDelegate, AttachEvent, Attacher, Side};
use tao::{
    dpi::LogicalSize,
    error::OsError,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    window::WindowBuilder,
};
use thiserror::Error;
use tracing::{info, trace, warn};

use crate::{companion::Companion, settings::Settings};

/// Title of the companion window; also how AppKit finds it again.
pub const WINDOW_TITLE: &str = "Sidecar";

/// Height before the first attachment sets a real frame.
const INITIAL_HEIGHT: f64 = 600.0;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create window: {0}")]
    Window(#[from] OsError),
    #[error("attachment backend: {0}")]
    Backend(#[from] mac_attach::Error),
    #[error("operation requires the main thread")]
    MainThread,
    #[error("window {0:?} not found")]
    WindowMissing(String),
}

/// What the user asked for; survives permission denials so the attacher
/// can be enabled later.
struct Wanted {
    browser: Option<String>,
    side: Side,
}

impl Wanted {
    fn from_settings(settings: &Settings) -> Option<Self> {
        settings.attach_enabled.then(|| Self {
            browser: settings.browser.clone(),
            side: settings.side,
        })
    }

    /// Try to enable; the browser falls back to the system default.
    fn enable(&self, attacher: &mut Attacher<MacSystem, Companion>) -> bool {
        let Some(browser) = self.browser.clone().or_else(mac_attach::default_browser) else {
            warn!("no browser configured and no default browser found");
            return false;
        };
        attacher.enable(browser, self.side)
    }
}

/// Run the companion until its window closes.
pub fn run(settings: &Settings) -> Result<(), Error> {
    let event_loop = EventLoopBuilder::<AttachEvent>::with_user_event().build();
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(settings.companion_width, INITIAL_HEIGHT))
        .build(&event_loop)?;

    let proxy = event_loop.create_proxy();
    let system = MacSystem::new(move |ev| {
        if proxy.send_event(ev).is_err() {
            trace!("event loop closed; dropping notification");
        }
    })?;
    let companion = Companion::find(WINDOW_TITLE, settings.companion_width)?;
    let mut attacher = Attacher::new(system, companion, AttachCfg::default());

    let wanted = Wanted::from_settings(settings);
    match &wanted {
        Some(w) => {
            if !w.enable(&mut attacher) {
                info!("attachment pending; will retry when the companion is focused");
                attacher.delegate_mut().show_window();
            }
        }
        None => attacher.delegate_mut().show_window(),
    }

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::UserEvent(ev) => attacher.handle(ev, Instant::now()),
            Event::WindowEvent {
                window_id,
                event: WindowEvent::Focused(true),
                ..
            } if window_id == window.id() => {
                // Returning from System Settings lands here; a permission
                // grant becomes visible now.
                if let Some(w) = &wanted
                    && !attacher.is_enabled()
                {
                    w.enable(&mut attacher);
                }
            }
            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
                ..
            } if window_id == window.id() => {
                attacher.disable();
                *control_flow = ControlFlow::Exit;
                return;
            }
            _ => {}
        }
        attacher.fire_due(Instant::now());
        *control_flow = match attacher.next_deadline() {
            Some(when) => ControlFlow::WaitUntil(when),
            None => ControlFlow::Wait,
        };
    })
}
