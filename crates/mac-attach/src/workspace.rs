//! System-wide notifications: application activation, termination and
//! launch from the `NSWorkspace` center, display reconfiguration from the
//! default center.

use std::ptr::NonNull;

use block2::RcBlock;
use objc2::{
    rc::Retained,
    runtime::{AnyObject, NSObjectProtocol, ProtocolObject},
};
use objc2_app_kit::{
    NSApplicationDidChangeScreenParametersNotification, NSRunningApplication,
    NSWorkspace, NSWorkspaceApplicationKey, NSWorkspaceDidActivateApplicationNotification,
    NSWorkspaceDidLaunchApplicationNotification, NSWorkspaceDidTerminateApplicationNotification,
};
use objc2_foundation::{NSNotification, NSNotificationCenter, NSNotificationName};
use sidecar_attach::AttachEvent;
use tracing::{debug, trace};

use crate::{apps, system::Sink};

type Token = Retained<ProtocolObject<dyn NSObjectProtocol>>;

/// Identity of the application a workspace notification is about.
fn app_id_of(notif: &NSNotification) -> Option<String> {
    let info = notif.userInfo()?;
    let key: &AnyObject = unsafe { NSWorkspaceApplicationKey };
    let obj = info.objectForKey(key)?;
    let app = obj.downcast_ref::<NSRunningApplication>()?;
    Some(apps::identity(app))
}

fn observe(
    center: &NSNotificationCenter,
    name: &NSNotificationName,
    handler: impl Fn(&NSNotification) + 'static,
) -> Token {
    let block = RcBlock::new(move |notif: NonNull<NSNotification>| {
        handler(unsafe { notif.as_ref() });
    });
    unsafe { center.addObserverForName_object_queue_usingBlock(Some(name), None, None, &block) }
}

/// Installed system-wide subscriptions. Dropping removes all of them.
pub(crate) struct WorkspaceWatch {
    tokens: Vec<(Retained<NSNotificationCenter>, Token)>,
}

impl WorkspaceWatch {
    pub(crate) fn install(sink: &Sink) -> Self {
        let ws_center = NSWorkspace::sharedWorkspace().notificationCenter();
        let default_center = NSNotificationCenter::defaultCenter();
        let mut tokens = Vec::new();

        type AppEvent = fn(Option<String>) -> AttachEvent;
        let app_events: [(&NSNotificationName, AppEvent); 3] = unsafe {
            [
                (NSWorkspaceDidActivateApplicationNotification, |app_id| {
                    AttachEvent::AppActivated { app_id }
                }),
                (NSWorkspaceDidTerminateApplicationNotification, |app_id| {
                    AttachEvent::AppTerminated { app_id }
                }),
                (NSWorkspaceDidLaunchApplicationNotification, |app_id| {
                    AttachEvent::AppLaunched { app_id }
                }),
            ]
        };
        for (name, make) in app_events {
            let sink = sink.clone();
            let token = observe(&ws_center, name, move |notif| {
                let ev = make(app_id_of(notif));
                trace!("workspace notification: {:?}", ev);
                sink(ev);
            });
            tokens.push((ws_center.clone(), token));
        }

        let sink = sink.clone();
        let name = unsafe { NSApplicationDidChangeScreenParametersNotification };
        let token = observe(&default_center, name, move |_| {
            trace!("screen parameters changed");
            sink(AttachEvent::ScreensChanged);
        });
        tokens.push((default_center, token));

        debug!("workspace observers installed: {}", tokens.len());
        Self { tokens }
    }
}

impl Drop for WorkspaceWatch {
    fn drop(&mut self) {
        for (center, token) in self.tokens.drain(..) {
            let obs: &AnyObject = (*token).as_ref();
            unsafe { center.removeObserver(obs) };
        }
        debug!("workspace observers removed");
    }
}
