//! Running-application lookups by bundle identifier.

use objc2::rc::Retained;
use objc2_app_kit::{NSRunningApplication, NSWorkspace};
use sidecar_attach::AppState;

/// Bundle identifier of `app`, if it has one.
pub(crate) fn bundle_id(app: &NSRunningApplication) -> Option<String> {
    app.bundleIdentifier().map(|b| b.to_string())
}

/// The active candidate if there is one, otherwise the first.
fn prefer_active<T>(
    candidates: impl IntoIterator<Item = T>,
    is_active: impl Fn(&T) -> bool,
) -> Option<T> {
    let mut first = None;
    for c in candidates {
        if is_active(&c) {
            return Some(c);
        }
        first.get_or_insert(c);
    }
    first
}

/// The live instance of `app_id`, preferring the frontmost one when several
/// are running. Identifiers compare case-insensitively; LaunchServices does
/// not preserve case.
pub(crate) fn running(app_id: &str) -> Option<Retained<NSRunningApplication>> {
    let ws = NSWorkspace::sharedWorkspace();
    let matching = ws.runningApplications().iter().filter(|app| {
        !app.isTerminated() && bundle_id(app).is_some_and(|b| b.eq_ignore_ascii_case(app_id))
    });
    prefer_active(matching, |app| app.isActive())
}

pub(crate) fn state(app_id: &str) -> AppState {
    match running(app_id) {
        None => AppState::NotRunning,
        Some(app) if app.isActive() => AppState::Active,
        Some(_) => AppState::Background,
    }
}

/// How an application is named in events: its bundle identifier, or a
/// `pid:` key for unbundled processes so they still compare equal to
/// themselves.
pub(crate) fn identity(app: &NSRunningApplication) -> String {
    bundle_id(app).unwrap_or_else(|| format!("pid:{}", app.processIdentifier()))
}

/// Identity of this process, in the same form as [`identity`].
pub(crate) fn own_identity() -> String {
    identity(&NSRunningApplication::currentApplication())
}

#[cfg(test)]
mod tests {
    use super::prefer_active;

    #[test]
    fn active_instance_wins_over_earlier_ones() {
        let apps = [("a", false), ("b", true), ("c", false)];
        assert_eq!(prefer_active(apps, |a| a.1), Some(("b", true)));
    }

    #[test]
    fn first_instance_when_none_active() {
        let apps = [("a", false), ("b", false)];
        assert_eq!(prefer_active(apps, |a| a.1), Some(("a", false)));
        assert_eq!(prefer_active(Vec::<(&str, bool)>::new(), |a| a.1), None);
    }
}
