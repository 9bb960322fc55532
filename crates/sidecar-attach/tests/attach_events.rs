use std::time::{Duration, Instant};

use sidecar_attach::{
    AttachCfg, AttachEvent, Attacher, Rect, Screen, Side,
    test_support::{Command, MockSystem, MockWindow, RecordingDelegate},
};

const BROWSER: &str = "com.example.browser";
const OWN: &str = "com.example.sidecar";
const OTHER: &str = "com.example.editor";
const WIDTH: f64 = 340.0;
const TARGET: Rect = Rect::new(100.0, 50.0, 800.0, 600.0);
const COMPANION: Rect = Rect::new(900.0, 50.0, 340.0, 600.0);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn activated(app: &str) -> AttachEvent {
    AttachEvent::AppActivated {
        app_id: Some(app.to_string()),
    }
}

/// An enabled attacher docked to the right of `TARGET`, with the recorded
/// commands cleared.
fn attached() -> (
    MockSystem,
    RecordingDelegate,
    Attacher<MockSystem, RecordingDelegate>,
) {
    let sys = MockSystem::new();
    sys.set_own_app(OWN);
    sys.activate(BROWSER);
    sys.open_window(BROWSER, MockWindow(1), TARGET);
    let delegate = RecordingDelegate::new(WIDTH);
    let mut attacher = Attacher::new(sys.clone(), delegate.clone(), AttachCfg::default());
    assert!(attacher.enable(BROWSER, Side::Right));
    assert_eq!(delegate.positions(), vec![COMPANION]);
    delegate.clear();
    (sys, delegate, attacher)
}

#[test]
fn burst_of_moves_collapses_into_one_recompute() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let reads = sys.counts().frame_reads;
    sys.set_frame(MockWindow(1), Rect::new(200.0, 80.0, 800.0, 600.0));
    for i in 0..10 {
        attacher.handle(AttachEvent::WindowMoved, t0 + ms(i));
    }
    assert_eq!(attacher.next_deadline(), Some(t0 + ms(9) + ms(16)));
    attacher.fire_due(t0 + ms(16));
    assert_eq!(sys.counts().frame_reads, reads);
    attacher.fire_due(t0 + ms(25));
    assert_eq!(sys.counts().frame_reads, reads + 1);
    assert_eq!(
        delegate.commands(),
        vec![Command::Position {
            frame: Rect::new(1000.0, 80.0, 340.0, 600.0),
            animated: true,
        }]
    );
    assert!(attacher.next_deadline().is_none());
}

#[test]
fn resize_is_debounced_like_move() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.set_frame(MockWindow(1), Rect::new(100.0, 50.0, 900.0, 500.0));
    attacher.handle(AttachEvent::WindowResized, t0);
    assert!(delegate.commands().is_empty());
    attacher.fire_due(t0 + ms(16));
    assert_eq!(
        delegate.positions(),
        vec![Rect::new(1000.0, 50.0, 340.0, 500.0)]
    );
}

#[test]
fn unchanged_geometry_is_suppressed() {
    let (_sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    attacher.handle(AttachEvent::WindowMoved, t0);
    attacher.fire_due(t0 + ms(16));
    assert!(delegate.commands().is_empty());
}

#[test]
fn destroyed_window_hides_immediately() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    attacher.handle(AttachEvent::WindowMoved, t0);
    attacher.handle(AttachEvent::WindowDestroyed, t0 + ms(1));
    assert_eq!(delegate.commands(), vec![Command::Hide]);
    assert_eq!(sys.counts().unobserves, 1);
    assert!(attacher.tracked_window().is_none());
    // The pending reposition was dropped along with the window.
    assert!(attacher.next_deadline().is_none());
}

#[test]
fn other_app_activation_hides_and_is_remembered() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.activate(OTHER);
    attacher.handle(activated(OTHER), t0);
    assert_eq!(delegate.commands(), vec![Command::Hide]);
    // Switching from the other app to the companion keeps it hidden.
    sys.activate(OWN);
    attacher.handle(activated(OWN), t0 + ms(5));
    assert_eq!(delegate.commands(), vec![Command::Hide, Command::Hide]);
}

#[test]
fn switching_between_target_and_companion_keeps_companion() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.activate(OWN);
    attacher.handle(activated(OWN), t0);
    assert!(delegate.commands().is_empty());

    sys.activate(BROWSER);
    attacher.handle(activated(BROWSER), t0 + ms(5));
    assert_eq!(delegate.positions(), vec![COMPANION]);

    sys.activate(OWN);
    attacher.handle(activated(OWN), t0 + ms(10));
    assert_eq!(delegate.commands().len(), 1);
}

#[test]
fn target_activation_reshows_companion() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.activate(OTHER);
    attacher.handle(activated(OTHER), t0);
    sys.activate(BROWSER);
    attacher.handle(activated(BROWSER), t0 + ms(5));
    assert_eq!(
        delegate.commands(),
        vec![
            Command::Hide,
            Command::Position {
                frame: COMPANION,
                animated: true
            }
        ]
    );
    // Same window: no observer churn.
    assert_eq!(sys.counts().observes, 1);
    assert_eq!(sys.counts().unobserves, 0);
}

#[test]
fn target_bundle_id_matches_case_insensitively() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.activate(OTHER);
    attacher.handle(activated(OTHER), t0);
    sys.activate(BROWSER);
    attacher.handle(activated("COM.Example.Browser"), t0 + ms(1));
    assert_eq!(delegate.positions(), vec![COMPANION]);
}

#[test]
fn target_termination_hides_and_releases_window() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.quit(BROWSER);
    attacher.handle(
        AttachEvent::AppTerminated {
            app_id: Some(BROWSER.to_string()),
        },
        t0,
    );
    assert_eq!(delegate.commands(), vec![Command::Hide]);
    assert_eq!(sys.observed(), None);
    assert_eq!(sys.observed_app(), None);
    assert_eq!(sys.counts().app_unobserves, 1);
    assert!(attacher.tracked_window().is_none());
}

#[test]
fn relaunched_target_is_watched_again() {
    let (sys, _delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.quit(BROWSER);
    attacher.handle(
        AttachEvent::AppTerminated {
            app_id: Some(BROWSER.to_string()),
        },
        t0,
    );
    sys.activate(BROWSER);
    sys.open_window(BROWSER, MockWindow(3), TARGET);
    attacher.handle(
        AttachEvent::AppLaunched {
            app_id: Some(BROWSER.to_string()),
        },
        t0 + ms(5),
    );
    assert_eq!(sys.observed_app().as_deref(), Some(BROWSER));
    assert_eq!(sys.counts().app_observes, 2);
    assert_eq!(sys.observed(), Some(MockWindow(3)));
}

#[test]
fn unrelated_termination_is_ignored() {
    let (sys, delegate, mut attacher) = attached();
    attacher.handle(
        AttachEvent::AppTerminated {
            app_id: Some(OTHER.to_string()),
        },
        Instant::now(),
    );
    assert!(delegate.commands().is_empty());
    assert_eq!(sys.observed(), Some(MockWindow(1)));
}

#[test]
fn target_launch_attempts_attach() {
    let sys = MockSystem::new();
    sys.set_own_app(OWN);
    let delegate = RecordingDelegate::new(WIDTH);
    let mut attacher = Attacher::new(sys.clone(), delegate.clone(), AttachCfg::default());
    attacher.enable(BROWSER, Side::Right);
    assert_eq!(delegate.commands(), vec![Command::Hide]);

    sys.activate(BROWSER);
    sys.open_window(BROWSER, MockWindow(7), TARGET);
    attacher.handle(
        AttachEvent::AppLaunched {
            app_id: Some(BROWSER.to_string()),
        },
        Instant::now(),
    );
    assert_eq!(delegate.positions(), vec![COMPANION]);
    assert_eq!(sys.observed(), Some(MockWindow(7)));
    assert_eq!(sys.observed_app().as_deref(), Some(BROWSER));
}

#[test]
fn focused_window_change_retargets() {
    let (sys, delegate, mut attacher) = attached();
    let other = Rect::new(0.0, 0.0, 1200.0, 900.0);
    sys.open_window(BROWSER, MockWindow(2), other);
    attacher.handle(AttachEvent::FocusedWindowChanged, Instant::now());
    assert_eq!(sys.observed(), Some(MockWindow(2)));
    assert_eq!(
        delegate.positions(),
        vec![Rect::new(1200.0, 0.0, 340.0, 900.0)]
    );
}

#[test]
fn screen_change_uses_longer_debounce_and_rescans() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let scans = sys.counts().screen_enumerations;
    attacher.handle(AttachEvent::ScreensChanged, t0);
    assert_eq!(attacher.next_deadline(), Some(t0 + ms(100)));
    attacher.fire_due(t0 + ms(16));
    assert!(delegate.commands().is_empty());

    // The display shrank; the visible area now ends at 1200.
    sys.set_screens(vec![Screen {
        id: 1,
        frame: Rect::new(0.0, 0.0, 1280.0, 800.0),
        visible: Rect::new(0.0, 0.0, 1200.0, 775.0),
    }]);
    attacher.fire_due(t0 + ms(100));
    assert_eq!(sys.counts().screen_enumerations, scans + 1);
    assert_eq!(delegate.commands(), vec![Command::Hide]);
}

#[test]
fn screen_change_reasserts_unchanged_position() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    attacher.handle(AttachEvent::ScreensChanged, t0);
    attacher.handle(AttachEvent::WindowMoved, t0 + ms(50));
    attacher.fire_due(t0 + ms(100));
    assert_eq!(delegate.positions(), vec![COMPANION]);
    assert!(attacher.next_deadline().is_none());
    assert_eq!(sys.counts().observes, 1);
}

#[test]
fn move_during_screen_settle_recomputes_once() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let reads = sys.counts().frame_reads;
    attacher.handle(AttachEvent::ScreensChanged, t0);
    sys.set_frame(MockWindow(1), Rect::new(200.0, 80.0, 800.0, 600.0));
    attacher.handle(AttachEvent::WindowMoved, t0 + ms(50));
    // Only one recomputation is ever outstanding.
    assert_eq!(attacher.next_deadline(), Some(t0 + ms(100)));
    attacher.fire_due(t0 + ms(66));
    assert_eq!(sys.counts().frame_reads, reads);
    attacher.fire_due(t0 + ms(100));
    assert_eq!(sys.counts().frame_reads, reads + 1);
    assert_eq!(
        delegate.positions(),
        vec![Rect::new(1000.0, 80.0, 340.0, 600.0)]
    );
    assert!(attacher.next_deadline().is_none());
}

#[test]
fn screen_change_replaces_pending_move() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let reads = sys.counts().frame_reads;
    attacher.handle(AttachEvent::WindowMoved, t0);
    attacher.handle(AttachEvent::ScreensChanged, t0 + ms(5));
    assert_eq!(attacher.next_deadline(), Some(t0 + ms(105)));
    attacher.fire_due(t0 + ms(16));
    assert_eq!(sys.counts().frame_reads, reads);
    attacher.fire_due(t0 + ms(105));
    assert_eq!(sys.counts().frame_reads, reads + 1);
    // Forced: reasserted although the geometry is unchanged.
    assert_eq!(delegate.positions(), vec![COMPANION]);
}

#[test]
fn moves_after_screen_settle_debounce_normally() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    attacher.handle(AttachEvent::ScreensChanged, t0);
    attacher.fire_due(t0 + ms(100));
    delegate.clear();
    let reads = sys.counts().frame_reads;
    attacher.handle(AttachEvent::WindowMoved, t0 + ms(110));
    assert_eq!(attacher.next_deadline(), Some(t0 + ms(126)));
    attacher.fire_due(t0 + ms(126));
    assert_eq!(sys.counts().frame_reads, reads + 1);
    // Unforced again: unchanged geometry is suppressed.
    assert!(delegate.commands().is_empty());
}

#[test]
fn drag_within_one_display_enumerates_once() {
    let (sys, _delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let scans = sys.counts().screen_enumerations;
    for (i, x) in [120.0, 140.0, 160.0].into_iter().enumerate() {
        let at = t0 + ms(100 * i as u64);
        sys.set_frame(MockWindow(1), Rect::new(x, 50.0, 800.0, 600.0));
        attacher.handle(AttachEvent::WindowMoved, at);
        attacher.fire_due(at + ms(16));
    }
    assert_eq!(sys.counts().screen_enumerations, scans);
}

#[test]
fn hidden_companion_is_shown_again_with_same_geometry() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.clear_frame(MockWindow(1));
    attacher.handle(AttachEvent::WindowMoved, t0);
    attacher.fire_due(t0 + ms(16));
    assert_eq!(delegate.commands(), vec![Command::Hide]);

    sys.set_frame(MockWindow(1), TARGET);
    attacher.handle(AttachEvent::WindowMoved, t0 + ms(50));
    attacher.fire_due(t0 + ms(66));
    assert_eq!(delegate.positions(), vec![COMPANION]);
}

#[test]
fn minimizing_hides_on_next_move() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    sys.set_minimized(MockWindow(1), true);
    attacher.handle(AttachEvent::WindowResized, t0);
    attacher.fire_due(t0 + ms(16));
    assert_eq!(delegate.commands(), vec![Command::Hide]);
}

#[test]
fn events_are_ignored_while_disabled() {
    let (sys, delegate, mut attacher) = attached();
    attacher.disable();
    let t0 = Instant::now();
    attacher.handle(AttachEvent::WindowMoved, t0);
    attacher.handle(activated(BROWSER), t0);
    attacher.handle(AttachEvent::ScreensChanged, t0);
    attacher.fire_due(t0 + ms(200));
    attacher.force_update();
    attacher.attach();
    assert!(delegate.commands().is_empty());
    assert!(attacher.next_deadline().is_none());
    assert_eq!(sys.counts().observes, 1);
}

#[test]
fn closing_frontmost_window_falls_back_to_next() {
    let (sys, delegate, mut attacher) = attached();
    let t0 = Instant::now();
    let front = Rect::new(200.0, 100.0, 700.0, 500.0);
    sys.open_window(BROWSER, MockWindow(2), front);
    attacher.handle(AttachEvent::FocusedWindowChanged, t0);
    assert_eq!(sys.observed(), Some(MockWindow(2)));

    sys.close_window(MockWindow(2));
    attacher.handle(AttachEvent::WindowDestroyed, t0 + ms(1));
    assert!(attacher.tracked_window().is_none());
    assert_eq!(sys.observed(), None);
    // The application watch survives the window, so the focus change that
    // follows a close is still delivered.
    assert_eq!(sys.observed_app().as_deref(), Some(BROWSER));
    assert_eq!(sys.counts().app_unobserves, 0);
    attacher.handle(AttachEvent::FocusedWindowChanged, t0 + ms(2));
    assert_eq!(sys.observed(), Some(MockWindow(1)));
    assert_eq!(
        delegate.last(),
        Some(Command::Position {
            frame: COMPANION,
            animated: true,
        })
    );
}

#[test]
fn background_launch_keeps_companion_hidden() {
    let sys = MockSystem::new();
    sys.set_own_app(OWN);
    sys.activate(OTHER);
    let delegate = RecordingDelegate::new(WIDTH);
    let mut attacher = Attacher::new(sys.clone(), delegate.clone(), AttachCfg::default());
    attacher.enable(BROWSER, Side::Right);
    sys.launch(BROWSER);
    attacher.handle(
        AttachEvent::AppLaunched {
            app_id: Some(BROWSER.to_string()),
        },
        Instant::now(),
    );
    assert_eq!(delegate.commands(), vec![Command::Hide, Command::Hide]);
    assert_eq!(sys.counts().observes, 0);
}
