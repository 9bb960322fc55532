//! Companion frame calculation.

use serde::{Deserialize, Serialize};

use crate::{
    geom::Rect,
    screen::{Displays, ScreenResolver},
};

/// Narrowest target window that still gets a companion.
pub const MIN_TARGET_WIDTH: f64 = 600.0;

/// Which side of the target the companion docks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Place a `width`-wide companion beside `target` within `visible`.
///
/// The companion always shares the target's bottom edge and height. Returns
/// `None` when there is not enough room on the requested side.
pub fn place_beside(target: &Rect, width: f64, side: Side, visible: &Rect) -> Option<Rect> {
    let x = match side {
        Side::Left => {
            let x = target.left() - width;
            if x < visible.left() {
                return None;
            }
            x
        }
        Side::Right => {
            let x = target.right();
            if x + width > visible.right() {
                return None;
            }
            x
        }
    };
    Some(Rect::new(x, target.y, width, target.h))
}

/// Compute the companion frame for `target`, or `None` when attachment is
/// infeasible (target narrower than `min_width`, no display, no room).
pub fn calculate_frame<D: Displays + ?Sized>(
    target: &Rect,
    width: f64,
    side: Side,
    min_width: f64,
    screens: &mut ScreenResolver,
    displays: &D,
) -> Option<Rect> {
    if target.w < min_width {
        return None;
    }
    let screen = screens.resolve(target, displays)?;
    place_beside(target, width, side, &screen.visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Screen;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    const TARGET: Rect = Rect::new(100.0, 50.0, 800.0, 600.0);

    struct One;

    impl Displays for One {
        fn screens(&self) -> Vec<Screen> {
            vec![Screen {
                id: 1,
                frame: SCREEN,
                visible: SCREEN,
            }]
        }
        fn main_screen(&self) -> Option<Screen> {
            self.screens().first().copied()
        }
    }

    #[test]
    fn right_side_placement() {
        let got = place_beside(&TARGET, 340.0, Side::Right, &SCREEN);
        assert_eq!(got, Some(Rect::new(900.0, 50.0, 340.0, 600.0)));
    }

    #[test]
    fn left_side_without_room_is_rejected() {
        assert_eq!(place_beside(&TARGET, 340.0, Side::Left, &SCREEN), None);
    }

    #[test]
    fn left_side_with_room() {
        let t = Rect::new(500.0, 50.0, 800.0, 600.0);
        let got = place_beside(&t, 340.0, Side::Left, &SCREEN);
        assert_eq!(got, Some(Rect::new(160.0, 50.0, 340.0, 600.0)));
    }

    #[test]
    fn right_side_exactly_flush_fits() {
        let t = Rect::new(780.0, 0.0, 800.0, 600.0);
        let got = place_beside(&t, 340.0, Side::Right, &SCREEN);
        assert_eq!(got.map(|r| r.right()), Some(1920.0));
    }

    #[test]
    fn narrow_target_rejected_before_screen_lookup() {
        let mut screens = ScreenResolver::new();
        let narrow = Rect::new(100.0, 50.0, 599.0, 600.0);
        let got = calculate_frame(
            &narrow,
            340.0,
            Side::Right,
            MIN_TARGET_WIDTH,
            &mut screens,
            &One,
        );
        assert_eq!(got, None);
        assert!(screens.cached().is_none());
    }

    #[test]
    fn calculate_resolves_screen() {
        let mut screens = ScreenResolver::new();
        let got = calculate_frame(
            &TARGET,
            340.0,
            Side::Right,
            MIN_TARGET_WIDTH,
            &mut screens,
            &One,
        );
        assert_eq!(got, Some(Rect::new(900.0, 50.0, 340.0, 600.0)));
        assert_eq!(screens.cached().map(|s| s.id), Some(1));
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Side::Right).expect("serialize"),
            "\"right\""
        );
    }
}
