//! sidecar-attach: keep a companion window docked beside another
//! application's window.
//!
//! The engine is platform independent. It talks to the OS through the
//! [`WindowSystem`] trait (permission gate, window discovery primitives,
//! geometry reads, display enumeration, event subscriptions) and moves the
//! companion through an [`AttachDelegate`]. The macOS implementation lives in
//! the `mac-attach` crate.
//!
//! Flow:
//! - The host calls [`Attacher::enable`] with a target bundle identifier and a
//!   [`Side`].
//! - OS notifications arrive as [`AttachEvent`]s via [`Attacher::handle`].
//!   Moves and resizes are debounced; destruction, termination and
//!   activation act immediately.
//! - Recomputation discovers the frontmost target window, reads its frame,
//!   resolves the display it sits on and computes the companion frame, then
//!   issues a position or hide command.
//!
//! Time is explicit: the host polls [`Attacher::next_deadline`] and calls
//! [`Attacher::fire_due`] from its run loop.

mod attacher;
mod config;
mod event;
mod frame;
pub mod geom;
pub mod screen;
mod system;
mod timer;

pub mod test_support;

pub use attacher::{AttachConfig, Attacher};
pub use config::AttachCfg;
pub use event::AttachEvent;
pub use frame::{MIN_TARGET_WIDTH, Side, calculate_frame, place_beside};
pub use geom::Rect;
pub use screen::{DisplayId, Displays, Screen, ScreenResolver};
pub use system::{AppState, AttachDelegate, WindowSystem, find_frontmost_window};
pub use timer::Debounce;
