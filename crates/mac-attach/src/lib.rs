//! mac-attach: the macOS side of sidecar's window attachment.
//!
//! [`MacSystem`] implements [`sidecar_attach::WindowSystem`] on top of:
//! - Accessibility (AX) attribute reads for window lists, frames and the
//!   minimized flag.
//! - `AXObserver`s fed into the main run loop: one on the target window for
//!   moves, resizes and destruction, and one on its application for focused
//!   window changes.
//! - `NSWorkspace` activation, termination and launch notifications, plus
//!   `NSApplicationDidChangeScreenParametersNotification` for display changes.
//! - `NSScreen` enumeration.
//!
//! Every OS notification is translated into a
//! [`sidecar_attach::AttachEvent`] and handed to the sink passed to
//! [`MacSystem::new`]. The sink must not call back into the attacher
//! synchronously; post the event to the host's run loop instead.
//!
//! All of this is main-thread only. On other targets the crate is empty.

#[cfg(target_os = "macos")]
mod apps;
#[cfg(target_os = "macos")]
mod ax;
#[cfg(target_os = "macos")]
mod browser;
mod error;
#[cfg(target_os = "macos")]
mod observer;
#[cfg(target_os = "macos")]
mod screens;
#[cfg(target_os = "macos")]
mod system;
#[cfg(target_os = "macos")]
mod workspace;

// Ensure Accessibility symbols link.
#[cfg(target_os = "macos")]
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {}

#[cfg(target_os = "macos")]
pub use browser::default_browser;
pub use error::{Error, Result};
#[cfg(target_os = "macos")]
pub use system::{MacSystem, MacWindow, Sink};
