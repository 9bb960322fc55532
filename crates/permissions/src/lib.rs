//! Accessibility permission checks for sidecar.
//!
//! Attaching to another application's window needs the global Accessibility
//! permission. This crate exposes two calls:
//! - `accessibility_ok()` checks without side effects.
//! - `request_accessibility()` asks macOS to show its consent dialog. The
//!   dialog is asynchronous; a grant shows up in a later `accessibility_ok()`.
//!
//! On other platforms both are inert and permission is never granted.

#[cfg(target_os = "macos")]
mod mac {
    use std::ffi::c_void;

    use core_foundation::{
        base::TCFType, boolean::CFBoolean, dictionary::CFDictionary, string::CFString,
    };

    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrusted() -> bool;
        fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;
    }

    /// Options key asking the check to prompt when untrusted.
    const PROMPT_KEY: &str = "AXTrustedCheckOptionPrompt";

    pub fn accessibility_ok() -> bool {
        unsafe { AXIsProcessTrusted() }
    }

    pub fn request_accessibility() -> bool {
        let key = CFString::new(PROMPT_KEY);
        let pairs = [(key.as_CFType(), CFBoolean::true_value().as_CFType())];
        let options = CFDictionary::from_CFType_pairs(&pairs);
        unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef().cast()) }
    }
}

/// Whether this process may read and observe other applications' windows.
pub fn accessibility_ok() -> bool {
    #[cfg(target_os = "macos")]
    {
        mac::accessibility_ok()
    }
    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}

/// Trigger the system consent dialog if permission is missing.
///
/// Returns the trust state at the time of the call; `false` does not mean the
/// user declined, only that they have not granted yet.
pub fn request_accessibility() -> bool {
    #[cfg(target_os = "macos")]
    {
        mac::request_accessibility()
    }
    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}
