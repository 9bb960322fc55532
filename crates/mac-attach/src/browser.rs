use core_foundation::{
    base::TCFType,
    string::{CFString, CFStringRef},
};
use tracing::debug;

#[link(name = "CoreServices", kind = "framework")]
unsafe extern "C" {
    fn LSCopyDefaultHandlerForURLScheme(scheme: CFStringRef) -> CFStringRef;
}

/// Bundle identifier of the application registered for `http` URLs.
pub fn default_browser() -> Option<String> {
    let scheme = CFString::from_static_string("http");
    let handler = unsafe { LSCopyDefaultHandlerForURLScheme(scheme.as_concrete_TypeRef()) };
    if handler.is_null() {
        debug!("no default handler for http");
        return None;
    }
    let id = unsafe { CFString::wrap_under_create_rule(handler) }.to_string();
    debug!("default browser: {}", id);
    Some(id)
}
