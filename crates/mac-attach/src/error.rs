use thiserror::Error;

/// Failures of the AX and AppKit calls behind [`crate::MacSystem`].
///
/// These never reach the attachment engine; the trait boundary collapses
/// them into `None`/`false` after logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No running instance of the requested application.
    #[error("Application not running")]
    NotRunning,

    /// Failed to create an Accessibility API application element.
    #[error("Failed to create AX application element")]
    AppElement,

    /// An Accessibility API operation failed with the given error code.
    #[error("AX operation failed: code {0}")]
    AxCode(i32),

    /// The AX element became invalid (e.g., window closed) during the operation.
    #[error("AX element invalid (window gone)")]
    WindowGone,

    /// The requested attribute or operation is not supported.
    #[error("Unsupported attribute")]
    Unsupported,

    /// Operation must be executed on the main thread.
    #[error("Operation requires main thread")]
    MainThread,

    /// `AXObserverCreate` refused the target process.
    #[error("AXObserverCreate failed: code {0}")]
    ObserverCreate(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_codes() {
        assert_eq!(Error::AxCode(-25204).to_string(), "AX operation failed: code -25204");
        assert_eq!(
            Error::ObserverCreate(-25211).to_string(),
            "AXObserverCreate failed: code -25211"
        );
    }
}
