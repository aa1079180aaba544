use std::fmt;

/// Failures that prevent the toolkit backend from starting.
#[derive(Debug)]
pub enum PlatformError {
    /// The native event loop could not be created, e.g. no usable display.
    EventLoop(String),
    /// The window icon could not be decoded.
    Icon(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::EventLoop(msg) => write!(f, "cannot start event loop: {msg}"),
            PlatformError::Icon(msg) => write!(f, "cannot load window icon: {msg}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Report an unrecoverable platform error and terminate the process.
pub fn fatal_error(message: &str) -> ! {
    tracing::error!(%message, "fatal platform error");
    eprintln!("{message}");
    std::process::abort();
}
