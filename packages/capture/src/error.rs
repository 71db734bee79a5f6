use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Clipboard write rejected by the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No CDN stylesheets found")]
    NoStylesheets,

    #[error("No JS scripts found")]
    NoScripts,

    #[error("Document has no body")]
    MissingBody,

    #[error("Cannot resolve '{href}' against '{base}': {source}")]
    InvalidUrl {
        href: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl CaptureError {
    /// Text shown to the user when a standalone capture aborts
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::NoStylesheets => "⚠️ No CDN stylesheets found.",
            CaptureError::NoScripts => "⚠️ No JS scripts found.",
            CaptureError::MissingBody => "❌ Error copying full page.",
            CaptureError::InvalidUrl { .. } | CaptureError::Clipboard(_) => {
                "❌ Failed to copy to clipboard."
            }
            CaptureError::Config(_) => "❌ CopyKit is misconfigured.",
        }
    }
}
