use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What a capture puts on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Matched CSS, then markup
    #[default]
    All,
    Html,
    Css,
    /// Stylesheet references, then matched CSS
    #[serde(rename = "css+cdn")]
    CssCdn,
    Cdn,
    /// Standalone: every stylesheet reference on the page
    CdnOnly,
    /// Standalone: every script reference on the page
    JsOnly,
    /// Standalone: the whole document
    PageFull,
}

impl OutputMode {
    pub const ALL: [OutputMode; 8] = [
        OutputMode::All,
        OutputMode::Html,
        OutputMode::Css,
        OutputMode::CssCdn,
        OutputMode::Cdn,
        OutputMode::CdnOnly,
        OutputMode::JsOnly,
        OutputMode::PageFull,
    ];

    /// Parse a mode name; unknown names fall back to [`OutputMode::All`]
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::All => "all",
            OutputMode::Html => "html",
            OutputMode::Css => "css",
            OutputMode::CssCdn => "css+cdn",
            OutputMode::Cdn => "cdn",
            OutputMode::CdnOnly => "cdn-only",
            OutputMode::JsOnly => "js-only",
            OutputMode::PageFull => "page-full",
        }
    }

    /// Modes that copy immediately instead of starting the picker
    pub fn is_standalone(self) -> bool {
        matches!(
            self,
            OutputMode::CdnOnly | OutputMode::JsOnly | OutputMode::PageFull
        )
    }

    /// The mode the picker runs with; standalone modes degrade to `All`
    pub fn interactive(self) -> Self {
        if self.is_standalone() {
            OutputMode::All
        } else {
            self
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded `copykit-toggle` event detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent {
    Activate(OutputMode),
    Deactivate,
}

impl ToggleEvent {
    /// Accepts `true`/`false`, `{ "activate": .., "mode": .. }`, or nothing.
    pub fn from_detail(detail: Option<&Value>) -> Self {
        match detail {
            Some(Value::Bool(true)) => ToggleEvent::Activate(OutputMode::All),
            Some(Value::Object(fields)) => {
                if fields.get("activate").map(is_truthy).unwrap_or(false) {
                    let mode = fields
                        .get("mode")
                        .and_then(Value::as_str)
                        .map(OutputMode::parse)
                        .unwrap_or_default();
                    ToggleEvent::Activate(mode)
                } else {
                    ToggleEvent::Deactivate
                }
            }
            _ => ToggleEvent::Deactivate,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
