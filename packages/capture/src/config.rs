use crate::error::CaptureResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capture engine configuration.
///
/// Hosts pass it as JSON; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    /// DOM id of the hover highlight box
    pub overlay_id: String,

    /// DOM id of the live preview panel
    pub preview_id: String,

    /// DOM id of the confirmation toast
    pub toast_id: String,

    /// DOM id of the trigger UI panel removed on deactivation
    pub options_panel_id: String,

    /// Body cursor while picking
    pub picking_cursor: String,

    pub toast_duration_ms: u64,

    /// Preview text longer than this is cut and ellipsized
    pub preview_max_chars: usize,

    /// Indent unit of the markup printer
    pub indent: String,

    /// `lang` used for full-page captures when the page sets none
    pub default_lang: String,

    /// tracing level filter for hosts that install a subscriber
    pub log_level: String,
}

impl CaptureConfig {
    pub fn from_json(json: &str) -> CaptureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            overlay_id: "copykit-overlay".to_string(),
            preview_id: "copykit-preview".to_string(),
            toast_id: "copykit-alert".to_string(),
            options_panel_id: "copykit-options".to_string(),
            picking_cursor: "copy".to_string(),
            toast_duration_ms: 2000,
            preview_max_chars: 4000,
            indent: "  ".to_string(),
            default_lang: "en".to_string(),
            log_level: "info".to_string(),
        }
    }
}
