//! # Picker
//!
//! The interactive capture session. The picker is `Idle` until an
//! activation request arrives, then follows the pointer with a highlight
//! overlay and a live preview until a click captures the hovered element
//! or Escape / an external toggle cancels.
//!
//! ```text
//!   Idle ──activate(mode)──▶ Active ──pointer move──▶ Active
//!    ▲                         │
//!    └──── Escape / toggle ────┤
//!    └──── clipboard ok ◀──click (write in flight)
//! ```
//!
//! At most one overlay and one preview node exist at any time. Both are
//! created on activation after removing stale copies left by an earlier
//! session, and removed on every deactivation.

use crate::assembler::assemble;
use crate::config::CaptureConfig;
use crate::error::ClipboardError;
use crate::host::{CopyTicket, Host, Listener};
use crate::mode::{OutputMode, ToggleEvent};
use crate::printer::{pretty_print, PrintOptions};
use crate::standalone;
use copykit_dom::{Document, InjectedElement, Point};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

const COPIED_MESSAGE: &str = "✅ Copied successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Idle,
    Active,
}

/// Whether the host should cancel the page's default handling of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Prevent default and stop propagation
    Consumed,
    Ignored,
}

/// State of one interactive run, alive exactly while the picker is active
#[derive(Debug, Clone)]
pub struct CaptureSession<N> {
    pub mode: OutputMode,
    pub current: Option<N>,
    overlay: Option<N>,
    preview: Option<N>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCopy {
    Interactive,
    Standalone(OutputMode),
}

/// Owns the capture session for one page
pub struct Picker<D: Document, H: Host> {
    document: D,
    host: H,
    config: CaptureConfig,
    print_options: PrintOptions,
    session: Option<CaptureSession<D::Node>>,
    pending: BTreeMap<CopyTicket, PendingCopy>,
    next_ticket: u64,
}

impl<D: Document, H: Host> Picker<D, H> {
    pub fn new(document: D, host: H, config: CaptureConfig) -> Self {
        let print_options = PrintOptions {
            indent: config.indent.clone(),
        };
        Self {
            document,
            host,
            config,
            print_options,
            session: None,
            pending: BTreeMap::new(),
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> PickerState {
        if self.session.is_some() {
            PickerState::Active
        } else {
            PickerState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession<D::Node>> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> Option<OutputMode> {
        self.session.as_ref().map(|session| session.mode)
    }

    pub fn current_element(&self) -> Option<&D::Node> {
        self.session.as_ref().and_then(|session| session.current.as_ref())
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Clipboard writes whose outcome has not been reported yet
    pub fn pending_copies(&self) -> usize {
        self.pending.len()
    }

    pub fn handle_toggle(&mut self, event: ToggleEvent) {
        match event {
            ToggleEvent::Activate(mode) => self.activate(mode),
            ToggleEvent::Deactivate => self.deactivate(),
        }
    }

    /// Enter `Active`. Re-activating only switches the mode.
    pub fn activate(&mut self, mode: OutputMode) {
        let mode = mode.interactive();
        if let Some(session) = &mut self.session {
            debug!(mode = %mode, "Picker already active; updating mode");
            session.mode = mode;
            return;
        }

        let overlay = self.inject(overlay_element(&self.config.overlay_id));
        let preview = self.inject(preview_element(&self.config.preview_id));
        self.document.set_body_cursor(&self.config.picking_cursor);
        self.host.subscribe(Listener::PointerMove);
        self.host.subscribe(Listener::Click);

        self.session = Some(CaptureSession {
            mode,
            current: None,
            overlay,
            preview,
        });
        info!(mode = %mode, "Picker activated");
    }

    /// Return to `Idle` and clean the page. Safe to call when already idle.
    pub fn deactivate(&mut self) {
        if let Some(session) = self.session.take() {
            for node in session.overlay.iter().chain(session.preview.iter()) {
                self.document.remove(node);
            }
            info!(mode = %session.mode, "Picker deactivated");
        }

        let stray_ids = [
            self.config.overlay_id.clone(),
            self.config.preview_id.clone(),
            self.config.options_panel_id.clone(),
        ];
        for id in &stray_ids {
            self.remove_all_with_id(id);
        }

        self.document.set_body_cursor("");
        self.host.unsubscribe(Listener::PointerMove);
        self.host.unsubscribe(Listener::Click);
    }

    /// Re-resolve the hovered element and move the overlay and preview to it
    pub fn on_pointer_move(&mut self, point: Point) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(element) = self.document.element_from_point(point) else {
            return;
        };
        if session.overlay.as_ref() == Some(&element)
            || session.preview.as_ref() == Some(&element)
            || session.current.as_ref() == Some(&element)
        {
            return;
        }

        debug!(tag = %self.document.tag_name(&element), "Hovered element changed");
        let overlay = session.overlay.clone();
        let preview = session.preview.clone();

        if let Some(overlay) = &overlay {
            self.position_overlay(overlay, &element);
        }
        if let Some(preview) = &preview {
            let markup = pretty_print(&self.document, &element, &self.print_options);
            let text = truncate_preview(&markup, self.config.preview_max_chars);
            self.document.set_text(preview, &text);
            self.document
                .set_styles(preview, &[("display", "block".to_string())]);
        }

        if let Some(session) = &mut self.session {
            session.current = Some(element);
        }
    }

    /// Capture the hovered element. Clicks while idle are left to the page.
    pub fn on_click(&mut self) -> EventDisposition {
        let Some(session) = &self.session else {
            return EventDisposition::Ignored;
        };
        let mode = session.mode;

        if let Some(element) = session.current.clone() {
            let payload = assemble(&self.document, &element, mode, &self.print_options);
            info!(mode = %mode, bytes = payload.len(), "Capturing element");
            self.begin_copy(payload, PendingCopy::Interactive);
        }

        EventDisposition::Consumed
    }

    /// Escape cancels an active session without copying
    pub fn on_key_down(&mut self, key: &str) -> EventDisposition {
        if key != "Escape" || !self.is_active() {
            return EventDisposition::Ignored;
        }
        info!("Deactivating picker via Escape");
        self.deactivate();
        self.host.notify_deactivated();
        EventDisposition::Consumed
    }

    /// One-shot capture from the trigger UI; picker modes are ignored
    pub fn run_standalone(&mut self, mode: OutputMode) {
        let Some(result) = standalone::payload(&self.document, mode, &self.config) else {
            warn!(mode = %mode, "Not a standalone mode");
            return;
        };

        match result {
            Ok(payload) => self.begin_copy(payload, PendingCopy::Standalone(mode)),
            Err(err) => {
                error!(mode = %mode, error = %err, "Standalone capture failed");
                self.host.alert(standalone::failure_message(mode, &err));
            }
        }
    }

    /// Completion of a clipboard write started by this picker
    pub fn clipboard_settled(&mut self, ticket: CopyTicket, result: Result<(), ClipboardError>) {
        let Some(kind) = self.pending.remove(&ticket) else {
            warn!(ticket = ticket.0, "Clipboard completion for unknown ticket");
            return;
        };

        match (kind, result) {
            (PendingCopy::Interactive, Ok(())) => {
                self.host
                    .show_toast(COPIED_MESSAGE, self.config.toast_duration());
                self.deactivate();
                self.host.notify_deactivated();
            }
            (PendingCopy::Interactive, Err(err)) => {
                // session stays active so the user can click again
                warn!(error = %err, "Clipboard write failed");
            }
            (PendingCopy::Standalone(mode), Ok(())) => {
                self.host
                    .show_toast(standalone::success_message(mode), self.config.toast_duration());
            }
            (PendingCopy::Standalone(mode), Err(err)) => {
                error!(mode = %mode, error = %err, "Clipboard write failed");
                self.host.alert(standalone::failure_message(mode, &err.into()));
            }
        }
    }

    fn begin_copy(&mut self, payload: String, kind: PendingCopy) {
        let ticket = CopyTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, kind);
        self.host.write_clipboard(ticket, payload);
    }

    fn inject(&mut self, element: InjectedElement) -> Option<D::Node> {
        self.remove_all_with_id(&element.id);
        let node = self.document.append_to_body(&element);
        if node.is_none() {
            warn!(id = %element.id, "Document has no body; cannot inject element");
        }
        node
    }

    fn remove_all_with_id(&mut self, id: &str) {
        for node in self.document.elements_by_id(id) {
            self.document.remove(&node);
        }
    }

    fn position_overlay(&mut self, overlay: &D::Node, element: &D::Node) {
        let rect = self.document.bounding_client_rect(element);
        let scroll = self.document.scroll_offset();
        self.document.set_styles(
            overlay,
            &[
                ("top", px(scroll.y + rect.top)),
                ("left", px(scroll.x + rect.left)),
                ("width", px(rect.width)),
                ("height", px(rect.height)),
                ("display", "block".to_string()),
            ],
        );
    }
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

fn overlay_element(id: &str) -> InjectedElement {
    InjectedElement::new("div", id)
        .with_style("position", "absolute")
        .with_style("pointer-events", "none")
        .with_style("background-color", "rgba(0, 123, 255, 0.3)")
        .with_style("border", "2px dashed #007bff")
        .with_style("z-index", "999999")
        .with_style("box-sizing", "border-box")
        .with_style("transition", "all 0.1s ease")
        .with_style("display", "none")
}

fn preview_element(id: &str) -> InjectedElement {
    InjectedElement::new("pre", id)
        .with_style("position", "fixed")
        .with_style("right", "16px")
        .with_style("bottom", "16px")
        .with_style("max-width", "480px")
        .with_style("max-height", "40vh")
        .with_style("overflow", "hidden")
        .with_style("margin", "0")
        .with_style("padding", "8px 12px")
        .with_style("background", "rgba(30, 30, 30, 0.92)")
        .with_style("color", "#d4d4d4")
        .with_style("font", "12px/1.4 monospace")
        .with_style("white-space", "pre")
        .with_style("border-radius", "4px")
        .with_style("pointer-events", "none")
        .with_style("z-index", "1000000")
        .with_style("display", "none")
}

/// Cut to `max_chars` characters, marking the cut with an ellipsis
fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
