//! Capabilities the engine calls but does not implement.
//!
//! Delivery is single-threaded and strictly serialized: the host never
//! invokes the picker re-entrantly from inside one of these calls.

use std::time::Duration;

/// Page events the picker listens to while active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerMove,
    /// Registered in the capture phase so the page cannot swallow it first
    Click,
}

impl Listener {
    pub fn event_name(self) -> &'static str {
        match self {
            Listener::PointerMove => "mousemove",
            Listener::Click => "click",
        }
    }

    pub fn use_capture(self) -> bool {
        matches!(self, Listener::Click)
    }
}

/// Identifies one in-flight clipboard write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CopyTicket(pub u64);

pub trait Host {
    fn subscribe(&mut self, listener: Listener);

    /// Removing a listener that is not attached does nothing
    fn unsubscribe(&mut self, listener: Listener);

    /// Start an asynchronous clipboard write.
    ///
    /// The host later reports the outcome through
    /// [`crate::Picker::clipboard_settled`] with the same ticket.
    fn write_clipboard(&mut self, ticket: CopyTicket, text: String);

    /// Transient message that dismisses itself after `duration`
    fn show_toast(&mut self, message: &str, duration: Duration);

    /// Blocking user-facing warning
    fn alert(&mut self, message: &str);

    /// Tell the extension runtime the session ended
    fn notify_deactivated(&mut self);
}
