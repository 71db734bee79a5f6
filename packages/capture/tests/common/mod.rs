#![allow(dead_code)]

use copykit_capture::{CopyTicket, Host, Listener};
use std::collections::HashSet;
use std::time::Duration;

/// Host that records every call instead of touching a browser
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub listeners: HashSet<Listener>,
    pub subscribe_calls: usize,
    pub writes: Vec<(CopyTicket, String)>,
    pub toasts: Vec<(String, Duration)>,
    pub alerts: Vec<String>,
    pub deactivation_notices: usize,
}

impl Host for RecordingHost {
    fn subscribe(&mut self, listener: Listener) {
        self.subscribe_calls += 1;
        self.listeners.insert(listener);
    }

    fn unsubscribe(&mut self, listener: Listener) {
        self.listeners.remove(&listener);
    }

    fn write_clipboard(&mut self, ticket: CopyTicket, text: String) {
        self.writes.push((ticket, text));
    }

    fn show_toast(&mut self, message: &str, duration: Duration) {
        self.toasts.push((message.to_string(), duration));
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn notify_deactivated(&mut self) {
        self.deactivation_notices += 1;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
