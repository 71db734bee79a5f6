//! # CopyKit Capture
//!
//! Point at an element on a live page and copy a clipboard-ready rendition of
//! it: its markup, the authored CSS rules that name it, and the page's
//! external stylesheet references.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ picker: Idle/Active session, overlay, preview │
//! └──────────────────────────────────────────────┘
//!                     ↓ click
//! ┌──────────────────────────────────────────────┐
//! │ assembler: mode → payload                     │
//! │  - css_rules: exact .class / #id attribution  │
//! │  - references: <link> / <script> collection   │
//! │  - printer: indented markup                   │
//! └──────────────────────────────────────────────┘
//!                     ↓
//! ┌──────────────────────────────────────────────┐
//! │ host: clipboard, toast, deactivate notice     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The live page is reached only through [`copykit_dom::Document`], so every
//! algorithm here runs against [`copykit_dom::VirtualDocument`] in tests.

pub mod assembler;
pub mod config;
pub mod css_rules;
pub mod error;
pub mod host;
pub mod mode;
pub mod picker;
pub mod printer;
pub mod references;
pub mod standalone;

pub use assembler::{assemble, style_block};
pub use config::CaptureConfig;
pub use css_rules::{attribute_rules, authored_css, MatchedRule, MatchedRuleSet};
pub use error::{CaptureError, CaptureResult, ClipboardError};
pub use host::{CopyTicket, Host, Listener};
pub use mode::{OutputMode, ToggleEvent};
pub use picker::{CaptureSession, EventDisposition, Picker, PickerState};
pub use printer::{pretty_print, pretty_print_children, PrintOptions};
pub use references::{script_tags, stylesheet_links, UrlBase};

pub use copykit_dom as dom;
