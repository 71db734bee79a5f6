//! # CopyKit DOM
//!
//! The capture engine never owns the live page. It reads and mutates it
//! through the [`Document`] capability defined here, which a browser host
//! implements over the real DOM and tests implement with [`VirtualDocument`].

pub mod document;
pub mod virtual_document;
pub mod vnode;

pub use document::{
    Declaration, Document, InjectedElement, Location, NodeType, Point, Rect, SheetAccessError,
    StyleRule, StyleSheetRules,
};
pub use virtual_document::{NodeId, VirtualDocument, VirtualStyleSheet};
pub use vnode::VNode;
