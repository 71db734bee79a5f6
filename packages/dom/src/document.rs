//! The document capability the capture engine calls through.
//!
//! Node handles are borrowed views into a tree the engine does not own. A
//! handle kept across a page mutation may point at a detached node; callers
//! re-resolve on the next pointer move rather than tracking mutations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a style sheet's rule list could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetAccessError {
    #[error("cross-origin stylesheet '{href}' is not readable")]
    CrossOrigin { href: String },

    #[error("stylesheet rules unavailable: {0}")]
    Unavailable(String),
}

/// Rules of one stylesheet, or the reason they are hidden
pub type StyleSheetRules = Result<Vec<StyleRule>, SheetAccessError>;

/// Kind of a node, as far as serialization cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    /// Comments, processing instructions, doctypes
    Other,
}

/// A single `property: value` pair in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// A rule from a stylesheet's rule list.
///
/// Grouping rules (`@media`, `@keyframes`, ...) have no selector text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    pub selector_text: Option<String>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector_text: Some(selector.into()),
            declarations: Vec::new(),
        }
    }

    /// A rule without selector text, such as `@media`
    pub fn grouping() -> Self {
        Self {
            selector_text: None,
            declarations: Vec::new(),
        }
    }

    pub fn with_declaration(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.declarations.push(Declaration::new(property, value));
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport-relative box, as `getBoundingClientRect` reports it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.left + self.width
            && point.y >= self.top
            && point.y < self.top + self.height
    }
}

/// Where the page was loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Scheme, host and port, without a trailing slash
    pub origin: String,
    /// Full document URL
    pub href: String,
}

impl Location {
    pub fn new(origin: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            href: href.into(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("http://localhost", "http://localhost/")
    }
}

/// Description of an element the engine inserts into the page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedElement {
    pub tag: String,
    pub id: String,
    pub styles: Vec<(String, String)>,
}

impl InjectedElement {
    pub fn new(tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
            styles: Vec::new(),
        }
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }
}

/// Tree-query and mutation capability over a live document.
///
/// All calls happen on the page's single event loop; implementations need no
/// interior synchronization.
pub trait Document {
    type Node: Clone + PartialEq + fmt::Debug;

    fn document_element(&self) -> Option<Self::Node>;

    fn head(&self) -> Option<Self::Node>;

    fn body(&self) -> Option<Self::Node>;

    fn node_type(&self, node: &Self::Node) -> NodeType;

    /// Tag name as the document reports it (may be upper-case)
    fn tag_name(&self, node: &Self::Node) -> String;

    /// Attributes in source order
    fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Current class list, whitespace-split from the `class` attribute
    fn class_list(&self, node: &Self::Node) -> Vec<String> {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// The element's id, `None` when absent or empty
    fn element_id(&self, node: &Self::Node) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Raw character data of a text node
    fn text_content(&self, node: &Self::Node) -> String;

    /// Serialized markup of the node's children, as the page's own parser would emit it
    fn inner_html(&self, node: &Self::Node) -> String;

    /// Serialized markup of the node itself
    fn outer_html(&self, node: &Self::Node) -> String;

    /// Connected elements with the given tag, in document order
    fn elements_by_tag_name(&self, tag: &str) -> Vec<Self::Node>;

    /// Connected elements carrying the given id, in document order
    fn elements_by_id(&self, id: &str) -> Vec<Self::Node>;

    /// Topmost element under a viewport point
    fn element_from_point(&self, point: Point) -> Option<Self::Node>;

    fn bounding_client_rect(&self, node: &Self::Node) -> Rect;

    fn scroll_offset(&self) -> Point;

    /// One entry per stylesheet reachable from the document, in document order
    fn style_sheets(&self) -> Vec<StyleSheetRules>;

    fn location(&self) -> Location;

    /// `lang` attribute of the root element, if set
    fn lang(&self) -> Option<String> {
        self.document_element()
            .and_then(|root| self.attribute(&root, "lang"))
            .filter(|lang| !lang.is_empty())
    }

    /// Create an element and append it to the body
    fn append_to_body(&mut self, element: &InjectedElement) -> Option<Self::Node>;

    fn set_styles(&mut self, node: &Self::Node, styles: &[(&str, String)]);

    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Detach a node; removing an already detached node does nothing
    fn remove(&mut self, node: &Self::Node);

    /// Set the body's `cursor` style; an empty string restores the default
    fn set_body_cursor(&mut self, cursor: &str);
}
