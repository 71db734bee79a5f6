//! In-memory [`Document`] used by tests and by hosts without a rendering engine.
//!
//! Nodes live in an arena and are never freed; removal only detaches them, so
//! stale [`NodeId`]s stay valid handles to disconnected nodes.

use crate::document::{
    Document, InjectedElement, Location, NodeType, Point, Rect, SheetAccessError, StyleRule,
    StyleSheetRules,
};
use crate::vnode::VNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;").replace('\u{a0}', "&nbsp;"));
    out.push('"');
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        styles: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
}

/// A stylesheet attached to a [`VirtualDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualStyleSheet {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub rules: Vec<StyleRule>,
    /// Mimics a sheet whose `cssRules` throws
    #[serde(default)]
    pub cross_origin: bool,
}

impl VirtualStyleSheet {
    pub fn inline(rules: Vec<StyleRule>) -> Self {
        Self {
            href: None,
            rules,
            cross_origin: false,
        }
    }

    pub fn cross_origin(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            rules: Vec::new(),
            cross_origin: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VirtualDocument {
    nodes: Vec<Slot>,
    root: NodeId,
    sheets: Vec<VirtualStyleSheet>,
    scroll: Point,
    location: Location,
    body_cursor: String,
}

impl VirtualDocument {
    /// Build a document whose root element is `root`
    pub fn new(root: VNode) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            sheets: Vec::new(),
            scroll: Point::default(),
            location: Location::default(),
            body_cursor: String::new(),
        };
        doc.root = doc.insert(root, None);
        doc
    }

    /// Build `<html><head>..</head><body>..</body></html>`
    pub fn with_page(head: Vec<VNode>, body: Vec<VNode>) -> Self {
        Self::new(
            VNode::element("html")
                .with_child(VNode::element("head").with_children(head))
                .with_child(VNode::element("body").with_children(body)),
        )
    }

    fn insert(&mut self, node: VNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let (data, children) = match node {
            VNode::Element {
                tag,
                attributes,
                children,
            } => (
                NodeData::Element {
                    tag,
                    attributes,
                    styles: Vec::new(),
                },
                children,
            ),
            VNode::Text { content } => (NodeData::Text(content), Vec::new()),
            VNode::Comment { content } => (NodeData::Comment(content), Vec::new()),
        };
        self.nodes.push(Slot {
            data,
            parent,
            children: Vec::new(),
            rect: None,
        });
        for child in children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add_style_sheet(&mut self, sheet: VirtualStyleSheet) {
        self.sheets.push(sheet);
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    /// Give a node a layout box so hit testing can find it
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(slot) = self.nodes.get_mut(node.0) {
            slot.rect = Some(rect);
        }
    }

    pub fn body_cursor(&self) -> &str {
        &self.body_cursor
    }

    /// First connected element with the given id
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_by_id(id).into_iter().next()
    }

    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { styles, .. } => styles
                .iter()
                .find(|(key, _)| key == property)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// Concatenated text of a node's subtree
    pub fn text_of(&self, node: NodeId) -> String {
        match &self.nodes[node.0].data {
            NodeData::Text(content) => content.clone(),
            NodeData::Comment(_) => String::new(),
            NodeData::Element { .. } => self.nodes[node.0]
                .children
                .iter()
                .map(|child| self.text_of(*child))
                .collect(),
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            match attributes.iter_mut().find(|(name, _)| name == key) {
                Some(existing) => existing.1 = value.to_string(),
                None => attributes.push((key.to_string(), value.to_string())),
            }
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    fn serialize(&self, node: NodeId, raw_text: bool, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(content) if raw_text => out.push_str(content),
            NodeData::Text(content) => out.push_str(&escape_text(content)),
            NodeData::Comment(content) => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            NodeData::Element { tag, attributes, styles } => {
                let tag = tag.to_lowercase();
                out.push('<');
                out.push_str(&tag);
                for (name, value) in attributes {
                    push_attribute(out, name, value);
                }
                if !styles.is_empty() {
                    let inline = styles
                        .iter()
                        .map(|(key, value)| format!("{}: {};", key, value))
                        .collect::<Vec<_>>()
                        .join(" ");
                    push_attribute(out, "style", &inline);
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                self.serialize_children(node, RAW_TEXT_ELEMENTS.contains(&tag.as_str()), out);
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
        }
    }

    fn serialize_children(&self, node: NodeId, raw_text: bool, out: &mut String) {
        for child in &self.nodes[node.0].children {
            self.serialize(*child, raw_text, out);
        }
    }

    /// Connected nodes in document order
    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    fn child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.has_tag(*child, tag))
    }

    fn has_tag(&self, node: NodeId, wanted: &str) -> bool {
        matches!(&self.nodes[node.0].data, NodeData::Element { tag, .. } if tag.eq_ignore_ascii_case(wanted))
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }
}

impl Document for VirtualDocument {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn head(&self) -> Option<NodeId> {
        self.child_element(self.root, "head")
    }

    fn body(&self) -> Option<NodeId> {
        self.child_element(self.root, "body")
    }

    fn node_type(&self, node: &NodeId) -> NodeType {
        match self.nodes[node.0].data {
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Other,
        }
    }

    fn tag_name(&self, node: &NodeId) -> String {
        match &self.nodes[node.0].data {
            NodeData::Element { tag, .. } => tag.clone(),
            _ => String::new(),
        }
    }

    fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn text_content(&self, node: &NodeId) -> String {
        match &self.nodes[node.0].data {
            NodeData::Text(content) | NodeData::Comment(content) => content.clone(),
            NodeData::Element { .. } => self.text_of(*node),
        }
    }

    fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        let raw_text = match &self.nodes[node.0].data {
            NodeData::Element { tag, .. } => RAW_TEXT_ELEMENTS.contains(&tag.to_lowercase().as_str()),
            _ => false,
        };
        self.serialize_children(*node, raw_text, &mut out);
        out
    }

    fn outer_html(&self, node: &NodeId) -> String {
        let raw_text = self.nodes[node.0]
            .parent
            .map(|parent| match &self.nodes[parent.0].data {
                NodeData::Element { tag, .. } => RAW_TEXT_ELEMENTS.contains(&tag.to_lowercase().as_str()),
                _ => false,
            })
            .unwrap_or(false);
        let mut out = String::new();
        self.serialize(*node, raw_text, &mut out);
        out
    }

    fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.has_tag(*id, tag))
            .collect()
    }

    fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|node| self.attribute(node, "id").as_deref() == Some(id))
            .collect()
    }

    fn element_from_point(&self, point: Point) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.node_type(id) == NodeType::Element)
            .filter(|id| {
                self.nodes[id.0]
                    .rect
                    .map(|rect| rect.contains(point))
                    .unwrap_or(false)
            })
            .last()
    }

    fn bounding_client_rect(&self, node: &NodeId) -> Rect {
        self.nodes[node.0].rect.unwrap_or_default()
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn style_sheets(&self) -> Vec<StyleSheetRules> {
        self.sheets
            .iter()
            .map(|sheet| {
                if sheet.cross_origin {
                    Err(SheetAccessError::CrossOrigin {
                        href: sheet.href.clone().unwrap_or_default(),
                    })
                } else {
                    Ok(sheet.rules.clone())
                }
            })
            .collect()
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn append_to_body(&mut self, element: &InjectedElement) -> Option<NodeId> {
        let body = self.body()?;
        let node = self.insert(
            VNode::element(element.tag.clone()).with_id(element.id.clone()),
            Some(body),
        );
        self.nodes[body.0].children.push(node);
        let styles = element
            .styles
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect::<Vec<_>>();
        self.set_styles(&node, &styles);
        Some(node)
    }

    fn set_styles(&mut self, node: &NodeId, new_styles: &[(&str, String)]) {
        if let NodeData::Element { styles, .. } = &mut self.nodes[node.0].data {
            for (key, value) in new_styles {
                match styles.iter_mut().find(|(name, _)| name == key) {
                    Some(existing) => existing.1 = value.clone(),
                    None => styles.push((key.to_string(), value.clone())),
                }
            }
        }
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        let old_children = std::mem::take(&mut self.nodes[node.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.insert(VNode::text(text), Some(*node));
        self.nodes[node.0].children.push(text_node);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn set_body_cursor(&mut self, cursor: &str) {
        self.body_cursor = cursor.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StyleRule;

    fn sample() -> VirtualDocument {
        VirtualDocument::with_page(
            vec![VNode::element("link")
                .with_attr("rel", "stylesheet")
                .with_attr("href", "/a.css")],
            vec![
                VNode::element("div")
                    .with_id("outer")
                    .with_child(VNode::element("span").with_id("inner")),
                VNode::element("p").with_child(VNode::text("tail")),
            ],
        )
    }

    #[test]
    fn test_head_and_body() {
        let doc = sample();
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.tag_name(&head), "head");
        assert_eq!(doc.tag_name(&body), "body");
        assert_eq!(doc.children(&body).len(), 2);
    }

    #[test]
    fn test_elements_by_tag_name_in_document_order() {
        let doc = VirtualDocument::with_page(
            vec![VNode::element("script").with_attr("src", "1.js")],
            vec![
                VNode::element("div").with_child(VNode::element("script").with_attr("src", "2.js")),
                VNode::element("script").with_attr("src", "3.js"),
            ],
        );
        let sources: Vec<_> = doc
            .elements_by_tag_name("script")
            .iter()
            .filter_map(|node| doc.attribute(node, "src"))
            .collect();
        assert_eq!(sources, vec!["1.js", "2.js", "3.js"]);
    }

    #[test]
    fn test_hit_testing_prefers_topmost() {
        let mut doc = sample();
        let outer = doc.find_by_id("outer").unwrap();
        let inner = doc.find_by_id("inner").unwrap();
        doc.set_rect(outer, Rect::new(0.0, 0.0, 100.0, 100.0));
        doc.set_rect(inner, Rect::new(10.0, 10.0, 20.0, 20.0));

        assert_eq!(doc.element_from_point(Point::new(15.0, 15.0)), Some(inner));
        assert_eq!(doc.element_from_point(Point::new(50.0, 50.0)), Some(outer));
        assert_eq!(doc.element_from_point(Point::new(500.0, 50.0)), None);
    }

    #[test]
    fn test_append_and_remove() {
        let mut doc = sample();
        let node = doc
            .append_to_body(&InjectedElement::new("div", "overlay").with_style("position", "absolute"))
            .unwrap();
        assert_eq!(doc.elements_by_id("overlay"), vec![node]);
        assert_eq!(doc.inline_style(node, "position").as_deref(), Some("absolute"));

        doc.remove(&node);
        doc.remove(&node);
        assert!(doc.elements_by_id("overlay").is_empty());
        assert!(!doc.is_connected(node));
    }

    #[test]
    fn test_removed_nodes_are_not_hit() {
        let mut doc = sample();
        let outer = doc.find_by_id("outer").unwrap();
        doc.set_rect(outer, Rect::new(0.0, 0.0, 100.0, 100.0));
        doc.remove(&outer);
        assert_eq!(doc.element_from_point(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = sample();
        let outer = doc.find_by_id("outer").unwrap();
        doc.set_text(&outer, "<b>raw</b>");
        assert_eq!(doc.text_of(outer), "<b>raw</b>");
        assert!(doc.find_by_id("inner").is_none());
    }

    #[test]
    fn test_cross_origin_sheet_is_an_error() {
        let mut doc = sample();
        doc.add_style_sheet(VirtualStyleSheet::inline(vec![StyleRule::new(".a")]));
        doc.add_style_sheet(VirtualStyleSheet::cross_origin("https://cdn.example/x.css"));

        let sheets = doc.style_sheets();
        assert_eq!(sheets.len(), 2);
        assert!(sheets[0].is_ok());
        assert!(matches!(
            &sheets[1],
            Err(SheetAccessError::CrossOrigin { href }) if href == "https://cdn.example/x.css"
        ));
    }

    #[test]
    fn test_inner_html_serializes_like_the_browser() {
        let doc = VirtualDocument::with_page(
            vec![VNode::element("style").with_child(VNode::text(".a > .b { color: red; }"))],
            vec![
                VNode::element("pre").with_child(VNode::text("  keep\n  spacing")),
                VNode::comment(" note "),
                VNode::element("p")
                    .with_attr("title", "\"q\" & a")
                    .with_child(VNode::text("1 < 2"))
                    .with_child(VNode::element("br")),
            ],
        );
        let body = doc.body().unwrap();
        assert_eq!(
            doc.inner_html(&body),
            "<pre>  keep\n  spacing</pre><!-- note --><p title=\"&quot;q&quot; &amp; a\">1 &lt; 2<br></p>"
        );

        let style = doc.elements_by_tag_name("style")[0];
        assert_eq!(doc.outer_html(&style), "<style>.a > .b { color: red; }</style>");
    }

    #[test]
    fn test_class_list_and_lang() {
        let doc = VirtualDocument::new(
            VNode::element("html")
                .with_attr("lang", "fr")
                .with_child(VNode::element("body").with_child(
                    VNode::element("div").with_class("  a   b ").with_id(""),
                )),
        );
        let div = doc.elements_by_tag_name("div")[0];
        assert_eq!(doc.class_list(&div), vec!["a", "b"]);
        assert_eq!(doc.element_id(&div), None);
        assert_eq!(doc.lang().as_deref(), Some("fr"));
    }
}
