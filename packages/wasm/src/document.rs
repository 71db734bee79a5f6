//! [`Document`] over the page's real DOM.

use copykit_dom::{
    Declaration, Document, InjectedElement, Location, NodeType, Point, Rect, SheetAccessError,
    StyleRule, StyleSheetRules,
};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleRule, CssStyleSheet, Element, HtmlElement, Node, Window};

pub struct BrowserDocument {
    window: Window,
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn new(window: Window, document: web_sys::Document) -> Self {
        Self { window, document }
    }
}

pub(crate) fn log_js_error(context: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!(error = ?err, "{}", context);
    }
}

/// Escape a value for use inside a double-quoted attribute selector
pub(crate) fn attribute_selector_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn read_rules(sheet: &CssStyleSheet) -> StyleSheetRules {
    let rule_list = sheet.css_rules().map_err(|_| SheetAccessError::CrossOrigin {
        href: sheet.href().ok().flatten().unwrap_or_default(),
    })?;

    let mut rules = Vec::with_capacity(rule_list.length() as usize);
    for index in 0..rule_list.length() {
        let Some(rule) = rule_list.item(index) else {
            continue;
        };
        match rule.dyn_ref::<CssStyleRule>() {
            Some(style_rule) => {
                let style = style_rule.style();
                let declarations = (0..style.length())
                    .map(|i| {
                        let property = style.item(i);
                        let value = style.get_property_value(&property).unwrap_or_default();
                        Declaration::new(property, value)
                    })
                    .collect();
                rules.push(StyleRule {
                    selector_text: Some(style_rule.selector_text()),
                    declarations,
                });
            }
            None => rules.push(StyleRule::grouping()),
        }
    }
    Ok(rules)
}

impl Document for BrowserDocument {
    type Node = Node;

    fn document_element(&self) -> Option<Node> {
        self.document.document_element().map(Node::from)
    }

    fn head(&self) -> Option<Node> {
        self.document.head().map(Node::from)
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Node::from)
    }

    fn node_type(&self, node: &Node) -> NodeType {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeType::Element,
            Node::TEXT_NODE => NodeType::Text,
            _ => NodeType::Other,
        }
    }

    fn tag_name(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(Element::tag_name)
            .unwrap_or_default()
    }

    fn attributes(&self, node: &Node) -> Vec<(String, String)> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let attributes = element.attributes();
        (0..attributes.length())
            .filter_map(|index| attributes.item(index))
            .map(|attr| (attr.name(), attr.value()))
            .collect()
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn class_list(&self, node: &Node) -> Vec<String> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let classes = element.class_list();
        (0..classes.length())
            .filter_map(|index| classes.item(index))
            .collect()
    }

    fn element_id(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .map(Element::id)
            .filter(|id| !id.is_empty())
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let children = node.child_nodes();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .collect()
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn inner_html(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(Element::inner_html)
            .unwrap_or_default()
    }

    fn outer_html(&self, node: &Node) -> String {
        match node.dyn_ref::<Element>() {
            Some(element) => element.outer_html(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn elements_by_tag_name(&self, tag: &str) -> Vec<Node> {
        let collection = self.document.get_elements_by_tag_name(tag);
        (0..collection.length())
            .filter_map(|index| collection.item(index))
            .map(Node::from)
            .collect()
    }

    fn elements_by_id(&self, id: &str) -> Vec<Node> {
        let selector = format!("[id=\"{}\"]", attribute_selector_value(id));
        match self.document.query_selector_all(&selector) {
            Ok(list) => (0..list.length())
                .filter_map(|index| list.item(index))
                .collect(),
            Err(err) => {
                warn!(error = ?err, id, "Id lookup failed");
                Vec::new()
            }
        }
    }

    fn element_from_point(&self, point: Point) -> Option<Node> {
        self.document
            .element_from_point(point.x as f32, point.y as f32)
            .map(Node::from)
    }

    fn bounding_client_rect(&self, node: &Node) -> Rect {
        node.dyn_ref::<Element>()
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
            })
            .unwrap_or_default()
    }

    fn scroll_offset(&self) -> Point {
        Point::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn style_sheets(&self) -> Vec<StyleSheetRules> {
        let sheets = self.document.style_sheets();
        (0..sheets.length())
            .filter_map(|index| sheets.item(index))
            .map(|sheet| match sheet.dyn_ref::<CssStyleSheet>() {
                Some(css_sheet) => read_rules(css_sheet),
                None => Err(SheetAccessError::Unavailable(
                    "not a CSS stylesheet".to_string(),
                )),
            })
            .collect()
    }

    fn location(&self) -> Location {
        let location = self.window.location();
        Location::new(
            location.origin().unwrap_or_default(),
            location.href().unwrap_or_default(),
        )
    }

    fn append_to_body(&mut self, spec: &InjectedElement) -> Option<Node> {
        let body = self.document.body()?;
        let element = match self.document.create_element(&spec.tag) {
            Ok(element) => element,
            Err(err) => {
                warn!(error = ?err, tag = %spec.tag, "Cannot create element");
                return None;
            }
        };
        element.set_id(&spec.id);
        let node = Node::from(element);

        let styles = spec
            .styles
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect::<Vec<_>>();
        self.set_styles(&node, &styles);

        log_js_error("Cannot append element", body.append_child(&node).map(|_| ()));
        Some(node)
    }

    fn set_styles(&mut self, node: &Node, styles: &[(&str, String)]) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        for (property, value) in styles {
            log_js_error("Cannot set style", style.set_property(property, value));
        }
    }

    fn set_text(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn remove(&mut self, node: &Node) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.remove();
        } else if let Some(parent) = node.parent_node() {
            log_js_error("Cannot remove node", parent.remove_child(node).map(|_| ()));
        }
    }

    fn set_body_cursor(&mut self, cursor: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        let style = body.style();
        if cursor.is_empty() {
            log_js_error("Cannot reset cursor", style.remove_property("cursor").map(|_| ()));
        } else {
            log_js_error("Cannot set cursor", style.set_property("cursor", cursor));
        }
    }
}
