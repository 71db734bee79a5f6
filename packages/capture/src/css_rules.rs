//! Authored CSS rule attribution.
//!
//! A rule is attributed to an element when one of its comma-separated
//! selectors is exactly `.class` or `#id` of that element. Compound and
//! descendant selectors never match; there is no cascade resolution.

use copykit_dom::{Declaration, Document};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// A rule attributed to the captured element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRule {
    /// Full selector text as written, including non-matching list entries
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl MatchedRule {
    /// `selector {\n  prop: value;\n}\n`, skipping empty values
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        css.push_str(&self.selector);
        css.push_str(" {\n");

        for declaration in &self.declarations {
            if declaration.value.trim().is_empty() {
                continue;
            }
            css.push_str("  ");
            css.push_str(&declaration.property);
            css.push_str(": ");
            css.push_str(&declaration.value);
            css.push_str(";\n");
        }

        css.push_str("}\n");
        css
    }
}

/// Rules in stylesheet-then-rule order, duplicates kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedRuleSet {
    pub rules: Vec<MatchedRule>,
}

impl MatchedRuleSet {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn selectors(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.selector.as_str()).collect()
    }

    /// Rendered rules separated by blank lines
    pub fn to_css(&self) -> String {
        self.rules
            .iter()
            .map(MatchedRule::to_css)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `.class` for every class plus `#id` when the element has one
pub fn selector_set<D: Document>(doc: &D, element: &D::Node) -> HashSet<String> {
    let mut selectors: HashSet<String> = doc
        .class_list(element)
        .into_iter()
        .map(|class| format!(".{}", class))
        .collect();

    if let Some(id) = doc.element_id(element) {
        selectors.insert(format!("#{}", id));
    }

    selectors
}

fn selector_matches(selector_text: &str, selectors: &HashSet<String>) -> bool {
    selector_text
        .split(',')
        .map(str::trim)
        .any(|selector| selectors.contains(selector))
}

/// Collect every readable rule whose selector list names the element
#[instrument(skip(doc, element))]
pub fn attribute_rules<D: Document>(doc: &D, element: &D::Node) -> MatchedRuleSet {
    let selectors = selector_set(doc, element);
    let mut matched = MatchedRuleSet::default();

    if selectors.is_empty() {
        debug!("Element has no class or id; nothing to attribute");
        return matched;
    }

    for (index, sheet) in doc.style_sheets().into_iter().enumerate() {
        let rules = match sheet {
            Ok(rules) => rules,
            Err(err) => {
                warn!(sheet = index, error = %err, "Skipping unreadable stylesheet");
                continue;
            }
        };

        for rule in rules {
            let Some(selector_text) = rule.selector_text else {
                continue;
            };
            if selector_matches(&selector_text, &selectors) {
                debug!(sheet = index, selector = %selector_text, "Attributed rule");
                matched.rules.push(MatchedRule {
                    selector: selector_text,
                    declarations: rule.declarations,
                });
            }
        }
    }

    matched
}

/// Attributed rules rendered as CSS text
pub fn authored_css<D: Document>(doc: &D, element: &D::Node) -> String {
    attribute_rules(doc, element).to_css()
}

#[cfg(test)]
mod tests {
    use super::*;
    use copykit_dom::{StyleRule, VNode, VirtualDocument, VirtualStyleSheet};

    fn doc_with(element: VNode, sheets: Vec<VirtualStyleSheet>) -> (VirtualDocument, copykit_dom::NodeId) {
        let mut doc = VirtualDocument::with_page(vec![], vec![element]);
        for sheet in sheets {
            doc.add_style_sheet(sheet);
        }
        let body = doc.body().unwrap();
        let target = doc.children(&body)[0];
        (doc, target)
    }

    #[test]
    fn test_exact_selector_attribution() {
        let (doc, el) = doc_with(
            VNode::element("div").with_class("a b").with_id("x"),
            vec![VirtualStyleSheet::inline(vec![
                StyleRule::new(".a").with_declaration("color", "red"),
                StyleRule::new(".c").with_declaration("color", "blue"),
                StyleRule::new("#x").with_declaration("margin", "0"),
                StyleRule::new(".a.b").with_declaration("padding", "1px"),
            ])],
        );

        let matched = attribute_rules(&doc, &el);
        assert_eq!(matched.selectors(), vec![".a", "#x"]);
    }

    #[test]
    fn test_selector_lists_are_split_and_trimmed() {
        let (doc, el) = doc_with(
            VNode::element("div").with_class("b"),
            vec![VirtualStyleSheet::inline(vec![
                StyleRule::new("h1,  .b ,p").with_declaration("color", "red"),
                StyleRule::new(".a .b").with_declaration("color", "blue"),
                StyleRule::new("div.b").with_declaration("color", "green"),
            ])],
        );

        let matched = attribute_rules(&doc, &el);
        assert_eq!(matched.selectors(), vec!["h1,  .b ,p"]);
    }

    #[test]
    fn test_no_class_no_id_matches_nothing() {
        let (doc, el) = doc_with(
            VNode::element("div").with_attr("title", "plain"),
            vec![VirtualStyleSheet::inline(vec![
                StyleRule::new("div").with_declaration("color", "red"),
                StyleRule::new("*").with_declaration("margin", "0"),
            ])],
        );

        assert!(attribute_rules(&doc, &el).is_empty());
        assert_eq!(authored_css(&doc, &el), "");
    }

    #[test]
    fn test_cross_origin_sheet_skipped() {
        let (doc, el) = doc_with(
            VNode::element("div").with_class("a"),
            vec![
                VirtualStyleSheet::inline(vec![StyleRule::new(".a").with_declaration("color", "red")]),
                VirtualStyleSheet::cross_origin("https://cdn.example/lib.css"),
                VirtualStyleSheet::inline(vec![StyleRule::new(".a").with_declaration("color", "blue")]),
            ],
        );

        let css = authored_css(&doc, &el);
        assert_eq!(css, ".a {\n  color: red;\n}\n\n.a {\n  color: blue;\n}\n");
    }

    #[test]
    fn test_grouping_rules_ignored() {
        let (doc, el) = doc_with(
            VNode::element("div").with_class("a"),
            vec![VirtualStyleSheet::inline(vec![
                StyleRule::grouping(),
                StyleRule::new(".a").with_declaration("color", "red"),
            ])],
        );

        assert_eq!(attribute_rules(&doc, &el).len(), 1);
    }

    #[test]
    fn test_render_skips_empty_values_and_keeps_empty_blocks() {
        let rule = MatchedRule {
            selector: ".a".to_string(),
            declarations: vec![
                Declaration::new("color", "red"),
                Declaration::new("margin", "  "),
                Declaration::new("padding", ""),
            ],
        };
        assert_eq!(rule.to_css(), ".a {\n  color: red;\n}\n");

        let empty = MatchedRule {
            selector: "#x".to_string(),
            declarations: vec![],
        };
        assert_eq!(empty.to_css(), "#x {\n}\n");
    }
}
