use crate::css_rules::authored_css;
use crate::mode::OutputMode;
use crate::printer::{pretty_print, PrintOptions};
use crate::references::{stylesheet_links, UrlBase};
use copykit_dom::Document;

/// Wrap attributed rules in a style block.
///
/// Rendered rules already end in a newline, so none is added before `</style>`.
pub fn style_block(css: &str) -> String {
    format!("<style>\n{}</style>", css)
}

/// Build the clipboard payload for an element captured in `mode`.
///
/// Standalone modes are not meaningful for a single element and produce the
/// `All` payload.
pub fn assemble<D: Document>(
    doc: &D,
    element: &D::Node,
    mode: OutputMode,
    options: &PrintOptions,
) -> String {
    match mode.interactive() {
        OutputMode::Html => pretty_print(doc, element, options),
        OutputMode::Css => style_block(&authored_css(doc, element)),
        OutputMode::CssCdn => format!(
            "{}\n\n{}",
            stylesheet_links(doc, UrlBase::Origin),
            style_block(&authored_css(doc, element))
        ),
        OutputMode::Cdn => stylesheet_links(doc, UrlBase::Origin),
        _ => format!(
            "{}\n\n{}",
            style_block(&authored_css(doc, element)),
            pretty_print(doc, element, options)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copykit_dom::{Location, NodeId, StyleRule, VNode, VirtualDocument, VirtualStyleSheet};

    fn fixture() -> (VirtualDocument, NodeId) {
        let mut doc = VirtualDocument::with_page(
            vec![VNode::element("link")
                .with_attr("rel", "stylesheet")
                .with_attr("href", "/site.css")],
            vec![VNode::element("button")
                .with_class("btn")
                .with_child(VNode::text("Go"))],
        );
        doc.set_location(Location::new("https://shop.test", "https://shop.test/cart"));
        doc.add_style_sheet(VirtualStyleSheet::inline(vec![
            StyleRule::new(".btn").with_declaration("color", "white"),
        ]));
        let button = doc.elements_by_tag_name("button")[0];
        (doc, button)
    }

    const LINKS: &str = "<link rel=\"stylesheet\" href=\"https://shop.test/site.css\">";
    const CSS: &str = "<style>\n.btn {\n  color: white;\n}\n</style>";
    const HTML: &str = "<button class=\"btn\">\n  Go\n</button>";

    fn payload(mode: OutputMode) -> String {
        let (doc, button) = fixture();
        assemble(&doc, &button, mode, &PrintOptions::default())
    }

    #[test]
    fn test_html_mode() {
        assert_eq!(payload(OutputMode::Html), HTML);
    }

    #[test]
    fn test_css_mode() {
        assert_eq!(payload(OutputMode::Css), CSS);
    }

    #[test]
    fn test_css_cdn_mode() {
        assert_eq!(payload(OutputMode::CssCdn), format!("{}\n\n{}", LINKS, CSS));
    }

    #[test]
    fn test_cdn_mode() {
        assert_eq!(payload(OutputMode::Cdn), LINKS);
    }

    #[test]
    fn test_all_mode_and_fallbacks() {
        let expected = format!("{}\n\n{}", CSS, HTML);
        assert_eq!(payload(OutputMode::All), expected);
        assert_eq!(payload(OutputMode::parse("bogus")), expected);
        assert_eq!(payload(OutputMode::PageFull), expected);
    }

    #[test]
    fn test_empty_css_block() {
        assert_eq!(style_block(""), "<style>\n</style>");
    }
}
