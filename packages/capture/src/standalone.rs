//! One-shot captures launched from the trigger UI, bypassing the picker.

use crate::config::CaptureConfig;
use crate::error::{CaptureError, CaptureResult};
use crate::mode::OutputMode;
use crate::references::{script_tags, stylesheet_links, UrlBase};
use copykit_dom::Document;
use tracing::info;

/// Every stylesheet reference on the page
pub fn cdn_only<D: Document>(doc: &D) -> CaptureResult<String> {
    let links = stylesheet_links(doc, UrlBase::Document);
    if links.is_empty() {
        return Err(CaptureError::NoStylesheets);
    }
    Ok(links)
}

/// Every external script reference on the page
pub fn js_only<D: Document>(doc: &D) -> CaptureResult<String> {
    let scripts = script_tags(doc, UrlBase::Document);
    if scripts.is_empty() {
        return Err(CaptureError::NoScripts);
    }
    Ok(scripts)
}

/// Doctype, root tag with `lang`, stylesheet refs and inline styles in the
/// head, then the body's markup exactly as the page serializes it.
pub fn page_full<D: Document>(doc: &D, config: &CaptureConfig) -> CaptureResult<String> {
    let body = doc.body().ok_or(CaptureError::MissingBody)?;

    let links = stylesheet_links(doc, UrlBase::Document);
    let styles = doc
        .elements_by_tag_name("style")
        .iter()
        .map(|style| doc.outer_html(style))
        .collect::<Vec<_>>()
        .join("\n");
    let lang = doc.lang().unwrap_or_else(|| config.default_lang.clone());
    let body_markup = doc.inner_html(&body);

    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n{}\n{}\n</head>\n<body>\n{}\n</body>\n</html>",
        lang, links, styles, body_markup
    ))
}

/// Payload for a standalone mode; `None` for picker modes
pub fn payload<D: Document>(
    doc: &D,
    mode: OutputMode,
    config: &CaptureConfig,
) -> Option<CaptureResult<String>> {
    let result = match mode {
        OutputMode::CdnOnly => cdn_only(doc),
        OutputMode::JsOnly => js_only(doc),
        OutputMode::PageFull => page_full(doc, config),
        _ => return None,
    };
    if let Ok(text) = &result {
        info!(mode = %mode, bytes = text.len(), "Standalone capture ready");
    }
    Some(result)
}

pub fn success_message(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::CdnOnly => "✅ CDN links copied to clipboard!",
        OutputMode::JsOnly => "✅ JS links copied!",
        OutputMode::PageFull => "✅ Full page copied to clipboard!",
        _ => "✅ Copied successfully!",
    }
}

/// Alert text when a standalone capture fails
pub fn failure_message(mode: OutputMode, err: &CaptureError) -> &'static str {
    match (mode, err) {
        (_, CaptureError::NoStylesheets | CaptureError::NoScripts) => err.user_message(),
        (OutputMode::JsOnly, _) => "❌ Failed to copy JS links.",
        (OutputMode::PageFull, _) => "❌ Error copying full page.",
        _ => err.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copykit_dom::{Location, VNode, VirtualDocument};

    fn page() -> VirtualDocument {
        let mut doc = VirtualDocument::new(
            VNode::element("html")
                .with_attr("lang", "de")
                .with_child(
                    VNode::element("head")
                        .with_child(
                            VNode::element("link")
                                .with_attr("rel", "stylesheet")
                                .with_attr("href", "main.css"),
                        )
                        .with_child(
                            VNode::element("style").with_child(VNode::text("\n  .a > .b { color: red; }\n")),
                        ),
                )
                .with_child(
                    VNode::element("body")
                        .with_child(VNode::element("h1").with_child(VNode::text("Title")))
                        .with_child(VNode::element("pre").with_child(VNode::text("  keep\n    this")))
                        .with_child(VNode::element("script").with_attr("src", "/app.js")),
                ),
        );
        doc.set_location(Location::new("https://x.test", "https://x.test/docs/index.html"));
        doc
    }

    #[test]
    fn test_cdn_only() {
        assert_eq!(
            cdn_only(&page()).unwrap(),
            "<link rel=\"stylesheet\" href=\"https://x.test/docs/main.css\">"
        );
    }

    #[test]
    fn test_js_only() {
        assert_eq!(
            js_only(&page()).unwrap(),
            "<script src=\"https://x.test/app.js\"></script>"
        );
    }

    #[test]
    fn test_empty_lists_abort() {
        let doc = VirtualDocument::with_page(vec![], vec![]);
        assert!(matches!(cdn_only(&doc), Err(CaptureError::NoStylesheets)));
        assert!(matches!(js_only(&doc), Err(CaptureError::NoScripts)));
    }

    #[test]
    fn test_page_full() {
        let full = page_full(&page(), &CaptureConfig::default()).unwrap();
        assert_eq!(
            full,
            "<!DOCTYPE html>\n\
             <html lang=\"de\">\n\
             <head>\n\
             <link rel=\"stylesheet\" href=\"https://x.test/docs/main.css\">\n\
             <style>\n  .a > .b { color: red; }\n</style>\n\
             </head>\n\
             <body>\n\
             <h1>Title</h1><pre>  keep\n    this</pre><script src=\"/app.js\"></script>\n\
             </body>\n\
             </html>"
        );
    }

    #[test]
    fn test_page_full_default_lang_and_missing_body() {
        let doc = VirtualDocument::with_page(vec![], vec![VNode::element("main")]);
        let full = page_full(&doc, &CaptureConfig::default()).unwrap();
        assert!(full.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));

        let bodiless = VirtualDocument::new(VNode::element("html").with_child(VNode::element("head")));
        assert!(matches!(
            page_full(&bodiless, &CaptureConfig::default()),
            Err(CaptureError::MissingBody)
        ));
    }

    #[test]
    fn test_payload_ignores_picker_modes() {
        assert!(payload(&page(), OutputMode::Css, &CaptureConfig::default()).is_none());
        assert!(payload(&page(), OutputMode::JsOnly, &CaptureConfig::default()).is_some());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            failure_message(OutputMode::CdnOnly, &CaptureError::NoStylesheets),
            "⚠️ No CDN stylesheets found."
        );
        assert_eq!(
            failure_message(OutputMode::JsOnly, &CaptureError::MissingBody),
            "❌ Failed to copy JS links."
        );
    }
}
