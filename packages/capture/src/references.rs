//! External stylesheet and script references.

use crate::error::{CaptureError, CaptureResult};
use copykit_dom::Document;
use tracing::warn;
use url::Url;

/// How relative references become absolute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlBase {
    /// Against the page origin root (picker modes)
    Origin,
    /// Against the full document URL (standalone modes)
    Document,
}

/// `href` of every `<link rel="stylesheet">`, in document order, empties dropped
pub fn stylesheet_hrefs<D: Document>(doc: &D) -> Vec<String> {
    doc.elements_by_tag_name("link")
        .iter()
        .filter(|link| doc.attribute(link, "rel").as_deref() == Some("stylesheet"))
        .filter_map(|link| doc.attribute(link, "href"))
        .filter(|href| !href.is_empty())
        .collect()
}

/// `src` of every `<script src>`, in document order, empties dropped
pub fn script_sources<D: Document>(doc: &D) -> Vec<String> {
    doc.elements_by_tag_name("script")
        .iter()
        .filter_map(|script| doc.attribute(script, "src"))
        .filter(|src| !src.is_empty())
        .collect()
}

/// Make a reference absolute.
///
/// Anything already starting with `http` is kept verbatim. Origin-based
/// resolution treats bare paths as relative to the site root; pages with an
/// opaque origin (`"null"` on `file://`) resolve against the page href instead.
pub fn resolve_url(reference: &str, origin: &str, href: &str, base: UrlBase) -> CaptureResult<String> {
    if base == UrlBase::Origin && reference.starts_with("http") {
        return Ok(reference.to_string());
    }

    let origin_root = format!("{}/", origin.trim_end_matches('/'));
    let base_url = match base {
        UrlBase::Origin => match Url::parse(&origin_root) {
            Ok(root) => root,
            Err(_) => parse_base(reference, href)?,
        },
        UrlBase::Document => parse_base(reference, href)?,
    };

    base_url
        .join(reference)
        .map(String::from)
        .map_err(|source| CaptureError::InvalidUrl {
            href: reference.to_string(),
            base: base_url.to_string(),
            source,
        })
}

fn parse_base(reference: &str, base: &str) -> CaptureResult<Url> {
    Url::parse(base).map_err(|source| CaptureError::InvalidUrl {
        href: reference.to_string(),
        base: base.to_string(),
        source,
    })
}

/// Resolve every reference; one that cannot be resolved is kept as written
fn resolve_all<D: Document>(doc: &D, references: Vec<String>, base: UrlBase) -> Vec<String> {
    let location = doc.location();
    references
        .into_iter()
        .map(|reference| {
            match resolve_url(&reference, &location.origin, &location.href, base) {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(error = %err, "Keeping unresolvable reference verbatim");
                    reference
                }
            }
        })
        .collect()
}

/// `<link rel="stylesheet" href="...">` lines; empty when the page has none
pub fn stylesheet_links<D: Document>(doc: &D, base: UrlBase) -> String {
    resolve_all(doc, stylesheet_hrefs(doc), base)
        .iter()
        .map(|url| format!("<link rel=\"stylesheet\" href=\"{}\">", url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<script src="..."></script>` lines; empty when the page has none
pub fn script_tags<D: Document>(doc: &D, base: UrlBase) -> String {
    resolve_all(doc, script_sources(doc), base)
        .iter()
        .map(|url| format!("<script src=\"{}\"></script>", url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use copykit_dom::{Location, VNode, VirtualDocument};

    fn link(href: &str) -> VNode {
        VNode::element("link")
            .with_attr("rel", "stylesheet")
            .with_attr("href", href)
    }

    fn page(head: Vec<VNode>, body: Vec<VNode>) -> VirtualDocument {
        let mut doc = VirtualDocument::with_page(head, body);
        doc.set_location(Location::new(
            "https://site.test",
            "https://site.test/blog/post.html",
        ));
        doc
    }

    #[test]
    fn test_origin_resolution_forms() {
        let origin = "https://site.test";
        let href = "https://site.test/blog/post.html";
        let resolve = |r: &str| resolve_url(r, origin, href, UrlBase::Origin).unwrap();

        assert_eq!(resolve("/css/a.css"), "https://site.test/css/a.css");
        assert_eq!(resolve("css/a.css"), "https://site.test/css/a.css");
        assert_eq!(resolve("//cdn.test/b.css"), "https://cdn.test/b.css");
        assert_eq!(resolve("http://other.test/c.css"), "http://other.test/c.css");
    }

    #[test]
    fn test_document_resolution_is_relative_to_page() {
        let resolved = resolve_url(
            "theme.css",
            "https://site.test",
            "https://site.test/blog/post.html",
            UrlBase::Document,
        )
        .unwrap();
        assert_eq!(resolved, "https://site.test/blog/theme.css");
    }

    #[test]
    fn test_stylesheet_links_in_order_without_dedup() {
        let doc = page(
            vec![
                link("/a.css"),
                VNode::element("link").with_attr("rel", "icon").with_attr("href", "/fav.ico"),
                link(""),
                VNode::element("link").with_attr("rel", "stylesheet"),
            ],
            vec![link("/a.css"), link("https://cdn.test/b.css")],
        );

        let links = stylesheet_links(&doc, UrlBase::Origin);
        assert_eq!(
            links,
            "<link rel=\"stylesheet\" href=\"https://site.test/a.css\">\n\
             <link rel=\"stylesheet\" href=\"https://site.test/a.css\">\n\
             <link rel=\"stylesheet\" href=\"https://cdn.test/b.css\">"
        );
    }

    #[test]
    fn test_script_tags() {
        let doc = page(
            vec![VNode::element("script").with_attr("src", "app.js")],
            vec![
                VNode::element("script").with_child(VNode::text("inline()")),
                VNode::element("script").with_attr("src", "/vendor.js"),
            ],
        );

        let scripts = script_tags(&doc, UrlBase::Document);
        assert_eq!(
            scripts,
            "<script src=\"https://site.test/blog/app.js\"></script>\n\
             <script src=\"https://site.test/vendor.js\"></script>"
        );
    }

    #[test]
    fn test_empty_page_yields_empty_string() {
        let doc = page(vec![], vec![]);
        assert_eq!(stylesheet_links(&doc, UrlBase::Origin), "");
        assert_eq!(script_tags(&doc, UrlBase::Origin), "");
    }

    #[test]
    fn test_opaque_origin_falls_back_to_page_href() {
        let resolved = resolve_url("site.css", "null", "file:///home/u/page.html", UrlBase::Origin).unwrap();
        assert_eq!(resolved, "file:///home/u/site.css");
    }

    #[test]
    fn test_unresolvable_reference_kept_verbatim() {
        let err = resolve_url("a.css", "not a url", "", UrlBase::Origin).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidUrl { .. }));

        let mut doc = page(vec![link("a.css")], vec![]);
        doc.set_location(Location::new("null", "about:blank"));
        assert_eq!(
            stylesheet_links(&doc, UrlBase::Origin),
            "<link rel=\"stylesheet\" href=\"a.css\">"
        );
    }
}
