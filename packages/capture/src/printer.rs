//! Deterministic, indented markup serialization of live nodes.
//!
//! Every element gets its own opening and closing line, void elements
//! included, and text is trimmed onto its own line. Whitespace-significant
//! elements such as `pre` are reflowed like any other. Text is entity-escaped
//! except inside raw-text elements like `script` and `style`.

use copykit_dom::{Document, NodeType};

/// Elements whose text children are serialized without entity escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Options for markup printing
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Indentation string per depth level
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a PrintOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a PrintOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer.trim().to_string()
    }
}

/// Pretty-print a node and its subtree
pub fn pretty_print<D: Document>(doc: &D, node: &D::Node, options: &PrintOptions) -> String {
    let mut ctx = Context::new(options);
    print_node(doc, node, false, &mut ctx);
    ctx.get_output()
}

/// Pretty-print each child of `node` at top level, one after another
pub fn pretty_print_children<D: Document>(doc: &D, node: &D::Node, options: &PrintOptions) -> String {
    let mut ctx = Context::new(options);
    let raw_text = is_raw_text(&doc.tag_name(node).to_lowercase());
    for child in doc.children(node) {
        print_node(doc, &child, raw_text, &mut ctx);
    }
    ctx.get_output()
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// `raw_text` is set when the parent element is a raw-text element
fn print_node<D: Document>(doc: &D, node: &D::Node, raw_text: bool, ctx: &mut Context<'_>) {
    match doc.node_type(node) {
        NodeType::Text => {
            let content = doc.text_content(node);
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return;
            }
            if raw_text {
                ctx.add_line(trimmed);
            } else {
                ctx.add_line(&escape_text(trimmed));
            }
        }
        NodeType::Element => {
            let tag = doc.tag_name(node).to_lowercase();
            ctx.add_line(&open_tag(&tag, &doc.attributes(node)));
            ctx.indent();
            let children_raw = is_raw_text(&tag);
            for child in doc.children(node) {
                print_node(doc, &child, children_raw, ctx);
            }
            ctx.dedent();
            ctx.add_line(&format!("</{}>", tag));
        }
        NodeType::Other => {}
    }
}

fn open_tag(tag: &str, attributes: &[(String, String)]) -> String {
    let mut line = format!("<{}", tag);
    for (name, value) in attributes {
        line.push(' ');
        line.push_str(name);
        line.push_str("=\"");
        line.push_str(&escape_attribute(value));
        line.push('"');
    }
    line.push('>');
    line
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
