//! Chapter rendering.
//!
//! EPUB content documents must be well-formed XHTML, while the content we
//! extract is HTML as browsers write it (`<img ...>`, `<br>`, bare `&`).
//! The fragment is parsed once more and re-serialized as XML.

use scraper::{ElementRef, Node};

use crate::Metadata;
use crate::parse::Document;

/// HTML elements that never have children and must be self-closed in XML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Renders the single chapter of a book as a complete XHTML document.
///
/// The body starts with the title as `<h1>`, followed by the publish date in
/// `<p><em>` when there is one, followed by the content.
pub fn render_chapter(metadata: &Metadata, content_html: &str, language: &str, stylesheet_href: &str) -> String {
    let title = escape_xml(&metadata.title);
    let lang = escape_xml(language);

    let mut doc = String::with_capacity(content_html.len() + 512);
    doc.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
"#,
    );
    doc.push_str(&format!("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{}\">\n<head>\n", lang));
    doc.push_str(&format!("  <title>{}</title>\n", title));
    doc.push_str(&format!(
        "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>\n",
        escape_xml(stylesheet_href)
    ));
    doc.push_str("</head>\n<body>\n");
    doc.push_str(&format!("<h1>{}</h1>\n", title));
    if metadata.has_date() {
        doc.push_str(&format!("<p><em>{}</em></p>\n", escape_xml(&metadata.date)));
    }
    doc.push_str(&to_xhtml(content_html));
    doc.push_str("\n</body>\n</html>\n");

    doc
}

/// Re-serializes an HTML fragment as XHTML.
///
/// Void elements are self-closed and text and attribute values are escaped.
/// Comments and processing instructions are dropped. Attributes whose names
/// are not valid XML names are skipped; the rest are written in name order.
pub fn to_xhtml(html: &str) -> String {
    let fragment = Document::parse_fragment(html);
    let mut out = String::with_capacity(html.len());

    // parse_fragment wraps the nodes in a synthetic <html> element.
    write_children(&mut out, fragment.root().element_ref());

    out
}

fn write_children(out: &mut String, parent: ElementRef<'_>) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_xml(text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(out, element);
                }
            }
            _ => {}
        }
    }
}

fn write_element(out: &mut String, element: ElementRef<'_>) {
    let name = element.value().name();

    out.push('<');
    out.push_str(name);
    // scraper does not keep source order; name order keeps the output stable.
    let mut attrs: Vec<_> = element.value().attrs().filter(|(attr, _)| is_xml_name(attr) && *attr != "xmlns").collect();
    attrs.sort_unstable_by_key(|(attr, _)| *attr);
    for (attr, value) in attrs {
        out.push_str(&format!(" {}=\"{}\"", attr, escape_xml(value)));
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_children(out, element);
    out.push_str(&format!("</{}>", name));
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };

    (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Escape special XML characters.
///
/// Characters that XML 1.0 does not allow at all, such as form feed or bell,
/// are dropped since no escape can represent them.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c if !is_xml_char(c) => {}
            _ => result.push(c),
        }
    }
    result
}

/// Removes characters that are not allowed in XML 1.0, leaving the rest as is.
pub(crate) fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars().filter(|c| is_xml_char(*c)).collect()
}

fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}
