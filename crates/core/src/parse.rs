//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use pagebind_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{PagebindError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors. The HTML parser never fails: malformed markup is
/// repaired the way browsers repair it.
///
/// # Example
///
/// ```rust
/// use pagebind_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    ///
    /// Missing `<html>`, `<head>` and `<body>` elements are synthesized.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses an HTML fragment, such as the serialized content node.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html) }
    }

    /// The root element (`<html>`).
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`PagebindError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pagebind_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;

        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;

        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the trimmed text of the first `<title>` element.
    ///
    /// Returns `None` when there is no title or it is blank.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let title = self.html.select(&selector).next()?.text().collect::<String>();
        let title = title.trim();

        if title.is_empty() { None } else { Some(title.to_string()) }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PagebindError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef.
///
/// Element represents a single node in the HTML document tree and provides
/// methods for accessing its attributes, text content, and children.
///
/// # Example
///
/// ```rust
/// use pagebind_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the outer HTML of this element, including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Visible text with tags stripped and whitespace normalized.
    ///
    /// Each text node is trimmed, blank ones are skipped, and the rest are
    /// joined with a single space.
    pub fn normalized_text(&self) -> String {
        self.element.text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
    }

    /// Length of [`Element::normalized_text`] in characters.
    pub fn text_len(&self) -> usize {
        self.normalized_text().chars().count()
    }

    /// Whether the element has anything worth packaging: a child element or
    /// non-whitespace text.
    pub fn has_content(&self) -> bool {
        self.element.children().any(|child| child.value().is_element())
            || self.element.text().any(|t| !t.trim().is_empty())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name (e.g., "div", "a", "span").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// The underlying scraper reference, for tree walks.
    pub(crate) fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }
}
