//! Main-content location.
//!
//! The locator does not score paragraphs. It walks a short priority list and
//! stops at the first hit:
//!
//! 1. the first `<article>`,
//! 2. the first `<main>`,
//! 3. the element with the longest visible text among those whose `id`
//!    contains "content", "main", "article" or "post" (case-insensitive),
//!    earliest element winning ties,
//! 4. `<body>`, or the root element when there is no body.
//!
//! An empty article, main or id candidate does not stop the walk; the next
//! step is tried. Only an empty body/root fallback is reported as
//! [`PagebindError::NoContent`].

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::{Document, Element};
use crate::{PagebindError, Result};

/// Matches `id` values that suggest a content container.
static CONTENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(content|main|article|post)").expect("content id pattern is valid"));

/// Locates the element most likely to hold the article body.
///
/// # Errors
///
/// Returns [`PagebindError::NoContent`] when even the body/root fallback has
/// no child elements and no visible text.
///
/// # Example
///
/// ```rust
/// use pagebind_core::{Document, locate_content};
///
/// let doc = Document::parse(r#"<div id="post">Short</div><article><p>Body</p></article>"#);
/// let content = locate_content(&doc).unwrap();
/// assert_eq!(content.tag_name(), "article");
/// ```
pub fn locate_content(doc: &Document) -> Result<Element<'_>> {
    let located = find_candidate(doc)?;

    if !located.has_content() {
        tracing::debug!(tag = %located.tag_name(), "located node is empty");
        return Err(PagebindError::NoContent);
    }

    Ok(located)
}

fn find_candidate(doc: &Document) -> Result<Element<'_>> {
    if let Some(article) = doc.select_first("article")? {
        if article.has_content() {
            tracing::debug!("content located by <article>");
            return Ok(article);
        }
        tracing::debug!("skipping empty <article>");
    }

    if let Some(main) = doc.select_first("main")? {
        if main.has_content() {
            tracing::debug!("content located by <main>");
            return Ok(main);
        }
        tracing::debug!("skipping empty <main>");
    }

    if let Some(candidate) = longest_id_candidate(doc)? {
        if candidate.has_content() {
            tracing::debug!(id = candidate.attr("id").unwrap_or_default(), "content located by id");
            return Ok(candidate);
        }
        tracing::debug!(id = candidate.attr("id").unwrap_or_default(), "skipping empty id candidate");
    }

    if let Some(body) = doc.select_first("body")? {
        tracing::debug!("content located by <body> fallback");
        return Ok(body);
    }

    Ok(doc.root())
}

/// The id-matching element with the most visible text. On equal lengths the
/// first element in document order is kept.
fn longest_id_candidate(doc: &Document) -> Result<Option<Element<'_>>> {
    let mut best: Option<(usize, Element<'_>)> = None;

    for element in doc.select("[id]")? {
        let Some(id) = element.attr("id") else { continue };
        if !CONTENT_ID.is_match(id) {
            continue;
        }

        let len = element.text_len();
        if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
            best = Some((len, element));
        }
    }

    Ok(best.map(|(_, element)| element))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_wins_over_everything() {
        let html = r#"
            <main><p>A much longer main section with lots and lots of text in it.</p></main>
            <div id="content">Even longer content container text that goes on and on and on.</div>
            <article id="small"><p>Short</p></article>
        "#;
        let doc = Document::parse(html);
        let content = locate_content(&doc).unwrap();
        assert_eq!(content.tag_name(), "article");
        assert_eq!(content.attr("id"), Some("small"));
    }

    #[test]
    fn test_first_article_is_used() {
        let doc = Document::parse("<article id='one'>First</article><article id='two'>Second, longer</article>");
        assert_eq!(locate_content(&doc).unwrap().attr("id"), Some("one"));
    }

    #[test]
    fn test_main_when_no_article() {
        let html = r#"<div id="content">Lots of text here, more than main has.</div><main>Main</main>"#;
        let doc = Document::parse(html);
        assert_eq!(locate_content(&doc).unwrap().tag_name(), "main");
    }

    #[test]
    fn test_longest_id_candidate() {
        let html = r#"
            <div id="post-header">Tiny</div>
            <div id="MainContent"><p>This is the body of the page with the most text.</p></div>
            <div id="sidebar">This sidebar has plenty of text but its id is not content-like at all.</div>
        "#;
        let doc = Document::parse(html);
        assert_eq!(locate_content(&doc).unwrap().attr("id"), Some("MainContent"));
    }

    #[test]
    fn test_id_candidate_tie_goes_to_first() {
        let html = r#"<div id="post-a">abcde</div><div id="post-b">vwxyz</div>"#;
        let doc = Document::parse(html);
        assert_eq!(locate_content(&doc).unwrap().attr("id"), Some("post-a"));
    }

    #[test]
    fn test_text_length_ignores_markup_and_whitespace() {
        let html = r#"
            <div id="content-a"><span>   a   </span><span>b</span>          </div>
            <div id="content-b">abcd</div>
        "#;
        let doc = Document::parse(html);
        // "a b" is 3 chars, "abcd" is 4.
        assert_eq!(locate_content(&doc).unwrap().attr("id"), Some("content-b"));
    }

    #[test]
    fn test_body_fallback() {
        let doc = Document::parse("<html><body><div class='x'><p>Just a paragraph</p></div></body></html>");
        assert_eq!(locate_content(&doc).unwrap().tag_name(), "body");
    }

    #[test]
    fn test_empty_document_fails() {
        let doc = Document::parse("");
        assert!(matches!(locate_content(&doc), Err(PagebindError::NoContent)));
    }

    #[test]
    fn test_whitespace_only_body_fails() {
        let doc = Document::parse("<html><head><title>T</title></head><body>   \n  </body></html>");
        assert!(matches!(locate_content(&doc), Err(PagebindError::NoContent)));
    }

    #[test]
    fn test_empty_article_falls_through_to_body() {
        let html = r#"<html><body><article></article><div class="entry"><p>Real story text lives here.</p></div></body></html>"#;
        let doc = Document::parse(html);
        let content = locate_content(&doc).unwrap();
        assert_eq!(content.tag_name(), "body");
        assert!(content.text().contains("Real story text"));
    }

    #[test]
    fn test_empty_article_falls_through_to_main() {
        let doc = Document::parse("<article>  </article><main><p>Main text</p></main>");
        assert_eq!(locate_content(&doc).unwrap().tag_name(), "main");
    }

    #[test]
    fn test_empty_main_falls_through_to_id_candidate() {
        let doc = Document::parse(r#"<main></main><div id="post-body"><p>Story</p></div>"#);
        assert_eq!(locate_content(&doc).unwrap().attr("id"), Some("post-body"));
    }

    #[test]
    fn test_empty_id_candidate_falls_through_to_body() {
        let doc = Document::parse(r#"<body><div id="content"></div><p>Loose paragraph</p></body>"#);
        assert_eq!(locate_content(&doc).unwrap().tag_name(), "body");
    }
}
