use lol_html::html_content::Element as RewriteElement;
use lol_html::{HtmlRewriter, Settings, doc_comments, element};
use regex::Regex;

use crate::Result;

/// Configuration for HTML sanitizing
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Tags removed together with their content
    pub remove_tags: Vec<String>,
    /// Substrings that condemn an element when found in its class or id
    pub class_id_substrings: Vec<String>,
    /// Class tokens that condemn an element
    pub class_tokens: Vec<String>,
    /// Whether to remove comment nodes
    pub remove_comments: bool,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            remove_tags: ["script", "style", "noscript", "iframe", "nav", "aside", "footer", "header"]
                .map(String::from)
                .to_vec(),
            class_id_substrings: vec!["ad".to_string(), "cookie".to_string()],
            class_tokens: vec!["share".to_string(), "social".to_string(), "meta".to_string()],
            remove_comments: true,
        }
    }
}

/// Elements that hold the document together and are never removed by
/// class/id patterns.
///
/// This is a deliberate exception to the class/id rules, which otherwise apply
/// to every element: `<body class="ad-layout">` or `<html id="cookie-wall">`
/// would take the whole page with them. The tag rules still apply as usual.
const STRUCTURAL_TAGS: &[&str] = &["html", "head", "body"];

/// Strip non-content elements and comments from an HTML document or fragment
pub fn sanitize_html(html: &str, config: &SanitizeConfig) -> Result<String> {
    let substring_pattern = substring_regex(&config.class_id_substrings);
    let mut output = Vec::with_capacity(html.len());

    let mut element_handlers = Vec::new();
    for tag in &config.remove_tags {
        element_handlers.push(element!(tag.as_str(), |el| {
            el.remove();
            Ok(())
        }));
    }
    element_handlers.push(element!("*", |el| {
        if is_unwanted(el, substring_pattern.as_ref(), &config.class_tokens) {
            el.remove();
        }
        Ok(())
    }));

    let document_handlers = if config.remove_comments {
        vec![doc_comments!(|c| {
            c.remove();
            Ok(())
        })]
    } else {
        Vec::new()
    };

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: element_handlers,
            document_content_handlers: document_handlers,
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Builds one case-insensitive alternation out of literal substrings.
fn substring_regex(substrings: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> =
        substrings.iter().filter(|s| !s.is_empty()).map(|s| regex::escape(s)).collect();

    if alternatives.is_empty() {
        return None;
    }

    Regex::new(&format!("(?i)({})", alternatives.join("|"))).ok()
}

fn is_unwanted(el: &RewriteElement<'_, '_>, substring_pattern: Option<&Regex>, class_tokens: &[String]) -> bool {
    let tag = el.tag_name();
    if STRUCTURAL_TAGS.contains(&tag.as_str()) {
        return false;
    }

    let class = el.get_attribute("class");
    let id = el.get_attribute("id");

    if let Some(pattern) = substring_pattern
        && [class.as_deref(), id.as_deref()].into_iter().flatten().any(|value| pattern.is_match(value))
    {
        return true;
    }

    class.as_deref().is_some_and(|class| {
        class
            .split_whitespace()
            .any(|token| class_tokens.iter().any(|wanted| token.eq_ignore_ascii_case(wanted)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(html: &str) -> String {
        sanitize_html(html, &SanitizeConfig::default()).unwrap()
    }

    #[test]
    fn test_removes_unwanted_tags() {
        let html = r#"
            <html>
                <head><script>alert('test');</script><style>body{color:red;}</style></head>
                <body>
                    <header>Site header</header>
                    <nav>Menu</nav>
                    <noscript>Enable JavaScript</noscript>
                    <iframe src="https://example.com/embed"></iframe>
                    <aside>Related</aside>
                    <p>Content</p>
                    <footer>Copyright</footer>
                </body>
            </html>
        "#;

        let result = sanitize(html);
        for gone in ["alert", "color:red", "Site header", "Menu", "Enable JavaScript", "embed", "Related", "Copyright"] {
            assert!(!result.contains(gone), "{gone} should be removed");
        }
        assert!(result.contains("<p>Content</p>"));
    }

    #[test]
    fn test_removes_comments() {
        let html = "<body><!-- This is a comment --><p>Visible content</p><!-- Another --></body>";

        let result = sanitize(html);
        assert!(!result.contains("<!--"));
        assert!(result.contains("Visible content"));
    }

    #[test]
    fn test_removes_ad_and_cookie_patterns() {
        let html = r#"
            <body>
                <div class="Banner-AD">Buy now</div>
                <div id="cookieConsent">Accept cookies</div>
                <div class="COOKIE-bar">Cookies again</div>
                <div id="leaderboard">Scores</div>
                <p class="text">Keep me</p>
            </body>
        "#;

        let result = sanitize(html);
        assert!(!result.contains("Buy now"));
        assert!(!result.contains("Accept cookies"));
        assert!(!result.contains("Cookies again"));
        // "leaderboard" contains "ad".
        assert!(!result.contains("Scores"));
        assert!(result.contains("Keep me"));
    }

    #[test]
    fn test_removes_exact_class_tokens() {
        let html = r#"
            <body>
                <div class="share buttons">Share this</div>
                <div class="Social">Follow us</div>
                <div class="post meta">Posted on</div>
            </body>
        "#;

        let result = sanitize(html);
        assert!(!result.contains("Share this"));
        assert!(!result.contains("Follow us"));
        assert!(!result.contains("Posted on"));
    }

    #[test]
    fn test_class_token_does_not_match_substring() {
        let html = r#"<body><div class="sharepoint-doc">Document</div></body>"#;
        assert!(sanitize(html).contains("Document"));
    }

    #[test]
    fn test_structural_elements_survive_patterns() {
        let html = r#"<html class="page-loaded"><body id="thread-body" class="reader"><p>Body text</p></body></html>"#;

        let result = sanitize(html);
        assert!(result.contains("Body text"));
    }

    #[test]
    fn test_structural_exemption_does_not_cover_children() {
        let html = r#"<html id="cookie-wall"><body class="ad-layout"><div class="ad-slot">Buy</div><p>Kept</p></body></html>"#;

        let result = sanitize(html);
        assert!(result.contains(r#"<body class="ad-layout">"#));
        assert!(result.contains("<p>Kept</p>"));
        assert!(!result.contains("Buy"));
    }

    #[test]
    fn test_nested_removal_in_fragment() {
        let html = r#"<article><p>Intro</p><div class="share"><a href="/x">Tweet</a></div><p>Outro</p></article>"#;

        let result = sanitize(html);
        assert_eq!(result, "<article><p>Intro</p><p>Outro</p></article>");
    }

    #[test]
    fn test_custom_config() {
        let config = SanitizeConfig {
            remove_tags: vec!["figure".to_string()],
            class_id_substrings: Vec::new(),
            class_tokens: Vec::new(),
            remove_comments: false,
        };
        let html = "<div class='ad'>Ad</div><figure>Fig</figure><!-- note -->";

        let result = sanitize_html(html, &config).unwrap();
        assert!(result.contains("Ad"));
        assert!(!result.contains("Fig"));
        assert!(result.contains("<!-- note -->"));
    }
}
