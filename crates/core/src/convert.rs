//! Conversion pipeline.
//!
//! [`Converter`] turns one page into a [`Book`]:
//!
//! 1. fetch the page
//! 2. extract metadata from the untouched document
//! 3. strip scripts, navigation, ads and other clutter
//! 4. locate the main content
//! 5. download and embed its images
//! 6. download the cover, if one was requested
//! 7. render the chapter
//!
//! # Example
//!
//! ```rust,no_run
//! use pagebind_core::{ConversionRequest, Converter, HttpFetcher, Settings, write_epub};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let fetcher = HttpFetcher::new(settings.fetch.clone())?;
//! let request = ConversionRequest::new("https://example.com/post", None)?;
//!
//! let book = Converter::new(settings, &fetcher).convert(&request)?;
//! write_epub(&book, Path::new("post.epub"))?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use url::Url;

use crate::book::{Book, Cover};
use crate::chapter::render_chapter;
use crate::embed::{ImageEmbedder, resolve_image_url};
use crate::fetch::Fetch;
use crate::locate::locate_content;
use crate::media::ImageType;
use crate::observer::{NoopObserver, Observer, Stage, Warning};
use crate::sanitize::{SanitizeConfig, sanitize_html};
use crate::settings::Settings;
use crate::{Document, Metadata, PagebindError, Result};

/// Where epub-builder stores the stylesheet, relative to the chapter.
const STYLESHEET_HREF: &str = "stylesheet.css";

static NOOP_OBSERVER: NoopObserver = NoopObserver;

/// Validated input for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub page_url: Url,
    /// Raw cover reference, resolved against the page URL during conversion.
    pub cover_url: Option<String>,
}

impl ConversionRequest {
    /// Validates the page reference and normalizes the cover reference.
    ///
    /// `page` may be an `http`, `https` or `file` URL, or a path to an
    /// existing local file. A blank cover counts as no cover.
    ///
    /// # Errors
    ///
    /// `MissingUrl` when `page` is blank, `InvalidUrl` when it does not parse
    /// or uses another scheme.
    pub fn new(page: &str, cover: Option<&str>) -> Result<Self> {
        let page_url = parse_page_url(page)?;
        let cover_url = cover.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);

        Ok(Self { page_url, cover_url })
    }
}

fn parse_page_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PagebindError::MissingUrl);
    }

    let path = Path::new(input);
    if path.is_file() {
        let absolute = fs::canonicalize(path)?;
        return Url::from_file_path(&absolute).map_err(|_| PagebindError::InvalidUrl(input.to_string()));
    }

    let url = Url::parse(input).map_err(|e| PagebindError::InvalidUrl(format!("{}: {}", input, e)))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        scheme => Err(PagebindError::InvalidUrl(format!("{}: unsupported scheme '{}'", input, scheme))),
    }
}

/// Runs conversions with one set of settings, fetcher, and observer.
pub struct Converter<'a> {
    settings: Settings,
    fetcher: &'a dyn Fetch,
    observer: &'a dyn Observer,
}

impl<'a> Converter<'a> {
    pub fn new(settings: Settings, fetcher: &'a dyn Fetch) -> Self {
        Self { settings, fetcher, observer: &NOOP_OBSERVER }
    }

    /// Reports progress and warnings to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetches the requested page and converts it.
    pub fn convert(&self, request: &ConversionRequest) -> Result<Book> {
        let html = self.fetch_page(&request.page_url)?;
        self.convert_html(&html, &request.page_url, request.cover_url.as_deref())
    }

    /// Fetches the requested page and returns only its metadata.
    pub fn metadata(&self, request: &ConversionRequest) -> Result<Metadata> {
        let html = self.fetch_page(&request.page_url)?;

        self.observer.stage(Stage::ExtractingMetadata);
        Ok(Document::parse(&html).extract_metadata(&self.settings))
    }

    /// Converts already fetched HTML. Images and the cover are still fetched.
    ///
    /// # Errors
    ///
    /// `NoContent` when the cleaned page has nothing to package. Image and
    /// cover failures are reported to the observer and never fail the call.
    pub fn convert_html(&self, html: &str, page_url: &Url, cover_url: Option<&str>) -> Result<Book> {
        self.observer.stage(Stage::ExtractingMetadata);
        let metadata = Document::parse(html).extract_metadata(&self.settings);
        tracing::debug!(title = %metadata.title, author = %metadata.author, date = %metadata.date, "metadata extracted");

        self.observer.stage(Stage::Sanitizing);
        let cleaned = sanitize_html(html, &SanitizeConfig::default())?;

        self.observer.stage(Stage::LocatingContent);
        let cleaned_doc = Document::parse(&cleaned);
        let content = locate_content(&cleaned_doc)?.outer_html();

        let mut book = Book::new(metadata, &self.settings.language, &self.settings.image_dir);

        self.observer.stage(Stage::EmbeddingImages);
        let content = ImageEmbedder::new(self.fetcher, self.observer).embed(&content, page_url, &mut book)?;

        if let Some(cover_url) = cover_url {
            self.observer.stage(Stage::FetchingCover);
            self.attach_cover(&mut book, page_url, cover_url);
        }

        self.observer.stage(Stage::RenderingChapter);
        book.chapter = render_chapter(&book.metadata, &content, &self.settings.language, STYLESHEET_HREF);
        book.chapter_file = self.settings.chapter_file.clone();
        book.stylesheet = self.settings.stylesheet.clone();
        book.source_url = Some(page_url.to_string());

        Ok(book)
    }

    fn fetch_page(&self, page_url: &Url) -> Result<String> {
        self.observer.stage(Stage::FetchingPage);
        let html = self.fetcher.fetch_text(page_url)?;
        tracing::debug!(url = %page_url, size = html.len(), "page fetched");
        Ok(html)
    }

    fn attach_cover(&self, book: &mut Book, page_url: &Url, cover_url: &str) {
        let result = resolve_image_url(page_url, cover_url)
            .and_then(|url| self.fetcher.fetch_bytes(&url).map(|data| (url, data)));

        match result {
            Ok((url, data)) => {
                let image_type = ImageType::from_url(&url);
                tracing::debug!(%url, size = data.len(), "cover fetched");
                book.set_cover(Cover {
                    file_name: image_type.file_name("cover"),
                    media_type: image_type.media_type.to_string(),
                    data,
                });
            }
            Err(e) => {
                tracing::warn!(url = cover_url, error = %e, "cover skipped");
                self.observer.warning(&Warning::CoverFailed { url: cover_url.to_string(), reason: e.to_string() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl MapFetcher {
        fn new(responses: &[(&str, &[u8])]) -> Self {
            Self(responses.iter().map(|(url, body)| (url.to_string(), body.to_vec())).collect())
        }
    }

    impl Fetch for MapFetcher {
        fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
            self.0.get(url.as_str()).cloned().ok_or_else(|| PagebindError::HttpStatus { status: 404, url: url.to_string() })
        }
    }

    #[derive(Default)]
    struct Recorder {
        stages: RefCell<Vec<Stage>>,
        warnings: RefCell<Vec<Warning>>,
    }

    impl Observer for Recorder {
        fn stage(&self, stage: Stage) {
            self.stages.borrow_mut().push(stage);
        }

        fn warning(&self, warning: &Warning) {
            self.warnings.borrow_mut().push(warning.clone());
        }
    }

    const PAGE: &str = r#"<html><head><title>Post</title>
        <meta property="og:title" content="A Post">
        <meta name="author" content="Ann">
        <script>track()</script></head>
        <body><nav>Menu</nav><article><p>Story.</p><img src="/a.png"></article></body></html>"#;

    #[test]
    fn test_request_validation() {
        assert!(matches!(ConversionRequest::new("", None), Err(PagebindError::MissingUrl)));
        assert!(matches!(ConversionRequest::new("   ", None), Err(PagebindError::MissingUrl)));
        assert!(matches!(ConversionRequest::new("not a url", None), Err(PagebindError::InvalidUrl(_))));
        assert!(matches!(ConversionRequest::new("ftp://ex.com/x", None), Err(PagebindError::InvalidUrl(_))));

        let request = ConversionRequest::new(" https://ex.com/post ", Some("  ")).unwrap();
        assert_eq!(request.page_url.as_str(), "https://ex.com/post");
        assert_eq!(request.cover_url, None);
    }

    #[test]
    fn test_request_accepts_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<p>x</p>").unwrap();

        let request = ConversionRequest::new(path.to_str().unwrap(), None).unwrap();
        assert_eq!(request.page_url.scheme(), "file");
        assert_eq!(request.page_url.to_file_path().unwrap(), fs::canonicalize(&path).unwrap());
    }

    #[test]
    fn test_convert_runs_stages_in_order() {
        let fetcher = MapFetcher::new(&[("https://ex.com/post", PAGE.as_bytes()), ("https://ex.com/a.png", b"PNG")]);
        let observer = Recorder::default();
        let request = ConversionRequest::new("https://ex.com/post", None).unwrap();

        let book = Converter::new(Settings::default(), &fetcher).with_observer(&observer).convert(&request).unwrap();

        assert_eq!(
            observer.stages.borrow().as_slice(),
            [
                Stage::FetchingPage,
                Stage::ExtractingMetadata,
                Stage::Sanitizing,
                Stage::LocatingContent,
                Stage::EmbeddingImages,
                Stage::RenderingChapter,
            ]
        );
        assert_eq!(book.metadata.title, "A Post");
        assert_eq!(book.metadata.author, "Ann");
        assert_eq!(book.source_url.as_deref(), Some("https://ex.com/post"));
        assert_eq!(book.chapter_file, "chapter.xhtml");
        assert!(book.chapter.contains(r#"<img src="images/image_1.png"/>"#));
        assert!(!book.chapter.contains("Menu"));
        assert!(!book.chapter.contains("track()"));
    }

    #[test]
    fn test_cover_is_attached() {
        let fetcher = MapFetcher::new(&[("https://ex.com/a.png", b"PNG"), ("https://ex.com/cover.webp", b"WEBP")]);
        let page_url = Url::parse("https://ex.com/post").unwrap();

        let book = Converter::new(Settings::default(), &fetcher).convert_html(PAGE, &page_url, Some("/cover.webp")).unwrap();

        let cover = book.cover().unwrap();
        assert_eq!(cover.file_name, "cover.webp");
        assert_eq!(cover.media_type, "image/webp");
        assert_eq!(cover.data, b"WEBP");
    }

    #[test]
    fn test_failed_cover_is_a_warning() {
        let fetcher = MapFetcher::new(&[("https://ex.com/a.png", b"PNG")]);
        let observer = Recorder::default();
        let page_url = Url::parse("https://ex.com/post").unwrap();

        let book = Converter::new(Settings::default(), &fetcher)
            .with_observer(&observer)
            .convert_html(PAGE, &page_url, Some("https://gone.ex.com/c.jpg"))
            .unwrap();

        assert!(book.cover().is_none());
        let warnings = observer.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], Warning::CoverFailed { url, .. } if url == "https://gone.ex.com/c.jpg"));
    }

    #[test]
    fn test_metadata_only() {
        let fetcher = MapFetcher::new(&[("https://ex.com/post", PAGE.as_bytes())]);
        let request = ConversionRequest::new("https://ex.com/post", None).unwrap();

        let metadata = Converter::new(Settings::for_language("fr"), &fetcher).metadata(&request).unwrap();
        assert_eq!(metadata, Metadata { title: "A Post".to_string(), author: "Ann".to_string(), date: String::new() });
    }

    #[test]
    fn test_page_fetch_failure_is_fatal() {
        let fetcher = MapFetcher::new(&[]);
        let request = ConversionRequest::new("https://ex.com/post", None).unwrap();

        let result = Converter::new(Settings::default(), &fetcher).convert(&request);
        assert!(matches!(result, Err(PagebindError::HttpStatus { status: 404, .. })));
    }
}
