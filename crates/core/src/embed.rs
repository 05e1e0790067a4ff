//! Image embedding.
//!
//! [`ImageEmbedder`] streams the content HTML through a rewriter. Every
//! `<img>` is handled in document order: its source is resolved against the
//! page URL, downloaded, registered with a [`ResourceSink`], and its `src` is
//! pointed at the packaged copy. Images that cannot be embedded are removed,
//! as are `<picture>` sources, so the output never references anything that
//! is not in the book.

use lol_html::{HtmlRewriter, Settings, element};
use url::Url;

use crate::book::ResourceSink;
use crate::fetch::Fetch;
use crate::media::ImageType;
use crate::observer::{Observer, Warning};
use crate::{PagebindError, Result};

/// Downloads and embeds the images of a content fragment.
pub struct ImageEmbedder<'a> {
    fetcher: &'a dyn Fetch,
    observer: &'a dyn Observer,
}

impl<'a> ImageEmbedder<'a> {
    pub fn new(fetcher: &'a dyn Fetch, observer: &'a dyn Observer) -> Self {
        Self { fetcher, observer }
    }

    /// Rewrites every `<img>` in `html` and returns the new HTML.
    ///
    /// Images are numbered from 1 in document order, counting dropped ones,
    /// and stored as `image_{n}.{ext}`. Embedded images lose `srcset` and
    /// `sizes`, and `<source>` children of `<picture>` are removed, so no
    /// remote candidate survives.
    ///
    /// # Errors
    ///
    /// Only a failure of the rewriter itself is an error. Per-image failures
    /// are reported to the observer and the image is dropped.
    pub fn embed(&self, html: &str, base_url: &Url, sink: &mut dyn ResourceSink) -> Result<String> {
        let mut output = Vec::with_capacity(html.len());
        let mut index = 0usize;

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("img", |el| {
                        index += 1;
                        match self.embed_one(index, el.get_attribute("src"), base_url, sink) {
                            Some(local_path) => {
                                el.set_attribute("src", &local_path)?;
                                el.remove_attribute("srcset");
                                el.remove_attribute("sizes");
                            }
                            None => el.remove(),
                        }
                        Ok(())
                    }),
                    element!("picture source", |el| {
                        let srcset = el.get_attribute("srcset").unwrap_or_default();
                        tracing::debug!(%srcset, "dropping picture source");
                        el.remove();
                        Ok(())
                    }),
                ],
                ..Default::default()
            },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter.write(html.as_bytes())?;
        rewriter.end()?;

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Embeds a single image, returning its local path, or `None` when the
    /// element must be dropped.
    fn embed_one(
        &self, index: usize, src: Option<String>, base_url: &Url, sink: &mut dyn ResourceSink,
    ) -> Option<String> {
        let Some(src) = src.map(|s| s.trim().replace("&amp;", "&")).filter(|s| !s.is_empty()) else {
            tracing::debug!(index, "dropping image without src");
            return None;
        };

        let url = match resolve_image_url(base_url, &src) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(index, %src, error = %e, "unresolvable image source");
                self.observer.warning(&Warning::ImageUnresolvable { src, reason: e.to_string() });
                return None;
            }
        };

        let data = match self.fetcher.fetch_bytes(&url) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(index, %url, error = %e, "image download failed");
                self.observer.warning(&Warning::ImageFetchFailed { url: url.to_string(), reason: e.to_string() });
                return None;
            }
        };

        let image_type = ImageType::from_url(&url);
        let file_name = image_type.file_name(&format!("image_{}", index));
        let size = data.len();
        let local_path = sink.add_image(&file_name, data, image_type.media_type);

        tracing::debug!(index, %url, %local_path, size, "image embedded");
        self.observer.image_embedded(index, &url, &local_path, size);

        Some(local_path)
    }
}

/// Resolves an image source against the page URL.
///
/// Protocol-relative sources (`//host/path`) always become `https`. Only
/// `http` and `https` results are accepted, plus `file` when the page itself
/// was read from disk.
pub fn resolve_image_url(base_url: &Url, src: &str) -> Result<Url> {
    let resolved = if src.starts_with("//") { Url::parse(&format!("https:{}", src)) } else { base_url.join(src) };
    let url = resolved.map_err(|e| PagebindError::InvalidUrl(format!("{}: {}", src, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        "file" if base_url.scheme() == "file" => Ok(url),
        scheme => Err(PagebindError::InvalidUrl(format!("unsupported image scheme '{}'", scheme))),
    }
}
