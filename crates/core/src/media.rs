//! Image type detection from URLs.

use url::Url;

/// Raster extensions kept as-is; anything else is packaged as `jpg`.
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Normalized file extension and media type for an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    /// Extension used for the packaged file name, without the dot.
    pub extension: &'static str,
    /// MIME type registered with the package.
    pub media_type: &'static str,
}

impl ImageType {
    pub const JPEG: ImageType = ImageType { extension: "jpg", media_type: "image/jpeg" };

    /// Derives the image type from the last path segment of `url`.
    ///
    /// The query string and fragment are ignored. An unknown or missing
    /// extension falls back to `jpg`.
    pub fn from_url(url: &Url) -> Self {
        let file_name = url.path_segments().and_then(|mut segments| segments.next_back()).unwrap_or_default();

        match file_name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::JPEG,
        }
    }

    /// Maps a raw extension onto the whitelist.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();

        match KNOWN_EXTENSIONS.iter().find(|known| **known == ext) {
            Some(&"jpeg") => ImageType { extension: "jpeg", media_type: "image/jpeg" },
            Some(&"png") => ImageType { extension: "png", media_type: "image/png" },
            Some(&"gif") => ImageType { extension: "gif", media_type: "image/gif" },
            Some(&"webp") => ImageType { extension: "webp", media_type: "image/webp" },
            _ => Self::JPEG,
        }
    }

    /// `{stem}.{extension}`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension)
    }
}
