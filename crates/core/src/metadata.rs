use serde::Serialize;

use crate::Document;
use crate::settings::Settings;

/// Book metadata pulled from the page.
///
/// Every field is always set: absent values are replaced by the configured
/// defaults, and a missing date is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub date: String,
}

impl Metadata {
    /// Whether a publish date was found.
    pub fn has_date(&self) -> bool {
        !self.date.is_empty()
    }
}

impl Document {
    /// Extract title with priority fallback:
    /// 1. Meta keys from `keys`, in order (by default `og:title`, `twitter:title`)
    /// 2. `<title>` element, trimmed
    pub fn extract_title(&self, keys: &[String]) -> Option<String> {
        self.first_meta_content(keys).or_else(|| self.title())
    }

    /// Extract author from the meta keys in `keys`
    /// (by default `author`, `article:author`).
    pub fn extract_author(&self, keys: &[String]) -> Option<String> {
        self.first_meta_content(keys)
    }

    /// Extract publish date from the meta keys in `keys`
    /// (by default `article:published_time`, `og:updated_time`).
    pub fn extract_date(&self, keys: &[String]) -> Option<String> {
        self.first_meta_content(keys)
    }

    /// Extract all metadata at once, applying the defaults from `settings`.
    pub fn extract_metadata(&self, settings: &Settings) -> Metadata {
        Metadata {
            title: self.extract_title(&settings.title_meta).unwrap_or_else(|| settings.default_title.clone()),
            author: self.extract_author(&settings.author_meta).unwrap_or_else(|| settings.default_author.clone()),
            date: self.extract_date(&settings.date_meta).unwrap_or_default(),
        }
    }

    fn first_meta_content(&self, keys: &[String]) -> Option<String> {
        keys.iter().find_map(|key| self.get_meta_content(key))
    }

    /// Get meta tag content by `property`, then by `name`.
    ///
    /// Returns the first matching tag whose `content` is non-empty once trimmed.
    fn get_meta_content(&self, key: &str) -> Option<String> {
        let key = key.replace('\\', "\\\\").replace('"', "\\\"");

        for attr in ["property", "name"] {
            let selector = format!("meta[{}=\"{}\"]", attr, key);
            if let Ok(elements) = self.select(&selector) {
                for el in elements {
                    if let Some(content) = el.attr("content") {
                        let content = content.trim();
                        if !content.is_empty() {
                            return Some(content.to_string());
                        }
                    }
                }
            }
        }

        None
    }
}
