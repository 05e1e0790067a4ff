//! Conversion settings and their on-disk form.
//!
//! [`Settings`] gathers everything that used to differ between the
//! hand-copied converter variants: language tag, default literals, which meta
//! tags feed the metadata fallback chains, output naming, and the stylesheet.
//! It deserializes from JSON with every field optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fetch::FetchConfig;
use crate::{PagebindError, Result};

/// Stylesheet bundled with every book unless overridden.
pub const DEFAULT_STYLESHEET: &str = "body { font-family: serif; line-height: 1.5; margin: 1em; }
img { max-width: 100%; height: auto; display: block; margin: 0.5em auto; }
h1 { text-align: center; margin-bottom: 1em; }
";

/// Name of the settings file looked up in the user config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Fallback output name when the title sanitizes to nothing.
const FALLBACK_OUTPUT: &str = "article.epub";

/// Configuration for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Language tag written to the package and the chapter.
    pub language: String,
    /// Title used when no meta tag or `<title>` provides one.
    pub default_title: String,
    /// Author used when no meta tag provides one.
    pub default_author: String,
    /// Meta keys tried in order for the title.
    pub title_meta: Vec<String>,
    /// Meta keys tried in order for the author.
    pub author_meta: Vec<String>,
    /// Meta keys tried in order for the publish date.
    pub date_meta: Vec<String>,
    /// Output file name template; `{title}` is replaced by the sanitized title.
    pub output_template: String,
    /// Directory inside the package that receives embedded images.
    pub image_dir: String,
    /// File name of the single chapter document.
    pub chapter_file: String,
    /// CSS bundled as the book stylesheet.
    pub stylesheet: String,
    /// Network settings for page, image, and cover fetches.
    pub fetch: FetchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            default_title: "Untitled".to_string(),
            default_author: "Unknown".to_string(),
            title_meta: vec!["og:title".to_string(), "twitter:title".to_string()],
            author_meta: vec!["author".to_string(), "article:author".to_string()],
            date_meta: vec!["article:published_time".to_string(), "og:updated_time".to_string()],
            output_template: "{title}.epub".to_string(),
            image_dir: "images".to_string(),
            chapter_file: "chapter.xhtml".to_string(),
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Settings {
    /// Defaults localized for a language tag.
    ///
    /// French tags (`fr`, `fr-CA`, ...) get French default literals; every
    /// other tag keeps the English ones.
    pub fn for_language(language: &str) -> Self {
        let mut settings = Self { language: language.to_string(), ..Self::default() };

        if language.split(['-', '_']).next().is_some_and(|primary| primary.eq_ignore_ascii_case("fr")) {
            settings.default_title = "Sans titre".to_string();
            settings.default_author = "Inconnu".to_string();
        }

        settings
    }

    /// Switches the language tag. Default literals still holding the preset of
    /// the previous language are replaced by the new preset; custom ones stay.
    pub fn set_language(&mut self, language: &str) {
        let previous = Self::for_language(&self.language);
        let next = Self::for_language(language);

        if self.default_title == previous.default_title {
            self.default_title = next.default_title;
        }
        if self.default_author == previous.default_author {
            self.default_author = next.default_author;
        }
        self.language = language.to_string();
    }

    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PagebindError::FileNotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| PagebindError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// `<config dir>/pagebind/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pagebind").join(SETTINGS_FILE))
    }

    /// Loads settings from `explicit` if given (it must exist), otherwise from
    /// the default location when present, otherwise returns defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Output file name derived from a title through `output_template`.
    pub fn output_file_name(&self, title: &str) -> String {
        let stem = sanitize_file_stem(title);
        if stem.is_empty() {
            return FALLBACK_OUTPUT.to_string();
        }

        let name = self.output_template.replace("{title}", &stem);
        if name.ends_with(".epub") { name } else { format!("{}.epub", name) }
    }
}

/// Reduces a title to a portable file stem: letters, digits, `-` and `_`
/// survive, every other run of characters becomes a single `_`.
fn sanitize_file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut pending_sep = false;

    for c in title.trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            if pending_sep && !stem.is_empty() {
                stem.push('_');
            }
            pending_sep = false;
            stem.push(c);
        } else {
            pending_sep = true;
        }
    }

    stem.chars().take(120).collect()
}
