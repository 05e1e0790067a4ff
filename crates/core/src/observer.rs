//! Progress and warning reporting.
//!
//! The conversion pipeline never prints. It reports what it is doing to an
//! [`Observer`], which the CLI renders on stderr and tests record in memory.

use std::fmt;

use url::Url;

/// Pipeline stages, in the order a conversion runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingPage,
    ExtractingMetadata,
    Sanitizing,
    LocatingContent,
    EmbeddingImages,
    FetchingCover,
    RenderingChapter,
}

impl Stage {
    pub const COUNT: usize = 7;

    /// 1-based position of the stage.
    pub fn number(self) -> usize {
        match self {
            Stage::FetchingPage => 1,
            Stage::ExtractingMetadata => 2,
            Stage::Sanitizing => 3,
            Stage::LocatingContent => 4,
            Stage::EmbeddingImages => 5,
            Stage::FetchingCover => 6,
            Stage::RenderingChapter => 7,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::FetchingPage => "Fetching page",
            Stage::ExtractingMetadata => "Extracting metadata",
            Stage::Sanitizing => "Removing scripts, navigation and ads",
            Stage::LocatingContent => "Locating main content",
            Stage::EmbeddingImages => "Embedding images",
            Stage::FetchingCover => "Fetching cover",
            Stage::RenderingChapter => "Rendering chapter",
        };
        f.write_str(label)
    }
}

/// A recoverable, per-resource failure. The conversion carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An image `src` could not be turned into a fetchable URL.
    ImageUnresolvable { src: String, reason: String },
    /// An image could not be downloaded; its element was dropped.
    ImageFetchFailed { url: String, reason: String },
    /// The cover could not be resolved or downloaded; the book has no cover.
    CoverFailed { url: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ImageUnresolvable { src, reason } => write!(f, "Cannot resolve image {}: {}", src, reason),
            Warning::ImageFetchFailed { url, reason } => write!(f, "Cannot download image {}: {}", url, reason),
            Warning::CoverFailed { url, reason } => write!(f, "Cannot download cover {}: {}", url, reason),
        }
    }
}

/// Receives progress events from a conversion. Every method defaults to a no-op.
pub trait Observer {
    fn stage(&self, _stage: Stage) {}

    fn image_embedded(&self, _index: usize, _url: &Url, _local_path: &str, _bytes: usize) {}

    fn warning(&self, _warning: &Warning) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_numbers_are_sequential() {
        let stages = [
            Stage::FetchingPage,
            Stage::ExtractingMetadata,
            Stage::Sanitizing,
            Stage::LocatingContent,
            Stage::EmbeddingImages,
            Stage::FetchingCover,
            Stage::RenderingChapter,
        ];
        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage.number(), i + 1);
        }
        assert_eq!(stages.len(), Stage::COUNT);
    }

    #[test]
    fn test_warning_display_names_url() {
        let warning =
            Warning::ImageFetchFailed { url: "https://ex.com/b.jpg".to_string(), reason: "timed out".to_string() };
        let message = warning.to_string();
        assert!(message.contains("https://ex.com/b.jpg"));
        assert!(message.contains("timed out"));
    }
}
