//! EPUB packaging.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};

use crate::book::Book;
use crate::chapter::strip_invalid_xml_chars;
use crate::{PagebindError, Result};

const GENERATOR: &str = "pagebind";

impl Book {
    /// Serializes the book into EPUB bytes.
    ///
    /// The package holds the stylesheet, the cover when set, every embedded
    /// image, one chapter, and an inline table of contents.
    pub fn to_epub_bytes(&self) -> Result<Vec<u8>> {
        let mut builder = EpubBuilder::new(ZipLibrary::new().map_err(package_error)?).map_err(package_error)?;

        let title = strip_invalid_xml_chars(&self.metadata.title);
        let author = strip_invalid_xml_chars(&self.metadata.author);

        builder
            .metadata("title", title.as_str())
            .map_err(package_error)?
            .metadata("author", author.as_str())
            .map_err(package_error)?
            .metadata("lang", self.language.as_str())
            .map_err(package_error)?
            .metadata("generator", GENERATOR)
            .map_err(package_error)?;

        if let Some(source) = &self.source_url {
            builder.metadata("description", source.as_str()).map_err(package_error)?;
        }

        builder.stylesheet(self.stylesheet.as_bytes()).map_err(package_error)?;

        if let Some(cover) = self.cover() {
            builder
                .add_cover_image(&cover.file_name, cover.data.as_slice(), cover.media_type.as_str())
                .map_err(package_error)?;
        }

        for resource in self.resources() {
            builder
                .add_resource(&resource.path, resource.data.as_slice(), resource.media_type.as_str())
                .map_err(package_error)?;
        }

        builder
            .add_content(
                EpubContent::new(self.chapter_file.as_str(), self.chapter.as_bytes())
                    .title(title.as_str())
                    .reftype(ReferenceType::Text),
            )
            .map_err(package_error)?;
        builder.inline_toc();

        let mut bytes = Vec::new();
        builder.generate(&mut bytes).map_err(package_error)?;

        tracing::debug!(size = bytes.len(), resources = self.resources().len(), "epub generated");
        Ok(bytes)
    }
}

/// Writes `book` to `path`.
///
/// The archive is generated completely in memory before the file is created,
/// so a packaging failure never leaves a partial file behind.
pub fn write_epub(book: &Book, path: &Path) -> Result<()> {
    let bytes = book.to_epub_bytes()?;
    fs::write(path, &bytes)?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "epub written");
    Ok(())
}

fn package_error(e: impl Display) -> PagebindError {
    PagebindError::PackageError(e.to_string())
}
