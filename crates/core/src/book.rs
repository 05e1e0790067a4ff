//! The in-memory book assembled by a conversion.
//!
//! A [`Book`] owns everything that ends up in the EPUB: metadata, the
//! stylesheet, the chapter XHTML, every embedded image, and the optional
//! cover. Nothing touches the disk until [`crate::write_epub`] serializes it
//! in one go.

use crate::Metadata;

/// Receives binary payloads discovered while rewriting content.
///
/// `add_image` returns the path the content should reference.
pub trait ResourceSink {
    fn add_image(&mut self, file_name: &str, data: Vec<u8>, media_type: &str) -> String;
}

/// A binary resource bundled with the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Path inside the package, relative to the content documents.
    pub path: String,
    /// MIME type.
    pub media_type: String,
    /// Original bytes, never re-encoded.
    pub data: Vec<u8>,
}

/// The book's cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Everything one conversion produces.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub metadata: Metadata,
    pub language: String,
    pub source_url: Option<String>,
    pub stylesheet: String,
    pub chapter_file: String,
    pub chapter: String,
    image_dir: String,
    resources: Vec<Resource>,
    cover: Option<Cover>,
}

impl Book {
    /// Creates an empty book whose images are stored under `image_dir`.
    pub fn new(metadata: Metadata, language: &str, image_dir: &str) -> Self {
        Self {
            metadata,
            language: language.to_string(),
            image_dir: image_dir.trim_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Registered resources in registration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Looks up a resource by the path returned from [`ResourceSink::add_image`].
    pub fn resource(&self, path: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.path == path)
    }

    pub fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }

    pub fn set_cover(&mut self, cover: Cover) {
        self.cover = Some(cover);
    }

    /// Total payload size of images and cover, in bytes.
    pub fn payload_size(&self) -> usize {
        self.resources.iter().map(|r| r.data.len()).sum::<usize>() + self.cover.as_ref().map_or(0, |c| c.data.len())
    }
}

impl ResourceSink for Book {
    fn add_image(&mut self, file_name: &str, data: Vec<u8>, media_type: &str) -> String {
        let path = if self.image_dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.image_dir, file_name)
        };

        self.resources.retain(|r| r.path != path);
        self.resources.push(Resource { path: path.clone(), media_type: media_type.to_string(), data });

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_image_returns_local_path() {
        let mut book = Book::new(Metadata::default(), "en", "images");
        let path = book.add_image("image_1.png", vec![1, 2, 3], "image/png");

        assert_eq!(path, "images/image_1.png");
        let resource = book.resource(&path).unwrap();
        assert_eq!(resource.data, vec![1, 2, 3]);
        assert_eq!(resource.media_type, "image/png");
    }

    #[test]
    fn test_image_dir_is_normalized() {
        let mut book = Book::new(Metadata::default(), "en", "/img/");
        assert_eq!(book.add_image("a.gif", Vec::new(), "image/gif"), "img/a.gif");

        let mut flat = Book::new(Metadata::default(), "en", "");
        assert_eq!(flat.add_image("a.gif", Vec::new(), "image/gif"), "a.gif");
    }

    #[test]
    fn test_same_path_replaces_resource() {
        let mut book = Book::new(Metadata::default(), "en", "images");
        book.add_image("image_1.jpg", vec![1], "image/jpeg");
        book.add_image("image_1.jpg", vec![2], "image/jpeg");

        assert_eq!(book.resources().len(), 1);
        assert_eq!(book.resources()[0].data, vec![2]);
    }

    #[test]
    fn test_payload_size_includes_cover() {
        let mut book = Book::new(Metadata::default(), "en", "images");
        book.add_image("image_1.jpg", vec![0; 10], "image/jpeg");
        book.set_cover(Cover { file_name: "cover.png".to_string(), media_type: "image/png".to_string(), data: vec![0; 5] });

        assert_eq!(book.payload_size(), 15);
        assert_eq!(book.cover().unwrap().file_name, "cover.png");
    }
}
