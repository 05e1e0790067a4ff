pub mod book;
pub mod chapter;
pub mod convert;
pub mod embed;
pub mod epub;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod media;
pub mod metadata;
pub mod observer;
pub mod parse;
pub mod sanitize;
pub mod settings;

pub use book::{Book, Cover, Resource, ResourceSink};
pub use chapter::{escape_xml, render_chapter, to_xhtml};
pub use convert::{ConversionRequest, Converter};
pub use embed::{ImageEmbedder, resolve_image_url};
pub use epub::write_epub;
pub use error::{PagebindError, Result};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetch, FetchConfig, fetch_file};
pub use locate::locate_content;
pub use media::ImageType;
pub use metadata::Metadata;
pub use observer::{NoopObserver, Observer, Stage, Warning};
pub use parse::{Document, Element};
pub use sanitize::{SanitizeConfig, sanitize_html};
pub use settings::{DEFAULT_STYLESHEET, Settings};
