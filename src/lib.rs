//! epub-xhtml -- streaming XHTML-to-book-model conversion for EPUB readers
//!
//! Converts one XHTML chapter at a time into a flat book model: paragraphs,
//! inline control spans, hyperlinks, labels, images and section breaks. CSS
//! rules from `<style>` blocks, linked stylesheets and `style` attributes are
//! cascaded during the single parsing pass, without building a DOM.
//!
//! ```
//! use epub_xhtml::{BookModel, MemoryStore, TagActionRegistry, XhtmlReader};
//!
//! let store = MemoryStore::new().with_entry(
//!     "OEBPS/ch1.xhtml",
//!     "<html><body><p>Hello <b>world</b></p></body></html>",
//! );
//! let registry = TagActionRegistry::build();
//! let mut reader = XhtmlReader::new();
//! let mut model = BookModel::new();
//! reader
//!     .read_file(&registry, &store, &mut model, "OEBPS/ch1.xhtml", "OEBPS/ch1.xhtml")
//!     .unwrap();
//! assert_eq!(model.paragraphs().next().unwrap().text(), "Hello world");
//! ```
//!
//! # Features
//!
//! - `cli` -- builds the `xhtml-dump` binary

#![warn(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

extern crate alloc;

pub mod aliases;
pub mod css;
pub mod error;
pub mod model;
pub mod reader;
pub mod store;
pub mod tags;
pub mod tokenizer;

pub use aliases::{decode_html_url, directory_prefix, normalize_path, FileAliases, ReferenceKind};
pub use css::{
    parse_inline_style, Alignment, Length, LengthFeature, SizeUnit, StyleEntry, StyleOrigin,
    StyleSheetParser, StyleSheetTable,
};
pub use error::{ErrorLimitContext, ErrorPhase, XhtmlError};
pub use model::{Block, BookModel, BookSink, ImageRef, Paragraph, ParagraphItem, TextKind};
pub use reader::{DocumentConverter, ReadState, ReaderLimits, XhtmlReader};
pub use store::{DirectoryStore, MemoryStore, ResourceStore};
pub use tags::{
    ImageSource, TagAction, TagActionRegistry, LIST_ITEM_BULLET, SVG_NAMESPACE, XLINK_NAMESPACE,
};
pub use tokenizer::{tokenize_xhtml, Attribute, Attributes, ContentHandler, TagName};
