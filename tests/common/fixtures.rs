use std::path::PathBuf;

use epub_xhtml::{
    BookModel, DirectoryStore, MemoryStore, ReaderLimits, ResourceStore, TagActionRegistry,
    XhtmlError, XhtmlReader,
};

pub const BOOK_FIXTURE: &str = "tests/fixtures/book";

pub const CHAPTERS: &[&str] = &["OEBPS/text/ch1.xhtml", "OEBPS/text/ch2.xhtml"];

pub fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(BOOK_FIXTURE)
}

pub fn fixture_store() -> DirectoryStore {
    DirectoryStore::new(fixture_root())
}

/// In-memory book from `(path, contents)` pairs.
pub fn memory_book(entries: &[(&str, &str)]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for (path, contents) in entries {
        store.insert(*path, contents.as_bytes());
    }
    store
}

/// Wrap body markup in a minimal XHTML document.
pub fn xhtml(head: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <html xmlns=\"http://www.w3.org/1999/xhtml\"><head>{}</head><body>{}</body></html>",
        head, body
    )
}

/// Convert `chapters` in order into one model.
pub fn convert_book(
    store: &dyn ResourceStore,
    chapters: &[&str],
    limits: ReaderLimits,
    mark_cover: bool,
) -> Result<(XhtmlReader, BookModel), XhtmlError> {
    let registry = TagActionRegistry::build();
    let mut reader = XhtmlReader::with_limits(limits);
    if mark_cover {
        reader.set_mark_first_image_as_cover();
    }
    let mut model = BookModel::new();
    for chapter in chapters {
        reader.read_file(&registry, store, &mut model, chapter, chapter)?;
    }
    Ok((reader, model))
}

pub fn paragraph_texts(model: &BookModel) -> Vec<String> {
    model.paragraphs().map(|p| p.text()).collect()
}
