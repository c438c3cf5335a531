//! Book model sink: the write-side interface the converter drives, plus an
//! in-memory implementation.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::css::StyleEntry;

/// Semantic text kind carried by control and hyperlink markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// Plain text; also the placeholder kind for anchors without `href`.
    Regular,
    /// `<strong>`.
    Strong,
    /// `<b>`.
    Bold,
    /// `<em>`.
    Emphasis,
    /// `<i>`.
    Italic,
    /// `<code>`, `<tt>`, `<kbd>`, `<var>`, `<samp>`.
    Code,
    /// `<cite>`.
    Cite,
    /// `<sub>`.
    Sub,
    /// `<sup>`.
    Sup,
    /// `<dd>`.
    DefinitionDescription,
    /// `<dfn>`.
    Definition,
    /// `<strike>`.
    Strikethrough,
    /// `<h1>`..`<h6>`, level 1-6.
    Heading(u8),
    /// `<pre>`.
    Preformatted,
    /// Wrapper around a standalone image paragraph.
    Image,
    /// Link to a location inside the book.
    InternalHyperlink,
    /// Link to an external URI.
    ExternalHyperlink,
}

/// Registered image resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    /// Normalized resource path inside the book.
    pub path: String,
    /// Media type guessed from the file extension.
    pub media_type: Option<&'static str>,
}

impl ImageRef {
    /// Build a reference, guessing the media type from `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let media_type = guess_media_type(&path);
        Self { path, media_type }
    }
}

fn guess_media_type(path: &str) -> Option<&'static str> {
    let (_, ext) = path.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Write-side interface for a book model under construction.
///
/// Calls arrive in document order. Item methods are only meaningful while a
/// paragraph is open; implementations may ignore them otherwise.
pub trait BookSink {
    /// Open a new paragraph, closing any paragraph still open.
    fn begin_paragraph(&mut self);
    /// Close the open paragraph, if any.
    fn end_paragraph(&mut self);
    /// Whether a paragraph is currently open.
    fn is_paragraph_open(&self) -> bool;
    /// Number of paragraphs begun so far.
    fn paragraph_count(&self) -> usize;
    /// Push a text kind that is reopened at every paragraph start.
    fn push_kind(&mut self, kind: TextKind);
    /// Pop the innermost text kind.
    fn pop_kind(&mut self);
    /// Append text to the open paragraph.
    fn append_text(&mut self, text: &str);
    /// Append a run of `width` non-collapsible spaces.
    fn append_fixed_space(&mut self, width: usize);
    /// Open a control span.
    fn open_control(&mut self, kind: TextKind);
    /// Close a control span.
    fn close_control(&mut self, kind: TextKind);
    /// Open a hyperlink span pointing at `target`.
    fn open_hyperlink(&mut self, kind: TextKind, target: &str);
    /// Register a named location at the current position.
    fn register_label(&mut self, name: &str);
    /// Apply a style entry from this point on.
    fn apply_style(&mut self, entry: &Rc<StyleEntry>);
    /// Close the innermost applied style entry.
    fn close_style(&mut self);
    /// Start a new section.
    fn insert_section_break(&mut self);
    /// Register an image and place it at the current position.
    fn register_image(&mut self, name: &str, image: ImageRef, is_cover: bool);
}

/// One item inside a [`Paragraph`].
#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphItem {
    /// Text, merged with adjacent text.
    Text(String),
    /// Fixed-width whitespace run.
    FixedSpace(usize),
    /// Control marker.
    Control {
        /// Kind of the span.
        kind: TextKind,
        /// `true` on open, `false` on close.
        open: bool,
    },
    /// Hyperlink open marker.
    Hyperlink {
        /// Internal or external.
        kind: TextKind,
        /// Resolved target.
        target: String,
    },
    /// Style entry applied from here on.
    Style(Rc<StyleEntry>),
    /// Innermost style entry ends here.
    StyleClose,
    /// Image reference.
    Image {
        /// Registered image name.
        name: String,
        /// Whether the image was flagged as the cover.
        is_cover: bool,
    },
}

/// A paragraph of the book model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    /// Items in document order.
    pub items: Vec<ParagraphItem>,
}

impl Paragraph {
    /// Concatenated text, with fixed spaces expanded.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                ParagraphItem::Text(text) => out.push_str(text),
                ParagraphItem::FixedSpace(width) => out.extend(core::iter::repeat(' ').take(*width)),
                _ => {}
            }
        }
        out
    }

    /// Names of images placed in this paragraph.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            ParagraphItem::Image { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    fn push_text(&mut self, text: &str) {
        if let Some(ParagraphItem::Text(last)) = self.items.last_mut() {
            last.push_str(text);
        } else {
            self.items.push(ParagraphItem::Text(String::from(text)));
        }
    }
}

/// Top-level block of the book model.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// A closed paragraph.
    Paragraph(Paragraph),
    /// Section boundary.
    SectionBreak,
}

/// In-memory [`BookSink`] implementation.
#[derive(Clone, Debug, Default)]
pub struct BookModel {
    blocks: Vec<Block>,
    current: Option<Paragraph>,
    kinds: Vec<TextKind>,
    labels: BTreeMap<String, usize>,
    images: BTreeMap<String, ImageRef>,
    cover: Option<String>,
    paragraphs: usize,
    section_has_content: bool,
}

impl BookModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Closed paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::SectionBreak => None,
        })
    }

    /// Number of section breaks.
    pub fn section_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::SectionBreak))
            .count()
    }

    /// The paragraph still open, if any.
    pub fn open_paragraph(&self) -> Option<&Paragraph> {
        self.current.as_ref()
    }

    /// Block index a label points at.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// All labels.
    pub fn labels(&self) -> &BTreeMap<String, usize> {
        &self.labels
    }

    /// All registered images by name.
    pub fn images(&self) -> &BTreeMap<String, ImageRef> {
        &self.images
    }

    /// Name of the cover image, if one was flagged.
    pub fn cover_image(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    fn push_item(&mut self, item: ParagraphItem) {
        if let Some(paragraph) = self.current.as_mut() {
            paragraph.items.push(item);
        }
    }
}

impl BookSink for BookModel {
    fn begin_paragraph(&mut self) {
        self.end_paragraph();
        let mut paragraph = Paragraph::default();
        paragraph.items.extend(
            self.kinds
                .iter()
                .filter(|kind| **kind != TextKind::Regular)
                .map(|kind| ParagraphItem::Control {
                    kind: *kind,
                    open: true,
                }),
        );
        self.current = Some(paragraph);
        self.paragraphs += 1;
    }

    fn end_paragraph(&mut self) {
        if let Some(paragraph) = self.current.take() {
            self.blocks.push(Block::Paragraph(paragraph));
        }
    }

    fn is_paragraph_open(&self) -> bool {
        self.current.is_some()
    }

    fn paragraph_count(&self) -> usize {
        self.paragraphs
    }

    fn push_kind(&mut self, kind: TextKind) {
        self.kinds.push(kind);
    }

    fn pop_kind(&mut self) {
        self.kinds.pop();
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(paragraph) = self.current.as_mut() {
            paragraph.push_text(text);
            self.section_has_content = true;
        }
    }

    fn append_fixed_space(&mut self, width: usize) {
        if width > 0 && self.current.is_some() {
            self.push_item(ParagraphItem::FixedSpace(width));
            self.section_has_content = true;
        }
    }

    fn open_control(&mut self, kind: TextKind) {
        self.push_item(ParagraphItem::Control { kind, open: true });
    }

    fn close_control(&mut self, kind: TextKind) {
        self.push_item(ParagraphItem::Control { kind, open: false });
    }

    fn open_hyperlink(&mut self, kind: TextKind, target: &str) {
        self.push_item(ParagraphItem::Hyperlink {
            kind,
            target: String::from(target),
        });
    }

    fn register_label(&mut self, name: &str) {
        let position = self.blocks.len();
        self.labels.entry(String::from(name)).or_insert(position);
    }

    fn apply_style(&mut self, entry: &Rc<StyleEntry>) {
        self.push_item(ParagraphItem::Style(Rc::clone(entry)));
    }

    fn close_style(&mut self) {
        self.push_item(ParagraphItem::StyleClose);
    }

    fn insert_section_break(&mut self) {
        if !self.section_has_content {
            return;
        }
        self.end_paragraph();
        if !matches!(self.blocks.last(), Some(Block::SectionBreak)) {
            self.blocks.push(Block::SectionBreak);
        }
        self.section_has_content = false;
    }

    fn register_image(&mut self, name: &str, image: ImageRef, is_cover: bool) {
        self.images.insert(String::from(name), image);
        if is_cover && self.cover.is_none() {
            self.cover = Some(String::from(name));
        }
        let item = ParagraphItem::Image {
            name: String::from(name),
            is_cover,
        };
        if self.current.is_some() {
            self.push_item(item);
        } else {
            self.begin_paragraph();
            self.open_control(TextKind::Image);
            self.push_item(item);
            self.close_control(TextKind::Image);
            self.end_paragraph();
        }
        self.section_has_content = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_paragraph(model: &BookModel) -> &Paragraph {
        let mut paragraphs = model.paragraphs();
        let first = paragraphs.next().expect("one paragraph");
        assert!(paragraphs.next().is_none());
        first
    }

    #[test]
    fn adjacent_text_merges_and_items_outside_paragraphs_are_dropped() {
        let mut model = BookModel::new();
        model.append_text("lost");
        model.begin_paragraph();
        model.append_text("Hello ");
        model.append_text("world");
        model.end_paragraph();
        model.append_fixed_space(4);

        let paragraph = only_paragraph(&model);
        assert_eq!(paragraph.items, vec![ParagraphItem::Text("Hello world".into())]);
        assert_eq!(model.paragraph_count(), 1);
    }

    #[test]
    fn begin_paragraph_reopens_pushed_kinds() {
        let mut model = BookModel::new();
        model.push_kind(TextKind::Heading(2));
        model.push_kind(TextKind::Regular);
        model.begin_paragraph();
        model.append_text("Title");
        model.end_paragraph();

        assert_eq!(
            only_paragraph(&model).items,
            vec![
                ParagraphItem::Control {
                    kind: TextKind::Heading(2),
                    open: true
                },
                ParagraphItem::Text("Title".into()),
            ]
        );
    }

    #[test]
    fn section_breaks_need_content_and_do_not_stack() {
        let mut model = BookModel::new();
        model.insert_section_break();
        model.begin_paragraph();
        model.insert_section_break();
        assert!(model.blocks().is_empty());
        assert!(model.is_paragraph_open());

        model.append_text("one");
        model.insert_section_break();
        model.insert_section_break();
        assert!(!model.is_paragraph_open());
        assert_eq!(model.section_breaks(), 1);
        assert!(matches!(model.blocks().last(), Some(Block::SectionBreak)));
    }

    #[test]
    fn labels_keep_first_position() {
        let mut model = BookModel::new();
        model.register_label("0");
        model.begin_paragraph();
        model.append_text("a");
        model.end_paragraph();
        model.register_label("0");
        model.register_label("0#later");
        assert_eq!(model.label("0"), Some(0));
        assert_eq!(model.label("0#later"), Some(1));
    }

    #[test]
    fn standalone_image_gets_wrapped_paragraph_and_cover_is_sticky() {
        let mut model = BookModel::new();
        model.register_image("OEBPS/cover.jpg", ImageRef::new("OEBPS/cover.jpg"), true);
        model.register_image("OEBPS/b.png", ImageRef::new("OEBPS/b.png"), true);

        assert_eq!(model.cover_image(), Some("OEBPS/cover.jpg"));
        assert_eq!(
            model.images()["OEBPS/cover.jpg"].media_type,
            Some("image/jpeg")
        );
        let first = model.paragraphs().next().expect("image paragraph");
        assert_eq!(
            first.items,
            vec![
                ParagraphItem::Control {
                    kind: TextKind::Image,
                    open: true
                },
                ParagraphItem::Image {
                    name: "OEBPS/cover.jpg".into(),
                    is_cover: true
                },
                ParagraphItem::Control {
                    kind: TextKind::Image,
                    open: false
                },
            ]
        );
    }

    #[test]
    fn text_expands_fixed_spaces() {
        let paragraph = Paragraph {
            items: vec![
                ParagraphItem::FixedSpace(2),
                ParagraphItem::Text("x".into()),
            ],
        };
        assert_eq!(paragraph.text(), "  x");
        assert_eq!(ImageRef::new("a/b.unknown").media_type, None);
    }
}
