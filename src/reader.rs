//! XHTML chapter conversion.
//!
//! [`XhtmlReader`] owns what survives across chapters of one book (file
//! aliases, the cover flag, limits). Each chapter is converted by a
//! [`DocumentConverter`], which receives tokenizer callbacks and drives a
//! [`BookSink`].
//!
//! Styles cascade without a DOM: every element pushes the rule entries that
//! match it onto a stack, records how many it pushed, and pops exactly that
//! many when it closes. Paragraphs opened while entries are active replay
//! them, so the sink sees a flat sequence of style open/close markers.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::aliases::{decode_html_url, directory_prefix, normalize_path, FileAliases, ReferenceKind};
use crate::css::{parse_inline_style, LengthFeature, StyleEntry, StyleSheetParser, StyleSheetTable};
use crate::error::{ErrorPhase, XhtmlError};
use crate::model::{BookSink, ImageRef, TextKind};
use crate::store::ResourceStore;
use crate::tags::{ImageSource, TagAction, TagActionRegistry, LIST_ITEM_BULLET, XLINK_NAMESPACE};
use crate::tokenizer::{tokenize_xhtml, Attributes, ContentHandler, TagName};

/// Resource ceilings for chapter conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Hard cap on chapter bytes; larger chapters fail to open.
    pub max_document_bytes: usize,
    /// Cap on one stylesheet (`<style>` block or linked file); larger ones are skipped.
    pub max_css_bytes: usize,
    /// Cap on one `style="..."` attribute; larger ones are skipped.
    pub max_inline_style_bytes: usize,
    /// Cap on distinct selectors kept per stylesheet.
    pub max_selectors: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 4 * 1024 * 1024,
            max_css_bytes: 512 * 1024,
            max_inline_style_bytes: 16 * 1024,
            max_selectors: 4096,
        }
    }
}

/// How character data is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadState {
    /// Outside body content; text is discarded.
    Nothing,
    /// Inside a `<style>` block; text is stylesheet source.
    Style,
    /// Inside body content; text goes to the book.
    Body,
}

/// Book-wide conversion state.
#[derive(Debug, Default)]
pub struct XhtmlReader {
    limits: ReaderLimits,
    aliases: FileAliases,
    mark_next_image_as_cover: bool,
}

impl XhtmlReader {
    /// Reader with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader with explicit limits.
    pub fn with_limits(limits: ReaderLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Active limits.
    pub fn limits(&self) -> ReaderLimits {
        self.limits
    }

    /// Flag the next registered image as the book cover.
    pub fn set_mark_first_image_as_cover(&mut self) {
        self.mark_next_image_as_cover = true;
    }

    /// Alias for a chapter path, assigning one if needed.
    pub fn file_alias(&mut self, path: &str) -> &str {
        self.aliases.alias_for(path)
    }

    /// Rewrite `path#fragment` as `alias#fragment`.
    pub fn normalized_reference(&mut self, reference: &str) -> String {
        self.aliases.normalized_reference(reference)
    }

    /// Alias table built so far.
    pub fn aliases(&self) -> &FileAliases {
        &self.aliases
    }

    /// Convert one chapter.
    ///
    /// `file_path` locates the chapter in `store`; `reference_name` is the
    /// name other chapters use to link to it. A tokenizer failure still
    /// finalizes what was converted before returning the error.
    pub fn read_file<S: BookSink + ?Sized>(
        &mut self,
        registry: &TagActionRegistry,
        store: &dyn ResourceStore,
        sink: &mut S,
        file_path: &str,
        reference_name: &str,
    ) -> Result<(), XhtmlError> {
        let bytes = store.read(file_path).ok_or_else(|| {
            XhtmlError::new(ErrorPhase::Open, "DOCUMENT_NOT_FOUND", "chapter resource not found")
                .with_path(file_path)
        })?;
        let max = self.limits.max_document_bytes;
        if bytes.len() > max {
            return Err(XhtmlError::new(
                ErrorPhase::Open,
                "DOCUMENT_TOO_LARGE",
                "chapter exceeds max_document_bytes",
            )
            .with_path(file_path)
            .with_limit("max_document_bytes", bytes.len(), max));
        }

        let mut converter = self.begin_document(registry, store, sink, file_path, reference_name);
        let result = tokenize_xhtml(&bytes, &mut converter);
        converter.end_document();
        result.map_err(|err| {
            let err = err.with_path(file_path);
            log::warn!("Chapter conversion stopped early: {}", err);
            err
        })
    }

    /// Start converting a chapter driven by an external tokenizer.
    pub fn begin_document<'r, S: BookSink + ?Sized>(
        &'r mut self,
        registry: &'r TagActionRegistry,
        store: &'r dyn ResourceStore,
        sink: &'r mut S,
        file_path: &str,
        reference_name: &str,
    ) -> DocumentConverter<'r, S> {
        let reference_alias = self.aliases.alias_for(reference_name).to_string();
        sink.register_label(&reference_alias);
        DocumentConverter {
            path_prefix: directory_prefix(file_path).to_string(),
            reference_dir: directory_prefix(reference_name).to_string(),
            reference_alias,
            reader: self,
            registry,
            store,
            sink,
            read_state: ReadState::Nothing,
            body_depth: 0,
            styles: StyleSheetTable::new(),
            style_block: None,
            entries: StyleEntryStack::default(),
            open_names: Vec::with_capacity(32),
            breaks_after: Vec::with_capacity(32),
            hyperlink_kinds: Vec::with_capacity(8),
            in_svg: false,
            preformatted: false,
            paragraph_empty: true,
            begun_paragraphs: 0,
            new_paragraph_in_progress: false,
            space_before_blocker: Rc::new(StyleEntry::spacing_blocker(LengthFeature::SpaceBefore)),
            space_after_blocker: Rc::new(StyleEntry::spacing_blocker(LengthFeature::SpaceAfter)),
        }
    }
}

/// Active style entries plus the per-element push counts.
#[derive(Debug, Default)]
struct StyleEntryStack {
    entries: Vec<Rc<StyleEntry>>,
    counts: Vec<usize>,
    to_remove: usize,
}

impl StyleEntryStack {
    fn push(&mut self, entry: Rc<StyleEntry>) {
        self.entries.push(entry);
    }

    fn record_element(&mut self, count: usize) {
        self.counts.push(count);
    }

    /// Pop the closing element's count and slate its entries for removal.
    fn finish_element(&mut self) -> usize {
        let count = self.counts.pop().unwrap_or(0);
        self.to_remove = count.min(self.entries.len());
        count
    }

    fn active(&self) -> &[Rc<StyleEntry>] {
        &self.entries
    }

    /// Active entries not slated for removal.
    fn retained(&self) -> &[Rc<StyleEntry>] {
        &self.entries[..self.entries.len() - self.to_remove]
    }

    fn pop_slated(&mut self) -> Option<Rc<StyleEntry>> {
        if self.to_remove == 0 {
            return None;
        }
        self.to_remove -= 1;
        self.entries.pop()
    }

    fn discard_slated(&mut self) {
        while self.pop_slated().is_some() {}
    }

    fn depth(&self) -> usize {
        self.entries.len()
    }

    fn open_elements(&self) -> usize {
        self.counts.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.counts.clear();
        self.to_remove = 0;
    }
}

/// Name of an element still open, kept to match end tags.
#[derive(Debug)]
struct OpenElement {
    qualified: String,
    name: String,
    namespace: Option<String>,
}

impl OpenElement {
    fn new(name: &TagName<'_>) -> Self {
        Self {
            qualified: name.qualified.to_ascii_lowercase(),
            name: name.qualified.to_string(),
            namespace: name.namespace.map(ToString::to_string),
        }
    }

    fn tag_name(&self) -> TagName<'_> {
        match self.namespace.as_deref() {
            Some(namespace) => TagName::in_namespace(&self.name, namespace),
            None => TagName::plain(&self.name),
        }
    }
}

struct StyleBlock {
    parser: StyleSheetParser,
    table: StyleSheetTable,
    bytes: usize,
}

/// Per-chapter conversion state, fed by tokenizer callbacks.
pub struct DocumentConverter<'r, S: BookSink + ?Sized> {
    reader: &'r mut XhtmlReader,
    registry: &'r TagActionRegistry,
    store: &'r dyn ResourceStore,
    sink: &'r mut S,
    path_prefix: String,
    reference_alias: String,
    reference_dir: String,
    read_state: ReadState,
    body_depth: i32,
    styles: StyleSheetTable,
    style_block: Option<StyleBlock>,
    entries: StyleEntryStack,
    open_names: Vec<OpenElement>,
    breaks_after: Vec<bool>,
    hyperlink_kinds: Vec<TextKind>,
    in_svg: bool,
    preformatted: bool,
    paragraph_empty: bool,
    begun_paragraphs: usize,
    new_paragraph_in_progress: bool,
    space_before_blocker: Rc<StyleEntry>,
    space_after_blocker: Rc<StyleEntry>,
}

impl<'r, S: BookSink + ?Sized> DocumentConverter<'r, S> {
    /// Current read state.
    pub fn read_state(&self) -> ReadState {
        self.read_state
    }

    /// Nesting depth of body elements.
    pub fn body_depth(&self) -> i32 {
        self.body_depth
    }

    /// Number of active style entries.
    pub fn style_depth(&self) -> usize {
        self.entries.depth()
    }

    /// Number of open elements being tracked.
    pub fn open_elements(&self) -> usize {
        self.entries.open_elements()
    }

    /// Whether the converter is inside an `<svg>` element.
    pub fn in_svg(&self) -> bool {
        self.in_svg
    }

    /// Whether text is currently preformatted.
    pub fn is_preformatted(&self) -> bool {
        self.preformatted
    }

    /// Stylesheet rules collected for this chapter.
    pub fn styles(&self) -> &StyleSheetTable {
        &self.styles
    }

    /// Alias of the chapter being converted.
    pub fn reference_alias(&self) -> &str {
        &self.reference_alias
    }

    /// The sink being driven.
    pub fn sink(&self) -> &S {
        &*self.sink
    }

    /// Handle an element start.
    pub fn start_element(&mut self, name: &TagName<'_>, attributes: &Attributes) {
        if let Some(id) = attributes.get("id") {
            let label = format!("{}#{}", self.reference_alias, id);
            self.sink.register_label(&label);
        }

        let tag = name.local.to_ascii_lowercase();
        let class = attributes
            .get("class")
            .and_then(|value| value.split_whitespace().next())
            .unwrap_or("");

        if self.styles.break_before(&tag, class) {
            self.sink.insert_section_break();
        }
        self.breaks_after.push(self.styles.break_after(&tag, class));

        let action = self.registry.resolve(name);

        let mut pushed: SmallVec<[Rc<StyleEntry>; 4]> = SmallVec::new();
        pushed.extend(self.styles.lookup(&tag, ""));
        if !class.is_empty() {
            pushed.extend(self.styles.lookup("", class));
            pushed.extend(self.styles.lookup(&tag, class));
        }
        if let Some(style) = attributes.get("style") {
            pushed.extend(self.inline_style(style));
        }
        self.entries.record_element(pushed.len());
        for entry in &pushed {
            self.entries.push(Rc::clone(entry));
        }
        self.open_names.push(OpenElement::new(name));

        // a paragraph begun by the action has already replayed the entries
        let begun = self.begun_paragraphs;
        if let Some(action) = action {
            self.start_action(action, attributes);
        }
        if self.begun_paragraphs == begun && self.sink.is_paragraph_open() {
            for entry in &pushed {
                self.sink.apply_style(entry);
            }
        }
    }

    /// Handle an element end.
    ///
    /// End tags are matched by name against the open elements. A stray end
    /// tag is ignored; one that skips open elements ends them first.
    pub fn end_element(&mut self, name: &TagName<'_>) {
        let qualified = name.qualified.to_ascii_lowercase();
        let Some(position) = self
            .open_names
            .iter()
            .rposition(|open| open.qualified == qualified)
        else {
            log::trace!("Ignoring stray </{}> in '{}'", name.qualified, self.reference_alias);
            return;
        };
        while self.open_names.len() > position + 1 {
            if let Some(open) = self.open_names.pop() {
                self.close_element(&open.tag_name());
            }
        }
        self.open_names.pop();
        self.close_element(name);
    }

    fn close_element(&mut self, name: &TagName<'_>) {
        let count = self.entries.finish_element();
        for _ in 0..count {
            self.sink.close_style();
        }

        if let Some(action) = self.registry.resolve(name) {
            self.end_action(action);
            self.new_paragraph_in_progress = false;
        }

        self.entries.discard_slated();

        if self.breaks_after.pop().unwrap_or(false) {
            self.sink.insert_section_break();
        }
    }

    /// Handle a run of character data.
    pub fn character_data(&mut self, text: &str) {
        match self.read_state {
            ReadState::Nothing => {}
            ReadState::Style => self.feed_style_block(text),
            ReadState::Body if self.preformatted => self.preformatted_text(text),
            ReadState::Body => {
                let text = if self.new_paragraph_in_progress || !self.sink.is_paragraph_open() {
                    text.trim_start_matches(|c: char| c.is_ascii_whitespace())
                } else {
                    text
                };
                self.append_body_text(text);
            }
        }
    }

    /// Finish the chapter: close the open paragraph and drop leftover state.
    pub fn end_document(&mut self) {
        if self.sink.is_paragraph_open() {
            self.end_paragraph();
        }
        if self.entries.open_elements() > 0
            || self.entries.depth() > 0
            || !self.breaks_after.is_empty()
            || !self.hyperlink_kinds.is_empty()
        {
            log::warn!(
                "Unbalanced chapter '{}': open_elements={} style_depth={} open_links={}",
                self.reference_alias,
                self.entries.open_elements(),
                self.entries.depth(),
                self.hyperlink_kinds.len()
            );
        }
        if self.style_block.take().is_some() {
            log::warn!("Unterminated <style> block in '{}' dropped", self.reference_alias);
        }
        self.entries.clear();
        self.open_names.clear();
        self.breaks_after.clear();
        self.hyperlink_kinds.clear();
        self.read_state = ReadState::Nothing;
        self.body_depth = 0;
        self.in_svg = false;
        self.preformatted = false;
    }

    fn start_action(&mut self, action: TagAction, attributes: &Attributes) {
        match action {
            TagAction::Body => {
                self.body_depth += 1;
                if self.body_depth > 0 {
                    self.read_state = ReadState::Body;
                }
            }
            TagAction::StyleBlock => {
                if attributes.get("type") == Some("text/css") && self.read_state == ReadState::Nothing {
                    self.read_state = ReadState::Style;
                    let capacity = self
                        .reader
                        .limits
                        .max_selectors
                        .saturating_sub(self.styles.len());
                    self.style_block = Some(StyleBlock {
                        parser: StyleSheetParser::new().with_max_selectors(capacity),
                        table: StyleSheetTable::new(),
                        bytes: 0,
                    });
                }
            }
            TagAction::StylesheetLink => {
                if attributes.get("rel") != Some("stylesheet") || attributes.get("type") != Some("text/css") {
                    return;
                }
                if let Some(href) = attributes.get("href") {
                    self.load_linked_stylesheet(href);
                }
            }
            TagAction::Paragraph => {
                if !self.new_paragraph_in_progress {
                    self.begin_paragraph();
                    self.new_paragraph_in_progress = true;
                }
            }
            TagAction::LineBreak => {
                if self.paragraph_empty {
                    self.sink.append_text(" ");
                }
                self.end_paragraph();
                self.begin_paragraph();
            }
            TagAction::ListItem => {
                self.end_paragraph();
                self.begin_paragraph();
                self.sink.append_text(LIST_ITEM_BULLET);
            }
            TagAction::Image(source) => self.start_image(source, attributes),
            TagAction::Svg => self.in_svg = true,
            TagAction::Control(kind) => {
                self.sink.push_kind(kind);
                self.sink.open_control(kind);
            }
            TagAction::Hyperlink => self.start_hyperlink(attributes),
            TagAction::Heading {
                kind,
                opens_section,
            } => {
                if opens_section && self.sink.paragraph_count() > 0 {
                    self.sink.insert_section_break();
                }
                self.sink.push_kind(kind);
                self.begin_paragraph();
            }
            TagAction::Preformatted => {
                self.preformatted = true;
                self.begin_paragraph();
                self.sink.open_control(TextKind::Preformatted);
            }
        }
    }

    fn end_action(&mut self, action: TagAction) {
        match action {
            TagAction::Body => {
                self.end_paragraph();
                self.body_depth -= 1;
                if self.body_depth <= 0 {
                    self.read_state = ReadState::Nothing;
                }
            }
            TagAction::StyleBlock => {
                if self.read_state == ReadState::Style {
                    self.read_state = ReadState::Nothing;
                    self.finish_style_block();
                }
            }
            TagAction::StylesheetLink | TagAction::LineBreak | TagAction::Image(_) => {}
            TagAction::Paragraph | TagAction::ListItem => self.end_paragraph(),
            TagAction::Svg => self.in_svg = false,
            TagAction::Control(kind) => {
                self.sink.close_control(kind);
                self.sink.pop_kind();
            }
            TagAction::Hyperlink => {
                let kind = self.hyperlink_kinds.pop().unwrap_or(TextKind::Regular);
                if kind != TextKind::Regular {
                    self.sink.close_control(kind);
                }
            }
            TagAction::Heading { .. } => {
                self.end_paragraph();
                self.sink.pop_kind();
            }
            TagAction::Preformatted => {
                self.end_paragraph();
                self.preformatted = false;
            }
        }
    }

    fn begin_paragraph(&mut self) {
        self.begun_paragraphs += 1;
        self.paragraph_empty = true;
        self.sink.begin_paragraph();
        let mut block_space_before = false;
        for entry in self.entries.active() {
            self.sink.apply_style(entry);
            block_space_before |= entry.has_length(LengthFeature::SpaceBefore);
        }
        if block_space_before {
            self.sink.apply_style(&self.space_before_blocker);
        }
    }

    fn end_paragraph(&mut self) {
        let block_space_after = self
            .entries
            .retained()
            .iter()
            .any(|entry| entry.has_length(LengthFeature::SpaceAfter));
        if block_space_after {
            self.sink.apply_style(&self.space_after_blocker);
        }
        while let Some(entry) = self.entries.pop_slated() {
            self.sink.apply_style(&entry);
        }
        self.sink.end_paragraph();
    }

    fn append_body_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.paragraph_empty = false;
        if !self.sink.is_paragraph_open() {
            self.sink.begin_paragraph();
        }
        self.sink.append_text(text);
        self.new_paragraph_in_progress = false;
    }

    fn preformatted_text(&mut self, mut text: &str) {
        while !text.is_empty() {
            let (line_break, rest) = split_line_break(text);
            let end = rest.find(|c: char| c == '\r' || c == '\n').unwrap_or(rest.len());
            let (line, next) = rest.split_at(end);
            if line_break {
                self.end_paragraph();
                self.begin_paragraph();
                self.sink.open_control(TextKind::Preformatted);
            }
            let spaces = line.bytes().take_while(u8::is_ascii_whitespace).count();
            if spaces > 0 {
                self.sink.append_fixed_space(spaces);
            }
            self.append_body_text(&line[spaces..]);
            text = next;
        }
    }

    fn inline_style(&self, style: &str) -> Option<Rc<StyleEntry>> {
        let max = self.reader.limits.max_inline_style_bytes;
        if style.len() > max {
            let err = XhtmlError::new(
                ErrorPhase::Style,
                "INLINE_STYLE_TOO_LARGE",
                "style attribute exceeds max_inline_style_bytes",
            )
            .with_limit("max_inline_style_bytes", style.len(), max);
            log::warn!("Skipping inline style: {}", err);
            return None;
        }
        log::debug!("Parsing style attribute: {}", style);
        Some(Rc::new(parse_inline_style(style)))
    }

    fn feed_style_block(&mut self, text: &str) {
        let max = self.reader.limits.max_css_bytes;
        let Some(block) = self.style_block.as_mut() else {
            return;
        };
        block.bytes = block.bytes.saturating_add(text.len());
        if block.bytes > max {
            let err = XhtmlError::new(
                ErrorPhase::Style,
                "STYLESHEET_TOO_LARGE",
                "<style> block exceeds max_css_bytes",
            )
            .with_limit("max_css_bytes", block.bytes, max);
            log::warn!("Skipping stylesheet: {}", err);
            self.style_block = None;
            return;
        }
        block.parser.feed(text, &mut block.table);
    }

    fn finish_style_block(&mut self) {
        let Some(StyleBlock {
            parser, mut table, ..
        }) = self.style_block.take()
        else {
            return;
        };
        parser.finish(&mut table);
        log::debug!("Parsed <style> block with {} selector(s)", table.len());
        self.styles.absorb(table);
    }

    fn load_linked_stylesheet(&mut self, href: &str) {
        let path = normalize_path(&format!("{}{}", self.path_prefix, decode_html_url(href)));
        let Some(bytes) = self.store.read(&path) else {
            log::debug!("Linked stylesheet '{}' not found", path);
            return;
        };
        let limits = self.reader.limits;
        if bytes.len() > limits.max_css_bytes {
            let err = XhtmlError::new(
                ErrorPhase::Style,
                "STYLESHEET_TOO_LARGE",
                "linked stylesheet exceeds max_css_bytes",
            )
            .with_path(path)
            .with_limit("max_css_bytes", bytes.len(), limits.max_css_bytes);
            log::warn!("Skipping stylesheet: {}", err);
            return;
        }
        log::debug!("Parsing linked stylesheet '{}' ({} bytes)", path, bytes.len());
        let css = String::from_utf8_lossy(&bytes);
        let capacity = limits.max_selectors.saturating_sub(self.styles.len());
        let mut table = StyleSheetTable::new();
        StyleSheetParser::new()
            .with_max_selectors(capacity)
            .parse(&css, &mut table);
        self.styles.absorb(table);
    }

    fn start_image(&mut self, source: ImageSource, attributes: &Attributes) {
        let src = match source {
            ImageSource::Attribute(name) => attributes.get(name),
            ImageSource::SvgHref if self.in_svg => attributes
                .get_ns(XLINK_NAMESPACE, "href")
                .or_else(|| attributes.get("xlink:href")),
            ImageSource::SvgHref => None,
        };
        let Some(src) = src.filter(|src| !src.is_empty()) else {
            return;
        };
        let path = normalize_path(&format!("{}{}", self.path_prefix, decode_html_url(src)));
        if !self.store.exists(&path) {
            log::trace!("Skipping missing image '{}'", path);
            return;
        }

        let paragraph_open = self.sink.is_paragraph_open();
        if paragraph_open {
            if self.paragraph_empty {
                self.sink.open_control(TextKind::Image);
            } else {
                self.end_paragraph();
            }
        }
        let is_cover = core::mem::take(&mut self.reader.mark_next_image_as_cover);
        self.sink.register_image(&path, ImageRef::new(path.clone()), is_cover);
        if paragraph_open && self.paragraph_empty {
            self.sink.close_control(TextKind::Image);
            self.end_paragraph();
        }
    }

    fn start_hyperlink(&mut self, attributes: &Attributes) {
        match attributes.get("href").filter(|href| !href.is_empty()) {
            Some(href) => {
                let kind = ReferenceKind::classify(href);
                let link = decode_html_url(href);
                let (kind, target) = match kind {
                    ReferenceKind::Fragment => {
                        (TextKind::InternalHyperlink, format!("{}{}", self.reference_alias, link))
                    }
                    ReferenceKind::CrossFile => {
                        let reference = format!("{}{}", self.reference_dir, link);
                        (
                            TextKind::InternalHyperlink,
                            self.reader.aliases.normalized_reference(&reference),
                        )
                    }
                    ReferenceKind::External => (TextKind::ExternalHyperlink, link.into_owned()),
                };
                self.hyperlink_kinds.push(kind);
                self.sink.open_hyperlink(kind, &target);
            }
            None => self.hyperlink_kinds.push(TextKind::Regular),
        }
        if let Some(name) = attributes.get("name") {
            let label = format!("{}#{}", self.reference_alias, decode_html_url(name));
            self.sink.register_label(&label);
        }
    }
}

impl<S: BookSink + ?Sized> ContentHandler for DocumentConverter<'_, S> {
    fn start_element(&mut self, name: &TagName<'_>, attributes: &Attributes) {
        DocumentConverter::start_element(self, name, attributes);
    }

    fn end_element(&mut self, name: &TagName<'_>) {
        DocumentConverter::end_element(self, name);
    }

    fn character_data(&mut self, text: &str) {
        DocumentConverter::character_data(self, text);
    }
}

/// Strip one leading `\r\n`, `\r` or `\n`.
fn split_line_break(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix("\r\n") {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix(&['\r', '\n'][..]) {
        (true, rest)
    } else {
        (false, text)
    }
}
