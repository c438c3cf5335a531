use std::rc::Rc;

use epub_xhtml::{BookSink, ImageRef, StyleEntry, TextKind};

#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Begin,
    End,
    PushKind(TextKind),
    PopKind,
    Text(String),
    FixedSpace(usize),
    Open(TextKind),
    Close(TextKind),
    Hyperlink(TextKind, String),
    Label(String),
    Style(Rc<StyleEntry>),
    StyleClose,
    SectionBreak,
    Image(String, bool),
}

/// Sink that records every call, including ones outside paragraphs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    open: bool,
    paragraphs: usize,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.iter().filter(|event| pred(event)).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl BookSink for RecordingSink {
    fn begin_paragraph(&mut self) {
        self.open = true;
        self.paragraphs += 1;
        self.events.push(SinkEvent::Begin);
    }

    fn end_paragraph(&mut self) {
        if self.open {
            self.events.push(SinkEvent::End);
        }
        self.open = false;
    }

    fn is_paragraph_open(&self) -> bool {
        self.open
    }

    fn paragraph_count(&self) -> usize {
        self.paragraphs
    }

    fn push_kind(&mut self, kind: TextKind) {
        self.events.push(SinkEvent::PushKind(kind));
    }

    fn pop_kind(&mut self) {
        self.events.push(SinkEvent::PopKind);
    }

    fn append_text(&mut self, text: &str) {
        self.events.push(SinkEvent::Text(text.to_string()));
    }

    fn append_fixed_space(&mut self, width: usize) {
        self.events.push(SinkEvent::FixedSpace(width));
    }

    fn open_control(&mut self, kind: TextKind) {
        self.events.push(SinkEvent::Open(kind));
    }

    fn close_control(&mut self, kind: TextKind) {
        self.events.push(SinkEvent::Close(kind));
    }

    fn open_hyperlink(&mut self, kind: TextKind, target: &str) {
        self.events
            .push(SinkEvent::Hyperlink(kind, target.to_string()));
    }

    fn register_label(&mut self, name: &str) {
        self.events.push(SinkEvent::Label(name.to_string()));
    }

    fn apply_style(&mut self, entry: &Rc<StyleEntry>) {
        self.events.push(SinkEvent::Style(Rc::clone(entry)));
    }

    fn close_style(&mut self) {
        self.events.push(SinkEvent::StyleClose);
    }

    fn insert_section_break(&mut self) {
        self.events.push(SinkEvent::SectionBreak);
    }

    fn register_image(&mut self, name: &str, _image: ImageRef, is_cover: bool) {
        self.events.push(SinkEvent::Image(name.to_string(), is_cover));
    }
}
