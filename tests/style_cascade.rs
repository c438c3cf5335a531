mod common;

use common::fixtures::{convert_book, fixture_store, memory_book, xhtml, CHAPTERS};
use common::recording::{RecordingSink, SinkEvent};
use epub_xhtml::{
    tokenize_xhtml, Attributes, Block, BookModel, BookSink, ContentHandler, DocumentConverter,
    ParagraphItem, ReaderLimits, ResourceStore, TagActionRegistry, TagName, XhtmlReader,
};

/// Records the style depth at every element start and checks it is back at
/// that value once the element ends.
struct DepthParity<'c, 'r, S: BookSink + ?Sized> {
    inner: &'c mut DocumentConverter<'r, S>,
    depths: Vec<usize>,
    checked: usize,
}

impl<S: BookSink + ?Sized> ContentHandler for DepthParity<'_, '_, S> {
    fn start_element(&mut self, name: &TagName<'_>, attributes: &Attributes) {
        self.depths.push(self.inner.style_depth());
        self.inner.start_element(name, attributes);
    }

    fn end_element(&mut self, name: &TagName<'_>) {
        self.inner.end_element(name);
        let expected = self.depths.pop().expect("balanced fixture");
        assert_eq!(
            self.inner.style_depth(),
            expected,
            "style depth leaked past </{}>",
            name.qualified
        );
        self.checked += 1;
    }

    fn character_data(&mut self, text: &str) {
        self.inner.character_data(text);
    }
}

fn style_items(model: &BookModel) -> usize {
    model
        .paragraphs()
        .flat_map(|p| p.items.iter())
        .filter(|item| matches!(item, ParagraphItem::Style(_)))
        .count()
}

fn single_chapter(store: &dyn ResourceStore, limits: ReaderLimits) -> BookModel {
    let (_, model) = convert_book(store, &["t/c.xhtml"], limits, false).expect("converts");
    model
}

#[test]
fn every_element_restores_style_depth() {
    let store = fixture_store();
    let registry = TagActionRegistry::build();
    let mut reader = XhtmlReader::new();
    let mut sink = RecordingSink::default();

    for chapter in CHAPTERS {
        let bytes = store.read(chapter).expect("fixture chapter");
        let mut conv = reader.begin_document(&registry, &store, &mut sink, chapter, chapter);
        let mut parity = DepthParity {
            inner: &mut conv,
            depths: Vec::new(),
            checked: 0,
        };
        tokenize_xhtml(&bytes, &mut parity).expect("fixture tokenizes");
        assert!(parity.depths.is_empty());
        assert!(parity.checked > 10);
        assert_eq!(conv.style_depth(), 0);
        conv.end_document();
        assert_eq!(conv.open_elements(), 0);
    }

    let applied = sink.count(|e| matches!(e, SinkEvent::Style(_)));
    assert!(applied > 0);
}

#[test]
fn inline_style_wraps_only_its_span() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml("", "<p>a <span style=\"font-style: italic\">b</span> c</p>").as_str(),
    )]);
    let registry = TagActionRegistry::build();
    let mut reader = XhtmlReader::new();
    let mut sink = RecordingSink::default();
    reader
        .read_file(&registry, &store, &mut sink, "t/c.xhtml", "t/c.xhtml")
        .expect("converts");

    assert_eq!(sink.events.len(), 8);
    assert_eq!(sink.events[0], SinkEvent::Label("0".to_string()));
    assert_eq!(sink.events[1], SinkEvent::Begin);
    assert_eq!(sink.events[2], SinkEvent::Text("a ".to_string()));
    match &sink.events[3] {
        SinkEvent::Style(entry) => assert_eq!(entry.italic(), Some(true)),
        other => panic!("expected style, got {:?}", other),
    }
    assert_eq!(sink.events[4], SinkEvent::Text("b".to_string()));
    assert_eq!(sink.events[5], SinkEvent::StyleClose);
    assert_eq!(sink.events[6], SinkEvent::Text(" c".to_string()));
    assert_eq!(sink.events[7], SinkEvent::End);
}

#[test]
fn oversized_linked_stylesheet_is_skipped() {
    let store = memory_book(&[
        (
            "t/c.xhtml",
            xhtml(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"s.css\"/>",
                "<p>styled</p>",
            )
            .as_str(),
        ),
        ("t/s.css", "p { font-weight: bold }"),
    ]);

    assert!(style_items(&single_chapter(&store, ReaderLimits::default())) > 0);

    let tight = ReaderLimits {
        max_css_bytes: 16,
        ..ReaderLimits::default()
    };
    let model = single_chapter(&store, tight);
    assert_eq!(style_items(&model), 0);
    assert_eq!(model.paragraphs().next().map(|p| p.text()).as_deref(), Some("styled"));
}

#[test]
fn oversized_style_block_is_skipped_whole() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml(
            "<style type=\"text/css\">p { font-weight: bold }</style>",
            "<p>styled</p>",
        )
        .as_str(),
    )]);

    assert!(style_items(&single_chapter(&store, ReaderLimits::default())) > 0);

    let tight = ReaderLimits {
        max_css_bytes: 16,
        ..ReaderLimits::default()
    };
    assert_eq!(style_items(&single_chapter(&store, tight)), 0);
}

#[test]
fn oversized_inline_style_is_skipped() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml("", "<p style=\"font-weight: bold\">styled</p>").as_str(),
    )]);

    assert!(style_items(&single_chapter(&store, ReaderLimits::default())) > 0);

    let tight = ReaderLimits {
        max_inline_style_bytes: 8,
        ..ReaderLimits::default()
    };
    let model = single_chapter(&store, tight);
    assert_eq!(style_items(&model), 0);
    assert_eq!(model.paragraphs().count(), 1);
}

#[test]
fn selector_cap_keeps_earliest_rules() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml(
            "<style type=\"text/css\">p { font-weight: bold } h2 { font-style: italic }</style>",
            "<p>x</p>",
        )
        .as_str(),
    )]);
    let registry = TagActionRegistry::build();
    let mut reader = XhtmlReader::with_limits(ReaderLimits {
        max_selectors: 1,
        ..ReaderLimits::default()
    });
    let mut sink = RecordingSink::default();
    let bytes = store.read("t/c.xhtml").expect("chapter");
    let mut conv = reader.begin_document(&registry, &store, &mut sink, "t/c.xhtml", "t/c.xhtml");
    tokenize_xhtml(&bytes, &mut conv).expect("tokenizes");
    assert_eq!(conv.styles().len(), 1);
    assert!(conv.styles().lookup("p", "").is_some());
    assert!(conv.styles().lookup("h2", "").is_none());
    conv.end_document();
}

#[test]
fn class_rule_breaks_before_element() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml(
            "<style type=\"text/css\">.chapter { page-break-before: always }</style>",
            "<p>a</p><div class=\"chapter\"><p>b</p></div>",
        )
        .as_str(),
    )]);
    let model = single_chapter(&store, ReaderLimits::default());
    let shape: Vec<&str> = model
        .blocks()
        .iter()
        .map(|block| match block {
            Block::Paragraph(_) => "p",
            Block::SectionBreak => "break",
        })
        .collect();
    assert_eq!(shape, vec!["p", "break", "p"]);
}

#[test]
fn stylesheets_do_not_leak_between_chapters() {
    let store = memory_book(&[
        (
            "t/a.xhtml",
            xhtml(
                "<style type=\"text/css\">p { font-weight: bold }</style>",
                "<p>one</p>",
            )
            .as_str(),
        ),
        ("t/b.xhtml", xhtml("", "<p>two</p>").as_str()),
    ]);
    let (_, model) = convert_book(
        &store,
        &["t/a.xhtml", "t/b.xhtml"],
        ReaderLimits::default(),
        false,
    )
    .expect("converts");

    let styled: Vec<bool> = model
        .paragraphs()
        .map(|p| p.items.iter().any(|item| matches!(item, ParagraphItem::Style(_))))
        .collect();
    assert_eq!(styled, vec![true, false]);
}

#[test]
fn styles_of_a_new_paragraph_stay_out_of_the_previous_one() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml(
            "<style type=\"text/css\">p.x { font-weight: bold }</style>",
            "<div>lead <p class=\"x\">body</p></div>",
        )
        .as_str(),
    )]);
    let model = single_chapter(&store, ReaderLimits::default());
    let paragraphs: Vec<_> = model.paragraphs().collect();
    assert_eq!(paragraphs.len(), 2);

    assert_eq!(paragraphs[0].items, vec![ParagraphItem::Text("lead ".to_string())]);

    let body = &paragraphs[1].items;
    assert!(matches!(
        body.first(),
        Some(ParagraphItem::Style(entry)) if entry.bold() == Some(true)
    ));
    assert_eq!(paragraphs[1].text(), "body");
}

#[test]
fn missing_linked_stylesheet_is_skipped() {
    let store = memory_book(&[(
        "t/c.xhtml",
        xhtml(
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"nope.css\"/>",
            "<p>plain text</p>",
        )
        .as_str(),
    )]);
    let registry = TagActionRegistry::build();
    let mut reader = XhtmlReader::new();
    let mut model = BookModel::new();
    reader
        .read_file(&registry, &store, &mut model, "t/c.xhtml", "t/c.xhtml")
        .expect("converts without the stylesheet");

    assert_eq!(style_items(&model), 0);
    let texts: Vec<String> = model.paragraphs().map(|p| p.text()).collect();
    assert_eq!(texts, vec!["plain text"]);
}
