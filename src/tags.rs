//! Tag dispatch table.
//!
//! Maps element names to the [`TagAction`] the converter runs at element
//! start and end. Elements without an entry are structurally transparent:
//! their styles still cascade but they have no behavior of their own.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::model::TextKind;
use crate::tokenizer::TagName;

/// SVG namespace URI.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// XLink namespace URI.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Prefix emitted at the start of every list item.
pub const LIST_ITEM_BULLET: &str = "\u{2022}\u{00A0}";

/// Where an image element keeps its resource path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// A plain attribute such as `src` or `data`.
    Attribute(&'static str),
    /// `xlink:href`, honoured only inside an `<svg>` element.
    SvgHref,
}

/// Behavior attached to an element name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagAction {
    /// `<body>`: switches the read state to body content.
    Body,
    /// `<style>`: collects an embedded stylesheet.
    StyleBlock,
    /// `<link rel="stylesheet">`: loads a linked stylesheet.
    StylesheetLink,
    /// Block element rendered as one paragraph.
    Paragraph,
    /// `<br>`.
    LineBreak,
    /// `<li>`: paragraph prefixed with a bullet.
    ListItem,
    /// Image reference.
    Image(ImageSource),
    /// `<svg>`: enables `xlink:href` image sources inside it.
    Svg,
    /// Inline span of a text kind.
    Control(TextKind),
    /// `<a>`: hyperlink and/or label.
    Hyperlink,
    /// Heading paragraph; `opens_section` starts a new section first.
    Heading {
        /// Heading kind pushed for the paragraph.
        kind: TextKind,
        /// Insert a section break before a non-initial heading.
        opens_section: bool,
    },
    /// `<pre>`: whitespace-preserving paragraphs.
    Preformatted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NamePredicate {
    namespace: String,
    local: String,
}

impl NamePredicate {
    fn accepts(&self, name: &TagName<'_>) -> bool {
        name.namespace == Some(self.namespace.as_str()) && name.local.eq_ignore_ascii_case(&self.local)
    }
}

/// Name-to-action dispatch table.
///
/// Exact names are matched case-insensitively on the qualified name;
/// namespace entries match the resolved `(namespace, local name)` pair of
/// elements that have no exact entry.
#[derive(Clone, Debug, Default)]
pub struct TagActionRegistry {
    by_name: BTreeMap<String, TagAction>,
    predicates: Vec<(NamePredicate, TagAction)>,
}

impl TagActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the default XHTML table installed.
    pub fn build() -> Self {
        let mut registry = Self::new();
        registry.register("body", TagAction::Body);
        registry.register("style", TagAction::StyleBlock);
        registry.register("link", TagAction::StylesheetLink);
        for tag in ["p", "div", "dt", "td", "th"] {
            registry.register(tag, TagAction::Paragraph);
        }
        for level in 1..=6u8 {
            registry.register(
                &alloc::format!("h{}", level),
                TagAction::Heading {
                    kind: TextKind::Heading(level),
                    opens_section: level == 1,
                },
            );
        }
        registry.register("li", TagAction::ListItem);
        for (tag, kind) in [
            ("strong", TextKind::Strong),
            ("b", TextKind::Bold),
            ("em", TextKind::Emphasis),
            ("i", TextKind::Italic),
            ("code", TextKind::Code),
            ("tt", TextKind::Code),
            ("kbd", TextKind::Code),
            ("var", TextKind::Code),
            ("samp", TextKind::Code),
            ("cite", TextKind::Cite),
            ("sub", TextKind::Sub),
            ("sup", TextKind::Sup),
            ("dd", TextKind::DefinitionDescription),
            ("dfn", TextKind::Definition),
            ("strike", TextKind::Strikethrough),
        ] {
            registry.register(tag, TagAction::Control(kind));
        }
        registry.register("a", TagAction::Hyperlink);
        registry.register("img", TagAction::Image(ImageSource::Attribute("src")));
        registry.register("object", TagAction::Image(ImageSource::Attribute("data")));
        registry.register("svg", TagAction::Svg);
        registry.register("image", TagAction::Image(ImageSource::SvgHref));
        registry.register("br", TagAction::LineBreak);
        registry.register("pre", TagAction::Preformatted);
        registry.register_ns(SVG_NAMESPACE, "svg", TagAction::Svg);
        registry.register_ns(SVG_NAMESPACE, "image", TagAction::Image(ImageSource::SvgHref));
        registry
    }

    /// Register `action` for the exact name `tag`, returning the old action.
    pub fn register(&mut self, tag: &str, action: TagAction) -> Option<TagAction> {
        self.by_name.insert(tag.to_ascii_lowercase(), action)
    }

    /// Register `action` for elements bound to `(namespace, local)`.
    ///
    /// Registering the same pair again replaces the earlier action.
    pub fn register_ns(
        &mut self,
        namespace: &str,
        local: &str,
        action: TagAction,
    ) -> Option<TagAction> {
        let predicate = NamePredicate {
            namespace: namespace.to_string(),
            local: local.to_ascii_lowercase(),
        };
        if let Some((_, existing)) = self.predicates.iter_mut().find(|(p, _)| *p == predicate) {
            return Some(core::mem::replace(existing, action));
        }
        self.predicates.push((predicate, action));
        None
    }

    /// Action for an element, or `None` when it has no behavior.
    pub fn resolve(&self, name: &TagName<'_>) -> Option<TagAction> {
        let lowered = name.qualified.to_ascii_lowercase();
        if let Some(action) = self.by_name.get(&lowered) {
            return Some(*action);
        }
        self.predicates
            .iter()
            .find(|(predicate, _)| predicate.accepts(name))
            .map(|(_, action)| *action)
    }

    /// Number of exact-name entries.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.predicates.is_empty()
    }
}
