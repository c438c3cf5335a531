//! Minimal CSS support for parse-time cascading.
//!
//! Only the selector shapes the converter can apply without a DOM are
//! recognised: `tag`, `.class` and `tag.class` (plus `*` as an empty tag).
//! Anything else is skipped. Declarations are reduced to a [`StyleEntry`]
//! and to page-break flags.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Length-valued style features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LengthFeature {
    /// `margin-left` / `padding-left`.
    LeftIndent,
    /// `margin-right` / `padding-right`.
    RightIndent,
    /// `text-indent`.
    FirstLineIndent,
    /// `margin-top` / `padding-top`.
    SpaceBefore,
    /// `margin-bottom` / `padding-bottom`.
    SpaceAfter,
    /// `font-size`.
    FontSize,
}

const LENGTH_FEATURE_COUNT: usize = 6;

impl LengthFeature {
    fn index(self) -> usize {
        match self {
            Self::LeftIndent => 0,
            Self::RightIndent => 1,
            Self::FirstLineIndent => 2,
            Self::SpaceBefore => 3,
            Self::SpaceAfter => 4,
            Self::FontSize => 5,
        }
    }
}

/// Unit attached to a [`Length`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeUnit {
    /// CSS pixels.
    Pixel,
    /// Typographic points.
    Point,
    /// Hundredths of an em.
    EmHundredths,
    /// Hundredths of an ex.
    ExHundredths,
    /// Percent of the containing value.
    Percent,
}

/// A parsed CSS length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Length {
    /// Magnitude in `unit`.
    pub size: i16,
    /// Unit of `size`.
    pub unit: SizeUnit,
}

impl Length {
    /// Zero pixels.
    pub const ZERO: Self = Self {
        size: 0,
        unit: SizeUnit::Pixel,
    };
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// `text-align: left`.
    Left,
    /// `text-align: right`.
    Right,
    /// `text-align: center`.
    Center,
    /// `text-align: justify`.
    Justify,
}

/// Where a style entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleOrigin {
    /// A stylesheet rule (`<style>` block or linked file).
    Stylesheet,
    /// An inline `style="..."` attribute.
    Inline,
    /// Generated by the converter to neutralise inherited spacing.
    Synthetic,
}

/// An opaque resolved styling directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleEntry {
    origin: StyleOrigin,
    lengths: [Option<Length>; LENGTH_FEATURE_COUNT],
    alignment: Option<Alignment>,
    bold: Option<bool>,
    italic: Option<bool>,
    font_family: Option<String>,
}

impl StyleEntry {
    /// Create an empty entry.
    pub fn new(origin: StyleOrigin) -> Self {
        Self {
            origin,
            lengths: [None; LENGTH_FEATURE_COUNT],
            alignment: None,
            bold: None,
            italic: None,
            font_family: None,
        }
    }

    /// Zero-length entry for `feature`, used to block inherited spacing.
    pub fn spacing_blocker(feature: LengthFeature) -> Self {
        let mut entry = Self::new(StyleOrigin::Synthetic);
        entry.set_length(feature, Length::ZERO);
        entry
    }

    /// Origin of this entry.
    pub fn origin(&self) -> StyleOrigin {
        self.origin
    }

    /// Whether `feature` carries a value.
    pub fn has_length(&self, feature: LengthFeature) -> bool {
        self.lengths[feature.index()].is_some()
    }

    /// Value of `feature`, when present.
    pub fn length(&self, feature: LengthFeature) -> Option<Length> {
        self.lengths[feature.index()]
    }

    /// Set a length feature.
    pub fn set_length(&mut self, feature: LengthFeature, length: Length) {
        self.lengths[feature.index()] = Some(length);
    }

    /// Text alignment, when present.
    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    /// Explicit bold toggle, when present.
    pub fn bold(&self) -> Option<bool> {
        self.bold
    }

    /// Explicit italic toggle, when present.
    pub fn italic(&self) -> Option<bool> {
        self.italic
    }

    /// Font family list as written, when present.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// True when no feature is set.
    pub fn is_empty(&self) -> bool {
        self.lengths.iter().all(Option::is_none)
            && self.alignment.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.font_family.is_none()
    }

    /// Overlay every feature set in `other` onto `self`.
    pub fn merge(&mut self, other: &StyleEntry) {
        for (slot, value) in self.lengths.iter_mut().zip(other.lengths.iter()) {
            if value.is_some() {
                *slot = *value;
            }
        }
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.font_family.is_some() {
            self.font_family.clone_from(&other.font_family);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PageBreaks {
    before: Option<bool>,
    after: Option<bool>,
}

type SelectorKey = (String, String);

/// Queryable table of `(tag, class)` style rules.
#[derive(Clone, Debug, Default)]
pub struct StyleSheetTable {
    controls: BTreeMap<SelectorKey, Rc<StyleEntry>>,
    breaks_before: BTreeMap<SelectorKey, bool>,
    breaks_after: BTreeMap<SelectorKey, bool>,
}

impl StyleSheetTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all rules.
    pub fn clear(&mut self) {
        self.controls.clear();
        self.breaks_before.clear();
        self.breaks_after.clear();
    }

    /// Number of distinct selectors carrying a style entry.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// True when no style entry is registered.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Style entry registered for exactly `(tag, class)`.
    pub fn lookup(&self, tag: &str, class: &str) -> Option<Rc<StyleEntry>> {
        if tag.is_empty() && class.is_empty() {
            return None;
        }
        self.controls
            .get(&(tag.to_string(), class.to_string()))
            .cloned()
    }

    /// Whether an element should start a new section.
    pub fn break_before(&self, tag: &str, class: &str) -> bool {
        Self::break_flag(&self.breaks_before, tag, class)
    }

    /// Whether a new section should start after an element.
    pub fn break_after(&self, tag: &str, class: &str) -> bool {
        Self::break_flag(&self.breaks_after, tag, class)
    }

    /// Merge every rule of `other` into this table; `other` wins on conflicts.
    pub fn absorb(&mut self, other: StyleSheetTable) {
        for (key, entry) in other.controls {
            match self.controls.get_mut(&key) {
                Some(existing) => Rc::make_mut(existing).merge(&entry),
                None => {
                    self.controls.insert(key, entry);
                }
            }
        }
        self.breaks_before.extend(other.breaks_before);
        self.breaks_after.extend(other.breaks_after);
    }

    fn break_flag(map: &BTreeMap<SelectorKey, bool>, tag: &str, class: &str) -> bool {
        if map.is_empty() {
            return false;
        }
        [(tag, class), ("", class), (tag, "")]
            .into_iter()
            .filter(|(t, c)| !t.is_empty() || !c.is_empty())
            .find_map(|(t, c)| map.get(&(t.to_string(), c.to_string())).copied())
            .unwrap_or(false)
    }

    fn add_rule(&mut self, tag: String, class: String, entry: &StyleEntry, breaks: PageBreaks) {
        let key = (tag, class);
        if let Some(before) = breaks.before {
            self.breaks_before.insert(key.clone(), before);
        }
        if let Some(after) = breaks.after {
            self.breaks_after.insert(key.clone(), after);
        }
        if entry.is_empty() {
            return;
        }
        match self.controls.get_mut(&key) {
            Some(existing) => Rc::make_mut(existing).merge(entry),
            None => {
                self.controls.insert(key, Rc::new(entry.clone()));
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    Selector,
    Declarations,
    AtRuleBlock { depth: usize },
}

/// Streaming stylesheet parser feeding a [`StyleSheetTable`].
///
/// Input may arrive in arbitrary chunks; rules are committed as soon as
/// their closing brace is seen.
#[derive(Clone, Debug)]
pub struct StyleSheetParser {
    state: ParseState,
    selector: String,
    declarations: String,
    in_comment: bool,
    pending_slash: bool,
    pending_star: bool,
    max_selectors: usize,
    dropped_selectors: usize,
}

impl Default for StyleSheetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheetParser {
    /// Create a parser with no selector cap.
    pub fn new() -> Self {
        Self {
            state: ParseState::Selector,
            selector: String::with_capacity(32),
            declarations: String::with_capacity(64),
            in_comment: false,
            pending_slash: false,
            pending_star: false,
            max_selectors: usize::MAX,
            dropped_selectors: 0,
        }
    }

    /// Stop registering new selectors once the table holds `max_selectors`.
    pub fn with_max_selectors(mut self, max_selectors: usize) -> Self {
        self.max_selectors = max_selectors;
        self
    }

    /// Selectors dropped because the table was full.
    pub fn dropped_selectors(&self) -> usize {
        self.dropped_selectors
    }

    /// Parse a complete stylesheet in one call.
    pub fn parse(mut self, css: &str, table: &mut StyleSheetTable) -> usize {
        self.feed(css, table);
        self.finish(table)
    }

    /// Feed the next chunk of stylesheet text.
    pub fn feed(&mut self, text: &str, table: &mut StyleSheetTable) {
        for ch in text.chars() {
            self.push_char(ch, table);
        }
    }

    /// Flush a trailing unterminated rule; returns dropped selector count.
    pub fn finish(mut self, table: &mut StyleSheetTable) -> usize {
        if self.pending_slash && !self.in_comment {
            self.pending_slash = false;
            self.consume('/', table);
        }
        if self.state == ParseState::Declarations {
            self.commit_rule(table);
        }
        if self.dropped_selectors > 0 {
            log::warn!(
                "Stylesheet exceeds max_selectors ({}); dropped {} selector(s)",
                self.max_selectors,
                self.dropped_selectors
            );
        }
        self.dropped_selectors
    }

    fn push_char(&mut self, ch: char, table: &mut StyleSheetTable) {
        if self.in_comment {
            if self.pending_star && ch == '/' {
                self.in_comment = false;
                self.pending_star = false;
            } else {
                self.pending_star = ch == '*';
            }
            return;
        }
        if self.pending_slash {
            self.pending_slash = false;
            if ch == '*' {
                self.in_comment = true;
                self.pending_star = false;
                return;
            }
            self.consume('/', table);
        }
        if ch == '/' {
            self.pending_slash = true;
            return;
        }
        self.consume(ch, table);
    }

    fn consume(&mut self, ch: char, table: &mut StyleSheetTable) {
        match self.state {
            ParseState::Selector => match ch {
                '{' => {
                    if self.selector.trim_start().starts_with('@') {
                        self.selector.clear();
                        self.state = ParseState::AtRuleBlock { depth: 1 };
                    } else {
                        self.state = ParseState::Declarations;
                    }
                }
                ';' if self.selector.trim_start().starts_with('@') => self.selector.clear(),
                '}' => self.selector.clear(),
                _ => self.selector.push(ch),
            },
            ParseState::Declarations => match ch {
                '}' => {
                    self.commit_rule(table);
                    self.state = ParseState::Selector;
                }
                _ => self.declarations.push(ch),
            },
            ParseState::AtRuleBlock { depth } => match ch {
                '{' => self.state = ParseState::AtRuleBlock { depth: depth + 1 },
                '}' if depth <= 1 => self.state = ParseState::Selector,
                '}' => self.state = ParseState::AtRuleBlock { depth: depth - 1 },
                _ => {}
            },
        }
    }

    fn commit_rule(&mut self, table: &mut StyleSheetTable) {
        let (entry, breaks) = parse_declarations(&self.declarations, StyleOrigin::Stylesheet);
        for raw in self.selector.split(',') {
            let Some((tag, class)) = parse_selector(raw.trim()) else {
                log::trace!("Skipping unsupported selector '{}'", raw.trim());
                continue;
            };
            let key_known = table.controls.contains_key(&(tag.clone(), class.clone()));
            if !key_known && table.len() >= self.max_selectors {
                self.dropped_selectors += 1;
                continue;
            }
            table.add_rule(tag, class, &entry, breaks);
        }
        self.selector.clear();
        self.declarations.clear();
    }
}

/// Parse the value of a single `style="..."` attribute.
///
/// Malformed declarations are skipped; the result may be empty.
pub fn parse_inline_style(value: &str) -> StyleEntry {
    parse_declarations(value, StyleOrigin::Inline).0
}

fn parse_selector(raw: &str) -> Option<(String, String)> {
    if raw.is_empty()
        || raw.contains(|c: char| {
            c.is_whitespace() || matches!(c, '>' | '+' | '~' | '[' | ':' | '#' | '(')
        })
    {
        return None;
    }
    let (tag, class) = match raw.split_once('.') {
        Some((tag, class)) => (tag, class),
        None => (raw, ""),
    };
    if class.contains('.') {
        return None;
    }
    let tag = if tag == "*" {
        String::new()
    } else {
        tag.to_ascii_lowercase()
    };
    if tag.is_empty() && class.is_empty() {
        return None;
    }
    Some((tag, class.to_string()))
}

fn parse_declarations(text: &str, origin: StyleOrigin) -> (StyleEntry, PageBreaks) {
    let mut entry = StyleEntry::new(origin);
    let mut breaks = PageBreaks::default();
    for declaration in text.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        apply_declaration(&mut entry, &mut breaks, &name, &value);
    }
    (entry, breaks)
}

fn apply_declaration(entry: &mut StyleEntry, breaks: &mut PageBreaks, name: &str, value: &str) {
    match name {
        "margin-left" | "padding-left" => set_length(entry, LengthFeature::LeftIndent, value),
        "margin-right" | "padding-right" => set_length(entry, LengthFeature::RightIndent, value),
        "margin-top" | "padding-top" => set_length(entry, LengthFeature::SpaceBefore, value),
        "margin-bottom" | "padding-bottom" => set_length(entry, LengthFeature::SpaceAfter, value),
        "text-indent" => set_length(entry, LengthFeature::FirstLineIndent, value),
        "font-size" => set_length(entry, LengthFeature::FontSize, value),
        "margin" => apply_margin_shorthand(entry, value),
        "text-align" => {
            entry.alignment = match value {
                "left" | "start" => Some(Alignment::Left),
                "right" | "end" => Some(Alignment::Right),
                "center" => Some(Alignment::Center),
                "justify" => Some(Alignment::Justify),
                _ => entry.alignment,
            }
        }
        "font-weight" => {
            entry.bold = match value {
                "bold" | "bolder" => Some(true),
                "normal" | "lighter" => Some(false),
                numeric => numeric.parse::<u16>().ok().map(|w| w >= 600).or(entry.bold),
            }
        }
        "font-style" => {
            entry.italic = match value {
                "italic" | "oblique" => Some(true),
                "normal" => Some(false),
                _ => entry.italic,
            }
        }
        "font-family" if !value.is_empty() => entry.font_family = Some(value.to_string()),
        "page-break-before" | "break-before" => breaks.before = parse_break(value),
        "page-break-after" | "break-after" => breaks.after = parse_break(value),
        _ => {}
    }
}

fn apply_margin_shorthand(entry: &mut StyleEntry, value: &str) {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let (top, right, bottom, left) = match parts.as_slice() {
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left] => (*top, *right, *bottom, *left),
        _ => return,
    };
    set_length(entry, LengthFeature::SpaceBefore, top);
    set_length(entry, LengthFeature::RightIndent, right);
    set_length(entry, LengthFeature::SpaceAfter, bottom);
    set_length(entry, LengthFeature::LeftIndent, left);
}

fn parse_break(value: &str) -> Option<bool> {
    match value {
        "always" | "left" | "right" | "page" | "recto" | "verso" => Some(true),
        "avoid" | "auto" => Some(false),
        _ => None,
    }
}

fn set_length(entry: &mut StyleEntry, feature: LengthFeature, value: &str) {
    if let Some(length) = parse_length(value) {
        entry.set_length(feature, length);
    }
}

fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f32 = number.parse().ok()?;
    let (scaled, unit) = match unit.trim() {
        "px" => (number, SizeUnit::Pixel),
        "pt" => (number, SizeUnit::Point),
        "pc" => (number * 12.0, SizeUnit::Point),
        "in" => (number * 72.0, SizeUnit::Point),
        "cm" => (number * 72.0 / 2.54, SizeUnit::Point),
        "mm" => (number * 72.0 / 25.4, SizeUnit::Point),
        "em" | "rem" => (number * 100.0, SizeUnit::EmHundredths),
        "ex" => (number * 100.0, SizeUnit::ExHundredths),
        "%" => (number, SizeUnit::Percent),
        "" if number == 0.0 => (0.0, SizeUnit::Pixel),
        _ => return None,
    };
    let size = scaled
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
    Some(Length { size, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(css: &str) -> StyleSheetTable {
        let mut table = StyleSheetTable::new();
        StyleSheetParser::new().parse(css, &mut table);
        table
    }

    #[test]
    fn resolves_tag_class_and_combined_selectors() {
        let table = parsed("p { margin-top: 1em } .note { font-style: italic } p.note { text-align: center }");
        let tag = table.lookup("p", "").expect("tag rule");
        assert_eq!(
            tag.length(LengthFeature::SpaceBefore),
            Some(Length {
                size: 100,
                unit: SizeUnit::EmHundredths
            })
        );
        assert_eq!(table.lookup("", "note").expect("class rule").italic(), Some(true));
        assert_eq!(
            table.lookup("p", "note").expect("combined rule").alignment(),
            Some(Alignment::Center)
        );
        assert!(table.lookup("div", "").is_none());
        assert!(table.lookup("", "").is_none());
    }

    #[test]
    fn skips_unsupported_selectors_and_at_rules() {
        let table = parsed(
            "@charset \"utf-8\"; @media screen { p { color: red } } div p { margin: 0 } a:hover { font-weight: bold } h1 { font-weight: bold }",
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("h1", "").expect("h1").bold(), Some(true));
        assert!(table.lookup("p", "").is_none());
    }

    #[test]
    fn selector_groups_register_each_member() {
        let table = parsed("H2, .Big, *.x { font-size: 12pt }");
        assert!(table.lookup("h2", "").is_some());
        assert!(table.lookup("", "Big").is_some());
        assert!(table.lookup("", "x").is_some());
    }

    #[test]
    fn comments_are_ignored_across_chunks() {
        let mut table = StyleSheetTable::new();
        let mut parser = StyleSheetParser::new();
        parser.feed("p { margin-bottom: 2px } /", &mut table);
        parser.feed("* h1 { font-weight: bold } *", &mut table);
        parser.feed("/ h3 { font-style: italic }", &mut table);
        parser.finish(&mut table);
        assert!(table.lookup("p", "").is_some());
        assert!(table.lookup("h1", "").is_none());
        assert_eq!(table.lookup("h3", "").expect("h3").italic(), Some(true));
    }

    #[test]
    fn finish_commits_unterminated_rule() {
        let mut table = StyleSheetTable::new();
        let mut parser = StyleSheetParser::new();
        parser.feed("blockquote { margin-left: 2em", &mut table);
        assert!(table.is_empty());
        parser.finish(&mut table);
        assert!(table.lookup("blockquote", "").is_some());
    }

    #[test]
    fn page_breaks_fall_back_from_combined_to_class_to_tag() {
        let table = parsed(
            "h1 { page-break-before: always } .chapter { page-break-after: always } h1.chapter { page-break-before: avoid }",
        );
        assert!(table.break_before("h1", ""));
        assert!(table.break_before("h1", "other"));
        assert!(!table.break_before("h1", "chapter"));
        assert!(table.break_after("div", "chapter"));
        assert!(!table.break_after("div", ""));
        // break-only rules do not create style entries
        assert!(table.lookup("h1", "").is_none());
    }

    #[test]
    fn repeated_selectors_merge_later_wins() {
        let table = parsed("p { text-align: left; margin-top: 4px } p { text-align: right }");
        let entry = table.lookup("p", "").expect("p");
        assert_eq!(entry.alignment(), Some(Alignment::Right));
        assert!(entry.has_length(LengthFeature::SpaceBefore));
    }

    #[test]
    fn selector_cap_drops_new_selectors() {
        let mut table = StyleSheetTable::new();
        let dropped = StyleSheetParser::new()
            .with_max_selectors(1)
            .parse("p { margin: 0 } div { margin: 0 } p { text-indent: 1em }", &mut table);
        assert_eq!(dropped, 1);
        assert_eq!(table.len(), 1);
        assert!(table
            .lookup("p", "")
            .expect("p")
            .has_length(LengthFeature::FirstLineIndent));
    }

    #[test]
    fn inline_style_parses_declarations_and_tolerates_garbage() {
        let entry = parse_inline_style("margin: 1px 2px; font-weight: 700 ; nonsense; color:");
        assert_eq!(entry.origin(), StyleOrigin::Inline);
        assert_eq!(entry.bold(), Some(true));
        assert_eq!(
            entry.length(LengthFeature::LeftIndent),
            Some(Length {
                size: 2,
                unit: SizeUnit::Pixel
            })
        );
        assert!(entry.has_length(LengthFeature::SpaceAfter));

        let empty = parse_inline_style(";;;");
        assert!(empty.is_empty());
    }

    #[test]
    fn lengths_convert_physical_units_to_points() {
        assert_eq!(
            parse_length("1in"),
            Some(Length {
                size: 72,
                unit: SizeUnit::Point
            })
        );
        assert_eq!(parse_length("0"), Some(Length::ZERO));
        assert_eq!(parse_length("12"), None);
        assert_eq!(parse_length("auto"), None);
    }

    #[test]
    fn spacing_blocker_is_synthetic_zero() {
        let entry = StyleEntry::spacing_blocker(LengthFeature::SpaceAfter);
        assert_eq!(entry.origin(), StyleOrigin::Synthetic);
        assert_eq!(entry.length(LengthFeature::SpaceAfter), Some(Length::ZERO));
        assert!(!entry.has_length(LengthFeature::SpaceBefore));
    }
}
