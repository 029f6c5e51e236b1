//! Typed document tree.
//!
//! The tree is built once per document body by [`crate::Builder`], read once
//! by [`crate::HtmlRenderer`] and then dropped. Container variants own their
//! children; the top-level sequence is owned by the caller.

use std::collections::BTreeMap;

/// Flat string-keyed arguments handed to a plugin.
pub type PluginArgs = BTreeMap<String, String>;

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Element {
    /// Section heading, level 1-3.
    Heading { level: u8, children: Vec<Element> },
    Paragraph(Vec<Element>),
    Text(String),
    Strong(Vec<Element>),
    /// Emphasis with its nesting strength (1 or 2).
    Emphasis { strength: u8, children: Vec<Element> },
    LineBreak,
    /// Code fence without an info string, shown verbatim.
    Block(String),
    /// Code fence deferred to a plugin at render time.
    Plugin(PluginInvocation),
    /// Inline code span.
    Tag(String),
    Quote(Vec<Element>),
    Link { href: String, children: Vec<Element> },
    /// Image; `alt` holds inline elements so captions may carry formatting.
    Image { src: String, alt: Vec<Element> },
    UnorderedList(Vec<ListItem>),
    OrderedList(Vec<ListItem>),
    Table(Table),
}

impl Element {
    /// Variant name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph(_) => "paragraph",
            Self::Text(_) => "text",
            Self::Strong(_) => "strong",
            Self::Emphasis { .. } => "emphasis",
            Self::LineBreak => "line break",
            Self::Block(_) => "code block",
            Self::Plugin(_) => "plugin invocation",
            Self::Tag(_) => "inline code",
            Self::Quote(_) => "blockquote",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::UnorderedList(_) => "unordered list",
            Self::OrderedList(_) => "ordered list",
            Self::Table(_) => "table",
        }
    }

    /// Whether the element may appear inside running text.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::Strong(_)
                | Self::Emphasis { .. }
                | Self::LineBreak
                | Self::Tag(_)
                | Self::Link { .. }
                | Self::Image { .. }
        )
    }
}

/// A code fence tagged with a plugin name.
///
/// The content is never parsed as markup; it is handed to the plugin verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PluginInvocation {
    pub name: String,
    pub args: PluginArgs,
    pub content: String,
}

impl PluginInvocation {
    pub fn new(name: impl Into<String>, args: PluginArgs, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args,
            content: content.into(),
        }
    }
}

/// Entry of an ordered or unordered list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ListItem(pub Vec<Element>);

/// Table with an optional header row.
///
/// Cell counts are not checked against the header; plugins that care do so themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Table {
    pub head: Option<Row>,
    pub body: Vec<Row>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Row(pub Vec<Cell>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CellKind {
    Header,
    Data,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    pub kind: CellKind,
    pub children: Vec<Element>,
}

/// Append `element` to `siblings`, merging it into a trailing `Text` node.
///
/// Keeps the invariant that no two consecutive siblings are both `Text`.
pub(crate) fn push_merged(siblings: &mut Vec<Element>, element: Element) {
    if let Element::Text(text) = &element
        && let Some(Element::Text(last)) = siblings.last_mut()
    {
        last.push_str(text);
        return;
    }
    siblings.push(element);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Element {
        Element::Text(s.to_owned())
    }

    #[test]
    fn test_push_merged_joins_text() {
        let mut siblings = vec![text("Hello")];
        push_merged(&mut siblings, text(" world"));
        assert_eq!(siblings, vec![text("Hello world")]);
    }

    #[test]
    fn test_inline_classification() {
        assert!(text("a").is_inline());
        assert!(Element::LineBreak.is_inline());
        assert!(!Element::Paragraph(Vec::new()).is_inline());
        assert!(!Element::Table(Table::default()).is_inline());
        assert_eq!(Element::Quote(Vec::new()).name(), "blockquote");
    }

    #[test]
    fn test_push_merged_keeps_non_text_boundaries() {
        let mut siblings = vec![text("a")];
        push_merged(&mut siblings, Element::LineBreak);
        push_merged(&mut siblings, text("b"));
        push_merged(&mut siblings, text("c"));
        assert_eq!(siblings, vec![text("a"), Element::LineBreak, text("bc")]);
    }
}
