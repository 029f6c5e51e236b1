//! Token vocabulary consumed by the tree builder.
//!
//! Tokens are a linear stream of open/close pairs for container constructs and
//! atomic events for leaves. The builder pulls them one at a time through the
//! [`TokenCursor`] trait, so any tokenizer able to produce this vocabulary can
//! feed it. [`crate::markdown::tokenize`] is the `pulldown-cmark` binding.

use std::fmt;
use std::iter::Peekable;

/// Attributes carried by a container-opening token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// Heading with its source depth (1-6).
    Heading(u8),
    Paragraph,
    Strong,
    /// Emphasis with its nesting strength.
    Emphasis(u8),
    Quote,
    /// Link with its target.
    Link(String),
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    HeaderCell,
    DataCell,
    /// A container the tokenizer knows but the document model does not.
    Unsupported(String),
}

impl Tag {
    /// Attribute-free discriminant used to match the closing token.
    #[must_use]
    pub fn kind(&self) -> TagKind {
        match self {
            Self::Heading(_) => TagKind::Heading,
            Self::Paragraph => TagKind::Paragraph,
            Self::Strong => TagKind::Strong,
            Self::Emphasis(_) => TagKind::Emphasis,
            Self::Quote => TagKind::Quote,
            Self::Link(_) => TagKind::Link,
            Self::BulletList => TagKind::BulletList,
            Self::OrderedList => TagKind::OrderedList,
            Self::ListItem => TagKind::ListItem,
            Self::Table => TagKind::Table,
            Self::TableHead => TagKind::TableHead,
            Self::TableBody => TagKind::TableBody,
            Self::TableRow => TagKind::TableRow,
            Self::HeaderCell => TagKind::HeaderCell,
            Self::DataCell => TagKind::DataCell,
            Self::Unsupported(_) => TagKind::Unsupported,
        }
    }
}

/// Kind of a container token, shared by open and close events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    Heading,
    Paragraph,
    Strong,
    Emphasis,
    Quote,
    Link,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    HeaderCell,
    DataCell,
    Unsupported,
}

impl TagKind {
    /// Construct name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Quote => "blockquote",
            Self::Link => "link",
            Self::BulletList => "bullet list",
            Self::OrderedList => "ordered list",
            Self::ListItem => "list item",
            Self::Table => "table",
            Self::TableHead => "table head",
            Self::TableBody => "table body",
            Self::TableRow => "table row",
            Self::HeaderCell => "header cell",
            Self::DataCell => "data cell",
            Self::Unsupported => "unsupported container",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single markup event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Start of a container.
    Open(Tag),
    /// End of a container.
    Close(TagKind),
    /// Literal text run.
    Text(String),
    /// Inline code span.
    Code(String),
    SoftBreak,
    HardBreak,
    /// Image with its plain alt attribute and the inline tokens of its label.
    Image {
        src: String,
        alt: String,
        children: Vec<Token>,
    },
    /// Code block; `info` is `None` when the fence carries no info string.
    Fence {
        info: Option<String>,
        content: String,
    },
    /// Thematic break.
    Rule,
    /// Raw block HTML.
    Html(String),
    /// Raw inline HTML.
    InlineHtml(String),
    /// A leaf the tokenizer knows but the document model does not.
    Unsupported(String),
}

impl Token {
    /// Short name of the token kind, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Open(Tag::Unsupported(name)) | Self::Unsupported(name) => name.clone(),
            Self::Open(tag) => format!("{} open", tag.kind()),
            Self::Close(kind) => format!("{kind} close"),
            Self::Text(_) => "text".to_owned(),
            Self::Code(_) => "inline code".to_owned(),
            Self::SoftBreak => "soft break".to_owned(),
            Self::HardBreak => "hard break".to_owned(),
            Self::Image { .. } => "image".to_owned(),
            Self::Fence { .. } => "code block".to_owned(),
            Self::Rule => "thematic break".to_owned(),
            Self::Html(_) => "html block".to_owned(),
            Self::InlineHtml(_) => "inline html".to_owned(),
        }
    }
}

/// Pull cursor over a token stream.
pub trait TokenCursor {
    /// Advance the cursor, returning the next token.
    fn next_token(&mut self) -> Option<Token>;

    /// Whether the stream has no tokens left.
    fn is_exhausted(&mut self) -> bool;
}

/// [`TokenCursor`] over any token iterator.
pub struct TokenStream<I: Iterator<Item = Token>> {
    inner: Peekable<I>,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    /// Wrap an iterator of tokens.
    pub fn new<T: IntoIterator<IntoIter = I>>(tokens: T) -> Self {
        Self {
            inner: tokens.into_iter().peekable(),
        }
    }
}

impl<I: Iterator<Item = Token>> TokenCursor for TokenStream<I> {
    fn next_token(&mut self) -> Option<Token> {
        self.inner.next()
    }

    fn is_exhausted(&mut self) -> bool {
        self.inner.peek().is_none()
    }
}
