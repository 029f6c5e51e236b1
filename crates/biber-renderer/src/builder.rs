//! Recursive-descent tree builder.
//!
//! Consumes a [`TokenCursor`] and produces the top-level [`Element`] sequence
//! of a document. Each container handler pulls tokens until it sees its own
//! close event, dispatching everything else into its children. Running out of
//! tokens before the close is a [`ParseError::Unclosed`].
//!
//! # Image captions
//!
//! The blog dialect writes figure captions as inline content after an image
//! without alt text, terminated by an explicit break:
//!
//! ```text
//! ![](cat.png) A *very* sleepy cat<br>
//! ```
//!
//! With [`CaptionMode::HtmlBreak`] (the default) this becomes
//! `Image { src: "cat.png", alt: [Text("A "), Emphasis(..), Text(" sleepy cat")] }`.
//! The terminator is consumed. If the enclosing container closes first, the
//! caption ends there.

use crate::args::{parse_plugin_args, split_info};
use crate::element::{
    Cell, CellKind, Element, ListItem, PluginArgs, PluginInvocation, Row, Table, push_merged,
};
use crate::error::ParseError;
use crate::markdown::{MarkdownOptions, tokenize};
use crate::token::{Tag, TagKind, Token, TokenCursor, TokenStream};

/// Maximum container nesting depth.
pub const MAX_DEPTH: usize = 128;

/// Highest supported heading level.
const MAX_HEADING_LEVEL: u8 = 3;

/// Highest supported emphasis strength.
const MAX_EMPHASIS_STRENGTH: u8 = 2;

/// Which token ends an image caption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptionMode {
    /// Images never capture following content.
    Disabled,
    /// Inline `<br>`, `<br/>` or `<br />`.
    #[default]
    HtmlBreak,
    /// A hard line break (trailing backslash or two spaces).
    HardBreak,
}

impl CaptionMode {
    fn is_terminator(self, token: &Token) -> bool {
        match (self, token) {
            (Self::HtmlBreak, Token::InlineHtml(html)) => is_html_break(html),
            (Self::HardBreak, Token::HardBreak) => true,
            _ => false,
        }
    }
}

fn is_html_break(html: &str) -> bool {
    let normalized: String = html
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    normalized == "<br>" || normalized == "<br/>"
}

/// Builder options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    pub caption: CaptionMode,
}

/// Children of one container while they are being collected.
struct Sequence {
    children: Vec<Element>,
    caption: Option<(String, Vec<Element>)>,
}

impl Sequence {
    fn new() -> Self {
        Self {
            children: Vec::new(),
            caption: None,
        }
    }

    /// Add a child. Block elements end an open caption and follow the image.
    fn push(&mut self, element: Element) {
        if !element.is_inline() {
            self.end_caption();
        }
        match &mut self.caption {
            Some((_, alt)) => push_merged(alt, element),
            None => push_merged(&mut self.children, element),
        }
    }

    fn in_caption(&self) -> bool {
        self.caption.is_some()
    }

    fn start_caption(&mut self, src: String) {
        self.end_caption();
        self.caption = Some((src, Vec::new()));
    }

    fn end_caption(&mut self) {
        if let Some((src, mut alt)) = self.caption.take() {
            trim_edges(&mut alt);
            self.children.push(Element::Image { src, alt });
        }
    }

    fn finish(mut self) -> Vec<Element> {
        self.end_caption();
        self.children
    }
}

/// Strip whitespace from the outer ends of a caption.
fn trim_edges(elements: &mut Vec<Element>) {
    if let Some(Element::Text(first)) = elements.first_mut() {
        let trimmed = first.trim_start();
        if trimmed.is_empty() {
            elements.remove(0);
        } else if trimmed.len() != first.len() {
            *first = trimmed.to_owned();
        }
    }
    if let Some(Element::Text(last)) = elements.last_mut() {
        let trimmed = last.trim_end();
        if trimmed.is_empty() {
            elements.pop();
        } else if trimmed.len() != last.len() {
            *last = trimmed.to_owned();
        }
    }
}

/// Document tree builder.
///
/// # Example
///
/// ```
/// use biber_renderer::{Builder, Element, Tag, TagKind, Token, TokenStream};
///
/// let mut cursor = TokenStream::new(vec![
///     Token::Open(Tag::Paragraph),
///     Token::Text("Hello".to_owned()),
///     Token::Close(TagKind::Paragraph),
/// ]);
/// let elements = Builder::default().build(&mut cursor).unwrap();
/// assert_eq!(elements, vec![Element::Paragraph(vec![Element::Text("Hello".to_owned())])]);
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    options: BuilderOptions,
    depth: usize,
}

impl Builder {
    #[must_use]
    pub fn with_options(options: BuilderOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Build the top-level element sequence from a token cursor.
    pub fn build<C: TokenCursor>(&mut self, cursor: &mut C) -> Result<Vec<Element>, ParseError> {
        self.depth = 0;
        let elements = self.sequence(cursor, None)?;
        tracing::debug!(element_count = elements.len(), "Built document tree");
        Ok(elements)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Collect children until `close` (or end of stream at top level).
    fn sequence(
        &mut self,
        cursor: &mut dyn TokenCursor,
        close: Option<TagKind>,
    ) -> Result<Vec<Element>, ParseError> {
        let mut seq = Sequence::new();
        loop {
            let Some(token) = cursor.next_token() else {
                return match close {
                    Some(kind) => Err(ParseError::Unclosed(kind)),
                    None => Ok(seq.finish()),
                };
            };
            match token {
                Token::Close(kind) if Some(kind) == close => return Ok(seq.finish()),
                Token::Close(kind) => return Err(ParseError::UnexpectedClose(kind)),
                token if seq.in_caption() && self.options.caption.is_terminator(&token) => {
                    seq.end_caption();
                }
                token => self.dispatch(token, cursor, &mut seq)?,
            }
        }
    }

    fn dispatch(
        &mut self,
        token: Token,
        cursor: &mut dyn TokenCursor,
        seq: &mut Sequence,
    ) -> Result<(), ParseError> {
        match token {
            Token::Open(tag) => {
                let element = self.container(tag, cursor)?;
                seq.push(element);
            }
            Token::Close(kind) => return Err(ParseError::UnexpectedClose(kind)),
            Token::Text(text) => seq.push(Element::Text(text)),
            Token::Code(code) => seq.push(Element::Tag(code)),
            Token::SoftBreak => seq.push(Element::Text(" ".to_owned())),
            Token::HardBreak => seq.push(Element::LineBreak),
            Token::Image { src, alt, children } => {
                let alt = self.image_alt(&alt, children)?;
                if alt.is_empty() && self.options.caption != CaptionMode::Disabled {
                    seq.start_caption(src);
                } else {
                    seq.push(Element::Image { src, alt });
                }
            }
            Token::Fence { info, content } => seq.push(fence(info.as_deref(), content)?),
            Token::Rule | Token::Html(_) | Token::InlineHtml(_) => {}
            Token::Unsupported(name) => return Err(ParseError::Unsupported(name)),
        }
        Ok(())
    }

    fn container(&mut self, tag: Tag, cursor: &mut dyn TokenCursor) -> Result<Element, ParseError> {
        self.enter()?;
        let element = match tag {
            Tag::Heading(level) => {
                if level > MAX_HEADING_LEVEL {
                    return Err(ParseError::HeadingLevel(level));
                }
                let children = self.non_empty(cursor, TagKind::Heading)?;
                Element::Heading { level, children }
            }
            Tag::Paragraph => Element::Paragraph(self.sequence(cursor, Some(TagKind::Paragraph))?),
            Tag::Strong => Element::Strong(self.non_empty(cursor, TagKind::Strong)?),
            Tag::Emphasis(strength) => {
                if strength == 0 || strength > MAX_EMPHASIS_STRENGTH {
                    return Err(ParseError::EmphasisStrength(strength));
                }
                let children = self.non_empty(cursor, TagKind::Emphasis)?;
                Element::Emphasis { strength, children }
            }
            Tag::Quote => Element::Quote(self.sequence(cursor, Some(TagKind::Quote))?),
            Tag::Link(href) => {
                let children = self.sequence(cursor, Some(TagKind::Link))?;
                Element::Link { href, children }
            }
            Tag::BulletList => Element::UnorderedList(self.list(cursor, TagKind::BulletList)?),
            Tag::OrderedList => Element::OrderedList(self.list(cursor, TagKind::OrderedList)?),
            Tag::Table => Element::Table(self.table(cursor)?),
            Tag::ListItem
            | Tag::TableHead
            | Tag::TableBody
            | Tag::TableRow
            | Tag::HeaderCell
            | Tag::DataCell => return Err(ParseError::Misplaced(tag.kind())),
            Tag::Unsupported(name) => return Err(ParseError::Unsupported(name)),
        };
        self.leave();
        Ok(element)
    }

    /// Children of a construct that must capture something.
    fn non_empty(
        &mut self,
        cursor: &mut dyn TokenCursor,
        kind: TagKind,
    ) -> Result<Vec<Element>, ParseError> {
        let children = self.sequence(cursor, Some(kind))?;
        if children.is_empty() {
            return Err(ParseError::Empty(kind));
        }
        Ok(children)
    }

    fn image_alt(&mut self, alt: &str, children: Vec<Token>) -> Result<Vec<Element>, ParseError> {
        if children.is_empty() {
            if alt.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![Element::Text(alt.to_owned())]);
        }
        let mut stream = TokenStream::new(children);
        self.sequence(&mut stream, None)
    }

    fn list(&mut self, cursor: &mut dyn TokenCursor, kind: TagKind) -> Result<Vec<ListItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            match cursor.next_token() {
                None => return Err(ParseError::Unclosed(kind)),
                Some(Token::Close(k)) if k == kind => break,
                Some(Token::Open(Tag::ListItem)) => {
                    self.enter()?;
                    items.push(ListItem(self.sequence(cursor, Some(TagKind::ListItem))?));
                    self.leave();
                }
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        context: kind,
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(items)
    }

    fn table(&mut self, cursor: &mut dyn TokenCursor) -> Result<Table, ParseError> {
        let mut table = Table::default();
        let mut seen_head = false;
        loop {
            match cursor.next_token() {
                None => return Err(ParseError::Unclosed(TagKind::Table)),
                Some(Token::Close(TagKind::Table)) => break,
                Some(Token::Open(Tag::TableHead)) => {
                    if seen_head {
                        return Err(ParseError::TableHead("more than one head"));
                    }
                    if !table.body.is_empty() {
                        return Err(ParseError::TableHead("head after body rows"));
                    }
                    seen_head = true;
                    table.head = self.table_head(cursor)?;
                }
                Some(Token::Open(Tag::TableBody)) => {
                    let rows = self.table_body(cursor)?;
                    table.body.extend(rows);
                }
                Some(Token::Open(Tag::TableRow)) => {
                    let row = self.row(cursor)?;
                    table.body.push(row);
                }
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        context: TagKind::Table,
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(table)
    }

    fn table_head(&mut self, cursor: &mut dyn TokenCursor) -> Result<Option<Row>, ParseError> {
        let mut head = None;
        loop {
            match cursor.next_token() {
                None => return Err(ParseError::Unclosed(TagKind::TableHead)),
                Some(Token::Close(TagKind::TableHead)) => break,
                Some(Token::Open(Tag::TableRow)) => {
                    if head.is_some() {
                        return Err(ParseError::TableHead("more than one row in head"));
                    }
                    head = Some(self.row(cursor)?);
                }
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        context: TagKind::TableHead,
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(head)
    }

    fn table_body(&mut self, cursor: &mut dyn TokenCursor) -> Result<Vec<Row>, ParseError> {
        let mut rows = Vec::new();
        loop {
            match cursor.next_token() {
                None => return Err(ParseError::Unclosed(TagKind::TableBody)),
                Some(Token::Close(TagKind::TableBody)) => break,
                Some(Token::Open(Tag::TableRow)) => rows.push(self.row(cursor)?),
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        context: TagKind::TableBody,
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(rows)
    }

    fn row(&mut self, cursor: &mut dyn TokenCursor) -> Result<Row, ParseError> {
        self.enter()?;
        let mut cells = Vec::new();
        loop {
            let (kind, close) = match cursor.next_token() {
                None => return Err(ParseError::Unclosed(TagKind::TableRow)),
                Some(Token::Close(TagKind::TableRow)) => break,
                Some(Token::Open(Tag::HeaderCell)) => (CellKind::Header, TagKind::HeaderCell),
                Some(Token::Open(Tag::DataCell)) => (CellKind::Data, TagKind::DataCell),
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        context: TagKind::TableRow,
                        found: other.describe(),
                    });
                }
            };
            let children = self.sequence(cursor, Some(close))?;
            cells.push(Cell { kind, children });
        }
        self.leave();
        Ok(Row(cells))
    }
}

/// Convert a code block into a verbatim block or a plugin invocation.
fn fence(info: Option<&str>, content: String) -> Result<Element, ParseError> {
    let Some((name, argstring)) = info.and_then(split_info) else {
        return Ok(Element::Block(content));
    };
    let args = match argstring {
        Some(argstring) => parse_plugin_args(argstring)?,
        None => PluginArgs::new(),
    };
    Ok(Element::Plugin(PluginInvocation::new(name, args, content)))
}

/// Build a document tree from a token cursor with default options.
pub fn build<C: TokenCursor>(cursor: &mut C) -> Result<Vec<Element>, ParseError> {
    Builder::default().build(cursor)
}

/// Tokenize markdown text and build its document tree.
pub fn parse_markdown(
    markdown: &str,
    markdown_options: &MarkdownOptions,
    options: &BuilderOptions,
) -> Result<Vec<Element>, ParseError> {
    let mut stream = TokenStream::new(tokenize(markdown, markdown_options));
    Builder::with_options(*options).build(&mut stream)
}
