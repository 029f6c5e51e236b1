//! `pulldown-cmark` binding for the token vocabulary.
//!
//! Flattens the parser's event stream into [`Token`]s: code block text is
//! joined into one [`Token::Fence`], image labels are collected as the image's
//! children, and table rows are wrapped in explicit head/body containers.
//! Constructs without a document element are forwarded as `Unsupported` so the
//! builder can report them.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag as CmarkTag, TagEnd};

use crate::token::{Tag, TagKind, Token};

/// Tokenizer options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Enable GFM tables.
    pub tables: bool,
    /// Enable smart quotes and typographic replacements.
    pub typographer: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            typographer: true,
        }
    }
}

impl MarkdownOptions {
    /// Parser options for these settings.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options |= Options::ENABLE_TABLES;
        }
        if self.typographer {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }
}

/// Tokenize markdown text.
#[must_use]
pub fn tokenize(markdown: &str, options: &MarkdownOptions) -> Vec<Token> {
    tokenize_events(Parser::new_ext(markdown, options.parser_options()))
}

/// Convert a `pulldown-cmark` event stream into tokens.
pub fn tokenize_events<'a, I>(events: I) -> Vec<Token>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut tokenizer = Tokenizer::default();
    for event in events {
        tokenizer.event(event);
    }
    tokenizer.output
}

struct PendingImage {
    src: String,
    children: Vec<Token>,
}

struct PendingCode {
    info: Option<String>,
    content: String,
}

#[derive(Default)]
struct Tokenizer {
    output: Vec<Token>,
    emphasis_depth: u8,
    code: Option<PendingCode>,
    /// Open images, innermost last.
    images: Vec<PendingImage>,
    in_table_head: bool,
    table_body_open: bool,
}

impl Tokenizer {
    fn push(&mut self, token: Token) {
        match self.images.last_mut() {
            Some(image) => image.children.push(token),
            None => self.output.push(token),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = &mut self.code {
                    code.content.push_str(&text);
                } else {
                    self.push(Token::Text(text.into_string()));
                }
            }
            Event::Code(code) => self.push(Token::Code(code.into_string())),
            Event::Html(html) => self.push(Token::Html(html.into_string())),
            Event::InlineHtml(html) => self.push(Token::InlineHtml(html.into_string())),
            Event::SoftBreak => self.push(Token::SoftBreak),
            Event::HardBreak => self.push(Token::HardBreak),
            Event::Rule => self.push(Token::Rule),
            Event::FootnoteReference(_) => self.unsupported("footnote reference"),
            Event::TaskListMarker(_) => self.unsupported("task list marker"),
            Event::InlineMath(_) => self.unsupported("inline math"),
            Event::DisplayMath(_) => self.unsupported("display math"),
        }
    }

    fn unsupported(&mut self, name: &str) {
        self.push(Token::Unsupported(name.to_owned()));
    }

    fn start(&mut self, tag: CmarkTag<'_>) {
        let tag = match tag {
            CmarkTag::Paragraph => Tag::Paragraph,
            CmarkTag::Heading { level, .. } => Tag::Heading(heading_level_to_num(level)),
            CmarkTag::BlockQuote(_) => Tag::Quote,
            CmarkTag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => Some(info.into_string()),
                    _ => None,
                };
                self.code = Some(PendingCode {
                    info,
                    content: String::new(),
                });
                return;
            }
            CmarkTag::HtmlBlock => return,
            CmarkTag::List(Some(_)) => Tag::OrderedList,
            CmarkTag::List(None) => Tag::BulletList,
            CmarkTag::Item => Tag::ListItem,
            CmarkTag::Table(_) => {
                self.table_body_open = false;
                Tag::Table
            }
            CmarkTag::TableHead => {
                self.in_table_head = true;
                self.push(Token::Open(Tag::TableHead));
                Tag::TableRow
            }
            CmarkTag::TableRow => {
                if !self.table_body_open {
                    self.table_body_open = true;
                    self.push(Token::Open(Tag::TableBody));
                }
                Tag::TableRow
            }
            CmarkTag::TableCell => {
                if self.in_table_head {
                    Tag::HeaderCell
                } else {
                    Tag::DataCell
                }
            }
            CmarkTag::Emphasis => {
                self.emphasis_depth = self.emphasis_depth.saturating_add(1);
                Tag::Emphasis(self.emphasis_depth)
            }
            CmarkTag::Strong => Tag::Strong,
            CmarkTag::Link { dest_url, .. } => Tag::Link(dest_url.into_string()),
            CmarkTag::Image { dest_url, .. } => {
                self.images.push(PendingImage {
                    src: dest_url.into_string(),
                    children: Vec::new(),
                });
                return;
            }
            CmarkTag::Strikethrough => Tag::Unsupported("strikethrough".to_owned()),
            CmarkTag::Superscript => Tag::Unsupported("superscript".to_owned()),
            CmarkTag::Subscript => Tag::Unsupported("subscript".to_owned()),
            CmarkTag::FootnoteDefinition(_) => Tag::Unsupported("footnote definition".to_owned()),
            CmarkTag::DefinitionList
            | CmarkTag::DefinitionListTitle
            | CmarkTag::DefinitionListDefinition => Tag::Unsupported("definition list".to_owned()),
            CmarkTag::MetadataBlock(_) => Tag::Unsupported("metadata block".to_owned()),
        };
        self.push(Token::Open(tag));
    }

    fn end(&mut self, tag: TagEnd) {
        let kind = match tag {
            TagEnd::Paragraph => TagKind::Paragraph,
            TagEnd::Heading(_) => TagKind::Heading,
            TagEnd::BlockQuote(_) => TagKind::Quote,
            TagEnd::CodeBlock => {
                if let Some(mut code) = self.code.take() {
                    // The newline before the closing fence belongs to the fence.
                    if code.content.ends_with('\n') {
                        code.content.pop();
                    }
                    self.push(Token::Fence {
                        info: code.info,
                        content: code.content,
                    });
                }
                return;
            }
            TagEnd::HtmlBlock => return,
            TagEnd::List(true) => TagKind::OrderedList,
            TagEnd::List(false) => TagKind::BulletList,
            TagEnd::Item => TagKind::ListItem,
            TagEnd::Table => {
                if std::mem::take(&mut self.table_body_open) {
                    self.push(Token::Close(TagKind::TableBody));
                }
                TagKind::Table
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.push(Token::Close(TagKind::TableRow));
                TagKind::TableHead
            }
            TagEnd::TableRow => TagKind::TableRow,
            TagEnd::TableCell => {
                if self.in_table_head {
                    TagKind::HeaderCell
                } else {
                    TagKind::DataCell
                }
            }
            TagEnd::Emphasis => {
                self.emphasis_depth = self.emphasis_depth.saturating_sub(1);
                TagKind::Emphasis
            }
            TagEnd::Strong => TagKind::Strong,
            TagEnd::Link => TagKind::Link,
            TagEnd::Image => {
                if let Some(image) = self.images.pop() {
                    let alt = plain_text(&image.children);
                    self.push(Token::Image {
                        src: image.src,
                        alt,
                        children: image.children,
                    });
                }
                return;
            }
            TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_) => TagKind::Unsupported,
        };
        self.push(Token::Close(kind));
    }
}

/// Concatenated literal text of a token run.
fn plain_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for token in tokens {
        match token {
            Token::Text(t) | Token::Code(t) => text.push_str(t),
            Token::Image { alt, .. } => text.push_str(alt),
            Token::SoftBreak | Token::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
