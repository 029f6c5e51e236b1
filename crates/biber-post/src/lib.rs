//! The `.post` file format.
//!
//! A post starts with a metadata header of `key: value` lines, ended by the
//! first blank line. Everything after it is the markdown body:
//!
//! ```text
//! author: Ada
//! date: 05.03.2024
//! categories: rust, web
//! title: Hello
//!
//! # Hello
//!
//! First paragraph.
//! ```
//!
//! Required keys are `author`, `date`, `categories` and `title`; `sign` and
//! `attachment` are optional. List values are comma separated, with `\,`
//! for a literal comma.

mod date;
mod error;
mod metadata;

use biber_renderer::{
    BuilderOptions, Element, HtmlRenderer, MarkdownOptions, PluginLookup, RenderOptions, Rendered,
    parse_markdown,
};

pub use date::{DateError, PostDate};
pub use error::PostError;
pub use metadata::Metadata;

use metadata::MetadataBuilder;

/// Options for turning a post body into HTML.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostOptions {
    pub markdown: MarkdownOptions,
    pub builder: BuilderOptions,
    pub render: RenderOptions,
}

/// A parsed post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub metadata: Metadata,
    /// Markdown body.
    pub body: String,
}

impl Post {
    /// Parse a post from its file contents.
    pub fn parse(text: &str) -> Result<Self, PostError> {
        let mut builder = MetadataBuilder::default();
        let mut body_start = text.len();
        let mut offset = 0;

        for (index, raw) in text.split_inclusive('\n').enumerate() {
            offset += raw.len();
            let line = raw.trim();
            if line.is_empty() {
                body_start = offset;
                break;
            }
            builder.line(index + 1, line)?;
        }

        let metadata = builder.finish()?;
        tracing::debug!(title = %metadata.title, date = %metadata.date, "Parsed post metadata");
        Ok(Self {
            metadata,
            body: text[body_start..].to_owned(),
        })
    }

    /// Build the document tree of the body.
    pub fn elements(&self, options: &PostOptions) -> Result<Vec<Element>, PostError> {
        Ok(parse_markdown(&self.body, &options.markdown, &options.builder)?)
    }

    /// Build and render the body.
    pub fn render(
        &self,
        options: &PostOptions,
        plugins: &dyn PluginLookup,
    ) -> Result<Rendered, PostError> {
        let elements = self.elements(options)?;
        let rendered = HtmlRenderer::new(plugins)
            .with_options(options.render)
            .render(&elements)?;
        tracing::debug!(
            title = %self.metadata.title,
            images = rendered.images.len(),
            plugins = rendered.plugins.len(),
            "Rendered post"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biber_renderer::{ParseError, PluginRegistry, RenderError};
    use pretty_assertions::assert_eq;

    const HEADER: &str = "author: Ada\ndate: 05.03.2024\ncategories: rust\ntitle: Hello\n";

    #[test]
    fn test_parse_header_and_body() {
        let text = format!("{HEADER}\n## Intro\n\nSome *text*.\n");
        let post = Post::parse(&text).unwrap();
        assert_eq!(post.metadata.title, "Hello");
        assert_eq!(post.metadata.categories, vec!["RUST"]);
        assert_eq!(post.body, "## Intro\n\nSome *text*.\n");
    }

    #[test]
    fn test_body_starts_after_first_blank_line() {
        let text = format!("{HEADER}\n\nBody\n");
        assert_eq!(Post::parse(&text).unwrap().body, "\nBody\n");
    }

    #[test]
    fn test_crlf_and_padded_blank_line() {
        let text = "author: Ada\r\ndate: 05.03.2024\r\ncategories: a\r\ntitle: t\r\n  \r\nBody\r\n";
        let post = Post::parse(text).unwrap();
        assert_eq!(post.body, "Body\r\n");
    }

    #[test]
    fn test_header_only() {
        let post = Post::parse(HEADER.trim_end()).unwrap();
        assert_eq!(post.body, "");
    }

    #[test]
    fn test_header_error() {
        let err = Post::parse("author: Ada\nbroken\n\nbody").unwrap_err();
        assert!(matches!(err, PostError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn test_render() {
        let text = format!("{HEADER}\n# Title\n\nHello **world**!\n\n![](img/a.png)\n");
        let post = Post::parse(&text).unwrap();
        let rendered = post.render(&PostOptions::default(), &PluginRegistry::new()).unwrap();
        assert!(rendered.html.starts_with("<h2>Title</h2><p>Hello <b>world</b>!</p>"));
        assert!(rendered.images.contains("img/a.png"));
    }

    #[test]
    fn test_render_parse_error() {
        let text = format!("{HEADER}\n#### Too deep\n");
        let err = Post::parse(&text)
            .unwrap()
            .render(&PostOptions::default(), &PluginRegistry::new())
            .unwrap_err();
        assert!(matches!(err, PostError::Parse(ParseError::HeadingLevel(4))));
        assert_eq!(
            err.to_string(),
            "Parsing error: Only heading levels 1 - 3 are supported, got 4"
        );
    }

    #[test]
    fn test_render_unknown_plugin() {
        let text = format!("{HEADER}\n```chart\n1\n```\n");
        let err = Post::parse(&text)
            .unwrap()
            .render(&PostOptions::default(), &PluginRegistry::new())
            .unwrap_err();
        assert!(matches!(err, PostError::Render(RenderError::UnknownPlugin(_))));
    }
}
