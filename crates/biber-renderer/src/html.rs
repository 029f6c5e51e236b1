//! HTML renderer for document trees.
//!
//! Walks an [`Element`] sequence in document order and produces an HTML
//! fragment. Document text is always escaped; plugin output is inserted
//! verbatim. Image sources and plugin names met during the walk are collected
//! into the returned [`Rendered`] so the caller can copy supporting files.

use std::collections::BTreeSet;

use crate::code_block::{CODE_PLUGIN, CodePlugin};
use crate::element::{Cell, CellKind, Element, ListItem, PluginInvocation, Row, Table};
use crate::error::RenderError;
use crate::plugin::{Plugin, PluginLookup};
use crate::util::escape_html;

/// Highest HTML heading level.
const MAX_HTML_HEADING: u8 = 6;

static BUILTIN_CODE: CodePlugin = CodePlugin;

/// Renderer options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Added to each heading level, so level 1 renders as `<h{1 + offset}>`.
    pub heading_offset: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { heading_offset: 1 }
    }
}

/// Result of rendering one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// HTML fragment.
    pub html: String,
    /// Every image source referenced by the document.
    pub images: BTreeSet<String>,
    /// Every plugin name invoked by the document.
    pub plugins: BTreeSet<String>,
}

/// Element tree to HTML renderer.
///
/// Holds no per-document state; one renderer can be shared across threads.
///
/// # Example
///
/// ```
/// use biber_renderer::{Element, HtmlRenderer, PluginRegistry};
///
/// let registry = PluginRegistry::new();
/// let elements = vec![Element::Paragraph(vec![Element::Text("a < b".to_owned())])];
/// let rendered = HtmlRenderer::new(&registry).render(&elements).unwrap();
/// assert_eq!(rendered.html, "<p>a &lt; b</p>");
/// ```
pub struct HtmlRenderer<'p> {
    plugins: &'p dyn PluginLookup,
    options: RenderOptions,
}

impl<'p> HtmlRenderer<'p> {
    /// Create a renderer resolving plugins through `plugins`.
    ///
    /// The built-in `code` plugin is used when `plugins` has no entry named `code`.
    #[must_use]
    pub fn new(plugins: &'p dyn PluginLookup) -> Self {
        Self {
            plugins,
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render a top-level element sequence.
    pub fn render(&self, elements: &[Element]) -> Result<Rendered, RenderError> {
        let mut rendered = Rendered::default();
        self.children(elements, &mut rendered)?;
        tracing::debug!(
            html_len = rendered.html.len(),
            images = rendered.images.len(),
            plugins = rendered.plugins.len(),
            "Rendered document"
        );
        Ok(rendered)
    }

    fn children(&self, children: &[Element], out: &mut Rendered) -> Result<(), RenderError> {
        for child in children {
            self.element(child, out)?;
        }
        Ok(())
    }

    fn wrapped(&self, tag: &str, children: &[Element], out: &mut Rendered) -> Result<(), RenderError> {
        out.html.push('<');
        out.html.push_str(tag);
        out.html.push('>');
        self.children(children, out)?;
        out.html.push_str("</");
        out.html.push_str(tag);
        out.html.push('>');
        Ok(())
    }

    fn element(&self, element: &Element, out: &mut Rendered) -> Result<(), RenderError> {
        match element {
            Element::Heading { level, children } => {
                let offset = self.options.heading_offset;
                let html_level = level.saturating_add(offset);
                if *level == 0 || html_level > MAX_HTML_HEADING {
                    return Err(RenderError::HeadingOverflow {
                        level: *level,
                        offset,
                    });
                }
                self.wrapped(&format!("h{html_level}"), children, out)?;
            }
            Element::Paragraph(children) => self.wrapped("p", children, out)?,
            Element::Text(text) => out.html.push_str(&escape_html(text)),
            Element::Strong(children) => self.wrapped("b", children, out)?,
            Element::Emphasis { strength, children } => {
                let tag = match strength {
                    1 => "i",
                    2 => "em",
                    _ => {
                        return Err(RenderError::Unsupported {
                            context: "emphasis",
                            element: "nesting deeper than two levels",
                        });
                    }
                };
                self.wrapped(tag, children, out)?;
            }
            Element::LineBreak => out.html.push_str("<br>"),
            Element::Block(content) => {
                out.html.push_str(r#"<pre><code class="language-plain">"#);
                out.html.push_str(&escape_html(content));
                out.html.push_str("</code></pre>");
            }
            Element::Plugin(invocation) => self.plugin(invocation, out)?,
            Element::Tag(code) => {
                out.html.push_str(r#"<code class="post-tag">"#);
                out.html.push_str(&escape_html(code));
                out.html.push_str("</code>");
            }
            Element::Quote(children) => {
                out.html.push_str(r#"<blockquote class="post-quote">"#);
                self.children(children, out)?;
                out.html.push_str("</blockquote>");
            }
            Element::Link { href, children } => {
                out.html.push_str(&format!(
                    r#"<a href="{}" target="_blank">"#,
                    escape_html(href)
                ));
                self.children(children, out)?;
                out.html.push_str("</a>");
            }
            Element::Image { src, alt } => self.image(src, alt, out)?,
            Element::UnorderedList(items) => self.list("ul", items, out)?,
            Element::OrderedList(items) => self.list("ol", items, out)?,
            Element::Table(table) => self.table(table, out)?,
        }
        Ok(())
    }

    fn plugin(&self, invocation: &PluginInvocation, out: &mut Rendered) -> Result<(), RenderError> {
        let name = &invocation.name;
        out.plugins.insert(name.clone());

        let plugin = self
            .plugins
            .lookup(name)
            .or_else(|| (name == CODE_PLUGIN).then_some(&BUILTIN_CODE as &dyn Plugin))
            .ok_or_else(|| RenderError::UnknownPlugin(name.clone()))?;

        tracing::debug!(plugin = %name, args = ?invocation.args, "Rendering plugin invocation");
        let output = plugin
            .generate(&invocation.content, &invocation.args)
            .map_err(|source| RenderError::Plugin {
                name: name.clone(),
                source,
            })?;
        let (html, images) = output.into_parts();
        out.html.push_str(&html);
        out.images.extend(images);
        Ok(())
    }

    fn image(&self, src: &str, alt: &[Element], out: &mut Rendered) -> Result<(), RenderError> {
        out.images.insert(src.to_owned());
        let plain = render_plain(alt)?;
        out.html.push_str(&format!(
            r#"<span class="post-figure"><img src="{}" alt="{plain}">"#,
            escape_html(src)
        ));
        if !alt.is_empty() {
            out.html.push_str(r#"<span class="post-figure-description">"#);
            for child in alt {
                if !child.is_inline() {
                    return Err(RenderError::Unsupported {
                        context: "image caption",
                        element: child.name(),
                    });
                }
                self.element(child, out)?;
            }
            out.html.push_str("</span>");
        }
        out.html.push_str("</span>");
        Ok(())
    }

    fn list(&self, tag: &str, items: &[ListItem], out: &mut Rendered) -> Result<(), RenderError> {
        out.html.push_str(&format!("<{tag}>"));
        for ListItem(children) in items {
            self.wrapped("li", children, out)?;
        }
        out.html.push_str(&format!("</{tag}>"));
        Ok(())
    }

    fn table(&self, table: &Table, out: &mut Rendered) -> Result<(), RenderError> {
        out.html.push_str(r#"<table class="table">"#);
        if let Some(head) = &table.head {
            out.html.push_str("<thead>");
            self.row(head, out)?;
            out.html.push_str("</thead>");
        }
        if !table.body.is_empty() {
            out.html.push_str("<tbody>");
            for row in &table.body {
                self.row(row, out)?;
            }
            out.html.push_str("</tbody>");
        }
        out.html.push_str("</table>");
        Ok(())
    }

    fn row(&self, row: &Row, out: &mut Rendered) -> Result<(), RenderError> {
        out.html.push_str("<tr>");
        for Cell { kind, children } in &row.0 {
            let tag = match kind {
                CellKind::Header => "th",
                CellKind::Data => "td",
            };
            self.wrapped(tag, children, out)?;
        }
        out.html.push_str("</tr>");
        Ok(())
    }
}

/// Render `elements` with default options.
pub fn render(elements: &[Element], plugins: &dyn PluginLookup) -> Result<Rendered, RenderError> {
    HtmlRenderer::new(plugins).render(elements)
}

/// Escaped plain-text projection of inline elements, used for `alt` attributes.
///
/// Formatting is dropped, line breaks become spaces and nested images
/// contribute their own alt text. Block elements are rejected.
pub fn render_plain(elements: &[Element]) -> Result<String, RenderError> {
    let mut out = String::new();
    plain_into(elements, &mut out)?;
    Ok(out)
}

fn plain_into(elements: &[Element], out: &mut String) -> Result<(), RenderError> {
    for element in elements {
        match element {
            Element::Text(text) | Element::Tag(text) => out.push_str(&escape_html(text)),
            Element::LineBreak => out.push(' '),
            Element::Strong(children)
            | Element::Emphasis { children, .. }
            | Element::Link { children, .. }
            | Element::Image { alt: children, .. } => plain_into(children, out)?,
            other => {
                return Err(RenderError::Unsupported {
                    context: "image alt",
                    element: other.name(),
                });
            }
        }
    }
    Ok(())
}
