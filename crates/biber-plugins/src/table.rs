//! `table` plugin: compact tables with per-column alignment.
//!
//! ````text
//! ```table align=l|c|r style=striped
//! Name | Qty | Price
//! ---
//! Apple | 3 | **1.20**
//! ```
//! ````
//!
//! Each non-blank line is a row; cells are separated by the separator
//! surrounded by single spaces. A `---` line turns the rows above it into
//! head rows. Cells are rendered as markdown.

use std::collections::BTreeSet;
use std::fmt;

use biber_renderer::{
    BuilderOptions, Element, MarkdownOptions, Plugin, PluginArgs, PluginError, PluginOutput,
    PluginRegistry, Rendered, parse_markdown, render,
};

const DEFAULT_SEPARATOR: char = '|';

/// Divider between head and body rows.
const HEAD_DIVIDER: &str = "---";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "l" => Some(Self::Left),
            "c" => Some(Self::Center),
            "r" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// Table plugin.
///
/// Arguments: `align` (required, `l`/`c`/`r` per column joined by `|`),
/// `style` (`striped`, `bordered` or `small`), `spacing` (`equal` or `auto`)
/// and `separator` (one character, default `|`).
#[derive(Clone, Copy, Debug, Default)]
pub struct TablePlugin {
    markdown: MarkdownOptions,
    builder: BuilderOptions,
}

impl TablePlugin {
    /// Render cell markdown with the given options.
    #[must_use]
    pub fn new(markdown: MarkdownOptions, builder: BuilderOptions) -> Self {
        Self { markdown, builder }
    }

    fn cell(&self, source: &str) -> Result<Rendered, PluginError> {
        let elements = parse_markdown(source.trim(), &self.markdown, &self.builder)
            .map_err(|e| PluginError::Content(format!("cell '{source}': {e}")))?;
        if elements.iter().any(|e| matches!(e, Element::Plugin(_))) {
            return Err(PluginError::Content(format!(
                "cell '{source}': plugins are not allowed in table cells"
            )));
        }

        let elements = match <[Element; 1]>::try_from(elements) {
            Ok([Element::Paragraph(children)]) => children,
            Ok(single) => Vec::from(single),
            Err(elements) => elements,
        };
        render(&elements, &PluginRegistry::new())
            .map_err(|e| PluginError::Content(format!("cell '{source}': {e}")))
    }
}

impl Plugin for TablePlugin {
    fn name(&self) -> &str {
        "table"
    }

    fn generate(&self, content: &str, args: &PluginArgs) -> Result<PluginOutput, PluginError> {
        let aligns = parse_align(args)?;
        let style = parse_style(args)?;
        let width = parse_spacing(args, aligns.len())?;
        let separator = format!(" {} ", parse_separator(args)?);

        let mut head = Vec::new();
        let mut body = Vec::new();
        let mut divided = false;
        let mut images = BTreeSet::new();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim() == HEAD_DIVIDER {
                if divided {
                    return Err(PluginError::Content(format!(
                        "line {}: head and body divider given more than once",
                        index + 1
                    )));
                }
                divided = true;
                head = std::mem::take(&mut body);
                continue;
            }

            let mut cells = Vec::new();
            for source in line.split(separator.as_str()) {
                let rendered = self.cell(source)?;
                images.extend(rendered.images);
                cells.push(rendered.html);
            }
            if cells.len() != aligns.len() {
                return Err(PluginError::Content(format!(
                    "line {}: expected {} columns, found {}",
                    index + 1,
                    aligns.len(),
                    cells.len()
                )));
            }
            body.push(cells);
        }

        tracing::debug!(
            columns = aligns.len(),
            head_rows = head.len(),
            body_rows = body.len(),
            images = images.len(),
            "Rendered table"
        );

        let mut html = String::from(r#"<div class="table-responsive"><table class="table"#);
        if let Some(style) = style {
            html.push(' ');
            html.push_str(style);
        }
        html.push_str(r#"">"#);
        push_section(&mut html, "thead", &head, &aligns, &width);
        push_section(&mut html, "tbody", &body, &aligns, &width);
        html.push_str("</table></div>");

        Ok(PluginOutput::Document { html, images })
    }
}

fn push_section(html: &mut String, tag: &str, rows: &[Vec<String>], aligns: &[Align], width: &str) {
    if rows.is_empty() {
        return;
    }
    html.push_str(&format!("<{tag}>"));
    for row in rows {
        html.push_str("<tr>");
        for (cell, align) in row.iter().zip(aligns) {
            html.push_str(&format!(r#"<td width="{width}" align="{align}">{cell}</td>"#));
        }
        html.push_str("</tr>");
    }
    html.push_str(&format!("</{tag}>"));
}

fn parse_align(args: &PluginArgs) -> Result<Vec<Align>, PluginError> {
    let value = args
        .get("align")
        .ok_or_else(|| PluginError::MissingArgument("align".to_owned()))?;
    value
        .split('|')
        .map(|column| {
            Align::parse(column.trim()).ok_or_else(|| {
                PluginError::invalid("align", value, format!("unknown alignment '{}'", column.trim()))
            })
        })
        .collect()
}

fn parse_style(args: &PluginArgs) -> Result<Option<&'static str>, PluginError> {
    let Some(value) = args.get("style") else {
        return Ok(None);
    };
    match value.as_str() {
        "striped" => Ok(Some("table-striped")),
        "bordered" => Ok(Some("table-bordered")),
        "small" => Ok(Some("table-sm")),
        _ => Err(PluginError::invalid(
            "style",
            value,
            "expected striped, bordered or small",
        )),
    }
}

fn parse_spacing(args: &PluginArgs, columns: usize) -> Result<String, PluginError> {
    match args.get("spacing").map(String::as_str) {
        None | Some("auto") => Ok("auto".to_owned()),
        Some("equal") => Ok(format!("{}%", 100 / columns.max(1))),
        Some(other) => Err(PluginError::invalid("spacing", other, "expected equal or auto")),
    }
}

fn parse_separator(args: &PluginArgs) -> Result<char, PluginError> {
    let Some(value) = args.get("separator") else {
        return Ok(DEFAULT_SEPARATOR);
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c),
        _ => Err(PluginError::invalid(
            "separator",
            value,
            "expected a single non-space character",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generate(content: &str, args: &[(&str, &str)]) -> Result<String, PluginError> {
        let args = args
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        TablePlugin::default()
            .generate(content, &args)
            .map(PluginOutput::into_html)
    }

    #[test]
    fn test_head_and_body() {
        let html = generate("Name | Qty\n---\nApple | 3\n", &[("align", "l|r")]).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<div class="table-responsive"><table class="table">"#,
                r#"<thead><tr><td width="auto" align="left">Name</td><td width="auto" align="right">Qty</td></tr></thead>"#,
                r#"<tbody><tr><td width="auto" align="left">Apple</td><td width="auto" align="right">3</td></tr></tbody>"#,
                "</table></div>"
            )
        );
    }

    #[test]
    fn test_body_only() {
        let html = generate("a | b\n\nc | d", &[("align", "c|c")]).unwrap();
        assert!(!html.contains("<thead>"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_cells_rendered_as_markdown() {
        let html = generate("**bold** | `code` | a<b", &[("align", "l|l|l")]).unwrap();
        assert!(html.contains(r#"align="left"><b>bold</b></td>"#));
        assert!(html.contains(r#"<code class="post-tag">code</code>"#));
        assert!(html.contains("a&lt;b"));
    }

    #[test]
    fn test_cell_images_reported() {
        let args = [("align".to_owned(), "l|l".to_owned())].into_iter().collect();
        let output = TablePlugin::default()
            .generate("![](a.png) | x\n![b](img/b.jpg) | y", &args)
            .unwrap();
        let (html, images) = output.into_parts();
        assert!(html.contains(r#"<img src="img/b.jpg" alt="b">"#));
        assert_eq!(
            images,
            BTreeSet::from(["a.png".to_owned(), "img/b.jpg".to_owned()])
        );
    }

    #[test]
    fn test_style_and_equal_spacing() {
        let html = generate(
            "a | b | c",
            &[("align", "l|c|r"), ("style", "bordered"), ("spacing", "equal")],
        )
        .unwrap();
        assert!(html.starts_with(r#"<div class="table-responsive"><table class="table table-bordered">"#));
        assert!(html.contains(r#"<td width="33%" align="center">b</td>"#));
    }

    #[test]
    fn test_custom_separator() {
        let html = generate("a ; b", &[("align", "l|l"), ("separator", ";")]).unwrap();
        assert!(html.contains(">a</td>"));
        assert!(html.contains(">b</td>"));
    }

    #[test]
    fn test_column_count_mismatch() {
        let err = generate("a | b\nc", &[("align", "l|l")]).unwrap_err();
        assert_eq!(
            err,
            PluginError::Content("line 2: expected 2 columns, found 1".to_owned())
        );
    }

    #[test]
    fn test_divider_once() {
        let err = generate("a\n---\nb\n---\nc", &[("align", "l")]).unwrap_err();
        assert!(matches!(err, PluginError::Content(ref msg) if msg.starts_with("line 4")));
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            generate("a", &[]),
            Err(PluginError::MissingArgument("align".to_owned()))
        );
        assert!(matches!(
            generate("a", &[("align", "x")]),
            Err(PluginError::InvalidArgument { ref name, .. }) if name == "align"
        ));
        assert!(matches!(
            generate("a", &[("align", "l"), ("style", "fancy")]),
            Err(PluginError::InvalidArgument { ref name, .. }) if name == "style"
        ));
        assert!(matches!(
            generate("a", &[("align", "l"), ("spacing", "wide")]),
            Err(PluginError::InvalidArgument { ref name, .. }) if name == "spacing"
        ));
        assert!(matches!(
            generate("a", &[("align", "l"), ("separator", "||")]),
            Err(PluginError::InvalidArgument { ref name, .. }) if name == "separator"
        ));
    }

    #[test]
    fn test_plugin_in_cell_rejected() {
        let err = generate("```latex", &[("align", "l")]).unwrap_err();
        assert!(matches!(err, PluginError::Content(ref msg) if msg.contains("not allowed")));
    }
}
