//! Stock content plugins for biber.
//!
//! - [`LatexPlugin`] (`latex`): math typeset client side by `MathJax`
//! - [`TablePlugin`] (`table`): compact line-oriented table syntax with alignment and styles
//! - [`CommentPlugin`] (`comment`): author notes, optionally kept as HTML comments
//!
//! The built-in `code` plugin lives in `biber-renderer` and needs no registration.
//!
//! # Example
//!
//! ```
//! use biber_renderer::{BuilderOptions, HtmlRenderer, MarkdownOptions, parse_markdown};
//!
//! let registry = biber_plugins::stock_registry();
//! let elements = parse_markdown(
//!     "```latex inline=true\nx^2\n```",
//!     &MarkdownOptions::default(),
//!     &BuilderOptions::default(),
//! )
//! .unwrap();
//! let rendered = HtmlRenderer::new(&registry).render(&elements).unwrap();
//! assert_eq!(rendered.html, r#"<span class="plugin-latex-inline">$x^2$</span>"#);
//! ```

mod comment;
mod latex;
mod table;

use biber_renderer::{BuilderOptions, MarkdownOptions, PluginArgs, PluginError, PluginRegistry};

pub use comment::CommentPlugin;
pub use latex::LatexPlugin;
pub use table::TablePlugin;

/// Registry holding every stock plugin.
#[must_use]
pub fn stock_registry() -> PluginRegistry {
    registry(MarkdownOptions::default(), BuilderOptions::default())
}

/// Registry holding every stock plugin, with table cells parsed using the
/// given options.
#[must_use]
pub fn registry(markdown: MarkdownOptions, builder: BuilderOptions) -> PluginRegistry {
    PluginRegistry::new()
        .with_plugin(LatexPlugin)
        .with_plugin(TablePlugin::new(markdown, builder))
        .with_plugin(CommentPlugin)
}

/// Parse an optional `true`/`false` argument, case-insensitively.
fn flag(args: &PluginArgs, name: &str) -> Result<bool, PluginError> {
    let Some(value) = args.get(name) else {
        return Ok(false);
    };
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(PluginError::invalid(name, value, "expected true or false"))
    }
}
