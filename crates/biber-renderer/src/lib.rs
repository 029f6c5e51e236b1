//! Document tree builder and HTML renderer for blog posts.
//!
//! Markdown is turned into HTML in three steps:
//!
//! 1. [`tokenize`] flattens `pulldown-cmark` events into a [`Token`] stream.
//! 2. [`Builder`] pulls tokens through a [`TokenCursor`] and builds a typed
//!    [`Element`] tree, rejecting anything the blog dialect does not support.
//! 3. [`HtmlRenderer`] walks the tree, dispatching [`PluginInvocation`]s to
//!    [`Plugin`]s looked up by name, and reports the images and plugins the
//!    document referenced.
//!
//! Every step is a pure function over one document, so many documents can be
//! processed in parallel with one shared [`PluginRegistry`].
//!
//! # Example
//!
//! ```
//! use biber_renderer::{
//!     BuilderOptions, HtmlRenderer, MarkdownOptions, PluginRegistry, parse_markdown,
//! };
//!
//! let markdown = "# Title\n\nHello **world**!\n\n```code language=python\nprint(1)\n```";
//! let elements =
//!     parse_markdown(markdown, &MarkdownOptions::default(), &BuilderOptions::default())
//!         .unwrap();
//!
//! let registry = PluginRegistry::new();
//! let rendered = HtmlRenderer::new(&registry).render(&elements).unwrap();
//! assert!(rendered.html.starts_with("<h2>Title</h2><p>Hello <b>world</b>!</p>"));
//! assert!(rendered.plugins.contains("code"));
//! ```

mod args;
mod builder;
mod code_block;
mod element;
mod error;
mod html;
pub mod markdown;
mod plugin;
mod token;
mod util;

pub use args::{EscapeError, parse_plugin_args, split_escaped};
pub use builder::{Builder, BuilderOptions, CaptionMode, MAX_DEPTH, build, parse_markdown};
pub use code_block::{CODE_PLUGIN, CodePlugin};
pub use element::{Cell, CellKind, Element, ListItem, PluginArgs, PluginInvocation, Row, Table};
pub use error::{ParseError, RenderError};
pub use html::{HtmlRenderer, RenderOptions, Rendered, render, render_plain};
pub use markdown::{MarkdownOptions, tokenize};
pub use plugin::{Plugin, PluginAssets, PluginError, PluginLookup, PluginOutput, PluginRegistry};
pub use token::{Tag, TagKind, Token, TokenCursor, TokenStream};
pub use util::escape_html;
