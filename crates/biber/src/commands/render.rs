//! `biber render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use biber_config::Config;
use biber_post::{Post, PostOptions};
use clap::Args;

use crate::error::CliError;
use crate::site::post_options;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Post file to render.
    file: PathBuf,

    /// Path to configuration file (default: built-in render settings).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the document tree as JSON instead of HTML.
    #[arg(long)]
    tree: bool,

    /// Enable verbose output (log referenced images and plugins).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// The HTML fragment or tree goes to stdout; everything else goes to stderr.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let options = match &self.config {
            Some(path) => post_options(&Config::load(Some(path.as_path()), None)?.render),
            None => PostOptions::default(),
        };
        let text = if self.tree {
            tree_file(&self.file, &options)?
        } else {
            render_file(&self.file, &options)?
        };

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        writeln!(stdout)?;
        Ok(())
    }
}

fn read_post(path: &Path) -> Result<Post, CliError> {
    let text = std::fs::read_to_string(path).map_err(CliError::file(path))?;
    Post::parse(&text).map_err(|source| CliError::Post {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the document tree of one post file as pretty JSON.
fn tree_file(path: &Path, options: &PostOptions) -> Result<String, CliError> {
    let elements = read_post(path)?
        .elements(options)
        .map_err(|source| CliError::Post {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(serde_json::to_string_pretty(&elements)?)
}

/// Render one post file to its HTML fragment.
fn render_file(path: &Path, options: &PostOptions) -> Result<String, CliError> {
    let registry = biber_plugins::registry(options.markdown, options.builder);
    let rendered = read_post(path)?
        .render(options, &registry)
        .map_err(|source| CliError::Post {
            path: path.to_path_buf(),
            source,
        })?;

    for image in &rendered.images {
        tracing::info!(image = %image, "Referenced image");
    }
    for plugin in &rendered.plugins {
        tracing::info!(plugin = %plugin, "Used plugin");
    }
    Ok(rendered.html)
}
