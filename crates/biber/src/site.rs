//! Blog site builder.
//!
//! Posts are discovered recursively under the input directory, ordered by
//! date and numbered from 1. Each post becomes
//! `<output>/posts/<id>/index.html`, next to copies of the images, signature
//! files and attachments it references. Assets of the plugins a post uses
//! are copied to `<output>/plugin/<name>/`.
//!
//! Posts are parsed and rendered on the global rayon thread pool. A failing
//! post does not stop the others.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use biber_config::{Config, RenderConfig};
use biber_post::{Post, PostOptions};
use biber_renderer::PluginRegistry;
use rayon::prelude::*;

use crate::error::CliError;
use crate::template::{PageData, render_page};

/// Extension of post files.
const POST_EXTENSION: &str = "post";

/// Relative path from a post page to the output root.
const PAGE_ROOT: &str = "../..";

/// Post rendering options from the `[render]` config section.
pub(crate) fn post_options(render: &RenderConfig) -> PostOptions {
    PostOptions {
        markdown: render.markdown_options(),
        builder: render.builder_options(),
        render: render.render_options(),
    }
}

/// Outcome of a site build.
#[derive(Debug, Default)]
pub(crate) struct BuildReport {
    /// Number of posts written.
    pub built: usize,
    /// Number of posts whose output was newer than the source.
    pub skipped: usize,
    /// Posts that failed to parse or render.
    pub failures: Vec<CliError>,
    /// Problems that did not fail any post.
    pub warnings: Vec<String>,
}

/// A post read from disk.
struct SourcePost {
    path: PathBuf,
    post: Post,
}

enum PostOutcome {
    Built { plugins: BTreeSet<String> },
    Skipped,
}

/// Builds the blog into its output directory.
pub(crate) struct SiteBuilder {
    site_title: String,
    /// Site origin without a trailing slash, for canonical links.
    domain: Option<String>,
    input: PathBuf,
    output: PathBuf,
    assets_dir: Option<PathBuf>,
    options: PostOptions,
    registry: PluginRegistry,
    force: bool,
}

impl SiteBuilder {
    /// Create a builder from loaded configuration.
    pub(crate) fn new(config: &Config) -> Self {
        let options = post_options(&config.render);
        Self {
            site_title: config.blog_resolved.title.clone(),
            domain: config.blog_resolved.domain.clone(),
            input: config.blog_resolved.input.clone(),
            output: config.blog_resolved.output.clone(),
            assets_dir: config.plugins_resolved.assets_dir.clone(),
            registry: biber_plugins::registry(options.markdown, options.builder),
            options,
            force: false,
        }
    }

    /// Rebuild posts even when their output is up to date.
    #[must_use]
    pub(crate) fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Build every post.
    ///
    /// Fails only when the input directory cannot be read; per-post problems
    /// are collected in the report.
    pub(crate) fn build(&self) -> Result<BuildReport, CliError> {
        if !self.input.is_dir() {
            return Err(CliError::Validation(format!(
                "Posts directory does not exist: {}",
                self.input.display()
            )));
        }

        let mut paths = Vec::new();
        discover_posts(&self.input, &mut paths)?;
        paths.sort();
        tracing::info!(count = paths.len(), input = %self.input.display(), "Discovered posts");

        let mut report = BuildReport::default();

        let loaded: Vec<Result<SourcePost, CliError>> =
            paths.par_iter().map(|path| load_post(path)).collect();
        let mut sources = Vec::with_capacity(loaded.len());
        for result in loaded {
            match result {
                Ok(source) => sources.push(source),
                Err(err) => report.failures.push(err),
            }
        }
        sources.sort_by(|a, b| {
            a.post
                .metadata
                .date
                .cmp(&b.post.metadata.date)
                .then_with(|| a.path.cmp(&b.path))
        });

        let outcomes: Vec<Result<PostOutcome, CliError>> = sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| self.build_post(index + 1, source))
            .collect();

        let mut used = BTreeSet::new();
        for outcome in outcomes {
            match outcome {
                Ok(PostOutcome::Built { plugins }) => {
                    report.built += 1;
                    used.extend(plugins);
                }
                Ok(PostOutcome::Skipped) => report.skipped += 1,
                Err(err) => report.failures.push(err),
            }
        }

        self.copy_plugin_assets(&used, &mut report.warnings);
        Ok(report)
    }

    fn build_post(&self, id: usize, source: &SourcePost) -> Result<PostOutcome, CliError> {
        let page_dir = self.output.join("posts").join(id.to_string());
        let index = page_dir.join("index.html");

        if !self.force && is_up_to_date(&source.path, &index) {
            tracing::debug!(id, path = %source.path.display(), "Post is up to date");
            return Ok(PostOutcome::Skipped);
        }

        let rendered = source
            .post
            .render(&self.options, &self.registry)
            .map_err(|err| CliError::Post {
                path: source.path.clone(),
                source: err,
            })?;

        let metadata = &source.post.metadata;
        let mut scripts = Vec::new();
        let mut stylesheets = Vec::new();
        for (name, assets) in self.registry.assets_for(&rendered.plugins) {
            let href = |file: &String| format!("{PAGE_ROOT}/plugin/{name}/{file}");
            scripts.extend(assets.scripts.iter().map(href));
            stylesheets.extend(assets.stylesheets.iter().map(href));
        }

        let html = render_page(&PageData {
            site_title: &self.site_title,
            canonical: self.domain.as_ref().map(|domain| format!("{domain}/posts/{id}/")),
            title: &metadata.title,
            author: &metadata.author,
            date: metadata.date.to_string(),
            categories: &metadata.categories,
            body: &rendered.html,
            attachments: &metadata.attachment,
            scripts,
            stylesheets,
        });

        let post_dir = source.path.parent().unwrap_or(Path::new("."));
        let referenced = rendered
            .images
            .iter()
            .filter(|src| !is_remote(src))
            .chain(&metadata.sign)
            .chain(&metadata.attachment);
        for file in referenced {
            let relative = local_path(file).ok_or_else(|| CliError::OutsidePost {
                path: source.path.clone(),
                file: file.clone(),
            })?;
            copy_file(&post_dir.join(relative), &page_dir.join(relative))?;
        }

        // Written last so a failed copy leaves the post out of date.
        fs::create_dir_all(&page_dir).map_err(CliError::file(&page_dir))?;
        fs::write(&index, html).map_err(CliError::file(&index))?;

        tracing::info!(id, title = %metadata.title, path = %source.path.display(), "Built post");
        Ok(PostOutcome::Built {
            plugins: rendered.plugins,
        })
    }

    fn copy_plugin_assets(&self, used: &BTreeSet<String>, warnings: &mut Vec<String>) {
        for (name, assets) in self.registry.assets_for(used) {
            if assets.is_empty() {
                continue;
            }
            let Some(assets_dir) = &self.assets_dir else {
                warnings.push(format!(
                    "Plugin '{name}' has assets but plugins.assets_dir is not set"
                ));
                continue;
            };
            for file in assets.all() {
                let from = assets_dir.join(name).join(file);
                let to = self.output.join("plugin").join(name).join(file);
                if let Err(err) = copy_file(&from, &to) {
                    warnings.push(format!("Asset of plugin '{name}' not copied: {err}"));
                }
            }
        }
    }
}

/// Collect `*.post` files under `dir`, skipping hidden entries.
fn discover_posts(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), CliError> {
    for entry in fs::read_dir(dir).map_err(CliError::file(dir))? {
        let entry = entry.map_err(CliError::file(dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            discover_posts(&path, paths)?;
        } else if path.extension().is_some_and(|e| e == POST_EXTENSION) {
            paths.push(path);
        }
    }
    Ok(())
}

fn load_post(path: &Path) -> Result<SourcePost, CliError> {
    let text = fs::read_to_string(path).map_err(CliError::file(path))?;
    let post = Post::parse(&text).map_err(|source| CliError::Post {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourcePost {
        path: path.to_path_buf(),
        post,
    })
}

/// Whether `output` exists and is newer than `source`.
fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(output)) {
        (Some(source), Some(output)) => source < output,
        _ => false,
    }
}

/// Whether an image source points outside the local file tree.
fn is_remote(src: &str) -> bool {
    src.contains("://") || src.starts_with("//") || src.starts_with("data:")
}

/// `file` as a path below the post directory, or `None` if it escapes it.
fn local_path(file: &str) -> Option<&Path> {
    let path = Path::new(file);
    let contained = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    (contained && !file.is_empty()).then_some(path)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), CliError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(CliError::file(parent))?;
    }
    fs::copy(from, to).map_err(CliError::file(from))?;
    Ok(())
}
