//! Configuration management for biber.
//!
//! Parses `biber.toml` with serde and discovers it in the working directory
//! or any of its parents.
//!
//! ```toml
//! [blog]
//! title = "Notes"
//! domain = "https://notes.example.com"
//! input = "posts"
//! output = "public"
//!
//! [render]
//! heading_offset = 1
//! caption = "html-break"
//!
//! [plugins]
//! assets_dir = "plugins"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! `blog.title`, `blog.domain` and all paths support `${VAR}` and
//! `${VAR:-default}` environment variable expansion. Paths may also start
//! with `~` for the home directory.

mod expand;

use std::path::{Path, PathBuf};

use biber_renderer::{BuilderOptions, CaptionMode, MarkdownOptions, RenderOptions};
use serde::Deserialize;

use crate::expand::{Expansion, expand_field};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "biber.toml";

/// Largest heading offset that still leaves room for three heading levels.
const MAX_HEADING_OFFSET: u8 = 3;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the posts directory.
    pub input: Option<PathBuf>,
    /// Override the output directory.
    pub output: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    blog: BlogConfigRaw,
    /// Rendering options.
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    plugins: PluginsConfigRaw,

    /// Resolved blog configuration (set after loading).
    #[serde(skip)]
    pub blog_resolved: BlogConfig,
    /// Resolved plugin configuration (set after loading).
    #[serde(skip)]
    pub plugins_resolved: PluginsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw blog configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct BlogConfigRaw {
    title: String,
    domain: Option<String>,
    input: Option<String>,
    output: Option<String>,
}

/// Resolved blog configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BlogConfig {
    pub title: String,
    /// Public URL of the blog, without trailing slash.
    pub domain: Option<String>,
    /// Directory searched for `.post` files.
    pub input: PathBuf,
    /// Directory the site is written to.
    pub output: PathBuf,
}

/// Caption terminator setting.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionSetting {
    #[default]
    HtmlBreak,
    HardBreak,
    None,
}

impl From<CaptionSetting> for CaptionMode {
    fn from(setting: CaptionSetting) -> Self {
        match setting {
            CaptionSetting::HtmlBreak => Self::HtmlBreak,
            CaptionSetting::HardBreak => Self::HardBreak,
            CaptionSetting::None => Self::Disabled,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Added to every heading level.
    pub heading_offset: u8,
    /// Image caption terminator.
    pub caption: CaptionSetting,
    /// Smart quotes and dashes.
    pub typographer: bool,
    /// GFM tables.
    pub tables: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heading_offset: 1,
            caption: CaptionSetting::default(),
            typographer: true,
            tables: true,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions {
            tables: self.tables,
            typographer: self.typographer,
        }
    }

    #[must_use]
    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            caption: self.caption.into(),
        }
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            heading_offset: self.heading_offset,
        }
    }
}

/// Raw plugin configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct PluginsConfigRaw {
    assets_dir: Option<String>,
}

/// Resolved plugin configuration.
#[derive(Debug, Default)]
pub struct PluginsConfig {
    /// Root of plugin assets, laid out as `<assets_dir>/<plugin>/<path>`.
    pub assets_dir: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`blog.domain`").
        field: String,
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `biber.toml` in the current directory and its parents.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => {
                let cwd = std::env::current_dir()?;
                Self::discover_from(&cwd).ok_or_else(|| ConfigError::NotFound(cwd.join(CONFIG_FILENAME)))?
            }
        };

        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(input) = &settings.input {
            self.blog_resolved.input.clone_from(input);
        }
        if let Some(output) = &settings.output {
            self.blog_resolved.output.clone_from(output);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.blog_resolved.title, "blog.title")?;
        if let Some(domain) = &self.blog_resolved.domain {
            require_non_empty(domain, "blog.domain")?;
            require_http_url(domain, "blog.domain")?;
        }
        if self.render.heading_offset > MAX_HEADING_OFFSET {
            return Err(ConfigError::Validation(format!(
                "render.heading_offset cannot exceed {MAX_HEADING_OFFSET}"
            )));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let blog = &mut self.blog;
        blog.title = Expansion::Text.apply(&blog.title, "blog.title")?;
        expand_field(&mut blog.domain, Expansion::Text, "blog.domain")?;
        expand_field(&mut blog.input, Expansion::Path, "blog.input")?;
        expand_field(&mut blog.output, Expansion::Path, "blog.output")?;
        expand_field(&mut self.plugins.assets_dir, Expansion::Path, "plugins.assets_dir")
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.blog_resolved = BlogConfig {
            title: self.blog.title.trim().to_owned(),
            domain: self
                .blog
                .domain
                .as_deref()
                .map(|domain| domain.trim_end_matches('/').to_owned()),
            input: resolve(self.blog.input.as_deref(), "posts"),
            output: resolve(self.blog.output.as_deref(), "public"),
        };
        self.plugins_resolved = PluginsConfig {
            assets_dir: self.plugins.assets_dir.as_deref().map(|dir| config_dir.join(dir)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        Config::from_toml(toml, Path::new("/blog"))
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse("[blog]\ntitle = \"Notes\"\n").unwrap();
        assert_eq!(config.blog_resolved.title, "Notes");
        assert_eq!(config.blog_resolved.domain, None);
        assert_eq!(config.blog_resolved.input, PathBuf::from("/blog/posts"));
        assert_eq!(config.blog_resolved.output, PathBuf::from("/blog/public"));
        assert_eq!(config.render.heading_offset, 1);
        assert_eq!(config.render.caption, CaptionSetting::HtmlBreak);
        assert!(config.render.typographer);
        assert!(config.render.tables);
        assert_eq!(config.plugins_resolved.assets_dir, None);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[blog]
title = "Notes"
domain = "https://notes.example.com/"
input = "content"
output = "/srv/www"

[render]
heading_offset = 0
caption = "hard-break"
typographer = false
tables = false

[plugins]
assets_dir = "assets"
"#;
        let config = parse(toml).unwrap();
        assert_eq!(
            config.blog_resolved.domain.as_deref(),
            Some("https://notes.example.com")
        );
        assert_eq!(config.blog_resolved.input, PathBuf::from("/blog/content"));
        assert_eq!(config.blog_resolved.output, PathBuf::from("/srv/www"));
        assert_eq!(
            config.plugins_resolved.assets_dir,
            Some(PathBuf::from("/blog/assets"))
        );
        assert_eq!(config.render.markdown_options(), MarkdownOptions {
            tables: false,
            typographer: false,
        });
        assert_eq!(config.render.builder_options().caption, CaptionMode::HardBreak);
        assert_eq!(config.render.render_options().heading_offset, 0);
    }

    #[test]
    fn test_caption_none_disables() {
        let config = parse("[blog]\ntitle = \"t\"\n[render]\ncaption = \"none\"\n").unwrap();
        assert_eq!(config.render.builder_options().caption, CaptionMode::Disabled);
    }

    #[test]
    fn test_missing_blog_section() {
        assert!(matches!(parse(""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_title() {
        let err = parse("[blog]\ntitle = \"  \"\n").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: blog.title cannot be empty");
    }

    #[test]
    fn test_invalid_domain() {
        let err = parse("[blog]\ntitle = \"t\"\ndomain = \"notes.example.com\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("blog.domain")));
    }

    #[test]
    fn test_heading_offset_bound() {
        let err = parse("[blog]\ntitle = \"t\"\n[render]\nheading_offset = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("heading_offset")));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse("[blog]\ntitle = \"t\"\nauthor = \"me\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_caption() {
        let err = parse("[blog]\ntitle = \"t\"\n[render]\ncaption = \"newline\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("posts/2024");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[blog]\ntitle = \"Notes\"\n").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path.clone()));

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.blog_resolved.input, dir.path().join("posts"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing), None),
            Err(ConfigError::NotFound(path)) if path == missing
        ));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[blog]\ntitle = \"Notes\"\n").unwrap();

        let settings = CliSettings {
            input: None,
            output: Some(PathBuf::from("/tmp/site")),
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.blog_resolved.output, PathBuf::from("/tmp/site"));
        assert_eq!(config.blog_resolved.input, dir.path().join("posts"));
    }
}
