//! Plugin capability for code fences tagged with a name.
//!
//! A code fence such as
//!
//! ````text
//! ```latex inline=true
//! e^{i\pi} + 1 = 0
//! ```
//! ````
//!
//! becomes a [`PluginInvocation`](crate::PluginInvocation) at build time. At
//! render time the renderer looks the name up through [`PluginLookup`] and
//! inserts whatever HTML the plugin returns verbatim. Plugins are trusted to
//! escape their own output.
//!
//! # Example
//!
//! ```
//! use biber_renderer::{Plugin, PluginArgs, PluginError, PluginOutput, PluginRegistry};
//!
//! struct Shout;
//!
//! impl Plugin for Shout {
//!     fn name(&self) -> &str { "shout" }
//!
//!     fn generate(&self, content: &str, _args: &PluginArgs) -> Result<PluginOutput, PluginError> {
//!         Ok(PluginOutput::Html(format!("<strong>{}</strong>", content.to_uppercase())))
//!     }
//! }
//!
//! let registry = PluginRegistry::new().with_plugin(Shout);
//! assert!(registry.contains("shout"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::element::PluginArgs;

/// HTML produced by a plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PluginOutput {
    /// A single fragment.
    Html(String),
    /// Several fragments, concatenated in order. May be empty.
    Fragments(Vec<String>),
    /// A fragment that references local image files, which the caller must
    /// copy next to the page like any other post image.
    Document {
        html: String,
        images: BTreeSet<String>,
    },
}

impl PluginOutput {
    /// Concatenate the output into one fragment.
    #[must_use]
    pub fn into_html(self) -> String {
        self.into_parts().0
    }

    /// Split the output into its HTML and the image files it references.
    #[must_use]
    pub fn into_parts(self) -> (String, BTreeSet<String>) {
        match self {
            Self::Html(html) => (html, BTreeSet::new()),
            Self::Fragments(parts) => (parts.concat(), BTreeSet::new()),
            Self::Document { html, images } => (html, images),
        }
    }
}

/// Files a plugin needs copied next to every page that invokes it.
///
/// Paths are relative to the plugin's asset directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginAssets {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub files: Vec<String>,
}

impl PluginAssets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.stylesheets.is_empty() && self.files.is_empty()
    }

    /// Iterate over every declared path.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.scripts
            .iter()
            .chain(&self.stylesheets)
            .chain(&self.files)
            .map(String::as_str)
    }
}

/// Error reported by a plugin.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Invalid value '{value}' for argument '{name}': {reason}")]
    InvalidArgument {
        name: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Content(String),
}

impl PluginError {
    pub fn invalid(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A named content generator.
pub trait Plugin: Send + Sync {
    /// Name used in code fence info strings.
    fn name(&self) -> &str;

    /// Turn the raw fence content into HTML.
    fn generate(&self, content: &str, args: &PluginArgs) -> Result<PluginOutput, PluginError>;

    /// Assets to copy alongside pages using this plugin.
    fn assets(&self) -> PluginAssets {
        PluginAssets::default()
    }
}

/// Name-based plugin lookup consulted by the renderer.
pub trait PluginLookup {
    fn lookup(&self, name: &str) -> Option<&dyn Plugin>;
}

/// Registry of plugins keyed by name.
///
/// Plugins are reference-counted so one registry can be shared across threads
/// rendering different documents.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, replacing any plugin with the same name.
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) {
        let name = plugin.name().to_owned();
        if self.plugins.insert(name.clone(), Arc::new(plugin)).is_some() {
            tracing::debug!(plugin = %name, "Replaced registered plugin");
        }
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.register(plugin);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Assets declared by each of the given plugins that are registered.
    pub fn assets_for<'a>(
        &'a self,
        names: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = (&'a str, PluginAssets)> + 'a {
        names.iter().filter_map(|name| {
            self.plugins
                .get(name)
                .map(|plugin| (name.as_str(), plugin.assets()))
        })
    }
}

impl PluginLookup for PluginRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|plugin| &**plugin)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Plugin for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn generate(&self, content: &str, _args: &PluginArgs) -> Result<PluginOutput, PluginError> {
            Ok(PluginOutput::Html(content.to_owned()))
        }

        fn assets(&self) -> PluginAssets {
            PluginAssets {
                scripts: vec!["echo.js".to_owned()],
                stylesheets: vec!["echo.css".to_owned()],
                files: Vec::new(),
            }
        }
    }

    struct Silent;

    impl Plugin for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn generate(&self, _content: &str, _args: &PluginArgs) -> Result<PluginOutput, PluginError> {
            Ok(PluginOutput::Fragments(Vec::new()))
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = PluginRegistry::new().with_plugin(Echo);
        assert!(registry.lookup("echo").is_some());
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = PluginRegistry::new().with_plugin(Silent).with_plugin(Echo);
        assert_eq!(registry.names(), vec!["echo", "silent"]);
    }

    #[test]
    fn test_assets_for_referenced_only() {
        let registry = PluginRegistry::new().with_plugin(Echo).with_plugin(Silent);
        let used = BTreeSet::from(["echo".to_owned(), "unknown".to_owned()]);
        let assets: Vec<_> = registry.assets_for(&used).collect();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].0, "echo");
        assert_eq!(assets[0].1.all().collect::<Vec<_>>(), vec!["echo.js", "echo.css"]);
    }

    #[test]
    fn test_output_into_html() {
        assert_eq!(PluginOutput::Html("<p>".to_owned()).into_html(), "<p>");
        assert_eq!(
            PluginOutput::Fragments(vec!["a".to_owned(), "b".to_owned()]).into_html(),
            "ab"
        );
        assert_eq!(PluginOutput::Fragments(Vec::new()).into_html(), "");
    }

    #[test]
    fn test_default_assets_empty() {
        assert!(Silent.assets().is_empty());
    }
}
