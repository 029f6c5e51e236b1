//! `latex` plugin: math rendered by `MathJax` in the browser.

use biber_renderer::{Plugin, PluginArgs, PluginAssets, PluginError, PluginOutput, escape_html};

use crate::flag;

/// Scripts loaded on pages with math, in load order.
const SCRIPTS: &[&str] = &["custom.js", "polyfill.min.js", "tex-mml-chtml.js"];

const STYLESHEETS: &[&str] = &["custom.css"];

/// Fonts fetched by `MathJax` at runtime.
const FILES: &[&str] = &[
    "output/chtml/fonts/woff-v2/MathJax_Zero.woff",
    "output/chtml/fonts/woff-v2/MathJax_Math-Italic.woff",
    "output/chtml/fonts/woff-v2/MathJax_Main-Regular.woff",
    "output/chtml/fonts/woff-v2/MathJax_Size2-Regular.woff",
];

/// Display or inline math.
///
/// `inline=true` renders `$...$` inside running text; the default is a
/// display block delimited by `$$`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatexPlugin;

impl Plugin for LatexPlugin {
    fn name(&self) -> &str {
        "latex"
    }

    fn generate(&self, content: &str, args: &PluginArgs) -> Result<PluginOutput, PluginError> {
        let math = escape_html(content.trim());
        if math.is_empty() {
            return Err(PluginError::Content("empty formula".to_owned()));
        }
        let html = if flag(args, "inline")? {
            format!(r#"<span class="plugin-latex-inline">${math}$</span>"#)
        } else {
            format!(r#"<span class="plugin-latex">$${math}$$</span>"#)
        };
        Ok(PluginOutput::Html(html))
    }

    fn assets(&self) -> PluginAssets {
        PluginAssets {
            scripts: owned(SCRIPTS),
            stylesheets: owned(STYLESHEETS),
            files: owned(FILES),
        }
    }
}

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|path| (*path).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(content: &str, args: &[(&str, &str)]) -> Result<String, PluginError> {
        let args = args
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        LatexPlugin.generate(content, &args).map(PluginOutput::into_html)
    }

    #[test]
    fn test_display_math() {
        assert_eq!(
            generate("\ne^{i\\pi} + 1 = 0\n", &[]).unwrap(),
            r#"<span class="plugin-latex">$$e^{i\pi} + 1 = 0$$</span>"#
        );
    }

    #[test]
    fn test_inline_math() {
        assert_eq!(
            generate("a < b", &[("inline", "true")]).unwrap(),
            r#"<span class="plugin-latex-inline">$a &lt; b$</span>"#
        );
    }

    #[test]
    fn test_invalid_inline_flag() {
        assert!(matches!(
            generate("x", &[("inline", "sometimes")]),
            Err(PluginError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_empty_formula() {
        assert!(matches!(generate("  \n", &[]), Err(PluginError::Content(_))));
    }

    #[test]
    fn test_assets() {
        let assets = LatexPlugin.assets();
        assert_eq!(assets.scripts.len(), 3);
        assert_eq!(assets.stylesheets, vec!["custom.css"]);
        assert!(assets.files.iter().all(|f| f.ends_with(".woff")));
    }
}
