//! Built-in `code` plugin.
//!
//! Renders a syntax-highlighting-ready code block. Highlighting itself happens
//! client side, keyed on the `language-*` class.
//!
//! | Argument | Values | Effect |
//! |---|---|---|
//! | `language` | any, required | `class="language-{language}"` |
//! | `line-numbers` | `true` / `false` | adds the `line-numbers` class |
//! | `line-start` | positive integer | `data-start` attribute |

use std::num::NonZeroU32;

use crate::element::PluginArgs;
use crate::plugin::{Plugin, PluginError, PluginOutput};
use crate::util::escape_html;

/// Name the built-in code plugin answers to.
pub const CODE_PLUGIN: &str = "code";

/// The built-in code block plugin.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodePlugin;

impl Plugin for CodePlugin {
    fn name(&self) -> &str {
        CODE_PLUGIN
    }

    fn generate(&self, content: &str, args: &PluginArgs) -> Result<PluginOutput, PluginError> {
        let language = args
            .get("language")
            .filter(|language| !language.is_empty())
            .ok_or_else(|| PluginError::MissingArgument("language".to_owned()))?;

        let line_numbers = match args.get("line-numbers").map(String::as_str) {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(PluginError::invalid("line-numbers", other, "expected true or false"));
            }
        };

        let line_start = args
            .get("line-start")
            .map(|value| {
                value
                    .parse::<NonZeroU32>()
                    .map_err(|_| PluginError::invalid("line-start", value, "expected a positive integer"))
            })
            .transpose()?;

        let mut class = format!("language-{}", escape_html(language));
        if line_numbers {
            class.push_str(" line-numbers");
        }
        let start = line_start.map_or_else(String::new, |n| format!(r#" data-start="{n}""#));

        Ok(PluginOutput::Html(format!(
            r#"<pre><code class="{class}"{start}>{}</code></pre>"#,
            escape_html(content)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> PluginArgs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn generate(content: &str, pairs: &[(&str, &str)]) -> Result<String, PluginError> {
        CodePlugin.generate(content, &args(pairs)).map(PluginOutput::into_html)
    }

    #[test]
    fn test_language_only() {
        assert_eq!(
            generate("print(1)", &[("language", "python")]).unwrap(),
            r#"<pre><code class="language-python">print(1)</code></pre>"#
        );
    }

    #[test]
    fn test_content_escaped() {
        assert_eq!(
            generate("a < b && c", &[("language", "rust")]).unwrap(),
            r#"<pre><code class="language-rust">a &lt; b &amp;&amp; c</code></pre>"#
        );
    }

    #[test]
    fn test_line_numbers_and_start() {
        assert_eq!(
            generate(
                "x",
                &[("language", "c"), ("line-numbers", "true"), ("line-start", "10")]
            )
            .unwrap(),
            r#"<pre><code class="language-c line-numbers" data-start="10">x</code></pre>"#
        );
    }

    #[test]
    fn test_line_numbers_false() {
        assert_eq!(
            generate("x", &[("language", "c"), ("line-numbers", "false")]).unwrap(),
            r#"<pre><code class="language-c">x</code></pre>"#
        );
    }

    #[test]
    fn test_missing_language() {
        assert_eq!(
            generate("x", &[]),
            Err(PluginError::MissingArgument("language".to_owned()))
        );
        assert_eq!(
            generate("x", &[("language", "")]),
            Err(PluginError::MissingArgument("language".to_owned()))
        );
    }

    #[test]
    fn test_invalid_line_start() {
        for value in ["abc", "0", "-3", ""] {
            let err = generate("x", &[("language", "c"), ("line-start", value)]).unwrap_err();
            assert!(
                matches!(err, PluginError::InvalidArgument { ref name, .. } if name == "line-start"),
                "{value}: {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_line_numbers() {
        let err = generate("x", &[("language", "c"), ("line-numbers", "yes")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'yes' for argument 'line-numbers': expected true or false"
        );
    }
}
