//! `comment` plugin: notes for the author that never show on the page.

use biber_renderer::{Plugin, PluginArgs, PluginError, PluginOutput, escape_html};

use crate::flag;

/// Drops its content, or keeps it as an HTML comment with `in-html=true`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommentPlugin;

impl Plugin for CommentPlugin {
    fn name(&self) -> &str {
        "comment"
    }

    fn generate(&self, content: &str, args: &PluginArgs) -> Result<PluginOutput, PluginError> {
        if !flag(args, "in-html")? {
            return Ok(PluginOutput::Fragments(Vec::new()));
        }
        Ok(PluginOutput::Fragments(vec![format!(
            "<!-- {} -->",
            escape_html(content)
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        let output = CommentPlugin.generate("secret", &PluginArgs::new()).unwrap();
        assert_eq!(output.into_html(), "");
    }

    #[test]
    fn test_in_html() {
        let args = PluginArgs::from([("in-html".to_owned(), "True".to_owned())]);
        let output = CommentPlugin.generate("a --> b", &args).unwrap();
        assert_eq!(output.into_html(), "<!-- a --&gt; b -->");
    }
}
