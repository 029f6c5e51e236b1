//! Error types for tree building and rendering.
//!
//! Both are fatal to the document being processed; callers report them with
//! the document path and move on to the next document.

use crate::plugin::PluginError;
use crate::token::TagKind;

/// Malformed or unsupported source structure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// End of stream reached while a container was still open.
    #[error("Unclosed {0}")]
    Unclosed(TagKind),

    /// A close event without a matching open.
    #[error("Unexpected {0} close")]
    UnexpectedClose(TagKind),

    /// A token that is not allowed inside the given construct.
    #[error("Unexpected markdown element in {context}: {found}")]
    Unexpected { context: TagKind, found: String },

    /// A list item, table part or cell outside its parent construct.
    #[error("Misplaced {0} outside its container")]
    Misplaced(TagKind),

    /// A token kind the document model has no element for.
    #[error("Unknown markdown element: {0}")]
    Unsupported(String),

    /// Heading deeper than level 3.
    #[error("Only heading levels 1 - 3 are supported, got {0}")]
    HeadingLevel(u8),

    /// Emphasis nested deeper than strength 2.
    #[error("Emphasis nested too deeply (strength {0})")]
    EmphasisStrength(u8),

    /// A heading, strong or emphasis run without any content.
    #[error("Empty {0}")]
    Empty(TagKind),

    /// More than one header row, or a header after body rows.
    #[error("Invalid table head: {0}")]
    TableHead(&'static str),

    /// Plugin argument string could not be parsed.
    #[error("Invalid plugin arguments: {0}")]
    PluginArguments(String),

    /// Container nesting exceeds the builder's depth limit.
    #[error("Document nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Failure while turning an element tree into HTML.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A plugin invocation names a plugin that is not registered.
    #[error("Unknown plugin '{0}'")]
    UnknownPlugin(String),

    /// A plugin rejected its input.
    #[error("Plugin '{name}' failed: {source}")]
    Plugin {
        name: String,
        #[source]
        source: PluginError,
    },

    /// Heading level plus offset falls outside `<h1>`-`<h6>`.
    #[error("Heading level {level} with offset {offset} is outside h1-h6")]
    HeadingOverflow { level: u8, offset: u8 },

    /// Element not allowed in the current rendering context.
    #[error("Unsupported element in {context}: {element}")]
    Unsupported {
        context: &'static str,
        element: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_construct() {
        assert_eq!(ParseError::Unclosed(TagKind::Quote).to_string(), "Unclosed blockquote");
        assert_eq!(
            ParseError::Unexpected {
                context: TagKind::TableRow,
                found: "text".to_owned()
            }
            .to_string(),
            "Unexpected markdown element in table row: text"
        );
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::UnknownPlugin("chart".to_owned());
        assert_eq!(err.to_string(), "Unknown plugin 'chart'");

        let err = RenderError::Plugin {
            name: "code".to_owned(),
            source: PluginError::MissingArgument("language".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "Plugin 'code' failed: Missing required argument 'language'"
        );
    }
}
