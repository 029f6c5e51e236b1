//! Plugin argument parsing.
//!
//! A code fence info string has the form `name key=value key=value`. Values are
//! separated by a single space; a literal space inside a value is written as
//! `\ ` and a literal backslash as `\\`.

use crate::element::PluginArgs;
use crate::error::ParseError;

/// Separator between plugin arguments.
const ARG_SEPARATOR: char = ' ';

/// Invalid backslash sequence in an escaped list.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EscapeError {
    #[error("Invalid backslash at end of input")]
    DanglingBackslash,
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
}

/// Split `input` on `sep`, honoring backslash escapes.
///
/// A backslash may precede `sep`, another backslash, or any character in
/// `extra`; the escaped character is taken literally. Leading and trailing
/// whitespace of each piece is dropped, so runs of a whitespace separator
/// collapse.
///
/// # Examples
///
/// ```
/// use biber_renderer::split_escaped;
///
/// let parts = split_escaped(r"a\,b, c", ',', &[]).unwrap();
/// assert_eq!(parts, vec!["a,b", "c"]);
/// ```
pub fn split_escaped(input: &str, sep: char, extra: &[char]) -> Result<Vec<String>, EscapeError> {
    let mut pieces = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        let mut piece = String::new();
        let mut chars = rest.char_indices();
        let mut consumed = rest.len();

        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                let (_, escaped) = chars.next().ok_or(EscapeError::DanglingBackslash)?;
                if escaped != sep && escaped != '\\' && !extra.contains(&escaped) {
                    return Err(EscapeError::InvalidEscape(escaped));
                }
                piece.push(escaped);
            } else if c == sep {
                consumed = i + c.len_utf8();
                break;
            } else {
                piece.push(c);
            }
        }

        pieces.push(piece);
        rest = rest[consumed..].trim();
    }

    Ok(pieces)
}

/// Split a fence info string into the plugin name and its raw argument string.
///
/// Returns `None` for an empty info string.
pub(crate) fn split_info(info: &str) -> Option<(&str, Option<&str>)> {
    let info = info.trim();
    if info.is_empty() {
        return None;
    }
    match info.split_once(char::is_whitespace) {
        Some((name, args)) => {
            let args = args.trim_start();
            Some((name, (!args.is_empty()).then_some(args)))
        }
        None => Some((info, None)),
    }
}

/// Parse a plugin argument string into a key/value mapping.
///
/// Later duplicates override earlier ones.
pub fn parse_plugin_args(argstring: &str) -> Result<PluginArgs, ParseError> {
    let pieces = split_escaped(argstring, ARG_SEPARATOR, &[])
        .map_err(|e| ParseError::PluginArguments(e.to_string()))?;

    let mut args = PluginArgs::new();
    for piece in pieces {
        let Some((key, value)) = piece.split_once('=') else {
            return Err(ParseError::PluginArguments(format!(
                "expected key=value, got '{piece}'"
            )));
        };
        if key.is_empty() {
            return Err(ParseError::PluginArguments(format!(
                "missing argument name in '{piece}'"
            )));
        }
        args.insert(key.to_owned(), value.to_owned());
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_escaped_plain() {
        let parts = split_escaped("a b  c", ' ', &[]).unwrap();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_escaped_escaped_separator() {
        let parts = split_escaped(r"title=Hello\ World lang=en", ' ', &[]).unwrap();
        assert_eq!(parts, vec!["title=Hello World", "lang=en"]);
    }

    #[test]
    fn test_split_escaped_escaped_backslash() {
        let parts = split_escaped(r"path=C:\\dir", ' ', &[]).unwrap();
        assert_eq!(parts, vec![r"path=C:\dir"]);
    }

    #[test]
    fn test_split_escaped_whitelisted_extra() {
        let parts = split_escaped(r"a\|b", ',', &['|']).unwrap();
        assert_eq!(parts, vec!["a|b"]);
    }

    #[test]
    fn test_split_escaped_invalid_escape() {
        assert_eq!(
            split_escaped(r"a\nb", ' ', &[]),
            Err(EscapeError::InvalidEscape('n'))
        );
    }

    #[test]
    fn test_split_escaped_dangling_backslash() {
        assert_eq!(
            split_escaped("abc\\", ' ', &[]),
            Err(EscapeError::DanglingBackslash)
        );
    }

    #[test]
    fn test_split_escaped_empty() {
        assert!(split_escaped("   ", ',', &[]).unwrap().is_empty());
    }

    #[test]
    fn test_split_escaped_unicode() {
        let parts = split_escaped("größe, 名前", ',', &[]).unwrap();
        assert_eq!(parts, vec!["größe", "名前"]);
    }

    #[test]
    fn test_split_info_name_only() {
        assert_eq!(split_info("code"), Some(("code", None)));
        assert_eq!(split_info("  "), None);
    }

    #[test]
    fn test_split_info_with_args() {
        assert_eq!(
            split_info("code   language=python"),
            Some(("code", Some("language=python")))
        );
        assert_eq!(split_info("latex\tinline=true"), Some(("latex", Some("inline=true"))));
    }

    #[test]
    fn test_parse_plugin_args() {
        let args = parse_plugin_args(r"language=python title=a\ b empty=").unwrap();
        assert_eq!(args.get("language").map(String::as_str), Some("python"));
        assert_eq!(args.get("title").map(String::as_str), Some("a b"));
        assert_eq!(args.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_plugin_args_value_keeps_equals() {
        let args = parse_plugin_args("expr=a=b").unwrap();
        assert_eq!(args.get("expr").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_parse_plugin_args_missing_equals() {
        let err = parse_plugin_args("language").unwrap_err();
        assert!(matches!(err, ParseError::PluginArguments(_)));
    }

    #[test]
    fn test_parse_plugin_args_empty_key() {
        assert!(parse_plugin_args("=x").is_err());
    }

    #[test]
    fn test_parse_plugin_args_bad_escape() {
        let err = parse_plugin_args(r"a=\x").unwrap_err();
        assert_eq!(
            err,
            ParseError::PluginArguments("Invalid escape sequence '\\x'".to_owned())
        );
    }
}
