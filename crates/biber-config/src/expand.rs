//! `${VAR}` and `~` expansion for configuration values.

use std::borrow::Cow;
use std::env::VarError;

use crate::ConfigError;

/// What a configuration value may refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// Free text: `${VAR}` and `${VAR:-default}` only.
    Text,
    /// A filesystem path: variables plus a leading `~`.
    Path,
}

impl Expansion {
    /// Expand `value` against the process environment.
    ///
    /// Values without `${` keep every `$` literal.
    pub(crate) fn apply(self, value: &str, field: &str) -> Result<String, ConfigError> {
        self.apply_with(value, field, |var| std::env::var(var))
    }

    fn apply_with<F>(self, value: &str, field: &str, mut lookup: F) -> Result<String, ConfigError>
    where
        F: FnMut(&str) -> Result<String, VarError>,
    {
        let context = |var: &str| lookup(var).map(Some);
        let expanded = match self {
            Self::Text if !value.contains("${") => return Ok(value.to_owned()),
            Self::Path if !value.contains("${") => {
                return Ok(shellexpand::tilde_with_context(value, home_dir).into_owned());
            }
            Self::Text => shellexpand::env_with_context(value, context),
            Self::Path => shellexpand::full_with_context(value, home_dir, context),
        };
        expanded
            .map(Cow::into_owned)
            .map_err(|e| ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}}: {}", e.var_name, e.cause),
            })
    }
}

fn home_dir() -> Option<String> {
    std::env::var("HOME").ok()
}

/// Expand an optional field in place.
pub(crate) fn expand_field(
    value: &mut Option<String>,
    expansion: Expansion,
    field: &str,
) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expansion.apply(raw, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(var: &str) -> Result<String, VarError> {
        match var {
            "BLOG_ROOT" => Ok("/srv/blog".to_owned()),
            _ => Err(VarError::NotPresent),
        }
    }

    #[test]
    fn test_variable_in_path() {
        let result = Expansion::Path
            .apply_with("${BLOG_ROOT}/posts", "blog.input", env)
            .unwrap();
        assert_eq!(result, "/srv/blog/posts");
    }

    #[test]
    fn test_default_when_unset() {
        let result = Expansion::Path
            .apply_with("${OUT_DIR:-public}", "blog.output", env)
            .unwrap();
        assert_eq!(result, "public");
    }

    #[test]
    fn test_missing_variable_names_field() {
        let err = Expansion::Text
            .apply_with("https://${HOST}", "blog.domain", env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "blog.domain"));
        assert!(err.to_string().contains("${HOST}"));
    }

    #[test]
    fn test_literal_dollar_unchanged() {
        assert_eq!(
            Expansion::Text.apply_with("Costs $5", "blog.title", env).unwrap(),
            "Costs $5"
        );
    }

    #[test]
    fn test_tilde_only_in_paths() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(
            Expansion::Path.apply_with("~/blog", "blog.input", env).unwrap(),
            format!("{home}/blog")
        );
        assert_eq!(
            Expansion::Text.apply_with("~/blog", "blog.title", env).unwrap(),
            "~/blog"
        );
    }

    #[test]
    fn test_expand_field_skips_none() {
        let mut unset = None;
        expand_field(&mut unset, Expansion::Path, "blog.input").unwrap();
        assert_eq!(unset, None);

        let mut set = Some("posts".to_owned());
        expand_field(&mut set, Expansion::Path, "blog.input").unwrap();
        assert_eq!(set.as_deref(), Some("posts"));
    }
}
