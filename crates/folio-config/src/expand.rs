//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Name of the variable that failed to resolve.
struct UnsetVar(String);

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Strings without `${` are returned unchanged, so a literal `$` in a value
/// that uses no braced references is never touched. `field` names the
/// configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(UnsetVar(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; tests share one process env.

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable is unique to this test
        unsafe {
            std::env::set_var("FOLIO_EXPAND_SET", "0.0.0.0");
        }
        assert_eq!(
            expand_env("${FOLIO_EXPAND_SET}", "server.host").unwrap(),
            "0.0.0.0"
        );
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        assert_eq!(
            expand_env("${FOLIO_EXPAND_NEVER_SET:-localhost}", "server.host").unwrap(),
            "localhost"
        );
    }

    #[test]
    fn test_expand_set_var_wins_over_default() {
        // SAFETY: variable is unique to this test
        unsafe {
            std::env::set_var("FOLIO_EXPAND_OVER_DEFAULT", "example.com");
        }
        assert_eq!(
            expand_env("${FOLIO_EXPAND_OVER_DEFAULT:-localhost}", "server.host").unwrap(),
            "example.com"
        );
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_OVER_DEFAULT");
        }
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: variable is unique to this test
        unsafe {
            std::env::set_var("FOLIO_EXPAND_SUFFIX", "internal");
        }
        assert_eq!(
            expand_env("docs.${FOLIO_EXPAND_SUFFIX}", "server.host").unwrap(),
            "docs.internal"
        );
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_SUFFIX");
        }
    }

    #[test]
    fn test_expand_unset_var_errors() {
        let err = expand_env("${FOLIO_EXPAND_MISSING}", "server.host").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("FOLIO_EXPAND_MISSING"));
        assert!(message.contains("server.host"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("127.0.0.1", "server.host").unwrap(), "127.0.0.1");
        assert_eq!(expand_env("$HOST", "server.host").unwrap(), "$HOST");
    }
}
