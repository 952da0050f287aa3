//! Environment variable expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset

use crate::ConfigError;

/// Expand `${...}` references in `value`. `field` names the setting in errors.
///
/// Values without `${` are returned unchanged, so a bare `$` is never touched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match std::env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(UnsetVar),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.var_name),
    })
}

/// Lookup failure for an unset variable.
struct UnsetVar;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("WR_TEST_CACHE_ROOT", "/var/cache");
        }
        let result = expand_env("${WR_TEST_CACHE_ROOT}/wr", "cache.dir").unwrap();
        assert_eq!(result, "/var/cache/wr");
        unsafe {
            std::env::remove_var("WR_TEST_CACHE_ROOT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("WR_TEST_UNSET_LOCALE");
        }
        let result = expand_env("${WR_TEST_UNSET_LOCALE:-en}", "render.default_locale").unwrap();
        assert_eq!(result, "en");
    }

    #[test]
    fn test_expand_unset_without_default_fails() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("WR_TEST_MISSING");
        }
        let err = expand_env("${WR_TEST_MISSING}", "cache.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("WR_TEST_MISSING"));
        assert!(err.to_string().contains("cache.dir"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env(".wr/cache", "cache.dir").unwrap(), ".wr/cache");
        assert_eq!(expand_env("$HOME/x", "cache.dir").unwrap(), "$HOME/x");
    }
}
