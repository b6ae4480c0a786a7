//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(
            expand_env("https://kroki.io", "diagrams.kroki_url").unwrap(),
            "https://kroki.io"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        let value = expand_env(
            "${QUILL_TEST_SURELY_UNSET_VAR:-https://fallback.example}",
            "diagrams.kroki_url",
        )
        .unwrap();
        assert_eq!(value, "https://fallback.example");
    }

    #[test]
    fn test_unset_without_default_errors() {
        let err = expand_env("${QUILL_TEST_SURELY_UNSET_VAR}", "posts.author").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("posts.author"));
        assert!(msg.contains("QUILL_TEST_SURELY_UNSET_VAR"));
    }
}
