//! URL normalization.

use url::Url;

use crate::errors::NavError;

/// Turn free-form user input into a navigable URL: trim surrounding
/// whitespace and trailing punctuation, prefix `https://` when no scheme
/// is present, and require a parseable host.
pub fn normalize_url(input: &str) -> Result<String, NavError> {
    let trimmed = input.trim().trim_end_matches(['.', ',', ' ']);
    if trimmed.is_empty() {
        return Err(NavError::EmptyUrl);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|_| NavError::InvalidUrl(candidate.clone()))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(candidate),
        _ => Err(NavError::NoHost(candidate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_prefixes_scheme() {
        assert_eq!(
            normalize_url("  example.com.  ").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            normalize_url("example.com/docs, ").unwrap(),
            "https://example.com/docs"
        );
    }

    #[test]
    fn test_existing_scheme_is_kept() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn test_empty_and_hostless_inputs_fail() {
        assert_eq!(normalize_url("   "), Err(NavError::EmptyUrl));
        assert_eq!(normalize_url(" .,. "), Err(NavError::EmptyUrl));
        assert!(matches!(
            normalize_url("file:///etc/hosts"),
            Err(NavError::NoHost(_))
        ));
    }

    #[test]
    fn test_unparseable_input_fails() {
        assert!(matches!(
            normalize_url("https://exa mple.com"),
            Err(NavError::InvalidUrl(_))
        ));
    }
}
