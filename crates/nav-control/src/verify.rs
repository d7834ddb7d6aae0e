//! Post-load landing verification.

use url::Url;

use crate::errors::NavError;

const BLANK_SENTINEL: &str = "about:blank";

/// Check that the page the engine ended up on actually serves the
/// requested host. The blank sentinel page is always rejected; otherwise
/// the actual host (leading `www.` stripped) must contain the requested
/// host (same stripping) as a substring, so `github.com` may land on
/// `www.github.com` or a regional subdomain.
pub fn verify_landed(requested: &str, actual: &str) -> Result<(), NavError> {
    if actual.is_empty() || actual == BLANK_SENTINEL {
        return Err(NavError::BlankPage);
    }

    let requested_host = stripped_host(requested)
        .ok_or_else(|| NavError::InvalidUrl(requested.to_string()))?;
    let actual_host = stripped_host(actual).ok_or_else(|| NavError::DomainMismatch {
        requested: requested.to_string(),
        actual: actual.to_string(),
    })?;

    if actual_host.contains(&requested_host) {
        Ok(())
    } else {
        Err(NavError::DomainMismatch {
            requested: requested.to_string(),
            actual: actual.to_string(),
        })
    }
}

fn stripped_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_www_canonicalization_is_accepted() {
        assert!(verify_landed("https://github.com", "https://www.github.com/").is_ok());
        assert!(verify_landed("https://www.github.com", "https://github.com/").is_ok());
    }

    #[test]
    fn test_subdomain_landing_is_accepted() {
        assert!(verify_landed("https://example.com", "https://docs.example.com/intro").is_ok());
    }

    #[test]
    fn test_blank_page_is_always_rejected() {
        assert_eq!(
            verify_landed("https://github.com", "about:blank"),
            Err(NavError::BlankPage)
        );
        assert_eq!(
            verify_landed("https://github.com", ""),
            Err(NavError::BlankPage)
        );
    }

    #[test]
    fn test_foreign_host_is_rejected() {
        assert!(matches!(
            verify_landed("https://github.com", "https://login.example.net/"),
            Err(NavError::DomainMismatch { .. })
        ));
    }
}
