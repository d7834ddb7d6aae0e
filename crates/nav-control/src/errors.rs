//! Navigation failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("navigation target is empty")]
    EmptyUrl,

    #[error("not a parseable URL: {0}")]
    InvalidUrl(String),

    #[error("URL has no host component: {0}")]
    NoHost(String),

    #[error("page load timed out")]
    LoadTimeout,

    #[error("engine reported load failure")]
    LoadFailed,

    #[error("landed on a blank page")]
    BlankPage,

    #[error("landed on {actual}, which does not serve {requested}")]
    DomainMismatch { requested: String, actual: String },
}

impl NavError {
    /// Whether another attempt could plausibly succeed. Malformed input
    /// fails the same way every time; load and verification failures are
    /// worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LoadTimeout | Self::LoadFailed | Self::BlankPage | Self::DomainMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(NavError::LoadTimeout.is_retryable());
        assert!(NavError::BlankPage.is_retryable());
        assert!(!NavError::EmptyUrl.is_retryable());
        assert!(!NavError::InvalidUrl("x".into()).is_retryable());
        assert!(!NavError::NoHost("https://".into()).is_retryable());
    }
}
