//! Fetch and decode error types.

use thiserror::Error;

/// Result type for fetch gate operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure of a single fetch-and-decode attempt.
///
/// These never escape the worker: they terminate the task that raised them
/// and are reported through tracing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to decode image from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns the URL the failed attempt was for.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::Decode { url, .. } => url,
        }
    }

    /// Returns whether the resource could not be reached.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns whether the bytes were not a valid image.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let err = FetchError::network("https://example.com/a.png", "HTTP 404");
        assert!(err.is_network());
        assert!(!err.is_decode());
        assert_eq!(err.url(), "https://example.com/a.png");
        assert_eq!(
            err.to_string(),
            "network error fetching https://example.com/a.png: HTTP 404"
        );
    }

    #[test]
    fn test_decode_error_kind() {
        let err = FetchError::decode("u", "bad magic");
        assert!(err.is_decode());
        assert_eq!(err.url(), "u");
    }
}
