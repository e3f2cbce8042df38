//! Error types for the Acadmix PDF proxy

use thiserror::Error;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Error types that can occur while resolving and delivering a PDF
#[derive(Error, Debug, Clone)]
pub enum ProxyError {
    #[error("URL parameter is required")]
    MissingInput,

    #[error("Storage URL has no parseable object path: {0}")]
    MalformedSourceUrl(String),

    #[error("Candidate fetch failed for {url}: {reason}")]
    CandidateFailed { url: String, reason: String },

    #[error("PDF not found in storage after {attempts} attempts: {public_id}")]
    ResourceNotFound {
        public_id: String,
        original_url: String,
        attempts: usize,
    },

    #[error("Upstream returned {status} {status_text} for {url}")]
    UpstreamFailure {
        status: u16,
        status_text: String,
        url: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Network timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::InternalError(err.to_string())
    }
}

impl ProxyError {
    /// Determine if this error is recovered locally by the candidate loop
    ///
    /// Returns true for failures of a single candidate attempt: the pipeline
    /// records them and moves on to the next candidate. Returns false for
    /// terminal conditions that are surfaced to the caller:
    /// - missing or malformed input
    /// - candidate exhaustion
    /// - pass-through upstream failures
    /// - configuration and internal faults
    pub fn is_recoverable(&self) -> bool {
        match self {
            ProxyError::CandidateFailed { .. } => true,
            ProxyError::Timeout(_) => true,
            ProxyError::HttpError(_) => true,

            ProxyError::MissingInput => false,
            ProxyError::MalformedSourceUrl(_) => false,
            ProxyError::ResourceNotFound { .. } => false,
            ProxyError::UpstreamFailure { .. } => false,
            ProxyError::ConfigError(_) => false,
            ProxyError::InternalError(_) => false,
        }
    }

    /// Convert error to HTTP status code
    ///
    /// Maps terminal errors to the status the caller sees:
    /// - MissingInput: 400 Bad Request
    /// - ResourceNotFound: 404 Not Found
    /// - UpstreamFailure: the upstream's own status, passed through verbatim
    /// - Timeout: 504 Gateway Timeout
    /// - everything else: 500 / 502 depending on whose fault it is
    pub fn to_http_status(&self) -> u16 {
        match self {
            ProxyError::MissingInput => 400,
            ProxyError::ResourceNotFound { .. } => 404,

            // Pass through the upstream's own failure status
            ProxyError::UpstreamFailure { status, .. } => *status,

            ProxyError::Timeout(_) => 504,
            ProxyError::CandidateFailed { .. } => 502,
            ProxyError::HttpError(_) => 502,
            ProxyError::MalformedSourceUrl(_) => 502,

            ProxyError::ConfigError(_) => 500,
            ProxyError::InternalError(_) => 500,
        }
    }

    /// Create an UpstreamFailure from a status code and URL
    pub fn upstream_failure(status: u16, status_text: impl Into<String>, url: impl Into<String>) -> Self {
        ProxyError::UpstreamFailure {
            status,
            status_text: status_text.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_client_error() {
        assert_eq!(ProxyError::MissingInput.to_http_status(), 400);
        assert!(!ProxyError::MissingInput.is_recoverable());
    }

    #[test]
    fn test_not_found_status() {
        let err = ProxyError::ResourceNotFound {
            public_id: "acadmix/pdfs/abc123".to_string(),
            original_url: "https://res.cloudinary.com/demo/raw/upload/abc123.pdf".to_string(),
            attempts: 3,
        };
        assert_eq!(err.to_http_status(), 404);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_upstream_failure_passes_status_through() {
        let err = ProxyError::upstream_failure(403, "Forbidden", "https://example.com/files/report.pdf");
        assert_eq!(err.to_http_status(), 403);
    }

    #[test]
    fn test_candidate_failure_is_recoverable() {
        let err = ProxyError::CandidateFailed {
            url: "https://res.cloudinary.com/demo/raw/upload/abc123".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_http_status(), 502);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = ProxyError::Timeout("origin did not respond".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.to_http_status(), 504);
    }

    #[test]
    fn test_error_display() {
        let err = ProxyError::MissingInput;
        assert_eq!(err.to_string(), "URL parameter is required");
    }
}
