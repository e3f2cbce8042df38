//! Transient request/response values used by the resolver and the pipeline
//!
//! Nothing here is persisted. A [`Resolution`] is created per incoming
//! request and discarded once the pipeline finishes; [`CandidateAttempt`]s
//! are kept only long enough to build the exhaustion diagnostics.

use serde::Serialize;

/// Outcome of resolving one source URL into candidate retrieval URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The original source URL as supplied by the caller
    pub source_url: String,

    /// Ordered candidate URLs to attempt; always non-empty, order is significant
    pub candidates: Vec<String>,

    /// Derived base identifier (object path without version or extension)
    ///
    /// Present only when origin-specific resolution applied.
    pub public_id: Option<String>,

    /// Whether origin-specific resolution applied
    ///
    /// Drives error shaping on exhaustion: origin resolutions report 404
    /// with the identifier searched; pass-through fetches relay the
    /// upstream's own failure.
    pub origin: bool,
}

impl Resolution {
    /// Single-candidate pass-through of the source URL, untransformed
    pub fn passthrough(source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        Resolution {
            candidates: vec![source_url.clone()],
            source_url,
            public_id: None,
            origin: false,
        }
    }
}

/// Record of one failed candidate attempt, kept for diagnostics
#[derive(Debug, Clone)]
pub struct CandidateAttempt {
    /// The candidate URL that was tried
    pub url: String,
    /// HTTP status the origin answered with, if it answered at all
    pub status: Option<u16>,
    /// Network-level error description when no response was received
    pub error: Option<String>,
}

impl CandidateAttempt {
    /// Attempt that reached the origin but got a non-success status
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        CandidateAttempt {
            url: url.into(),
            status: Some(status),
            error: None,
        }
    }

    /// Attempt that failed before a response arrived
    pub fn network_error(url: impl Into<String>, error: impl Into<String>) -> Self {
        CandidateAttempt {
            url: url.into(),
            status: None,
            error: Some(error.into()),
        }
    }

    /// Short human-readable reason, used in logs
    pub fn reason(&self) -> String {
        match (self.status, &self.error) {
            (Some(status), _) => format!("HTTP {}", status),
            (None, Some(err)) => err.clone(),
            (None, None) => "unknown failure".to_string(),
        }
    }
}

/// Generic error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody { error: error.into() }
    }
}

/// 404 body when every storage-origin candidate failed
///
/// Carries enough context to identify what was searched, never internal
/// error objects or origin credentials.
#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: String,
    pub message: String,
    #[serde(rename = "publicId")]
    pub public_id: String,
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}

/// Failure body for pass-through fetches; the upstream status is relayed verbatim
#[derive(Debug, Serialize)]
pub struct UpstreamFailureBody {
    pub error: String,
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub url: String,
}

/// 500 body for unexpected internal faults
#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub error: String,
    pub message: String,
}
