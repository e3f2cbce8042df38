//! Candidate URL resolution for storage-origin PDF references
//!
//! The storage origin's upload API does not reliably preserve the `.pdf`
//! extension when registering raw binary objects, so the URL stored in the
//! catalog may or may not match the identifier the object actually lives
//! under. The resolver turns one source URL into an ordered list of
//! candidate URLs, most-likely-to-succeed first:
//!
//! 1. `<origin>/raw/upload/<base identifier>` - the unsuffixed form the
//!    upload API registers for this object class
//! 2. `<origin>/raw/upload/<base identifier>.pdf` - the older suffixed
//!    convention
//! 3. the original URL, unmodified, in case the caller already had a
//!    working one
//!
//! Resolution is a pure string transformation: no network I/O, no hidden
//! state. Non-origin URLs pass through as a single candidate.

use crate::error::ProxyError;
use crate::models::Resolution;
use tracing::{debug, warn};

/// Path segment separating the origin prefix from the object path
const UPLOAD_SEGMENT: &str = "/upload/";

/// Resource-type segments the origin uses; all candidates are rewritten to `raw`
const RESOURCE_TYPES: [&str; 3] = ["/raw", "/image", "/video"];

/// Resolves source URLs into ordered candidate retrieval URLs
///
/// The origin hostname fragment is explicit configuration, not an
/// environment-read global.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    origin_marker: String,
}

impl UrlResolver {
    /// Create a resolver that recognizes origin URLs by hostname fragment
    pub fn new(origin_marker: impl Into<String>) -> Self {
        UrlResolver {
            origin_marker: origin_marker.into(),
        }
    }

    /// Resolve one source URL into an ordered, non-empty candidate sequence
    ///
    /// Deterministic and idempotent: the same input always yields the same
    /// candidates.
    ///
    /// # Behavior
    /// - URLs not containing the origin marker pass through untransformed
    ///   as a single candidate.
    /// - Origin URLs lacking an `/upload/` segment are malformed; they
    ///   degrade to pass-through rather than failing outright.
    /// - Otherwise the object path after `/upload/` is extracted, an
    ///   optional `v<digits>/` version segment and a trailing `.pdf` suffix
    ///   (case-insensitive) are stripped, and the three-candidate sequence
    ///   is built against the `raw` resource type.
    pub fn resolve(&self, source_url: &str) -> Resolution {
        if !source_url.contains(&self.origin_marker) {
            debug!("Non-origin URL, passing through: {}", source_url);
            return Resolution::passthrough(source_url);
        }

        let Some(upload_pos) = source_url.find(UPLOAD_SEGMENT) else {
            let err = ProxyError::MalformedSourceUrl(source_url.to_string());
            warn!("{}, degrading to pass-through", err);
            return Resolution::passthrough(source_url);
        };

        let prefix = &source_url[..upload_pos];
        let object_path = &source_url[upload_pos + UPLOAD_SEGMENT.len()..];

        let object_path = strip_version_segment(object_path);
        let base_id = strip_pdf_suffix(object_path);

        if base_id.is_empty() {
            let err = ProxyError::MalformedSourceUrl(source_url.to_string());
            warn!("{}, degrading to pass-through", err);
            return Resolution::passthrough(source_url);
        }

        // The source URL may reference any resource type; raw objects are
        // only addressable under /raw/upload/.
        let prefix = strip_resource_type(prefix);

        let candidates = vec![
            format!("{}/raw/upload/{}", prefix, base_id),
            format!("{}/raw/upload/{}.pdf", prefix, base_id),
            source_url.to_string(),
        ];

        debug!(
            "Resolved {} into {} candidates (public_id={})",
            source_url,
            candidates.len(),
            base_id
        );

        Resolution {
            source_url: source_url.to_string(),
            candidates,
            public_id: Some(base_id.to_string()),
            origin: true,
        }
    }
}

/// Strip a leading `v<digits>/` version segment from an object path
fn strip_version_segment(path: &str) -> &str {
    if let Some(rest) = path.strip_prefix('v') {
        if let Some(slash) = rest.find('/') {
            if slash > 0 && rest[..slash].bytes().all(|b| b.is_ascii_digit()) {
                return &rest[slash + 1..];
            }
        }
    }
    path
}

/// Strip a trailing `.pdf` suffix, case-insensitively
fn strip_pdf_suffix(path: &str) -> &str {
    let len = path.len();
    if len >= 4 && path[len - 4..].eq_ignore_ascii_case(".pdf") {
        &path[..len - 4]
    } else {
        path
    }
}

/// Strip a trailing resource-type segment from the origin prefix
fn strip_resource_type(prefix: &str) -> &str {
    for resource_type in RESOURCE_TYPES {
        if let Some(stripped) = prefix.strip_suffix(resource_type) {
            return stripped;
        }
    }
    prefix
}
