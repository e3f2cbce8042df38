//! HTTP surface of the PDF proxy
//!
//! Serves `GET /pdf-proxy?url=<source>` plus `/health` and `/metrics`.
//! Each accepted connection is handled on its own task; candidate
//! iteration inside one request never blocks other requests. Winning
//! origin responses are relayed chunk by chunk as they arrive, never
//! buffered whole, so memory stays bounded regardless of document size
//! and the client starts receiving bytes before the full object is
//! fetched. If the client disconnects mid-stream the response future is
//! dropped, which drops the in-flight origin fetch with it.

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::fetcher::{DocumentFetcher, FetchExhausted, FetchedDocument};
use crate::metrics::{MetricsSnapshot, ProxyMetrics};
use crate::models::{ErrorBody, InternalErrorBody, NotFoundBody, Resolution, UpstreamFailureBody};
use crate::resolver::UrlResolver;
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Body type unifying buffered JSON responses and streamed documents
pub type ProxyBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Request handling core, independent of the socket accept loop
///
/// Holds the resolver, the shared fetcher (one connection pool to the
/// origin per process) and the metrics counters. No other state is
/// shared between requests.
pub struct PdfProxyService {
    config: Arc<ProxyConfig>,
    resolver: UrlResolver,
    fetcher: DocumentFetcher,
    metrics: Arc<ProxyMetrics>,
}

impl PdfProxyService {
    /// Create a service from validated configuration
    pub fn new(config: Arc<ProxyConfig>) -> Result<Self> {
        let resolver = UrlResolver::new(config.origin_host.clone());
        let fetcher = DocumentFetcher::from_config(&config)?;

        Ok(PdfProxyService {
            config,
            resolver,
            fetcher,
            metrics: Arc::new(ProxyMetrics::new()),
        })
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<ProxyMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Route one request to its handler
    ///
    /// Takes the method, path and raw query string rather than a hyper
    /// request so the routing and response shaping are directly testable
    /// without a live socket.
    pub async fn handle(&self, method: &Method, path: &str, query: Option<&str>) -> Response<ProxyBody> {
        match (method, path) {
            (&Method::GET, "/pdf-proxy") => self.handle_pdf_proxy(query).await,
            (&Method::GET, "/health") => health_response(),
            (&Method::GET, "/metrics") => metrics_response(self.metrics.get_stats()),
            _ => not_found_response(),
        }
    }

    /// Resolve, fetch and relay one PDF
    async fn handle_pdf_proxy(&self, query: Option<&str>) -> Response<ProxyBody> {
        self.metrics.record_request();

        let Some(url) = extract_url_param(query) else {
            // Client error; no outbound fetch is attempted
            self.metrics.record_missing_url();
            let err = ProxyError::MissingInput;
            warn!("Rejecting /pdf-proxy request: {}", err);
            return json_response(
                StatusCode::from_u16(err.to_http_status()).unwrap_or(StatusCode::BAD_REQUEST),
                &ErrorBody::new(err.to_string()),
            );
        };

        info!("Proxying PDF request for: {}", url);

        let resolution = self.resolver.resolve(&url);
        self.metrics.record_resolution(resolution.origin);

        match self.fetcher.fetch_first(&resolution.candidates).await {
            Ok(document) => {
                self.metrics.record_candidate_attempts(document.attempt as u64);
                self.metrics.record_candidate_failures(document.attempt as u64 - 1);
                info!(
                    "Streaming {} (candidate {}/{} for {})",
                    document.url,
                    document.attempt,
                    resolution.candidates.len(),
                    resolution.source_url
                );
                self.metrics.record_document_streamed();
                self.stream_response(document)
            }
            Err(exhausted) => {
                let tried = exhausted.attempts.len() as u64;
                self.metrics.record_candidate_attempts(tried);
                self.metrics.record_candidate_failures(tried);
                self.failure_response(&resolution, exhausted)
            }
        }
    }

    /// Relay a winning origin response to the client
    fn stream_response(&self, document: FetchedDocument) -> Response<ProxyBody> {
        let content_type = document
            .content_type
            .unwrap_or_else(|| "application/pdf".to_string());

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", content_type)
            .header(
                "Content-Disposition",
                format!("inline; filename=\"{}\"", self.config.inline_filename),
            )
            .header(
                "Cache-Control",
                // Content may be access-controlled per purchase
                format!("private, max-age={}", self.config.cache_max_age_secs),
            );

        if let Some(length) = document.content_length {
            builder = builder.header("Content-Length", length.to_string());
        }

        let metrics = Arc::clone(&self.metrics);
        let stream = document
            .response
            .bytes_stream()
            .inspect_ok(move |chunk| metrics.record_bytes_to_client(chunk.len() as u64))
            .map_ok(Frame::data)
            .map_err(std::io::Error::other);

        builder
            .body(StreamBody::new(stream).boxed_unsync())
            .unwrap()
    }

    /// Shape the caller-visible error after candidate exhaustion
    fn failure_response(
        &self,
        resolution: &Resolution,
        exhausted: FetchExhausted,
    ) -> Response<ProxyBody> {
        if resolution.origin {
            self.metrics.record_not_found();
            let public_id = resolution.public_id.clone().unwrap_or_default();
            let err = ProxyError::ResourceNotFound {
                public_id: public_id.clone(),
                original_url: resolution.source_url.clone(),
                attempts: exhausted.attempts.len(),
            };
            error!("{}", err);

            let body = NotFoundBody {
                error: "PDF not found in storage".to_string(),
                message: format!(
                    "Tried {} candidate URLs without success",
                    exhausted.attempts.len()
                ),
                public_id,
                original_url: resolution.source_url.clone(),
            };
            return json_response(
                StatusCode::from_u16(err.to_http_status()).unwrap_or(StatusCode::NOT_FOUND),
                &body,
            );
        }

        // Pass-through fetch: relay the upstream's own failure
        self.metrics.record_upstream_failure();

        if let Some(attempt) = exhausted.last_attempt() {
            if let Some(status_code) = attempt.status {
                let status =
                    StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY);
                let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
                let err = ProxyError::upstream_failure(
                    status_code,
                    status_text.clone(),
                    attempt.url.clone(),
                );
                warn!("Pass-through fetch failed: {}", err);
                let body = UpstreamFailureBody {
                    error: "Failed to fetch PDF".to_string(),
                    status: status_code,
                    status_text,
                    url: attempt.url.clone(),
                };
                return json_response(status, &body);
            }

            error!(
                "Pass-through fetch failed for {}: {}",
                attempt.url,
                attempt.reason()
            );
            let body = InternalErrorBody {
                error: "Failed to proxy PDF".to_string(),
                message: attempt.reason(),
            };
            return json_response(StatusCode::INTERNAL_SERVER_ERROR, &body);
        }

        // Candidate sequences are never empty; treat this as an internal fault
        let body = InternalErrorBody {
            error: "Failed to proxy PDF".to_string(),
            message: "No candidate URLs were attempted".to_string(),
        };
        json_response(StatusCode::INTERNAL_SERVER_ERROR, &body)
    }
}

/// Accept loop wrapping a [`PdfProxyService`]
pub struct PdfProxyServer {
    service: Arc<PdfProxyService>,
    addr: SocketAddr,
}

impl PdfProxyServer {
    /// Create a server from configuration, validating it first
    pub fn new(config: ProxyConfig) -> Result<Self> {
        config.validate()?;
        let addr = config.listen_addr()?;
        let service = Arc::new(PdfProxyService::new(Arc::new(config))?);
        Ok(PdfProxyServer { service, addr })
    }

    /// Handle to the request-handling core, mainly for tests and metrics
    pub fn service(&self) -> Arc<PdfProxyService> {
        Arc::clone(&self.service)
    }

    /// Start the HTTP server
    ///
    /// Runs until the process is terminated. One task per accepted
    /// connection; a connection error is logged and never takes down the
    /// accept loop.
    pub async fn start(self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("PDF proxy listening on http://{}", self.addr);
        info!("Proxy endpoint at http://{}/pdf-proxy?url=<source>", self.addr);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let service = Arc::clone(&self.service);

            tokio::task::spawn(async move {
                let handler = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let service = Arc::clone(&service);
                    async move {
                        let method = req.method().clone();
                        let path = req.uri().path().to_string();
                        let query = req.uri().query().map(|q| q.to_string());
                        Ok::<_, hyper::Error>(service.handle(&method, &path, query.as_deref()).await)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, handler).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Extract and percent-decode the `url` query parameter
fn extract_url_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Buffered body from a byte payload
fn full_body(bytes: impl Into<Bytes>) -> ProxyBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Serialize a JSON response body with the given status
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ProxyBody> {
    let payload = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full_body(payload))
        .unwrap()
}

/// Generate health check response
fn health_response() -> Response<ProxyBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full_body(r#"{"status":"healthy"}"#))
        .unwrap()
}

/// Generate the metrics response in Prometheus exposition format
fn metrics_response(snapshot: MetricsSnapshot) -> Response<ProxyBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; version=0.0.4; charset=utf-8")
        .body(full_body(format_prometheus_metrics(&snapshot)))
        .unwrap()
}

/// Generate 404 response for unknown routes
fn not_found_response() -> Response<ProxyBody> {
    json_response(StatusCode::NOT_FOUND, &ErrorBody::new("Not found"))
}

/// Format metrics in Prometheus text format
fn format_prometheus_metrics(snapshot: &MetricsSnapshot) -> String {
    let mut output = String::new();

    output.push_str("# HELP pdf_proxy_requests_total Total proxy requests received\n");
    output.push_str("# TYPE pdf_proxy_requests_total counter\n");
    output.push_str(&format!("pdf_proxy_requests_total {}\n\n", snapshot.requests_total));

    output.push_str("# HELP pdf_proxy_missing_url_total Requests rejected for a missing url parameter\n");
    output.push_str("# TYPE pdf_proxy_missing_url_total counter\n");
    output.push_str(&format!("pdf_proxy_missing_url_total {}\n\n", snapshot.missing_url));

    output.push_str("# HELP pdf_proxy_origin_resolutions_total Source URLs resolved with origin candidates\n");
    output.push_str("# TYPE pdf_proxy_origin_resolutions_total counter\n");
    output.push_str(&format!("pdf_proxy_origin_resolutions_total {}\n\n", snapshot.origin_resolutions));

    output.push_str("# HELP pdf_proxy_passthrough_resolutions_total Source URLs fetched as-is\n");
    output.push_str("# TYPE pdf_proxy_passthrough_resolutions_total counter\n");
    output.push_str(&format!("pdf_proxy_passthrough_resolutions_total {}\n\n", snapshot.passthrough_resolutions));

    output.push_str("# HELP pdf_proxy_candidate_attempts_total Candidate URLs attempted\n");
    output.push_str("# TYPE pdf_proxy_candidate_attempts_total counter\n");
    output.push_str(&format!("pdf_proxy_candidate_attempts_total {}\n\n", snapshot.candidate_attempts));

    output.push_str("# HELP pdf_proxy_candidate_failures_total Candidate attempts that failed\n");
    output.push_str("# TYPE pdf_proxy_candidate_failures_total counter\n");
    output.push_str(&format!("pdf_proxy_candidate_failures_total {}\n\n", snapshot.candidate_failures));

    output.push_str("# HELP pdf_proxy_documents_streamed_total Documents successfully streamed to clients\n");
    output.push_str("# TYPE pdf_proxy_documents_streamed_total counter\n");
    output.push_str(&format!("pdf_proxy_documents_streamed_total {}\n\n", snapshot.documents_streamed));

    output.push_str("# HELP pdf_proxy_not_found_total Requests where every origin candidate failed\n");
    output.push_str("# TYPE pdf_proxy_not_found_total counter\n");
    output.push_str(&format!("pdf_proxy_not_found_total {}\n\n", snapshot.not_found));

    output.push_str("# HELP pdf_proxy_upstream_failures_total Pass-through fetches that failed\n");
    output.push_str("# TYPE pdf_proxy_upstream_failures_total counter\n");
    output.push_str(&format!("pdf_proxy_upstream_failures_total {}\n\n", snapshot.upstream_failures));

    output.push_str("# HELP pdf_proxy_bytes_to_client_total Body bytes relayed to clients\n");
    output.push_str("# TYPE pdf_proxy_bytes_to_client_total counter\n");
    output.push_str(&format!("pdf_proxy_bytes_to_client_total {}\n", snapshot.bytes_to_client));

    output
}
