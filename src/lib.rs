//! Acadmix PDF Proxy
//!
//! A streaming delivery proxy for purchased e-books. The book catalog
//! stores one `pdfUrl` per book, but the storage origin (Cloudinary raw
//! resources) registers uploaded binaries under inconsistently-suffixed
//! identifiers, so the stored URL often does not fetch as-is. This
//! service resolves each source URL into an ordered list of candidate
//! retrieval URLs, fetches them sequentially until one answers 2xx, and
//! relays the winning response to the client as a true pass-through
//! stream.
//!
//! # Overview
//!
//! ```text
//! Client ── GET /pdf-proxy?url=... ──┐
//!                                    │
//!                              ┌─────┴──────┐
//!                              │  Resolver  │  pure string transform
//!                              └─────┬──────┘
//!                                    │ ordered candidates
//!                              ┌─────┴──────┐
//!                              │  Fetcher   │  sequential, first 2xx wins
//!                              └─────┬──────┘
//!                                    │ streamed body
//!                              Storage Origin
//! ```
//!
//! # Components
//!
//! - [`UrlResolver`]: derives candidate URLs from a source URL, encoding
//!   the origin's naming inconsistencies
//! - [`DocumentFetcher`]: executes candidates in order against the origin
//!   with bounded per-attempt timeouts
//! - [`PdfProxyService`] / [`PdfProxyServer`]: the HTTP surface, header
//!   propagation and streaming relay
//! - [`ProxyConfig`]: YAML-loadable configuration (origin marker, timeouts,
//!   cache directive, listen address)
//! - [`ProxyMetrics`]: atomic runtime counters exposed at `/metrics`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acadmix_pdf_proxy::{PdfProxyServer, ProxyConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = ProxyConfig::default();
//! let server = PdfProxyServer::new(config)?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! No cross-request state is kept: every request resolves and fetches
//! from scratch, and resolved URLs are not cached.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod models;
pub mod resolver;
pub mod server;

// Re-export commonly used types
pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use fetcher::{DocumentFetcher, FetchExhausted, FetchedDocument};
pub use metrics::{MetricsSnapshot, ProxyMetrics};
pub use models::{CandidateAttempt, Resolution};
pub use resolver::UrlResolver;
pub use server::{PdfProxyServer, PdfProxyService, ProxyBody};
