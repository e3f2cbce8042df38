//! Configuration management for the Acadmix PDF proxy

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Configuration for the PDF proxy service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address the HTTP server binds to (default: "127.0.0.1:8080")
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Hostname fragment identifying storage-origin URLs (default: "cloudinary.com")
    ///
    /// Source URLs containing this substring get origin-specific candidate
    /// resolution; all other URLs are fetched as-is (pass-through).
    #[serde(default = "default_origin_host")]
    pub origin_host: String,

    /// User-Agent forwarded on every origin fetch (default: browser-compatible)
    ///
    /// The origin rejects anonymous/bot traffic for raw resources, so an
    /// explicit User-Agent is always sent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt connect/read timeout in seconds (default: 30)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// max-age for the private Cache-Control directive in seconds (default: 3600)
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u64,

    /// Filename used in the Content-Disposition inline hint (default: "document.pdf")
    #[serde(default = "default_inline_filename")]
    pub inline_filename: String,
}

// Default value functions for serde
fn default_listen_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_origin_host() -> String {
    "cloudinary.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; AcadmixPdfProxy/1.0)".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_cache_max_age() -> u64 {
    3600
}

fn default_inline_filename() -> String {
    "document.pdf".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            listen_address: default_listen_address(),
            origin_host: default_origin_host(),
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout(),
            cache_max_age_secs: default_cache_max_age(),
            inline_filename: default_inline_filename(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(ProxyConfig)` if loading and validation succeed
    /// * `Err(ProxyError)` if the file cannot be read or the config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ProxyError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: ProxyConfig = serde_yaml::from_str(&content)
            .map_err(|e| ProxyError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - listen_address must parse as a socket address
    /// - origin_host must not be empty
    /// - user_agent must not be empty
    /// - fetch_timeout_secs must be > 0
    /// - inline_filename must be non-empty printable ASCII without quotes
    ///   (it is embedded in the Content-Disposition header value)
    pub fn validate(&self) -> Result<()> {
        if self.listen_address.parse::<SocketAddr>().is_err() {
            return Err(ProxyError::ConfigError(format!(
                "listen_address '{}' is not a valid socket address",
                self.listen_address
            )));
        }

        if self.origin_host.is_empty() {
            return Err(ProxyError::ConfigError(
                "origin_host must not be empty".to_string(),
            ));
        }

        if self.user_agent.is_empty() {
            return Err(ProxyError::ConfigError(
                "user_agent must not be empty".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(ProxyError::ConfigError(
                "fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }

        // The filename is interpolated into a Content-Disposition header
        // value, so anything outside quote-free printable ASCII is rejected.
        let filename_ok = !self.inline_filename.is_empty()
            && self
                .inline_filename
                .bytes()
                .all(|b| (0x20..0x7f).contains(&b) && b != b'"');
        if !filename_ok {
            return Err(ProxyError::ConfigError(format!(
                "inline_filename '{}' must be non-empty printable ASCII without quotes",
                self.inline_filename.escape_default()
            )));
        }

        Ok(())
    }

    /// Parsed listen address
    ///
    /// Callers must run `validate()` first; this only fails on an address
    /// that validation would already have rejected.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse::<SocketAddr>().map_err(|e| {
            ProxyError::ConfigError(format!(
                "listen_address '{}' is not a valid socket address: {}",
                self.listen_address, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.listen_address, "127.0.0.1:8080");
        assert_eq!(config.origin_host, "cloudinary.com");
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.cache_max_age_secs, 3600);
        assert_eq!(config.inline_filename, "document.pdf");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = ProxyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_listen_address() {
        let mut config = ProxyConfig::default();
        config.listen_address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_origin_host() {
        let mut config = ProxyConfig::default();
        config.origin_host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = ProxyConfig::default();
        config.fetch_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_inline_filename() {
        let mut config = ProxyConfig::default();
        config.inline_filename = "doc\".pdf".to_string();
        assert!(config.validate().is_err());

        config.inline_filename = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_control_chars_in_inline_filename() {
        let mut config = ProxyConfig::default();
        config.inline_filename = "doc\n.pdf".to_string();
        assert!(config.validate().is_err());

        config.inline_filename = "doc\r.pdf".to_string();
        assert!(config.validate().is_err());

        config.inline_filename = "légal.pdf".to_string();
        assert!(config.validate().is_err());

        config.inline_filename = "report (final).pdf".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
listen_address: "0.0.0.0:9000"
origin_host: "cloudinary.com"
fetch_timeout_secs: 10
"#;
        let config: ProxyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listen_address, "0.0.0.0:9000");
        assert_eq!(config.fetch_timeout_secs, 10);
        // Unspecified fields fall back to defaults
        assert_eq!(config.cache_max_age_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_listen_addr_parses() {
        let config = ProxyConfig::default();
        let addr = config.listen_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
