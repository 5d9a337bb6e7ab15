// ── Runtime connection configuration ──
//
// These types describe *how* to reach the products API.
// They never touch disk: the CLI/TUI builds a `ControllerConfig`
// (usually via `finprod-config`) and hands it in.

use std::time::Duration;

use url::Url;

/// Default API base, matching the reference backend's `/bp` prefix.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002/bp";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Configuration for one products API endpoint.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API base URL; endpoint paths are appended to it.
    pub base_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to re-fetch the product list (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl ControllerConfig {
    /// Config for `base_url` with default tuning.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 0,
        }
    }
}
