//! Transport configuration for streaming endpoints.
//!
//! Configuration is read-only after initialization: a [`TransportConfig`]
//! is handed to the client once, and every session started from that
//! client sees the same settings.

use std::collections::HashMap;
use std::time::Duration;

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Transport configuration shared by all sessions of one client.
///
/// # Example
/// ```rust
/// use deltastream::options::TransportConfig;
/// use std::time::Duration;
///
/// let config = TransportConfig::new("https://api.example.com")
///     .with_timeout(Duration::from_secs(60))
///     .with_api_key("sk-...");
/// ```
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the backend; endpoint paths are joined onto this.
    pub base_url: String,

    /// Request timeout. Covers the whole response body, so leave unset
    /// for long-lived streams unless the backend bounds them.
    pub timeout: Option<Duration>,

    /// Bearer token sent as the `Authorization` header.
    pub api_key: Option<SecretString>,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportConfig {
    /// Create a new configuration for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            api_key: None,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
