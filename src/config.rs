//! Client configuration.

use serde::{Deserialize, Serialize};

/// URL scheme used to reach the kernel server.
///
/// The WebSocket scheme is always derived from the HTTP one: `http` pairs
/// with `ws`, `https` with `wss`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    fn http_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    fn ws_str(self) -> &'static str {
        match self {
            Scheme::Http => "ws",
            Scheme::Https => "wss",
        }
    }
}

/// Endpoint and credential configuration for a kernel server.
///
/// One token authorizes every call made through a client built from this
/// config; there is no per-call credential override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host (and optional port), e.g. `localhost:8888`.
    pub host: String,
    /// API token sent as the `Authorization: token ...` header.
    pub token: String,
    /// HTTP scheme; the message-channel scheme is derived from it.
    #[serde(default)]
    pub scheme: Scheme,
}

impl Config {
    /// Config for a plain-HTTP server.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            scheme: Scheme::Http,
        }
    }

    /// Config for a TLS server.
    pub fn https(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::Https,
            ..Self::new(host, token)
        }
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}://{}/{}", self.scheme.http_str(), self.host, path)
    }

    pub(crate) fn channels_url(&self, kernel_id: &str, session_id: &str) -> String {
        format!(
            "{}://{}/api/kernels/{}/channels?session_id={}",
            self.scheme.ws_str(),
            self.host,
            kernel_id,
            urlencoding::encode(session_id)
        )
    }

    pub(crate) fn authorization(&self) -> String {
        format!("token {}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let config = Config::new("localhost:8888", "secret");
        assert_eq!(
            config.api_url("api/kernelspecs"),
            "http://localhost:8888/api/kernelspecs"
        );
    }

    #[test]
    fn test_channels_url_derives_ws_scheme() {
        let config = Config::new("localhost:8888", "secret");
        assert_eq!(
            config.channels_url("k-1", "abc"),
            "ws://localhost:8888/api/kernels/k-1/channels?session_id=abc"
        );

        let config = Config::https("jupyter.example.com", "secret");
        assert!(config.channels_url("k-1", "abc").starts_with("wss://"));
    }

    #[test]
    fn test_authorization_header() {
        let config = Config::new("localhost:8888", "secret");
        assert_eq!(config.authorization(), "token secret");
    }
}
