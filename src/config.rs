//! Client configuration.
//!
//! [`ClientConfig`] carries the API token and, optionally, a caller-owned
//! [`reqwest::Client`]. When no transport is injected the client builds its
//! own on first use from the transport settings held here.
//!
//! The token is stored as a sensitive [`HeaderValue`] so it is validated
//! once at construction and never shows up in `Debug` output.

use crate::error::KsefPdfError;
use reqwest::header::HeaderValue;
use std::fmt;
use std::time::Duration;

/// Configuration for a [`crate::KsefPdfClient`].
///
/// # Example
/// ```rust
/// use ksef_pdf_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder("my-api-token")
///     .request_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert!(config.http_client().is_none());
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Value of the `x-api-token` header sent with every request.
    pub(crate) api_token: HeaderValue,

    /// Caller-supplied transport. When `None` the client creates its own.
    pub(crate) http_client: Option<reqwest::Client>,

    /// Per-request timeout. Default: none.
    ///
    /// Applied to every request, including those sent through an injected
    /// transport. Expiry surfaces as [`KsefPdfError::Transport`].
    pub(crate) request_timeout: Option<Duration>,

    /// TCP connect timeout for the client-built transport. Default: none.
    pub(crate) connect_timeout: Option<Duration>,

    /// `User-Agent` for the client-built transport.
    pub(crate) user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("http_client", &self.http_client.as_ref().map(|_| "<injected>"))
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    ///
    /// [`ClientConfigBuilder::build`] is the only way to obtain a
    /// `ClientConfig`, so every config holds a validated token.
    pub fn builder(api_token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_token: api_token.into(),
            http_client: None,
            request_timeout: None,
            connect_timeout: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Build the transport used when none was injected.
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(t) = self.connect_timeout {
            builder = builder.connect_timeout(t);
        }
        builder.build()
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    api_token: String,
    http_client: Option<reqwest::Client>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: String,
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("api_token", &"<redacted>")
            .field("http_client", &self.http_client.as_ref().map(|_| "<injected>"))
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfigBuilder {
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating the token.
    pub fn build(self) -> Result<ClientConfig, KsefPdfError> {
        if self.api_token.trim().is_empty() {
            return Err(KsefPdfError::blank("api_token"));
        }
        let mut api_token =
            HeaderValue::from_str(&self.api_token).map_err(|_| KsefPdfError::InvalidArgument {
                field: "api_token",
                reason: "value contains characters not allowed in an HTTP header",
            })?;
        api_token.set_sensitive(true);

        Ok(ClientConfig {
            api_token,
            http_client: self.http_client,
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_rejected() {
        for token in ["", "   ", "\t\n"] {
            let err = ClientConfig::builder(token).build().unwrap_err();
            assert!(
                matches!(
                    err,
                    KsefPdfError::InvalidArgument {
                        field: "api_token",
                        ..
                    }
                ),
                "token {token:?}: {err:?}"
            );
        }
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let err = ClientConfig::builder("abc\r\nx-evil: 1").build().unwrap_err();
        assert!(err.to_string().contains("HTTP header"), "got: {err}");
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::builder("super-secret-token").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret-token"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
        assert!(config.api_token.is_sensitive());

        let builder = ClientConfig::builder("super-secret-token");
        assert!(!format!("{builder:?}").contains("super-secret-token"));
    }

    #[test]
    fn builder_defaults() {
        let config = ClientConfig::builder("t").build().unwrap();
        assert!(config.http_client().is_none());
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.connect_timeout(), None);
        assert!(config.user_agent().starts_with("ksef-pdf-client/"));
    }

    #[test]
    fn builder_setters() {
        let config = ClientConfig::builder("t")
            .http_client(reqwest::Client::new())
            .request_timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .user_agent("acme/1.0")
            .build()
            .unwrap();
        assert!(config.http_client().is_some());
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.user_agent(), "acme/1.0");
    }
}
