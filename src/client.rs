//! The PDF service client.
//!
//! Both public operations funnel into one private send routine: POST the XML
//! body with `Content-Type: application/xml` and the `x-api-token` header,
//! then either return the response bytes verbatim (2xx) or turn the status
//! and whatever body text could be read into [`KsefPdfError::RequestFailed`].
//!
//! ## Transport ownership
//!
//! An injected [`reqwest::Client`] is used as-is. Otherwise the client builds
//! its own the first time a request actually goes out, so a call rejected
//! during validation never constructs a transport. The built transport lives
//! exactly as long as the `KsefPdfClient` that owns it.
//!
//! ## Cancellation
//!
//! The `*_with_cancel` variants race the exchange against a
//! [`CancellationToken`]. When the token wins, the request future is dropped,
//! which aborts the connection inside reqwest.

use crate::config::ClientConfig;
use crate::endpoint::{self, PdfKind};
use crate::error::KsefPdfError;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Header carrying the API token.
pub const API_TOKEN_HEADER: &str = "x-api-token";

const XML_CONTENT_TYPE: &str = "application/xml";

/// Client for the KSeF PDF generator service.
///
/// The token and transport are read-only after construction, so one
/// instance can serve concurrent callers through `&` or `Arc`. Prefer that
/// over `clone()`: a clone taken before the first request carries no
/// transport yet and builds its own connection pool.
///
/// # Example
/// ```rust,no_run
/// use ksef_pdf_client::KsefPdfClient;
///
/// # async fn run() -> Result<(), ksef_pdf_client::KsefPdfError> {
/// let client = KsefPdfClient::new("my-api-token")?;
/// let pdf = client
///     .fetch_invoice_pdf("https://pdf.example.com", "<Faktura/>", "1234-5678", "QR")
///     .await?;
/// std::fs::write("invoice.pdf", pdf).ok();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KsefPdfClient {
    config: ClientConfig,
    http: OnceCell<reqwest::Client>,
}

impl KsefPdfClient {
    /// Create a client that builds its own transport on first use.
    pub fn new(api_token: impl Into<String>) -> Result<Self, KsefPdfError> {
        Ok(Self::from_config(ClientConfig::builder(api_token).build()?))
    }

    /// Create a client that sends every request through `http_client`.
    pub fn with_http_client(
        api_token: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Result<Self, KsefPdfError> {
        let config = ClientConfig::builder(api_token)
            .http_client(http_client)
            .build()?;
        Ok(Self::from_config(config))
    }

    /// Create a client from a validated configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        let http = match config.http_client.clone() {
            Some(client) => OnceCell::with_value(client),
            None => OnceCell::new(),
        };
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind this client to one base domain.
    pub fn for_domain(&self, domain: &str) -> Result<DomainPdfClient<'_>, KsefPdfError> {
        let domain = endpoint::normalize_domain(domain)?.to_string();
        Ok(DomainPdfClient {
            client: self,
            domain,
        })
    }

    /// Render an invoice PDF.
    ///
    /// # Errors
    /// - [`KsefPdfError::InvalidArgument`] if `domain`, `xml_content`,
    ///   `ksef_number` or `qr_code` is blank (checked in that order, before
    ///   any I/O)
    /// - [`KsefPdfError::RequestFailed`] on a non-2xx response
    /// - [`KsefPdfError::Transport`] if the exchange itself fails
    pub async fn fetch_invoice_pdf(
        &self,
        domain: &str,
        xml_content: &str,
        ksef_number: &str,
        qr_code: &str,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let url = invoice_target(domain, xml_content, ksef_number, qr_code)?;
        self.send(PdfKind::Invoice, &url, xml_content, None).await
    }

    /// [`Self::fetch_invoice_pdf`], aborted with [`KsefPdfError::Cancelled`]
    /// if `cancel` fires first.
    pub async fn fetch_invoice_pdf_with_cancel(
        &self,
        domain: &str,
        xml_content: &str,
        ksef_number: &str,
        qr_code: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let url = invoice_target(domain, xml_content, ksef_number, qr_code)?;
        self.send(PdfKind::Invoice, &url, xml_content, Some(cancel))
            .await
    }

    /// Render a UPO (confirmation of receipt) PDF.
    ///
    /// # Errors
    /// Same as [`Self::fetch_invoice_pdf`], validating `domain` and
    /// `xml_content`.
    pub async fn fetch_upo_pdf(
        &self,
        domain: &str,
        xml_content: &str,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let url = upo_target(domain, xml_content)?;
        self.send(PdfKind::Upo, &url, xml_content, None).await
    }

    /// [`Self::fetch_upo_pdf`], aborted with [`KsefPdfError::Cancelled`] if
    /// `cancel` fires first.
    pub async fn fetch_upo_pdf_with_cancel(
        &self,
        domain: &str,
        xml_content: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let url = upo_target(domain, xml_content)?;
        self.send(PdfKind::Upo, &url, xml_content, Some(cancel)).await
    }

    async fn send(
        &self,
        kind: PdfKind,
        url: &str,
        xml_body: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let exchange = self.exchange(kind, url, xml_body);
        let Some(token) = cancel else {
            return exchange.await;
        };

        tokio::select! {
            biased;

            () = token.cancelled() => {
                warn!("{} PDF request to {} cancelled", kind, url);
                Err(KsefPdfError::Cancelled)
            }

            result = exchange => result,
        }
    }

    async fn exchange(
        &self,
        kind: PdfKind,
        url: &str,
        xml_body: &str,
    ) -> Result<Vec<u8>, KsefPdfError> {
        let start = Instant::now();
        let http = self
            .http
            .get_or_try_init(|| self.config.build_http_client())?;

        let mut request = http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))
            .header(API_TOKEN_HEADER, self.config.api_token.clone())
            .body(xml_body.to_owned());
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }

        debug!("POST {} ({} PDF, {} bytes of XML)", url, kind, xml_body.len());
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            // Best-effort: a body that cannot be read leaves the status as
            // the only diagnostic.
            let server_response = match response.text().await {
                Ok(text) if !text.is_empty() => Some(text),
                _ => None,
            };
            warn!("{} PDF request to {} failed: HTTP {}", kind, url, status);
            return Err(KsefPdfError::RequestFailed {
                status,
                server_response,
            });
        }

        let pdf = response.bytes().await?;
        info!(
            "{} PDF received: {} bytes in {}ms",
            kind,
            pdf.len(),
            start.elapsed().as_millis()
        );
        Ok(pdf.to_vec())
    }
}

fn invoice_target(
    domain: &str,
    xml_content: &str,
    ksef_number: &str,
    qr_code: &str,
) -> Result<String, KsefPdfError> {
    endpoint::require("domain", domain)?;
    endpoint::require("xml_content", xml_content)?;
    endpoint::invoice_pdf_url(domain, ksef_number, qr_code)
}

fn upo_target(domain: &str, xml_content: &str) -> Result<String, KsefPdfError> {
    endpoint::require("domain", domain)?;
    endpoint::require("xml_content", xml_content)?;
    endpoint::upo_pdf_url(domain)
}

/// A [`KsefPdfClient`] bound to one base domain.
///
/// Created by [`KsefPdfClient::for_domain`]; the domain is normalised once
/// when binding.
#[derive(Debug, Clone)]
pub struct DomainPdfClient<'a> {
    client: &'a KsefPdfClient,
    domain: String,
}

impl DomainPdfClient<'_> {
    /// The normalised base domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub async fn invoice_pdf(
        &self,
        xml_content: &str,
        ksef_number: &str,
        qr_code: &str,
    ) -> Result<Vec<u8>, KsefPdfError> {
        self.client
            .fetch_invoice_pdf(&self.domain, xml_content, ksef_number, qr_code)
            .await
    }

    pub async fn invoice_pdf_with_cancel(
        &self,
        xml_content: &str,
        ksef_number: &str,
        qr_code: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, KsefPdfError> {
        self.client
            .fetch_invoice_pdf_with_cancel(&self.domain, xml_content, ksef_number, qr_code, cancel)
            .await
    }

    pub async fn upo_pdf(&self, xml_content: &str) -> Result<Vec<u8>, KsefPdfError> {
        self.client.fetch_upo_pdf(&self.domain, xml_content).await
    }

    pub async fn upo_pdf_with_cancel(
        &self,
        xml_content: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, KsefPdfError> {
        self.client
            .fetch_upo_pdf_with_cancel(&self.domain, xml_content, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(result: Result<Vec<u8>, KsefPdfError>, expected: &str) {
        match result {
            Err(KsefPdfError::InvalidArgument { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected InvalidArgument({expected}), got {other:?}"),
        }
    }

    #[test]
    fn validation_order_is_domain_xml_number_qr() {
        let client = KsefPdfClient::new("token").unwrap();
        assert_invalid(
            tokio_test::block_on(client.fetch_invoice_pdf("", "", "", "")),
            "domain",
        );
        assert_invalid(
            tokio_test::block_on(client.fetch_invoice_pdf("https://h", " ", "", "")),
            "xml_content",
        );
        assert_invalid(
            tokio_test::block_on(client.fetch_invoice_pdf("https://h", "<x/>", "", "")),
            "ksef_number",
        );
        assert_invalid(
            tokio_test::block_on(client.fetch_invoice_pdf("https://h", "<x/>", "1", "\t")),
            "qr_code",
        );
        assert_invalid(
            tokio_test::block_on(client.fetch_upo_pdf("https://h", "")),
            "xml_content",
        );
    }

    #[test]
    fn rejected_call_does_not_build_transport() {
        let client = KsefPdfClient::new("token").unwrap();
        assert!(client.http.get().is_none());
        let _ = tokio_test::block_on(client.fetch_upo_pdf("  ", "<x/>"));
        assert!(client.http.get().is_none());
    }

    #[test]
    fn injected_transport_is_used_immediately() {
        let client = KsefPdfClient::with_http_client("token", reqwest::Client::new()).unwrap();
        assert!(client.http.get().is_some());
    }

    #[test]
    fn for_domain_normalises_once() {
        let client = KsefPdfClient::new("token").unwrap();
        let bound = client.for_domain("https://pdf.example.com///").unwrap();
        assert_eq!(bound.domain(), "https://pdf.example.com");
        assert!(client.for_domain(" ").is_err());
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KsefPdfClient>();
        assert_send_sync::<DomainPdfClient<'static>>();
    }
}
