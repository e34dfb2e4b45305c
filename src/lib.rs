//! # ksef-pdf-client
//!
//! Client for the KSeF PDF generator service. The service renders two kinds
//! of document from their XML source:
//!
//! | Operation | Endpoint | Extra parameters |
//! |-----------|----------|------------------|
//! | [`KsefPdfClient::fetch_invoice_pdf`] | `POST {domain}/api/invoice/pdf` | `nrKSeF`, `qrCode` (query) |
//! | [`KsefPdfClient::fetch_upo_pdf`]     | `POST {domain}/api/upo/pdf`     | — |
//!
//! Every request carries the XML as an `application/xml` body and the API
//! token in the `x-api-token` header. A 2xx response body is returned as the
//! raw PDF bytes; anything else becomes a [`KsefPdfError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ksef_pdf_client::KsefPdfClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KsefPdfClient::new(std::env::var("KSEF_PDF_API_TOKEN")?)?;
//!     let xml = std::fs::read_to_string("upo.xml")?;
//!     let pdf = client.fetch_upo_pdf("https://pdf.example.com/", &xml).await?;
//!     std::fs::write("upo.pdf", &pdf)?;
//!     eprintln!("{} bytes", pdf.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ksef-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ksef-pdf-client = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{DomainPdfClient, KsefPdfClient, API_TOKEN_HEADER};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use endpoint::PdfKind;
pub use error::KsefPdfError;
pub use tokio_util::sync::CancellationToken;
