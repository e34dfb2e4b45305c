//! Request targets: argument validation, domain normalisation and URL
//! building for the two service endpoints.
//!
//! Everything here is pure string work so it can be tested without a
//! server. Query values are escaped with [`urlencoding::encode`], which
//! leaves only the unreserved set (`A-Z a-z 0-9 - _ . ~`) untouched.

use crate::error::KsefPdfError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of the invoice rendering endpoint.
pub const INVOICE_PDF_PATH: &str = "/api/invoice/pdf";
/// Path of the UPO rendering endpoint.
pub const UPO_PDF_PATH: &str = "/api/upo/pdf";

/// Which document the service is asked to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfKind {
    /// Invoice visualisation, addressed by KSeF number and QR code.
    Invoice,
    /// Confirmation of receipt (UPO).
    Upo,
}

impl fmt::Display for PdfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfKind::Invoice => f.write_str("invoice"),
            PdfKind::Upo => f.write_str("upo"),
        }
    }
}

/// Fail with [`KsefPdfError::InvalidArgument`] if `value` is empty or
/// whitespace-only.
pub fn require(field: &'static str, value: &str) -> Result<(), KsefPdfError> {
    if value.trim().is_empty() {
        return Err(KsefPdfError::blank(field));
    }
    Ok(())
}

/// Strip surrounding whitespace and every trailing `/` from a base domain.
///
/// `"https://x///"` becomes `"https://x"`. A domain made only of slashes
/// normalises to nothing and is rejected, as is anything that is not an
/// absolute `http`/`https` URL.
pub fn normalize_domain(domain: &str) -> Result<&str, KsefPdfError> {
    require("domain", domain)?;
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(KsefPdfError::InvalidArgument {
            field: "domain",
            reason: "value must contain more than slashes",
        });
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(trimmed),
        _ => Err(KsefPdfError::InvalidArgument {
            field: "domain",
            reason: "value must be an absolute http(s) URL",
        }),
    }
}

/// `{domain}/api/invoice/pdf?nrKSeF=..&qrCode=..`
pub fn invoice_pdf_url(
    domain: &str,
    ksef_number: &str,
    qr_code: &str,
) -> Result<String, KsefPdfError> {
    let domain = normalize_domain(domain)?;
    require("ksef_number", ksef_number)?;
    require("qr_code", qr_code)?;

    Ok(format!(
        "{domain}{INVOICE_PDF_PATH}?nrKSeF={}&qrCode={}",
        urlencoding::encode(ksef_number),
        urlencoding::encode(qr_code),
    ))
}

/// `{domain}/api/upo/pdf`
pub fn upo_pdf_url(domain: &str) -> Result<String, KsefPdfError> {
    let domain = normalize_domain(domain)?;
    Ok(format!("{domain}{UPO_PDF_PATH}"))
}
