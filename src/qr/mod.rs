//! SET QR verification URLs.
//!
//! The `dCarQR` element of a signed SIFEN document carries the URL printed
//! as the KuDE QR code. In practice it arrives entity-encoded, with broken
//! separators, or as a bare query string; [`normalize`] turns any of those
//! into one canonical URL.

mod normalize;

use std::fmt;

use percent_encoding::utf8_percent_encode;
use serde::Serialize;

pub use normalize::{PARAM_ORDER, normalize};

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "ekuatia.set.gov.py";
pub const DEFAULT_PATH: &str = "/consultas/qr";

/// Base URL of the SET QR verification service.
pub const QR_BASE_URL: &str = "https://ekuatia.set.gov.py/consultas/qr";

/// Public document lookup used when a document carries no QR.
pub const CDC_LOOKUP_URL: &str =
    "https://ekuatia.set.gov.py/consultas/public/consulta-documento-electronico";

/// Untrusted QR text exactly as found in the XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQrFragment(String);

impl RawQrFragment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalize(&self) -> CanonicalQrUrl {
        normalize(&self.0)
    }
}

/// Well-formed `https` URL with an RFC 3986 encoded query in
/// [`PARAM_ORDER`]. Only produced by [`normalize`] and
/// [`CanonicalQrUrl::for_cdc`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalQrUrl(String);

impl CanonicalQrUrl {
    /// Fallback verification URL built from the document's CDC.
    pub fn for_cdc(cdc: &str) -> Self {
        let cdc = utf8_percent_encode(cdc, percent_encoding::NON_ALPHANUMERIC);
        Self(format!("{CDC_LOOKUP_URL}?cdc={cdc}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalQrUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalQrUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
