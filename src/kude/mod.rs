//! KuDE assembly: the printable representation of a signed document.
//!
//! [`KudeLayout`] turns extracted fields and the verification URL into an
//! HTML body, a stylesheet and a QR [`BarcodeDirective`]. Turning that into
//! PDF bytes is left to a [`PdfRenderer`].
//!
//! ```
//! use kude::kude::KudeLayout;
//! use kude::sifen::SifenDocument;
//!
//! let xml = r#"<rDE><DE Id="0180"><gTimb><dEst>001</dEst><dPunExp>003</dPunExp>
//!     <dNumDoc>7</dNumDoc></gTimb></DE></rDE>"#;
//! let layout = KudeLayout::from_document(&SifenDocument::parse(xml).unwrap());
//! assert_eq!(layout.file_name, "Factura_001_003_0000007.pdf");
//! assert!(layout.html.contains("type='QR'"));
//! ```

pub mod format;
mod layout;
mod render;

pub use layout::{
    BarcodeDirective, ErrorCorrection, KUDE_CSS, KudeLayout, VERIFICATION_HINT_URL,
};
pub use render::{PdfRenderer, RenderedKude, render_kude};
