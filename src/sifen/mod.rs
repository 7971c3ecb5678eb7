//! Field extraction from signed SIFEN documents.
//!
//! A signed document is an `rDE` element, sometimes wrapped in a SET
//! response envelope. [`SifenDocument::parse`] cuts out the `rDE`, parses
//! it once with `quick-xml`, and collects the fields printed on the KuDE.
//!
//! Unparseable XML is an error. A missing field is not: it is simply left
//! empty.
//!
//! ```
//! use kude::sifen::SifenDocument;
//!
//! let xml = r#"<rDE><DE Id="0180"><gTimb><dEst>001</dEst></gTimb></DE></rDE>"#;
//! let doc = SifenDocument::parse(xml).unwrap();
//! assert_eq!(doc.fields().document.establishment, "001");
//! assert!(doc.qr_fragment().is_none());
//! assert!(doc.verification_url().as_str().ends_with("?cdc=0180"));
//! ```

mod extract;
mod fields;

pub use extract::{SifenDocument, extract_invoice_fields, extract_qr_fragment, isolate_document};
pub use fields::*;
