//! # kude
//!
//! Paraguayan SIFEN e-invoicing toolkit: builds backend invoice payloads from
//! a simplified form model, reads signed SIFEN XML, repairs the embedded QR
//! verification URL and assembles the printable KuDE.
//!
//! All monetary values use [`rust_decimal::Decimal`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kude::core::*;
//! use rust_decimal_macros::dec;
//!
//! let mut ui = UiInvoice::new(UiClient {
//!     name: "Cliente SA".into(),
//!     ruc: "80012345-6".into(),
//!     ..Default::default()
//! }, "contado");
//! ui.add_item(UiLineItem {
//!     id: "1".into(),
//!     code: "S-01".into(),
//!     description: "Servicio".into(),
//!     unit: "UNI".into(),
//!     quantity: dec!(2),
//!     unit_price: dec!(55000),
//!     tax_type: TaxType::Iva10,
//! });
//!
//! assert_eq!(ui.totals().total, dec!(110000));
//!
//! let doc = transform(&ui, &DocumentMetadataOverrides::default()).unwrap();
//! assert_eq!(doc.cliente.documento_numero, "800123456");
//! assert_eq!(doc.items[0].iva_tipo, 2);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Form model, code tables, backend wire model, transformer |
//! | `qr` | QR verification URL normalization |
//! | `sifen` | Field and QR extraction from signed XML |
//! | `kude` | KuDE HTML layout and the PDF renderer seam |
//! | `api` | Backend document API client |
//! | `server` | HTTP PDF endpoint and the `kude-server` binary |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "qr")]
pub mod qr;

#[cfg(feature = "sifen")]
pub mod sifen;

#[cfg(feature = "kude")]
pub mod kude;

#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "server")]
pub mod server;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
