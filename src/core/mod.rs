//! Core invoice model and the form-to-backend transformer.
//!
//! This module holds the simplified form invoice ([`UiInvoice`]), the tax and
//! unit code tables, the backend wire model ([`CompleteInvoiceStructure`]),
//! and [`InvoiceTransformer`] which maps one onto the other.

mod document;
mod error;
mod lookup;
mod transform;
mod types;
pub mod units;

pub use document::*;
pub use error::*;
pub use lookup::*;
pub use transform::*;
pub use types::*;
pub use units::{TaxType, UnitOfMeasure, unit_code};
