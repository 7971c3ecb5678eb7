//! Client for the invoicing backend's document API.
//!
//! Creates documents from a [`CompleteInvoiceStructure`](crate::core::CompleteInvoiceStructure)
//! and lists previously created ones with their SIFEN status.

mod client;
mod types;

pub use client::{ApiConfig, DocumentApi};
pub use types::{
    CreatedDocument, DocumentItem, DocumentList, DocumentStatus, ListDocumentsParams, Lote,
    Pagination, SortOrder,
};
