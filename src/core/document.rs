//! Backend document-creation payload (`POST /generar-documento/crear`).
//!
//! Field names follow the backend contract, so they are Spanish and
//! serialized in camelCase. Amounts go over the wire as JSON numbers.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete document structure expected by the invoicing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteInvoiceStructure {
    /// 1 = electronic invoice.
    pub tipo_documento: u8,
    pub establecimiento: String,
    pub punto: String,
    pub numero: u32,
    pub codigo_seguridad_aleatorio: String,
    pub descripcion: String,
    pub observacion: String,
    pub fecha: NaiveDateTime,
    pub tipo_emision: u8,
    pub tipo_transaccion: u8,
    pub tipo_impuesto: u8,
    pub moneda: String,
    pub condicion_anticipo: u8,
    pub condicion_tipo_cambio: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub descuento_global: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub anticipo_global: Decimal,
    pub cambio: String,
    pub factura: InvoiceFactura,
    pub cliente: InvoiceCliente,
    pub usuario: InvoiceUsuario,
    pub condicion: InvoiceCondicion,
    pub items: Vec<InvoiceItemApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFactura {
    /// Buyer presence indicator; 1 = in-person operation.
    pub presencia: u8,
    pub fecha: NaiveDateTime,
}

/// Recipient block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCliente {
    pub contribuyente: bool,
    pub razon_social: String,
    pub tipo_operacion: u8,
    pub tipo_contribuyente: u8,
    pub direccion: String,
    pub numero_casa: String,
    pub departamento: u16,
    pub departamento_descripcion: String,
    pub distrito: u16,
    pub distrito_descripcion: String,
    pub ciudad: u16,
    pub ciudad_descripcion: String,
    pub pais: String,
    pub pais_descripcion: String,
    pub telefono: String,
    pub celular: String,
    pub email: String,
    pub codigo: String,
    /// Tax ID exactly as entered.
    pub ruc: String,
    pub documento_tipo: u8,
    /// Tax ID with every non-digit removed.
    pub documento_numero: String,
}

/// Operator issuing the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUsuario {
    pub documento_tipo: u8,
    pub documento_numero: String,
    pub nombre: String,
    pub cargo: String,
}

impl Default for InvoiceUsuario {
    fn default() -> Self {
        Self {
            documento_tipo: 1,
            documento_numero: "157264".to_string(),
            nombre: "Juan Pérez".to_string(),
            cargo: "Vendedor".to_string(),
        }
    }
}

/// Payment condition with its installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCondicion {
    /// 1 = cash.
    pub tipo: u8,
    pub entregas: Vec<InvoiceEntrega>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntrega {
    pub tipo: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
    pub moneda: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cambio: Decimal,
}

/// Line item as the backend expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemApi {
    pub codigo: String,
    pub descripcion: String,
    pub observacion: String,
    /// SIFEN unit code, see [`crate::core::units::UnitOfMeasure`].
    pub unidad_medida: u16,
    #[serde(with = "rust_decimal::serde::float")]
    pub cantidad: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cambio: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub descuento: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub anticipo: Decimal,
    pub pais: String,
    pub pais_descripcion: String,
    /// 0 exempt, 1 IVA 5%, 2 IVA 10%.
    pub iva_tipo: u8,
    pub iva_base: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub iva: Decimal,
}
