use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::units::TaxType;

/// Invoice as composed in the form: recipient, payment condition and lines.
///
/// Totals are not stored; [`UiInvoice::totals`] derives them from the items
/// on every call so they can never go stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiInvoice {
    /// Selected recipient. Required by the transformer.
    #[serde(rename = "cliente")]
    pub client: Option<UiClient>,
    /// Payment condition label ("contado", "credito", ...).
    #[serde(rename = "condicionPago")]
    pub payment_condition: String,
    pub items: Vec<UiLineItem>,
}

/// Recipient as selected in the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiClient {
    #[serde(default)]
    pub id: Option<String>,
    /// Legal name.
    #[serde(rename = "nombre", default)]
    pub name: String,
    /// Tax ID as typed, e.g. "80012345-6".
    #[serde(default)]
    pub ruc: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Form line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiLineItem {
    pub id: String,
    #[serde(rename = "codigo", default)]
    pub code: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    /// Unit label ("UNI", "KG", ...). Unknown labels are sent as UNI.
    #[serde(rename = "unidad", default)]
    pub unit: String,
    #[serde(rename = "cantidad")]
    pub quantity: Decimal,
    #[serde(rename = "precio")]
    pub unit_price: Decimal,
    #[serde(rename = "tipoIva")]
    pub tax_type: TaxType,
}

impl UiLineItem {
    /// Quantity times unit price, unrounded.
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Totals derived from the line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UiTotals {
    #[serde(rename = "subtotalExentas")]
    pub exempt: Decimal,
    #[serde(rename = "subtotal5")]
    pub taxed_5: Decimal,
    #[serde(rename = "subtotal10")]
    pub taxed_10: Decimal,
    #[serde(rename = "totalVenta")]
    pub total: Decimal,
    #[serde(rename = "totalIva")]
    pub total_tax: Decimal,
}

impl UiInvoice {
    pub fn new(client: UiClient, payment_condition: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            payment_condition: payment_condition.into(),
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: UiLineItem) {
        self.items.push(item);
    }

    /// Remove the item with the given id. Returns whether anything was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Recompute the totals from the current items.
    pub fn totals(&self) -> UiTotals {
        let mut totals = UiTotals::default();
        for item in &self.items {
            let subtotal = item.subtotal();
            match item.tax_type {
                TaxType::Exentas => totals.exempt += subtotal,
                TaxType::Iva5 => totals.taxed_5 += subtotal,
                TaxType::Iva10 => totals.taxed_10 += subtotal,
            }
        }
        totals.total = totals.exempt + totals.taxed_5 + totals.taxed_10;
        totals.total_tax =
            totals.taxed_5 * Decimal::new(5, 2) + totals.taxed_10 * Decimal::new(10, 2);
        totals
    }
}
