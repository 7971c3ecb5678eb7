use rust_decimal::Decimal;
use serde::Serialize;

/// Display fields read from one signed SIFEN document.
///
/// Text fields are empty when the XML node is missing; numeric fields are
/// `None` when missing or not a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceDocumentFields {
    pub emitter: Emitter,
    pub receiver: Receiver,
    pub document: DocumentMeta,
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

/// Issuer block (`gEmis`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Emitter {
    pub name: String,
    pub ruc: String,
    pub check_digit: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub department: String,
    pub city: String,
    /// First economic activity description.
    pub activity: String,
}

/// Recipient block (`gDatRec`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Receiver {
    pub name: String,
    pub ruc: String,
    pub check_digit: String,
    pub client_code: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    /// Stamp (timbrado) number.
    pub stamp_number: String,
    pub establishment: String,
    pub issue_point: String,
    /// Document number, zero-padded to 7 digits.
    pub number: String,
    /// CDC, taken from the `Id` attribute of `DE`.
    pub cdc: String,
    /// `dFeEmiDE`, e.g. `2024-03-15T10:30:00`.
    pub issue_date: String,
    /// Stamp validity date (`dFeIniT`), e.g. `2024-01-01`.
    pub stamp_validity: String,
    pub payment_condition: String,
    pub transaction_type: String,
    pub currency: String,
    pub exchange_rate: String,
}

impl DocumentMeta {
    /// `001-001-0000123`.
    pub fn full_number(&self) -> String {
        format!("{}-{}-{}", self.establishment, self.issue_point, self.number)
    }
}

/// One `gCamItem`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub code: String,
    pub description: String,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total: Option<Decimal>,
    /// Unit description (`dDesUniMed`).
    pub unit: String,
    /// IVA percentage (0, 5 or 10).
    pub tax_rate: Option<Decimal>,
}

/// Subtotals block (`gTotSub`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub exempt: Option<Decimal>,
    pub taxed_5: Option<Decimal>,
    pub taxed_10: Option<Decimal>,
    pub tax_5: Option<Decimal>,
    pub tax_10: Option<Decimal>,
    pub total_tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
}
