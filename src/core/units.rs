//! SIFEN unit-of-measure and IVA tax-type code tables.
//!
//! Both tables are closed enums so that adding a unit or a tax bracket is a
//! one-line edit, and every `match` over them is checked for exhaustiveness.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit of measure as chosen in the invoice form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitOfMeasure {
    /// Unit (piece).
    Uni,
    /// Kilogram.
    Kg,
    /// Litre.
    L,
    /// Metre.
    M,
    /// Square metre.
    M2,
    /// Cubic metre.
    M3,
}

impl UnitOfMeasure {
    pub const ALL: [Self; 6] = [Self::Uni, Self::Kg, Self::L, Self::M, Self::M2, Self::M3];

    /// SIFEN numeric unit code (`cUniMed`).
    pub fn code(self) -> u16 {
        match self {
            Self::Uni => 77,
            Self::Kg => 78,
            Self::L => 79,
            Self::M => 80,
            Self::M2 => 81,
            Self::M3 => 82,
        }
    }

    /// Form label for this unit.
    pub fn label(self) -> &'static str {
        match self {
            Self::Uni => "UNI",
            Self::Kg => "KG",
            Self::L => "L",
            Self::M => "M",
            Self::M2 => "M2",
            Self::M3 => "M3",
        }
    }

    /// Exact label lookup. Returns `None` for anything outside the table.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.label() == label)
    }

    /// Map a free-text unit name ("Kilogramo", "metro cuadrado", "kg") to a unit.
    ///
    /// Falls back to [`UnitOfMeasure::Uni`] when nothing matches.
    pub fn from_description(description: &str) -> Self {
        let upper = description.trim().to_uppercase();
        if let Some(unit) = Self::from_label(&upper) {
            return unit;
        }

        let lower = description.to_lowercase();
        if lower.contains("unidad") {
            Self::Uni
        } else if lower.contains("kilo") {
            Self::Kg
        } else if lower.contains("litro") {
            Self::L
        } else if lower.contains("metro") {
            if lower.contains("cuadrado") {
                Self::M2
            } else if lower.contains("cúbico") || lower.contains("cubico") {
                Self::M3
            } else {
                Self::M
            }
        } else {
            Self::Uni
        }
    }
}

/// Numeric SIFEN unit code for a form label; unknown labels map to UNI (77).
pub fn unit_code(label: &str) -> u16 {
    UnitOfMeasure::from_label(label)
        .unwrap_or(UnitOfMeasure::Uni)
        .code()
}

/// IVA classification of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// Exempt.
    Exentas,
    /// 5% IVA.
    Iva5,
    /// 10% IVA.
    Iva10,
}

impl TaxType {
    pub const ALL: [Self; 3] = [Self::Exentas, Self::Iva5, Self::Iva10];

    /// Backend tax-type code (`ivaTipo`).
    pub fn code(self) -> u8 {
        match self {
            Self::Exentas => 0,
            Self::Iva5 => 1,
            Self::Iva10 => 2,
        }
    }

    /// Tax percentage (`iva`).
    pub fn rate(self) -> Decimal {
        match self {
            Self::Exentas => Decimal::ZERO,
            Self::Iva5 => Decimal::from(5),
            Self::Iva10 => Decimal::from(10),
        }
    }

    /// Form tag ("exentas", "iva5", "iva10").
    pub fn tag(self) -> &'static str {
        match self {
            Self::Exentas => "exentas",
            Self::Iva5 => "iva5",
            Self::Iva10 => "iva10",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Classify a product's IVA percentage. Rates other than 0 and 5 are
    /// treated as the general 10% bracket.
    pub fn from_rate(rate: Decimal) -> Self {
        if rate.is_zero() {
            Self::Exentas
        } else if rate == Decimal::from(5) {
            Self::Iva5
        } else {
            Self::Iva10
        }
    }
}
