//! Replaceable lookups used by the transformer.
//!
//! Geography and payment installments are not derived from the form yet:
//! the defaults here are a single fixed locality and a single cash
//! installment. Both sit behind traits so real tables can be plugged in
//! without touching [`InvoiceTransformer`](super::InvoiceTransformer).

use rust_decimal::Decimal;

use super::document::{InvoiceCondicion, InvoiceEntrega};
use super::types::UiClient;

/// Department, district and city codes with their descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub department: u16,
    pub department_name: String,
    pub district: u16,
    pub district_name: String,
    pub city: u16,
    pub city_name: String,
}

impl Locality {
    /// Ciudad del Este, Alto Paraná.
    pub fn ciudad_del_este() -> Self {
        Self {
            department: 11,
            department_name: "ALTO PARANA".to_string(),
            district: 173,
            district_name: "CIUDAD DEL ESTE".to_string(),
            city: 4278,
            city_name: "CIUDAD DEL ESTE".to_string(),
        }
    }
}

/// Resolves the geographic codes for a recipient.
pub trait LocalityLookup: Send + Sync {
    fn locality(&self, client: &UiClient) -> Locality;
}

/// Returns the same locality for every client.
#[derive(Debug, Clone)]
pub struct FixedLocality(pub Locality);

impl Default for FixedLocality {
    fn default() -> Self {
        Self(Locality::ciudad_del_este())
    }
}

impl LocalityLookup for FixedLocality {
    fn locality(&self, _client: &UiClient) -> Locality {
        self.0.clone()
    }
}

impl<F> LocalityLookup for F
where
    F: Fn(&UiClient) -> Locality + Send + Sync,
{
    fn locality(&self, client: &UiClient) -> Locality {
        self(client)
    }
}

/// Builds the payment condition block from the form's condition label.
pub trait PaymentPlan: Send + Sync {
    fn condition(&self, label: &str, total: Decimal, currency: &str) -> InvoiceCondicion;
}

/// One cash installment covering the whole total, whatever the label says.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleInstallment;

impl PaymentPlan for SingleInstallment {
    fn condition(&self, _label: &str, total: Decimal, currency: &str) -> InvoiceCondicion {
        InvoiceCondicion {
            tipo: 1,
            entregas: vec![InvoiceEntrega {
                tipo: 1,
                monto: total,
                moneda: currency.to_string(),
                cambio: Decimal::ZERO,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_locality_ignores_client() {
        let lookup = FixedLocality::default();
        let client = UiClient {
            address: "Asunción".into(),
            ..Default::default()
        };
        let loc = lookup.locality(&client);
        assert_eq!(loc.department, 11);
        assert_eq!(loc.district, 173);
        assert_eq!(loc.city, 4278);
        assert_eq!(loc.city_name, "CIUDAD DEL ESTE");
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |_: &UiClient| Locality {
            department: 1,
            department_name: "CAPITAL".into(),
            district: 1,
            district_name: "ASUNCION (DISTRITO)".into(),
            city: 1,
            city_name: "ASUNCION (DISTRITO)".into(),
        };
        assert_eq!(lookup.locality(&UiClient::default()).department_name, "CAPITAL");
    }

    #[test]
    fn single_installment_covers_total() {
        let cond = SingleInstallment.condition("credito", dec!(150000), "PYG");
        assert_eq!(cond.tipo, 1);
        assert_eq!(cond.entregas.len(), 1);
        assert_eq!(cond.entregas[0].monto, dec!(150000));
        assert_eq!(cond.entregas[0].moneda, "PYG");
        assert_eq!(cond.entregas[0].cambio, Decimal::ZERO);
    }
}
