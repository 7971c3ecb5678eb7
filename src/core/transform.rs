use chrono::{Local, NaiveDateTime, Timelike};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::document::*;
use super::error::KudeError;
use super::lookup::{FixedLocality, LocalityLookup, PaymentPlan, SingleInstallment};
use super::types::{UiClient, UiInvoice, UiLineItem};
use super::units::unit_code;

/// Static defaults applied when an override is absent.
pub mod defaults {
    pub const TIPO_DOCUMENTO: u8 = 1;
    pub const ESTABLECIMIENTO: &str = "001";
    pub const PUNTO: &str = "001";
    pub const NUMERO: u32 = 10;
    pub const DESCRIPCION: &str = "Factura electrónica";
    pub const OBSERVACION: &str = "";
    pub const TIPO_EMISION: u8 = 1;
    pub const TIPO_TRANSACCION: u8 = 2;
    pub const TIPO_IMPUESTO: u8 = 1;
    pub const MONEDA: &str = "PYG";
    pub const CONDICION_ANTICIPO: u8 = 0;
    pub const CONDICION_TIPO_CAMBIO: u8 = 0;
    pub const CAMBIO: &str = "";
    pub const PRESENCIA: u8 = 1;

    pub const CLIENTE_TIPO_OPERACION: u8 = 1;
    pub const CLIENTE_TIPO_CONTRIBUYENTE: u8 = 2;
    pub const CLIENTE_NUMERO_CASA: &str = "0";
    pub const CLIENTE_CODIGO: &str = "026";
    pub const CLIENTE_DOCUMENTO_TIPO: u8 = 1;

    pub const PAIS: &str = "PRY";
    pub const PAIS_DESCRIPCION: &str = "Paraguay";
    pub const IVA_BASE: u8 = 100;
}

/// Document-level values supplied by the caller. Every `None` falls back to
/// the matching constant in [`defaults`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadataOverrides {
    pub tipo_documento: Option<u8>,
    pub establecimiento: Option<String>,
    pub punto: Option<String>,
    pub numero: Option<u32>,
    pub codigo_seguridad_aleatorio: Option<String>,
    pub descripcion: Option<String>,
    pub observacion: Option<String>,
    pub fecha: Option<NaiveDateTime>,
    pub tipo_emision: Option<u8>,
    pub tipo_transaccion: Option<u8>,
    pub tipo_impuesto: Option<u8>,
    pub moneda: Option<String>,
    pub condicion_anticipo: Option<u8>,
    pub condicion_tipo_cambio: Option<u8>,
    pub descuento_global: Option<Decimal>,
    pub anticipo_global: Option<Decimal>,
    pub cambio: Option<String>,
    pub usuario: Option<InvoiceUsuario>,
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;
type CodeSource = Box<dyn Fn() -> String + Send + Sync>;

/// Maps a [`UiInvoice`] to the backend's [`CompleteInvoiceStructure`].
///
/// The geography lookup, payment plan, clock and security-code source are
/// replaceable; with fixed ones the transform is fully deterministic.
///
/// ```
/// use kude::core::*;
/// use rust_decimal_macros::dec;
///
/// let mut ui = UiInvoice::new(
///     UiClient { name: "Cliente SA".into(), ruc: "80012345-6".into(), ..Default::default() },
///     "contado",
/// );
/// ui.add_item(UiLineItem {
///     id: "1".into(),
///     code: "001".into(),
///     description: "Arroz".into(),
///     unit: "KG".into(),
///     quantity: dec!(2),
///     unit_price: dec!(7500),
///     tax_type: TaxType::Iva5,
/// });
///
/// let doc = transform(&ui, &DocumentMetadataOverrides::default()).unwrap();
/// assert_eq!(doc.cliente.documento_numero, "800123456");
/// assert_eq!(doc.items[0].unidad_medida, 78);
/// ```
pub struct InvoiceTransformer {
    locality: Box<dyn LocalityLookup>,
    payment_plan: Box<dyn PaymentPlan>,
    clock: Clock,
    security_code: CodeSource,
}

impl Default for InvoiceTransformer {
    fn default() -> Self {
        Self {
            locality: Box::new(FixedLocality::default()),
            payment_plan: Box::new(SingleInstallment),
            clock: Box::new(|| {
                let now = Local::now().naive_local();
                now.with_nanosecond(0).unwrap_or(now)
            }),
            security_code: Box::new(random_security_code),
        }
    }
}

impl InvoiceTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locality(mut self, lookup: impl LocalityLookup + 'static) -> Self {
        self.locality = Box::new(lookup);
        self
    }

    pub fn payment_plan(mut self, plan: impl PaymentPlan + 'static) -> Self {
        self.payment_plan = Box::new(plan);
        self
    }

    pub fn clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn security_code(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.security_code = Box::new(source);
        self
    }

    /// Build the backend payload.
    ///
    /// # Errors
    ///
    /// [`KudeError::MissingClient`] when the invoice has no recipient.
    pub fn transform(
        &self,
        ui: &UiInvoice,
        overrides: &DocumentMetadataOverrides,
    ) -> Result<CompleteInvoiceStructure, KudeError> {
        let client = ui.client.as_ref().ok_or(KudeError::MissingClient)?;

        let fecha = overrides.fecha.unwrap_or_else(|| (self.clock)());
        let moneda = overrides
            .moneda
            .clone()
            .unwrap_or_else(|| defaults::MONEDA.to_string());
        let totals = ui.totals();

        let doc = CompleteInvoiceStructure {
            tipo_documento: overrides.tipo_documento.unwrap_or(defaults::TIPO_DOCUMENTO),
            establecimiento: or_default(&overrides.establecimiento, defaults::ESTABLECIMIENTO),
            punto: or_default(&overrides.punto, defaults::PUNTO),
            numero: overrides.numero.unwrap_or(defaults::NUMERO),
            codigo_seguridad_aleatorio: overrides
                .codigo_seguridad_aleatorio
                .clone()
                .unwrap_or_else(|| (self.security_code)()),
            descripcion: or_default(&overrides.descripcion, defaults::DESCRIPCION),
            observacion: or_default(&overrides.observacion, defaults::OBSERVACION),
            fecha,
            tipo_emision: overrides.tipo_emision.unwrap_or(defaults::TIPO_EMISION),
            tipo_transaccion: overrides
                .tipo_transaccion
                .unwrap_or(defaults::TIPO_TRANSACCION),
            tipo_impuesto: overrides.tipo_impuesto.unwrap_or(defaults::TIPO_IMPUESTO),
            moneda: moneda.clone(),
            condicion_anticipo: overrides
                .condicion_anticipo
                .unwrap_or(defaults::CONDICION_ANTICIPO),
            condicion_tipo_cambio: overrides
                .condicion_tipo_cambio
                .unwrap_or(defaults::CONDICION_TIPO_CAMBIO),
            descuento_global: overrides.descuento_global.unwrap_or(Decimal::ZERO),
            anticipo_global: overrides.anticipo_global.unwrap_or(Decimal::ZERO),
            cambio: or_default(&overrides.cambio, defaults::CAMBIO),
            factura: InvoiceFactura {
                presencia: defaults::PRESENCIA,
                fecha,
            },
            cliente: self.transform_client(client),
            usuario: overrides.usuario.clone().unwrap_or_default(),
            condicion: self
                .payment_plan
                .condition(&ui.payment_condition, totals.total, &moneda),
            items: ui.items.iter().map(transform_item).collect(),
        };

        tracing::debug!(
            items = doc.items.len(),
            total = %totals.total,
            "built document payload"
        );
        Ok(doc)
    }

    fn transform_client(&self, client: &UiClient) -> InvoiceCliente {
        let loc = self.locality.locality(client);
        InvoiceCliente {
            contribuyente: true,
            razon_social: client.name.clone(),
            tipo_operacion: defaults::CLIENTE_TIPO_OPERACION,
            tipo_contribuyente: defaults::CLIENTE_TIPO_CONTRIBUYENTE,
            direccion: client.address.clone(),
            numero_casa: defaults::CLIENTE_NUMERO_CASA.to_string(),
            departamento: loc.department,
            departamento_descripcion: loc.department_name,
            distrito: loc.district,
            distrito_descripcion: loc.district_name,
            ciudad: loc.city,
            ciudad_descripcion: loc.city_name,
            pais: defaults::PAIS.to_string(),
            pais_descripcion: defaults::PAIS_DESCRIPCION.to_string(),
            telefono: client.phone.clone(),
            celular: client.phone.clone(),
            email: client.email.clone(),
            codigo: defaults::CLIENTE_CODIGO.to_string(),
            ruc: client.ruc.clone(),
            documento_tipo: defaults::CLIENTE_DOCUMENTO_TIPO,
            documento_numero: digits_only(&client.ruc),
        }
    }
}

/// Transform with the default lookups, the local clock and a random
/// security code.
pub fn transform(
    ui: &UiInvoice,
    overrides: &DocumentMetadataOverrides,
) -> Result<CompleteInvoiceStructure, KudeError> {
    InvoiceTransformer::default().transform(ui, overrides)
}

fn transform_item(item: &UiLineItem) -> InvoiceItemApi {
    InvoiceItemApi {
        codigo: item.code.clone(),
        descripcion: item.description.clone(),
        observacion: String::new(),
        unidad_medida: unit_code(&item.unit),
        cantidad: item.quantity,
        precio_unitario: item.unit_price,
        cambio: Decimal::ZERO,
        descuento: Decimal::ZERO,
        anticipo: Decimal::ZERO,
        pais: defaults::PAIS.to_string(),
        pais_descripcion: defaults::PAIS_DESCRIPCION.to_string(),
        iva_tipo: item.tax_type.code(),
        iva_base: defaults::IVA_BASE,
        iva: item.tax_type.rate(),
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

/// Strip everything but ASCII digits ("80012345-6" -> "800123456").
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Random six-digit code in `100000..=999999`.
pub fn random_security_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}
