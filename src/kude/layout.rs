use std::fmt::Write;

use quick_xml::escape::escape;
use rust_decimal::Decimal;
use serde::Serialize;

use super::format::*;
use crate::qr::CanonicalQrUrl;
use crate::sifen::{InvoiceDocumentFields, LineItem, SifenDocument};

/// Verification hint printed next to the QR.
pub const VERIFICATION_HINT_URL: &str = "https://ekuatia.set.gov.py/consultas/";

const LEGAL_FOOTER: &str = "Si su documento electrónico presenta algún error puede solicitar \
    la modificación dentro de las 72 horas siguientes de la emisión de este comprobante.";

/// Stylesheet shared by every KuDE.
pub const KUDE_CSS: &str = r#"
body { font-family: 'DejaVu Sans', Arial, sans-serif; font-size: 9px; color: #333; line-height: 1.4; }
.status-badge { background: #c0392b; color: #fff; padding: 8px 15px; font-size: 10px; font-weight: bold; text-align: center; margin-bottom: 15px; }
.document-title { background: #2c3e50; color: #fff; text-align: center; padding: 12px; font-size: 11px; font-weight: bold; }
.main-header, .info-section, .footer-section { border: 2px solid #34495e; padding: 15px; margin-bottom: 10px; background: #f8f9fa; }
.company-activity { font-size: 8px; color: #666; font-style: italic; margin-bottom: 8px; }
.header-left { width: 60%; float: left; }
.header-right { width: 35%; float: right; text-align: right; background: #ecf0f1; padding: 10px; border-left: 4px solid #5a6c7d; }
.invoice-number { background: #5a6c7d; color: #fff; padding: 8px 12px; font-size: 12px; font-weight: bold; margin-top: 10px; }
.section-title { font-size: 10px; font-weight: bold; color: #2c3e50; border-bottom: 2px solid #5a6c7d; padding-bottom: 5px; margin-bottom: 10px; }
.info-left { width: 48%; float: left; }
.info-right { width: 48%; float: right; }
.clearfix::after { content: ''; display: table; clear: both; }
.items-table { width: 100%; border-collapse: collapse; margin-bottom: 10px; }
.items-table th { background: #34495e; color: #fff; padding: 10px 6px; font-size: 8px; }
.items-table td { border: 1px solid #bdc3c7; padding: 8px 6px; text-align: center; font-size: 8px; }
.desc-col { text-align: left; }
.num-col { text-align: right; font-family: monospace; padding-right: 8px; }
.totals-row td { background: #ecf0f1; font-weight: bold; }
.final-total td { background: #34495e; color: #fff; font-size: 10px; }
.tax-summary { background: #7f8c8d; color: #fff; padding: 12px; margin: 10px 0; font-size: 10px; text-align: right; }
.tax-item { margin: 0 15px; font-weight: bold; }
.qr-section { width: 25%; float: left; text-align: center; }
.verification-section { width: 70%; float: right; padding-left: 15px; }
.highlight-box { background: #e8f4f8; border-left: 4px solid #5a6c7d; padding: 10px; margin: 10px 0; }
.verification-url { color: #5a6c7d; font-weight: bold; font-size: 10px; }
.cdc-display { font-size: 11px; font-weight: bold; text-align: center; margin: 15px 0; letter-spacing: 1px; padding: 10px; background: #ecf0f1; font-family: monospace; }
.legal-footer { font-size: 8px; text-align: center; margin-top: 15px; background: #2c3e50; color: #fff; padding: 10px; }
"#;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

/// Instruction for the PDF engine to draw a QR barcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeDirective {
    pub payload: CanonicalQrUrl,
    pub error_correction: ErrorCorrection,
    /// Scale factor relative to the engine's default module size.
    pub size: f32,
}

impl BarcodeDirective {
    pub fn qr(payload: CanonicalQrUrl) -> Self {
        Self {
            payload,
            error_correction: ErrorCorrection::L,
            size: 1.6,
        }
    }

    /// `<barcode>` element understood by HTML-to-PDF engines with barcode support.
    pub fn markup(&self) -> String {
        format!(
            "<barcode code='{}' type='QR' class='qr-code' size='{}' error='{}' />",
            escape(self.payload.as_str()),
            self.size,
            self.error_correction.as_str()
        )
    }
}

/// Everything the PDF engine needs to draw one KuDE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KudeLayout {
    pub css: &'static str,
    /// Body fragment; contains the barcode markup.
    pub html: String,
    pub barcode: BarcodeDirective,
    /// `Factura_001_001_0000123.pdf`.
    pub file_name: String,
}

impl KudeLayout {
    pub fn from_document(doc: &SifenDocument) -> Self {
        Self::build(doc.fields(), doc.verification_url())
    }

    pub fn build(fields: &InvoiceDocumentFields, qr: CanonicalQrUrl) -> Self {
        let barcode = BarcodeDirective::qr(qr);
        let d = &fields.document;
        Self {
            css: KUDE_CSS,
            html: body(fields, &barcode),
            barcode,
            file_name: format!(
                "Factura_{}_{}_{}.pdf",
                file_part(&d.establishment),
                file_part(&d.issue_point),
                file_part(&d.number)
            ),
        }
    }

    /// Stand-alone HTML page with the stylesheet inlined.
    pub fn to_html_document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><style>{}</style></head><body>{}</body></html>\n",
            self.css, self.html
        )
    }
}

fn esc(s: &str) -> std::borrow::Cow<'_, str> {
    escape(s)
}

/// Amount shown in a rate column: the line total when the rate matches.
fn rate_column(item: &LineItem, rate: i64) -> String {
    let matches = item.tax_rate.unwrap_or_default() == Decimal::from(rate);
    if matches {
        format_amount(item.total)
    } else {
        "0".to_string()
    }
}

fn body(f: &InvoiceDocumentFields, barcode: &BarcodeDirective) -> String {
    let e = &f.emitter;
    let r = &f.receiver;
    let d = &f.document;
    let t = &f.totals;
    let exchange_rate = if d.exchange_rate.is_empty() {
        "1"
    } else {
        d.exchange_rate.as_str()
    };

    let mut h = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        h,
        "<div class='status-badge'>KuDE de FACTURA ELECTRONICA</div>\
         <div class='document-title'>{name}</div>\
         <div class='main-header clearfix'>\
         <div class='header-left'>\
         <div class='company-activity'>{activity}</div>\
         <strong>Dirección:</strong> {address}<br>\
         <strong>Ciudad:</strong> {city} - {department} - PARAGUAY<br>\
         <strong>Teléfono:</strong> {phone} <strong>Correo:</strong> {email}\
         </div>\
         <div class='header-right'>\
         <strong>RUC:</strong> {ruc}-{dv}<br>\
         <strong>Timbrado N°:</strong> {stamp}<br>\
         <strong>Inicio de vigencia:</strong> {validity}<br>\
         <div class='invoice-number'>Factura Electrónica<br>{number}</div>\
         </div></div>",
        name = esc(&e.name),
        activity = esc(&e.activity),
        address = esc(&e.address),
        city = esc(&e.city),
        department = esc(&e.department),
        phone = esc(&e.phone),
        email = esc(&e.email),
        ruc = esc(&e.ruc),
        dv = esc(&e.check_digit),
        stamp = esc(&d.stamp_number),
        validity = esc(&format_date(&d.stamp_validity)),
        number = esc(&d.full_number()),
    );

    let _ = write!(
        h,
        "<div class='info-section clearfix'>\
         <div class='info-left'>\
         <div class='section-title'>Información de Emisión</div>\
         <strong>Fecha y hora de emisión:</strong> {issued}<br>\
         <strong>Condición de venta:</strong> {condition}<br>\
         <strong>Moneda:</strong> {currency} <strong>Tipo de cambio:</strong> {rate}\
         </div>\
         <div class='info-right'>\
         <div class='section-title'>Datos del Cliente</div>\
         <strong>Nombre o Razón Social:</strong> {name}<br>\
         <strong>RUC/Documento de identidad N°:</strong> {ruc}-{dv}<br>",
        issued = esc(&format_issue_date(&d.issue_date)),
        condition = esc(&d.payment_condition),
        currency = esc(&d.currency),
        rate = esc(exchange_rate),
        name = esc(&r.name),
        ruc = esc(&r.ruc),
        dv = esc(&r.check_digit),
    );
    for (label, value) in [
        ("Correo", &r.email),
        ("Dirección", &r.address),
        ("Teléfono", &r.phone),
        ("Código Cliente", &r.client_code),
    ] {
        if !value.is_empty() {
            let _ = write!(h, "<strong>{label}:</strong> {}<br>", esc(value));
        }
    }
    h.push_str("</div></div>");

    h.push_str(
        "<table class='items-table'><thead><tr>\
         <th style='width: 10%;'>Código</th>\
         <th style='width: 25%;'>Descripción</th>\
         <th style='width: 8%;'>Cantidad</th>\
         <th style='width: 12%;'>Precio</th>\
         <th style='width: 12%;'>Exentas</th>\
         <th style='width: 12%;'>5%</th>\
         <th style='width: 15%;'>10%</th>\
         </tr></thead><tbody>",
    );
    for item in &f.items {
        let _ = write!(
            h,
            "<tr><td>{code}</td><td class='desc-col'>{desc}</td><td>{qty}</td>\
             <td class='num-col'>{price}</td><td class='num-col'>{exe}</td>\
             <td class='num-col'>{g5}</td><td class='num-col'>{g10}</td></tr>",
            code = esc(&item.code),
            desc = esc(&item.description),
            qty = format_quantity(item.quantity),
            price = format_amount(item.unit_price),
            exe = rate_column(item, 0),
            g5 = rate_column(item, 5),
            g10 = rate_column(item, 10),
        );
    }
    let _ = write!(
        h,
        "<tr class='totals-row'><td colspan='4'><strong>Subtotal:</strong></td>\
         <td class='num-col'><strong>{exe}</strong></td>\
         <td class='num-col'><strong>{g5}</strong></td>\
         <td class='num-col'><strong>{g10}</strong></td></tr>\
         <tr class='final-total'><td colspan='6'><strong>Total a Pagar:</strong></td>\
         <td class='num-col'><strong>{total}</strong></td></tr>\
         <tr class='final-total'><td colspan='7' style='text-align: right;'>\
         <strong>Total Guaraníes: {total}</strong></td></tr>\
         </tbody></table>\
         <div class='tax-summary'>\
         <span class='tax-item'>Liquidación Iva: (5%) {iva5}</span>\
         <span class='tax-item'>(10%) {iva10}</span>\
         <span class='tax-item'><strong>Total Iva: {iva}</strong></span>\
         </div>",
        exe = format_amount(t.exempt),
        g5 = format_amount(t.taxed_5),
        g10 = format_amount(t.taxed_10),
        total = format_amount(t.grand_total),
        iva5 = format_amount(t.tax_5),
        iva10 = format_amount(t.tax_10),
        iva = format_amount(t.total_tax),
    );

    let _ = write!(
        h,
        "<div class='footer-section clearfix'>\
         <div class='qr-section'>{barcode}</div>\
         <div class='verification-section'>\
         <div class='highlight-box'>\
         <strong>Consulte esta Factura Electrónica con el número impreso abajo:</strong><br>\
         <span class='verification-url'>{hint}</span>\
         </div>\
         <div class='cdc-display'>{cdc}</div>\
         <div style='text-align: center; font-weight: bold; font-size: 10px;'>\
         ESTE DOCUMENTO ES UNA REPRESENTACIÓN GRÁFICA DE UN<br>DOCUMENTO ELECTRÓNICO (XML)\
         </div></div></div>\
         <div class='legal-footer'>{footer}</div>",
        barcode = barcode.markup(),
        hint = VERIFICATION_HINT_URL,
        cdc = esc(&group_cdc(&d.cdc)),
        footer = LEGAL_FOOTER,
    );

    h
}

/// Keeps ASCII letters and digits so the name is safe in a quoted header.
fn file_part(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}
