use std::str::FromStr;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use rust_decimal::Decimal;

use super::fields::*;
use crate::core::KudeError;
use crate::qr::{CanonicalQrUrl, RawQrFragment};

/// `<rDE` or `<prefix:rDE`, followed by whitespace, `>` or `/`.
static ROOT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:([A-Za-z_][\w.-]*):)?rDE[\s/>]").expect("rDE pattern")
});

static QR_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<dCarQR>(.*?)</dCarQR>").expect("dCarQR pattern"));

/// A parsed SIFEN document: the isolated `rDE` text plus everything read
/// from it.
#[derive(Debug, Clone)]
pub struct SifenDocument {
    xml: String,
    fields: InvoiceDocumentFields,
    qr_node: Option<String>,
}

impl SifenDocument {
    /// Isolate the `rDE` element from `payload` and read it.
    ///
    /// # Errors
    ///
    /// [`KudeError::MalformedDocument`] when the isolated text is not
    /// well-formed XML. Missing fields are never an error.
    pub fn parse(payload: &str) -> Result<Self, KudeError> {
        let xml = isolate_document(payload);
        let (fields, qr_node) = read_document(xml).inspect_err(|e| {
            tracing::warn!(error = %e, bytes = payload.len(), "rejected SIFEN payload");
        })?;
        Ok(Self {
            xml: xml.to_string(),
            fields,
            qr_node,
        })
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn fields(&self) -> &InvoiceDocumentFields {
        &self.fields
    }

    pub fn into_fields(self) -> InvoiceDocumentFields {
        self.fields
    }

    /// See [`extract_qr_fragment`].
    pub fn qr_fragment(&self) -> Option<RawQrFragment> {
        extract_qr_fragment(self)
    }

    /// The normalized embedded QR URL, or the CDC lookup URL when the
    /// document carries no QR.
    pub fn verification_url(&self) -> CanonicalQrUrl {
        match self.qr_fragment() {
            Some(raw) => raw.normalize(),
            None => {
                tracing::debug!(cdc = %self.fields.document.cdc, "no dCarQR, using CDC lookup URL");
                CanonicalQrUrl::for_cdc(&self.fields.document.cdc)
            }
        }
    }
}

/// Read the display fields of a signed document.
///
/// Shorthand for [`SifenDocument::parse`] when the QR is not needed.
pub fn extract_invoice_fields(payload: &str) -> Result<InvoiceDocumentFields, KudeError> {
    SifenDocument::parse(payload).map(SifenDocument::into_fields)
}

/// Find the raw `dCarQR` text of a parsed document.
///
/// The literal `<dCarQR>...</dCarQR>` text is searched first so the value
/// reaches the normalizer exactly as written, entities included; the
/// `gCamFuFD/dCarQR` node read by the parser is the fallback. `None` means the document has no QR.
pub fn extract_qr_fragment(doc: &SifenDocument) -> Option<RawQrFragment> {
    let literal = QR_LITERAL
        .captures(&doc.xml)
        .and_then(|c| c.get(1))
        .map(|m| strip_cdata(m.as_str().trim()))
        .filter(|s| !s.trim().is_empty());
    if let Some(raw) = literal {
        tracing::debug!("dCarQR found by literal search");
        return Some(RawQrFragment::new(raw));
    }

    if let Some(raw) = doc.qr_node.as_deref() {
        tracing::debug!("dCarQR found in document tree");
        return Some(RawQrFragment::new(raw));
    }

    None
}

fn strip_cdata(s: &str) -> &str {
    s.strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(s)
}

/// Cut `<rDE ...>...</rDE>` out of a larger response envelope.
///
/// The root may carry a namespace prefix (`<ns2:rDE>`); the closing tag
/// must use the same one. Payloads without an `rDE` opening tag are
/// returned unchanged.
pub fn isolate_document(payload: &str) -> &str {
    let Some(open) = ROOT_OPEN.captures(payload) else {
        return payload;
    };
    let (Some(tag), prefix) = (open.get(0), open.get(1)) else {
        return payload;
    };
    let close = match prefix {
        Some(p) => format!("</{}:rDE>", p.as_str()),
        None => "</rDE>".to_string(),
    };
    let rest = &payload[tag.start()..];
    match rest.find(&close) {
        Some(end) => &rest[..end + close.len()],
        None => rest,
    }
}

fn malformed(reader: &Reader<&[u8]>, msg: impl std::fmt::Display) -> KudeError {
    KudeError::MalformedDocument(format!("{msg} (at byte {})", reader.buffer_position()))
}

/// Attributes must be quoted, unique and carry only known entities.
fn check_attributes(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<(), KudeError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(reader, format!("bad attribute: {err}")))?;
        attr.unescape_value()
            .map_err(|err| malformed(reader, format!("bad attribute value: {err}")))?;
    }
    Ok(())
}

fn read_document(xml: &str) -> Result<(InvoiceDocumentFields, Option<String>), KudeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut p = Parsed::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if path.is_empty() {
                    if saw_root {
                        return Err(malformed(&reader, "more than one root element"));
                    }
                    saw_root = true;
                }
                check_attributes(&reader, e)?;
                let name = local_name(e);
                p.start(&path, &name, e);
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(ref e)) => {
                if path.is_empty() {
                    if saw_root {
                        return Err(malformed(&reader, "more than one root element"));
                    }
                    saw_root = true;
                }
                check_attributes(&reader, e)?;
                let name = local_name(e);
                p.start(&path, &name, e);
                path.push(name);
                p.end(&path, "");
                path.pop();
            }
            Ok(Event::Text(ref e)) => {
                let chunk = e
                    .unescape()
                    .map_err(|err| malformed(&reader, format!("bad character data: {err}")))?
                    .into_owned();
                if path.is_empty() {
                    if !chunk.trim().is_empty() {
                        return Err(malformed(&reader, "text outside the root element"));
                    }
                } else {
                    text.push_str(&chunk);
                }
            }
            Ok(Event::CData(ref e)) => {
                if path.is_empty() {
                    return Err(malformed(&reader, "CDATA outside the root element"));
                }
                text.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::End(_)) => {
                p.end(&path, text.trim());
                text.clear();
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&reader, format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(malformed(&reader, format!("unclosed element <{open}>")));
    }
    if !saw_root {
        return Err(KudeError::MalformedDocument("no root element".to_string()));
    }

    Ok(p.finish())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn number(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

fn set_once(target: &mut String, text: &str) {
    if target.is_empty() {
        *target = text.to_string();
    }
}

fn set_number_once(target: &mut Option<Decimal>, text: &str) {
    if target.is_none() {
        *target = number(text);
    }
}

#[derive(Default)]
struct Parsed {
    fields: InvoiceDocumentFields,
    current_item: Option<LineItem>,
    qr_node: Option<String>,
}

impl Parsed {
    /// `parent` is the path above the element being opened.
    fn start(&mut self, parent: &[String], name: &str, e: &BytesStart<'_>) {
        let parent: Vec<&str> = parent.iter().skip(1).map(String::as_str).collect();
        match (parent.as_slice(), name) {
            ([], "DE") => {
                if let Ok(Some(id)) = e.try_get_attribute("Id") {
                    if let Ok(value) = id.unescape_value() {
                        set_once(&mut self.fields.document.cdc, value.trim());
                    }
                }
            }
            (["DE", "gDtipDE"], "gCamItem") => {
                self.current_item = Some(LineItem::default());
            }
            _ => {}
        }
    }

    /// `path` includes the element being closed; paths are matched below the root.
    fn end(&mut self, path: &[String], text: &str) {
        let rel: Vec<&str> = path.iter().skip(1).map(String::as_str).collect();

        if rel.as_slice() == ["DE", "gDtipDE", "gCamItem"] {
            if let Some(item) = self.current_item.take() {
                self.fields.items.push(item);
            }
            return;
        }

        if text.is_empty() {
            return;
        }

        if rel.len() >= 2 && rel[rel.len() - 2..] == ["gCamFuFD", "dCarQR"] {
            if self.qr_node.is_none() {
                self.qr_node = Some(text.to_string());
            }
            return;
        }

        let f = &mut self.fields;
        match rel.as_slice() {
            ["DE", "gDatGralOpe", "gEmis", leaf] => {
                let target = match *leaf {
                    "dNomEmi" => &mut f.emitter.name,
                    "dRucEm" => &mut f.emitter.ruc,
                    "dDVEmi" => &mut f.emitter.check_digit,
                    "dDirEmi" => &mut f.emitter.address,
                    "dTelEmi" => &mut f.emitter.phone,
                    "dEmailE" => &mut f.emitter.email,
                    "dDesDepEmi" => &mut f.emitter.department,
                    "dDesCiuEmi" => &mut f.emitter.city,
                    _ => return,
                };
                set_once(target, text);
            }
            ["DE", "gDatGralOpe", "gEmis", "gActEco", "dDesActEco"] => {
                set_once(&mut f.emitter.activity, text);
            }
            ["DE", "gDatGralOpe", "gDatRec", leaf] => {
                let target = match *leaf {
                    "dNomRec" => &mut f.receiver.name,
                    "dRucRec" => &mut f.receiver.ruc,
                    "dDVRec" => &mut f.receiver.check_digit,
                    "dCodCliente" => &mut f.receiver.client_code,
                    "dDirRec" => &mut f.receiver.address,
                    "dTelRec" => &mut f.receiver.phone,
                    "dEmailRec" => &mut f.receiver.email,
                    _ => return,
                };
                set_once(target, text);
            }
            ["DE", "gDatGralOpe", "dFeEmiDE"] => set_once(&mut f.document.issue_date, text),
            ["DE", "gDatGralOpe", "gOpeCom", "dDesTipTra"] => {
                set_once(&mut f.document.transaction_type, text);
            }
            ["DE", "gDatGralOpe", "gOpeCom", "cMoneOpe"] => set_once(&mut f.document.currency, text),
            ["DE", "gDatGralOpe", "gOpeCom", "dTiCam"] => {
                set_once(&mut f.document.exchange_rate, text);
            }
            ["DE", "gTimb", leaf] => {
                let target = match *leaf {
                    "dNumTim" => &mut f.document.stamp_number,
                    "dEst" => &mut f.document.establishment,
                    "dPunExp" => &mut f.document.issue_point,
                    "dNumDoc" => &mut f.document.number,
                    "dFeIniT" => &mut f.document.stamp_validity,
                    _ => return,
                };
                set_once(target, text);
            }
            ["DE", "gDtipDE", "gCamCond", "dDCondOpe"] => {
                set_once(&mut f.document.payment_condition, text);
            }
            ["DE", "gDtipDE", "gCamItem", rest @ ..] => {
                if let Some(item) = self.current_item.as_mut() {
                    item.read(rest, text);
                }
            }
            ["DE", "gTotSub", leaf] => {
                let target = match *leaf {
                    "dSubExe" => &mut f.totals.exempt,
                    "dSub5" => &mut f.totals.taxed_5,
                    "dSub10" => &mut f.totals.taxed_10,
                    "dIVA5" => &mut f.totals.tax_5,
                    "dIVA10" => &mut f.totals.tax_10,
                    "dTotIVA" => &mut f.totals.total_tax,
                    "dTotGralOpe" => &mut f.totals.grand_total,
                    _ => return,
                };
                set_number_once(target, text);
            }
            _ => {}
        }
    }

    fn finish(mut self) -> (InvoiceDocumentFields, Option<String>) {
        let number = &mut self.fields.document.number;
        if !number.is_empty() && number.len() < 7 {
            *number = format!("{number:0>7}");
        }
        (self.fields, self.qr_node)
    }
}

impl LineItem {
    /// `rel` is the path below `gCamItem`.
    fn read(&mut self, rel: &[&str], text: &str) {
        match rel {
            ["dCodInt"] => set_once(&mut self.code, text),
            ["dDesProSer"] => set_once(&mut self.description, text),
            ["dCantProSer"] => set_number_once(&mut self.quantity, text),
            ["dDesUniMed"] => set_once(&mut self.unit, text),
            ["gValorItem", "dPUniProSer"] => set_number_once(&mut self.unit_price, text),
            ["gValorItem", "gValorRestaItem", "dTotOpeItem"] => {
                set_number_once(&mut self.total, text);
            }
            ["gCamIVA", "dTasaIVA"] => set_number_once(&mut self.tax_rate, text),
            _ => {}
        }
    }
}
