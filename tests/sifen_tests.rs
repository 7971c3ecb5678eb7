#![cfg(feature = "sifen")]

use kude::core::KudeError;
use kude::qr::{CDC_LOOKUP_URL, QR_BASE_URL};
use kude::sifen::*;
use rust_decimal_macros::dec;

const MULTI_XML: &str = include_str!("fixtures/factura_multi.xml");
const SINGLE_XML: &str = include_str!("fixtures/factura_single.xml");

const MULTI_CDC: &str = "01800695631001001000012322024031517654321098";
const SINGLE_CDC: &str = "01800695631001002000000712024031517654321099";

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

#[test]
fn emitter_and_receiver_fields() {
    let fields = extract_invoice_fields(MULTI_XML).unwrap();

    assert_eq!(
        fields.emitter,
        Emitter {
            name: "Comercial Sur S.A.".into(),
            ruc: "80069563".into(),
            check_digit: "1".into(),
            address: "Avda. San Blas 1234".into(),
            phone: "061 500100".into(),
            email: "ventas@comercialsur.com.py".into(),
            department: "ALTO PARANA".into(),
            city: "CIUDAD DEL ESTE".into(),
            activity: "Comercio al por menor".into(),
        }
    );
    assert_eq!(
        fields.receiver,
        Receiver {
            name: "Cliente & Asociados".into(),
            ruc: "80012345".into(),
            check_digit: "6".into(),
            client_code: "026".into(),
            address: "Calle 1".into(),
            phone: "0981 123456".into(),
            email: "compras@cliente.com.py".into(),
        }
    );
}

#[test]
fn document_metadata() {
    let fields = extract_invoice_fields(MULTI_XML).unwrap();
    let d = &fields.document;
    assert_eq!(d.stamp_number, "12345678");
    assert_eq!(d.establishment, "001");
    assert_eq!(d.issue_point, "001");
    assert_eq!(d.number, "0000123");
    assert_eq!(d.full_number(), "001-001-0000123");
    assert_eq!(d.cdc, MULTI_CDC);
    assert_eq!(d.issue_date, "2024-03-15T10:30:00");
    assert_eq!(d.stamp_validity, "2024-01-01");
    assert_eq!(d.payment_condition, "Contado");
    assert_eq!(d.transaction_type, "Prestación de servicios");
    assert_eq!(d.currency, "PYG");
    assert_eq!(d.exchange_rate, "");
}

#[test]
fn totals_block() {
    let t = extract_invoice_fields(MULTI_XML).unwrap().totals;
    assert_eq!(t.exempt, Some(dec!(0)));
    assert_eq!(t.taxed_5, Some(dec!(31500)));
    assert_eq!(t.taxed_10, Some(dec!(110000)));
    assert_eq!(t.tax_5, Some(dec!(1500)));
    assert_eq!(t.tax_10, Some(dec!(10000)));
    assert_eq!(t.total_tax, Some(dec!(11500)));
    assert_eq!(t.grand_total, Some(dec!(141500)));
}

#[test]
fn missing_nodes_are_empty_not_errors() {
    let fields = extract_invoice_fields(SINGLE_XML).unwrap();
    assert_eq!(fields.emitter.email, "");
    assert_eq!(fields.emitter.activity, "");
    assert_eq!(fields.receiver.ruc, "");
    assert_eq!(fields.document.transaction_type, "");
    assert_eq!(fields.totals.taxed_5, None);
    assert_eq!(fields.totals.tax_10, None);
    assert_eq!(fields.totals.grand_total, Some(dec!(27000)));
}

#[test]
fn non_numeric_amount_is_none() {
    let xml = "<rDE><DE><gTotSub><dTotGralOpe>mucho</dTotGralOpe></gTotSub></DE></rDE>";
    let fields = extract_invoice_fields(xml).unwrap();
    assert_eq!(fields.totals.grand_total, None);
}

// ---------------------------------------------------------------------------
// Line items: one or many
// ---------------------------------------------------------------------------

#[test]
fn multiple_items_in_document_order() {
    let items = extract_invoice_fields(MULTI_XML).unwrap().items;
    assert_eq!(
        items,
        vec![
            LineItem {
                code: "P-001".into(),
                description: "Consultoría".into(),
                quantity: Some(dec!(2)),
                unit_price: Some(dec!(55000)),
                total: Some(dec!(110000)),
                unit: "UNI".into(),
                tax_rate: Some(dec!(10)),
            },
            LineItem {
                code: "P-002".into(),
                description: "Libro".into(),
                quantity: Some(dec!(1.5)),
                unit_price: Some(dec!(21000)),
                total: Some(dec!(31500)),
                unit: "UNI".into(),
                tax_rate: Some(dec!(5)),
            },
        ]
    );
}

#[test]
fn single_item_is_a_one_element_sequence() {
    let items = extract_invoice_fields(SINGLE_XML).unwrap().items;
    assert_eq!(
        items,
        vec![LineItem {
            code: "P-010".into(),
            description: "Arroz".into(),
            quantity: Some(dec!(3)),
            unit_price: Some(dec!(9000)),
            total: Some(dec!(27000)),
            unit: "KG".into(),
            tax_rate: Some(dec!(0)),
        }]
    );
}

#[test]
fn same_item_reads_the_same_alone_or_in_a_list() {
    let item = "<gCamItem><dCodInt>A</dCodInt><dCantProSer>1</dCantProSer>\
                <gCamIVA><dTasaIVA>10</dTasaIVA></gCamIVA></gCamItem>";
    let one = format!("<rDE><DE><gDtipDE>{item}</gDtipDE></DE></rDE>");
    let three = format!("<rDE><DE><gDtipDE>{item}{item}{item}</gDtipDE></DE></rDE>");

    let single = extract_invoice_fields(&one).unwrap().items;
    let many = extract_invoice_fields(&three).unwrap().items;
    assert_eq!(single.len(), 1);
    assert_eq!(many.len(), 3);
    assert!(many.iter().all(|i| *i == single[0]));
}

#[test]
fn no_items_is_empty() {
    let fields = extract_invoice_fields("<rDE><DE><gDtipDE/></DE></rDE>").unwrap();
    assert!(fields.items.is_empty());
}

// ---------------------------------------------------------------------------
// Envelope and malformed input
// ---------------------------------------------------------------------------

#[test]
fn envelope_is_stripped() {
    let doc = SifenDocument::parse(MULTI_XML).unwrap();
    assert!(doc.xml().starts_with("<rDE"));
    assert!(doc.xml().ends_with("</rDE>"));
    assert!(!doc.xml().contains("rRetEnviDe"));
}

#[test]
fn malformed_xml_is_fatal() {
    for payload in [
        "",
        "plain text",
        "<rDE><DE></rDE>",
        "<rDE><DE><gTimb></DE></rDE>",
        "<rDE/><rDE/>",
        "<rDE><DE Id=\"1\"><gDatGralOpe><gEmis><dNomEmi>A & B</dNomEmi></gEmis></gDatGralOpe></DE></rDE>",
        "<rDE><DE Id=\"1\"><gDatGralOpe><gEmis><dNomEmi>A &nbsp; B</dNomEmi></gEmis></gDatGralOpe></DE></rDE>",
        "<rDE><DE Id=1></DE></rDE>",
        "<rDE><gTimb><x a=1/></gTimb></rDE>",
    ] {
        let err = extract_invoice_fields(payload).unwrap_err();
        assert!(
            matches!(err, KudeError::MalformedDocument(_)),
            "{payload:?} gave {err:?}"
        );
    }
}

#[test]
fn prefixed_root_inside_envelope_is_read() {
    let payload = "<ns2:rRetEnviDe xmlns:ns2=\"http://ekuatia.set.gov.py/sifen/xsd\">\
                   <ns2:dCodRes>0260</ns2:dCodRes>\
                   <ns2:rDE><ns2:DE Id=\"0180\"><ns2:gTimb><ns2:dEst>003</ns2:dEst></ns2:gTimb></ns2:DE></ns2:rDE>\
                   </ns2:rRetEnviDe>";
    let doc = SifenDocument::parse(payload).unwrap();
    assert!(doc.xml().starts_with("<ns2:rDE>"));
    assert_eq!(doc.fields().document.cdc, "0180");
    assert_eq!(doc.fields().document.establishment, "003");
}

#[test]
fn truncated_signed_document_is_fatal() {
    let end = SINGLE_XML.find("</gDtipDE>").unwrap();
    let cut = &SINGLE_XML[..end];
    assert!(matches!(
        SifenDocument::parse(cut),
        Err(KudeError::MalformedDocument(_))
    ));
}

// ---------------------------------------------------------------------------
// QR fragment
// ---------------------------------------------------------------------------

#[test]
fn qr_found_by_literal_search() {
    let doc = SifenDocument::parse(MULTI_XML).unwrap();
    let raw = extract_qr_fragment(&doc).unwrap();
    assert!(raw.as_str().contains("&amp;;nVersion=150"));
    assert_eq!(
        doc.verification_url().as_str(),
        format!(
            "{QR_BASE_URL}?nVersion=150&Id={MULTI_CDC}\
             &dFeEmiDE=323032342d30332d31355431303a33303a3030&dRucRec=80012345\
             &dTotGralOpe=141500&dTotIVA=11500&cItems=2&DigestValue=6b4a2f\
             &IdCSC=0001&cHashQR=9f86d08"
        )
    );
}

#[test]
fn qr_found_in_tree_when_literal_tag_is_prefixed() {
    let xml = "<rDE xmlns:s=\"urn:s\"><DE Id=\"9\"/><s:gCamFuFD>\
               <s:dCarQR>nVersion=150&amp;Id=9</s:dCarQR></s:gCamFuFD></rDE>";
    let doc = SifenDocument::parse(xml).unwrap();
    let raw = doc.qr_fragment().unwrap();
    assert_eq!(raw.as_str(), "nVersion=150&Id=9");
    assert_eq!(
        doc.verification_url().as_str(),
        format!("{QR_BASE_URL}?nVersion=150&Id=9")
    );
}

#[test]
fn qr_in_cdata_is_read_from_tree() {
    let xml = "<rDE><DE Id=\"9\"/><gCamFuFD><dCarQR><![CDATA[nVersion=150&Id=9]]></dCarQR></gCamFuFD></rDE>";
    let doc = SifenDocument::parse(xml).unwrap();
    assert_eq!(
        doc.verification_url().as_str(),
        format!("{QR_BASE_URL}?nVersion=150&Id=9")
    );
}

#[test]
fn absent_qr_falls_back_to_cdc_lookup() {
    let doc = SifenDocument::parse(SINGLE_XML).unwrap();
    assert!(doc.qr_fragment().is_none());
    assert_eq!(
        doc.verification_url().as_str(),
        format!("{CDC_LOOKUP_URL}?cdc={SINGLE_CDC}")
    );
}

#[test]
fn empty_qr_tag_counts_as_absent() {
    let xml = "<rDE><DE Id=\"42\"/><gCamFuFD><dCarQR>  </dCarQR></gCamFuFD></rDE>";
    let doc = SifenDocument::parse(xml).unwrap();
    assert!(doc.qr_fragment().is_none());
    assert!(doc.verification_url().as_str().ends_with("?cdc=42"));
}
