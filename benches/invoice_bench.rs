use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use kude::core::*;
use kude::qr;
use kude::sifen::SifenDocument;

const MULTI_XML: &str = include_str!("../tests/fixtures/factura_multi.xml");

const BROKEN_QR: &str = "Id=0180&amp;;nVersion=150&amp;dFeEmiDE=3230;dRucRec=80012345\
    &amp;&amp;dTotGralOpe=141500&amp;cItems=2&amp;cHashQR=9f86d08&amp;extra=1";

fn fixed_transformer() -> InvoiceTransformer {
    InvoiceTransformer::new()
        .clock(|| {
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .and_then(|d| d.and_hms_opt(10, 30, 0))
                .unwrap()
        })
        .security_code(|| "123456".to_string())
}

fn ui_invoice(lines: usize) -> UiInvoice {
    let client = UiClient {
        name: "Cliente SA".into(),
        ruc: "80012345-6".into(),
        ..Default::default()
    };
    let mut ui = UiInvoice::new(client, "contado");
    let taxes = [TaxType::Exentas, TaxType::Iva5, TaxType::Iva10];
    for i in 0..lines {
        ui.add_item(UiLineItem {
            id: i.to_string(),
            code: format!("P-{i:04}"),
            description: format!("Producto {i}"),
            unit: "KG".into(),
            quantity: dec!(2),
            unit_price: dec!(12500),
            tax_type: taxes[i % 3],
        });
    }
    ui
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("qr_normalize_broken", |b| {
        b.iter(|| black_box(qr::normalize(black_box(BROKEN_QR))));
    });

    let canonical = qr::normalize(BROKEN_QR);
    c.bench_function("qr_normalize_canonical", |b| {
        b.iter(|| black_box(qr::normalize(black_box(canonical.as_str()))));
    });
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("sifen_extract_fields", |b| {
        b.iter(|| black_box(SifenDocument::parse(black_box(MULTI_XML))));
    });

    let doc = SifenDocument::parse(MULTI_XML).unwrap();
    c.bench_function("sifen_verification_url", |b| {
        b.iter(|| black_box(doc.verification_url()));
    });
}

fn bench_transform(c: &mut Criterion) {
    let transformer = fixed_transformer();
    let overrides = DocumentMetadataOverrides::default();

    let small = ui_invoice(10);
    c.bench_function("transform_10_lines", |b| {
        b.iter(|| black_box(transformer.transform(black_box(&small), &overrides)));
    });

    let large = ui_invoice(1000);
    c.bench_function("transform_1000_lines", |b| {
        b.iter(|| black_box(transformer.transform(black_box(&large), &overrides)));
    });

    c.bench_function("totals_1000_lines", |b| {
        b.iter(|| black_box(black_box(&large).totals()));
    });
}

criterion_group!(benches, bench_normalize, bench_extract, bench_transform);
criterion_main!(benches);
