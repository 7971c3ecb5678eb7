use kude::core::*;
use rust_decimal_macros::dec;

fn main() {
    let client = UiClient {
        name: "Cliente & Asociados S.R.L.".into(),
        ruc: "80012345-6".into(),
        address: "Calle 1 c/ Avda. España".into(),
        phone: "0981 123456".into(),
        email: "compras@cliente.com.py".into(),
        ..Default::default()
    };

    let mut ui = UiInvoice::new(client, "contado");
    ui.add_item(UiLineItem {
        id: "1".into(),
        code: "SRV-01".into(),
        description: "Consultoría".into(),
        unit: "UNI".into(),
        quantity: dec!(2),
        unit_price: dec!(55000),
        tax_type: TaxType::Iva10,
    });
    ui.add_item(UiLineItem {
        id: "2".into(),
        code: "ARZ-5".into(),
        description: "Arroz".into(),
        unit: UnitOfMeasure::from_description("kilogramos").label().into(),
        quantity: dec!(5),
        unit_price: dec!(7500),
        tax_type: TaxType::Iva5,
    });

    let totals = ui.totals();
    println!("Subtotal exentas: {}", totals.exempt);
    println!("Subtotal 5%:      {}", totals.taxed_5);
    println!("Subtotal 10%:     {}", totals.taxed_10);
    println!("Total:            {}", totals.total);
    println!("Total IVA:        {}", totals.total_tax);

    let overrides = DocumentMetadataOverrides {
        numero: Some(123),
        ..Default::default()
    };

    match transform(&ui, &overrides) {
        Ok(doc) => match serde_json::to_string_pretty(&doc) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Cannot serialize: {e}"),
        },
        Err(e) => eprintln!("{}", e.user_message()),
    }

    // Without a client the transform refuses to build a document.
    let orphan = UiInvoice::default();
    if let Err(e) = transform(&orphan, &overrides) {
        println!("Expected error: {e} ({})", e.user_message());
    }
}
