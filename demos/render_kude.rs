use std::path::PathBuf;

use kude::kude::KudeLayout;
use kude::sifen::SifenDocument;

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: render_kude <signed.xml> [out-dir]");
        std::process::exit(2);
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));

    let payload = match std::fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot read {input}: {e}");
            std::process::exit(1);
        }
    };

    let doc = match SifenDocument::parse(&payload) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let fields = doc.fields();
    println!("CDC:    {}", fields.document.cdc);
    println!("Número: {}", fields.document.full_number());
    println!("Items:  {}", fields.items.len());
    match doc.qr_fragment() {
        Some(raw) => println!("QR (raw):       {}", raw.as_str()),
        None => println!("QR (raw):       <none>"),
    }
    println!("QR (canonical): {}", doc.verification_url());

    let layout = KudeLayout::from_document(&doc);
    let path = out_dir.join(layout.file_name.replace(".pdf", ".html"));
    match std::fs::write(&path, layout.to_html_document()) {
        Ok(()) => println!("HTML written to {}", path.display()),
        Err(e) => eprintln!("Cannot write {}: {e}", path.display()),
    }
}
