#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let wrapped = format!(
            "<rDE><DE Id=\"{0}\"><gDatGralOpe><gEmis><dNomEmi>{0}</dNomEmi></gEmis></gDatGralOpe></DE></rDE>",
            s.replace(['<', '&', '"'], "")
        );
        if let Ok(doc) = kude::sifen::SifenDocument::parse(&wrapped) {
            let layout = kude::kude::KudeLayout::from_document(&doc);
            assert!(layout.html.contains("<barcode "));
        }
    }
});
