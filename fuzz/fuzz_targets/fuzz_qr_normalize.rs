#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = kude::qr::normalize(s);
        let twice = kude::qr::normalize(once.as_str());
        assert_eq!(once, twice, "normalize is not idempotent for {s:?}");
    }
});
