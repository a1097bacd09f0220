#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(src) = std::str::from_utf8(data) {
        // Parse only; arbitrary programs may never terminate
        if let Ok(tokens) = canterbury::tokenize(src) {
            let _ = canterbury::parse(tokens);
        }
    }
});
