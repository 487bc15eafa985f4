#![no_main]

use libfuzzer_sys::fuzz_target;
use rosie_captures::decode_match;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must also serialize cleanly.
    if let Ok((tree, _)) = decode_match(data) {
        let json = serde_json::to_vec(&tree);
        assert!(json.is_ok());
    }
});
