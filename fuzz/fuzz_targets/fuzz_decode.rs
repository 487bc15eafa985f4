#![no_main]

use libfuzzer_sys::fuzz_target;
use rosie_captures::decode_match;

fuzz_target!(|data: &[u8]| {
    // We don't care about the result, only that it doesn't panic
    let _ = decode_match(data);
});
