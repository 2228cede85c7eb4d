#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The --memory-size parser must reject garbage without panicking.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = wdedup::config::parse_memory_size(s);
    }
});
