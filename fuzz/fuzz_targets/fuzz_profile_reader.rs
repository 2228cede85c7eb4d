#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use wdedup::profile::{ProfileReader, ProfileSource};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the profile reader: malformed input
    // is an error (profile-corrupt or I/O), nothing more.
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();

    if let Ok(mut input) = ProfileReader::open(file.path()) {
        while let Ok(Some(_)) = input.pop() {}
    }
});
