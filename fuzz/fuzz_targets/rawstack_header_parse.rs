//! Fuzz target for rawstack header parsing.
//!
//! Feeds arbitrary bytes to the header parser and, when a header parses,
//! derives its metadata, checking for panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stackconv::dataset::raw_stack::header_from_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok((header, _)) = header_from_slice(data) {
        if let Ok(meta) = header.metadata() {
            let _ = meta.plane_size_bytes();
            let _ = meta.plane_count();
        }
    }
});
