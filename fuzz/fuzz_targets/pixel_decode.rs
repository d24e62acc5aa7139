//! Fuzz target for sample decoding.
//!
//! The first byte selects width, float-ness and byte order; the rest is
//! decoded, mapped for display and normalized.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stackconv::pixel::{decode, encode, to_display};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, bytes)) = data.split_first() else {
        return;
    };
    let width = 1usize << (selector & 0x03);
    let is_float = selector & 0x04 != 0;
    let little_endian = selector & 0x08 != 0;

    if let Ok(samples) = decode(bytes, width, is_float, little_endian) {
        assert_eq!(encode(&samples, little_endian), bytes);
        let _ = to_display(samples.normalize());
    }
});
