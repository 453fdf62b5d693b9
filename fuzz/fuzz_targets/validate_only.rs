#![no_main]

use libfuzzer_sys::fuzz_target;

use vpack::{validate, DecodeLimits};

fn fuzz_limits(input_len: usize) -> DecodeLimits {
    DecodeLimits {
        max_depth: 64,
        max_container_len: 1 << 12,
        ..DecodeLimits::for_bytes(input_len.min(1 << 20))
    }
}

fuzz_target!(|data: &[u8]| {
    let _ = validate(data, fuzz_limits(data.len()));
    let _ = validate(data, fuzz_limits(data.len()).strict());
});
