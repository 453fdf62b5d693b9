#![no_main]

use libfuzzer_sys::fuzz_target;

use vpack::{equals, validate, BuilderOptions, DecodeLimits, Json};

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits {
        max_depth: 64,
        max_container_len: 1 << 12,
        ..DecodeLimits::for_bytes(data.len().min(1 << 20))
    };
    let Ok(root) = validate(data, limits) else {
        return;
    };
    // Binary values have no JSON form.
    let Ok(json) = Json::try_from(root) else {
        return;
    };

    for options in [BuilderOptions::default(), BuilderOptions::indexed_sorted()] {
        let buf = json.to_buffer_with(options).expect("re-encode");
        validate(buf.as_bytes(), DecodeLimits::default()).expect("builder output validates");
        let back = Json::try_from(buf.slice()).expect("decode");
        let again = back.to_buffer().expect("re-encode");
        assert!(equals(buf.slice(), again.slice()).expect("compare"));
    }
});
