#![no_main]

use libfuzzer_sys::fuzz_target;

use vpack::{compare, to_json_string, Slice};

// Lazy accessors must fail cleanly on unvalidated input.
fuzz_target!(|data: &[u8]| {
    let root = Slice::new(data);

    let _ = root.value_type();
    let _ = root.byte_size();
    let _ = root.get_int();
    let _ = root.get_double();
    let _ = root.as_str();
    let _ = root.get_binary();
    let _ = root.get_bool();

    if let Ok(n) = root.length() {
        let _ = root.at(0);
        let _ = root.at(n.saturating_sub(1));
        let _ = root.key_at(0);
        if let Ok(iter) = root.object_iter() {
            for (key, _) in iter.take(4).flatten() {
                let _ = root.get(key);
            }
        }
        if let Ok(iter) = root.array_iter() {
            for member in iter.take(4).flatten() {
                let _ = member.byte_size();
            }
        }
    }

    let _ = to_json_string(root);
    let _ = compare(root, root);
});
