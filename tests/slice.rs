use vpack::{
    path, vpack, Builder, BuilderOptions, ErrorCode, Number, Slice, StringRef, ValueType,
};

fn object_ab() -> vpack::Buffer {
    let mut b = Builder::new();
    b.open_object().unwrap();
    b.add_entry("a", 1).unwrap();
    b.add_entry("b", "hello").unwrap();
    b.close().unwrap();
    b.finish().unwrap()
}

#[test]
fn small_object_lookup() {
    let buf = object_ab();
    assert_eq!(
        buf.as_bytes(),
        &[0x14, 0x0e, 0x41, b'a', 0x31, 0x41, b'b', 0x45, b'h', b'e', b'l', b'l', b'o', 0x02]
    );

    let root = buf.slice();
    assert!(root.is_object());
    assert_eq!(root.length().unwrap(), 2);
    assert_eq!(root.byte_size().unwrap(), buf.len());
    assert_eq!(root.get("a").unwrap().unwrap().get_int().unwrap(), 1);
    assert_eq!(root.get("b").unwrap().unwrap().as_str().unwrap(), "hello");
    assert!(root.get("c").unwrap().is_none());
    assert!(root.has_key("a").unwrap());
    assert!(!root.has_key("").unwrap());
}

#[test]
fn large_array_random_access() {
    let mut b = Builder::new();
    b.open_array().unwrap();
    for i in 0..1000 {
        b.add(i).unwrap();
    }
    b.close().unwrap();
    let buf = b.finish().unwrap();

    let root = buf.slice();
    // Members differ in size, so the array needs a 2-byte index table.
    assert_eq!(root.head().unwrap(), 0x07);
    assert_eq!(root.length().unwrap(), 1000);
    assert_eq!(root.at(500).unwrap().get_int().unwrap(), 500);
    assert_eq!(root.at(999).unwrap().get_int().unwrap(), 999);
    assert_eq!(root.at(1000).unwrap_err().code, ErrorCode::IndexOutOfBounds);

    let sum: i64 = root
        .array_iter()
        .unwrap()
        .map(|m| m.unwrap().get_int().unwrap())
        .sum();
    assert_eq!(sum, 999 * 1000 / 2);
}

#[test]
fn equal_size_members_use_stride_addressing() {
    let buf = vpack!([1, 2, 3, 4, 5]).unwrap();
    assert_eq!(buf.as_bytes(), &[0x02, 0x07, 0x31, 0x32, 0x33, 0x34, 0x35]);

    let root = buf.slice();
    assert_eq!(root.length().unwrap(), 5);
    assert_eq!(root.at(3).unwrap().get_uint().unwrap(), 4);
}

#[test]
fn mixed_members_use_index_table() {
    let buf = vpack!([1, 300, "x", true, null]).unwrap();
    assert_eq!(
        buf.as_bytes(),
        &[
            0x06, 0x10, 0x05, 0x31, 0x21, 0x2c, 0x01, 0x41, b'x', 0x1a, 0x18, 0x03, 0x04, 0x07,
            0x09, 0x0a
        ]
    );

    let root = buf.slice();
    assert_eq!(root.at(1).unwrap().get_int().unwrap(), 300);
    assert_eq!(root.at(2).unwrap().as_str().unwrap(), "x");
    assert!(root.at(3).unwrap().get_bool().unwrap());
    assert!(root.at(4).unwrap().is_null());
}

#[test]
fn padded_header_is_skipped() {
    // Indexed array with a 1-byte table but the header padded to 9 bytes.
    let bytes = [
        0x06, 0x0d, 0x02, 0, 0, 0, 0, 0, 0, 0x31, 0x32, 0x09, 0x0a,
    ];
    let root = Slice::new(&bytes[..]);
    assert_eq!(root.byte_size().unwrap(), 13);
    assert_eq!(root.length().unwrap(), 2);
    assert_eq!(root.at(0).unwrap().get_int().unwrap(), 1);
    assert_eq!(root.at(1).unwrap().get_int().unwrap(), 2);
}

#[test]
fn sorted_object_binary_search() {
    let mut b = Builder::with_options(BuilderOptions::indexed_sorted());
    b.open_object().unwrap();
    b.add_entry("b", 1).unwrap();
    b.add_entry("a", 2).unwrap();
    b.close().unwrap();
    let buf = b.finish().unwrap();
    assert_eq!(
        buf.as_bytes(),
        &[0x0b, 0x0b, 0x02, 0x41, b'b', 0x31, 0x41, b'a', 0x32, 0x06, 0x03]
    );

    let root = buf.slice();
    assert!(root.is_sorted());
    assert_eq!(root.get("a").unwrap().unwrap().get_int().unwrap(), 2);
    assert_eq!(root.get("b").unwrap().unwrap().get_int().unwrap(), 1);
    assert!(root.get("c").unwrap().is_none());

    // Sorted objects are addressed in key order.
    assert_eq!(root.key_at(0).unwrap().as_str().unwrap(), "a");
    assert_eq!(root.value_at(0).unwrap().get_int().unwrap(), 2);
    assert_eq!(root.at(1).unwrap().get_int().unwrap(), 1);
}

#[test]
fn sorted_lookup_over_many_keys() {
    let mut b = Builder::with_options(BuilderOptions::indexed_sorted());
    b.open_object().unwrap();
    for i in (0..200).rev() {
        b.add_entry(&format!("key{i:03}"), i).unwrap();
    }
    b.close().unwrap();
    let buf = b.finish().unwrap();
    let root = buf.slice();

    for i in 0..200 {
        let key = format!("key{i:03}");
        assert_eq!(root.get(key.as_str()).unwrap().unwrap().get_int().unwrap(), i);
    }
    assert!(root.get("key200").unwrap().is_none());
    assert!(root.get("aaa").unwrap().is_none());
    assert!(root.get("zzz").unwrap().is_none());

    let keys: Vec<String> = root
        .object_iter()
        .unwrap()
        .map(|e| e.unwrap().0.to_str().unwrap().to_owned())
        .collect();
    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(keys, expected);
}

#[test]
fn unsorted_object_keeps_insertion_order() {
    let mut b = Builder::with_options(BuilderOptions {
        compact_threshold: 0,
        ..BuilderOptions::default()
    });
    b.open_object().unwrap();
    b.add_entry("z", 1).unwrap();
    b.add_entry("a", 2).unwrap();
    b.add_entry("m", 3).unwrap();
    b.close().unwrap();
    let buf = b.finish().unwrap();
    let root = buf.slice();

    assert_eq!(root.head().unwrap(), 0x0f);
    assert!(!root.is_sorted());
    let keys: Vec<StringRef<'_>> = root.object_iter().unwrap().map(|e| e.unwrap().0).collect();
    assert_eq!(keys, ["z", "a", "m"]);
    assert_eq!(root.get("m").unwrap().unwrap().get_int().unwrap(), 3);
}

#[test]
fn duplicate_keys_return_first_match() {
    for options in [BuilderOptions::default(), BuilderOptions::indexed_sorted()] {
        let mut b = Builder::with_options(options);
        b.open_object().unwrap();
        b.add_entry("k", 1).unwrap();
        b.add_entry("a", 0).unwrap();
        b.add_entry("k", 2).unwrap();
        b.close().unwrap();
        let buf = b.finish().unwrap();
        assert_eq!(buf.slice().get("k").unwrap().unwrap().get_int().unwrap(), 1);
    }
}

#[test]
fn scalars() {
    let buf = vpack!([
        (-6),
        (-7),
        9,
        10,
        (i64::MIN),
        (u64::MAX),
        1.5,
        false,
        (&[1u8, 2, 3][..])
    ])
    .unwrap();
    let root = buf.slice();

    assert_eq!(root.at(0).unwrap().value_type().unwrap(), ValueType::SmallInt);
    assert_eq!(root.at(0).unwrap().get_int().unwrap(), -6);
    assert_eq!(root.at(1).unwrap().value_type().unwrap(), ValueType::Int);
    assert_eq!(root.at(1).unwrap().get_int().unwrap(), -7);
    assert_eq!(root.at(2).unwrap().value_type().unwrap(), ValueType::SmallInt);
    assert_eq!(root.at(3).unwrap().value_type().unwrap(), ValueType::Int);
    assert_eq!(root.at(4).unwrap().get_int().unwrap(), i64::MIN);
    assert_eq!(root.at(5).unwrap().get_uint().unwrap(), u64::MAX);
    assert_eq!(root.at(5).unwrap().number().unwrap(), Number::UInt(u64::MAX));
    assert_eq!(root.at(6).unwrap().get_double().unwrap(), 1.5);
    assert!(!root.at(7).unwrap().get_bool().unwrap());
    assert_eq!(root.at(8).unwrap().get_binary().unwrap(), &[1, 2, 3]);
    assert!(root.at(8).unwrap().is_binary());
}

#[test]
fn long_strings() {
    let long = "x".repeat(300);
    let buf = vpack!([(long.as_str()), "short"]).unwrap();
    let root = buf.slice();
    let s = root.at(0).unwrap();
    assert_eq!(s.head().unwrap(), 0xbf);
    assert_eq!(s.byte_size().unwrap(), 9 + 300);
    assert_eq!(s.as_str().unwrap(), long);
    assert_eq!(root.at(1).unwrap().get_string_ref().unwrap(), "short");
}

#[test]
fn type_mismatches() {
    let buf = vpack!({ n: 1, d: 2.5, s: "x", a: [1] }).unwrap();
    let root = buf.slice();
    let n = root.get("n").unwrap().unwrap();
    let d = root.get("d").unwrap().unwrap();
    let s = root.get("s").unwrap().unwrap();
    let a = root.get("a").unwrap().unwrap();

    assert_eq!(n.as_str().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(n.get_double().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(d.get_int().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(s.get_bool().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(s.length().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(s.at(0).unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(a.get("x").unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(a.key_at(0).unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(root.array_iter().unwrap_err().code, ErrorCode::TypeMismatch);
    assert_eq!(a.object_iter().unwrap_err().code, ErrorCode::TypeMismatch);
}

#[test]
fn numeric_conversions() {
    let buf = vpack!([300, (-1), 3.0, 3.5, (u64::MAX)]).unwrap();
    let root = buf.slice();

    assert_eq!(root.at(0).unwrap().get_number::<u16>().unwrap(), 300);
    assert_eq!(
        root.at(0).unwrap().get_number::<u8>().unwrap_err().code,
        ErrorCode::NumericOverflow
    );
    assert_eq!(root.at(1).unwrap().get_number::<i8>().unwrap(), -1);
    assert_eq!(
        root.at(1).unwrap().get_uint().unwrap_err().code,
        ErrorCode::NumericOverflow
    );
    assert_eq!(root.at(2).unwrap().get_number::<i32>().unwrap(), 3);
    assert_eq!(
        root.at(3).unwrap().get_number::<i32>().unwrap_err().code,
        ErrorCode::NumericOverflow
    );
    assert_eq!(root.at(3).unwrap().get_number::<f64>().unwrap(), 3.5);
    assert_eq!(
        root.at(4).unwrap().get_int().unwrap_err().code,
        ErrorCode::NumericOverflow
    );
    assert_eq!(root.at(0).unwrap().get_number::<f64>().unwrap(), 300.0);
}

#[test]
fn paths() {
    let buf = vpack!({ a: [10, { b: "x" }], c: null }).unwrap();
    let root = buf.slice();

    let hit = root.get_path(path!("a", 1usize, "b")).unwrap().unwrap();
    assert_eq!(hit.as_str().unwrap(), "x");
    assert_eq!(
        root.get_path(path!("a", 0usize)).unwrap().unwrap().get_int().unwrap(),
        10
    );
    assert!(root.get_path(path!("a", 5usize)).unwrap().is_none());
    assert!(root.get_path(path!("missing", "b")).unwrap().is_none());
    assert_eq!(root.get_path(&[]).unwrap().unwrap(), root);

    assert_eq!(
        root.get_path(path!("c", "x")).unwrap_err().code,
        ErrorCode::TypeMismatch
    );
    assert_eq!(
        root.get_path(path!(0usize)).unwrap_err().code,
        ErrorCode::TypeMismatch
    );
}

#[test]
fn slice_equality_is_byte_equality() {
    let a = vpack!({ k: [1, 2, 3], pad: "xx" }).unwrap();
    let b = vpack!([[1, 2, 3]]).unwrap();
    let in_a = a.slice().get("k").unwrap().unwrap();
    let in_b = b.slice().at(0).unwrap();
    assert_ne!(in_a.offset(), in_b.offset());
    assert_eq!(in_a, in_b);
    assert_ne!(in_a, a.slice().get("pad").unwrap().unwrap());

    // Same value, different encoding.
    let mut plain = Builder::new();
    plain.open_array().unwrap();
    for i in [1, 2, 3] {
        plain.add(i).unwrap();
    }
    plain.close().unwrap();
    let compact = plain.finish().unwrap();
    let mut wide = Builder::with_options(BuilderOptions {
        compact_threshold: 0,
        ..BuilderOptions::default()
    });
    wide.open_array().unwrap();
    for i in [1, 2, 3] {
        wide.add(i).unwrap();
    }
    wide.close().unwrap();
    let uniform = wide.finish().unwrap();
    assert_ne!(compact.slice(), uniform.slice());
    assert!(vpack::equals(compact.slice(), uniform.slice()).unwrap());
}

#[test]
fn nested_slices_share_the_buffer() {
    let buf = vpack!({ inner: { deep: [1, 2, 3] } }).unwrap();
    let root = buf.slice();
    let inner = root.get("inner").unwrap().unwrap();
    let deep = inner.get("deep").unwrap().unwrap();
    assert!(deep.offset() > inner.offset());
    assert_eq!(deep.length().unwrap(), 3);
    assert_eq!(
        deep.as_bytes().unwrap(),
        &buf.as_bytes()[deep.offset()..deep.offset() + deep.byte_size().unwrap()]
    );
}

#[test]
fn truncated_buffers_fail_cleanly() {
    let mut b = Builder::new();
    b.open_array().unwrap();
    for i in 0..1000 {
        b.add(i).unwrap();
    }
    b.close().unwrap();
    let buf = b.finish().unwrap();
    let bytes = buf.as_bytes();

    let cut = Slice::new(&bytes[..bytes.len() - 1]);
    assert_eq!(cut.byte_size().unwrap_err().code, ErrorCode::BufferExhausted);
    assert_eq!(cut.at(500).unwrap_err().code, ErrorCode::BufferExhausted);
    assert_eq!(cut.length().unwrap_err().code, ErrorCode::BufferExhausted);

    assert_eq!(
        Slice::new(&[]).head().unwrap_err().code,
        ErrorCode::BufferExhausted
    );
    assert_eq!(
        Slice::new(&[0xbf, 0x05]).as_str().unwrap_err().code,
        ErrorCode::BufferExhausted
    );
    assert_eq!(
        Slice::new(&[0x45, b'a']).byte_size().unwrap_err().code,
        ErrorCode::BufferExhausted
    );
}

#[test]
fn reserved_heads_are_malformed() {
    for head in [0x15u8, 0x16, 0x17, 0x1c, 0x1f, 0xc8, 0xff] {
        let bytes = [head, 0, 0, 0, 0, 0, 0, 0, 0];
        let s = Slice::new(&bytes);
        assert_eq!(s.value_type().unwrap_err().code, ErrorCode::MalformedHeader);
        assert_eq!(s.byte_size().unwrap_err().code, ErrorCode::MalformedHeader);
        assert!(!s.is_number());
    }
}

#[test]
fn index_table_pointing_outside_members_is_rejected() {
    let buf = vpack!([1, 300, "x", true, null]).unwrap();
    let mut bytes = buf.into_vec();
    let last = bytes.len() - 1;
    bytes[last] = 0x0b;
    let root = Slice::new(&bytes);
    assert_eq!(root.at(4).unwrap_err().code, ErrorCode::InconsistentLength);
    assert_eq!(root.at(0).unwrap().get_int().unwrap(), 1);
}

#[test]
fn empty_containers() {
    let buf = vpack!([[], {}]).unwrap();
    let root = buf.slice();
    let arr = root.at(0).unwrap();
    let obj = root.at(1).unwrap();
    assert_eq!(arr.head().unwrap(), 0x01);
    assert_eq!(obj.head().unwrap(), 0x0a);
    assert_eq!(arr.length().unwrap(), 0);
    assert_eq!(obj.length().unwrap(), 0);
    assert_eq!(arr.at(0).unwrap_err().code, ErrorCode::IndexOutOfBounds);
    assert!(obj.get("a").unwrap().is_none());
    assert_eq!(arr.array_iter().unwrap().count(), 0);
}

#[cfg(feature = "sha2")]
#[test]
fn sha256_covers_value_bytes_only() {
    let buf = vpack!([{ a: 1 }, { a: 1 }]).unwrap();
    let root = buf.slice();
    let first = root.at(0).unwrap().sha256().unwrap();
    let second = root.at(1).unwrap().sha256().unwrap();
    assert_eq!(first, second);
    assert_ne!(first, root.sha256().unwrap());
    assert_eq!(root.sha256().unwrap(), buf.sha256());
}
