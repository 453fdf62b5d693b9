use vpack::{validate, vpack, Buffer, Builder, BuilderOptions, DecodeLimits, ErrorCode};

fn limits(bytes: &[u8]) -> DecodeLimits {
    DecodeLimits::for_bytes(bytes.len())
}

fn code(bytes: &[u8], limits: DecodeLimits) -> ErrorCode {
    validate(bytes, limits).unwrap_err().code
}

#[test]
fn accepts_builder_output() {
    let docs = [
        vpack!(null).unwrap(),
        vpack!([]).unwrap(),
        vpack!({}).unwrap(),
        vpack!([1, 2, 3, 4, 5, 6]).unwrap(),
        vpack!([1, "two", [3], { four: 4 }, 5.5, false]).unwrap(),
        vpack!({ a: { b: { c: [null, true] } }, d: "x" }).unwrap(),
    ];
    for doc in &docs {
        let root = validate(doc.as_bytes(), limits(doc.as_bytes())).unwrap();
        assert_eq!(root.byte_size().unwrap(), doc.len());
    }
}

#[test]
fn trailing_bytes() {
    let err = validate(&[0x18, 0x18], DecodeLimits::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::TrailingBytes);
    assert_eq!(err.offset, 1);
    assert!(err.is_validation());
}

#[test]
fn input_too_large() {
    let bytes = [0x41, b'a'];
    let mut l = limits(&bytes);
    l.max_input_bytes = 1;
    assert_eq!(code(&bytes, l), ErrorCode::InputTooLarge);

    let mut l = limits(&bytes);
    l.max_string_len = 0;
    assert_eq!(code(&bytes, l), ErrorCode::InputTooLarge);
}

#[test]
fn container_member_limit() {
    let buf = vpack!([1, 2, 3]).unwrap();
    let mut l = limits(buf.as_bytes());
    l.max_container_len = 2;
    assert_eq!(code(buf.as_bytes(), l), ErrorCode::InputTooLarge);
}

#[test]
fn depth_limit() {
    let buf = vpack!([[[]]]).unwrap();
    let mut l = limits(buf.as_bytes());
    l.max_depth = 3;
    validate(buf.as_bytes(), l).unwrap();
    l.max_depth = 2;
    assert_eq!(code(buf.as_bytes(), l), ErrorCode::DepthLimitExceeded);
}

#[test]
fn reserved_and_none_heads() {
    assert_eq!(code(&[0x15], DecodeLimits::default()), ErrorCode::MalformedHeader);
    assert_eq!(code(&[0x00], DecodeLimits::default()), ErrorCode::MalformedHeader);
    // Compact array holding a none marker.
    assert_eq!(
        code(&[0x13, 0x04, 0x00, 0x01], DecodeLimits::default()),
        ErrorCode::MalformedHeader
    );
}

#[test]
fn invalid_utf8() {
    let bytes = [0x42, 0xff, 0xfe];
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::Utf8Invalid);

    let mut l = limits(&bytes);
    l.check_utf8 = false;
    validate(&bytes, l).unwrap();
}

#[test]
fn compact_count_mismatch() {
    let buf = vpack!({ a: 1 }).unwrap();
    let mut bytes = buf.into_vec();
    assert_eq!(bytes, [0x14, 0x06, 0x41, b'a', 0x31, 0x01]);
    bytes[5] = 0x02;
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);

    bytes[5] = 0x00;
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);
}

#[test]
fn index_table_out_of_order() {
    let buf = vpack!([1, 300, "x", true, null]).unwrap();
    let mut bytes = buf.into_vec();
    let n = bytes.len();
    bytes.swap(n - 1, n - 2);
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);
}

#[test]
fn declared_length_too_small() {
    let buf = vpack!([1, 2, 3, 4, 5]).unwrap();
    let mut bytes = buf.into_vec();
    bytes[1] = 0x01;
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);
}

#[test]
fn declared_length_past_end() {
    let buf = vpack!([1, 2, 3, 4, 5]).unwrap();
    let mut bytes = buf.into_vec();
    bytes[1] = 0x20;
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::BufferExhausted);
}

#[test]
fn non_string_keys() {
    // Compact object with an integer key.
    let bytes = [0x14, 0x05, 0x31, 0x32, 0x01];
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::TypeMismatch);
}

#[test]
fn indexed_container_with_zero_count() {
    let bytes = [0x06, 0x03, 0x00];
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);
}

#[test]
fn sorted_table_must_be_sorted() {
    let mut b = Builder::with_options(BuilderOptions::indexed_sorted());
    b.open_object().unwrap();
    b.add_entry("b", 1).unwrap();
    b.add_entry("a", 2).unwrap();
    b.close().unwrap();
    let mut bytes = b.finish().unwrap().into_vec();
    validate(&bytes, limits(&bytes)).unwrap();

    let n = bytes.len();
    bytes.swap(n - 1, n - 2);
    assert_eq!(code(&bytes, limits(&bytes)), ErrorCode::InconsistentLength);

    // Same bytes announced as unsorted: the table must follow member order.
    bytes[0] = 0x0f;
    validate(&bytes, limits(&bytes)).unwrap();
}

#[test]
fn duplicate_attributes() {
    let mut b = Builder::new();
    b.open_object().unwrap();
    b.add_entry("a", 1).unwrap();
    b.add_entry("a", 2).unwrap();
    b.close().unwrap();
    let buf = b.finish().unwrap();

    validate(buf.as_bytes(), limits(buf.as_bytes())).unwrap();
    let err = validate(buf.as_bytes(), limits(buf.as_bytes()).strict()).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateAttribute);
}

#[test]
fn padded_headers_are_valid() {
    let bytes = [0x06, 0x0d, 0x02, 0, 0, 0, 0, 0, 0, 0x31, 0x32, 0x09, 0x0a];
    let root = validate(&bytes, limits(&bytes)).unwrap();
    assert_eq!(root.at(1).unwrap().get_int().unwrap(), 2);
}

#[test]
fn buffer_from_vec_validates() {
    let good = vpack!({ k: "v" }).unwrap().into_vec();
    let buf = Buffer::from_vec(good.clone(), DecodeLimits::default()).unwrap();
    assert_eq!(buf.as_bytes(), good.as_slice());

    let mut bad = good;
    bad.push(0x18);
    let err = Buffer::from_vec(bad, DecodeLimits::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::TrailingBytes);
}

#[test]
fn error_display_names_the_stage() {
    let err = validate(&[0x18, 0x18], DecodeLimits::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "vpack validation failed at 1: trailing bytes after top-level value"
    );
    let err = validate(&[0x15], DecodeLimits::default()).unwrap_err();
    assert!(err.to_string().starts_with("vpack decode failed at 0"));
}
