use core::cmp::Ordering;

use vpack::{compare, equals, vpack, Buffer, Builder, BuilderOptions, Slice};

fn one<'a>(v: impl Into<vpack::Value<'a>>) -> Buffer {
    let mut b = Builder::new();
    b.add(v).unwrap();
    b.finish().unwrap()
}

fn cmp(a: &Buffer, b: &Buffer) -> Ordering {
    compare(a.slice(), b.slice()).unwrap()
}

#[test]
fn types_rank_before_values() {
    let ordered = [
        one(()),
        one(false),
        one(true),
        one(-100),
        one(0.5),
        one(7u8),
        one(""),
        one("a"),
        one(&b"\x00"[..]),
        vpack!([]).unwrap(),
        vpack!([0]).unwrap(),
        vpack!({}).unwrap(),
    ];
    for (i, a) in ordered.iter().enumerate() {
        for (j, b) in ordered.iter().enumerate() {
            assert_eq!(cmp(a, b), i.cmp(&j), "{a} vs {b}");
        }
    }
}

#[test]
fn none_sorts_first() {
    let none = [0x00u8];
    let null = one(());
    assert_eq!(
        compare(Slice::new(&none), null.slice()).unwrap(),
        Ordering::Less
    );
}

#[test]
fn numbers_compare_across_encodings() {
    assert_eq!(cmp(&one(1), &one(1.0)), Ordering::Equal);
    assert_eq!(cmp(&one(1u64), &one(1i64)), Ordering::Equal);
    assert_eq!(cmp(&one(-1), &one(0u8)), Ordering::Less);
    assert_eq!(cmp(&one(2), &one(1.5)), Ordering::Greater);
    assert_eq!(cmp(&one(u64::MAX), &one(i64::MAX)), Ordering::Greater);
    assert_eq!(cmp(&one(i64::MIN), &one(-1e300)), Ordering::Greater);
    assert_eq!(cmp(&one(u64::MAX), &one(1.8e19)), Ordering::Greater);
    assert_eq!(cmp(&one(u64::MAX), &one(f64::INFINITY)), Ordering::Less);
    assert_eq!(cmp(&one(-0.0), &one(0)), Ordering::Equal);

    // 2^53 + 1 is not representable as a double; the comparison stays exact.
    let big = (1u64 << 53) + 1;
    assert_eq!(cmp(&one(big), &one(9_007_199_254_740_992.0)), Ordering::Greater);

    assert_eq!(cmp(&one(f64::NAN), &one(f64::INFINITY)), Ordering::Greater);
    assert_eq!(cmp(&one(f64::NAN), &one(u64::MAX)), Ordering::Greater);
    assert_eq!(cmp(&one(f64::NAN), &one(f64::NAN)), Ordering::Equal);
}

#[test]
fn strings_and_binaries_bytewise() {
    assert_eq!(cmp(&one("abc"), &one("abd")), Ordering::Less);
    assert_eq!(cmp(&one("ab"), &one("abc")), Ordering::Less);
    assert_eq!(cmp(&one("Z"), &one("a")), Ordering::Less);
    let long = "q".repeat(200);
    assert_eq!(cmp(&one(long.as_str()), &one("r")), Ordering::Less);
    assert_eq!(cmp(&one(&[1u8, 2][..]), &one(&[1u8, 3][..])), Ordering::Less);
}

#[test]
fn arrays_lexicographic() {
    let a = vpack!([1, 2, 3]).unwrap();
    let b = vpack!([1, 2, 4]).unwrap();
    let prefix = vpack!([1, 2]).unwrap();
    assert_eq!(cmp(&a, &b), Ordering::Less);
    assert_eq!(cmp(&prefix, &a), Ordering::Less);
    assert_eq!(cmp(&a, &prefix), Ordering::Greater);

    let mut builder = Builder::with_options(BuilderOptions {
        compact_threshold: 0,
        ..BuilderOptions::default()
    });
    builder.open_array().unwrap();
    for v in [1, 2, 3] {
        builder.add(v).unwrap();
    }
    builder.close().unwrap();
    let indexed = builder.finish().unwrap();
    assert_ne!(indexed.as_bytes(), a.as_bytes());
    assert!(equals(indexed.slice(), a.slice()).unwrap());
}

#[test]
fn objects_ignore_order_and_layout() {
    let a = vpack!({ x: 1, y: [true], z: "s" }).unwrap();
    let b = vpack!({ z: "s", x: 1.0, y: [true] }).unwrap();

    let mut sorted = Builder::with_options(BuilderOptions::indexed_sorted());
    sorted.add_json(&vpack::Json::Object(vec![
        ("y".into(), vpack::Json::Array(vec![vpack::Json::Bool(true)])),
        ("z".into(), "s".into()),
        ("x".into(), 1.0.into()),
    ]))
    .unwrap();
    let c = sorted.finish().unwrap();

    assert!(equals(a.slice(), b.slice()).unwrap());
    assert!(equals(a.slice(), c.slice()).unwrap());
    assert!(equals(c.slice(), b.slice()).unwrap());
}

#[test]
fn objects_order_by_sorted_entries() {
    let a = vpack!({ a: 1 }).unwrap();
    let b = vpack!({ a: 2 }).unwrap();
    let c = vpack!({ b: 0 }).unwrap();
    let d = vpack!({ a: 1, b: 0 }).unwrap();
    assert_eq!(cmp(&a, &b), Ordering::Less);
    assert_eq!(cmp(&b, &c), Ordering::Less);
    assert_eq!(cmp(&a, &d), Ordering::Less);
    assert_eq!(cmp(&d, &c), Ordering::Less);
}

#[test]
fn nested_values_in_different_layouts() {
    let mut b = Builder::with_options(BuilderOptions {
        build_unindexed_arrays: true,
        build_unindexed_objects: true,
        ..BuilderOptions::default()
    });
    b.open_object().unwrap();
    for i in 0..10 {
        b.add_key(&format!("k{i}")).unwrap();
        b.open_array().unwrap();
        for j in 0..i {
            b.add(j).unwrap();
        }
        b.close().unwrap();
    }
    b.close().unwrap();
    let compact = b.finish().unwrap();

    let mut b = Builder::with_options(BuilderOptions::indexed_sorted());
    b.open_object().unwrap();
    for i in (0..10).rev() {
        b.add_key(&format!("k{i}")).unwrap();
        b.open_array().unwrap();
        for j in 0..i {
            b.add(f64::from(j)).unwrap();
        }
        b.close().unwrap();
    }
    b.close().unwrap();
    let indexed = b.finish().unwrap();

    assert!(equals(compact.slice(), indexed.slice()).unwrap());
}

fn nested_arrays(depth: usize) -> Buffer {
    let mut b = Builder::new();
    for _ in 0..depth {
        b.open_array().unwrap();
    }
    for _ in 0..depth {
        b.close().unwrap();
    }
    b.finish().unwrap()
}

#[test]
fn deep_nesting_is_bounded() {
    let limit = vpack::DEFAULT_MAX_DEPTH;
    let a = nested_arrays(limit);
    let b = nested_arrays(limit - 1);
    assert_eq!(cmp(&a, &b), Ordering::Greater);
    assert!(equals(a.slice(), a.slice()).unwrap());

    let deep = nested_arrays(limit + 1);
    let err = compare(deep.slice(), deep.slice()).unwrap_err();
    assert_eq!(err.code, vpack::ErrorCode::DepthLimitExceeded);
    assert!(equals(deep.slice(), deep.slice()).is_err());

    // Different ranks are decided before descending.
    assert_eq!(cmp(&deep, &one(1)), Ordering::Greater);
}
