use vpack::harness::{BenchmarkOperation, DocumentCreation, Payload, RequestContext, RequestType};
use vpack::{validate, DecodeLimits};

struct NoClient;

fn ctx(global_counter: usize) -> RequestContext {
    RequestContext {
        thread: 0,
        thread_counter: global_counter,
        global_counter,
    }
}

#[test]
fn document_creation_request() {
    let mut op = DocumentCreation::new("products", 3);
    BenchmarkOperation::<NoClient>::set_up(&mut op, &mut NoClient).unwrap();

    let url = BenchmarkOperation::<NoClient>::url(&op, ctx(7));
    assert_eq!(url, "/_api/document?collection=products");
    assert_eq!(
        BenchmarkOperation::<NoClient>::request_type(&op, ctx(7)),
        RequestType::Post
    );
    assert_eq!(RequestType::Post.as_str(), "POST");

    let payload = BenchmarkOperation::<NoClient>::payload(&op, ctx(7)).unwrap();
    assert!(payload.must_free());
    let doc = validate(payload.as_bytes(), DecodeLimits::default().strict()).unwrap();
    assert_eq!(doc.length().unwrap(), 4);
    assert_eq!(doc.get("_key").unwrap().unwrap().as_str().unwrap(), "test7");
    assert_eq!(
        doc.get("value3").unwrap().unwrap().as_str().unwrap(),
        "some value 3"
    );

    BenchmarkOperation::<NoClient>::tear_down(&mut op);
}

#[test]
fn payload_kinds() {
    assert!(Payload::Empty.as_bytes().is_empty());
    assert!(!Payload::Empty.must_free());
    let raw = [0x18u8];
    let borrowed = Payload::Borrowed(&raw);
    assert_eq!(borrowed.as_bytes(), &[0x18]);
    assert!(!borrowed.must_free());
}

#[test]
fn keys_follow_the_global_counter() {
    let op = DocumentCreation::new("c", 0);
    for n in [0usize, 1, 999] {
        let payload = BenchmarkOperation::<NoClient>::payload(&op, ctx(n)).unwrap();
        let Payload::Owned(buf) = payload else {
            panic!("expected an owned body");
        };
        let key = buf.slice().get("_key").unwrap().unwrap();
        assert_eq!(key.as_str().unwrap(), format!("test{n}"));
    }
}
