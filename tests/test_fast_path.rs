use std::collections::BTreeMap;

use bsondoc::{array, de, doc, ser, Binary, DateTime, Deserialize, Document, Error, ObjectId, Primitive, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Record {
    id: ObjectId,
    name: String,
    score: f64,
    ratio: f32,
    count: u32,
    small: i16,
    flags: Vec<bool>,
    note: Option<String>,
    tags: BTreeMap<String, i64>,
    created: DateTime,
    blob: Binary,
    extra: Primitive,
}

fn record() -> Record {
    let mut tags = BTreeMap::new();
    tags.insert("a".to_owned(), 1);
    tags.insert("b".to_owned(), -2);
    Record {
        id: ObjectId::from_hex("5f1d7ff0a1b2c3d4e5f60718").unwrap(),
        name: "fast".to_owned(),
        score: 12.75,
        ratio: 0.25,
        count: 4_000_000_000,
        small: -300,
        flags: vec![true, false, true],
        note: None,
        tags,
        created: DateTime::from_millis(1_234_567),
        blob: Binary::generic(vec![0xde, 0xad]),
        extra: Primitive::Document(doc! { "nested": array![1, "two"] }),
    }
}

#[test]
fn test_paths_agree() {
    let bytes = ser::to_bin(&record()).unwrap();

    let fast: Record = de::from_bin(&bytes).unwrap();
    let general: Record = de::from_bin_with(&bytes, &Default::default()).unwrap();
    assert_eq!(fast, record());
    assert_eq!(general, record());
}

#[test]
fn test_fields_in_any_order() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Reversed {
        c: i32,
        b: String,
        a: bool,
    }

    let bytes = doc! { "a": true, "b": "bee", "c": 3, "d": 4.0 }.to_vec();
    let out: Reversed = de::from_bin(&bytes).unwrap();
    assert_eq!(
        out,
        Reversed {
            c: 3,
            b: "bee".to_owned(),
            a: true
        }
    );
}

#[test]
fn test_errors_carry_paths() {
    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: Vec<Inner>,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        v: u8,
    }

    let bytes = doc! { "inner": array![doc! { "v": 1 }, doc! { "v": -1 }] }.to_vec();
    match de::from_bin::<Outer>(&bytes) {
        Err(Error::TypeConversion { path, to, .. }) => {
            assert_eq!(path.to_string(), "inner[1].v");
            assert_eq!(to, "u8");
        }
        other => panic!("unexpected {:?}", other),
    }

    let bytes = doc! { "inner": array![doc! {}] }.to_vec();
    match de::from_bin::<Outer>(&bytes) {
        Err(Error::ValueNotFound { path }) => assert_eq!(path.to_string(), "inner[0].v"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_structural_errors() {
    let mut bytes = doc! { "s": "abc" }.to_vec();
    // Break the string terminator.
    let last = bytes.len() - 2;
    bytes[last] = b'!';

    #[derive(Debug, Deserialize)]
    struct S {
        #[allow(dead_code)]
        s: String,
    }
    match de::from_bin::<S>(&bytes) {
        Err(Error::ParseError { offset: 7, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(Document::from_bytes(bytes).is_err());

    assert!(matches!(
        de::from_bin::<S>(&[5, 0, 0]),
        Err(Error::InvalidElementSize { .. })
    ));
}
