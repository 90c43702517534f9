use bsondoc::{array, doc, Binary, BinarySubtype, DateTime, Document, Error, ObjectId, Primitive, TypeIdentifier};

const HELLO: [u8; 22] = [
    0x16, 0x00, 0x00, 0x00, 0x02, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0x06, 0x00, 0x00, 0x00, 0x77,
    0x6f, 0x72, 0x6c, 0x64, 0x00, 0x00,
];

#[test]
fn test_hello_world() {
    let doc = doc! { "hello": "world" };
    assert_eq!(doc.as_bytes(), &HELLO[..]);

    let parsed = Document::from_bytes(HELLO.to_vec()).unwrap();
    assert_eq!(parsed.get("hello"), Some(Primitive::from("world")));
    assert_eq!(parsed.into_bytes(), HELLO.to_vec());
}

#[test]
fn test_double_bytes() {
    let bytes = vec![
        0x10, 0x00, 0x00, 0x00, 0x01, b'd', 0x00, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x14, 0x40,
        0x00,
    ];
    let doc = Document::from_bytes(bytes).unwrap();
    assert_eq!(doc.get("d"), Some(Primitive::Double(5.05)));
}

#[test]
fn test_copy_isolation() {
    let original = doc! { "a": 1, "b": "two" };
    let mut copy = original.clone();
    copy.insert("a", 100).unwrap();
    copy.insert("c", true).unwrap();

    assert_eq!(original.get("a"), Some(Primitive::Int32(1)));
    assert!(!original.contains_key("c"));
    assert_eq!(copy.get("a"), Some(Primitive::Int32(100)));
    original.validate().unwrap();
    copy.validate().unwrap();
}

#[test]
fn test_none_and_null() {
    let mut doc = doc! { "k": 1 };
    doc.set("k", None).unwrap();
    assert!(!doc.contains_key("k"));

    doc.insert("k", Primitive::Null).unwrap();
    assert_eq!(doc.get("k"), Some(Primitive::Null));
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_array_shape() {
    let list = array!["a", "b", "c"];
    assert!(list.is_array());
    assert_eq!(list.keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);
    assert!(!doc! { "x": 1 }.is_array());

    let outer = doc! { "list": list };
    assert_eq!(
        outer.get("list").map(|v| v.type_identifier()),
        Some(TypeIdentifier::Array)
    );
    assert_eq!(outer.as_bytes()[4], 0x04);
}

#[test]
fn test_every_type_survives() {
    let id = ObjectId::from_hex("507f1f77bcf86cd799439011").unwrap();
    let doc = doc! {
        "double": 1.5,
        "string": "s",
        "doc": doc! { "x": 1 },
        "array": array![1, 2],
        "binary": Binary::new(BinarySubtype::Uuid, vec![7; 16]),
        "oid": id,
        "bool": true,
        "date": DateTime::from_millis(1_600_000_000_000),
        "null": Primitive::Null,
        "int32": 32,
        "int64": 64_i64,
        "min": Primitive::MinKey,
        "max": Primitive::MaxKey,
    };
    doc.validate().unwrap();

    let back = Document::from_bytes(doc.to_vec()).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.get("oid"), Some(Primitive::ObjectId(id)));
    assert_eq!(back.get("int64"), Some(Primitive::Int64(64)));
    assert_eq!(
        back.get("binary").and_then(|b| b.as_binary().map(|b| b.subtype)),
        Some(BinarySubtype::Uuid)
    );
    assert_eq!(back.len(), 13);
}

#[test]
fn test_iteration_order() {
    let doc = doc! { "z": 1, "a": 2, "m": 3 };
    let pairs: Vec<(String, Primitive)> = doc.into_iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("z".to_owned(), Primitive::Int32(1)),
            ("a".to_owned(), Primitive::Int32(2)),
            ("m".to_owned(), Primitive::Int32(3)),
        ]
    );
}

#[test]
fn test_index_access() {
    let mut list = array![10, 20, 30];
    assert_eq!(list.get_index(2), Some(Primitive::Int32(30)));
    assert_eq!(list.get_index(3), None);

    assert_eq!(list.remove_index(0), Some(Primitive::Int32(10)));
    assert!(list.has_sequential_keys());
    assert_eq!(list.get("0"), Some(Primitive::Int32(20)));

    match list.set_index(5, 1) {
        Err(Error::InvalidOperation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_rejects_malformed() {
    let mut bytes = HELLO.to_vec();
    bytes[20] = b'!';
    match Document::from_bytes(bytes) {
        Err(Error::ParseError { offset: 11, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let mut bytes = HELLO.to_vec();
    bytes[4] = 0x0E;
    match Document::from_bytes(bytes) {
        Err(Error::InvalidOperation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let mut bytes = HELLO.to_vec();
    bytes[4] = 0x42;
    match Document::from_bytes(bytes) {
        Err(Error::UnknownType { offset: 4, tag: 0x42 }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let mut bytes = HELLO.to_vec();
    bytes.pop();
    assert!(matches!(
        Document::from_bytes(bytes),
        Err(Error::InvalidDocumentLength { offset: 0, .. })
    ));
}

#[test]
fn test_nested_mutation() {
    let mut root = doc! { "user": doc! { "name": "ann", "age": 30 } };
    root.document_mut("user", |user| user.insert("age", 31))
        .unwrap()
        .unwrap();
    root.validate().unwrap();
    assert_eq!(root.get_path(&["user", "age"]), Some(Primitive::Int32(31)));

    match root.document_mut("missing", |d| d.len()) {
        Ok(0) => {}
        other => panic!("unexpected {:?}", other),
    }

    root.insert("flat", 1).unwrap();
    match root.document_mut("flat", |d| d.len()) {
        Err(Error::TypeConversion { from, .. }) => assert_eq!(from, TypeIdentifier::Int32),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_failed_set_path_changes_nothing() {
    let mut root = doc! { "user": doc! { "name": "ann" } };
    let before = root.to_vec();

    match root.set_path(&["user", "prefs", "bad\0key"], Some(Primitive::Bool(true))) {
        Err(Error::InvalidKey(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(root.to_vec(), before);
    assert_eq!(root.get_path(&["user", "prefs"]), None);

    match root.set_path(&["user", "name", "first"], Some(Primitive::from("a"))) {
        Err(Error::TypeConversion { from, .. }) => assert_eq!(from, TypeIdentifier::String),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(root.to_vec(), before);
}
