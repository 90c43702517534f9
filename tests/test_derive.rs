use bsondoc::{array, de, doc, ser, Deserialize, Error, ObjectId, Primitive, Serialize};

#[derive(PartialEq, Debug, Serialize, Deserialize)]
enum Tag {
    A,
    #[bsondoc(rename = "renamedB")]
    B,
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Example {
    x: String,
    t1: Tag,
    t2: Tag,
    n: Nested,
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Nested {
    y: Option<Vec<String>>,
    z: Option<String>,
}

fn example() -> Example {
    Example {
        x: "X".to_owned(),
        t1: Tag::A,
        t2: Tag::B,
        n: Nested {
            y: Some(vec!["Y".to_owned(), "Y".to_owned()]),
            z: None,
        },
    }
}

#[test]
fn test_de() {
    let doc = doc! {
        "x": "X",
        "t1": "A",
        "t2": "renamedB",
        "n": doc! { "y": array!["Y", "Y"] },
    };
    let actual: Example = de::from_document(&doc).unwrap();
    assert_eq!(actual, example());
}

#[test]
fn test_ser() {
    let actual = ser::to_document(&example()).unwrap();
    let expected = doc! {
        "x": "X",
        "t1": "A",
        "t2": "renamedB",
        "n": doc! { "y": array!["Y", "Y"] },
    };
    assert_eq!(actual, expected);
}

#[test]
fn test_bin_matches_tree() {
    let tree = ser::to_document(&example()).unwrap();
    let bin = ser::to_bin(&example()).unwrap();
    assert_eq!(tree.as_bytes(), &bin[..]);

    let back: Example = de::from_bin(&bin).unwrap();
    assert_eq!(back, example());
}

fn seven() -> u32 {
    7
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Attributes {
    #[bsondoc(rename = "_id")]
    id: ObjectId,
    #[bsondoc(skip)]
    cache: Vec<u8>,
    #[bsondoc(default)]
    retries: u32,
    #[bsondoc(default = "seven")]
    limit: u32,
}

#[test]
fn test_attributes() {
    let id = ObjectId::from_hex("5f1d7ff0a1b2c3d4e5f60718").unwrap();
    let value = Attributes {
        id,
        cache: vec![1, 2, 3],
        retries: 2,
        limit: 9,
    };

    let doc = ser::to_document(&value).unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["_id", "retries", "limit"]);
    assert_eq!(doc.get("_id"), Some(Primitive::ObjectId(id)));

    let sparse = doc! { "_id": id };
    let back: Attributes = de::from_document(&sparse).unwrap();
    assert_eq!(
        back,
        Attributes {
            id,
            cache: vec![],
            retries: 0,
            limit: 7,
        }
    );
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Meters(f64);

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Point(i32, i32, String);

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Shapes {
    length: Meters,
    origin: Point,
}

#[test]
fn test_tuple_structs() {
    let shapes = Shapes {
        length: Meters(2.5),
        origin: Point(1, -1, "o".to_owned()),
    };
    let doc = ser::to_document(&shapes).unwrap();
    assert_eq!(doc.get("length"), Some(Primitive::Double(2.5)));
    assert_eq!(doc.get_path(&["origin", "2"]), Some(Primitive::from("o")));

    let back: Shapes = de::from_document(&doc).unwrap();
    assert_eq!(back, shapes);
}

#[test]
fn test_missing_field_path() {
    let doc = doc! { "x": "X", "t1": "A", "t2": "A", "n": doc! { "z": 1 } };
    match de::from_document::<Example>(&doc) {
        Err(Error::TypeConversion { path, to, .. }) => {
            assert_eq!(path.to_string(), "n.z");
            assert_eq!(to, "string");
        }
        other => panic!("unexpected {:?}", other),
    }

    let doc = doc! { "t1": "A" };
    match de::from_document::<Example>(&doc) {
        Err(Error::ValueNotFound { path }) => assert_eq!(path.to_string(), "x"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_variant() {
    let doc = doc! { "x": "X", "t1": "C", "t2": "A", "n": doc! {} };
    match de::from_document::<Example>(&doc) {
        Err(Error::Custom(message)) => assert!(message.contains("`C`")),
        other => panic!("unexpected {:?}", other),
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
struct Row {
    cells: (i32, String, bool, f64, i64),
}

#[test]
fn test_wide_tuples() {
    let row = Row {
        cells: (1, "two".to_owned(), true, 4.5, 5),
    };
    let doc = ser::to_document(&row).unwrap();
    assert_eq!(doc.get_path(&["cells", "4"]), Some(Primitive::Int64(5)));

    let back: Row = de::from_document(&doc).unwrap();
    assert_eq!(back, row);
    let back: Row = de::from_bin(doc.as_bytes()).unwrap();
    assert_eq!(back, row);

    let (a, b, c, d): (i32, i32, i32, i32) = de::from_primitive(Primitive::Document(array![1, 2, 3, 4])).unwrap();
    assert_eq!((a, b, c, d), (1, 2, 3, 4));

    let short = doc! { "cells": array![1, "two"] };
    match de::from_document::<Row>(&short) {
        Err(Error::Custom(message)) => assert!(message.contains('2')),
        other => panic!("unexpected {:?}", other),
    }
}
