use proptest::prelude::*;

use bsondoc::{de, Document, Primitive};

fn leaf() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        any::<i32>().prop_map(Primitive::Int32),
        any::<i64>().prop_map(Primitive::Int64),
        any::<f64>().prop_map(Primitive::Double),
        any::<bool>().prop_map(Primitive::Bool),
        ".{0,12}".prop_map(Primitive::String),
        Just(Primitive::Null),
    ]
}

fn document(pairs: Vec<(String, Primitive)>) -> Document {
    let mut doc = Document::new();
    for (k, v) in pairs {
        doc.insert(&k, v).unwrap();
    }
    doc
}

fn array(items: Vec<Primitive>) -> Document {
    let mut doc = Document::new_array();
    for v in items {
        doc.push(v).unwrap();
    }
    doc
}

fn value() -> impl Strategy<Value = Primitive> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(("[a-z]{1,6}", inner.clone()), 0..4)
                .prop_map(|pairs| Primitive::Document(document(pairs))),
            prop::collection::vec(inner, 0..4).prop_map(|items| Primitive::Document(array(items))),
        ]
    })
}

fn root() -> impl Strategy<Value = Document> {
    prop::collection::vec(("[a-z]{1,6}", value()), 0..6).prop_map(document)
}

proptest! {
    #[test]
    fn bytes_round_trip(doc in root()) {
        doc.validate().unwrap();
        let back = Document::from_bytes(doc.to_vec()).unwrap();
        prop_assert_eq!(back.as_bytes(), doc.as_bytes());
        prop_assert_eq!(back.len(), doc.len());
    }

    #[test]
    fn clones_are_isolated(doc in root(), v in leaf()) {
        let before = doc.to_vec();
        let mut copy = doc.clone();
        copy.insert("written", v).unwrap();
        if let Some(first) = doc.keys().next() {
            copy.remove(first);
        }
        prop_assert_eq!(doc.as_bytes(), &before[..]);
        copy.validate().unwrap();
    }

    #[test]
    fn decoders_agree(doc in root()) {
        let bytes = doc.to_vec();
        let fast: Primitive = de::from_bin(&bytes).unwrap();
        let general: Primitive = de::from_bin_with(&bytes, &Default::default()).unwrap();
        prop_assert_eq!(fast.as_document().unwrap().as_bytes(), &bytes[..]);
        prop_assert_eq!(general.as_document().unwrap().as_bytes(), &bytes[..]);
    }

    #[test]
    fn validation_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Document::from_bytes(bytes.clone());
        let _ = de::from_bin::<Primitive>(&bytes);
    }

    #[test]
    fn corrupted_documents_never_panic(doc in root(), at in any::<usize>(), byte in any::<u8>()) {
        let mut bytes = doc.to_vec();
        let at = at % bytes.len();
        bytes[at] = byte;
        if let Ok(parsed) = Document::from_bytes(bytes.clone()) {
            let _ = parsed.iter().count();
        }
        let _ = de::from_bin::<Primitive>(&bytes);
    }
}
