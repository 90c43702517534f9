use std::sync::Arc;

use bsondoc::settings::{
    FloatDecodingStrategy, IntegerDecodingStrategy, NoneEncodingStrategy, StringDecodingStrategy,
    UnsignedEncodingStrategy,
};
use bsondoc::{de, doc, ser, DecoderSettings, Deserialize, EncoderSettings, Error, ObjectId, Primitive, Serialize, TypeIdentifier};

#[derive(Debug, PartialEq, Deserialize)]
struct Small {
    n: i8,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Wide {
    n: i64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Ratio {
    r: f32,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Label {
    s: String,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Owner {
    id: ObjectId,
}

#[test]
fn test_narrowing_fails() {
    let doc = doc! { "n": 1_i64 << 40 };
    match de::from_document::<Small>(&doc) {
        Err(Error::TypeConversion { path, from, to }) => {
            assert_eq!(path.to_string(), "n");
            assert_eq!(from, TypeIdentifier::Int64);
            assert_eq!(to, "i8");
        }
        other => panic!("unexpected {:?}", other),
    }

    let ok: Small = de::from_document(&doc! { "n": 100_i64 }).unwrap();
    assert_eq!(ok, Small { n: 100 });
}

#[test]
fn test_widening_never_fails() {
    let out: Wide = de::from_document(&doc! { "n": -5 }).unwrap();
    assert_eq!(out, Wide { n: -5 });

    let strict = DecoderSettings::strict();
    assert!(de::from_document_with::<Wide>(&doc! { "n": -5 }, &strict).is_err());
    let out: Wide = de::from_document_with(&doc! { "n": -5_i64 }, &strict).unwrap();
    assert_eq!(out, Wide { n: -5 });
}

#[test]
fn test_rounding_and_textual() {
    let rounding = DecoderSettings::default().i8(IntegerDecodingStrategy::RoundingAnyNumber);
    let out: Small = de::from_document_with(&doc! { "n": 2.6 }, &rounding).unwrap();
    assert_eq!(out, Small { n: 3 });
    assert!(de::from_document_with::<Small>(&doc! { "n": 300.0 }, &rounding).is_err());

    let textual = DecoderSettings::default().i8(IntegerDecodingStrategy::Textual);
    let out: Small = de::from_document_with(&doc! { "n": " -12 " }, &textual).unwrap();
    assert_eq!(out, Small { n: -12 });
    assert!(de::from_document_with::<Small>(&doc! { "n": "lots" }, &textual).is_err());
}

#[test]
fn test_adaptive() {
    let adaptive = DecoderSettings::adaptive();

    let out: Small = de::from_document_with(&doc! { "n": 4.0 }, &adaptive).unwrap();
    assert_eq!(out, Small { n: 4 });
    assert!(de::from_document_with::<Small>(&doc! { "n": 4.5 }, &adaptive).is_err());

    let out: Label = de::from_document_with(&doc! { "s": 42 }, &adaptive).unwrap();
    assert_eq!(out.s, "42");
    let out: Label = de::from_document_with(&doc! { "s": true }, &adaptive).unwrap();
    assert_eq!(out.s, "true");

    let id = ObjectId::from_hex("000000010000000000000002").unwrap();
    let out: Owner = de::from_document_with(&doc! { "id": id.to_hex() }, &adaptive).unwrap();
    assert_eq!(out.id, id);
    assert!(de::from_document::<Owner>(&doc! { "id": id.to_hex() }).is_err());
}

#[test]
fn test_floats() {
    let out: Ratio = de::from_document(&doc! { "r": 0.5 }).unwrap();
    assert_eq!(out.r, 0.5);
    assert!(de::from_document::<Ratio>(&doc! { "r": 0.1 }).is_err());
    assert!(de::from_document::<Ratio>(&doc! { "r": 1 }).is_err());

    let any = DecoderSettings::default().f32(FloatDecodingStrategy::AnyNumber);
    let out: Ratio = de::from_document_with(&doc! { "r": 0.1 }, &any).unwrap();
    assert_eq!(out.r, 0.1_f32);
    let out: Ratio = de::from_document_with(&doc! { "r": 3 }, &any).unwrap();
    assert_eq!(out.r, 3.0);
}

#[test]
fn test_string_sources() {
    let numerical = DecoderSettings::default().string(StringDecodingStrategy::Numerical);
    let out: Label = de::from_document_with(&doc! { "s": 1.25 }, &numerical).unwrap();
    assert_eq!(out.s, "1.25");

    let integers = DecoderSettings::default().string(StringDecodingStrategy::Integers);
    assert!(de::from_document_with::<Label>(&doc! { "s": 1.25 }, &integers).is_err());
}

#[test]
fn test_custom_sees_the_key() {
    let settings = DecoderSettings::default().i8(IntegerDecodingStrategy::Custom(Arc::new(
        |key: &str, value: &Primitive| match value {
            Primitive::String(s) if key == "n" => Some(s.len() as i8),
            _ => None,
        },
    )));
    let out: Small = de::from_document_with(&doc! { "n": "four" }, &settings).unwrap();
    assert_eq!(out, Small { n: 4 });
}

#[test]
fn test_dollar_prefix() {
    let doc = doc! { "$s": "operator" };
    assert!(de::from_document::<Label>(&doc).is_err());

    let settings = DecoderSettings::default().filter_dollar_prefix(true);
    let out: Label = de::from_document_with(&doc, &settings).unwrap();
    assert_eq!(out.s, "operator");
}

#[derive(Serialize)]
struct Counters {
    small: u16,
    big: u64,
    missing: Option<i32>,
}

#[test]
fn test_encoder_settings() {
    let value = Counters {
        small: 7,
        big: u64::MAX,
        missing: None,
    };

    match ser::to_document(&value) {
        Err(Error::UnsignedOverflow(n)) => assert_eq!(n, u64::MAX),
        other => panic!("unexpected {:?}", other),
    }
    match ser::to_bin(&value) {
        Err(Error::UnsignedOverflow(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let settings = EncoderSettings::default()
        .unsigned(UnsignedEncodingStrategy::String)
        .none(NoneEncodingStrategy::Null);
    let doc = ser::to_document_with(&value, &settings).unwrap();
    assert_eq!(doc.get("small"), Some(Primitive::Int32(7)));
    assert_eq!(doc.get("big"), Some(Primitive::from("18446744073709551615")));
    assert_eq!(doc.get("missing"), Some(Primitive::Null));

    let bin = ser::to_bin_with(&value, &settings).unwrap();
    assert_eq!(doc.as_bytes(), &bin[..]);
}

#[test]
fn test_none_inside_arrays() {
    let values = vec![Some(1), None, Some(3)];
    let doc = ser::to_document(&Wrapper { v: &values }).unwrap();
    assert_eq!(doc.get_path(&["v", "1"]), Some(Primitive::Null));
    assert_eq!(doc.get_path(&["v", "2"]), Some(Primitive::Int32(3)));
}

#[derive(Serialize)]
struct Wrapper<'a> {
    v: &'a Vec<Option<i32>>,
}

#[test]
fn test_root_must_be_a_document() {
    match ser::to_document(&5) {
        Err(Error::InvalidOperation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(ser::to_bin("text").is_err());
    assert_eq!(ser::to_primitive(&5).unwrap(), Primitive::Int32(5));
}
