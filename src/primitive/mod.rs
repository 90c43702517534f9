//! The closed set of values a document can hold.

mod values;

pub use self::values::{
    Binary, DateTime, Decimal128, JavaScriptCode, JavaScriptCodeWithScope, RegexOptions,
    RegularExpression, Timestamp,
};

use crate::document::Document;
use crate::oid::ObjectId;
use crate::tag::TypeIdentifier;

/// Any value that can appear inside a [`Document`].
///
/// `Document` covers both embedded documents and arrays, told apart by
/// [`Document::is_array`].
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Double(f64),
    String(String),
    Document(Document),
    Binary(Binary),
    ObjectId(ObjectId),
    Bool(bool),
    DateTime(DateTime),
    Null,
    RegularExpression(RegularExpression),
    JavaScriptCode(JavaScriptCode),
    JavaScriptCodeWithScope(JavaScriptCodeWithScope),
    Int32(i32),
    Timestamp(Timestamp),
    Int64(i64),
    Decimal128(Decimal128),
    MinKey,
    MaxKey,
}

impl Primitive {
    pub fn type_identifier(&self) -> TypeIdentifier {
        match self {
            Primitive::Double(_) => TypeIdentifier::Double,
            Primitive::String(_) => TypeIdentifier::String,
            Primitive::Document(d) if d.is_array() => TypeIdentifier::Array,
            Primitive::Document(_) => TypeIdentifier::Document,
            Primitive::Binary(_) => TypeIdentifier::Binary,
            Primitive::ObjectId(_) => TypeIdentifier::ObjectId,
            Primitive::Bool(_) => TypeIdentifier::Boolean,
            Primitive::DateTime(_) => TypeIdentifier::DateTime,
            Primitive::Null => TypeIdentifier::Null,
            Primitive::RegularExpression(_) => TypeIdentifier::RegularExpression,
            Primitive::JavaScriptCode(_) => TypeIdentifier::JavaScriptCode,
            Primitive::JavaScriptCodeWithScope(_) => TypeIdentifier::JavaScriptCodeWithScope,
            Primitive::Int32(_) => TypeIdentifier::Int32,
            Primitive::Timestamp(_) => TypeIdentifier::Timestamp,
            Primitive::Int64(_) => TypeIdentifier::Int64,
            Primitive::Decimal128(_) => TypeIdentifier::Decimal128,
            Primitive::MinKey => TypeIdentifier::MinKey,
            Primitive::MaxKey => TypeIdentifier::MaxKey,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Primitive::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Primitive::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Primitive::Int32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Int64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Primitive::ObjectId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Primitive::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Primitive::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Primitive::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Int32 or Int64 widened to `i64`.
    pub(crate) fn as_integer(&self) -> Option<i64> {
        match self {
            Primitive::Int32(n) => Some(*n as i64),
            Primitive::Int64(n) => Some(*n),
            _ => None,
        }
    }
}

macro_rules! from_impl {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for Primitive {
                fn from(v: $t) -> Self {
                    Primitive::$variant(v.into())
                }
            }
        )*
    };
}

from_impl! {
    f64 => Double,
    f32 => Double,
    String => String,
    &str => String,
    Document => Document,
    Binary => Binary,
    ObjectId => ObjectId,
    bool => Bool,
    DateTime => DateTime,
    RegularExpression => RegularExpression,
    JavaScriptCode => JavaScriptCode,
    JavaScriptCodeWithScope => JavaScriptCodeWithScope,
    i8 => Int32,
    i16 => Int32,
    i32 => Int32,
    u8 => Int32,
    u16 => Int32,
    i64 => Int64,
    u32 => Int64,
    Timestamp => Timestamp,
    Decimal128 => Decimal128
}

impl From<&String> for Primitive {
    fn from(s: &String) -> Self {
        Primitive::String(s.clone())
    }
}

impl From<Vec<Primitive>> for Primitive {
    fn from(values: Vec<Primitive>) -> Self {
        Primitive::Document(Document::from(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_report_their_own_tag() {
        let list = Primitive::from(vec![Primitive::from(1), Primitive::from("a")]);
        assert_eq!(list.type_identifier(), TypeIdentifier::Array);
        assert_eq!(
            Primitive::Document(Document::new()).type_identifier(),
            TypeIdentifier::Document
        );
    }

    #[test]
    fn conversions_pick_the_natural_width() {
        assert_eq!(Primitive::from(3u8), Primitive::Int32(3));
        assert_eq!(Primitive::from(3u32), Primitive::Int64(3));
        assert_eq!(Primitive::from(1.5f32), Primitive::Double(1.5));
        assert_eq!(Primitive::from(5i64).as_integer(), Some(5));
    }
}
