//! Element layout: a type byte, a C string key and a type specific payload.
//!
//! Reads are bounds checked against the slice they are given. Callers pass
//! the bytes of the enclosing document without its terminator, so a payload
//! running past its document is reported as truncated.

use paste::paste;
use std::convert::TryInto;
use std::str;

use crate::buffer::Buffer;
use crate::document::{validate, Document};
use crate::error::{Error, Result};
use crate::oid::{self, ObjectId};
use crate::primitive::*;
use crate::tag::TypeIdentifier;

macro_rules! read_impl {
    ($($t:ty),*) => {
        $(paste! {
            #[inline]
            pub(crate) fn [<read_ $t>](bytes: &[u8], at: usize) -> Option<$t> {
                let raw = bytes.get(at..at.checked_add(std::mem::size_of::<$t>())?)?;
                Some(<$t>::from_le_bytes(raw.try_into().ok()?))
            }
        })*
    };
}

read_impl!(u8, i32, i64, u64, f64);

fn truncated(ty: TypeIdentifier, bytes: &[u8], at: usize, expected: usize) -> Error {
    Error::InvalidElementSize {
        offset: at,
        type_identifier: ty,
        expected,
        found: bytes.len().saturating_sub(at),
    }
}

/// Payload of a fixed width type.
pub(crate) fn fixed(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<&[u8]> {
    let n = ty.fixed_size().unwrap_or(0);
    at.checked_add(n)
        .and_then(|end| bytes.get(at..end))
        .ok_or_else(|| truncated(ty, bytes, at, n))
}

pub(crate) fn length_prefix(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<i32> {
    read_i32(bytes, at).ok_or_else(|| truncated(ty, bytes, at, 4))
}

/// Returns the string and the bytes consumed, terminator included.
pub(crate) fn cstring(bytes: &[u8], at: usize) -> Result<(&str, usize)> {
    let rest = bytes.get(at..).unwrap_or(&[]);
    let n = rest
        .iter()
        .position(|b| *b == 0)
        .ok_or(Error::InvalidElementContents {
            offset: at,
            reason: "unterminated C string",
        })?;
    let s = str::from_utf8(&rest[..n]).map_err(|_| Error::InvalidElementContents {
        offset: at,
        reason: "C string is not valid UTF-8",
    })?;
    Ok((s, n + 1))
}

/// Length prefixed string. Returns the string and the bytes consumed.
pub(crate) fn string(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<(&str, usize)> {
    let len = string_len(ty, bytes, at)?;
    let raw = &bytes[at + 4..at + len];
    match raw.split_last() {
        Some((&0, s)) => {
            let s = str::from_utf8(s).map_err(|_| Error::InvalidElementContents {
                offset: at,
                reason: "string is not valid UTF-8",
            })?;
            Ok((s, len))
        }
        _ => Err(Error::ParseError {
            offset: at,
            reason: "string length disagrees with its terminator",
        }),
    }
}

fn string_len(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<usize> {
    let len = length_prefix(ty, bytes, at)?;
    if len < 1 {
        return Err(Error::InvalidElementContents {
            offset: at,
            reason: "string length must be at least 1",
        });
    }
    let total = 4 + len as usize;
    if at + total > bytes.len() {
        return Err(truncated(ty, bytes, at, total));
    }
    Ok(total)
}

/// Declared length of the document at `at`, checked against the bytes
/// available. Contents are not looked at.
pub(crate) fn document_len(bytes: &[u8], at: usize) -> Result<usize> {
    let declared = length_prefix(TypeIdentifier::Document, bytes, at)?;
    let available = bytes.len().saturating_sub(at);
    if declared < 5 || declared as usize > available {
        return Err(Error::InvalidDocumentLength {
            offset: at,
            declared: declared as i64,
            available,
        });
    }
    Ok(declared as usize)
}

fn cstring_len(bytes: &[u8], at: usize) -> Result<usize> {
    bytes
        .get(at..)
        .and_then(|rest| rest.iter().position(|b| *b == 0))
        .map(|n| n + 1)
        .ok_or(Error::InvalidElementContents {
            offset: at,
            reason: "unterminated C string",
        })
}

/// Size of the payload at `at`. Only lengths and bounds are checked.
pub(crate) fn value_len(ty: TypeIdentifier, bytes: &[u8], at: usize) -> Result<usize> {
    use TypeIdentifier::*;

    if let Some(n) = ty.fixed_size() {
        fixed(ty, bytes, at)?;
        return Ok(n);
    }

    match ty {
        String | JavaScriptCode => string_len(ty, bytes, at),
        Document | Array => document_len(bytes, at),
        Binary => {
            let len = length_prefix(ty, bytes, at)?;
            if len < 0 {
                return Err(Error::InvalidElementContents {
                    offset: at,
                    reason: "negative binary length",
                });
            }
            let total = 5 + len as usize;
            if at + total > bytes.len() {
                return Err(truncated(ty, bytes, at, total));
            }
            Ok(total)
        }
        RegularExpression => {
            let pattern = cstring_len(bytes, at)?;
            Ok(pattern + cstring_len(bytes, at + pattern)?)
        }
        JavaScriptCodeWithScope => {
            let total = length_prefix(ty, bytes, at)?;
            // length, an empty string and an empty document
            if total < 14 {
                return Err(Error::InvalidElementContents {
                    offset: at,
                    reason: "code with scope is shorter than its parts",
                });
            }
            let total = total as usize;
            if at + total > bytes.len() {
                return Err(truncated(ty, bytes, at, total));
            }
            Ok(total)
        }
        _ => unreachable!("fixed size types are handled above"),
    }
}

/// An element located by a scan, with absolute offsets.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RawElement<'a> {
    pub ty: TypeIdentifier,
    pub key: &'a str,
    /// Offset of the type byte.
    pub start: usize,
    /// Offset of the payload.
    pub value: usize,
    /// One past the payload.
    pub end: usize,
}

/// Reads the element starting at `at`.
///
/// `elements` holds a document without its terminator, so reaching its end
/// means there are no more elements.
pub(crate) fn scan_element(elements: &[u8], at: usize) -> Result<Option<RawElement>> {
    let tag = match elements.get(at) {
        None => return Ok(None),
        Some(&0) => {
            return Err(Error::ParseError {
                offset: at,
                reason: "document terminated before its declared length",
            })
        }
        Some(&tag) => tag,
    };

    if TypeIdentifier::deprecated(tag) {
        return Err(Error::InvalidOperation("deprecated element type"));
    }
    let ty = TypeIdentifier::from_u8(tag).ok_or(Error::UnknownType { offset: at, tag })?;
    let (key, n) = cstring(elements, at + 1)?;
    let value = at + 1 + n;
    let end = value + value_len(ty, elements, value)?;
    Ok(Some(RawElement {
        ty,
        key,
        start: at,
        value,
        end,
    }))
}

/// A value with its own wire representation.
///
/// Implemented by every payload type except documents, whose type byte
/// depends on their shape.
pub trait Element: Sized {
    const TYPE: TypeIdentifier;

    /// Appends the payload to `out`.
    fn encode(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Reads the payload at `at`, returning it with the bytes consumed.
    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)>;
}

macro_rules! fixed_element {
    ($($t:ty => $variant:ident, $read:ident;)*) => {
        $(
            impl Element for $t {
                const TYPE: TypeIdentifier = TypeIdentifier::$variant;

                fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
                    out.extend_from_slice(&self.to_le_bytes());
                    Ok(())
                }

                fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
                    let raw = fixed(Self::TYPE, buf.as_slice(), at)?;
                    let v = $read(raw, 0).ok_or_else(|| truncated(Self::TYPE, raw, 0, raw.len()))?;
                    Ok((v, raw.len()))
                }
            }
        )*
    };
}

fixed_element! {
    f64 => Double, read_f64;
    i32 => Int32, read_i32;
    i64 => Int64, read_i64;
}

impl Element for bool {
    const TYPE: TypeIdentifier = TypeIdentifier::Boolean;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(*self as u8);
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        match fixed(Self::TYPE, buf.as_slice(), at)?[0] {
            0 => Ok((false, 1)),
            1 => Ok((true, 1)),
            _ => Err(Error::InvalidElementContents {
                offset: at,
                reason: "boolean must be 0x00 or 0x01",
            }),
        }
    }
}

fn encode_string(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as i32 + 1).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

fn encode_cstring(s: &str, out: &mut Vec<u8>) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(Error::InvalidCString(s.to_owned()));
    }
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

impl Element for String {
    const TYPE: TypeIdentifier = TypeIdentifier::String;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_string(self, out);
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let (s, n) = string(Self::TYPE, buf.as_slice(), at)?;
        Ok((s.to_owned(), n))
    }
}

impl Element for Binary {
    const TYPE: TypeIdentifier = TypeIdentifier::Binary;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&(self.bytes.len() as i32).to_le_bytes());
        out.push(self.subtype.as_u8());
        out.extend_from_slice(&self.bytes);
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let bytes = buf.as_slice();
        let n = value_len(Self::TYPE, bytes, at)?;
        let subtype = bytes[at + 4].into();
        let data = bytes[at + 5..at + n].to_vec();
        Ok((Binary::new(subtype, data), n))
    }
}

impl Element for ObjectId {
    const TYPE: TypeIdentifier = TypeIdentifier::ObjectId;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(self.as_bytes());
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let raw = fixed(Self::TYPE, buf.as_slice(), at)?;
        let id = oid::read_object_id(raw).ok_or_else(|| truncated(Self::TYPE, raw, 0, 12))?;
        Ok((id, 12))
    }
}

impl Element for DateTime {
    const TYPE: TypeIdentifier = TypeIdentifier::DateTime;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        self.timestamp_millis().encode(out)
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let raw = fixed(Self::TYPE, buf.as_slice(), at)?;
        let millis = read_i64(raw, 0).ok_or_else(|| truncated(Self::TYPE, raw, 0, 8))?;
        Ok((DateTime::from_millis(millis), 8))
    }
}

impl Element for Timestamp {
    const TYPE: TypeIdentifier = TypeIdentifier::Timestamp;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.to_wire().to_le_bytes());
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let raw = fixed(Self::TYPE, buf.as_slice(), at)?;
        let wire = read_u64(raw, 0).ok_or_else(|| truncated(Self::TYPE, raw, 0, 8))?;
        Ok((Timestamp::from_wire(wire), 8))
    }
}

impl Element for Decimal128 {
    const TYPE: TypeIdentifier = TypeIdentifier::Decimal128;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.bytes());
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let raw = fixed(Self::TYPE, buf.as_slice(), at)?;
        let bytes: [u8; 16] = raw
            .try_into()
            .map_err(|_| truncated(Self::TYPE, raw, 0, 16))?;
        Ok((Decimal128::from_bytes(bytes), 16))
    }
}

impl Element for RegularExpression {
    const TYPE: TypeIdentifier = TypeIdentifier::RegularExpression;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_cstring(&self.pattern, out)?;
        encode_cstring(&self.options, out)
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let bytes = buf.as_slice();
        let (pattern, a) = cstring(bytes, at)?;
        let (options, b) = cstring(bytes, at + a)?;
        Ok((RegularExpression::new(pattern, options), a + b))
    }
}

impl Element for JavaScriptCode {
    const TYPE: TypeIdentifier = TypeIdentifier::JavaScriptCode;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_string(&self.code, out);
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let (code, n) = string(Self::TYPE, buf.as_slice(), at)?;
        Ok((JavaScriptCode::new(code), n))
    }
}

impl Element for JavaScriptCodeWithScope {
    const TYPE: TypeIdentifier = TypeIdentifier::JavaScriptCodeWithScope;

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let scope = self.scope.as_bytes();
        let total = 4 + 4 + self.code.len() + 1 + scope.len();
        out.extend_from_slice(&(total as i32).to_le_bytes());
        encode_string(&self.code, out);
        out.extend_from_slice(scope);
        Ok(())
    }

    fn decode(buf: &Buffer, at: usize) -> Result<(Self, usize)> {
        let bytes = buf.as_slice();
        let total = value_len(Self::TYPE, bytes, at)?;
        let (code, n) = string(Self::TYPE, bytes, at + 4)?;
        let scope_at = at + 4 + n;
        let scope_len = validate::document(bytes, scope_at)?;
        if 4 + n + scope_len != total {
            return Err(Error::ParseError {
                offset: at,
                reason: "code with scope length disagrees with its parts",
            });
        }
        let scope = Document::from_raw(buf.slice(scope_at..scope_at + scope_len), false);
        Ok((JavaScriptCodeWithScope::new(code, scope), total))
    }
}

fn lift<T: Element>(
    buf: &Buffer,
    at: usize,
    wrap: fn(T) -> Primitive,
) -> Result<(Primitive, usize)> {
    let (v, n) = T::decode(buf, at)?;
    Ok((wrap(v), n))
}

/// Decodes the payload of type `ty` at `at`.
///
/// Embedded documents are slices of `buf` and share its allocation.
pub(crate) fn decode_value(
    ty: TypeIdentifier,
    buf: &Buffer,
    at: usize,
) -> Result<(Primitive, usize)> {
    use TypeIdentifier as T;

    match ty {
        T::Double => lift(buf, at, Primitive::Double),
        T::String => lift(buf, at, Primitive::String),
        T::Document | T::Array => {
            let len = document_len(buf.as_slice(), at)?;
            let doc = Document::from_raw(buf.slice(at..at + len), ty == T::Array);
            Ok((Primitive::Document(doc), len))
        }
        T::Binary => lift(buf, at, Primitive::Binary),
        T::ObjectId => lift(buf, at, Primitive::ObjectId),
        T::Boolean => lift(buf, at, Primitive::Bool),
        T::DateTime => lift(buf, at, Primitive::DateTime),
        T::Null => Ok((Primitive::Null, 0)),
        T::RegularExpression => lift(buf, at, Primitive::RegularExpression),
        T::JavaScriptCode => lift(buf, at, Primitive::JavaScriptCode),
        T::JavaScriptCodeWithScope => lift(buf, at, Primitive::JavaScriptCodeWithScope),
        T::Int32 => lift(buf, at, Primitive::Int32),
        T::Timestamp => lift(buf, at, Primitive::Timestamp),
        T::Int64 => lift(buf, at, Primitive::Int64),
        T::Decimal128 => lift(buf, at, Primitive::Decimal128),
        T::MinKey => Ok((Primitive::MinKey, 0)),
        T::MaxKey => Ok((Primitive::MaxKey, 0)),
    }
}

/// Appends the payload of `value` to `out`.
pub(crate) fn encode_value(value: &Primitive, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Primitive::Double(v) => v.encode(out),
        Primitive::String(v) => v.encode(out),
        Primitive::Document(v) => {
            out.extend_from_slice(v.as_bytes());
            Ok(())
        }
        Primitive::Binary(v) => v.encode(out),
        Primitive::ObjectId(v) => v.encode(out),
        Primitive::Bool(v) => v.encode(out),
        Primitive::DateTime(v) => v.encode(out),
        Primitive::RegularExpression(v) => v.encode(out),
        Primitive::JavaScriptCode(v) => v.encode(out),
        Primitive::JavaScriptCodeWithScope(v) => v.encode(out),
        Primitive::Int32(v) => v.encode(out),
        Primitive::Timestamp(v) => v.encode(out),
        Primitive::Int64(v) => v.encode(out),
        Primitive::Decimal128(v) => v.encode(out),
        Primitive::Null | Primitive::MinKey | Primitive::MaxKey => Ok(()),
    }
}

/// Appends a whole element: type byte, key and payload.
pub(crate) fn encode_element(key: &str, value: &Primitive, out: &mut Vec<u8>) -> Result<()> {
    if key.as_bytes().contains(&0) {
        return Err(Error::InvalidKey(key.to_owned()));
    }
    out.push(value.type_identifier().as_u8());
    out.extend_from_slice(key.as_bytes());
    out.push(0);
    encode_value(value, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::BinarySubtype;

    fn encoded(value: &Primitive) -> Buffer {
        let mut out = vec![];
        encode_value(value, &mut out).unwrap();
        Buffer::from_vec(out)
    }

    #[test]
    fn double_bits() {
        let buf = Buffer::copy_from_slice(&[0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x14, 0x40]);
        let (v, n) = f64::decode(&buf, 0).unwrap();
        assert_eq!(v, 5.05);
        assert_eq!(n, 8);
    }

    #[test]
    fn string_length_counts_the_terminator() {
        let buf = encoded(&Primitive::from("world"));
        assert_eq!(buf.as_slice(), b"\x06\x00\x00\x00world\x00");
        assert_eq!(String::decode(&buf, 0).unwrap(), ("world".to_owned(), 10));
    }

    #[test]
    fn string_length_must_match_terminator() {
        let buf = Buffer::copy_from_slice(b"\x05\x00\x00\x00world\x00");
        match String::decode(&buf, 0) {
            Err(Error::ParseError { offset: 0, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }

        let buf = Buffer::copy_from_slice(b"\x09\x00\x00\x00wor");
        match String::decode(&buf, 0) {
            Err(Error::InvalidElementSize { expected: 13, found: 7, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_fixed_size() {
        let buf = Buffer::copy_from_slice(&[1, 2, 3]);
        match i64::decode(&buf, 0) {
            Err(Error::InvalidElementSize {
                type_identifier: TypeIdentifier::Int64,
                expected: 8,
                found: 3,
                ..
            }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn boolean_range() {
        let buf = Buffer::copy_from_slice(&[2]);
        assert!(matches!(
            bool::decode(&buf, 0),
            Err(Error::InvalidElementContents { .. })
        ));
    }

    #[test]
    fn binary_keeps_user_subtype() {
        let bin = Binary::new(BinarySubtype::UserDefined(0x80), vec![1, 2, 3]);
        let buf = encoded(&Primitive::Binary(bin.clone()));
        assert_eq!(buf.as_slice(), &[3, 0, 0, 0, 0x80, 1, 2, 3][..]);
        assert_eq!(Binary::decode(&buf, 0).unwrap(), (bin, 8));
    }

    #[test]
    fn code_with_scope_lengths_agree() {
        let mut scope = Document::new();
        scope.insert("x", 1).unwrap();
        let code = JavaScriptCodeWithScope::new("x + 1", scope);
        let buf = encoded(&Primitive::JavaScriptCodeWithScope(code.clone()));
        let (back, n) = JavaScriptCodeWithScope::decode(&buf, 0).unwrap();
        assert_eq!(back, code);
        assert_eq!(n, buf.len());

        // Claim one byte more than the parts add up to.
        let mut bytes = buf.to_vec();
        bytes[0] += 1;
        bytes.push(0);
        let buf = Buffer::from_vec(bytes);
        assert!(matches!(
            JavaScriptCodeWithScope::decode(&buf, 0),
            Err(Error::ParseError { .. })
        ));
    }

    #[test]
    fn code_with_scope_checks_the_scope() {
        // The scope claims 6 bytes and ends on 0x07 instead of a terminator.
        let buf = Buffer::copy_from_slice(&[
            16, 0, 0, 0, 2, 0, 0, 0, b'x', 0, 6, 0, 0, 0, 0x42, 0x07,
        ]);
        match JavaScriptCodeWithScope::decode(&buf, 0) {
            Err(Error::InvalidDocumentLength { offset: 10, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn regex_with_nul_is_rejected() {
        let re = RegularExpression::new("a\0b", "");
        let mut out = vec![];
        assert!(matches!(
            re.encode(&mut out),
            Err(Error::InvalidCString(_))
        ));
    }

    #[test]
    fn scan_reports_unknown_tags() {
        let elements = [0x42, b'a', 0];
        match scan_element(&elements, 0) {
            Err(Error::UnknownType { offset: 0, tag: 0x42 }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(scan_element(&elements, 3).unwrap().is_none());
    }

    #[test]
    fn scan_rejects_deprecated_tags() {
        for tag in [0x06_u8, 0x0C, 0x0E].iter() {
            let elements = [*tag, b'a', 0];
            match scan_element(&elements, 0) {
                Err(Error::InvalidOperation(_)) => {}
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
