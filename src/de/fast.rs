use std::convert::TryFrom;

use crate::buffer::Buffer;
use crate::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Trail, ROOT};
use crate::document::validate;
use crate::element::{self, read_f64, read_i32, read_i64, scan_element, RawElement};
use crate::error::{Error, Result};
use crate::oid::{self, ObjectId};
use crate::primitive::Primitive;
use crate::settings::DecodeFloat;
use crate::tag::TypeIdentifier;

/// Deserializer reading directly from encoded bytes.
///
/// Only the elements a `Deserialize` impl asks for are looked at, and each
/// is checked as it is read. Accepts the same conversions as a [`Decoder`]
/// with default settings.
///
/// [`Decoder`]: crate::de::Decoder
pub struct FastDecoder<'de, 'a> {
    /// The enclosing document without its terminator.
    bytes: &'de [u8],
    ty: TypeIdentifier,
    /// Offset of the payload in `bytes`.
    at: usize,
    trail: &'a Trail<'a>,
}

impl<'de> FastDecoder<'de, 'static> {
    /// Checks the outer length and terminator of `bytes`.
    pub fn root(bytes: &'de [u8]) -> Result<Self> {
        let len = element::document_len(bytes, 0)?;
        if len != bytes.len() || bytes[len - 1] != 0 {
            return Err(Error::InvalidDocumentLength {
                offset: 0,
                declared: len as i64,
                available: bytes.len(),
            });
        }
        Ok(FastDecoder {
            bytes,
            ty: TypeIdentifier::Document,
            at: 0,
            trail: &ROOT,
        })
    }
}

impl<'de, 'a> FastDecoder<'de, 'a> {
    fn mismatch(&self, to: &'static str) -> Error {
        Error::TypeConversion {
            path: self.trail.to_path(),
            from: self.ty,
            to,
        }
    }

    fn integer(&self) -> Result<Option<i64>> {
        let raw = match self.ty {
            TypeIdentifier::Int32 | TypeIdentifier::Int64 => {
                element::fixed(self.ty, self.bytes, self.at)?
            }
            _ => return Ok(None),
        };
        Ok(match self.ty {
            TypeIdentifier::Int32 => read_i32(raw, 0).map(i64::from),
            _ => read_i64(raw, 0),
        })
    }

    fn double(&self) -> Result<Option<f64>> {
        match self.ty {
            TypeIdentifier::Double => Ok(read_f64(element::fixed(self.ty, self.bytes, self.at)?, 0)),
            _ => Ok(None),
        }
    }

    fn primitive(&self) -> Result<Primitive> {
        let len = validate::value(self.ty, self.bytes, self.at)?;
        let buf = Buffer::copy_from_slice(&self.bytes[self.at..self.at + len]);
        element::decode_value(self.ty, &buf, 0)
            .map(|(value, _)| value)
            .map_err(|err| err.shifted(self.at))
    }

    /// Bounds of the embedded document: elements slice and first element.
    fn document(&self) -> Result<(&'de [u8], usize)> {
        match self.ty {
            TypeIdentifier::Document | TypeIdentifier::Array => {}
            _ => return Err(self.mismatch("document")),
        }
        let len = element::document_len(self.bytes, self.at)?;
        let end = self.at + len - 1;
        if self.bytes.get(end) != Some(&0) {
            return Err(Error::InvalidDocumentLength {
                offset: self.at,
                declared: len as i64,
                available: self.bytes.len() - self.at,
            });
        }
        Ok((&self.bytes[..end], self.at + 4))
    }
}

macro_rules! integer_impl {
    ($($method:ident => $t:ident;)*) => {
        $(
            fn $method(self) -> Result<$t> {
                match self.integer()? {
                    Some(n) => $t::try_from(n).map_err(|_| self.mismatch(stringify!($t))),
                    None => Err(self.mismatch(stringify!($t))),
                }
            }
        )*
    };
}

impl<'de, 'a> Deserializer for FastDecoder<'de, 'a> {
    type Map = FastMap<'de, 'a>;
    type Seq = FastSeq<'de, 'a>;

    fn deserialize_bool(self) -> Result<bool> {
        if self.ty != TypeIdentifier::Boolean {
            return Err(self.mismatch("bool"));
        }
        match element::fixed(self.ty, self.bytes, self.at)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::InvalidElementContents {
                offset: self.at,
                reason: "boolean must be 0x00 or 0x01",
            }),
        }
    }

    integer_impl! {
        deserialize_i8 => i8;
        deserialize_i16 => i16;
        deserialize_i32 => i32;
        deserialize_i64 => i64;
        deserialize_u8 => u8;
        deserialize_u16 => u16;
        deserialize_u32 => u32;
        deserialize_u64 => u64;
    }

    fn deserialize_f32(self) -> Result<f32> {
        self.double()?
            .and_then(f32::from_f64_exact)
            .ok_or_else(|| self.mismatch("f32"))
    }

    fn deserialize_f64(self) -> Result<f64> {
        self.double()?.ok_or_else(|| self.mismatch("f64"))
    }

    fn deserialize_string(self) -> Result<String> {
        if self.ty != TypeIdentifier::String {
            return Err(self.mismatch("string"));
        }
        let (s, _) = element::string(self.ty, self.bytes, self.at)?;
        Ok(s.to_owned())
    }

    fn deserialize_object_id(self) -> Result<ObjectId> {
        if self.ty != TypeIdentifier::ObjectId {
            return Err(self.mismatch("objectId"));
        }
        let raw = element::fixed(self.ty, self.bytes, self.at)?;
        oid::read_object_id(raw).ok_or_else(|| self.mismatch("objectId"))
    }

    fn deserialize_primitive(self) -> Result<Primitive> {
        self.primitive()
    }

    fn deserialize_primitive_as<T, F>(self, expected: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(Primitive) -> Option<T>,
    {
        let value = self.primitive()?;
        f(value).ok_or_else(|| self.mismatch(expected))
    }

    fn deserialize_option<T: Deserialize>(self) -> Result<Option<T>> {
        if self.ty == TypeIdentifier::Null {
            Ok(None)
        } else {
            T::deserialize(self).map(Some)
        }
    }

    fn deserialize_map(self) -> Result<FastMap<'de, 'a>> {
        let (elements, first) = self.document()?;
        Ok(FastMap {
            elements,
            first,
            cursor: first,
            next: first,
            trail: self.trail,
        })
    }

    fn deserialize_seq(self) -> Result<FastSeq<'de, 'a>> {
        let (elements, first) = self.document()?;
        Ok(FastSeq {
            elements,
            pos: first,
            index: 0,
            trail: self.trail,
        })
    }
}

pub struct FastMap<'de, 'a> {
    elements: &'de [u8],
    first: usize,
    /// Where the last field lookup stopped. Fields are usually asked for in
    /// storage order, so the next one tends to start here.
    cursor: usize,
    /// Position of `next_entry`.
    next: usize,
    trail: &'a Trail<'a>,
}

impl<'de, 'a> FastMap<'de, 'a> {
    fn find(&mut self, key: &str) -> Result<Option<RawElement<'de>>> {
        let begin = self.cursor;
        let mut pos = begin;
        let mut wrapped = false;
        loop {
            if wrapped && pos >= begin {
                return Ok(None);
            }
            match scan_element(self.elements, pos)? {
                Some(e) if e.key == key => {
                    self.cursor = e.end;
                    return Ok(Some(e));
                }
                Some(e) => pos = e.end,
                None if !wrapped => {
                    wrapped = true;
                    pos = self.first;
                }
                None => return Ok(None),
            }
        }
    }
}

impl<'de, 'a> MapAccess for FastMap<'de, 'a> {
    fn field<T: Deserialize>(&mut self, key: &str) -> Result<T> {
        match self.field_opt(key)? {
            Some(v) => Ok(v),
            None => T::default().ok_or_else(|| Error::ValueNotFound {
                path: self.trail.key(key).to_path(),
            }),
        }
    }

    fn field_opt<T: Deserialize>(&mut self, key: &str) -> Result<Option<T>> {
        let e = match self.find(key)? {
            Some(e) => e,
            None => return Ok(None),
        };
        let trail = self.trail.key(key);
        T::deserialize(FastDecoder {
            bytes: self.elements,
            ty: e.ty,
            at: e.value,
            trail: &trail,
        })
        .map(Some)
    }

    fn next_entry<T: Deserialize>(&mut self) -> Result<Option<(String, T)>> {
        let e = match scan_element(self.elements, self.next)? {
            Some(e) => e,
            None => return Ok(None),
        };
        self.next = e.end;
        let trail = self.trail.key(e.key);
        let value = T::deserialize(FastDecoder {
            bytes: self.elements,
            ty: e.ty,
            at: e.value,
            trail: &trail,
        })?;
        Ok(Some((e.key.to_owned(), value)))
    }
}

pub struct FastSeq<'de, 'a> {
    elements: &'de [u8],
    pos: usize,
    index: usize,
    trail: &'a Trail<'a>,
}

impl<'de, 'a> SeqAccess for FastSeq<'de, 'a> {
    fn next_element<T: Deserialize>(&mut self) -> Result<Option<T>> {
        let e = match scan_element(self.elements, self.pos)? {
            Some(e) => e,
            None => return Ok(None),
        };
        self.pos = e.end;
        let trail = self.trail.index(self.index);
        self.index += 1;
        T::deserialize(FastDecoder {
            bytes: self.elements,
            ty: e.ty,
            at: e.value,
            trail: &trail,
        })
        .map(Some)
    }
}
