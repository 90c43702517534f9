use crate::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Trail};
use crate::document::{Document, IntoIter};
use crate::error::{Error, Result};
use crate::oid::ObjectId;
use crate::primitive::Primitive;
use crate::settings::DecoderSettings;

/// Strategy driven deserializer over decoded values.
pub struct Decoder<'a> {
    value: Primitive,
    settings: &'a DecoderSettings,
    trail: &'a Trail<'a>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(value: Primitive, settings: &'a DecoderSettings, trail: &'a Trail<'a>) -> Self {
        Decoder {
            value,
            settings,
            trail,
        }
    }

    fn mismatch(&self, to: &'static str) -> Error {
        Error::TypeConversion {
            path: self.trail.to_path(),
            from: self.value.type_identifier(),
            to,
        }
    }

    fn into_document(self) -> Result<Document> {
        match self.value {
            Primitive::Document(doc) => Ok(doc),
            _ => Err(self.mismatch("document")),
        }
    }
}

macro_rules! integer_impl {
    ($($method:ident => $t:ident, $wide:expr;)*) => {
        $(
            fn $method(self) -> Result<$t> {
                let key = self.trail.last_key();
                match self.settings.$t.decode(&key, &self.value, $wide) {
                    Some(n) => Ok(n),
                    None => Err(self.mismatch(stringify!($t))),
                }
            }
        )*
    };
}

macro_rules! float_impl {
    ($($method:ident => $t:ident;)*) => {
        $(
            fn $method(self) -> Result<$t> {
                let key = self.trail.last_key();
                match self.settings.$t.decode(&key, &self.value) {
                    Some(n) => Ok(n),
                    None => Err(self.mismatch(stringify!($t))),
                }
            }
        )*
    };
}

impl<'a> Deserializer for Decoder<'a> {
    type Map = DocumentMap<'a>;
    type Seq = DocumentSeq<'a>;

    fn deserialize_bool(self) -> Result<bool> {
        match self.value {
            Primitive::Bool(b) => Ok(b),
            _ => Err(self.mismatch("bool")),
        }
    }

    integer_impl! {
        deserialize_i8 => i8, false;
        deserialize_i16 => i16, false;
        deserialize_i32 => i32, false;
        deserialize_i64 => i64, true;
        deserialize_u8 => u8, false;
        deserialize_u16 => u16, false;
        deserialize_u32 => u32, true;
        deserialize_u64 => u64, true;
    }

    float_impl! {
        deserialize_f32 => f32;
        deserialize_f64 => f64;
    }

    fn deserialize_string(self) -> Result<String> {
        let key = self.trail.last_key();
        match self.settings.string.decode(&key, &self.value) {
            Some(s) => Ok(s),
            None => Err(self.mismatch("string")),
        }
    }

    fn deserialize_object_id(self) -> Result<ObjectId> {
        match &self.value {
            Primitive::ObjectId(id) => Ok(*id),
            Primitive::String(s) if self.settings.decode_object_id_from_string => {
                ObjectId::from_hex(s).map_err(|_| self.mismatch("objectId"))
            }
            _ => Err(self.mismatch("objectId")),
        }
    }

    fn deserialize_primitive(self) -> Result<Primitive> {
        Ok(self.value)
    }

    fn deserialize_primitive_as<T, F>(self, expected: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(Primitive) -> Option<T>,
    {
        let from = self.value.type_identifier();
        let trail = self.trail;
        f(self.value).ok_or_else(|| Error::TypeConversion {
            path: trail.to_path(),
            from,
            to: expected,
        })
    }

    fn deserialize_option<T: Deserialize>(self) -> Result<Option<T>> {
        if self.value.is_null() {
            Ok(None)
        } else {
            T::deserialize(self).map(Some)
        }
    }

    fn deserialize_map(self) -> Result<DocumentMap<'a>> {
        let settings = self.settings;
        let trail = self.trail;
        Ok(DocumentMap {
            doc: self.into_document()?,
            entries: None,
            settings,
            trail,
        })
    }

    fn deserialize_seq(self) -> Result<DocumentSeq<'a>> {
        let settings = self.settings;
        let trail = self.trail;
        let doc = self.into_document()?;
        Ok(DocumentSeq {
            len: doc.len(),
            entries: doc.into_iter(),
            index: 0,
            settings,
            trail,
        })
    }
}

pub struct DocumentMap<'a> {
    doc: Document,
    entries: Option<IntoIter>,
    settings: &'a DecoderSettings,
    trail: &'a Trail<'a>,
}

impl<'a> DocumentMap<'a> {
    fn lookup(&self, key: &str) -> Option<Primitive> {
        match self.doc.get(key) {
            Some(value) => Some(value),
            None if self.settings.filter_dollar_prefix => self.doc.get(&format!("${}", key)),
            None => None,
        }
    }
}

impl<'a> MapAccess for DocumentMap<'a> {
    fn field<T: Deserialize>(&mut self, key: &str) -> Result<T> {
        match self.field_opt(key)? {
            Some(v) => Ok(v),
            None => T::default().ok_or_else(|| Error::ValueNotFound {
                path: self.trail.key(key).to_path(),
            }),
        }
    }

    fn field_opt<T: Deserialize>(&mut self, key: &str) -> Result<Option<T>> {
        let value = match self.lookup(key) {
            Some(value) => value,
            None => return Ok(None),
        };
        let trail = self.trail.key(key);
        T::deserialize(Decoder::new(value, self.settings, &trail)).map(Some)
    }

    fn next_entry<T: Deserialize>(&mut self) -> Result<Option<(String, T)>> {
        let doc = &self.doc;
        let entries = self
            .entries
            .get_or_insert_with(|| doc.clone().into_iter());
        let (key, value) = match entries.next() {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let trail = self.trail.key(&key);
        let value = T::deserialize(Decoder::new(value, self.settings, &trail))?;
        Ok(Some((key, value)))
    }
}

pub struct DocumentSeq<'a> {
    entries: IntoIter,
    len: usize,
    index: usize,
    settings: &'a DecoderSettings,
    trail: &'a Trail<'a>,
}

impl<'a> SeqAccess for DocumentSeq<'a> {
    fn next_element<T: Deserialize>(&mut self) -> Result<Option<T>> {
        let value = match self.entries.next() {
            Some((_, value)) => value,
            None => return Ok(None),
        };
        let trail = self.trail.index(self.index);
        self.index += 1;
        T::deserialize(Decoder::new(value, self.settings, &trail)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len - self.index)
    }
}

