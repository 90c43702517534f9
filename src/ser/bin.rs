use crate::buffer::Buffer;
use crate::element;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::ser::{not_a_document, unsigned, Serialize, Serializer, SerializerMap, SerializerSeq, Visitor};
use crate::settings::{EncoderSettings, NoneEncodingStrategy};
use crate::tag::TypeIdentifier;

/// An open document. `index` counts the elements of an array.
#[derive(Copy, Clone)]
struct Frame {
    start: usize,
    index: Option<usize>,
}

/// Writes elements as they are visited.
///
/// Each element is started with a Null type byte and its key; the type byte
/// is patched once the value shows what it is. Document lengths are patched
/// when the document is closed.
pub(super) struct BinSerializer<'s> {
    settings: &'s EncoderSettings,
    out: Buffer,
    /// Type byte of the element being written, `None` at the top level.
    tag: Option<usize>,
    frames: Vec<Frame>,
}

impl<'s> BinSerializer<'s> {
    pub(super) fn new(settings: &'s EncoderSettings) -> Self {
        BinSerializer {
            settings,
            out: Buffer::with_capacity(64),
            tag: None,
            frames: vec![],
        }
    }

    pub(super) fn finish(self) -> Vec<u8> {
        self.out.into_vec()
    }

    fn begin_value(&mut self, ty: TypeIdentifier) -> Result<()> {
        match self.tag {
            Some(i) => {
                self.out[i] = ty.as_u8();
                Ok(())
            }
            None => Err(not_a_document()),
        }
    }

    fn header(&mut self, key: &str) -> Result<()> {
        if key.as_bytes().contains(&0) {
            return Err(Error::InvalidKey(key.to_owned()));
        }
        self.tag = Some(self.out.len());
        self.out.write_u8(TypeIdentifier::Null.as_u8());
        self.out.extend_from_slice(key.as_bytes());
        self.out.write_u8(0x00);
        Ok(())
    }

    fn open(&mut self, ty: TypeIdentifier, index: Option<usize>) -> Result<()> {
        if self.tag.is_some() {
            self.begin_value(ty)?;
        } else if !self.frames.is_empty() {
            return Err(not_a_document());
        }
        self.frames.push(Frame {
            start: self.out.len(),
            index,
        });
        self.out.write_i32(0);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or(Error::InvalidOperation("no open document"))?;
        self.out.write_u8(0x00);
        let len = self.out.len() - frame.start;
        self.out.patch_i32(frame.start, len as i32);
        Ok(())
    }
}

impl<'s> Serializer for BinSerializer<'s> {
    fn null(&mut self) -> Result<()> {
        self.begin_value(TypeIdentifier::Null)
    }

    fn boolean(&mut self, b: bool) -> Result<()> {
        self.begin_value(TypeIdentifier::Boolean)?;
        self.out.write_u8(if b { 1_u8 } else { 0_u8 });
        Ok(())
    }

    fn string(&mut self, s: &str) -> Result<()> {
        self.begin_value(TypeIdentifier::String)?;
        self.out.write_i32((s.len() + 1) as i32);
        self.out.extend_from_slice(s.as_bytes());
        self.out.write_u8(0x00); // '\0'
        Ok(())
    }

    fn int(&mut self, n: i32) -> Result<()> {
        self.begin_value(TypeIdentifier::Int32)?;
        self.out.write_i32(n);
        Ok(())
    }

    fn long(&mut self, n: i64) -> Result<()> {
        self.begin_value(TypeIdentifier::Int64)?;
        self.out.write_i64(n);
        Ok(())
    }

    fn ulong(&mut self, n: u64) -> Result<()> {
        let value = unsigned(self.settings, n)?;
        self.primitive(&value)
    }

    fn double(&mut self, n: f64) -> Result<()> {
        self.begin_value(TypeIdentifier::Double)?;
        self.out.write_f64(n);
        Ok(())
    }

    fn primitive(&mut self, value: &Primitive) -> Result<()> {
        match (self.tag, value) {
            (None, Primitive::Document(doc)) if self.frames.is_empty() => {
                self.out.extend_from_slice(doc.as_bytes());
                Ok(())
            }
            _ => {
                self.begin_value(value.type_identifier())?;
                let mut bytes = Vec::new();
                element::encode_value(value, &mut bytes)?;
                self.out.extend_from_slice(&bytes);
                Ok(())
            }
        }
    }

    fn none(&mut self) -> Result<()> {
        let in_seq = matches!(self.frames.last(), Some(Frame { index: Some(_), .. }));
        if in_seq || self.settings.none == NoneEncodingStrategy::Null {
            return self.null();
        }
        match self.tag.take() {
            // Drop the element header written for the omitted value.
            Some(i) => {
                let len = self.out.len() - i;
                self.out.remove(i, len);
                Ok(())
            }
            None => Err(not_a_document()),
        }
    }

    fn seq(&mut self) -> Result<&mut dyn SerializerSeq> {
        self.open(TypeIdentifier::Array, Some(0))?;
        Ok(self)
    }

    fn map(&mut self) -> Result<&mut dyn SerializerMap> {
        self.open(TypeIdentifier::Document, None)?;
        Ok(self)
    }
}

impl<'s> SerializerSeq for BinSerializer<'s> {
    fn element(&mut self, s: &dyn Serialize) -> Result<()> {
        let index = match self.frames.last_mut() {
            Some(Frame {
                index: Some(index), ..
            }) => {
                *index += 1;
                *index - 1
            }
            _ => return Err(Error::InvalidOperation("no open array")),
        };
        self.header(itoa::Buffer::new().format(index))?;
        s.begin(Visitor::from(&mut *self))?;
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        self.close()
    }
}

impl<'s> SerializerMap for BinSerializer<'s> {
    fn field(&mut self, k: &str, s: &dyn Serialize) -> Result<()> {
        self.header(k)?;
        s.begin(Visitor::from(&mut *self))?;
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        self.close()
    }
}
