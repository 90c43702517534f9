use std::mem;

use crate::document::Document;
use crate::error::Result;
use crate::primitive::Primitive;
use crate::ser::{unsigned, Serialize, Serializer, SerializerMap, SerializerSeq, Visitor};
use crate::settings::{EncoderSettings, NoneEncodingStrategy};

/// Builds a [`Primitive`] tree, one serializer per value.
pub(super) struct TreeSerializer<'s> {
    settings: &'s EncoderSettings,
    /// Values inside a sequence keep their position, so `None` is written
    /// as Null there.
    in_seq: bool,
    out: Option<Primitive>,
    doc: Document,
}

impl<'s> TreeSerializer<'s> {
    pub(super) fn new(settings: &'s EncoderSettings, in_seq: bool) -> Self {
        TreeSerializer {
            settings,
            in_seq,
            out: None,
            doc: Document::new(),
        }
    }

    /// The value written, Null when it was left out.
    pub(super) fn finish(self) -> Primitive {
        self.out.unwrap_or(Primitive::Null)
    }

    fn emit(&mut self, value: Primitive) -> Result<()> {
        self.out = Some(value);
        Ok(())
    }

    fn child(&self, s: &dyn Serialize, in_seq: bool) -> Result<Option<Primitive>> {
        let mut child = TreeSerializer::new(self.settings, in_seq);
        s.begin(Visitor::from(&mut child))?;
        Ok(child.out)
    }

    fn close(&mut self) -> Result<()> {
        let doc = mem::take(&mut self.doc);
        self.emit(Primitive::Document(doc))
    }
}

impl<'s> Serializer for TreeSerializer<'s> {
    fn null(&mut self) -> Result<()> {
        self.emit(Primitive::Null)
    }

    fn boolean(&mut self, b: bool) -> Result<()> {
        self.emit(Primitive::Bool(b))
    }

    fn string(&mut self, s: &str) -> Result<()> {
        self.emit(Primitive::String(s.to_owned()))
    }

    fn int(&mut self, n: i32) -> Result<()> {
        self.emit(Primitive::Int32(n))
    }

    fn long(&mut self, n: i64) -> Result<()> {
        self.emit(Primitive::Int64(n))
    }

    fn ulong(&mut self, n: u64) -> Result<()> {
        let value = unsigned(self.settings, n)?;
        self.emit(value)
    }

    fn double(&mut self, n: f64) -> Result<()> {
        self.emit(Primitive::Double(n))
    }

    fn primitive(&mut self, value: &Primitive) -> Result<()> {
        self.emit(value.clone())
    }

    fn none(&mut self) -> Result<()> {
        if self.in_seq || self.settings.none == NoneEncodingStrategy::Null {
            self.emit(Primitive::Null)
        } else {
            self.out = None;
            Ok(())
        }
    }

    fn seq(&mut self) -> Result<&mut dyn SerializerSeq> {
        self.doc = Document::new_array();
        Ok(self)
    }

    fn map(&mut self) -> Result<&mut dyn SerializerMap> {
        self.doc = Document::new();
        Ok(self)
    }
}

impl<'s> SerializerSeq for TreeSerializer<'s> {
    fn element(&mut self, s: &dyn Serialize) -> Result<()> {
        let value = self.child(s, true)?.unwrap_or(Primitive::Null);
        self.doc.push(value)
    }

    fn done(&mut self) -> Result<()> {
        self.close()
    }
}

impl<'s> SerializerMap for TreeSerializer<'s> {
    fn field(&mut self, k: &str, s: &dyn Serialize) -> Result<()> {
        match self.child(s, false)? {
            Some(value) => self.doc.set(k, Some(value)),
            None => Ok(()),
        }
    }

    fn done(&mut self) -> Result<()> {
        self.close()
    }
}
