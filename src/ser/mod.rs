//! Serialization traits.
//!
//! Serialization in bsondoc works by traversing an input object and
//! handing each of its parts to a [`Visitor`]. What the visitor builds
//! depends on the entry point: [`to_document`] and [`to_primitive`] build a
//! [`Primitive`] tree, [`to_bin`] writes the encoded bytes directly.
//!
//! ## Serializing a primitive
//!
//! ```rust
//! use bsondoc::ser::{Done, Serialize, Visitor};
//! use bsondoc::Result;
//!
//! // The data structure that we want to serialize as a primitive.
//! struct MyBoolean(bool);
//!
//! impl Serialize for MyBoolean {
//!     fn begin(&self, v: Visitor) -> Result<Done> {
//!         v.boolean(self.0)
//!     }
//! }
//! ```
//!
//! ## Serializing a sequence
//!
//! ```rust
//! use bsondoc::ser::{Done, Serialize, Visitor};
//! use bsondoc::Result;
//!
//! // Some custom sequence type that we want to serialize.
//! struct MyVec<T>(Vec<T>);
//!
//! impl<T: Serialize> Serialize for MyVec<T> {
//!     fn begin(&self, v: Visitor) -> Result<Done> {
//!         let mut seq = v.seq()?;
//!         for e in &self.0 {
//!             seq = seq.element(e)?;
//!         }
//!         seq.done()
//!     }
//! }
//! ```
//!
//! ## Serializing a map or struct
//!
//! This code demonstrates what is generated for structs by
//! `#[derive(Serialize)]`.
//!
//! ```rust
//! use bsondoc::ser::{Done, Serialize, Visitor};
//! use bsondoc::Result;
//!
//! // The struct that we would like to serialize.
//! struct Demo {
//!     code: u32,
//!     message: String,
//! }
//!
//! impl Serialize for Demo {
//!     fn begin(&self, v: Visitor) -> Result<Done> {
//!         v.map()?
//!             .field("code", &self.code)?
//!             .field("message", &self.message)?
//!             .done()
//!     }
//! }
//! ```

mod bin;
mod impls;
mod tree;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::settings::{EncoderSettings, UnsignedEncodingStrategy};

use self::bin::BinSerializer;
use self::tree::TreeSerializer;

/// Trait for data structures that can be written as BSON.
///
/// [Refer to the module documentation for examples.][crate::ser]
pub trait Serialize {
    fn begin(&self, v: Visitor) -> Result<Done>;
}

////////////////////////////////////////////////////////////////////////////////

/// Proof that a value was handed to its visitor.
pub struct Done(());

/// Safe interface to proper call `Serializer` functions
pub struct Visitor<'a> {
    s: &'a mut dyn Serializer,
}

impl<'a, S: Serializer> From<&'a mut S> for Visitor<'a> {
    #[inline(always)]
    fn from(s: &'a mut S) -> Self {
        Visitor { s }
    }
}

macro_rules! visit_impl {
    ($($method:ident($($arg:ident: $t:ty),*);)*) => {
        $(
            #[inline(always)]
            pub fn $method(self, $($arg: $t),*) -> Result<Done> {
                self.s.$method($($arg),*)?;
                Ok(Done(()))
            }
        )*
    };
}

impl<'a> Visitor<'a> {
    visit_impl! {
        null();
        boolean(b: bool);
        string(s: &str);
        sbyte(n: i8);
        short(n: i16);
        int(n: i32);
        long(n: i64);
        byte(n: u8);
        ushort(n: u16);
        uint(n: u32);
        ulong(n: u64);
        single(n: f32);
        double(n: f64);
        primitive(value: &Primitive);
        none();
    }

    #[inline(always)]
    pub fn seq(self) -> Result<Seq<'a>> {
        Ok(Seq { s: self.s.seq()? })
    }

    #[inline(always)]
    pub fn map(self) -> Result<Map<'a>> {
        Ok(Map { m: self.s.map()? })
    }
}

/// Safe interface to proper call `SerializerSeq` functions
pub struct Seq<'a> {
    s: &'a mut dyn SerializerSeq,
}

impl<'a> Seq<'a> {
    #[inline(always)]
    pub fn element(self, s: &dyn Serialize) -> Result<Self> {
        self.s.element(s)?;
        Ok(self)
    }

    #[inline(always)]
    pub fn done(self) -> Result<Done> {
        self.s.done()?;
        Ok(Done(()))
    }
}

/// Safe interface to proper call `SerializerMap` functions
pub struct Map<'a> {
    m: &'a mut dyn SerializerMap,
}

impl<'a> Map<'a> {
    #[inline(always)]
    pub fn field(self, k: &str, s: &dyn Serialize) -> Result<Self> {
        self.m.field(k, s)?;
        Ok(self)
    }

    #[inline(always)]
    pub fn done(self) -> Result<Done> {
        self.m.done()?;
        Ok(Done(()))
    }
}

////////////////////////////////////////////////////////////////////////////////

pub trait Serializer {
    fn null(&mut self) -> Result<()>;

    fn boolean(&mut self, b: bool) -> Result<()>;

    fn string(&mut self, s: &str) -> Result<()>;

    #[inline]
    fn sbyte(&mut self, n: i8) -> Result<()> {
        self.int(n as i32)
    }

    #[inline]
    fn short(&mut self, n: i16) -> Result<()> {
        self.int(n as i32)
    }

    fn int(&mut self, n: i32) -> Result<()>;

    fn long(&mut self, n: i64) -> Result<()>;

    #[inline]
    fn byte(&mut self, n: u8) -> Result<()> {
        self.int(n as i32)
    }

    #[inline]
    fn ushort(&mut self, n: u16) -> Result<()> {
        self.int(n as i32)
    }

    #[inline]
    fn uint(&mut self, n: u32) -> Result<()> {
        self.ulong(n as u64)
    }

    fn ulong(&mut self, n: u64) -> Result<()>;

    #[inline]
    fn single(&mut self, n: f32) -> Result<()> {
        self.double(n as f64)
    }

    fn double(&mut self, n: f64) -> Result<()>;

    fn primitive(&mut self, value: &Primitive) -> Result<()>;

    /// An absent optional value.
    fn none(&mut self) -> Result<()>;

    fn seq(&mut self) -> Result<&mut dyn SerializerSeq>;

    fn map(&mut self) -> Result<&mut dyn SerializerMap>;
}

pub trait SerializerSeq {
    fn element(&mut self, s: &dyn Serialize) -> Result<()>;
    fn done(&mut self) -> Result<()>;
}

pub trait SerializerMap {
    fn field(&mut self, k: &str, s: &dyn Serialize) -> Result<()>;
    fn done(&mut self) -> Result<()>;
}

////////////////////////////////////////////////////////////////////////////////

fn unsigned(settings: &EncoderSettings, n: u64) -> Result<Primitive> {
    match settings.unsigned {
        UnsignedEncodingStrategy::Int64 if n > i64::MAX as u64 => Err(Error::UnsignedOverflow(n)),
        UnsignedEncodingStrategy::Int64 => Ok(Primitive::Int64(n as i64)),
        UnsignedEncodingStrategy::String => Ok(Primitive::String(itoa::Buffer::new().format(n).to_owned())),
    }
}

fn not_a_document() -> Error {
    Error::InvalidOperation("top level value must be a document")
}

/// Serializes `value` into a [`Primitive`] with the default settings.
pub fn to_primitive<T: ?Sized + Serialize>(value: &T) -> Result<Primitive> {
    to_primitive_with(value, &EncoderSettings::default())
}

pub fn to_primitive_with<T: ?Sized + Serialize>(
    value: &T,
    settings: &EncoderSettings,
) -> Result<Primitive> {
    let mut s = TreeSerializer::new(settings, false);
    value.begin(Visitor::from(&mut s))?;
    Ok(s.finish())
}

/// Serializes `value` into a [`Document`]. Fails when `value` is not
/// written as a map or a sequence.
///
/// ```rust
/// use bsondoc::{ser, Primitive, Serialize};
///
/// #[derive(Serialize)]
/// struct Example {
///     code: u32,
///     message: String,
/// }
///
/// let doc = ser::to_document(&Example {
///     code: 200,
///     message: "reminiscent of Serde".to_owned(),
/// })
/// .unwrap();
/// assert_eq!(doc.get("code"), Some(Primitive::Int64(200)));
/// ```
pub fn to_document<T: ?Sized + Serialize>(value: &T) -> Result<Document> {
    to_document_with(value, &EncoderSettings::default())
}

pub fn to_document_with<T: ?Sized + Serialize>(
    value: &T,
    settings: &EncoderSettings,
) -> Result<Document> {
    match to_primitive_with(value, settings)? {
        Primitive::Document(doc) => Ok(doc),
        _ => Err(not_a_document()),
    }
}

/// Serializes `value` straight into encoded bytes.
///
/// ```rust
/// use bsondoc::{ser, Serialize};
/// use bsondoc::export::hex;
///
/// #[derive(Serialize, Debug)]
/// struct Example {
///     code: u32,
///     message: String,
/// }
///
/// fn main() -> bsondoc::Result<()> {
///     let example = Example {
///         code: 200,
///         message: "reminiscent of Serde".to_owned(),
///     };
///
///     let b = ser::to_bin(&example)?;
///     println!("{}", hex::encode(&b));
///     Ok(())
/// }
/// ```
pub fn to_bin<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    to_bin_with(value, &EncoderSettings::default())
}

pub fn to_bin_with<T: ?Sized + Serialize>(value: &T, settings: &EncoderSettings) -> Result<Vec<u8>> {
    let mut s = BinSerializer::new(settings);
    value.begin(Visitor::from(&mut s))?;
    Ok(s.finish())
}
