//! Deserialization traits.
//!
//! Deserialization in bsondoc works by pulling: a `Deserialize` impl asks the
//! `Deserializer` it is handed for the shape it expects, a scalar, a map or a
//! sequence. Two deserializers exist. [`Decoder`] works on decoded
//! [`Primitive`] trees and applies the strategies of [`DecoderSettings`].
//! [`FastDecoder`] reads straight from encoded bytes and only accepts the
//! conversions the default settings allow.
//!
//! ## Deserializing a primitive
//!
//! ```rust
//! use bsondoc::de::{Deserialize, Deserializer};
//! use bsondoc::Result;
//!
//! struct MyBoolean(bool);
//!
//! impl Deserialize for MyBoolean {
//!     fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
//!         d.deserialize_bool().map(MyBoolean)
//!     }
//! }
//! ```
//!
//! ## Deserializing a map or struct
//!
//! This code demonstrates what is generated for structs by
//! `#[derive(Deserialize)]`.
//!
//! ```rust
//! use bsondoc::de::{Deserialize, Deserializer, MapAccess};
//! use bsondoc::Result;
//!
//! struct Demo {
//!     code: u32,
//!     message: String,
//! }
//!
//! impl Deserialize for Demo {
//!     fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
//!         let mut m = d.deserialize_map()?;
//!         Ok(Demo {
//!             code: m.field("code")?,
//!             message: m.field("message")?,
//!         })
//!     }
//! }
//! ```

mod decoder;
mod fast;
mod impls;
mod path;

pub use self::decoder::Decoder;
pub use self::fast::FastDecoder;
pub use self::path::{KeyPath, PathSegment};

pub(crate) use self::path::{Trail, ROOT};

use crate::document::Document;
use crate::error::Result;
use crate::oid::ObjectId;
use crate::primitive::Primitive;
use crate::settings::DecoderSettings;

/// Trait for data structures that can be rebuilt from a document.
///
/// [Refer to the module documentation for examples.][crate::de]
pub trait Deserialize: Sized {
    fn deserialize<D: Deserializer>(d: D) -> Result<Self>;

    // Not public API. This method is only intended for Option<T>, should not
    // need to be implemented outside of this crate.
    #[doc(hidden)]
    #[inline]
    fn default() -> Option<Self> {
        None
    }
}

/// A source of one value.
pub trait Deserializer: Sized {
    type Map: MapAccess;
    type Seq: SeqAccess;

    fn deserialize_bool(self) -> Result<bool>;
    fn deserialize_i8(self) -> Result<i8>;
    fn deserialize_i16(self) -> Result<i16>;
    fn deserialize_i32(self) -> Result<i32>;
    fn deserialize_i64(self) -> Result<i64>;
    fn deserialize_u8(self) -> Result<u8>;
    fn deserialize_u16(self) -> Result<u16>;
    fn deserialize_u32(self) -> Result<u32>;
    fn deserialize_u64(self) -> Result<u64>;
    fn deserialize_f32(self) -> Result<f32>;
    fn deserialize_f64(self) -> Result<f64>;
    fn deserialize_string(self) -> Result<String>;
    fn deserialize_object_id(self) -> Result<ObjectId>;

    /// The raw value, whatever its type.
    fn deserialize_primitive(self) -> Result<Primitive>;

    /// The raw value passed through `f`. `None` from `f` is reported as a
    /// conversion into `expected`.
    fn deserialize_primitive_as<T, F>(self, expected: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(Primitive) -> Option<T>;

    /// Null becomes `None`, anything else goes to `T`.
    fn deserialize_option<T: Deserialize>(self) -> Result<Option<T>>;

    fn deserialize_map(self) -> Result<Self::Map>;
    fn deserialize_seq(self) -> Result<Self::Seq>;
}

/// Keyed access into a document.
pub trait MapAccess {
    /// Decodes the value under `key`. An absent key is an error unless `T`
    /// has a default for it, as `Option` does.
    fn field<T: Deserialize>(&mut self, key: &str) -> Result<T>;

    /// Like [`field`](MapAccess::field) but `None` when the key is absent.
    fn field_opt<T: Deserialize>(&mut self, key: &str) -> Result<Option<T>>;

    /// Walks the entries in storage order.
    fn next_entry<T: Deserialize>(&mut self) -> Result<Option<(String, T)>>;
}

/// Positional access into an array.
pub trait SeqAccess {
    fn next_element<T: Deserialize>(&mut self) -> Result<Option<T>>;

    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Deserializes a document with the default settings.
///
/// ```rust
/// use bsondoc::{de, doc, Deserialize};
///
/// #[derive(Deserialize, Debug)]
/// struct Example {
///     code: u32,
///     message: String,
/// }
///
/// fn main() -> bsondoc::Result<()> {
///     let doc = doc! { "code": 200, "message": "reminiscent of Serde" };
///     let out: Example = de::from_document(&doc)?;
///     assert_eq!(out.code, 200);
///     Ok(())
/// }
/// ```
pub fn from_document<T: Deserialize>(doc: &Document) -> Result<T> {
    from_document_with(doc, &DecoderSettings::default())
}

pub fn from_document_with<T: Deserialize>(doc: &Document, settings: &DecoderSettings) -> Result<T> {
    from_primitive_with(Primitive::Document(doc.clone()), settings)
}

pub fn from_primitive<T: Deserialize>(value: Primitive) -> Result<T> {
    from_primitive_with(value, &DecoderSettings::default())
}

pub fn from_primitive_with<T: Deserialize>(value: Primitive, settings: &DecoderSettings) -> Result<T> {
    T::deserialize(Decoder::new(value, settings, &ROOT))
}

/// Deserializes encoded bytes through the fast path.
///
/// The bytes are checked as they are read, there is no validation pass and
/// no intermediate [`Document`].
///
/// ```rust
/// use bsondoc::{de, doc, Deserialize};
///
/// #[derive(Deserialize)]
/// struct Greeting {
///     hello: String,
/// }
///
/// let bytes = doc! { "hello": "world" }.to_vec();
/// let out: Greeting = de::from_bin(&bytes).unwrap();
/// assert_eq!(out.hello, "world");
/// ```
pub fn from_bin<T: Deserialize>(bytes: &[u8]) -> Result<T> {
    T::deserialize(FastDecoder::root(bytes)?)
}

/// Validates `bytes` and deserializes them with `settings`.
pub fn from_bin_with<T: Deserialize>(bytes: &[u8], settings: &DecoderSettings) -> Result<T> {
    let doc = Document::from_bytes(bytes.to_vec())?;
    from_document_with(&doc, settings)
}
