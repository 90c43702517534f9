//! BSON documents that live in their encoded form.
//!
//! A [`Document`] is a buffer of valid BSON bytes. Reading a key scans the
//! elements and decodes only that value; writing a key patches the bytes in
//! place. Nested documents returned by reads are views into the parent's
//! storage and copy themselves on first write.
//!
//! # Document
//!
//! ```rust
//! use bsondoc::{array, doc, Primitive};
//!
//! let mut doc = doc! {
//!     "name": "bsondoc",
//!     "tags": array!["binary", "json"],
//! };
//! doc.insert("stars", 3).unwrap();
//!
//! assert_eq!(doc.get("stars"), Some(Primitive::Int32(3)));
//! assert_eq!(doc.get_path(&["tags", "1"]), Some(Primitive::from("json")));
//! ```
//!
//! # Struct
//!
//! ```rust
//! use bsondoc::{de, ser, Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, Debug)]
//! struct Example {
//!     code: u32,
//!     #[bsondoc(rename = "msg")]
//!     message: String,
//!     #[bsondoc(skip)]
//!     ignore: (),
//! }
//!
//! fn main() -> bsondoc::Result<()> {
//!     let example = Example {
//!         code: 200,
//!         message: "reminiscent of Serde".to_owned(),
//!         ignore: (),
//!     };
//!
//!     let doc = ser::to_document(&example)?;
//!     println!("{:?}", doc);
//!
//!     let out: Example = de::from_document(&doc)?;
//!     println!("{:?}", out);
//!
//!     let bytes = ser::to_bin(&example)?;
//!     let out: Example = de::from_bin(&bytes)?;
//!     assert_eq!(out.message, "reminiscent of Serde");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Enum
//!
//! Enums made of unit variants are written as strings.
//!
//! ```rust
//! use bsondoc::{Serialize, Deserialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! enum Level {
//!     Low,
//!     #[bsondoc(rename = "mid")]
//!     Medium,
//!     High,
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/bsondoc/0.1.0")]
#![allow(clippy::needless_doctest_main, clippy::len_without_is_empty)]

#[doc(hidden)]
pub use bsondoc_internal::*;

// Not public API.
#[doc(hidden)]
pub mod export;

#[macro_use]
mod macros;

mod error;
mod primitive;
mod tag;

pub mod buffer;
pub mod de;
pub mod document;
pub mod element;
pub mod oid;
pub mod ser;
pub mod settings;

#[doc(inline)]
pub use crate::de::Deserialize;
#[doc(inline)]
pub use crate::de::Deserializer;
pub use crate::document::Document;
pub use crate::error::{Error, Result};
pub use crate::oid::{ObjectId, ObjectIdGenerator};
pub use crate::primitive::{
    Binary, DateTime, Decimal128, JavaScriptCode, JavaScriptCodeWithScope, Primitive, RegexOptions,
    RegularExpression, Timestamp,
};
#[doc(inline)]
pub use crate::ser::Serialize;
#[doc(inline)]
pub use crate::ser::Serializer;
pub use crate::settings::{DecoderSettings, EncoderSettings};
pub use crate::tag::{BinarySubtype, TypeIdentifier};

