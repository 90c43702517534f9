//! Ordered key/value documents backed by their wire bytes.
//!
//! A [`Document`] never holds anything but a valid encoding: every mutation
//! rewrites the affected element in place and patches the length prefix
//! before returning. Reads scan the elements and decode only the value that
//! was asked for.
//!
//! ```rust
//! use bsondoc::{doc, Document, Primitive};
//!
//! let mut doc = doc! { "hello": "world" };
//! assert_eq!(doc.as_bytes().len(), 22);
//!
//! doc.insert("answer", 42).unwrap();
//! assert_eq!(doc.get("answer"), Some(Primitive::Int32(42)));
//!
//! doc.set("hello", None).unwrap();
//! assert!(!doc.contains_key("hello"));
//! ```

mod iter;
mod path;
pub(crate) mod validate;

pub use self::iter::{IntoIter, Iter, Keys, Values};

use std::fmt;
use std::iter::FromIterator;
use tracing::debug;

use crate::buffer::Buffer;
use crate::element::{self, RawElement};
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::tag::TypeIdentifier;

use self::iter::RawIter;

const EMPTY: [u8; 5] = [5, 0, 0, 0, 0];

/// Position of an element inside the storage, detached from its borrow.
#[derive(Copy, Clone)]
struct Slot {
    ty: TypeIdentifier,
    start: usize,
    value: usize,
    end: usize,
}

impl<'a> From<RawElement<'a>> for Slot {
    fn from(e: RawElement<'a>) -> Self {
        Slot {
            ty: e.ty,
            start: e.start,
            value: e.value,
            end: e.end,
        }
    }
}

/// A BSON document or array.
///
/// Clones share their bytes until one of them is written to.
#[derive(Clone)]
pub struct Document {
    storage: Buffer,
    is_array: bool,
    /// Element count, filled in the first time a write needs it and kept
    /// up to date by every write after that.
    count: Option<usize>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            storage: Buffer::copy_from_slice(&EMPTY),
            is_array: false,
            count: Some(0),
        }
    }

    pub fn new_array() -> Self {
        Document {
            is_array: true,
            ..Document::new()
        }
    }

    /// Takes ownership of encoded bytes after checking them.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if let Err(err) = validate::validate(&bytes) {
            debug!(offset = ?err.offset(), error = %err, "rejected document bytes");
            return Err(err);
        }
        Ok(Document::from_raw(Buffer::from_vec(bytes), false))
    }

    /// Same as [`from_bytes`](Document::from_bytes), for an array at the
    /// top level.
    pub fn array_from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut doc = Document::from_bytes(bytes)?;
        doc.is_array = true;
        Ok(doc)
    }

    /// Wraps bytes known to hold a valid document.
    pub(crate) fn from_raw(storage: Buffer, is_array: bool) -> Self {
        Document {
            storage,
            is_array,
            count: None,
        }
    }

    /// Re-parses the bytes and reports the first structural error.
    pub fn validate(&self) -> Result<()> {
        validate::validate(self.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_slice()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.storage.to_vec()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.storage.into_vec()
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// `true` when the keys are "0", "1", ... in storage order.
    pub fn has_sequential_keys(&self) -> bool {
        let mut index = itoa::Buffer::new();
        self.raw()
            .enumerate()
            .all(|(i, e)| e.key == index.format(i))
    }

    /// Number of elements. Walks the whole document unless a previous write
    /// already counted them.
    pub fn len(&self) -> usize {
        match self.count {
            Some(n) => n,
            None => self.raw().count(),
        }
    }

    fn element_count(&mut self) -> usize {
        match self.count {
            Some(n) => n,
            None => {
                let n = self.raw().count();
                self.count = Some(n);
                n
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.storage.len() <= EMPTY.len()
    }

    /// The bytes without the terminator. Offsets match `as_bytes`.
    fn elements(&self) -> &[u8] {
        let bytes = self.storage.as_slice();
        &bytes[..bytes.len().saturating_sub(1)]
    }

    pub(crate) fn raw(&self) -> RawIter {
        RawIter::new(self.elements())
    }

    fn find(&self, key: &str) -> Option<Slot> {
        self.raw().find(|e| e.key == key).map(Slot::from)
    }

    fn nth(&self, index: usize) -> Option<Slot> {
        self.raw().nth(index).map(Slot::from)
    }

    fn decode_at(&self, ty: TypeIdentifier, at: usize) -> Option<Primitive> {
        element::decode_value(ty, &self.storage, at)
            .ok()
            .map(|(value, _)| value)
    }

    pub fn get(&self, key: &str) -> Option<Primitive> {
        let slot = self.find(key)?;
        self.decode_at(slot.ty, slot.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Writes `value` under `key`, or removes the key for `None`.
    ///
    /// An existing key is overwritten where it stands. A new key goes last.
    /// Adding a key other than the next index to an array turns it into a
    /// plain document.
    pub fn set(&mut self, key: &str, value: Option<Primitive>) -> Result<()> {
        let value = match value {
            Some(value) => value,
            None => {
                self.remove(key);
                return Ok(());
            }
        };

        let slot = self.find(key);
        if slot.is_none() && self.is_array {
            let next = self.element_count();
            if key != itoa::Buffer::new().format(next) {
                self.is_array = false;
            }
        }
        self.write_element(slot, key, value)
    }

    pub fn insert<V: Into<Primitive>>(&mut self, key: &str, value: V) -> Result<()> {
        self.set(key, Some(value.into()))
    }

    /// Removes `key` and returns what it held.
    ///
    /// Removing anything but the last element of an array leaves a gap in
    /// the indices, so the document stops being an array.
    pub fn remove(&mut self, key: &str) -> Option<Primitive> {
        let slot = self.find(key)?;
        let value = self.decode_at(slot.ty, slot.value);
        if self.is_array && slot.end != self.elements().len() {
            self.is_array = false;
        }
        self.storage.remove(slot.start, slot.end - slot.start);
        if let Some(n) = self.count.as_mut() {
            *n -= 1;
        }
        self.sync_length();
        value
    }

    /// Appends `value` under the next index.
    pub fn push<V: Into<Primitive>>(&mut self, value: V) -> Result<()> {
        let key = self.element_count();
        self.write_element(None, itoa::Buffer::new().format(key), value.into())
    }

    /// The element at position `index`, whatever its key.
    pub fn get_index(&self, index: usize) -> Option<Primitive> {
        let slot = self.nth(index)?;
        self.decode_at(slot.ty, slot.value)
    }

    /// Overwrites the element at `index`, keeping its key. Setting one past
    /// the last element pushes.
    pub fn set_index<V: Into<Primitive>>(&mut self, index: usize, value: V) -> Result<()> {
        let len = self.element_count();
        if index == len {
            return self.push(value);
        }
        let slot = self
            .nth(index)
            .ok_or(Error::InvalidOperation("index out of bounds"))?;
        let key = self.key_at(slot).to_owned();
        self.write_element(Some(slot), &key, value.into())
    }

    /// Removes the element at `index`. The keys of an array are renumbered
    /// so they stay sequential.
    pub fn remove_index(&mut self, index: usize) -> Option<Primitive> {
        let slot = self.nth(index)?;
        let value = self.decode_at(slot.ty, slot.value);
        self.storage.remove(slot.start, slot.end - slot.start);
        if let Some(n) = self.count.as_mut() {
            *n -= 1;
        }
        if self.is_array {
            self.renumber(slot.start, index);
        }
        self.sync_length();
        value
    }

    fn key_at(&self, slot: Slot) -> &str {
        element::cstring(self.elements(), slot.start + 1)
            .map(|(key, _)| key)
            .unwrap_or("")
    }

    /// Rewrites the keys of every element from byte `at` on as consecutive
    /// indices starting at `first`.
    fn renumber(&mut self, at: usize, first: usize) {
        let tail = {
            let elements = self.elements();
            let mut out = Vec::with_capacity(elements.len() - at);
            let mut index = itoa::Buffer::new();
            for (i, e) in RawIter::starting_at(elements, at).enumerate() {
                out.push(e.ty.as_u8());
                out.extend_from_slice(index.format(first + i).as_bytes());
                out.push(0);
                out.extend_from_slice(&elements[e.value..e.end]);
            }
            out
        };
        let end = self.elements().len();
        self.storage.replace(at, end - at, &tail);
    }

    fn write_element(&mut self, slot: Option<Slot>, key: &str, value: Primitive) -> Result<()> {
        let mut bytes = Vec::new();
        element::encode_element(key, &value, &mut bytes)?;
        // May share our storage, let go before writing.
        drop(value);

        match slot {
            Some(slot) => self.storage.replace(slot.start, slot.end - slot.start, &bytes),
            None => {
                let at = self.elements().len();
                self.storage.insert(at, &bytes);
                if let Some(n) = self.count.as_mut() {
                    *n += 1;
                }
            }
        }
        self.sync_length();
        Ok(())
    }

    fn sync_length(&mut self) {
        let len = self.storage.len() as i32;
        self.storage.patch_i32(0, len);
    }

    pub fn iter(&self) -> Iter {
        Iter::new(self)
    }

    pub fn keys(&self) -> Keys {
        Keys::new(self)
    }

    pub fn values(&self) -> Values {
        Values::new(self)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.is_array == other.is_array && self.storage == other.storage
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl AsRef<[u8]> for Document {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_array {
            f.debug_list().entries(self.values()).finish()
        } else {
            f.debug_map().entries(self.iter()).finish()
        }
    }
}

/// Builds an array.
///
/// # Panics
///
/// When a regular expression holds a NUL byte.
impl From<Vec<Primitive>> for Document {
    fn from(values: Vec<Primitive>) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<Primitive> for Document {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        let mut doc = Document::new_array();
        for value in iter {
            if let Err(err) = doc.push(value) {
                panic!("cannot build array: {}", err);
            }
        }
        doc
    }
}

impl<K: AsRef<str>, V: Into<Primitive>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        doc.extend(iter);
        doc
    }
}

/// # Panics
///
/// When a key or a regular expression holds a NUL byte.
impl<K: AsRef<str>, V: Into<Primitive>> Extend<(K, V)> for Document {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.insert(key.as_ref(), value) {
                panic!("cannot extend document: {}", err);
            }
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a str, Primitive);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Primitive);
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter::new(self)
    }
}
