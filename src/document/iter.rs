use crate::element::{self, RawElement};
use crate::primitive::Primitive;

use super::Document;

/// Walks the elements of a valid document without decoding values.
pub(crate) struct RawIter<'a> {
    elements: &'a [u8],
    at: usize,
}

impl<'a> RawIter<'a> {
    pub(crate) fn new(elements: &'a [u8]) -> Self {
        RawIter::starting_at(elements, 4)
    }

    pub(crate) fn starting_at(elements: &'a [u8], at: usize) -> Self {
        RawIter { elements, at }
    }
}

impl<'a> Iterator for RawIter<'a> {
    type Item = RawElement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let e = element::scan_element(self.elements, self.at).ok()??;
        self.at = e.end;
        Some(e)
    }
}

/// `(key, value)` pairs in storage order.
pub struct Iter<'a> {
    doc: &'a Document,
    raw: RawIter<'a>,
}

impl<'a> Iter<'a> {
    pub(super) fn new(doc: &'a Document) -> Self {
        Iter { doc, raw: doc.raw() }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Primitive);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.raw.next()?;
        let value = self.doc.decode_at(e.ty, e.value)?;
        Some((e.key, value))
    }
}

pub struct Keys<'a> {
    raw: RawIter<'a>,
}

impl<'a> Keys<'a> {
    pub(super) fn new(doc: &'a Document) -> Self {
        Keys { raw: doc.raw() }
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.raw.next().map(|e| e.key)
    }
}

pub struct Values<'a> {
    inner: Iter<'a>,
}

impl<'a> Values<'a> {
    pub(super) fn new(doc: &'a Document) -> Self {
        Values {
            inner: Iter::new(doc),
        }
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = Primitive;

    fn next(&mut self) -> Option<Primitive> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// Owning iterator, yields owned keys.
pub struct IntoIter {
    doc: Document,
    at: usize,
}

impl IntoIter {
    pub(super) fn new(doc: Document) -> Self {
        IntoIter { doc, at: 4 }
    }
}

impl Iterator for IntoIter {
    type Item = (String, Primitive);

    fn next(&mut self) -> Option<Self::Item> {
        let e = element::scan_element(self.doc.elements(), self.at).ok()??;
        self.at = e.end;
        let key = e.key.to_owned();
        let value = self.doc.decode_at(e.ty, e.value)?;
        Some((key, value))
    }
}

#[cfg(test)]
mod tests {
    use crate::{doc, Primitive};

    #[test]
    fn iteration_is_restartable() {
        let doc = doc! { "b": 1, "a": "x", "c": true };
        let first: Vec<_> = doc.iter().map(|(k, _)| k.to_owned()).collect();
        let second: Vec<_> = doc.keys().collect();
        assert_eq!(first, vec!["b", "a", "c"]);
        assert_eq!(second, vec!["b", "a", "c"]);

        let owned: Vec<(String, Primitive)> = doc.into_iter().collect();
        assert_eq!(owned[2], ("c".to_owned(), Primitive::Bool(true)));
    }
}
