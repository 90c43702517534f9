use crate::de::KeyPath;
use crate::error::{Error, Result};
use crate::primitive::Primitive;

use super::Document;

impl Document {
    /// Follows `path` through embedded documents.
    pub fn get_path(&self, path: &[&str]) -> Option<Primitive> {
        let (last, parents) = path.split_last()?;
        let mut current = self.clone();
        for key in parents {
            current = match current.get(key)? {
                Primitive::Document(doc) => doc,
                _ => return None,
            };
        }
        current.get(last)
    }

    /// Sets the value at `path`, creating missing documents on the way.
    ///
    /// The change is written back into every parent before this returns.
    pub fn set_path(&mut self, path: &[&str], value: Option<Primitive>) -> Result<()> {
        match path {
            [] => Err(Error::InvalidOperation("empty key path")),
            [key] => self.set(key, value),
            [first, rest @ ..] => {
                if value.is_none() && !self.contains_key(first) {
                    return Ok(());
                }
                // Nothing is written back unless the nested write succeeds.
                let mut child = self.child(first)?;
                child.set_path(rest, value)?;
                self.set(first, Some(Primitive::Document(child)))
            }
        }
    }

    /// The document under `key`, empty when the key is missing.
    fn child(&self, key: &str) -> Result<Document> {
        match self.get(key) {
            None => Ok(Document::new()),
            Some(Primitive::Document(doc)) => Ok(doc),
            Some(other) => Err(Error::TypeConversion {
                path: KeyPath::from(key),
                from: other.type_identifier(),
                to: "document",
            }),
        }
    }

    /// Runs `f` on the document under `key` and stores the result back.
    ///
    /// A missing key starts out as an empty document. Any other value under
    /// `key` is an error.
    pub fn document_mut<R, F>(&mut self, key: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Document) -> R,
    {
        let mut child = self.child(key)?;
        let out = f(&mut child);
        self.set(key, Some(Primitive::Document(child)))?;
        Ok(out)
    }
}
