use std::borrow::Cow;
use std::fmt;

/// One step into a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Where in a document a conversion failed, outermost key first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_key<K: Into<String>>(&mut self, key: K) {
        self.0.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        KeyPath(vec![PathSegment::Key(key.to_owned())])
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone)]
enum Step<'a> {
    Root,
    Key(&'a str),
    Index(usize),
}

/// A path kept on the stack while decoding, turned into a [`KeyPath`] only
/// when an error needs it.
#[derive(Copy, Clone)]
pub(crate) struct Trail<'a> {
    parent: Option<&'a Trail<'a>>,
    step: Step<'a>,
}

pub(crate) static ROOT: Trail<'static> = Trail {
    parent: None,
    step: Step::Root,
};

impl<'a> Trail<'a> {
    pub(crate) fn key(&'a self, key: &'a str) -> Trail<'a> {
        Trail {
            parent: Some(self),
            step: Step::Key(key),
        }
    }

    pub(crate) fn index(&'a self, index: usize) -> Trail<'a> {
        Trail {
            parent: Some(self),
            step: Step::Index(index),
        }
    }

    /// The last key, or the index written out. Empty at the root.
    pub(crate) fn last_key(&self) -> Cow<'a, str> {
        match self.step {
            Step::Root => Cow::Borrowed(""),
            Step::Key(key) => Cow::Borrowed(key),
            Step::Index(index) => Cow::Owned(itoa::Buffer::new().format(index).to_owned()),
        }
    }

    pub(crate) fn to_path(&self) -> KeyPath {
        let mut steps = vec![];
        let mut current = Some(self);
        while let Some(trail) = current {
            steps.push(trail.step);
            current = trail.parent;
        }

        let mut path = KeyPath::root();
        for step in steps.into_iter().rev() {
            match step {
                Step::Root => {}
                Step::Key(key) => path.push_key(key),
                Step::Index(index) => path.push_index(index),
            }
        }
        path
    }
}
