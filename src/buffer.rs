use paste::paste;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

/// Reference counted byte storage with copy-on-write slicing.
///
/// Cloning a `Buffer` or taking a [`slice`](Buffer::slice) of it is cheap:
/// both share the same allocation. The first mutation through a handle that
/// does not own the allocation exclusively copies its window into a private
/// allocation, so siblings never observe each other's writes.
///
/// Offsets are relative to the start of this handle's window. Passing an
/// offset outside of it is a bug in the caller and panics.
#[derive(Clone)]
pub struct Buffer {
    data: Arc<Vec<u8>>,
    start: usize,
    len: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer::from_vec(Vec::new())
    }

    pub fn with_capacity(cap: usize) -> Self {
        Buffer::from_vec(Vec::with_capacity(cap))
    }

    /// Takes ownership of `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Buffer {
            data: Arc::new(bytes),
            start: 0,
            len,
        }
    }

    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Buffer::from_vec(bytes.to_vec())
    }

    /// Number of bytes in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes that can be written through this handle without reallocating.
    ///
    /// A shared handle has to copy before writing, so it reports its length.
    pub fn capacity(&self) -> usize {
        if Arc::strong_count(&self.data) == 1 && self.start == 0 {
            self.data.capacity()
        } else {
            self.len
        }
    }

    /// The read buffer, valid for [`len`](Buffer::len) bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    /// The write buffer. Takes a private copy first when shared.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.make_mut(0).as_mut_slice()
    }

    /// `true` when no other handle can observe writes made through this one.
    ///
    /// Needs `&mut self` so the answer cannot go stale between the check and
    /// the write.
    pub fn is_unique(&mut self) -> bool {
        Arc::get_mut(&mut self.data).is_some()
    }

    /// Opposite of [`is_unique`](Buffer::is_unique).
    pub fn requires_copy_for_mutation(&mut self) -> bool {
        !self.is_unique()
    }

    /// Guarantees room for `n` bytes in total. Never shrinks.
    pub fn ensure_capacity(&mut self, n: usize) {
        let additional = n.saturating_sub(self.len);
        self.make_mut(additional);
    }

    /// Returns a vec holding exactly this handle's bytes, owned by this handle
    /// alone, with room for `additional` more bytes.
    fn make_mut(&mut self, additional: usize) -> &mut Vec<u8> {
        if Arc::get_mut(&mut self.data).is_none() {
            trace!(len = self.len, "copying shared buffer before mutation");
            let mut fresh = Vec::with_capacity(self.len + additional);
            fresh.extend_from_slice(self.as_slice());
            self.data = Arc::new(fresh);
            self.start = 0;
        }

        let (start, len) = (self.start, self.len);
        // Unique at this point, `make_mut` never clones here.
        let vec = Arc::make_mut(&mut self.data);
        if start != 0 || vec.len() != len {
            // The siblings of a slice are gone, trim the allocation down to
            // the window.
            vec.truncate(start + len);
            vec.drain(..start);
            self.start = 0;
        }
        vec.reserve(additional);
        vec
    }

    /// Shifts the bytes after `at` to the right and copies `bytes` in.
    pub fn insert(&mut self, at: usize, bytes: &[u8]) {
        assert!(at <= self.len, "insert at {} past end {}", at, self.len);
        let n = bytes.len();
        let vec = self.make_mut(n);
        let old = vec.len();
        vec.resize(old + n, 0);
        vec.copy_within(at..old, at + n);
        vec[at..at + n].copy_from_slice(bytes);
        self.len += n;
    }

    /// Replaces `old_len` bytes at `offset` with `bytes`, moving the tail by
    /// the size difference.
    pub fn replace(&mut self, offset: usize, old_len: usize, bytes: &[u8]) {
        let end = offset + old_len;
        assert!(end <= self.len, "replace {}..{} past end {}", offset, end, self.len);
        let new_len = bytes.len();
        let vec = self.make_mut(new_len.saturating_sub(old_len));
        let total = vec.len();

        if new_len > old_len {
            vec.resize(total + new_len - old_len, 0);
            vec.copy_within(end..total, offset + new_len);
        } else if new_len < old_len {
            vec.copy_within(end..total, offset + new_len);
            vec.truncate(total - (old_len - new_len));
        }
        vec[offset..offset + new_len].copy_from_slice(bytes);
        self.len = vec.len();
    }

    /// Drops `len` bytes at `from`, shifting the tail left. The allocation is
    /// kept.
    pub fn remove(&mut self, from: usize, len: usize) {
        let end = from + len;
        assert!(end <= self.len, "remove {}..{} past end {}", from, end, self.len);
        let vec = self.make_mut(0);
        let total = vec.len();
        vec.copy_within(end..total, from);
        vec.truncate(total - len);
        self.len -= len;
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        let vec = self.make_mut(bytes.len());
        vec.extend_from_slice(bytes);
        self.len += bytes.len();
    }

    /// A view over `range` sharing this allocation until either side writes.
    pub fn slice(&self, range: Range<usize>) -> Buffer {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "slice {:?} out of bounds {}",
            range,
            self.len
        );
        Buffer {
            data: Arc::clone(&self.data),
            start: self.start + range.start,
            len: range.end - range.start,
        }
    }

    /// Overwrites the 4 bytes at `offset` with `value` in little endian.
    pub fn patch_i32(&mut self, offset: usize, value: i32) {
        assert!(offset + 4 <= self.len, "patch at {} past end {}", offset, self.len);
        self.make_mut(0)[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    pub fn into_vec(self) -> Vec<u8> {
        let (start, len) = (self.start, self.len);
        match Arc::try_unwrap(self.data) {
            Ok(mut vec) => {
                vec.truncate(start + len);
                vec.drain(..start);
                vec
            }
            Err(shared) => shared[start..start + len].to_vec(),
        }
    }
}

macro_rules! write_impl {
    ($($t:ty),*) => {
        impl Buffer {
            $(paste! {
                pub fn [<write_ $t>] (&mut self, value: $t) {
                    self.extend_from_slice(&value.to_le_bytes()[..]);
                }
            })*
        }
    };
}

write_impl!(u8, i8, u32, i32, u64, i64, f64);

impl Default for Buffer {
    fn default() -> Self {
        Buffer::new()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Buffer({})", bintext::hex::encode(self.as_slice()))
    }
}

impl std::ops::Index<usize> for Buffer {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl std::ops::IndexMut<usize> for Buffer {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}
