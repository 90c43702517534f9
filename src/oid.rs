//! 12 byte object identifiers.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::convert::TryInto;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::error::{Error, Result};

static GENERATOR: Lazy<ObjectIdGenerator> = Lazy::new(ObjectIdGenerator::new);

/// A 4 byte big endian Unix timestamp followed by 8 opaque bytes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generates a new id from the process wide generator.
    pub fn new() -> Self {
        GENERATOR.generate()
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Seconds since the Unix epoch, read from the first 4 bytes only.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn date(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.timestamp() as u64)
    }

    /// 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        bintext::hex::encode(&self.0[..])
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidObjectId(s.to_owned());
        if s.len() != 24 {
            return Err(invalid());
        }
        let bytes: [u8; 12] = bintext::hex::decode(s)
            .map_err(|_| invalid())?
            .as_slice()
            .try_into()
            .map_err(|_| invalid())?;
        Ok(ObjectId(bytes))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectId::from_hex(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

/// Hands out unique ids.
///
/// Holds an 8 byte template seeded at random. Every id increments the
/// template as a big endian integer, so the trailing 3 bytes count and their
/// overflow carries into the random bytes before them. The template sits
/// behind a lock and the generator can be shared between threads.
pub struct ObjectIdGenerator {
    template: Mutex<u64>,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        trace!("seeded object id generator");
        ObjectIdGenerator {
            template: Mutex::new(seed),
        }
    }

    /// Starts from a known template, mostly useful to reproduce ids.
    pub fn with_template(template: [u8; 8]) -> Self {
        ObjectIdGenerator {
            template: Mutex::new(u64::from_be_bytes(template)),
        }
    }

    pub fn generate(&self) -> ObjectId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.generate_at(now as u32)
    }

    /// Generates an id stamped with `timestamp` seconds.
    pub fn generate_at(&self, timestamp: u32) -> ObjectId {
        let template = {
            let mut t = self.template.lock();
            *t = t.wrapping_add(1);
            *t
        };

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..].copy_from_slice(&template.to_be_bytes());
        ObjectId(bytes)
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        ObjectIdGenerator::new()
    }
}

impl fmt::Debug for ObjectIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ObjectIdGenerator").finish()
    }
}

pub(crate) fn read_object_id(bytes: &[u8]) -> Option<ObjectId> {
    let raw: [u8; 12] = bytes.get(..12)?.try_into().ok()?;
    Some(ObjectId(raw))
}
