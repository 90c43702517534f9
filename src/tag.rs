//! Type identifiers and binary subtypes.

use std::fmt;

/// The byte preceding every element key, naming the element type.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeIdentifier {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    RegularExpression = 0x0B,
    JavaScriptCode = 0x0D,
    JavaScriptCodeWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MinKey = 0xFF,
    MaxKey = 0x7F,
}

impl TypeIdentifier {
    /// Maps a wire byte to its type, `None` for deprecated or unknown bytes.
    pub fn from_u8(tag: u8) -> Option<Self> {
        use TypeIdentifier::*;
        let ty = match tag {
            0x01 => Double,
            0x02 => String,
            0x03 => Document,
            0x04 => Array,
            0x05 => Binary,
            0x07 => ObjectId,
            0x08 => Boolean,
            0x09 => DateTime,
            0x0A => Null,
            0x0B => RegularExpression,
            0x0D => JavaScriptCode,
            0x0F => JavaScriptCodeWithScope,
            0x10 => Int32,
            0x11 => Timestamp,
            0x12 => Int64,
            0x13 => Decimal128,
            0xFF => MinKey,
            0x7F => MaxKey,
            _ => return None,
        };
        Some(ty)
    }

    /// Undefined (0x06), DBPointer (0x0C) and Symbol (0x0E) are part of the
    /// wire format but have no decoder here. Elements carrying them fail
    /// with `InvalidOperation`.
    pub fn deprecated(tag: u8) -> bool {
        matches!(tag, 0x06 | 0x0C | 0x0E)
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Payload size for types with a fixed width.
    pub fn fixed_size(self) -> Option<usize> {
        use TypeIdentifier::*;
        match self {
            Double | DateTime | Int64 | Timestamp => Some(8),
            Int32 => Some(4),
            ObjectId => Some(12),
            Boolean => Some(1),
            Decimal128 => Some(16),
            Null | MinKey | MaxKey => Some(0),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        use TypeIdentifier::*;
        match self {
            Double => "double",
            String => "string",
            Document => "document",
            Array => "array",
            Binary => "binary",
            ObjectId => "objectId",
            Boolean => "bool",
            DateTime => "date",
            Null => "null",
            RegularExpression => "regex",
            JavaScriptCode => "javascript",
            JavaScriptCodeWithScope => "javascriptWithScope",
            Int32 => "int32",
            Timestamp => "timestamp",
            Int64 => "int64",
            Decimal128 => "decimal128",
            MinKey => "minKey",
            MaxKey => "maxKey",
        }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subtype byte of a binary element.
///
/// Unknown bytes are kept as `UserDefined` and written back unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    Encrypted,
    Column,
    UserDefined(u8),
}

impl BinarySubtype {
    pub fn as_u8(self) -> u8 {
        use BinarySubtype::*;
        match self {
            Generic => 0x00,
            Function => 0x01,
            BinaryOld => 0x02,
            UuidOld => 0x03,
            Uuid => 0x04,
            Md5 => 0x05,
            Encrypted => 0x06,
            Column => 0x07,
            UserDefined(b) => b,
        }
    }
}

impl From<u8> for BinarySubtype {
    fn from(b: u8) -> Self {
        use BinarySubtype::*;
        match b {
            0x00 => Generic,
            0x01 => Function,
            0x02 => BinaryOld,
            0x03 => UuidOld,
            0x04 => Uuid,
            0x05 => Md5,
            0x06 => Encrypted,
            0x07 => Column,
            other => UserDefined(other),
        }
    }
}

impl From<BinarySubtype> for u8 {
    fn from(s: BinarySubtype) -> u8 {
        s.as_u8()
    }
}
