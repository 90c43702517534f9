use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::tag::BinarySubtype;

/// Arbitrary bytes tagged with a subtype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary {
    pub subtype: BinarySubtype,
    pub bytes: Vec<u8>,
}

impl Binary {
    pub fn new(subtype: BinarySubtype, bytes: Vec<u8>) -> Self {
        Binary { subtype, bytes }
    }

    pub fn generic(bytes: Vec<u8>) -> Self {
        Binary::new(BinarySubtype::Generic, bytes)
    }
}

/// Flags of a regular expression, written as the option characters `i`,
/// `m`, `s` and `x`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegexOptions {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub extended: bool,
}

impl RegexOptions {
    /// Reads the known option characters, ignoring the rest.
    pub fn parse(options: &str) -> Self {
        let mut opt = RegexOptions::default();
        for c in options.chars() {
            match c {
                'i' => opt.case_insensitive = true,
                'm' => opt.multi_line = true,
                's' => opt.dot_matches_new_line = true,
                'x' => opt.extended = true,
                _ => {}
            }
        }
        opt
    }

    /// Option characters in alphabetical order.
    pub fn to_canonical(self) -> String {
        let mut s = String::with_capacity(4);
        if self.case_insensitive {
            s.push('i');
        }
        if self.multi_line {
            s.push('m');
        }
        if self.dot_matches_new_line {
            s.push('s');
        }
        if self.extended {
            s.push('x');
        }
        s
    }
}

/// A pattern and its option characters, stored as two C strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegularExpression {
    pub pattern: String,
    pub options: String,
}

impl RegularExpression {
    /// Keeps `options` verbatim.
    pub fn new<P: Into<String>, O: Into<String>>(pattern: P, options: O) -> Self {
        RegularExpression {
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    pub fn with_options<P: Into<String>>(pattern: P, options: RegexOptions) -> Self {
        RegularExpression::new(pattern, options.to_canonical())
    }

    pub fn options(&self) -> RegexOptions {
        RegexOptions::parse(&self.options)
    }

    /// Compiles the pattern with the `regex` crate.
    pub fn to_regex(&self) -> Result<regex::Regex> {
        let opt = self.options();
        regex::RegexBuilder::new(&self.pattern)
            .case_insensitive(opt.case_insensitive)
            .multi_line(opt.multi_line)
            .dot_matches_new_line(opt.dot_matches_new_line)
            .ignore_whitespace(opt.extended)
            .build()
            .map_err(Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaScriptCode {
    pub code: String,
}

impl JavaScriptCode {
    pub fn new<S: Into<String>>(code: S) -> Self {
        JavaScriptCode { code: code.into() }
    }
}

/// Code evaluated with the variables of `scope` in reach.
#[derive(Clone, Debug, PartialEq)]
pub struct JavaScriptCodeWithScope {
    pub code: String,
    pub scope: Document,
}

impl JavaScriptCodeWithScope {
    pub fn new<S: Into<String>>(code: S, scope: Document) -> Self {
        JavaScriptCodeWithScope {
            code: code.into(),
            scope,
        }
    }
}

/// Internal replication timestamp: an increment within a second.
///
/// On the wire the increment comes first, then the seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub time: u32,
    pub increment: u32,
}

impl Timestamp {
    pub fn new(time: u32, increment: u32) -> Self {
        Timestamp { time, increment }
    }

    pub(crate) fn from_wire(raw: u64) -> Self {
        Timestamp {
            increment: raw as u32,
            time: (raw >> 32) as u32,
        }
    }

    pub(crate) fn to_wire(self) -> u64 {
        ((self.time as u64) << 32) | self.increment as u64
    }
}

/// Raw IEEE 754-2008 decimal, carried but not interpreted.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    bytes: [u8; 16],
}

impl Decimal128 {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Decimal128 { bytes }
    }

    pub fn bytes(&self) -> [u8; 16] {
        self.bytes
    }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Decimal128({})", bintext::hex::encode(&self.bytes[..]))
    }
}

/// Milliseconds since the Unix epoch, negative before it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(i64);

impl DateTime {
    pub fn now() -> Self {
        DateTime::from(SystemTime::now())
    }

    pub const fn from_millis(millis: i64) -> Self {
        DateTime(millis)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0
    }

    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs())
        }
    }
}

impl From<SystemTime> for DateTime {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => DateTime(d.as_millis() as i64),
            Err(e) => DateTime(-(e.duration().as_millis() as i64)),
        }
    }
}

impl From<DateTime> for SystemTime {
    fn from(d: DateTime) -> Self {
        d.to_system_time()
    }
}
