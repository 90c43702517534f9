//! How lenient the structured codec is with the types it finds.
//!
//! ```rust
//! use bsondoc::settings::{DecoderSettings, IntegerDecodingStrategy};
//!
//! let settings = DecoderSettings::default()
//!     .i32(IntegerDecodingStrategy::Adaptive)
//!     .filter_dollar_prefix(true);
//! # let _ = settings;
//! ```

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::trace;

use crate::primitive::Primitive;

/// User supplied conversion, given the key being decoded and its raw value.
pub type CustomDecoder<T> = Arc<dyn Fn(&str, &Primitive) -> Option<T> + Send + Sync>;

/// Integers a strategy can produce.
pub trait DecodeInteger: Copy + FromStr + TryFrom<i64> {
    /// Converts a float rounded to the nearest integer, `None` when out of
    /// range or not finite.
    fn from_rounded(f: f64) -> Option<Self>;
}

macro_rules! decode_integer_impl {
    ($($t:ty),*) => {
        $(
            impl DecodeInteger for $t {
                fn from_rounded(f: f64) -> Option<Self> {
                    let r = f.round();
                    // `MAX as f64` may round up, the `+ 1.0` bound is exact.
                    if r.is_finite() && r >= <$t>::MIN as f64 && r < <$t>::MAX as f64 + 1.0 {
                        Some(r as $t)
                    } else {
                        None
                    }
                }
            }
        )*
    };
}

decode_integer_impl!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Floats a strategy can produce.
pub trait DecodeFloat: Copy + FromStr {
    /// `None` when the conversion would lose precision.
    fn from_f64_exact(f: f64) -> Option<Self>;
    fn from_f64_lossy(f: f64) -> Self;
    fn from_i64(n: i64) -> Self;
}

impl DecodeFloat for f64 {
    fn from_f64_exact(f: f64) -> Option<Self> {
        Some(f)
    }

    fn from_f64_lossy(f: f64) -> Self {
        f
    }

    fn from_i64(n: i64) -> Self {
        n as f64
    }
}

impl DecodeFloat for f32 {
    fn from_f64_exact(f: f64) -> Option<Self> {
        let n = f as f32;
        if n as f64 == f || f.is_nan() {
            Some(n)
        } else {
            None
        }
    }

    fn from_f64_lossy(f: f64) -> Self {
        f as f32
    }

    fn from_i64(n: i64) -> Self {
        n as f32
    }
}

pub(crate) fn integer_exact<T: DecodeInteger>(value: &Primitive) -> Option<T> {
    value.as_integer().and_then(|n| T::try_from(n).ok())
}

/// Accepted sources for an integer.
#[derive(Clone)]
pub enum IntegerDecodingStrategy<T> {
    /// Only the BSON integer type matching the width: Int32 up to 32 bits
    /// signed and 16 bits unsigned, Int64 above.
    Exact,
    /// Int32 or Int64, range checked.
    AnyInteger,
    /// Any integer, or a Double rounded to the nearest integer.
    RoundingAnyNumber,
    /// Any integer, or a String holding a decimal integer.
    Textual,
    /// Any integer, then an integral Double, then a decimal String.
    Adaptive,
    Custom(CustomDecoder<T>),
}

impl<T> Default for IntegerDecodingStrategy<T> {
    fn default() -> Self {
        IntegerDecodingStrategy::AnyInteger
    }
}

impl<T> fmt::Debug for IntegerDecodingStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            IntegerDecodingStrategy::Exact => "Exact",
            IntegerDecodingStrategy::AnyInteger => "AnyInteger",
            IntegerDecodingStrategy::RoundingAnyNumber => "RoundingAnyNumber",
            IntegerDecodingStrategy::Textual => "Textual",
            IntegerDecodingStrategy::Adaptive => "Adaptive",
            IntegerDecodingStrategy::Custom(_) => "Custom",
        })
    }
}

impl<T: DecodeInteger> IntegerDecodingStrategy<T> {
    /// `wide` selects Int64 as the exact source type.
    pub(crate) fn decode(&self, key: &str, value: &Primitive, wide: bool) -> Option<T> {
        use IntegerDecodingStrategy::*;

        match self {
            Exact => match value {
                Primitive::Int32(n) if !wide => T::try_from(*n as i64).ok(),
                Primitive::Int64(n) if wide => T::try_from(*n).ok(),
                _ => None,
            },
            AnyInteger => integer_exact(value),
            RoundingAnyNumber => match value {
                Primitive::Double(f) => T::from_rounded(*f),
                _ => integer_exact(value),
            },
            Textual => match value {
                Primitive::String(s) => s.trim().parse().ok(),
                _ => integer_exact(value),
            },
            Adaptive => {
                if value.as_integer().is_some() {
                    return integer_exact(value);
                }
                trace!(key, from = %value.type_identifier(), "adaptive integer fallback");
                match value {
                    Primitive::Double(f) if f.fract() == 0.0 => T::from_rounded(*f),
                    Primitive::String(s) => s.trim().parse().ok(),
                    _ => None,
                }
            }
            Custom(f) => f(key, value),
        }
    }
}

/// Accepted sources for a float.
#[derive(Clone)]
pub enum FloatDecodingStrategy<T> {
    /// Only a Double, and for `f32` only when it converts without loss.
    Exact,
    /// Double, Int32 or Int64, converted even when precision is lost.
    AnyNumber,
    /// Double, or a String holding a number.
    Textual,
    /// Double, then integers, then a String holding a number.
    Adaptive,
    Custom(CustomDecoder<T>),
}

impl<T> Default for FloatDecodingStrategy<T> {
    fn default() -> Self {
        FloatDecodingStrategy::Exact
    }
}

impl<T> fmt::Debug for FloatDecodingStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            FloatDecodingStrategy::Exact => "Exact",
            FloatDecodingStrategy::AnyNumber => "AnyNumber",
            FloatDecodingStrategy::Textual => "Textual",
            FloatDecodingStrategy::Adaptive => "Adaptive",
            FloatDecodingStrategy::Custom(_) => "Custom",
        })
    }
}

impl<T: DecodeFloat> FloatDecodingStrategy<T> {
    pub(crate) fn decode(&self, key: &str, value: &Primitive) -> Option<T> {
        use FloatDecodingStrategy::*;

        let exact = || value.as_f64().and_then(T::from_f64_exact);
        match self {
            Exact => exact(),
            AnyNumber => match value {
                Primitive::Double(f) => Some(T::from_f64_lossy(*f)),
                _ => value.as_integer().map(T::from_i64),
            },
            Textual => match value {
                Primitive::String(s) => s.trim().parse().ok(),
                _ => exact(),
            },
            Adaptive => {
                if let Some(f) = exact() {
                    return Some(f);
                }
                trace!(key, from = %value.type_identifier(), "adaptive float fallback");
                match value {
                    Primitive::Double(f) => Some(T::from_f64_lossy(*f)),
                    Primitive::String(s) => s.trim().parse().ok(),
                    _ => value.as_integer().map(T::from_i64),
                }
            }
            Custom(f) => f(key, value),
        }
    }
}

/// Accepted sources for a string.
#[derive(Clone)]
pub enum StringDecodingStrategy {
    /// Only a String.
    Exact,
    /// A String, or an integer written in decimal.
    Integers,
    /// A String, an integer or a Double written out.
    Numerical,
    /// Numerical sources, then booleans and object ids.
    Adaptive,
    Custom(CustomDecoder<String>),
}

impl Default for StringDecodingStrategy {
    fn default() -> Self {
        StringDecodingStrategy::Exact
    }
}

impl fmt::Debug for StringDecodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            StringDecodingStrategy::Exact => "Exact",
            StringDecodingStrategy::Integers => "Integers",
            StringDecodingStrategy::Numerical => "Numerical",
            StringDecodingStrategy::Adaptive => "Adaptive",
            StringDecodingStrategy::Custom(_) => "Custom",
        })
    }
}

fn integer_text(value: &Primitive) -> Option<String> {
    value
        .as_integer()
        .map(|n| itoa::Buffer::new().format(n).to_owned())
}

fn number_text(value: &Primitive) -> Option<String> {
    match value {
        Primitive::Double(f) if f.is_finite() => Some(ryu::Buffer::new().format(*f).to_owned()),
        _ => integer_text(value),
    }
}

impl StringDecodingStrategy {
    pub(crate) fn decode(&self, key: &str, value: &Primitive) -> Option<String> {
        use StringDecodingStrategy::*;

        if let Custom(f) = self {
            return f(key, value);
        }
        if let Primitive::String(s) = value {
            return Some(s.clone());
        }
        match self {
            Exact | Custom(_) => None,
            Integers => integer_text(value),
            Numerical => number_text(value),
            Adaptive => {
                trace!(key, from = %value.type_identifier(), "adaptive string fallback");
                number_text(value).or_else(|| match value {
                    Primitive::Bool(b) => Some(b.to_string()),
                    Primitive::ObjectId(id) => Some(id.to_hex()),
                    _ => None,
                })
            }
        }
    }
}

/// Strategies for each scalar type the decoder produces.
///
/// The default accepts any integer width with range checks and otherwise
/// wants exact types. [`strict`](DecoderSettings::strict) narrows integers
/// to their matching BSON type, [`adaptive`](DecoderSettings::adaptive)
/// tries every conversion that makes sense.
#[derive(Clone, Default)]
pub struct DecoderSettings {
    pub f32: FloatDecodingStrategy<f32>,
    pub f64: FloatDecodingStrategy<f64>,
    pub i8: IntegerDecodingStrategy<i8>,
    pub i16: IntegerDecodingStrategy<i16>,
    pub i32: IntegerDecodingStrategy<i32>,
    pub i64: IntegerDecodingStrategy<i64>,
    pub u8: IntegerDecodingStrategy<u8>,
    pub u16: IntegerDecodingStrategy<u16>,
    pub u32: IntegerDecodingStrategy<u32>,
    pub u64: IntegerDecodingStrategy<u64>,
    pub string: StringDecodingStrategy,
    /// Looks up `$key` when `key` is absent.
    pub filter_dollar_prefix: bool,
    /// Accepts a 24 character hex String where an ObjectId is expected.
    pub decode_object_id_from_string: bool,
}

macro_rules! setter_impl {
    ($($field:ident: $strategy:ty),*) => {
        $(
            pub fn $field(mut self, strategy: $strategy) -> Self {
                self.$field = strategy;
                self
            }
        )*
    };
}

impl DecoderSettings {
    pub fn strict() -> Self {
        use IntegerDecodingStrategy::Exact;
        DecoderSettings {
            i8: Exact,
            i16: Exact,
            i32: Exact,
            i64: Exact,
            u8: Exact,
            u16: Exact,
            u32: Exact,
            u64: Exact,
            ..DecoderSettings::default()
        }
    }

    pub fn adaptive() -> Self {
        use IntegerDecodingStrategy::Adaptive;
        DecoderSettings {
            f32: FloatDecodingStrategy::Adaptive,
            f64: FloatDecodingStrategy::Adaptive,
            i8: Adaptive,
            i16: Adaptive,
            i32: Adaptive,
            i64: Adaptive,
            u8: Adaptive,
            u16: Adaptive,
            u32: Adaptive,
            u64: Adaptive,
            string: StringDecodingStrategy::Adaptive,
            filter_dollar_prefix: false,
            decode_object_id_from_string: true,
        }
    }

    setter_impl! {
        f32: FloatDecodingStrategy<f32>,
        f64: FloatDecodingStrategy<f64>,
        i8: IntegerDecodingStrategy<i8>,
        i16: IntegerDecodingStrategy<i16>,
        i32: IntegerDecodingStrategy<i32>,
        i64: IntegerDecodingStrategy<i64>,
        u8: IntegerDecodingStrategy<u8>,
        u16: IntegerDecodingStrategy<u16>,
        u32: IntegerDecodingStrategy<u32>,
        u64: IntegerDecodingStrategy<u64>,
        string: StringDecodingStrategy,
        filter_dollar_prefix: bool,
        decode_object_id_from_string: bool
    }
}

impl fmt::Debug for DecoderSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DecoderSettings")
            .field("f32", &self.f32)
            .field("f64", &self.f64)
            .field("i8", &self.i8)
            .field("i16", &self.i16)
            .field("i32", &self.i32)
            .field("i64", &self.i64)
            .field("u8", &self.u8)
            .field("u16", &self.u16)
            .field("u32", &self.u32)
            .field("u64", &self.u64)
            .field("string", &self.string)
            .field("filter_dollar_prefix", &self.filter_dollar_prefix)
            .field(
                "decode_object_id_from_string",
                &self.decode_object_id_from_string,
            )
            .finish()
    }
}

/// How unsigned integers wider than 16 bits are written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnsignedEncodingStrategy {
    /// Int64, failing above `i64::MAX`.
    Int64,
    /// Decimal String.
    String,
}

/// How absent optional values are written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoneEncodingStrategy {
    /// The field is left out.
    Omit,
    /// The field is written as Null.
    Null,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncoderSettings {
    pub unsigned: UnsignedEncodingStrategy,
    pub none: NoneEncodingStrategy,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings {
            unsigned: UnsignedEncodingStrategy::Int64,
            none: NoneEncodingStrategy::Omit,
        }
    }
}

impl EncoderSettings {
    pub fn unsigned(mut self, strategy: UnsignedEncodingStrategy) -> Self {
        self.unsigned = strategy;
        self
    }

    pub fn none(mut self, strategy: NoneEncodingStrategy) -> Self {
        self.none = strategy;
        self
    }
}
