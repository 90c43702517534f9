use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::document::Document;
use crate::error::Result;
use crate::oid::ObjectId;
use crate::primitive::*;
use crate::ser::{Done, Serialize, Visitor};

impl Serialize for () {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.null()
    }
}

impl Serialize for bool {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.boolean(*self)
    }
}

impl Serialize for str {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.string(self)
    }
}

impl Serialize for String {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.string(self)
    }
}

macro_rules! number {
    ($($ty:ident => $method:ident,)*) => {
        $(
            impl Serialize for $ty {
                #[inline]
                fn begin(&self, v: Visitor) -> Result<Done> {
                    v.$method(*self)
                }
            }
        )*
    };
}

number! {
    i8 => sbyte,
    i16 => short,
    i32 => int,
    i64 => long,
    u8 => byte,
    u16 => ushort,
    u32 => uint,
    u64 => ulong,
    f32 => single,
    f64 => double,
}

impl Serialize for Primitive {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.primitive(self)
    }
}

impl Serialize for Document {
    fn begin(&self, v: Visitor) -> Result<Done> {
        v.primitive(&Primitive::Document(self.clone()))
    }
}

macro_rules! variant {
    ($($ty:ident,)*) => {
        $(
            impl Serialize for $ty {
                fn begin(&self, v: Visitor) -> Result<Done> {
                    v.primitive(&Primitive::$ty(self.clone()))
                }
            }
        )*
    };
}

variant! {
    ObjectId,
    Binary,
    DateTime,
    RegularExpression,
    JavaScriptCode,
    JavaScriptCodeWithScope,
    Timestamp,
    Decimal128,
}

impl<'a, T: ?Sized + Serialize> Serialize for &'a T {
    fn begin(&self, v: Visitor) -> Result<Done> {
        (**self).begin(v)
    }
}

impl<T: ?Sized + Serialize> Serialize for Box<T> {
    fn begin(&self, v: Visitor) -> Result<Done> {
        (**self).begin(v)
    }
}

impl<T: Serialize> Serialize for Option<T> {
    fn begin(&self, v: Visitor) -> Result<Done> {
        match self {
            Some(some) => some.begin(v),
            None => v.none(),
        }
    }
}

impl<'a, T: ?Sized + ToOwned + Serialize> Serialize for Cow<'a, T> {
    fn begin(&self, v: Visitor) -> Result<Done> {
        (**self).begin(v)
    }
}

macro_rules! tuple {
    ($(<$($n:ident $i:tt),*>),*) => { $(
        impl<$($n: Serialize,)*> Serialize for ($($n,)*) {
            fn begin(&self, v: Visitor) -> Result<Done> {
                v.seq()?
                    $(.element(&self.$i)?)*
                    .done()
            }
        }
    )*
    };
}

tuple!(
    <A 0, B 1>,
    <A 0, B 1, C 2>,
    <A 0, B 1, C 2, D 3>,
    <A 0, B 1, C 2, D 3, E 4>,
    <A 0, B 1, C 2, D 3, E 4, F 5>,
    <A 0, B 1, C 2, D 3, E 4, F 5, G 6>,
    <A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7>
);

impl<T: Serialize> Serialize for [T] {
    fn begin(&self, v: Visitor) -> Result<Done> {
        let mut seq = v.seq()?;
        for e in self {
            seq = seq.element(e)?;
        }
        seq.done()
    }
}

impl<T: Serialize> Serialize for Vec<T> {
    fn begin(&self, v: Visitor) -> Result<Done> {
        self.as_slice().begin(v)
    }
}

impl<K, V, H> Serialize for HashMap<K, V, H>
where
    K: Hash + Eq + ToString,
    V: Serialize,
    H: BuildHasher,
{
    fn begin(&self, v: Visitor) -> Result<Done> {
        let mut map = v.map()?;
        for (k, e) in self {
            map = map.field(&k.to_string(), e)?;
        }
        map.done()
    }
}

impl<K: ToString, V: Serialize> Serialize for BTreeMap<K, V> {
    fn begin(&self, v: Visitor) -> Result<Done> {
        let mut map = v.map()?;
        for (k, e) in self {
            map = map.field(&k.to_string(), e)?;
        }
        map.done()
    }
}
