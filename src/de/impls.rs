use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;

use crate::de::{Deserialize, Deserializer, MapAccess, SeqAccess};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::oid::ObjectId;
use crate::primitive::*;

impl Deserialize for () {
    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        d.deserialize_primitive_as("null", |p| match p {
            Primitive::Null => Some(()),
            _ => None,
        })
    }
}

macro_rules! scalar {
    ($($ty:ty => $method:ident,)*) => {
        $(
            impl Deserialize for $ty {
                #[inline]
                fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
                    d.$method()
                }
            }
        )*
    };
}

scalar! {
    bool => deserialize_bool,
    i8 => deserialize_i8,
    i16 => deserialize_i16,
    i32 => deserialize_i32,
    i64 => deserialize_i64,
    u8 => deserialize_u8,
    u16 => deserialize_u16,
    u32 => deserialize_u32,
    u64 => deserialize_u64,
    f32 => deserialize_f32,
    f64 => deserialize_f64,
    String => deserialize_string,
    ObjectId => deserialize_object_id,
    Primitive => deserialize_primitive,
}

macro_rules! variant {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl Deserialize for $ty {
                fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
                    d.deserialize_primitive_as($name, |p| match p {
                        Primitive::$variant(v) => Some(v),
                        _ => None,
                    })
                }
            }
        )*
    };
}

variant! {
    Document => Document, "document";
    Binary => Binary, "binary";
    DateTime => DateTime, "dateTime";
    RegularExpression => RegularExpression, "regularExpression";
    JavaScriptCode => JavaScriptCode, "javaScriptCode";
    JavaScriptCodeWithScope => JavaScriptCodeWithScope, "javaScriptCodeWithScope";
    Timestamp => Timestamp, "timestamp";
    Decimal128 => Decimal128, "decimal128";
}

impl<T: Deserialize> Deserialize for Box<T> {
    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        T::deserialize(d).map(Box::new)
    }
}

impl<T: Deserialize> Deserialize for Option<T> {
    #[inline]
    fn default() -> Option<Self> {
        Some(None)
    }

    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        d.deserialize_option()
    }
}

macro_rules! tuple {
    ($(<$($n:ident $i:literal),*>),*) => { $(
        impl<$($n: Deserialize,)*> Deserialize for ($($n,)*) {
            fn deserialize<__D: Deserializer>(d: __D) -> Result<Self> {
                let mut s = d.deserialize_seq()?;
                Ok((
                    $(s.next_element::<$n>()?.ok_or(Error::missing_element($i))?,)*
                ))
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

impl<T: Deserialize> Deserialize for Vec<T> {
    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        let mut s = d.deserialize_seq()?;
        let mut vec = Vec::with_capacity(s.size_hint().unwrap_or(0));
        while let Some(element) = s.next_element()? {
            vec.push(element);
        }
        Ok(vec)
    }
}

impl<K, V, H> Deserialize for HashMap<K, V, H>
where
    K: FromStr + Hash + Eq,
    V: Deserialize,
    H: BuildHasher + Default,
{
    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        let mut m = d.deserialize_map()?;
        let mut hashmap = HashMap::with_hasher(H::default());
        while let Some((k, v)) = m.next_entry()? {
            let k = K::from_str(&k).map_err(|_| Error::invalid_map_key(&k))?;
            hashmap.insert(k, v);
        }
        Ok(hashmap)
    }
}

impl<K: FromStr + Ord, V: Deserialize> Deserialize for BTreeMap<K, V> {
    fn deserialize<D: Deserializer>(d: D) -> Result<Self> {
        let mut m = d.deserialize_map()?;
        let mut btree = BTreeMap::new();
        while let Some((k, v)) = m.next_entry()? {
            let k = K::from_str(&k).map_err(|_| Error::invalid_map_key(&k))?;
            btree.insert(k, v);
        }
        Ok(btree)
    }
}
