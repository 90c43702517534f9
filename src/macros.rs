/// Builds a [`Document`](crate::Document) from `key: value` pairs.
///
/// Values go through `Into<Primitive>`, so nested `doc!` and `array!`
/// calls compose.
///
/// ```rust
/// use bsondoc::{array, doc};
///
/// let doc = doc! {
///     "name": "bsondoc",
///     "tags": array!["binary", "json"],
///     "meta": doc! { "stars": 3 },
/// };
/// assert_eq!(doc.len(), 3);
/// ```
///
/// # Panics
///
/// When a key or a regular expression holds a NUL byte.
#[macro_export]
macro_rules! doc {
    () => {
        $crate::Document::new()
    };
    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut doc = $crate::Document::new();
        $(
            if let $crate::export::Err(err) = doc.insert($key, $value) {
                panic!("doc!: {}", err);
            }
        )+
        doc
    }};
}

/// Builds an array [`Document`](crate::Document).
///
/// ```rust
/// use bsondoc::array;
///
/// let list = array![1, "two", 3.0];
/// assert!(list.is_array());
/// assert_eq!(list.keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);
/// ```
#[macro_export]
macro_rules! array {
    () => {
        $crate::Document::new_array()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut list = $crate::Document::new_array();
        $(
            if let $crate::export::Err(err) = list.push($value) {
                panic!("array!: {}", err);
            }
        )+
        list
    }};
}

#[cfg(test)]
mod tests {
    use crate::Primitive;

    #[test]
    fn hello_world_bytes() {
        let doc = doc! { "hello": "world" };
        assert_eq!(
            doc.as_bytes(),
            &[
                0x16, 0, 0, 0, 0x02, b'h', b'e', b'l', b'l', b'o', 0, 0x06, 0, 0, 0, b'w', b'o',
                b'r', b'l', b'd', 0, 0
            ][..]
        );
    }

    #[test]
    fn shapes() {
        assert!(array!["a", "b", "c"].is_array());
        assert!(!doc! { "x": 1 }.is_array());
        assert_eq!(
            doc! { "list": array![1] }.get("list").map(|p| p.type_identifier()),
            Some(crate::TypeIdentifier::Array)
        );
        assert_eq!(array![].len(), 0);
        assert_eq!(doc! { "n": Primitive::Null }.get("n"), Some(Primitive::Null));
    }
}
