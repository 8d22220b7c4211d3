use crate::Value;

pub(crate) fn s(text: &str) -> Value {
    Value::Str(text.to_owned())
}

/// Builds a [`crate::Map`] from `key => value` pairs, in order.
macro_rules! qmap {
    ($($key:expr => $value:expr),* $(,)?) => {
        crate::Map::from_iter([$((String::from($key), $value)),*])
    };
}

/// Builds a [`crate::Value::Map`] from `key => value` pairs, in order.
macro_rules! vmap {
    ($($key:expr => $value:expr),* $(,)?) => {
        crate::Value::Map(crate::tests::utils::qmap!($($key => $value),*))
    };
}

/// Builds a [`crate::Value::List`] from its elements.
macro_rules! vlist {
    ($($value:expr),* $(,)?) => {
        crate::Value::List(vec![$($value),*])
    };
}

pub(crate) use {qmap, vlist, vmap};
