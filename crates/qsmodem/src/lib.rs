//! A bidirectional codec for `application/x-www-form-urlencoded` query
//! strings with nested structures, wire-compatible with the JavaScript `qs`
//! library.
//!
//! [`decode`] parses bracket/dot notation (`foo[bar][0]=baz`, `foo.bar=baz`)
//! into nested [`Map`]s and [`List`]s; [`encode`] serializes a [`Value`]
//! tree back, with selectable list formats, charsets, and percent-encoding
//! flavors.
//!
//! ```
//! use qsmodem::{DecodeOptions, EncodeOptions, Value, decode, encode};
//!
//! let decoded = decode("a[b]=c", &DecodeOptions::default()).unwrap();
//! let encoded = encode(&Value::Map(decoded), &EncodeOptions::default()).unwrap();
//! assert_eq!(encoded, "a%5Bb%5D=c");
//! ```

mod decode;
mod encode;
mod error;
mod key_path;
mod merge;
mod options;
mod percent;
mod side_channel;
mod value;

#[cfg(test)]
mod tests;

pub use decode::{DecodeInput, decode, load, loads};
pub use encode::{dump, dumps, encode};
pub use error::{DecodeError, EncodeError};
pub use options::{
    Charset, ComponentKind, DateSerializerFn, DecodeOptions, DecoderFn, Delimiter, Duplicates,
    EncodeOptions, EncoderFn, Filter, FilterFn, FilterKey, Format, LegacyDecoderFn, ListFormat,
    SortFn,
};
pub use value::{List, Map, Value};
