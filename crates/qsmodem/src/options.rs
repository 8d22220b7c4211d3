#![allow(clippy::struct_excessive_bools)]

//! Configuration records for the decoder and encoder.
//!
//! Both records are plain structs with public fields and a [`Default`] impl;
//! cross-field invariants are checked by `validate`, which every
//! [`decode`](crate::decode)/[`encode`](crate::encode) call runs before doing
//! any work. Records are immutable in spirit: construct one per
//! configuration and share it freely, including across threads.

use std::{cmp::Ordering, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{
    error::{DecodeError, EncodeError},
    value::Value,
};

/// Character set used to interpret percent escapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8, the web default.
    #[default]
    Utf8,
    /// ISO-8859-1, with `&#N;` numeric entities for anything above `0xFF`.
    Latin1,
}

/// Percent-encoding flavor.
///
/// Encoding itself is identical; RFC 1738 additionally leaves `(` and `)`
/// unescaped and renders spaces as `+` instead of `%20`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Rfc3986,
    Rfc1738,
}

impl Format {
    /// Applies the format's space policy to an already percent-encoded
    /// fragment.
    #[must_use]
    pub fn format_fragment(self, fragment: String) -> String {
        match self {
            Self::Rfc3986 => fragment,
            Self::Rfc1738 => fragment.replace("%20", "+"),
        }
    }
}

/// Strategy for serializing sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// `a[0]=b&a[1]=c`
    #[default]
    Indices,
    /// `a[]=b&a[]=c`
    Brackets,
    /// `a=b&a=c`
    Repeat,
    /// `a=b,c`
    Comma,
}

/// Policy for reconciling repeated keys during decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Duplicates {
    /// Collect repeated values into a list.
    #[default]
    Combine,
    /// Keep the first value seen.
    First,
    /// Keep the last value seen.
    Last,
}

/// Whether a custom decoder or encoder is being handed a key or a value.
///
/// The built-in codec treats both identically; user-supplied callables may
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Key,
    Value,
}

/// Pair delimiter for the decoder: a literal string or a regex.
#[derive(Debug, Clone)]
pub enum Delimiter {
    Literal(String),
    Pattern(Regex),
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::Literal("&".to_owned())
    }
}

impl From<&str> for Delimiter {
    fn from(v: &str) -> Self {
        Self::Literal(v.to_owned())
    }
}

impl From<Regex> for Delimiter {
    fn from(v: Regex) -> Self {
        Self::Pattern(v)
    }
}

impl Delimiter {
    /// Splits `input`, keeping empty fragments, truncated to `limit` parts.
    pub(crate) fn split<'a>(&self, input: &'a str, limit: usize) -> Vec<&'a str> {
        match self {
            Self::Literal(sep) => input.split(sep.as_str()).take(limit).collect(),
            Self::Pattern(re) => re.split(input).take(limit).collect(),
        }
    }

    /// Number of fragments `input` splits into, without collecting them.
    pub(crate) fn count(&self, input: &str) -> usize {
        match self {
            Self::Literal(sep) => input.split(sep.as_str()).count(),
            Self::Pattern(re) => re.split(input).count(),
        }
    }
}

/// Custom scalar decoder: receives the raw (still percent-encoded) token,
/// the negotiated charset, and whether the token is a key or a value.
pub type DecoderFn = dyn Fn(&str, Charset, ComponentKind) -> Value + Send + Sync;

/// Older decoder shape without the [`ComponentKind`] discriminator.
pub type LegacyDecoderFn = dyn Fn(&str, Charset) -> Value + Send + Sync;

/// Custom scalar encoder: receives the scalar (or the key, as a
/// [`Value::Str`]) and must return its percent-encoded form.
pub type EncoderFn = dyn Fn(&Value, Charset, ComponentKind, Format) -> String + Send + Sync;

/// Custom timestamp serializer used before scalar encoding.
pub type DateSerializerFn = dyn Fn(&DateTime<Utc>) -> String + Send + Sync;

/// Key comparator, applied at every level of the encoder's traversal before
/// it descends.
pub type SortFn = dyn Fn(&str, &str) -> Ordering + Send + Sync;

/// Value filter: receives `(prefix, value)` and returns the value to
/// serialize in its place.
pub type FilterFn = dyn Fn(&str, &Value) -> Value + Send + Sync;

/// One entry of a key-list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKey {
    Key(String),
    Index(usize),
}

impl From<&str> for FilterKey {
    fn from(v: &str) -> Self {
        Self::Key(v.to_owned())
    }
}

impl From<usize> for FilterKey {
    fn from(v: usize) -> Self {
        Self::Index(v)
    }
}

impl FilterKey {
    pub(crate) fn as_text(&self) -> String {
        match self {
            Self::Key(k) => k.clone(),
            Self::Index(i) => i.to_string(),
        }
    }
}

/// Encoder filter: a callable substituting values, or a list selecting keys
/// (and, for sequences, indices).
#[derive(Clone)]
pub enum Filter {
    Function(Arc<FilterFn>),
    Keys(Vec<FilterKey>),
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Filter::Function(..)"),
            Self::Keys(keys) => f.debug_tuple("Filter::Keys").field(keys).finish(),
        }
    }
}

/// Configuration for [`decode`](crate::decode).
///
/// # Examples
///
/// ```
/// use qsmodem::DecodeOptions;
///
/// let options = DecodeOptions {
///     depth: 10,
///     comma: true,
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct DecodeOptions {
    /// Pair delimiter.
    ///
    /// # Default
    ///
    /// `&`
    pub delimiter: Delimiter,

    /// Maximum number of bracketed child segments interpreted per key; any
    /// remainder collapses into one literal trailing segment (or errors,
    /// under [`strict_depth`]).
    ///
    /// # Default
    ///
    /// `5`
    ///
    /// [`strict_depth`]: DecodeOptions::strict_depth
    pub depth: usize,

    /// Largest explicit index still decoded as a sequence position; anything
    /// above it demotes the sequence to a mapping keyed by index strings.
    ///
    /// # Default
    ///
    /// `20`
    pub list_limit: isize,

    /// Maximum number of pairs processed per call. Excess pairs are silently
    /// dropped unless [`raise_on_limit_exceeded`] is set.
    ///
    /// # Default
    ///
    /// `1000`
    ///
    /// [`raise_on_limit_exceeded`]: DecodeOptions::raise_on_limit_exceeded
    pub parameter_limit: usize,

    /// Whether `[]` and `[N]` segments build sequences at all.
    ///
    /// # Default
    ///
    /// `true`
    pub parse_lists: bool,

    /// Whether top-level `a.b` keys are treated as `a[b]`.
    ///
    /// `None` means unset: it becomes `true` when [`decode_dot_in_keys`] is
    /// set and `false` otherwise. Explicitly setting `Some(false)` together
    /// with [`decode_dot_in_keys`] is a validation error.
    ///
    /// # Default
    ///
    /// `None`
    ///
    /// [`decode_dot_in_keys`]: DecodeOptions::decode_dot_in_keys
    pub allow_dots: Option<bool>,

    /// Whether percent-encoded dots (`%2E`) inside key segments are
    /// normalized back to literal dots after splitting.
    ///
    /// # Default
    ///
    /// `false`
    pub decode_dot_in_keys: bool,

    /// Whether `a[]=` decodes to an empty sequence instead of `[""]`.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_empty_lists: bool,

    /// Charset used by the built-in decoder.
    ///
    /// # Default
    ///
    /// [`Charset::Utf8`]
    pub charset: Charset,

    /// Whether to honor a leading `utf8=<checkmark>` pair as a charset
    /// override (the pair itself is removed from the output).
    ///
    /// # Default
    ///
    /// `false`
    pub charset_sentinel: bool,

    /// Whether `&#N;` substrings in decoded Latin-1 values are replaced by
    /// the code point `N`.
    ///
    /// # Default
    ///
    /// `false`
    pub interpret_numeric_entities: bool,

    /// Whether a comma inside a value splits it into a list of strings.
    ///
    /// # Default
    ///
    /// `false`
    pub comma: bool,

    /// Policy for repeated keys.
    ///
    /// # Default
    ///
    /// [`Duplicates::Combine`]
    pub duplicates: Duplicates,

    /// Whether a pair without `=` decodes to [`Value::Null`] rather than an
    /// empty string.
    ///
    /// # Default
    ///
    /// `false`
    pub strict_null_handling: bool,

    /// Whether well-formed bracket groups beyond [`depth`] are an error
    /// instead of collapsing into a literal trailing segment.
    ///
    /// # Default
    ///
    /// `false`
    ///
    /// [`depth`]: DecodeOptions::depth
    pub strict_depth: bool,

    /// Whether exceeding [`parameter_limit`] or [`list_limit`] fails the call
    /// instead of truncating.
    ///
    /// # Default
    ///
    /// `false`
    ///
    /// [`parameter_limit`]: DecodeOptions::parameter_limit
    /// [`list_limit`]: DecodeOptions::list_limit
    pub raise_on_limit_exceeded: bool,

    /// Whether a leading `?` is stripped from the input.
    ///
    /// # Default
    ///
    /// `false`
    pub ignore_query_prefix: bool,

    /// Custom scalar decoder. Takes precedence over [`legacy_decoder`] and
    /// the built-in decoder.
    ///
    /// [`legacy_decoder`]: DecodeOptions::legacy_decoder
    pub decoder: Option<Arc<DecoderFn>>,

    /// Custom scalar decoder without the key/value discriminator, consulted
    /// when [`decoder`] is unset.
    ///
    /// [`decoder`]: DecodeOptions::decoder
    pub legacy_decoder: Option<Arc<LegacyDecoderFn>>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            depth: 5,
            list_limit: 20,
            parameter_limit: 1000,
            parse_lists: true,
            allow_dots: None,
            decode_dot_in_keys: false,
            allow_empty_lists: false,
            charset: Charset::Utf8,
            charset_sentinel: false,
            interpret_numeric_entities: false,
            comma: false,
            duplicates: Duplicates::Combine,
            strict_null_handling: false,
            strict_depth: false,
            raise_on_limit_exceeded: false,
            ignore_query_prefix: false,
            decoder: None,
            legacy_decoder: None,
        }
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("delimiter", &self.delimiter)
            .field("depth", &self.depth)
            .field("list_limit", &self.list_limit)
            .field("parameter_limit", &self.parameter_limit)
            .field("parse_lists", &self.parse_lists)
            .field("allow_dots", &self.allow_dots)
            .field("decode_dot_in_keys", &self.decode_dot_in_keys)
            .field("allow_empty_lists", &self.allow_empty_lists)
            .field("charset", &self.charset)
            .field("charset_sentinel", &self.charset_sentinel)
            .field(
                "interpret_numeric_entities",
                &self.interpret_numeric_entities,
            )
            .field("comma", &self.comma)
            .field("duplicates", &self.duplicates)
            .field("strict_null_handling", &self.strict_null_handling)
            .field("strict_depth", &self.strict_depth)
            .field("raise_on_limit_exceeded", &self.raise_on_limit_exceeded)
            .field("ignore_query_prefix", &self.ignore_query_prefix)
            .field("decoder", &self.decoder.as_ref().map(|_| ".."))
            .field("legacy_decoder", &self.legacy_decoder.as_ref().map(|_| ".."))
            .finish()
    }
}

impl DecodeOptions {
    /// Effective dot-notation setting: an unset [`allow_dots`] follows
    /// [`decode_dot_in_keys`].
    ///
    /// [`allow_dots`]: DecodeOptions::allow_dots
    /// [`decode_dot_in_keys`]: DecodeOptions::decode_dot_in_keys
    #[must_use]
    pub fn allow_dots(&self) -> bool {
        self.allow_dots.unwrap_or(self.decode_dot_in_keys)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// [`DecodeError::DotInKeysRequiresAllowDots`] when
    /// [`decode_dot_in_keys`] is set while [`allow_dots`] is explicitly
    /// `false`.
    ///
    /// [`decode_dot_in_keys`]: DecodeOptions::decode_dot_in_keys
    /// [`allow_dots`]: DecodeOptions::allow_dots
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.decode_dot_in_keys && self.allow_dots == Some(false) {
            return Err(DecodeError::DotInKeysRequiresAllowDots);
        }
        Ok(())
    }
}

/// Configuration for [`encode`](crate::encode).
///
/// # Examples
///
/// ```
/// use qsmodem::{EncodeOptions, ListFormat};
///
/// let options = EncodeOptions {
///     encode: false,
///     list_format: Some(ListFormat::Brackets),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct EncodeOptions {
    /// Pair delimiter placed between fragments.
    ///
    /// # Default
    ///
    /// `&`
    pub delimiter: String,

    /// Whether keys and values are percent-encoded at all.
    ///
    /// # Default
    ///
    /// `true`
    pub encode: bool,

    /// Whether only values are percent-encoded, leaving keys literal.
    ///
    /// # Default
    ///
    /// `false`
    pub encode_values_only: bool,

    /// Whether literal dots inside key segments are escaped to `%2E` (and so
    /// to `%252E` once the key itself is percent-encoded).
    ///
    /// # Default
    ///
    /// `false`
    pub encode_dot_in_keys: bool,

    /// Whether nested keys join with `.` instead of brackets.
    ///
    /// `None` means unset: it follows [`encode_dot_in_keys`]. Explicitly
    /// setting `Some(false)` together with [`encode_dot_in_keys`] is a
    /// validation error.
    ///
    /// # Default
    ///
    /// `None`
    ///
    /// [`encode_dot_in_keys`]: EncodeOptions::encode_dot_in_keys
    pub allow_dots: Option<bool>,

    /// Legacy shorthand predating [`list_format`]: `Some(false)` selects
    /// [`ListFormat::Repeat`]. Ignored when [`list_format`] is set.
    ///
    /// # Default
    ///
    /// `None`
    ///
    /// [`list_format`]: EncodeOptions::list_format
    pub indices: Option<bool>,

    /// Sequence serialization strategy.
    ///
    /// # Default
    ///
    /// `None`, meaning [`ListFormat::Indices`] (or [`ListFormat::Repeat`]
    /// via the [`indices`] shorthand).
    ///
    /// [`indices`]: EncodeOptions::indices
    pub list_format: Option<ListFormat>,

    /// Whether a single-element sequence in [`ListFormat::Comma`] mode emits
    /// `prefix[]=` so it round-trips back to a sequence.
    ///
    /// # Default
    ///
    /// `false`
    pub comma_round_trip: bool,

    /// Whether null elements are omitted from a comma join instead of
    /// rendering as empty strings.
    ///
    /// # Default
    ///
    /// `false`
    pub comma_compact_nulls: bool,

    /// Whether an empty sequence emits `prefix[]` instead of nothing.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_empty_lists: bool,

    /// Whether the output starts with `?`.
    ///
    /// # Default
    ///
    /// `false`
    pub add_query_prefix: bool,

    /// Whether null values are omitted entirely.
    ///
    /// # Default
    ///
    /// `false`
    pub skip_nulls: bool,

    /// Whether null values emit a bare key (no `=`), distinguishable from
    /// empty strings.
    ///
    /// # Default
    ///
    /// `false`
    pub strict_null_handling: bool,

    /// Charset used by the built-in encoder.
    ///
    /// # Default
    ///
    /// [`Charset::Utf8`]
    pub charset: Charset,

    /// Whether a `utf8=<checkmark>` pair announcing [`charset`] is
    /// prepended.
    ///
    /// # Default
    ///
    /// `false`
    ///
    /// [`charset`]: EncodeOptions::charset
    pub charset_sentinel: bool,

    /// Percent-encoding flavor.
    ///
    /// # Default
    ///
    /// [`Format::Rfc3986`]
    pub format: Format,

    /// Custom timestamp serializer; the default is ISO 8601 with
    /// milliseconds.
    pub serialize_date: Option<Arc<DateSerializerFn>>,

    /// Custom scalar encoder, replacing the built-in percent encoder.
    pub encoder: Option<Arc<EncoderFn>>,

    /// Key comparator, applied at every level before descending.
    pub sort: Option<Arc<SortFn>>,

    /// Value filter or key selection list.
    pub filter: Option<Filter>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            delimiter: "&".to_owned(),
            encode: true,
            encode_values_only: false,
            encode_dot_in_keys: false,
            allow_dots: None,
            indices: None,
            list_format: None,
            comma_round_trip: false,
            comma_compact_nulls: false,
            allow_empty_lists: false,
            add_query_prefix: false,
            skip_nulls: false,
            strict_null_handling: false,
            charset: Charset::Utf8,
            charset_sentinel: false,
            format: Format::Rfc3986,
            serialize_date: None,
            encoder: None,
            sort: None,
            filter: None,
        }
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("delimiter", &self.delimiter)
            .field("encode", &self.encode)
            .field("encode_values_only", &self.encode_values_only)
            .field("encode_dot_in_keys", &self.encode_dot_in_keys)
            .field("allow_dots", &self.allow_dots)
            .field("indices", &self.indices)
            .field("list_format", &self.list_format)
            .field("comma_round_trip", &self.comma_round_trip)
            .field("comma_compact_nulls", &self.comma_compact_nulls)
            .field("allow_empty_lists", &self.allow_empty_lists)
            .field("add_query_prefix", &self.add_query_prefix)
            .field("skip_nulls", &self.skip_nulls)
            .field("strict_null_handling", &self.strict_null_handling)
            .field("charset", &self.charset)
            .field("charset_sentinel", &self.charset_sentinel)
            .field("format", &self.format)
            .field("serialize_date", &self.serialize_date.as_ref().map(|_| ".."))
            .field("encoder", &self.encoder.as_ref().map(|_| ".."))
            .field("sort", &self.sort.as_ref().map(|_| ".."))
            .field("filter", &self.filter)
            .finish()
    }
}

impl EncodeOptions {
    /// Effective dot-notation setting: an unset [`allow_dots`] follows
    /// [`encode_dot_in_keys`].
    ///
    /// [`allow_dots`]: EncodeOptions::allow_dots
    /// [`encode_dot_in_keys`]: EncodeOptions::encode_dot_in_keys
    #[must_use]
    pub fn allow_dots(&self) -> bool {
        self.allow_dots.unwrap_or(self.encode_dot_in_keys)
    }

    /// Effective sequence strategy, resolving the [`indices`] shorthand.
    ///
    /// [`indices`]: EncodeOptions::indices
    #[must_use]
    pub fn list_format(&self) -> ListFormat {
        self.list_format.unwrap_or(match self.indices {
            Some(false) => ListFormat::Repeat,
            _ => ListFormat::Indices,
        })
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// [`EncodeError::DotInKeysRequiresAllowDots`] when
    /// [`encode_dot_in_keys`] is set while [`allow_dots`] is explicitly
    /// `false`.
    ///
    /// [`encode_dot_in_keys`]: EncodeOptions::encode_dot_in_keys
    /// [`allow_dots`]: EncodeOptions::allow_dots
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.encode_dot_in_keys && self.allow_dots == Some(false) {
            return Err(EncodeError::DotInKeysRequiresAllowDots);
        }
        Ok(())
    }
}
