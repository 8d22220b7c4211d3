//! The encoder pipeline.
//!
//! Serialization is a recursive descent over the value tree. Each frame
//! carries the accumulated key prefix; containers extend it per the list
//! format (or dot notation) and recurse, scalars emit one `key=value`
//! fragment, and the fragments join on the pair delimiter at the end. Keys
//! are visited in observed order, reordered at every level by the `sort`
//! comparator before descending. A call-local
//! [`SideChannel`](crate::side_channel) tracks the containers on the current
//! descent path so a repeated identity fails fast instead of recursing
//! forever.

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    error::EncodeError,
    options::{Charset, ComponentKind, EncodeOptions, Filter, FilterKey, ListFormat},
    percent,
    side_channel::SideChannel,
    value::Value,
};

const UNDEFINED: Value = Value::Undefined;

/// Encodes a value into a query string.
///
/// A root that is not a mapping or sequence produces an empty string.
///
/// # Examples
///
/// ```
/// use qsmodem::{EncodeOptions, Map, Value, encode};
///
/// let mut map = Map::new();
/// map.insert("a".to_string(), Value::Str("b c".into()));
/// assert_eq!(encode(&Value::Map(map), &EncodeOptions::default()).unwrap(), "a=b%20c");
/// ```
///
/// # Errors
///
/// [`EncodeError::CircularReference`] when a container repeats along one
/// descent path, and a validation error for inconsistent options.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<String, EncodeError> {
    options.validate()?;
    let serializer = Serializer {
        options,
        list_format: options.list_format(),
        comma_round_trip: options.list_format() == ListFormat::Comma && options.comma_round_trip,
        allow_dots: options.allow_dots(),
    };

    let mut root = Cow::Borrowed(value);
    let mut keys = None;
    match &options.filter {
        Some(Filter::Function(filter)) => {
            let substituted = filter("", root.as_ref());
            root = Cow::Owned(substituted);
        }
        Some(Filter::Keys(list)) => keys = Some(list.iter().map(FilterKey::as_text).collect()),
        None => {}
    }

    if !root.is_container() {
        return Ok(String::new());
    }

    let mut keys: Vec<String> = keys.unwrap_or_else(|| child_keys(root.as_ref()));
    if let Some(sort) = &options.sort {
        keys.sort_by(|a, b| sort(a, b));
    }

    let mut fragments = Vec::new();
    let mut channel = SideChannel::new();
    for key in &keys {
        let child = lookup(root.as_ref(), key);
        if options.skip_nulls && child.is_some_and(Value::is_null) {
            continue;
        }
        serializer.step(
            child.unwrap_or(&UNDEFINED),
            key,
            options.encode,
            &mut channel,
            &mut fragments,
        )?;
    }

    let mut out = String::new();
    if options.add_query_prefix {
        out.push('?');
    }
    if options.charset_sentinel {
        out.push_str(match options.charset {
            Charset::Utf8 => "utf8=%E2%9C%93",
            Charset::Latin1 => "utf8=%26%2310003%3B",
        });
        out.push_str(&options.delimiter);
    }
    out.push_str(&fragments.join(&options.delimiter));
    Ok(out)
}

/// Alias for [`encode`].
///
/// # Errors
///
/// See [`encode`].
pub fn dumps(value: &Value, options: &EncodeOptions) -> Result<String, EncodeError> {
    encode(value, options)
}

/// Alias for [`encode`].
///
/// # Errors
///
/// See [`encode`].
pub fn dump(value: &Value, options: &EncodeOptions) -> Result<String, EncodeError> {
    encode(value, options)
}

fn child_keys(container: &Value) -> Vec<String> {
    match container {
        Value::Map(map) => map.keys().cloned().collect(),
        Value::List(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn lookup<'v>(container: &'v Value, key: &str) -> Option<&'v Value> {
    match container {
        Value::Map(map) => map.get(key),
        Value::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

struct Serializer<'o> {
    options: &'o EncodeOptions,
    list_format: ListFormat,
    comma_round_trip: bool,
    allow_dots: bool,
}

impl Serializer<'_> {
    fn step(
        &self,
        value: &Value,
        prefix: &str,
        encode: bool,
        channel: &mut SideChannel,
        out: &mut Vec<String>,
    ) -> Result<(), EncodeError> {
        let options = self.options;
        let mut current = Cow::Borrowed(value);

        // Substitution: the filter callable, or default date serialization.
        if let Some(Filter::Function(filter)) = &options.filter {
            let substituted = filter(prefix, current.as_ref());
            current = Cow::Owned(substituted);
        } else if let Value::DateTime(dt) = current.as_ref() {
            current = Cow::Owned(Value::Str(self.serialize_date(dt)));
        } else if self.list_format == ListFormat::Comma {
            if let Value::List(items) = current.as_ref() {
                if items.iter().any(|v| matches!(v, Value::DateTime(..))) {
                    let mapped = items
                        .iter()
                        .map(|v| match v {
                            Value::DateTime(dt) => Value::Str(self.serialize_date(dt)),
                            other => other.clone(),
                        })
                        .collect();
                    current = Cow::Owned(Value::List(mapped));
                }
            }
        }

        if current.is_null() {
            if options.strict_null_handling {
                // A bare key, not run through the space formatter.
                out.push(if encode && !options.encode_values_only {
                    self.encode_component(&Value::Str(prefix.to_owned()), ComponentKind::Key)
                } else {
                    prefix.to_owned()
                });
                return Ok(());
            }
            current = Cow::Owned(Value::Str(String::new()));
        }

        if !current.is_undefined() && !current.is_container() {
            let fragment = if encode {
                let key = if options.encode_values_only {
                    prefix.to_owned()
                } else {
                    self.encode_component(&Value::Str(prefix.to_owned()), ComponentKind::Key)
                };
                let value = self.encode_component(current.as_ref(), ComponentKind::Value);
                format!(
                    "{}={}",
                    options.format.format_fragment(key),
                    options.format.format_fragment(value)
                )
            } else {
                let text = current.scalar_text();
                format!(
                    "{}={}",
                    options
                        .format
                        .format_fragment(prefix.to_owned()),
                    options
                        .format
                        .format_fragment(text.as_deref().unwrap_or("").to_owned())
                )
            };
            out.push(fragment);
            return Ok(());
        }

        if current.is_undefined() {
            return Ok(());
        }

        let encoded_prefix = if options.encode_dot_in_keys {
            prefix.replace('.', "%2E")
        } else {
            prefix.to_owned()
        };
        let list = match current.as_ref() {
            Value::List(items) => Some(items),
            _ => None,
        };
        let adjusted_prefix = if self.comma_round_trip && list.is_some_and(|l| l.len() == 1) {
            format!("{encoded_prefix}[]")
        } else {
            encoded_prefix
        };

        if options.allow_empty_lists && list.is_some_and(Vec::is_empty) {
            out.push(format!("{adjusted_prefix}[]"));
            return Ok(());
        }

        // An all-scalar sequence in comma mode joins into one pair; a
        // sequence with nested containers falls back to per-element
        // serialization below.
        if self.list_format == ListFormat::Comma {
            if let Some(items) = list {
                if items.iter().all(|v| !v.is_container()) {
                    return self.comma_step(items, &adjusted_prefix, encode, channel, out);
                }
            }
        }

        let mut keys = match &options.filter {
            Some(Filter::Keys(list)) => list.iter().map(FilterKey::as_text).collect(),
            _ => child_keys(current.as_ref()),
        };
        if let Some(sort) = &options.sort {
            keys.sort_by(|a, b| sort(a, b));
        }

        channel.enter(current.as_ref())?;
        for key in &keys {
            let child = lookup(current.as_ref(), key);
            if options.skip_nulls && child.is_some_and(Value::is_null) {
                continue;
            }
            let encoded_key = if self.allow_dots && options.encode_dot_in_keys {
                key.replace('.', "%2E")
            } else {
                key.clone()
            };
            let key_prefix = if list.is_some() {
                match self.list_format {
                    ListFormat::Indices => format!("{adjusted_prefix}[{encoded_key}]"),
                    ListFormat::Brackets => format!("{adjusted_prefix}[]"),
                    ListFormat::Repeat | ListFormat::Comma => adjusted_prefix.clone(),
                }
            } else if self.allow_dots {
                format!("{adjusted_prefix}.{encoded_key}")
            } else {
                format!("{adjusted_prefix}[{encoded_key}]")
            };
            self.step(child.unwrap_or(&UNDEFINED), &key_prefix, encode, channel, out)?;
        }
        channel.exit(current.as_ref());
        Ok(())
    }

    // One comma-joined pair standing in for a whole sequence.
    fn comma_step(
        &self,
        items: &[Value],
        prefix: &str,
        encode: bool,
        channel: &mut SideChannel,
        out: &mut Vec<String>,
    ) -> Result<(), EncodeError> {
        let options = self.options;
        if items.is_empty() {
            return Ok(());
        }

        let kept: Vec<&Value> = if options.comma_compact_nulls {
            items.iter().filter(|v| !v.is_null()).collect()
        } else {
            items.iter().collect()
        };
        let values_pre_encoded = options.encode_values_only && encode;
        let texts: Vec<String> = kept
            .iter()
            .map(|v| {
                if values_pre_encoded {
                    self.encode_component(v, ComponentKind::Value)
                } else {
                    v.scalar_text().as_deref().unwrap_or("").to_owned()
                }
            })
            .collect();
        let joined = texts.join(",");

        let pseudo = if joined.is_empty() {
            Value::Null
        } else {
            Value::Str(joined)
        };
        if options.skip_nulls && pseudo.is_null() {
            return Ok(());
        }
        // Elements were already encoded above; the join must not be encoded
        // a second time.
        let join_encode = if values_pre_encoded { false } else { encode };
        self.step(&pseudo, prefix, join_encode, channel, out)
    }

    fn encode_component(&self, value: &Value, kind: ComponentKind) -> String {
        let options = self.options;
        if let Some(encoder) = &options.encoder {
            return encoder(value, options.charset, kind, options.format);
        }
        match value {
            Value::Bytes(bytes) => percent::encode_bytes(bytes, options.format),
            Value::DateTime(dt) => {
                percent::encode_str(&self.serialize_date(dt), options.charset, options.format)
            }
            other => {
                let text = other.scalar_text();
                percent::encode_str(
                    text.as_deref().unwrap_or(""),
                    options.charset,
                    options.format,
                )
            }
        }
    }

    fn serialize_date(&self, dt: &DateTime<Utc>) -> String {
        match &self.options.serialize_date {
            Some(serialize) => serialize(dt),
            None => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
