//! The decoder pipeline.
//!
//! Decoding runs in two stages. The first tokenizes the raw string into a
//! flat mapping from raw key to decoded value: strip the optional `?`,
//! normalize `%5B`/`%5D` escapes to literal brackets, split on the
//! delimiter under `parameter_limit`, honor the charset sentinel, split
//! each pair at its `=` (preferring the one that closes a bracket group),
//! comma-split values when asked, and reconcile repeated raw keys per the
//! duplicate policy. The second stage interprets each raw key as a path,
//! builds a one-leaf tree per pair, and merges the trees into the
//! accumulator; a final compaction removes the holes sparse indices left
//! behind.

use indexmap::map::Entry;

use crate::{
    error::DecodeError,
    key_path, merge, percent,
    options::{Charset, ComponentKind, DecodeOptions, Duplicates},
    value::{Map, Value},
};

/// Input accepted by [`decode`]: a raw query string, or a flat mapping that
/// skips the tokenization stage.
#[derive(Debug, Clone)]
pub enum DecodeInput {
    Str(String),
    Map(Map),
}

impl From<&str> for DecodeInput {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for DecodeInput {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Map> for DecodeInput {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

/// Decodes a query string into a nested [`Map`].
///
/// # Examples
///
/// ```
/// use qsmodem::{DecodeOptions, Value, decode};
///
/// let decoded = decode("foo[bar]=baz", &DecodeOptions::default()).unwrap();
/// let Value::Map(foo) = &decoded["foo"] else {
///     panic!("expected a nested map")
/// };
/// assert_eq!(foo["bar"], Value::Str("baz".into()));
/// ```
///
/// # Errors
///
/// Limit errors when `raise_on_limit_exceeded` or `strict_depth` is set and
/// the input overflows the corresponding bound, and a validation error for
/// inconsistent options.
pub fn decode<I: Into<DecodeInput>>(input: I, options: &DecodeOptions) -> Result<Map, DecodeError> {
    options.validate()?;
    let (flat, values_decoded) = match input.into() {
        DecodeInput::Str(s) => {
            if s.is_empty() {
                return Ok(Map::new());
            }
            (parse_pair_values(&s, options)?, true)
        }
        DecodeInput::Map(map) => (map, false),
    };

    let mut accumulator = Value::Map(Map::new());
    for (key, value) in flat {
        if let Some(tree) = parse_keys(&key, value, options, values_decoded)? {
            accumulator = merge::merge(accumulator, tree, options);
        }
    }

    match merge::compact(accumulator) {
        Value::Map(map) => Ok(map),
        _ => unreachable!("the accumulator starts as a mapping and merge never demotes it"),
    }
}

/// Alias for [`decode`].
///
/// # Errors
///
/// See [`decode`].
pub fn loads<I: Into<DecodeInput>>(input: I, options: &DecodeOptions) -> Result<Map, DecodeError> {
    decode(input, options)
}

/// Alias for [`decode`].
///
/// # Errors
///
/// See [`decode`].
pub fn load<I: Into<DecodeInput>>(input: I, options: &DecodeOptions) -> Result<Map, DecodeError> {
    decode(input, options)
}

enum OneOrMany<'a> {
    One(&'a str),
    Many(Vec<&'a str>),
}

// Stage one: raw string -> flat (raw key -> decoded value) mapping, under
// the charset the sentinel negotiated.
fn parse_pair_values(input: &str, options: &DecodeOptions) -> Result<Map, DecodeError> {
    let stripped = if options.ignore_query_prefix {
        input.strip_prefix('?').unwrap_or(input)
    } else {
        input
    };
    let normalized = normalize_bracket_escapes(stripped);

    if options.raise_on_limit_exceeded
        && options.delimiter.count(&normalized) > options.parameter_limit
    {
        return Err(DecodeError::ParameterLimitExceeded {
            limit: options.parameter_limit,
        });
    }
    let parts = options.delimiter.split(&normalized, options.parameter_limit);

    let mut charset = options.charset;
    let mut sentinel_index = None;
    if options.charset_sentinel {
        for (i, part) in parts.iter().enumerate() {
            if let Some(checkmark) = part.strip_prefix("utf8=") {
                charset = match checkmark {
                    "%E2%9C%93" => Charset::Utf8,
                    "%26%2310003%3B" => Charset::Latin1,
                    _ => charset,
                };
                sentinel_index = Some(i);
                break;
            }
        }
    }

    let mut flat = Map::new();
    for (i, part) in parts.iter().enumerate() {
        if Some(i) == sentinel_index {
            continue;
        }

        // Split at the '=' that closes a bracket group if there is one, so a
        // key like `a[=]` keeps its inner '='.
        let separator = part
            .find("]=")
            .map_or_else(|| part.find('='), |at| Some(at + 1));

        let (key, value) = match separator {
            None => {
                let key = decode_key(part, charset, options);
                let value = if options.strict_null_handling {
                    Value::Null
                } else {
                    Value::Str(String::new())
                };
                (key, value)
            }
            Some(at) => {
                let key = decode_key(&part[..at], charset, options);
                let current_len = match flat.get(&key) {
                    Some(Value::List(items)) => items.len(),
                    _ => 0,
                };
                let mut value = match split_list_value(&part[at + 1..], options, current_len)? {
                    OneOrMany::One(token) => decode_value(token, charset, options),
                    OneOrMany::Many(tokens) => Value::List(
                        tokens
                            .into_iter()
                            .map(|token| decode_value(token, charset, options))
                            .collect(),
                    ),
                };
                if options.interpret_numeric_entities && charset == Charset::Latin1 {
                    value = interpret_entities(value);
                }
                if part.contains("[]=") && value.is_list() {
                    value = Value::List(vec![value]);
                }
                (key, value)
            }
        };

        match flat.entry(key) {
            Entry::Occupied(mut slot) => match options.duplicates {
                Duplicates::Combine => {
                    let existing = std::mem::replace(slot.get_mut(), Value::Undefined);
                    *slot.get_mut() = merge::combine(existing, value);
                }
                Duplicates::First => {}
                Duplicates::Last => *slot.get_mut() = value,
            },
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    Ok(flat)
}

fn normalize_bracket_escapes(input: &str) -> String {
    input
        .replace("%5B", "[")
        .replace("%5b", "[")
        .replace("%5D", "]")
        .replace("%5d", "]")
}

// Comma splitting plus the list growth bound.
fn split_list_value<'a>(
    raw: &'a str,
    options: &DecodeOptions,
    current_len: usize,
) -> Result<OneOrMany<'a>, DecodeError> {
    if options.comma && raw.contains(',') {
        return Ok(OneOrMany::Many(raw.split(',').collect()));
    }
    if options.raise_on_limit_exceeded
        && isize::try_from(current_len).is_ok_and(|len| len >= options.list_limit)
    {
        return Err(DecodeError::ListLimitExceeded {
            limit: options.list_limit,
        });
    }
    Ok(OneOrMany::One(raw))
}

fn decode_key(raw: &str, charset: Charset, options: &DecodeOptions) -> String {
    run_decoder(raw, charset, ComponentKind::Key, options).coerce_key()
}

fn decode_value(raw: &str, charset: Charset, options: &DecodeOptions) -> Value {
    run_decoder(raw, charset, ComponentKind::Value, options)
}

fn run_decoder(raw: &str, charset: Charset, kind: ComponentKind, options: &DecodeOptions) -> Value {
    if let Some(decoder) = &options.decoder {
        decoder(raw, charset, kind)
    } else if let Some(decoder) = &options.legacy_decoder {
        decoder(raw, charset)
    } else {
        Value::Str(percent::decode_str(raw, charset))
    }
}

fn interpret_entities(value: Value) -> Value {
    match value {
        Value::Str(s) if !s.is_empty() => Value::Str(percent::interpret_numeric_entities(&s)),
        Value::List(items) => Value::List(items.into_iter().map(interpret_entities).collect()),
        other => other,
    }
}

// Stage two, per pair: split the raw key into segments and wrap the value
// right-to-left into a one-leaf tree.
fn parse_keys(
    key: &str,
    value: Value,
    options: &DecodeOptions,
    values_decoded: bool,
) -> Result<Option<Value>, DecodeError> {
    if key.is_empty() {
        return Ok(None);
    }
    let Some(segments) = key_path::split_key(key, options)? else {
        return Ok(None);
    };
    build_leaf_tree(&segments, value, options, values_decoded).map(Some)
}

fn build_leaf_tree(
    segments: &[String],
    value: Value,
    options: &DecodeOptions,
    values_decoded: bool,
) -> Result<Value, DecodeError> {
    let mut leaf = if values_decoded {
        value
    } else {
        // Mapping-form input arrives untokenized; comma splitting still
        // applies to its string values.
        match value {
            Value::Str(s) => match split_list_value(&s, options, 0)? {
                OneOrMany::One(token) => Value::Str(token.to_owned()),
                OneOrMany::Many(tokens) => Value::List(
                    tokens
                        .into_iter()
                        .map(|token| Value::Str(token.to_owned()))
                        .collect(),
                ),
            },
            other => other,
        }
    };

    for segment in segments.iter().rev() {
        if segment == "[]" && options.parse_lists {
            let empties_to_empty_list = options.allow_empty_lists
                && (matches!(&leaf, Value::Str(s) if s.is_empty())
                    || (options.strict_null_handling && leaf.is_null()));
            leaf = if empties_to_empty_list {
                Value::List(vec![])
            } else {
                merge::combine(Value::List(vec![]), leaf)
            };
            continue;
        }

        let clean = segment
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .unwrap_or(segment);
        let decoded = if options.decode_dot_in_keys {
            clean.replace("%2E", ".").replace("%2e", ".")
        } else {
            clean.to_owned()
        };

        // A child segment whose text is a canonical index within the list
        // limit builds a sparse sequence; everything else builds a one-key
        // mapping.
        let list_index = if options.parse_lists && *segment != decoded {
            decoded
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == decoded)
                .filter(|index| {
                    isize::try_from(*index).is_ok_and(|index| index <= options.list_limit)
                })
        } else {
            None
        };

        leaf = if !options.parse_lists && decoded.is_empty() {
            Value::Map(Map::from_iter([("0".to_owned(), leaf)]))
        } else if let Some(index) = list_index {
            let mut list = vec![Value::Undefined; index + 1];
            list[index] = leaf;
            Value::List(list)
        } else {
            Value::Map(Map::from_iter([(decoded, leaf)]))
        };
    }

    Ok(leaf)
}
