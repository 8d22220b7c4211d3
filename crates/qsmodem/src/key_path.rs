//! Splitting a decoded key into its path segments.
//!
//! A key like `foo[bar][0]` splits into the parent `foo` followed by the
//! bracketed children `[bar]` and `[0]`, each kept with its literal
//! brackets. Only the first `depth` children are interpreted; a well-formed
//! remainder is wrapped whole into one trailing `[…]` segment (or, under
//! `strict_depth`, rejected). An unterminated group is not a segment at all:
//! it stays part of whatever literal text surrounds it and never counts
//! toward `strict_depth`.

use crate::{error::DecodeError, options::DecodeOptions};

/// Rewrites top-level dot notation into bracket notation: `a.b.c` becomes
/// `a[b][c]`. A dot immediately followed by another dot, a bracket, or the
/// end of input stays literal.
fn dot_to_bracket_notation(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut rest = key;
    while let Some(pos) = rest.find('.') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after.find(['.', '[']).unwrap_or(after.len());
        if name_len == 0 {
            out.push('.');
            rest = after;
        } else {
            out.push('[');
            out.push_str(&after[..name_len]);
            out.push(']');
            rest = &after[name_len..];
        }
    }
    out.push_str(rest);
    out
}

// First well-formed `[…]` group at or after `from`: a `[` with no further
// bracket before its closing `]`. Returns the byte range including both
// brackets.
fn find_group(key: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = key.as_bytes();
    let mut open = None;
    for (offset, &byte) in bytes[from..].iter().enumerate() {
        match byte {
            b'[' => open = Some(from + offset),
            b']' => {
                if let Some(start) = open {
                    return Some((start, from + offset + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `key` into its path segments, or `None` for an empty key (whose
/// pair is dropped entirely).
///
/// # Errors
///
/// [`DecodeError::DepthExceeded`] when a well-formed group remains past
/// `depth` and `strict_depth` is set.
pub(crate) fn split_key(
    key: &str,
    options: &DecodeOptions,
) -> Result<Option<Vec<String>>, DecodeError> {
    if key.is_empty() {
        return Ok(None);
    }
    let key = if options.allow_dots() {
        dot_to_bracket_notation(key)
    } else {
        key.to_owned()
    };

    // With depth 0 the whole key is the parent, brackets and all, and
    // strict_depth has nothing to measure.
    if options.depth == 0 {
        return Ok(Some(vec![key]));
    }

    let mut segments = Vec::new();
    let first = find_group(&key, 0);
    let parent = first.map_or(key.as_str(), |(start, _)| &key[..start]);
    if !parent.is_empty() {
        segments.push(parent.to_owned());
    }

    let mut consumed = 0;
    let mut cursor = first.map_or(key.len(), |(start, _)| start);
    let remainder = loop {
        let Some((start, end)) = find_group(&key, cursor) else {
            break None;
        };
        if consumed == options.depth {
            break Some(start);
        }
        consumed += 1;
        segments.push(key[start..end].to_owned());
        cursor = end;
    };

    if let Some(start) = remainder {
        if options.strict_depth {
            return Err(DecodeError::DepthExceeded {
                depth: options.depth,
            });
        }
        let mut tail = String::with_capacity(key.len() - start + 2);
        tail.push('[');
        tail.push_str(&key[start..]);
        tail.push(']');
        segments.push(tail);
    }

    Ok(Some(segments))
}
