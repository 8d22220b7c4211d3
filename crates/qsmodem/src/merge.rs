//! The tree algebra shared by both halves of the codec: merging two partial
//! value trees, and compacting the sparse sequences the merge leaves behind.

use indexmap::map::Entry;

use crate::{
    options::DecodeOptions,
    value::{Map, Value},
};

/// Merges `source` into `target`, producing a new tree.
///
/// Coercion rules, in order:
///
/// - an [`Undefined`](Value::Undefined) side yields the other side;
/// - two mappings merge key-wise, recursing on collisions;
/// - two sequences merge element-wise, with holes filled in place and
///   non-container collisions appended;
/// - a sequence target takes a mapping source as sparse index assignment
///   when every key is a canonical index below `list_limit`, and is
///   otherwise demoted to a mapping keyed by its stringified indices;
/// - a scalar source appends to a sequence target, and lands in a mapping
///   target as a key mapped to `true`;
/// - anything else promotes to a two-element sequence.
pub(crate) fn merge(target: Value, source: Value, options: &DecodeOptions) -> Value {
    if source.is_undefined() {
        return target;
    }
    if target.is_undefined() {
        return source;
    }

    match (target, source) {
        (Value::Map(target), Value::Map(source)) => merge_maps(target, source, options),
        (Value::List(target), Value::List(source)) => merge_lists(target, source, options),
        (Value::List(target), Value::Map(source)) => {
            match sparse_list_from(&source, options) {
                Some(sparse) => merge_lists(target, sparse, options),
                None => merge_maps(list_to_map(target), source, options),
            }
        }
        (Value::Map(target), Value::List(source)) => {
            merge_maps(target, list_to_map(source), options)
        }
        (Value::List(mut target), scalar) => {
            target.push(scalar);
            Value::List(target)
        }
        (Value::Map(mut target), scalar) => {
            target.insert(scalar.coerce_key(), Value::Bool(true));
            Value::Map(target)
        }
        (scalar, Value::List(mut source)) => {
            source.insert(0, scalar);
            Value::List(source)
        }
        (scalar, source) => Value::List(vec![scalar, source]),
    }
}

fn merge_maps(mut target: Map, source: Map, options: &DecodeOptions) -> Value {
    for (key, value) in source {
        match target.entry(key) {
            Entry::Occupied(mut slot) => {
                let existing = std::mem::replace(slot.get_mut(), Value::Undefined);
                *slot.get_mut() = merge(existing, value, options);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
    Value::Map(target)
}

fn merge_lists(mut target: Vec<Value>, source: Vec<Value>, options: &DecodeOptions) -> Value {
    for (index, item) in source.into_iter().enumerate() {
        // A hole in the source assigns nothing.
        if item.is_undefined() {
            continue;
        }
        let occupied = target.get(index).is_some_and(|v| !v.is_undefined());
        if occupied {
            if target[index].is_container() && item.is_container() {
                let existing = std::mem::replace(&mut target[index], Value::Undefined);
                target[index] = merge(existing, item, options);
            } else {
                target.push(item);
            }
        } else {
            if target.len() <= index {
                target.resize(index + 1, Value::Undefined);
            }
            target[index] = item;
        }
    }
    Value::List(target)
}

// A mapping qualifies as sparse index assignment when every key is a
// canonical non-negative integer below `list_limit`; a key at or above the
// limit demotes the whole merge to mappings.
fn sparse_list_from(source: &Map, options: &DecodeOptions) -> Option<Vec<Value>> {
    if !options.parse_lists {
        return None;
    }
    let mut indices = Vec::with_capacity(source.len());
    for key in source.keys() {
        let index: usize = key.parse().ok()?;
        let below_limit = isize::try_from(index).is_ok_and(|i| i < options.list_limit);
        if index.to_string() != *key || !below_limit {
            return None;
        }
        indices.push(index);
    }
    let len = indices.iter().max().map_or(0, |max| max + 1);
    let mut sparse = vec![Value::Undefined; len];
    for (index, value) in indices.into_iter().zip(source.values()) {
        sparse[index] = value.clone();
    }
    Some(sparse)
}

fn list_to_map(list: Vec<Value>) -> Map {
    list.into_iter()
        .enumerate()
        .filter(|(_, v)| !v.is_undefined())
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

/// Appends `b` onto `a`, flattening one sequence level on each side.
pub(crate) fn combine(a: Value, b: Value) -> Value {
    let mut out = Vec::new();
    for value in [a, b] {
        match value {
            Value::List(items) => out.extend(items),
            other => out.push(other),
        }
    }
    Value::List(out)
}

/// Removes every [`Undefined`](Value::Undefined) hole from sequences,
/// preserving the order of the remaining elements. Mappings are walked but
/// never promoted to sequences here.
pub(crate) fn compact(value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .into_iter()
                .filter(|v| !v.is_undefined())
                .map(compact)
                .collect(),
        ),
        Value::Map(map) => Value::Map(map.into_iter().map(|(k, v)| (k, compact(v))).collect()),
        other => other,
    }
}
