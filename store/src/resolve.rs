//! Reading and writing values by path.
//!
//! Writes never mutate their input. They rebuild only the nodes on the way
//! from the root to the written location and share everything else.

use std::rc::Rc;

use crate::{
    path::{Path, Seg},
    value::{Map, Value},
};

/// Resolve `path` against `tree`, left to right.
///
/// A missing key, an out-of-range index or a step into a scalar all read as
/// absent.
pub fn read<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, seg| match (node, seg) {
            (Value::Map(map), Seg::Key(key)) => map.get(key.as_str()),
            (Value::List(items), Seg::Index(index)) => items.get(*index),
            _ => None,
        })
}

/// Write `value` at `path`, returning the new tree.
///
/// Key steps through missing or non-map nodes create empty maps. Index steps
/// only address existing elements: an index past the end, or an index step
/// into something that is not a list, makes the whole write inapplicable and
/// `None` is returned. Lists grow through the list operations, never through
/// direct writes.
pub fn try_write(tree: &Value, path: &Path, value: Value) -> Option<Value> {
    write_segments(Some(tree), path.segments(), value)
}

/// Like [`try_write`], but an inapplicable write returns `tree` unchanged.
pub fn write(tree: &Value, path: &Path, value: Value) -> Value {
    match try_write(tree, path, value) {
        Some(next) => next,
        None => {
            tracing::warn!(%path, "write ignored: index step does not address an existing element");
            tree.clone()
        }
    }
}

fn write_segments(node: Option<&Value>, segments: &[Seg], value: Value) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value);
    };

    match head {
        Seg::Key(key) => {
            let mut map = match node {
                Some(Value::Map(map)) => Map::clone(map),
                _ => Map::new(),
            };
            let child = write_segments(map.get(key.as_str()), rest, value)?;
            map.insert(key.clone(), child);
            Some(Value::Map(Rc::new(map)))
        }
        Seg::Index(index) => {
            let Some(Value::List(items)) = node else {
                return None;
            };
            let current = items.get(*index)?;
            let child = write_segments(Some(current), rest, value)?;
            let mut items = Vec::clone(items);
            items[*index] = child;
            Some(Value::List(Rc::new(items)))
        }
    }
}
