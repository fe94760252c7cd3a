//! Structural operations on ordered collections.
//!
//! Entries are addressed by position. Removing an entry shifts every later
//! entry down by one. An index that no longer exists (a control rendered
//! before a concurrent removal) turns the operation into a silent no-op.

use std::rc::Rc;

use crate::{
    document::{Change, ConfigDocument},
    entry::EntryId,
    path::Path,
    resolve,
    value::{Map, Value},
};

/// `items` with `item` appended.
pub fn appended(items: &[Value], item: Value) -> Value {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    Value::List(Rc::new(next))
}

/// `items` without the element at `index`, or `None` if out of range.
pub fn without(items: &[Value], index: usize) -> Option<Value> {
    if index >= items.len() {
        return None;
    }
    let next = items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect();
    Some(Value::List(Rc::new(next)))
}

/// `items` with the element at `index` updated, or `None` if out of range.
///
/// See [`merge_shallow`] for how the update is applied.
pub fn merged_at(items: &[Value], index: usize, update: Value) -> Option<Value> {
    let current = items.get(index)?;
    let mut next = items.to_vec();
    next[index] = merge_shallow(current, update);
    Some(Value::List(Rc::new(next)))
}

/// Apply `update` over `current`.
///
/// When both are maps the update is a partial record: its keys overwrite,
/// every other key of `current` is kept. Anything else replaces `current`.
pub fn merge_shallow(current: &Value, update: Value) -> Value {
    match (current, update) {
        (Value::Map(current), Value::Map(update)) => {
            let mut merged = Map::clone(current);
            for (key, value) in update.iter() {
                merged.insert(key.clone(), value.clone());
            }
            Value::Map(Rc::new(merged))
        }
        (_, update) => update,
    }
}

impl ConfigDocument {
    /// Append a fresh entry to the list at `path`.
    ///
    /// An absent (or `null`) collection counts as empty. `factory` runs once
    /// per call, so a non-deterministic factory yields distinct entries.
    pub fn add(&self, path: &Path, factory: impl FnOnce() -> Value) {
        let collection = self.get(path);
        let (next_list, len_before) = match &collection {
            None | Some(Value::Null) => (appended(&[], factory()), 0),
            Some(Value::List(items)) => (appended(items, factory()), items.len()),
            Some(_) => {
                tracing::warn!(%path, "add ignored: value at path is not a list");
                return;
            }
        };
        self.replace_list(path, next_list, |entries| entries.pushed(path, len_before));
    }

    /// Remove the entry at `index` from the list at `path`. Out of range is a
    /// no-op.
    pub fn remove(&self, path: &Path, index: usize) {
        let next_list = self.with(|tree| {
            resolve::read(tree, path)
                .and_then(Value::as_list)
                .and_then(|items| without(items, index))
        });
        let Some(next_list) = next_list else {
            tracing::debug!(%path, index, "remove ignored: no entry at index");
            return;
        };
        self.replace_list(path, next_list, |entries| entries.removed(path, index));
    }

    /// Update the entry at `index`. A map `value` is merged shallowly into a
    /// map entry. Out of range is a no-op.
    pub fn update_at(&self, path: &Path, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let next_list = self.with(|tree| {
            resolve::read(tree, path)
                .and_then(Value::as_list)
                .and_then(|items| merged_at(items, index, value))
        });
        let Some(next_list) = next_list else {
            tracing::debug!(%path, index, "update ignored: no entry at index");
            return;
        };
        self.replace_list(path, next_list, |entries| entries.replaced(&path.join(index)));
    }

    /// Update the entry identified by `id`, wherever it currently sits.
    pub fn update_entry(&self, path: &Path, id: EntryId, value: impl Into<Value>) {
        match self.position_of(path, id) {
            Some(index) => self.update_at(path, index, value),
            None => tracing::debug!(%path, ?id, "update ignored: stale entry id"),
        }
    }

    /// Remove the entry identified by `id`, wherever it currently sits.
    pub fn remove_entry(&self, path: &Path, id: EntryId) {
        match self.position_of(path, id) {
            Some(index) => self.remove(path, index),
            None => tracing::debug!(%path, ?id, "remove ignored: stale entry id"),
        }
    }

    fn replace_list(
        &self,
        path: &Path,
        next_list: Value,
        track: impl FnOnce(&mut crate::entry::EntryIds),
    ) {
        let next = resolve::try_write(&self.snapshot(), path, next_list);
        let Some(next) = next else {
            tracing::warn!(%path, "list write ignored: index step does not address an existing element");
            return;
        };
        track(&mut self.inner.entries.borrow_mut());
        self.commit(next, Change::Path(path.clone()), true);
    }
}
