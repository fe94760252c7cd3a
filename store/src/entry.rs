//! Stable identities for list entries.
//!
//! List entries are positional in the tree. A control that captured index `i`
//! before another entry was removed would otherwise write to the wrong entry,
//! so each list the application asks about gets a parallel vector of
//! [`EntryId`]s that follows adds and removes. Ids are resolved to a position
//! only when an operation runs.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::path::{Path, Seg};

/// A stable identifier for one entry of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> EntryId {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        EntryId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw value, for use as a view key.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct EntryIds {
    lists: FxHashMap<Path, Vec<EntryId>>,
}

impl EntryIds {
    /// Ids for the list at `path`, which currently holds `len` entries.
    ///
    /// A list seen for the first time, or whose tracked length no longer
    /// matches, gets a fresh set of ids.
    pub(crate) fn ids(&mut self, path: &Path, len: usize) -> Vec<EntryId> {
        let ids = self.lists.entry(path.clone()).or_default();
        if ids.len() != len {
            *ids = (0..len).map(|_| EntryId::next()).collect();
        }
        ids.clone()
    }

    /// Where `id` sits in the list at `path`, which currently holds `len`
    /// entries. Ids from a stale generation resolve to nothing.
    pub(crate) fn position(&self, path: &Path, id: EntryId, len: usize) -> Option<usize> {
        let ids = self.lists.get(path)?;
        if ids.len() != len {
            return None;
        }
        ids.iter().position(|entry| *entry == id)
    }

    /// Record an append to a list that held `len_before` entries.
    pub(crate) fn pushed(&mut self, path: &Path, len_before: usize) {
        let in_sync = match self.lists.get_mut(path) {
            Some(ids) if ids.len() == len_before => {
                ids.push(EntryId::next());
                true
            }
            Some(_) => false,
            None => true,
        };
        if !in_sync {
            self.lists.remove(path);
        }
    }

    /// Record the removal of entry `index`. Lists nested in that entry or in
    /// any entry after it have shifted to another record and are forgotten.
    pub(crate) fn removed(&mut self, path: &Path, index: usize) {
        if let Some(ids) = self.lists.get_mut(path) {
            if index < ids.len() {
                ids.remove(index);
            }
        }
        let depth = path.len();
        self.lists.retain(|list, _| {
            !list.starts_with(path)
                || list.segments().get(depth).and_then(Seg::as_index).is_none_or(|i| i < index)
        });
    }

    /// Forget every tracked list strictly below `replaced`.
    pub(crate) fn replaced(&mut self, replaced: &Path) {
        self.lists
            .retain(|list, _| !list.starts_with(replaced) || list == replaced);
    }

    /// Forget every tracked list that a wholesale write at `changed` replaced.
    ///
    /// Writes below a list (editing a field of one entry) keep its ids.
    pub(crate) fn invalidate(&mut self, changed: &Path) {
        self.lists.retain(|list, _| !list.starts_with(changed));
    }

    pub(crate) fn clear(&mut self) {
        self.lists.clear();
    }
}
