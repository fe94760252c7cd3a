use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use slotmap::{SlotMap, new_key_type};

/// Whether a field tagged `tag` is shown for `query`.
///
/// An empty query shows everything. Otherwise the tag must contain the query,
/// ignoring case.
pub fn is_visible(tag: &str, query: &str) -> bool {
    query.is_empty() || tag.to_lowercase().contains(&query.to_lowercase())
}

new_key_type! {
    pub struct WatchId;
}

struct Watcher {
    tag: String,
    visible: Cell<bool>,
    on_change: Rc<dyn Fn(bool)>,
}

#[derive(Default)]
struct SearchInner {
    query: RefCell<String>,
    watchers: RefCell<SlotMap<WatchId, Watcher>>,
}

/// The search box state of one editor session.
#[derive(Clone, Default)]
pub struct SearchQuery {
    inner: Rc<SearchInner>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.inner.query.borrow().clone()
    }

    pub fn is_visible(&self, tag: &str) -> bool {
        is_visible(tag, &self.inner.query.borrow())
    }

    /// Replace the query. Watchers whose visibility flipped are told so.
    pub fn set(&self, query: impl Into<String>) {
        let query = query.into();
        if *self.inner.query.borrow() == query {
            return;
        }
        tracing::debug!(%query, "search query changed");
        *self.inner.query.borrow_mut() = query;

        let flipped: Vec<(Rc<dyn Fn(bool)>, bool)> = {
            let query = self.inner.query.borrow();
            let watchers = self.inner.watchers.borrow();
            let flipped = watchers
                .values()
                .filter_map(|watcher| {
                    let visible = is_visible(&watcher.tag, &query);
                    (watcher.visible.replace(visible) != visible)
                        .then(|| (watcher.on_change.clone(), visible))
                })
                .collect();
            flipped
        };
        for (on_change, visible) in flipped {
            on_change(visible);
        }
    }

    /// Call `on_change` whenever the visibility of `tag` flips.
    ///
    /// The watch lasts as long as the returned guard.
    pub fn watch(&self, tag: impl Into<String>, on_change: impl Fn(bool) + 'static) -> SearchWatch {
        let tag = tag.into();
        let visible = self.is_visible(&tag);
        let id = self.inner.watchers.borrow_mut().insert(Watcher {
            tag,
            visible: Cell::new(visible),
            on_change: Rc::new(on_change),
        });
        SearchWatch {
            id,
            search: Rc::downgrade(&self.inner),
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }
}

#[must_use = "the watch ends when this guard is dropped"]
pub struct SearchWatch {
    id: WatchId,
    search: Weak<SearchInner>,
}

impl SearchWatch {
    /// Current visibility of the watched tag.
    pub fn is_visible(&self) -> bool {
        let Some(search) = self.search.upgrade() else {
            return true;
        };
        let watchers = search.watchers.borrow();
        watchers.get(self.id).is_none_or(|watcher| watcher.visible.get())
    }
}

impl Drop for SearchWatch {
    fn drop(&mut self) {
        if let Some(search) = self.search.upgrade() {
            let removed = search.watchers.borrow_mut().remove(self.id);
            drop(removed);
        }
    }
}
