//! The mutable settings document.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::Rc,
};

use slotmap::{SlotMap, new_key_type};

use crate::{
    entry::{EntryId, EntryIds},
    error::PathError,
    path::Path,
    resolve,
    selector::{Listener, Selector, SelectorSubscriber, Subscriber, Subscription, SubscriptionHandle},
    value::Value,
};

new_key_type! {
    /// Identifies one subscriber registered on a [`ConfigDocument`].
    pub struct SubscriptionId;
}

/// What a mutation touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// A write at this path. Watchers of the path, its ancestors and its
    /// descendants are affected.
    Path(Path),
    /// The document was restored to its default.
    Reset,
    /// The document was replaced wholesale from a serialized snapshot.
    Load,
}

impl Change {
    pub fn affects(&self, path: &Path) -> bool {
        match self {
            Change::Path(changed) => changed.is_related(path),
            Change::Reset | Change::Load => true,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Path(path) if path.is_root() => f.write_str("<root>"),
            Change::Path(path) => write!(f, "{path}"),
            Change::Reset => f.write_str("<reset>"),
            Change::Load => f.write_str("<load>"),
        }
    }
}

/// Delivered to raw observers after every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub change: Change,
    /// The dirty flag after the mutation.
    pub dirty: bool,
    pub revision: u64,
}

pub(crate) struct DocumentInner {
    default: Value,
    current: RefCell<Value>,
    dirty: Cell<bool>,
    revision: Cell<u64>,
    pub(crate) subscribers: RefCell<SlotMap<SubscriptionId, Rc<dyn Subscriber>>>,
    pending: RefCell<VecDeque<ChangeEvent>>,
    notifying: Cell<bool>,
    pub(crate) entries: RefCell<EntryIds>,
}

/// A settings tree with a default snapshot, a dirty flag and subscribers.
///
/// The document is a cheap `Clone` handle; every clone addresses the same
/// tree. It is constructed once at startup and passed to whatever needs it.
///
/// Every mutation replaces the whole tree in one step and then runs a
/// notification pass, so no subscriber can observe a half-applied write.
/// Mutations made from inside a notification are applied immediately but
/// notified after the current pass completes, in order.
///
/// # Example
///
/// ```rust
/// use themekit_store::{ConfigDocument, Path, Value};
///
/// let default: Value = serde_json::json!({ "settings": { "color": { "link": false } } }).into();
/// let doc = ConfigDocument::new(default);
/// let link = Path::parse("settings.color.link").unwrap();
///
/// doc.set(&link, true);
/// assert_eq!(doc.get(&link), Some(Value::Bool(true)));
/// assert!(doc.is_dirty());
///
/// doc.reset();
/// assert!(!doc.is_dirty());
/// ```
#[derive(Clone)]
pub struct ConfigDocument {
    pub(crate) inner: Rc<DocumentInner>,
}

impl ConfigDocument {
    pub fn new(default: Value) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                current: RefCell::new(default.clone()),
                default,
                dirty: Cell::new(false),
                revision: Cell::new(0),
                subscribers: RefCell::new(SlotMap::with_key()),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                entries: RefCell::new(EntryIds::default()),
            }),
        }
    }

    /// The value at `path`, or `None` if absent.
    pub fn get(&self, path: &Path) -> Option<Value> {
        resolve::read(&self.inner.current.borrow(), path).cloned()
    }

    /// Parse `path` and read it.
    pub fn get_str(&self, path: &str) -> Result<Option<Value>, PathError> {
        Ok(self.get(&Path::parse(path)?))
    }

    /// Borrow the current tree.
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.current.borrow())
    }

    /// The current tree. O(1): the snapshot shares structure with the document.
    pub fn snapshot(&self) -> Value {
        self.inner.current.borrow().clone()
    }

    pub fn default_tree(&self) -> &Value {
        &self.inner.default
    }

    /// True once any mutation succeeded since the last reset, or when the
    /// loaded tree differed from the default.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Deep comparison of the current tree with the default.
    pub fn differs_from_default(&self) -> bool {
        *self.inner.current.borrow() != self.inner.default
    }

    /// Incremented by every mutation.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Write `value` at `path`.
    ///
    /// Missing maps along the path are created. A write through an index that
    /// does not address an existing element is ignored.
    pub fn set(&self, path: &Path, value: impl Into<Value>) {
        self.try_set(path, value);
    }

    /// Like [`set`](Self::set), but reports whether the write was applied.
    pub fn try_set(&self, path: &Path, value: impl Into<Value>) -> bool {
        let next = resolve::try_write(&self.inner.current.borrow(), path, value.into());
        let Some(next) = next else {
            tracing::warn!(%path, "set ignored: index step does not address an existing element");
            return false;
        };
        self.inner.entries.borrow_mut().invalidate(path);
        self.commit(next, Change::Path(path.clone()), true);
        true
    }

    /// Parse `path` and write it.
    pub fn set_str(&self, path: &str, value: impl Into<Value>) -> Result<(), PathError> {
        self.set(&Path::parse(path)?, value);
        Ok(())
    }

    /// Restore the default tree and clear the dirty flag.
    ///
    /// Values are immutable, so the default is shared rather than copied.
    /// Subscribers whose slice never diverged from the default see the same
    /// nodes and are not renotified.
    pub fn reset(&self) {
        self.inner.entries.borrow_mut().clear();
        self.commit(self.inner.default.clone(), Change::Reset, false);
    }

    /// Replace the whole tree. The dirty flag reflects whether `tree` differs
    /// from the default.
    pub fn load_from(&self, tree: Value) {
        let dirty = tree != self.inner.default;
        self.inner.entries.borrow_mut().clear();
        self.commit(tree, Change::Load, dirty);
    }

    /// Register a selector. `on_change` runs after any mutation that changes
    /// the selected slice according to the selector's predicate.
    pub fn subscribe<T: Clone + 'static>(
        &self,
        selector: Selector<T>,
        on_change: impl Fn(&T) + 'static,
    ) -> Subscription<T> {
        let initial = selector.select(&self.inner.current.borrow());
        let record = Rc::new(SelectorSubscriber::new(selector, initial, Box::new(on_change)));
        let id = self
            .inner
            .subscribers
            .borrow_mut()
            .insert(record.clone() as Rc<dyn Subscriber>);
        Subscription {
            handle: self.handle(id),
            record,
        }
    }

    /// Register a raw observer called after every mutation with the tree as
    /// of that notification pass.
    pub fn observe(&self, on_event: impl Fn(&Value, &ChangeEvent) + 'static) -> SubscriptionHandle {
        let listener = Rc::new(Listener {
            on_event: Box::new(on_event),
        });
        let id = self
            .inner
            .subscribers
            .borrow_mut()
            .insert(listener as Rc<dyn Subscriber>);
        self.handle(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Stable ids for the entries of the list at `path`.
    pub fn entries(&self, path: &Path) -> Vec<EntryId> {
        let len = self.list_len(path);
        self.inner.entries.borrow_mut().ids(path, len)
    }

    /// The current position of `id` in the list at `path`.
    pub fn position_of(&self, path: &Path, id: EntryId) -> Option<usize> {
        let len = self.list_len(path);
        self.inner.entries.borrow().position(path, id, len)
    }

    pub(crate) fn list_len(&self, path: &Path) -> usize {
        self.with(|tree| {
            resolve::read(tree, path)
                .and_then(Value::as_list)
                .map_or(0, <[Value]>::len)
        })
    }

    fn handle(&self, id: SubscriptionId) -> SubscriptionHandle {
        SubscriptionHandle {
            id,
            document: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn commit(&self, next: Value, change: Change, dirty: bool) {
        *self.inner.current.borrow_mut() = next;
        self.inner.dirty.set(dirty);
        let revision = self.inner.revision.get() + 1;
        self.inner.revision.set(revision);
        tracing::debug!(%change, revision, dirty, "document changed");

        self.inner.pending.borrow_mut().push_back(ChangeEvent {
            change,
            dirty,
            revision,
        });
        self.flush();
    }

    fn flush(&self) {
        if self.inner.notifying.replace(true) {
            return;
        }
        // Cleared even if a callback unwinds, so later mutations still notify.
        let _guard = NotifyingGuard(&self.inner.notifying);

        loop {
            let event = self.inner.pending.borrow_mut().pop_front();
            let Some(event) = event else {
                break;
            };
            let tree = self.snapshot();
            let subscribers: Vec<_> = self
                .inner
                .subscribers
                .borrow()
                .iter()
                .map(|(id, subscriber)| (id, subscriber.clone()))
                .collect();

            for (id, subscriber) in subscribers {
                // Unsubscribed by an earlier callback in this pass.
                if !self.inner.subscribers.borrow().contains_key(id) {
                    continue;
                }
                subscriber.notify(&tree, &event);
            }
        }
    }
}

struct NotifyingGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl fmt::Debug for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("current", &self.inner.current.borrow())
            .field("dirty", &self.inner.dirty.get())
            .field("revision", &self.inner.revision.get())
            .finish()
    }
}
