//! Derived reads over the document and the subscriptions that keep them fresh.
//!
//! A [`Selector`] is a pure function from the whole tree to a slice, paired
//! with the predicate that decides whether two slices are "the same". After
//! every mutation the document re-evaluates each live selector and calls its
//! consumer only when the predicate says the slice changed.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    document::{Change, ChangeEvent, DocumentInner, SubscriptionId},
    path::Path,
    resolve,
    value::{ShallowEq, Value},
};

/// A derived read over the document tree.
pub struct Selector<T> {
    select: Rc<dyn Fn(&Value) -> T>,
    same: Rc<dyn Fn(&T, &T) -> bool>,
    scope: Option<Path>,
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            same: self.same.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<T: ShallowEq + 'static> Selector<T> {
    /// A selector compared with [`ShallowEq`].
    pub fn new(select: impl Fn(&Value) -> T + 'static) -> Self {
        Self::with_predicate(select, |a: &T, b: &T| a.shallow_eq(b))
    }
}

impl Selector<Option<Value>> {
    /// The value at `path`, re-evaluated only for changes related to `path`.
    pub fn at(path: Path) -> Self {
        let read_path = path.clone();
        Self::new(move |tree| resolve::read(tree, &read_path).cloned()).scoped(path)
    }
}

impl<T: 'static> Selector<T> {
    /// A selector with an explicit change-detection predicate.
    ///
    /// `same(previous, next)` returning `true` suppresses the notification.
    pub fn with_predicate(
        select: impl Fn(&Value) -> T + 'static,
        same: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self {
            select: Rc::new(select),
            same: Rc::new(same),
            scope: None,
        }
    }

    /// Replace the change-detection predicate.
    pub fn compare_with(mut self, same: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.same = Rc::new(same);
        self
    }

    /// Skip re-evaluation for path changes unrelated to `path`.
    ///
    /// Only sound when the selector reads nothing outside `path`.
    pub fn scoped(mut self, path: Path) -> Self {
        self.scope = Some(path);
        self
    }

    pub fn scope(&self) -> Option<&Path> {
        self.scope.as_ref()
    }

    /// Evaluate against a tree.
    pub fn select(&self, tree: &Value) -> T {
        (self.select)(tree)
    }

    pub fn is_same(&self, previous: &T, next: &T) -> bool {
        (self.same)(previous, next)
    }

    pub(crate) fn is_affected_by(&self, change: &Change) -> bool {
        match &self.scope {
            Some(scope) => change.affects(scope),
            None => true,
        }
    }
}

pub(crate) trait Subscriber {
    fn notify(&self, tree: &Value, event: &ChangeEvent);
}

pub(crate) struct SelectorSubscriber<T: 'static> {
    selector: Selector<T>,
    last: RefCell<T>,
    on_change: Box<dyn Fn(&T)>,
}

impl<T: 'static> SelectorSubscriber<T> {
    pub(crate) fn new(selector: Selector<T>, initial: T, on_change: Box<dyn Fn(&T)>) -> Self {
        Self {
            selector,
            last: RefCell::new(initial),
            on_change,
        }
    }
}

impl<T: Clone + 'static> Subscriber for SelectorSubscriber<T> {
    fn notify(&self, tree: &Value, event: &ChangeEvent) {
        if !self.selector.is_affected_by(&event.change) {
            return;
        }
        let next = self.selector.select(tree);
        if self.selector.is_same(&self.last.borrow(), &next) {
            return;
        }
        *self.last.borrow_mut() = next.clone();
        (self.on_change)(&next);
    }
}

pub(crate) struct Listener {
    pub(crate) on_event: Box<dyn Fn(&Value, &ChangeEvent)>,
}

impl Subscriber for Listener {
    fn notify(&self, tree: &Value, event: &ChangeEvent) {
        (self.on_event)(tree, event);
    }
}

/// Untyped handle to a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a SubscriptionHandle unsubscribes it immediately"]
pub struct SubscriptionHandle {
    pub(crate) id: SubscriptionId,
    pub(crate) document: Weak<DocumentInner>,
}

impl SubscriptionHandle {
    /// Remove the subscriber. Calling this more than once, or from inside a
    /// notification, is fine.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.document.upgrade() {
            let removed = inner.subscribers.borrow_mut().remove(self.id);
            drop(removed);
        }
    }

    pub fn is_active(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|inner| inner.subscribers.borrow().contains_key(self.id))
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A live selector subscription.
///
/// Holds the most recently propagated slice. Dropping it unsubscribes, so a
/// control that owns its subscription releases it when it is unmounted.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription<T: 'static> {
    pub(crate) handle: SubscriptionHandle,
    pub(crate) record: Rc<SelectorSubscriber<T>>,
}

impl<T: Clone + 'static> Subscription<T> {
    /// The current slice.
    pub fn get(&self) -> T {
        self.record.last.borrow().clone()
    }
}

impl<T: 'static> Subscription<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.record.last.borrow())
    }

    pub fn unsubscribe(&self) {
        self.handle.unsubscribe();
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub fn id(&self) -> SubscriptionId {
        self.handle.id
    }
}
