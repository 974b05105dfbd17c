//! Collection that reports its changes
//!
//! While suspended, changes are not reported individually; leaving the
//! outermost suspension reports a single `Reset` if anything changed.

use std::ops::{Deref, DerefMut};

use super::apply::FilterTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// Item appended at the index
    Pushed(usize),
    Cleared,
    /// Contents replaced wholesale
    Reset,
}

type Listener = Box<dyn FnMut(&CollectionChange) + Send>;

pub struct ObservableVec<T> {
    items: Vec<T>,
    listeners: Vec<Listener>,
    suspended: usize,
    dirty: bool,
}

impl<T> ObservableVec<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            listeners: Vec::new(),
            suspended: 0,
            dirty: false,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&CollectionChange) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    /// Suspend notifications until the returned guard drops
    pub fn suspend(&mut self) -> SuspendGuard<'_, T> {
        self.begin_update();
        SuspendGuard { target: self }
    }

    fn notify(&mut self, change: CollectionChange) {
        if self.suspended > 0 {
            self.dirty = true;
            return;
        }
        for listener in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl<T> FilterTarget<T> for ObservableVec<T> {
    fn begin_update(&mut self) {
        self.suspended += 1;
    }

    fn end_update(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
        if self.suspended == 0 && std::mem::take(&mut self.dirty) {
            self.notify(CollectionChange::Reset);
        }
    }

    fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.notify(CollectionChange::Cleared);
    }

    fn push(&mut self, item: T) {
        self.items.push(item);
        self.notify(CollectionChange::Pushed(self.items.len() - 1));
    }
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for ObservableVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableVec")
            .field("items", &self.items)
            .field("listeners", &self.listeners.len())
            .field("suspended", &self.suspended)
            .finish()
    }
}

/// Scope of suspended notifications on an `ObservableVec`
pub struct SuspendGuard<'a, T> {
    target: &'a mut ObservableVec<T>,
}

impl<T> Deref for SuspendGuard<'_, T> {
    type Target = ObservableVec<T>;

    fn deref(&self) -> &ObservableVec<T> {
        self.target
    }
}

impl<T> DerefMut for SuspendGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut ObservableVec<T> {
        self.target
    }
}

impl<T> Drop for SuspendGuard<'_, T> {
    fn drop(&mut self) {
        self.target.end_update();
    }
}
