//! Per-event memoization.
//!
//! A feature's predicate and its handler run back to back for the same event
//! and usually need the same cursor-context data (the word before the cursor,
//! the list item the cursor is in, ...). `EventDataCache` lives inside the
//! event value, so whatever is cached is dropped together with the event and
//! can never leak into the dispatch of a later event.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Named slots of computed values scoped to one event.
///
/// Single-threaded by construction: dispatch of one event runs to completion
/// before the next one starts, so interior mutability through `RefCell` is
/// enough.
#[derive(Default)]
pub struct EventDataCache {
    slots: RefCell<HashMap<&'static str, Rc<dyn Any>>>,
}

impl EventDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value cached under `slot`, computing and storing it first
    /// if the slot is empty.
    ///
    /// A computed `None` is a cached value like any other; it is not
    /// recomputed on the next call.
    pub fn get_or_compute<T, F>(&self, slot: &'static str, compute: F) -> T
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get::<T>(slot) {
            tracing::trace!(slot, "event cache hit");
            return value;
        }

        // The borrow is released before computing: `compute` may itself read
        // other slots of this cache.
        tracing::trace!(slot, "event cache miss");
        let value = compute();
        self.slots
            .borrow_mut()
            .insert(slot, Rc::new(value.clone()) as Rc<dyn Any>);
        value
    }

    /// Return the cached value for `slot` without computing anything.
    ///
    /// Returns `None` if the slot is empty or holds a value of another type.
    pub fn get<T: Clone + 'static>(&self, slot: &'static str) -> Option<T> {
        let slots = self.slots.borrow();
        let value = slots.get(slot)?;
        match value.downcast_ref::<T>() {
            Some(value) => Some(value.clone()),
            None => {
                tracing::trace!(slot, "event cache slot holds a different type");
                None
            }
        }
    }

    /// Check whether `slot` holds a value.
    pub fn contains(&self, slot: &'static str) -> bool {
        self.slots.borrow().contains_key(slot)
    }

    /// Drop a single slot.
    pub fn remove(&self, slot: &'static str) {
        self.slots.borrow_mut().remove(slot);
    }

    /// Drop every slot. Called once an event's mutation is committed, since
    /// cursor-relative data is stale afterwards.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EventDataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut names: Vec<_> = slots.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("EventDataCache")
            .field("slots", &names)
            .finish()
    }
}
