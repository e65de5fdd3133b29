use std::cell::{Cell as StdCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
    id: u64,
    callback: Callback<T>,
}

struct Inner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Entry<T>>>,
    next_id: StdCell<u64>,
    notifying: StdCell<bool>,
}

/// A mutable, observable container for a single value.
///
/// `Cell` is a cheap handle: clones share the value and the subscriber
/// list, and any holder of a handle may write. Everything runs on the
/// caller's thread; a write notifies every subscriber synchronously, in
/// subscription order, before `set` returns.
///
/// A subscriber must not write to the cell it is being notified about.
/// That is a bug in the caller and panics rather than recursing; reading
/// the cell, or writing other cells, is fine from inside a callback.
pub struct Cell<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Cell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial),
                subscribers: RefCell::new(Vec::new()),
                next_id: StdCell::new(0),
                notifying: StdCell::new(false),
            }),
        }
    }

    /// Replaces the value and notifies every subscriber registered at
    /// the time of the call.
    ///
    /// A subscriber that panics aborts the pass: the panic reaches the
    /// caller of `set`, subscribers not yet notified are skipped, and
    /// the value is not rolled back.
    pub fn set(&self, value: T) {
        assert!(
            !self.inner.notifying.get(),
            "write to a cell from inside its own change notification"
        );
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Registers `callback`, runs it once with the current value so the
    /// subscriber starts synchronized, and returns the cancel handle.
    ///
    /// Callbacks are kept in subscription order and are not deduplicated.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let callback: Callback<T> = Rc::new(callback);
        self.inner.subscribers.borrow_mut().push(Entry {
            id,
            callback: Rc::clone(&callback),
        });
        callback(&self.inner.value.borrow());
        Subscription {
            id,
            cell: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Snapshot first: callbacks may subscribe or unsubscribe while
        // the pass runs without invalidating the iteration.
        let pass: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        let _in_pass = NotifyFlag::raise(&self.inner.notifying);
        let value = self.inner.value.borrow();
        for callback in pass {
            callback(&value);
        }
    }
}

impl<T: Clone> Cell<T> {
    /// The current value. Pure and non-blocking.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Writes `f` applied to the current value; one call site instead of
    /// a separate read and write.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

// Clears the notifying flag even when a subscriber panics, so the cell
// stays writable after the unwind is caught.
struct NotifyFlag<'a> {
    flag: &'a StdCell<bool>,
}

impl<'a> NotifyFlag<'a> {
    fn raise(flag: &'a StdCell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for NotifyFlag<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Handle returned by [`Cell::subscribe`].
///
/// Dropping the handle does not cancel delivery; a subscription lives
/// until it is explicitly unsubscribed or its cell is dropped.
pub struct Subscription<T> {
    id: u64,
    cell: Weak<Inner<T>>,
}

impl<T> Subscription<T> {
    /// Stops delivery to the callback. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.cell.upgrade() {
            inner.subscribers.borrow_mut().retain(|e| e.id != self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
