use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::cell::{Cell, Subscription};

/// Read-only cell recomputed from its inputs.
///
/// There is no implicit dependency tracking: a `ReadCell` is an ordinary
/// cell fed by explicit subscriptions on the inputs named at
/// construction, and nothing else can write it.
pub struct ReadCell<T> {
    cell: Cell<T>,
    sources: RefCell<Vec<Box<dyn Fn()>>>,
}

impl<T> ReadCell<T> {
    /// Same contract as [`Cell::subscribe`].
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        self.cell.subscribe(callback)
    }

    /// Cancels the input subscriptions; the value stays at whatever was
    /// last computed. Calling this again is a no-op.
    pub fn disconnect(&self) {
        for cancel in self.sources.borrow_mut().drain(..) {
            cancel();
        }
    }
}

impl<T: Clone> ReadCell<T> {
    pub fn get(&self) -> T {
        self.cell.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadCell").field("cell", &self.cell).finish()
    }
}

/// Derives a read-only cell from one input, recomputed on every write
/// to `source` and initialized from its current value.
pub fn derive<A, T>(source: &Cell<A>, f: impl Fn(&A) -> T + 'static) -> ReadCell<T>
where
    A: Clone + 'static,
    T: 'static,
{
    let out = Cell::new(f(&source.get()));
    let sink = out.clone();
    let sub = source.subscribe(move |value| sink.set(f(value)));
    ReadCell {
        cell: out,
        sources: RefCell::new(vec![Box::new(move || sub.unsubscribe())]),
    }
}

/// Derives a read-only cell from two inputs, recomputed when either one
/// is written.
pub fn derive2<A, B, T>(
    a: &Cell<A>,
    b: &Cell<B>,
    f: impl Fn(&A, &B) -> T + 'static,
) -> ReadCell<T>
where
    A: Clone + 'static,
    B: Clone + 'static,
    T: 'static,
{
    let f = Rc::new(f);
    let out = Cell::new(f(&a.get(), &b.get()));

    let sub_a = {
        let sink = out.clone();
        let f = Rc::clone(&f);
        let other = b.clone();
        a.subscribe(move |value| sink.set(f(value, &other.get())))
    };
    let sub_b = {
        let sink = out.clone();
        let other = a.clone();
        b.subscribe(move |value| sink.set(f(&other.get(), value)))
    };

    ReadCell {
        cell: out,
        sources: RefCell::new(vec![
            Box::new(move || sub_a.unsubscribe()),
            Box::new(move || sub_b.unsubscribe()),
        ]),
    }
}
