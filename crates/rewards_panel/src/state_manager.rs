//! Generic snapshot container with merge updates and subscriber notification.
//!
//! The manager owns one immutable snapshot behind an [`Rc`]. [`StateManager::update`] builds the
//! next snapshot completely, swaps it in, and only then notifies listeners, so a listener always
//! observes a finished state. Updates issued from inside a listener are queued and delivered
//! after the current notification round, in call order; each `update` call yields exactly one
//! round.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::{Rc, Weak},
};

/// State types that accept partial updates.
pub trait MergeState: Clone {
    /// Partial update type; absent fields leave the state untouched.
    type Patch;

    /// Applies `patch` in place.
    fn merge(&mut self, patch: Self::Patch);
}

type Listener<S> = Rc<dyn Fn(&Rc<S>)>;

struct Inner<S> {
    snapshot: RefCell<Rc<S>>,
    listeners: RefCell<Vec<(u64, Listener<S>)>>,
    next_listener_id: Cell<u64>,
    pending_rounds: RefCell<VecDeque<Rc<S>>>,
    notifying: Cell<bool>,
}

/// Single-threaded state container shared by cloning.
pub struct StateManager<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for StateManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: MergeState + 'static> StateManager<S> {
    /// Creates a manager seeded with `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(Inner {
                snapshot: RefCell::new(Rc::new(initial)),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                pending_rounds: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn get_state(&self) -> Rc<S> {
        self.inner.snapshot.borrow().clone()
    }

    /// Merges `patch` into a new snapshot and notifies every listener once.
    pub fn update(&self, patch: S::Patch) {
        let next = {
            let current = self.inner.snapshot.borrow();
            let mut next = S::clone(&current);
            next.merge(patch);
            Rc::new(next)
        };
        *self.inner.snapshot.borrow_mut() = next.clone();
        self.inner.pending_rounds.borrow_mut().push_back(next);

        // A reentrant call leaves its round for the outer drain loop.
        if self.inner.notifying.replace(true) {
            return;
        }
        let _drain = DrainGuard(&self.inner);
        loop {
            let Some(snapshot) = self.inner.pending_rounds.borrow_mut().pop_front() else {
                break;
            };
            let listeners: Vec<Listener<S>> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }

    /// Registers a listener called with every new snapshot.
    pub fn add_listener(&self, listener: impl Fn(&Rc<S>) + 'static) -> ListenerHandle<S> {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        ListenerHandle {
            manager: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Ends a drain loop, including one unwound by a panicking listener.
struct DrainGuard<'a, S>(&'a Inner<S>);

impl<S> Drop for DrainGuard<'_, S> {
    fn drop(&mut self) {
        self.0.pending_rounds.borrow_mut().clear();
        self.0.notifying.set(false);
    }
}

/// Capability to remove a listener registered with [`StateManager::add_listener`].
///
/// Dropping the handle keeps the listener registered.
pub struct ListenerHandle<S> {
    manager: Weak<Inner<S>>,
    id: u64,
}

impl<S> ListenerHandle<S> {
    /// Removes the listener. Later snapshots are not delivered to it.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.manager.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|(listener_id, _)| *listener_id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        a: u32,
        b: u32,
    }

    #[derive(Default)]
    struct CounterPatch {
        a: Option<u32>,
        b: Option<u32>,
    }

    impl MergeState for Counter {
        type Patch = CounterPatch;

        fn merge(&mut self, patch: CounterPatch) {
            if let Some(a) = patch.a {
                self.a = a;
            }
            if let Some(b) = patch.b {
                self.b = b;
            }
        }
    }

    #[test]
    fn update_replaces_snapshot_without_mutating_previous() {
        let manager = StateManager::new(Counter::default());
        let before = manager.get_state();

        manager.update(CounterPatch {
            a: Some(3),
            ..CounterPatch::default()
        });

        assert_eq!(*before, Counter::default());
        assert_eq!(*manager.get_state(), Counter { a: 3, b: 0 });
    }

    #[test]
    fn multi_field_patch_produces_one_notification_round() {
        let manager = StateManager::new(Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _handle = manager.add_listener(move |state: &Rc<Counter>| {
            sink.borrow_mut().push((**state).clone());
        });

        manager.update(CounterPatch {
            a: Some(1),
            b: Some(2),
        });

        assert_eq!(*seen.borrow(), vec![Counter { a: 1, b: 2 }]);
    }

    #[test]
    fn reentrant_update_is_delivered_after_current_round() {
        let manager = StateManager::new(Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reentrant = manager.clone();
        let _bump = manager.add_listener(move |state: &Rc<Counter>| {
            if state.a == 1 && state.b == 0 {
                reentrant.update(CounterPatch {
                    b: Some(9),
                    ..CounterPatch::default()
                });
            }
        });
        let sink = seen.clone();
        let _record = manager.add_listener(move |state: &Rc<Counter>| {
            sink.borrow_mut().push((**state).clone());
        });

        manager.update(CounterPatch {
            a: Some(1),
            ..CounterPatch::default()
        });

        assert_eq!(
            *seen.borrow(),
            vec![Counter { a: 1, b: 0 }, Counter { a: 1, b: 9 }]
        );
        assert_eq!(*manager.get_state(), Counter { a: 1, b: 9 });
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let manager = StateManager::new(Counter::default());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handle = manager.add_listener(move |_: &Rc<Counter>| counter.set(counter.get() + 1));

        manager.update(CounterPatch::default());
        handle.unsubscribe();
        manager.update(CounterPatch::default());

        assert_eq!(hits.get(), 1);
        assert_eq!(manager.listener_count(), 0);
    }

    #[test]
    fn panicking_listener_does_not_block_later_rounds() {
        let manager = StateManager::new(Counter::default());
        let armed = Rc::new(Cell::new(true));
        let trip = armed.clone();
        let _faulty = manager.add_listener(move |_: &Rc<Counter>| {
            if trip.replace(false) {
                panic!("listener failure");
            }
        });
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let _count = manager.add_listener(move |_: &Rc<Counter>| counter.set(counter.get() + 1));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.update(CounterPatch {
                a: Some(1),
                ..CounterPatch::default()
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(hits.get(), 0);
        assert_eq!(*manager.get_state(), Counter { a: 1, b: 0 });

        manager.update(CounterPatch {
            b: Some(2),
            ..CounterPatch::default()
        });

        assert_eq!(hits.get(), 1);
        assert_eq!(*manager.get_state(), Counter { a: 1, b: 2 });
    }
}
