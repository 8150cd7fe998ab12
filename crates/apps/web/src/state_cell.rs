//! Holder for the mounted app state.
//!
//! Browser callbacks re-enter the app at arbitrary points, including from
//! inside JS code the app itself invoked. [`StateCell`] never hands out a
//! second mutable borrow: a nested call is dropped with a warning, and
//! [`StateCell::with_then`] runs outward notifications only after the borrow
//! has been released.

use std::cell::{Cell, RefCell};

pub struct StateCell<S> {
    state: RefCell<Option<S>>,
    generation: Cell<u64>,
}

impl<S> StateCell<S> {
    pub const fn new() -> Self {
        Self {
            state: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.try_borrow().map_or(true, |s| s.is_some())
    }

    /// Installs `state` and returns its mount generation. Each call gets a
    /// new generation, so loops started by an earlier mount can tell they
    /// are stale.
    pub fn put(&self, state: S) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        match self.state.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(state),
            Err(_) => tracing::warn!("state is busy; mount ignored"),
        }
        generation
    }

    pub fn take(&self) -> Option<S> {
        match self.state.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                tracing::warn!("state is busy; unmount ignored");
                None
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Runs `f` on the state. Returns the default when nothing is mounted or
    /// when the state is already borrowed further up the stack.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
        R: Default,
    {
        match self.state.try_borrow_mut() {
            Ok(mut slot) => slot.as_mut().map(f).unwrap_or_default(),
            Err(_) => {
                tracing::warn!("state is busy; nested call ignored");
                R::default()
            }
        }
    }

    /// Runs `f`, asks `notice` what to report, and calls `deliver` with it
    /// once the borrow has ended. `deliver` may call back into the cell.
    pub fn with_then<F, R, N>(
        &self,
        f: F,
        notice: impl FnOnce(&S, &R) -> Option<N>,
        deliver: impl FnOnce(N),
    ) -> R
    where
        F: FnOnce(&mut S) -> R,
        R: Default,
    {
        let (result, pending) = self.with(|s| {
            let result = f(s);
            let pending = notice(s, &result);
            (result, pending)
        });
        if let Some(n) = pending {
            deliver(n);
        }
        result
    }
}

impl<S> Default for StateCell<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::StateCell;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Counter {
        value: u32,
        seen: Vec<u32>,
    }

    #[test]
    fn empty_cell_yields_defaults() {
        let cell: StateCell<Counter> = StateCell::new();
        assert!(!cell.is_mounted());
        assert_eq!(cell.with(|c| c.value + 1), 0);
        assert!(cell.take().is_none());
    }

    #[test]
    fn notification_can_reenter_the_cell() {
        let cell = StateCell::new();
        cell.put(Counter::default());

        let changed = cell.with_then(
            |c| {
                c.value = 7;
                true
            },
            |c, changed| changed.then_some(c.value),
            |value| {
                // The receiver reads and writes state while handling the notice.
                let read = cell.with(|c| c.value);
                cell.with(|c| c.seen.push(value + read));
            },
        );

        assert!(changed);
        assert_eq!(cell.with(|c| c.seen.clone()), vec![14]);
    }

    #[test]
    fn unchanged_state_sends_nothing() {
        let cell = StateCell::new();
        cell.put(Counter::default());
        let mut delivered = false;
        cell.with_then(|_| false, |c, changed| changed.then_some(c.value), |_| delivered = true);
        assert!(!delivered);
    }

    #[test]
    fn nested_borrow_is_ignored_instead_of_panicking() {
        let cell = StateCell::new();
        cell.put(Counter::default());
        let inner = cell.with(|c| {
            c.value = 1;
            cell.with(|c| {
                c.value = 99;
                c.value
            })
        });
        assert_eq!(inner, 0);
        assert_eq!(cell.with(|c| c.value), 1);
        assert!(cell.is_mounted());
    }

    #[test]
    fn remount_releases_the_previous_state() {
        struct Owned(#[allow(dead_code)] Rc<()>);

        let cell = StateCell::new();
        let first = Rc::new(());
        let g1 = cell.put(Owned(first.clone()));
        assert_eq!(Rc::strong_count(&first), 2);

        drop(cell.take());
        assert_eq!(Rc::strong_count(&first), 1);

        let second = Rc::new(());
        let g2 = cell.put(Owned(second.clone()));
        assert!(g2 > g1);
        assert_eq!(cell.generation(), g2);
        assert_eq!(Rc::strong_count(&first), 1);
        assert_eq!(Rc::strong_count(&second), 2);
    }
}
