//! Replaceable callback slots for single-threaded UI objects.

use std::cell::{Cell, RefCell};
use std::fmt;

/// A slot holding at most one callback.
///
/// The callback is taken out of the slot while it runs, so it may freely
/// call back into the object that owns the slot, including replacing or
/// clearing the handler itself. Whatever `set` or `clear` did during the
/// call wins over restoring the running callback.
pub struct Handler<F: ?Sized> {
    slot: RefCell<Option<Box<F>>>,
    /// Bumped by `set` and `clear`.
    generation: Cell<u64>,
}

impl<F: ?Sized> Default for Handler<F> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
            generation: Cell::new(0),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("set", &self.is_set())
            .finish()
    }
}

impl<F: ?Sized> Handler<F> {
    pub fn set(&self, callback: Box<F>) {
        *self.slot.borrow_mut() = Some(callback);
        self.bump();
    }

    pub fn clear(&self) {
        self.slot.borrow_mut().take();
        self.bump();
    }

    fn bump(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Run `call` with the installed callback. Returns `None` when the slot
    /// is empty or the callback is already running further up the stack.
    pub fn with<R>(&self, call: impl FnOnce(&mut F) -> R) -> Option<R> {
        let mut callback = self.slot.borrow_mut().take()?;
        let generation = self.generation.get();
        let result = call(&mut callback);
        if self.generation.get() == generation {
            *self.slot.borrow_mut() = Some(callback);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn empty_slot_does_not_call() {
        let handler: Handler<dyn FnMut() -> bool> = Handler::default();
        assert!(!handler.is_set());
        assert_eq!(handler.with(|f| f()), None);
    }

    #[test]
    fn callback_can_replace_itself() {
        let handler: Rc<Handler<dyn FnMut(i32) -> i32>> = Rc::new(Handler::default());
        let inner = Rc::clone(&handler);
        handler.set(Box::new(move |x| {
            inner.set(Box::new(|x| x * 10));
            x + 1
        }));
        assert_eq!(handler.with(|f| f(1)), Some(2));
        assert_eq!(handler.with(|f| f(1)), Some(10));
    }

    #[test]
    fn callback_can_clear_itself() {
        let handler: Rc<Handler<dyn FnMut()>> = Rc::new(Handler::default());
        let calls = Rc::new(Cell::new(0));
        let (inner, counter) = (Rc::clone(&handler), Rc::clone(&calls));
        handler.set(Box::new(move || {
            counter.set(counter.get() + 1);
            inner.clear();
        }));
        assert_eq!(handler.with(|f| f()), Some(()));
        assert!(!handler.is_set());
        assert_eq!(handler.with(|f| f()), None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn nested_call_is_skipped() {
        let handler: Rc<Handler<dyn FnMut()>> = Rc::new(Handler::default());
        let calls = Rc::new(Cell::new(0));
        let (inner, counter) = (Rc::clone(&handler), Rc::clone(&calls));
        handler.set(Box::new(move || {
            counter.set(counter.get() + 1);
            assert_eq!(inner.with(|f| f()), None);
        }));
        handler.with(|f| f());
        assert_eq!(calls.get(), 1);
        assert!(handler.is_set());
    }
}
