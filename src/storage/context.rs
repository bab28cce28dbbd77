use std::cell::Cell;
use std::rc::Rc;

/// Liveness flag for the environment that owns the store.
///
/// When the owning extension is reloaded or unloaded the page keeps running,
/// but any storage call would hit a torn-down backend. Clones share the flag.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    valid: Rc<Cell<bool>>,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            valid: Rc::new(Cell::new(true)),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn invalidate(&self) {
        self.valid.set(false);
    }
}
