//! In-memory store used by unit and behaviour tests.

use std::cell::{Cell, RefCell};
use std::io;

use camino::Utf8PathBuf;

use crate::{CampusState, CampusStore, CampusStoreError};

/// A [`CampusStore`] holding state in memory.
///
/// Supports injecting a save failure so tests can assert that a failed run
/// leaves the previously persisted state authoritative.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RefCell<CampusState>,
    fail_save: Cell<bool>,
    saves: Cell<u32>,
}

impl InMemoryStore {
    /// Create a store seeded with `state`.
    pub fn new(state: CampusState) -> Self {
        Self {
            state: RefCell::new(state),
            fail_save: Cell::new(false),
            saves: Cell::new(0),
        }
    }

    /// Clone the currently persisted state.
    pub fn snapshot(&self) -> CampusState {
        self.state.borrow().clone()
    }

    /// Make the next `save` call fail with a write error.
    pub fn fail_next_save(&self) {
        self.fail_save.set(true);
    }

    /// Number of successful saves observed.
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }
}

impl CampusStore for InMemoryStore {
    fn load(&self) -> CampusState {
        self.state.borrow().clone()
    }

    fn save(&self, state: &CampusState) -> Result<(), CampusStoreError> {
        if self.fail_save.take() {
            return Err(CampusStoreError::Write {
                path: Utf8PathBuf::from("memory"),
                source: io::Error::other("injected save failure"),
            });
        }
        *self.state.borrow_mut() = state.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
