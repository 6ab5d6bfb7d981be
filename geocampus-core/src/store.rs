//! Persistence contract for the campus state document.
//!
//! The `CampusStore` trait defines whole-document access: `load` materialises
//! the current state by value and `save` overwrites it in a single operation.
//! Callers never observe partially written state through this interface.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::CampusState;

/// Load/save access to the persisted campus document.
pub trait CampusStore {
    /// Materialise the persisted campus state.
    ///
    /// Missing backing data yields the empty default document. Unreadable or
    /// malformed data is downgraded to the same defaults (implementations
    /// log the downgrade); it is never surfaced to the caller.
    fn load(&self) -> CampusState;

    /// Overwrite the persisted campus state with `state`.
    fn save(&self, state: &CampusState) -> Result<(), CampusStoreError>;
}

/// Errors raised when persisting the campus state document.
#[derive(Debug, Error)]
pub enum CampusStoreError {
    /// Serialising the document failed.
    #[error("failed to serialise campus state: {source}")]
    Serialize {
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the document to its backing file failed.
    #[error("failed to write campus state to {path}: {source}")]
    Write {
        /// Location of the backing file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
